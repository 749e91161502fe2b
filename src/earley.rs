use std::fmt;
use std::ptr;

use crate::error::InputError;
use crate::grammar::Grammar;
use crate::rules::{Production, Rule};

/// A rule with a dot: how much of its right-hand side has been recognized.
/// Rules are compared by identity, since the grammar owns exactly one copy of each.
#[derive(Debug, Clone, Copy)]
pub struct LR0<'g> {
  pub rule: &'g Rule,
  pub pos: usize,
}

impl PartialEq for LR0<'_> {
  fn eq(&self, other: &Self) -> bool {
    ptr::eq(self.rule, other.rule) && self.pos == other.pos
  }
}

impl Eq for LR0<'_> {}

impl<'g> LR0<'g> {
  pub fn new(rule: &'g Rule) -> Self {
    Self { rule, pos: 0 }
  }

  pub fn is_active(&self) -> bool {
    self.pos < self.rule.len()
  }

  pub fn advance(&self) -> Self {
    debug_assert!(self.is_active());
    Self {
      rule: self.rule,
      pos: self.pos + 1,
    }
  }

  pub fn next_production(&self) -> Option<&'g Production> {
    self.rule.productions.get(self.pos)
  }
}

impl fmt::Display for LR0<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} →", self.rule.symbol)?;
    for idx in 0..self.rule.len() {
      if idx == self.pos {
        write!(f, " ・")?;
      }
      write!(f, " {}", self.rule.productions[idx])?;
    }
    if !self.is_active() {
      write!(f, " ・")?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State<'g> {
  pub lr0: LR0<'g>,
  pub origin: usize,
}

impl<'g> State<'g> {
  pub fn new(lr0: LR0<'g>, origin: usize) -> Self {
    Self { lr0, origin }
  }

  pub fn advance(&self) -> Self {
    Self::new(self.lr0.advance(), self.origin)
  }
}

/// Earley sets, one per input position plus one for the end of input.
/// Each set holds a state at most once, which is what makes the fixpoint terminate.
#[derive(Debug)]
pub struct Chart<'g>(Vec<Vec<State<'g>>>);

impl<'g> Chart<'g> {
  pub fn new(length: usize) -> Self {
    Self(vec![Vec::new(); length])
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn len_at(&self, k: usize) -> usize {
    self.0[k].len()
  }

  pub fn has(&self, k: usize, state: &State<'g>) -> bool {
    self.0[k].contains(state)
  }

  pub fn add(&mut self, k: usize, state: State<'g>) {
    if !self.has(k, &state) {
      self.0[k].push(state);
    }
  }

  fn get_state(&self, k: usize, idx: usize) -> State<'g> {
    self.0[k][idx]
  }

  /// Whether some rule for `start` was completed over the whole input.
  pub fn accepts(&self, start: &str) -> bool {
    self.0.last().is_some_and(|states| {
      states
        .iter()
        .any(|s| s.origin == 0 && !s.lr0.is_active() && s.lr0.rule.symbol_str() == start)
    })
  }
}

impl<'g> IntoIterator for Chart<'g> {
  type Item = (usize, Vec<State<'g>>);
  type IntoIter = std::iter::Enumerate<std::vec::IntoIter<Vec<State<'g>>>>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter().enumerate()
  }
}

impl fmt::Display for Chart<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for k in 0..self.len() {
      writeln!(f, "State {}:", k)?;
      for state in self.0[k].iter() {
        writeln!(f, "  {}..{}: {}", state.origin, k, state.lr0)?;
      }
    }
    Ok(())
  }
}

fn validate_input(input: &[&str]) -> Result<(), InputError> {
  if input.is_empty() {
    return Err(InputError::Empty);
  }
  match input.iter().position(|word| word.is_empty()) {
    Some(index) => Err(InputError::EmptyToken { index }),
    None => Ok(()),
  }
}

#[tracing::instrument(level = "debug", skip_all, fields(tokens = input.len()))]
pub fn parse_chart<'g>(g: &'g Grammar, input: &[&str]) -> Result<Chart<'g>, InputError> {
  validate_input(input)?;

  let mut chart = Chart::new(input.len() + 1);

  for rule in g.start_rules() {
    chart.add(0, State::new(LR0::new(rule), 0));
  }

  for k in 0..chart.len() {
    // need to use while loop because the number of states at k can expand during the loop
    let mut idx = 0;
    while idx < chart.len_at(k) {
      let state = chart.get_state(k, idx);
      idx += 1;

      match state.lr0.next_production() {
        None => completer(&mut chart, k, &state),
        Some(Production::Nonterminal(symbol)) => predictor(g, &mut chart, k, &state, &symbol.name),
        Some(Production::Terminal(word)) => scanner(&mut chart, k, &state, word, input),
      };
    }

    tracing::trace!(position = k, states = chart.len_at(k), "closed earley set");
  }

  Ok(chart)
}

fn completer(chart: &mut Chart, k: usize, state: &State) {
  debug_assert!(!state.lr0.is_active(), "tried to complete active state");

  // lr0 has been completed, now look for states in the chart that are waiting for its symbol
  for idx in 0..chart.len_at(state.origin) {
    let other = chart.get_state(state.origin, idx);

    if let Some(Production::Nonterminal(np)) = other.lr0.next_production() {
      if np.name == state.lr0.rule.symbol_str() {
        // found one, advance its dot and add the new state to the chart *at k*,
        // because it's now waiting on a token there
        chart.add(k, other.advance())
      }
    }
  }
}

fn predictor<'g>(g: &'g Grammar, chart: &mut Chart<'g>, k: usize, state: &State<'g>, needed_symbol: &str) {
  debug_assert!(state.lr0.is_active(), "tried to predict non-active state");

  // this lr0 is waiting for the next production
  // let's hypothesize that one of the rules that can build this production will
  // succeed at its current position
  for wanted_rule in g.rules_for(needed_symbol) {
    chart.add(k, State::new(LR0::new(wanted_rule), k));
  }

  if g.is_nullable(needed_symbol) {
    // automatically complete `state` early, because we know
    // it will be completable anyways, because its next_production may be produced
    // by empty input. If we don't do this, nullable rules won't be completed
    // correctly, because complete() won't run after predict() without a new symbol.
    chart.add(k, state.advance());
  }
}

fn scanner<'g>(chart: &mut Chart<'g>, k: usize, state: &State<'g>, needed_word: &str, input: &[&str]) {
  debug_assert!(state.lr0.is_active(), "tried to scan non-active state");

  if k < input.len() && input[k] == needed_word {
    // advance the state to consume this token, and add to state k + 1, where
    // it will look for the next token
    chart.add(k + 1, state.advance());
  }
}
