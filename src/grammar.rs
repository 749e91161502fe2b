use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};

use crate::error::GrammarError;
use crate::rules::{Production, Rule};

/// An immutable context-free grammar. Rules are grouped by left-hand symbol in
/// the order they were first defined, which keeps chart and tree order
/// deterministic.
#[derive(Debug)]
pub struct Grammar {
  pub start: String,
  pub rules: IndexMap<String, Vec<Rule>>,
  nullables: IndexSet<String>,
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "//** start: {}", self.start)?;
    write!(f, "//** nullables:")?;
    for nt in self.nullables.iter() {
      write!(f, " {}", nt)?;
    }
    writeln!(f)?;

    for rule in self.rules.values().flatten() {
      writeln!(f, "{}", rule)?;
    }

    Ok(())
  }
}

impl Grammar {
  /// Builds a grammar from a list of rules. Fails if the start symbol has no
  /// rules, or if any right-hand side names a nonterminal that is never
  /// defined.
  pub fn new(start: impl Into<String>, rules: Vec<Rule>) -> Result<Self, GrammarError> {
    let start = start.into();
    if rules.is_empty() {
      return Err(GrammarError::Empty);
    }

    let mut table: IndexMap<String, Vec<Rule>> = IndexMap::new();
    for rule in rules {
      let alternatives = table.entry(rule.symbol.name.clone()).or_default();
      if alternatives.contains(&rule) {
        tracing::debug!("dropping duplicate alternative {}", rule);
      } else {
        alternatives.push(rule);
      }
    }

    if !table.contains_key(&start) {
      return Err(GrammarError::MissingStart(start));
    }

    for rule in table.values().flatten() {
      for p in rule.productions.iter() {
        if let Production::Nonterminal(s) = p {
          if !table.contains_key(&s.name) {
            return Err(GrammarError::UndefinedNonterminal {
              symbol: s.name.clone(),
              rule: rule.to_string(),
            });
          }
        }
      }
    }

    let nullables = Self::find_nullables(&table);
    let g = Self {
      start,
      rules: table,
      nullables,
    };

    tracing::debug!(
      rules = g.rules.values().map(Vec::len).sum::<usize>(),
      nonterminals = g.rules.len(),
      "built grammar"
    );
    tracing::debug!("nullable nonterminals: {:?}", g.nullables);
    let unreachable = g.unreachable();
    if !unreachable.is_empty() {
      tracing::debug!("nonterminals unreachable from {}: {:?}", g.start, unreachable);
    }

    Ok(g)
  }

  pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
    fs::read_to_string(path)?.parse()
  }

  fn rule_is_nullable(nullables: &IndexSet<String>, rule: &Rule) -> bool {
    rule.productions.iter().all(|p| match p {
      Production::Nonterminal(s) => nullables.contains(&s.name),
      Production::Terminal(_) => false,
    })
  }

  /// Fixpoint over the rule set: a symbol is nullable if any of its rules is
  /// made only of nullable symbols (trivially true for epsilon rules).
  fn find_nullables(rules: &IndexMap<String, Vec<Rule>>) -> IndexSet<String> {
    let mut nullables = IndexSet::new();

    loop {
      let last_length = nullables.len();
      for r in rules.values().flatten() {
        if !nullables.contains(&r.symbol.name) && Self::rule_is_nullable(&nullables, r) {
          nullables.insert(r.symbol.name.clone());
        }
      }
      if last_length == nullables.len() {
        return nullables;
      }
    }
  }

  pub fn is_nullable(&self, s: &str) -> bool {
    self.nullables.contains(s)
  }

  pub fn nullables(&self) -> impl Iterator<Item = &str> {
    self.nullables.iter().map(String::as_str)
  }

  /// Alternatives for a nonterminal, empty for anything that isn't one.
  pub fn rules_for(&self, symbol: &str) -> &[Rule] {
    self.rules.get(symbol).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn start_rules(&self) -> &[Rule] {
    self.rules_for(&self.start)
  }

  pub fn is_nonterminal(&self, s: &str) -> bool {
    self.rules.contains_key(s)
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
    self.rules.keys().map(String::as_str)
  }

  /// Every distinct terminal word, in order of first appearance.
  pub fn terminals(&self) -> IndexSet<&str> {
    self
      .rules
      .values()
      .flatten()
      .flat_map(|r| r.productions.iter())
      .filter(|p| p.is_terminal())
      .map(Production::symbol_str)
      .collect()
  }

  /// Whether some terminal rule matches `word`.
  pub fn knows_word(&self, word: &str) -> bool {
    self
      .rules
      .values()
      .flatten()
      .flat_map(|r| r.productions.iter())
      .any(|p| matches!(p, Production::Terminal(w) if w == word))
  }

  /// Nonterminals that can appear in some derivation from the start symbol.
  pub fn reachable(&self) -> IndexSet<&str> {
    let mut seen = IndexSet::new();
    let mut stack = vec![self.start.as_str()];

    while let Some(symbol) = stack.pop() {
      if !seen.insert(symbol) {
        continue;
      }
      for rule in self.rules_for(symbol) {
        for p in rule.productions.iter() {
          if let Production::Nonterminal(s) = p {
            stack.push(&s.name);
          }
        }
      }
    }

    seen
  }

  pub fn unreachable(&self) -> Vec<&str> {
    let reachable: HashSet<&str> = self.reachable().into_iter().collect();
    self
      .nonterminals()
      .filter(|nt| !reachable.contains(nt))
      .collect()
  }
}
