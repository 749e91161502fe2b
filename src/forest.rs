use std::fmt;
use std::iter;
use std::ptr;
use std::rc::Rc;

use crate::earley::Chart;
use crate::grammar::Grammar;
use crate::rules::{Production, Rule};
use crate::syntree::{Constituent, SynTree, Word};

pub type Tree = SynTree<String, String>;

/// Lazily produced parse trees. Each tree is built on demand, so only the
/// trees the caller actually pulls are ever held in memory.
pub type Trees<'f> = Box<dyn Iterator<Item = Tree> + 'f>;

type Sequences<'f> = Box<dyn Iterator<Item = Vec<Tree>> + 'f>;

/// A completed rule over a span of the input.
#[derive(Debug, Clone, Copy)]
pub struct ForestState<'g> {
  rule: &'g Rule,
  span: (usize, usize),
}

impl<'g> ForestState<'g> {
  pub fn new(rule: &'g Rule, start: usize, end: usize) -> Self {
    Self { rule, span: (start, end) }
  }

  pub fn rule(&self) -> &'g Rule {
    self.rule
  }

  pub fn span(&self) -> (usize, usize) {
    self.span
  }
}

impl PartialEq for ForestState<'_> {
  fn eq(&self, other: &Self) -> bool {
    ptr::eq(self.rule, other.rule) && self.span == other.span
  }
}

impl fmt::Display for ForestState<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.rule)
  }
}

impl From<&ForestState<'_>> for Constituent<String> {
  fn from(state: &ForestState<'_>) -> Self {
    Constituent {
      value: state.rule.symbol_str().to_string(),
      span: state.span,
    }
  }
}

/// The chain of states from a tree's root down to the node being expanded.
/// A state that already appears in its own ancestry would only ever
/// reproduce itself (`S -> S`, or a cycle of nullable rules), so it is skipped.
struct Ancestry<'g> {
  state: ForestState<'g>,
  parent: Option<Rc<Ancestry<'g>>>,
}

impl<'g> Ancestry<'g> {
  fn contains(mut node: &Option<Rc<Ancestry<'g>>>, state: &ForestState<'g>) -> bool {
    while let Some(a) = node {
      if a.state == *state {
        return true;
      }
      node = &a.parent;
    }
    false
  }
}

/// Completed states indexed by origin, plus the tokens they were built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest<'g> {
  origins: Vec<Vec<ForestState<'g>>>,
  input: Vec<String>,
}

impl<'g> Forest<'g> {
  pub fn new(chart: Chart<'g>, input: &[&str]) -> Self {
    // epsilon rules can complete at the very end of the input, so every
    // chart position is a possible origin
    let mut origins = vec![Vec::new(); chart.len()];

    for (k, states) in chart.into_iter() {
      for state in states {
        // exclude unfinished rules that can't contribute to a tree
        if !state.lr0.is_active() {
          origins[state.origin].push(ForestState::new(state.lr0.rule, state.origin, k));
        }
      }
    }

    Self {
      origins,
      input: input.iter().map(|w| w.to_string()).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.origins.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Completed states that start at `origin`.
  pub fn at(&self, origin: usize) -> &[ForestState<'g>] {
    self.origins.get(origin).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Every tree rooted at the grammar's start symbol that spans the whole input.
  pub fn trees<'f>(&'f self, g: &Grammar) -> Trees<'f> {
    // seed our search with all states that started at position 0, span to
    // the end of the input, and are named by the grammar's start symbol
    let start = g.start.clone();
    let end = self.input.len();
    Box::new(
      self
        .at(0)
        .iter()
        .filter(move |state| state.span.1 == end && state.rule.symbol_str() == start)
        .flat_map(move |state| self.make_trees(*state, None)),
    )
  }

  /// All trees headed by `state`, one per way of filling in its children.
  fn make_trees<'f>(&'f self, state: ForestState<'g>, ancestry: Option<Rc<Ancestry<'g>>>) -> Trees<'f> {
    let ancestry = Some(Rc::new(Ancestry {
      state,
      parent: ancestry,
    }));
    let cons: Constituent<String> = (&state).into();

    Box::new(
      self
        .extend_out(state.rule, 0, state.span.0, state.span.1, ancestry)
        .map(move |children| SynTree::Branch(cons.clone(), children)),
    )
  }

  /// Takes a rule and search span, and lazily yields every sequence of trees
  /// that matches the rule's productions from `prod_idx` onwards and covers
  /// exactly `search_start..search_end`.
  /// So for the situation:
  /// ```text
  /// g := '''
  ///   S -> "x"
  ///   S -> S S
  /// '''
  /// forest := parse(g, "x x x")
  /// forest.extend_out(S -> S S, 0, start = 0, end = 3)
  /// ```
  /// , which has completed states:
  ///
  /// ```text
  /// 0..1: S -> "x"
  /// 0..2: S -> S S
  /// 0..3: S -> S S
  /// 1..2: S -> "x"
  /// 1..3: S -> S S
  /// 2..3: S -> "x"
  /// ```
  ///
  /// You'd get the children of `(S x) (S (S x) (S x))` and of
  /// `(S (S x) (S x)) (S x)`, each fully built.
  fn extend_out<'f>(
    &'f self,
    rule: &'g Rule,
    prod_idx: usize,
    search_start: usize,
    search_end: usize,
    ancestry: Option<Rc<Ancestry<'g>>>,
  ) -> Sequences<'f> {
    let Some(next_production) = rule.productions.get(prod_idx) else {
      // we consumed the whole rule. it's only a match if we consumed the whole span too,
      // in which case an empty sequence is the base for prepending onto as we unwind
      return if search_start == search_end {
        Box::new(iter::once(Vec::new()))
      } else {
        Box::new(iter::empty())
      };
    };

    match next_production {
      Production::Terminal(word) => {
        if search_start >= search_end || self.input[search_start] != *word {
          return Box::new(iter::empty());
        }

        let leaf = SynTree::Leaf(Word {
          value: word.clone(),
          span: (search_start, search_start + 1),
        });

        Box::new(
          self
            .extend_out(rule, prod_idx + 1, search_start + 1, search_end, ancestry)
            .map(move |mut seq| {
              seq.insert(0, leaf.clone());
              seq
            }),
        )
      }
      Production::Nonterminal(symbol) => {
        let candidates = self
          .at(search_start)
          .iter()
          .copied()
          // only consider states that are contained within the search range, and have our wanted symbol
          .filter(move |s| s.span.1 <= search_end && s.rule.symbol == *symbol)
          // and leave a remainder the rest of the rule can actually cover, so we never
          // build subtrees for a split that is going to be thrown away
          .filter(move |s| self.can_extend(rule, prod_idx + 1, s.span.1, search_end))
          .filter({
            let ancestry = ancestry.clone();
            move |s| !Ancestry::contains(&ancestry, s)
          });

        Box::new(candidates.flat_map(move |child| {
          let ancestry = ancestry.clone();
          // every tree for this child, followed by every way of finishing the rule after it
          self.make_trees(child, ancestry.clone()).flat_map(move |subtree| {
            self
              .extend_out(rule, prod_idx + 1, child.span.1, search_end, ancestry.clone())
              .map(move |mut seq| {
                seq.insert(0, subtree.clone());
                seq
              })
          })
        }))
      }
    }
  }
}

impl Forest<'_> {
  /// Recognition-only version of `extend_out`: whether any sequence exists,
  /// without building it. Every completed state has at least one derivation,
  /// so nonterminals only need a matching state, not a subtree.
  fn can_extend(&self, rule: &Rule, prod_idx: usize, search_start: usize, search_end: usize) -> bool {
    match rule.productions.get(prod_idx) {
      None => search_start == search_end,
      Some(Production::Terminal(word)) => {
        search_start < search_end
          && self.input[search_start] == *word
          && self.can_extend(rule, prod_idx + 1, search_start + 1, search_end)
      }
      Some(Production::Nonterminal(symbol)) => self.at(search_start).iter().any(|s| {
        s.span.1 <= search_end
          && s.rule.symbol == *symbol
          && self.can_extend(rule, prod_idx + 1, s.span.1, search_end)
      }),
    }
  }
}

impl fmt::Display for Forest<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for k in 0..self.len() {
      writeln!(f, "Origin {}:", k)?;
      for fs in self.origins[k].iter() {
        writeln!(f, "  {}", fs)?;
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::earley::parse_chart;

  fn spans(forest: &Forest) -> Vec<Vec<(usize, usize, usize)>> {
    forest
      .origins
      .iter()
      .map(|states| states.iter().map(|s| (s.span.0, s.span.1, s.rule.len())).collect())
      .collect()
  }

  #[test]
  fn test_parse_forest() {
    let g: Grammar = r#"
      S -> "x"
      S -> S S
    "#
    .parse()
    .unwrap();

    let input = ["x", "x", "x"];
    let forest = Forest::new(parse_chart(&g, &input).unwrap(), &input);

    assert_eq!(
      spans(&forest),
      vec![
        vec![(0, 1, 1), (0, 2, 2), (0, 3, 2)],
        vec![(1, 2, 1), (1, 3, 2)],
        vec![(2, 3, 1)],
        vec![],
      ]
    );

    println!("{}", forest);
  }

  #[test]
  fn test_tree_generation() {
    // test the tree ambiguity problem that naive earley forest processing has
    // correct algorithm finds 2 trees:
    //  (S (S x) (S (S x) (S x)))           -> [x][xx]
    //  (S (S (S x) (S x)) (S x))           -> [xx][x]
    // naive algorithm finds 2 addl. spurious trees:
    //  (S (S x) (S x))                     -> [x][x]
    //  (S (S (S x) (S x)) (S (S x) (S x))) -> [xx][xx]
    let g: Grammar = r#"
      S -> "x"
      S -> S S
    "#
    .parse()
    .unwrap();

    let input = ["x", "x", "x"];
    let forest = Forest::new(parse_chart(&g, &input).unwrap(), &input);
    let trees = forest.trees(&g).collect::<Vec<_>>();

    for tree in trees.iter() {
      println!("{}\n", tree);
      assert_eq!(tree.leaves(), vec!["x", "x", "x"]);
    }

    assert_eq!(trees.len(), 2);
    assert_ne!(trees[0], trees[1]);
  }

  #[test]
  fn test_epsilon_at_end_of_input() {
    let g: Grammar = r#"
      S -> N PP
      PP -> P NP
      NP -> Det N |
      N -> "dog" | "cat"
      Det -> "the"
      P -> "with"
    "#
    .parse()
    .unwrap();

    let input = ["dog", "with"];
    let forest = Forest::new(parse_chart(&g, &input).unwrap(), &input);
    let trees = forest.trees(&g).collect::<Vec<_>>();

    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].to_string(), "(S\n  (N dog)\n  (PP\n    (P with)\n    (NP)))");
    assert_eq!(forest.at(2).len(), 1);
  }

  #[test]
  fn test_cyclic_rules_terminate() {
    let g: Grammar = r#"
      S -> S | "x"
    "#
    .parse()
    .unwrap();

    let input = ["x"];
    let forest = Forest::new(parse_chart(&g, &input).unwrap(), &input);
    let mut trees = forest.trees(&g).map(|t| t.to_string()).collect::<Vec<_>>();
    trees.sort();

    assert_eq!(trees, vec!["(S (S x))", "(S x)"]);
  }

  #[test]
  fn test_trees_are_lazy() {
    // exponentially many bracketings, but only the first is ever built
    let g: Grammar = r#"
      S -> S S | "x"
    "#
    .parse()
    .unwrap();

    let input = ["x"; 12];
    let forest = Forest::new(parse_chart(&g, &input).unwrap(), &input);
    let first = forest.trees(&g).next().unwrap();
    assert_eq!(first.leaves().len(), 12);
  }
}
