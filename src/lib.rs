#[macro_use]
extern crate lazy_static;

#[macro_use]
mod utils;

pub mod chunk;
pub mod earley;
pub mod error;
pub mod forest;
pub mod grammar;
pub mod parse_grammar;
pub mod preprocess;
pub mod rules;
pub mod syntree;

use crate::earley::{Chart, parse_chart};
pub use crate::error::{GrammarError, InputError};
use crate::forest::Forest;
pub use crate::forest::Tree;
pub use crate::grammar::Grammar;
pub use crate::utils::Err;

/// Grammar for simple English sentences, in the text format read by
/// `Grammar::from_str`. `NP` may be empty.
pub const SENTENCE_GRAMMAR: &str = include_str!("../grammars/sentences.cfg");

impl Grammar {
  pub fn parse_chart(&self, input: &[&str]) -> Result<Chart<'_>, InputError> {
    parse_chart(self, input)
  }

  pub fn parse_forest(&self, input: &[&str]) -> Result<Forest<'_>, InputError> {
    let forest = Forest::new(self.parse_chart(input)?, input);
    tracing::trace!("forest:\n{}", forest);
    Ok(forest)
  }

  /// Every parse of `input` rooted at the start symbol. Input the grammar
  /// can't derive gives an empty list, not an error.
  pub fn parse(&self, input: &[&str]) -> Result<Vec<Tree>, InputError> {
    let forest = self.parse_forest(input)?;
    let trees = forest.trees(self).collect::<Vec<_>>();
    tracing::debug!(tokens = input.len(), trees = trees.len(), "parsed");
    Ok(trees)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chunk::np_chunks;
  use crate::syntree::SynTree;

  fn sentence_grammar() -> Grammar {
    SENTENCE_GRAMMAR.parse().unwrap()
  }

  fn words(sentence: &str) -> Vec<&str> {
    sentence.split(' ').collect()
  }

  fn chunk_texts(tree: &Tree) -> Vec<String> {
    np_chunks(tree).into_iter().map(|c| c.text()).collect()
  }

  fn is_within(outer: &Tree, inner: &Tree) -> bool {
    std::ptr::eq(outer, inner) || outer.children().iter().any(|c| is_within(c, inner))
  }

  #[test]
  fn test_single_parse() {
    let g: Grammar = r#"
      S -> NP VP
      NP -> Det N
      VP -> V
      Det -> "the"
      N -> "dog"
      V -> "barked"
    "#
    .parse()
    .unwrap();

    let trees = g.parse(&words("the dog barked")).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(chunk_texts(&trees[0]), vec!["the dog"]);
  }

  #[test]
  fn test_attachment_ambiguity() {
    let g: Grammar = r#"
      S -> NP VP
      NP -> N | Det N | N PP | Det N PP
      VP -> V NP | V NP PP
      PP -> P NP
      Det -> "a"
      N -> "i" | "man" | "telescope"
      V -> "saw"
      P -> "with"
    "#
    .parse()
    .unwrap();

    let trees = g.parse(&words("i saw a man with a telescope")).unwrap();
    assert_eq!(trees.len(), 2);
    assert_ne!(trees[0], trees[1]);

    let mut chunkings = trees.iter().map(chunk_texts).collect::<Vec<_>>();
    chunkings.sort();
    assert_eq!(
      chunkings,
      vec![
        vec!["i", "a man", "a telescope"],
        vec!["i", "a telescope"],
      ]
    );
  }

  #[test]
  fn test_unknown_word() {
    let g = sentence_grammar();
    assert!(g.parse(&words("holmes sat on the xylophone")).unwrap().is_empty());
    assert!(!g.knows_word("xylophone"));
  }

  #[test]
  fn test_ungrammatical() {
    let g = sentence_grammar();
    assert!(g.parse(&words("the the the")).unwrap().is_empty());
    assert!(g.parse(&words("sat holmes pipe")).unwrap().is_empty());
  }

  #[test]
  fn test_empty_input() {
    let g = sentence_grammar();
    assert_eq!(g.parse(&[]).unwrap_err(), InputError::Empty);
  }

  #[test]
  fn test_nullable_noun_phrase() {
    let g: Grammar = r#"
      S -> NP V
      NP -> Det N |
      Det -> "the"
      N -> "dog"
      V -> "barked"
    "#
    .parse()
    .unwrap();

    let trees = g.parse(&["barked"]).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].to_string(), "(S\n  (NP)\n  (V barked))");
    assert!(chunk_texts(&trees[0]).is_empty());

    let trees = g.parse(&words("the dog barked")).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(chunk_texts(&trees[0]), vec!["the dog"]);
  }

  #[test]
  fn test_nullable_chain() {
    let g: Grammar = r#"
      S -> A "x"
      A -> B B
      B ->
    "#
    .parse()
    .unwrap();

    let trees = g.parse(&["x"]).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].to_string(), "(S\n  (A\n    (B)\n    (B))\n  x)");
  }

  #[test]
  fn test_sentence_grammar() {
    let g = sentence_grammar();

    let trees = g.parse(&words("holmes lit a pipe")).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(chunk_texts(&trees[0]), vec!["holmes", "a pipe"]);

    // `sat` may take an empty object, which must not show up as a chunk
    let trees = g.parse(&words("holmes sat")).unwrap();
    assert_eq!(trees.len(), 2);
    for tree in trees.iter() {
      assert_eq!(chunk_texts(tree), vec!["holmes"]);
    }
  }

  #[test]
  fn test_leaves_match_input() {
    let g = sentence_grammar();
    let sentences = [
      "holmes chuckled to himself",
      "my companion smiled an enigmatical smile",
      "i had a country walk on thursday and came home in a dreadful mess",
      "i had a little moist red paint in the palm of my hand",
      "we arrived the day before thursday",
    ];

    for sentence in sentences {
      let input = words(sentence);
      let trees = g.parse(&input).unwrap();
      assert!(!trees.is_empty(), "couldn't parse {:?}", sentence);

      for tree in trees.iter() {
        assert_eq!(tree.leaves(), input, "{}", tree);
        assert_eq!(tree.label().map(String::as_str), Some("S"));
        assert_eq!(tree.span(), (0, input.len()));
      }

      for (i, a) in trees.iter().enumerate() {
        assert!(!trees[i + 1..].contains(a), "duplicate tree {}", a);
      }
    }
  }

  #[test]
  fn test_chunks_never_nest() {
    let g = sentence_grammar();
    let input = words("i had a little moist red paint in the palm of my hand");

    for tree in g.parse(&input).unwrap().iter() {
      let found = np_chunks(tree);
      assert!(!found.is_empty());
      for (i, a) in found.iter().enumerate() {
        for (j, b) in found.iter().enumerate() {
          if i != j {
            assert!(!is_within(a, b), "{} contains {}", a, b);
          }
        }
        assert!(matches!(a, SynTree::Branch(c, _) if c.value == "NP"));
        assert!(!chunk_texts(a).is_empty());
      }
    }
  }

  #[test]
  fn test_parse_is_deterministic() {
    let g = sentence_grammar();
    let input = words("i had a little moist red paint in the palm of my hand");
    assert_eq!(g.parse(&input).unwrap(), g.parse(&input).unwrap());
  }

  #[test]
  fn test_shared_grammar_across_threads() {
    let g = sentence_grammar();
    let sentences = ["holmes sat", "holmes lit a pipe", "she smiled"];

    let counts = std::thread::scope(|scope| {
      let handles = sentences
        .iter()
        .map(|s| {
          let g = &g;
          scope.spawn(move || g.parse(&words(s)).unwrap().len())
        })
        .collect::<Vec<_>>();
      handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    assert!(counts.iter().all(|&c| c > 0));
  }
}
