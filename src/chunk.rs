//! Noun phrase chunking.
//!
//! A chunk is an `NP` subtree that has no other `NP` anywhere below it. Chunks
//! come out in left-to-right order and never overlap: once a node is taken as
//! a chunk, nothing inside it is looked at again.
//!
//! `NP` nodes realized by an epsilon rule cover no words, so they are treated
//! like any other transparent node. They are never chunks, and they don't stop
//! an enclosing `NP` from being one.

use crate::syntree::SynTree;

pub const NOUN_PHRASE: &str = "NP";

/// Minimal noun phrases of `tree`, in order.
pub fn np_chunks<U>(tree: &SynTree<String, U>) -> Vec<&SynTree<String, U>> {
  chunks(tree, NOUN_PHRASE)
}

/// Minimal subtrees labelled `label`, in order.
pub fn chunks<'t, U>(tree: &'t SynTree<String, U>, label: &str) -> Vec<&'t SynTree<String, U>> {
  let mut found = Vec::new();
  collect_chunks(tree, label, &mut found);
  found
}

fn collect_chunks<'t, U>(node: &'t SynTree<String, U>, label: &str, found: &mut Vec<&'t SynTree<String, U>>) {
  if is_phrase(node, label) && !node.children().iter().any(|c| contains_phrase(c, label)) {
    found.push(node);
    return;
  }

  // either not a phrase, or a phrase with nested phrases that need drilling into
  for child in node.children() {
    collect_chunks(child, label, found);
  }
}

fn is_phrase<U>(node: &SynTree<String, U>, label: &str) -> bool {
  node.label().is_some_and(|l| l == label) && !node.is_empty()
}

fn contains_phrase<U>(node: &SynTree<String, U>, label: &str) -> bool {
  is_phrase(node, label) || node.children().iter().any(|c| contains_phrase(c, label))
}
