use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

/// A parse tree. A `Branch` with no children is a nonterminal that was
/// realized by an epsilon rule and covers no input.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// The symbol of a branch, None for leaves.
  pub fn label(&self) -> Option<&T> {
    self.get_branch().map(|(c, _)| &c.value)
  }

  pub fn children(&self) -> &[SynTree<T, U>] {
    match self {
      Self::Branch(_, cs) => cs,
      Self::Leaf(_) => &[],
    }
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  /// Leaf values, left to right.
  pub fn leaves(&self) -> Vec<&U> {
    let mut leaves = Vec::new();
    self.collect_leaves(&mut leaves);
    leaves
  }

  fn collect_leaves<'t>(&'t self, leaves: &mut Vec<&'t U>) {
    match self {
      Self::Leaf(w) => leaves.push(&w.value),
      Self::Branch(_, children) => {
        for child in children.iter() {
          child.collect_leaves(leaves);
        }
      }
    }
  }

  /// Whether the subtree covers no input at all.
  pub fn is_empty(&self) -> bool {
    match self {
      Self::Leaf(_) => false,
      Self::Branch(_, children) => children.iter().all(Self::is_empty),
    }
  }
}

impl<T, U> SynTree<T, U>
where
  U: AsRef<str>,
{
  /// The covered words joined by spaces.
  pub fn text(&self) -> String {
    self
      .leaves()
      .into_iter()
      .map(AsRef::as_ref)
      .collect::<Vec<&str>>()
      .join(" ")
  }
}

impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(w) => write!(f, "{}", w.value),
      Self::Branch(c, ts) => {
        write!(f, "({}", c.value)?;
        if ts.iter().all(|t| t.is_leaf()) || ts.len() == 1 {
          for t in ts.iter() {
            write!(f, " {}", t)?;
          }
        } else {
          for t in ts.iter() {
            let fmt = format!("{}", t);
            for line in fmt.lines() {
              write!(f, "\n  {}", line)?;
            }
          }
        }
        write!(f, ")")
      }
    }
  }
}
