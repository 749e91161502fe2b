use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
  pub name: String,
}

impl Symbol {
  pub fn new(name: String) -> Self {
    Self { name }
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// One element of a rule's right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Production {
  /// Matches exactly one input token equal to the word
  Terminal(String),
  Nonterminal(Symbol),
}

impl Production {
  pub fn symbol_str(&self) -> &str {
    match self {
      Self::Terminal(s) => s,
      Self::Nonterminal(s) => &s.name,
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Terminal(_))
  }

  pub fn is_nonterminal(&self) -> bool {
    matches!(self, Self::Nonterminal(_))
  }
}

impl fmt::Display for Production {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Terminal(s) => write!(f, "\"{}\"", s),
      Self::Nonterminal(s) => write!(f, "{}", s),
    }
  }
}

/// A single rewrite `symbol -> productions...`. An empty production list is an
/// epsilon rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
  pub symbol: Symbol,
  pub productions: Vec<Production>,
}

impl Rule {
  pub fn new(symbol: Symbol, productions: Vec<Production>) -> Self {
    Self {
      symbol,
      productions,
    }
  }

  pub fn len(&self) -> usize {
    self.productions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn symbol_str(&self) -> &str {
    &self.symbol.name
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ->", self.symbol)?;
    for p in self.productions.iter() {
      write!(f, " {}", p)?;
    }
    Ok(())
  }
}
