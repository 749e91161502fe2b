use std::io;

/// Problems found while reading or validating a grammar. These are fatal:
/// nothing can be parsed without a well-formed grammar.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
  #[error("line {line}: {message}")]
  Syntax { line: usize, message: String },

  #[error("empty ruleset")]
  Empty,

  #[error("start symbol {0} has no productions")]
  MissingStart(String),

  #[error("nonterminal {symbol} is used in `{rule}` but never defined")]
  UndefinedNonterminal { symbol: String, rule: String },

  #[error("couldn't read grammar: {0}")]
  Io(#[from] io::Error),
}

/// Problems with a token sequence handed to the parser. Reported per sentence,
/// the grammar stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
  #[error("cannot parse an empty sentence")]
  Empty,

  #[error("token {index} is an empty string")]
  EmptyToken { index: usize },
}
