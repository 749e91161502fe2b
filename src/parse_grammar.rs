//! Line-oriented parsing of grammar text
//!
//! ```text
//! %start S                # optional, defaults to the first rule's symbol
//! S -> NP VP | NP VP Conj VP
//! NP -> N | Det N |       # trailing `|` adds an empty alternative
//! N -> "holmes" | "pipe"  # quoted words are terminals
//! ```
use std::str::FromStr;

use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::rules::{Production, Rule, Symbol};

impl FromStr for Grammar {
  type Err = GrammarError;

  /// Parses a grammar from a string. Assumes the first rule's symbol
  /// is the start symbol unless a `%start` line says otherwise.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (start, rules) = parse_rules(s)?;
    match start.or_else(|| rules.first().map(|r| r.symbol_str().to_string())) {
      Some(start) => Self::new(start, rules),
      None => Err(GrammarError::Empty),
    }
  }
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = Result<(T, &'a str), String>;

/// Try to consume a regex, returning None if it doesn't match
fn optional_re<'a>(re: &'static regex::Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  match re.find(s) {
    Some(m) if m.start() == 0 => (Some(m.as_str()), &s[m.end()..]),
    _ => (None, s),
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static regex::Regex, s: &'a str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    Err(format!("couldn't match {} at {:?}", re, s))
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<'_, Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// Skips spaces and tabs, plus a trailing `#` comment
fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE, r"[ \t]+");
  let s = optional_re(&*WHITESPACE, s).1;
  if s.starts_with('#') { "" } else { s }
}

/// Tries to parse a nonterminal name made of letters, numbers, - and _
fn parse_name(s: &str) -> ParseResult<'_, &str> {
  regex_static!(NAME, r"[a-zA-Z_][a-zA-Z0-9\-_]*");
  needed_re(&*NAME, s).map_err(|err| format!("name: {}", err))
}

/// Parses a single or double quoted terminal word
fn parse_literal(s: &str) -> ParseResult<'_, String> {
  regex_static!(LITERAL, r#"^(?:"([^"]*)"|'([^']*)')"#);
  let caps = LITERAL
    .captures(s)
    .ok_or_else(|| format!("unterminated literal at {:?}", s))?;
  let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
  let word = caps
    .get(1)
    .or_else(|| caps.get(2))
    .map(|m| m.as_str())
    .unwrap_or("");

  if word.is_empty() {
    Err(format!("empty terminal literal at {:?}", s))
  } else {
    Ok((word.to_string(), &s[whole..]))
  }
}

fn parse_production(s: &str) -> ParseResult<'_, Production> {
  if s.starts_with('"') || s.starts_with('\'') {
    let (word, s) = parse_literal(s)?;
    Ok((Production::Terminal(word), s))
  } else {
    let (name, s) = parse_name(s).map_err(|e| format!("symbol: {}", e))?;
    Ok((Production::Nonterminal(Symbol::new(name.to_string())), s))
  }
}

/// `|`-separated alternatives up to the end of the line. An alternative with
/// nothing in it is an epsilon rule.
fn parse_alternatives(s: &str) -> Result<Vec<Vec<Production>>, String> {
  let mut alternatives = vec![Vec::new()];
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    if rem.is_empty() {
      return Ok(alternatives);
    }
    if let (Some(_), s) = optional_char('|', rem) {
      alternatives.push(Vec::new());
      rem = s;
      continue;
    }
    let (prod, s) = parse_production(rem)?;
    // alternatives always holds at least the one we started with
    if let Some(current) = alternatives.last_mut() {
      current.push(prod);
    }
    rem = s;
  }
}

/// Symbol, arrow, alternatives
fn parse_rule(s: &str) -> Result<Vec<Rule>, String> {
  #![allow(clippy::trivial_regex)]
  regex_static!(ARROW, "->");

  let (name, s) = parse_name(s).map_err(|e| format!("rule symbol: {}", e))?;
  let s = skip_whitespace(s);
  let (_, s) = needed_re(&*ARROW, s).map_err(|e| format!("rule arrow: {}", e))?;

  let symbol = Symbol::new(name.to_string());
  Ok(
    parse_alternatives(s)?
      .into_iter()
      .map(|productions| Rule::new(symbol.clone(), productions))
      .collect(),
  )
}

/// `%start NAME`
fn parse_directive(s: &str) -> Result<String, String> {
  regex_static!(START, "%start");

  let (_, s) = needed_re(&*START, s).map_err(|e| format!("directive: {}", e))?;
  let s = skip_whitespace(s);
  let (name, s) = parse_name(s).map_err(|e| format!("start symbol: {}", e))?;
  if skip_whitespace(s).is_empty() {
    Ok(name.to_string())
  } else {
    Err(format!("trailing input after start symbol: {:?}", s))
  }
}

/// Parses grammar text into an optional explicit start symbol and the rules in
/// order of appearance.
pub fn parse_rules(s: &str) -> Result<(Option<String>, Vec<Rule>), GrammarError> {
  let mut start = None;
  let mut rules = Vec::new();

  for (idx, line) in s.lines().enumerate() {
    let syntax = |message| GrammarError::Syntax {
      line: idx + 1,
      message,
    };

    let line = skip_whitespace(line);
    if line.is_empty() {
      continue;
    }

    if line.starts_with('%') {
      start = Some(parse_directive(line).map_err(syntax)?);
    } else {
      rules.extend(parse_rule(line).map_err(syntax)?);
    }
  }

  Ok((start, rules))
}
