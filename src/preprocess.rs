//! Turning raw sentence text into parser input.

/// Splits `sentence` into runs of word characters and runs of punctuation,
/// keeps the runs that start with a letter, and lowercases them.
///
/// ```
/// assert_eq!(
///   npchunk::preprocess::preprocess("Holmes sat in the red armchair, didn't he?"),
///   vec!["holmes", "sat", "in", "the", "red", "armchair", "didn", "t", "he"],
/// );
/// ```
pub fn preprocess(sentence: &str) -> Vec<String> {
  regex_static!(WORD_OR_PUNCT, r"\w+|[^\w\s]+");

  WORD_OR_PUNCT
    .find_iter(sentence)
    .map(|m| m.as_str())
    .filter(|token| token.starts_with(|c: char| c.is_ascii_alphabetic()))
    .map(str::to_lowercase)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_drops_punctuation() {
    assert_eq!(preprocess("Holmes sat."), vec!["holmes", "sat"]);
    assert_eq!(
      preprocess("  I had a little moist red paint in the palm of my hand.\n"),
      vec!["i", "had", "a", "little", "moist", "red", "paint", "in", "the", "palm", "of", "my", "hand"]
    );
  }

  #[test]
  fn test_drops_tokens_not_starting_with_a_letter() {
    assert_eq!(preprocess("We arrived 2 days -- before Thursday!"), vec!["we", "arrived", "days", "before", "thursday"]);
    assert_eq!(preprocess("3rd_time _under score"), vec!["score"]);
  }

  #[test]
  fn test_nothing_left() {
    assert!(preprocess("").is_empty());
    assert!(preprocess("... 42 !?").is_empty());
  }
}
