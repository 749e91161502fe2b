use std::fs;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use npchunk::chunk::np_chunks;
use npchunk::preprocess::preprocess;
use npchunk::{Err, Grammar, SENTENCE_GRAMMAR};

/// Parse a sentence and list its noun phrase chunks
#[derive(Parser)]
#[command(version, about)]
struct Cli {
  /// File containing the sentence (prompts for one when omitted)
  file: Option<PathBuf>,

  /// Grammar file to use instead of the built-in sentence grammar
  #[arg(short, long, value_name = "FILE")]
  grammar: Option<PathBuf>,

  /// Print the parse chart
  #[arg(short, long)]
  chart: bool,
}

fn read_sentence() -> Result<String, Err> {
  print!("Sentence: ");
  io::stdout().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;
  Ok(input)
}

fn parse(g: &Grammar, sentence: &str, print_chart: bool) {
  let words = preprocess(sentence);
  let words = words.iter().map(String::as_str).collect::<Vec<_>>();

  if print_chart {
    if let Ok(chart) = g.parse_chart(&words) {
      println!("chart:\n{}", chart);
    }
  }

  let trees = match g.parse(&words) {
    Ok(trees) => trees,
    Err(e) => {
      println!("{}", e);
      return;
    }
  };

  if trees.is_empty() {
    let unknown = words.iter().filter(|w| !g.knows_word(w)).collect::<Vec<_>>();
    if !unknown.is_empty() {
      tracing::info!("words not in the grammar: {:?}", unknown);
    }
    println!("Could not parse sentence.");
    return;
  }

  for tree in trees.iter() {
    println!("{}", tree);
    println!();
    println!("Noun Phrase Chunks");
    for np in np_chunks(tree) {
      println!("{}", np.text());
    }
    println!();
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let g = match &cli.grammar {
    Some(path) => Grammar::read_from_file(path)?,
    None => SENTENCE_GRAMMAR.parse::<Grammar>()?,
  };

  let sentence = match &cli.file {
    Some(path) => fs::read_to_string(path)?,
    None => read_sentence()?,
  };

  parse(&g, &sentence, cli.chart);
  Ok(())
}
