use criterion::{Criterion, black_box, criterion_group, criterion_main};

use npchunk::chunk::np_chunks;
use npchunk::{Grammar, SENTENCE_GRAMMAR};

fn parse(g: &Grammar, input: &[&str]) -> usize {
  g.parse(input)
    .map(|trees| trees.iter().map(|t| np_chunks(t).len()).sum())
    .unwrap_or(0)
}

fn criterion_benchmark(c: &mut Criterion) {
  let grammar = SENTENCE_GRAMMAR.parse::<Grammar>().unwrap();
  let simple_input = "holmes lit a pipe".split(' ').collect::<Vec<_>>();
  let complex_input = "i had a little moist red paint in the palm of my hand"
    .split(' ')
    .collect::<Vec<_>>();

  c.bench_function("parse simple", |b| {
    b.iter(|| parse(black_box(&grammar), black_box(&simple_input)))
  });

  c.bench_function("parse ambiguous", |b| {
    b.iter(|| parse(black_box(&grammar), black_box(&complex_input)))
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
