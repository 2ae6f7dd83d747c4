use criterion::{criterion_group, criterion_main, Criterion};
use sere::{lexer, token::Token};
use std::hint::black_box;

static INPUT: &str = include_str!("../../demos/big.sere");

fn lex(input: &str, tokens: &mut Vec<Token>) {
    tokens.clear();
    lexer::lex(input, tokens);
    black_box(tokens.len());
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY * 2);

    c.bench_function("lexer", |b| {
        b.iter(|| {
            black_box(lex(black_box(INPUT), &mut tokens));
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
