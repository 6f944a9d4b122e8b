//! Benchmarks for markstream rendering and streaming.
//!
//! Run with: cargo bench
//!
//! These benchmarks render synthetic markdown documents of growing size.

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use markstream::{
    DocumentNode, IntervalScheduler, Markdown, MarkdownParser, MarkdownSession, MarkdownStream,
    ParserOptions, PulldownParser, Timeline,
};

/// Creates a synthetic document with the given number of sections.
fn create_test_markdown(sections: usize) -> String {
    let mut content = String::new();
    for i in 0..sections {
        content.push_str(&format!("## Section {}\n\n", i + 1));
        content.push_str("Some **bold** and *italic* text with `code` and a [link](https://example.com).\n\n");
        content.push_str("- first item\n- [x] done item\n- third item\n\n");
        content.push_str("| key | value |\n|:----|------:|\n| a | 1 |\n| b | 2 |\n\n");
        content.push_str("```rust\nfn main() {}\n```\n\n");
    }
    content
}

/// Benchmark one-shot rendering at various sizes.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let markdown = Markdown::new();
    let parser = PulldownParser::new();

    for sections in [1, 10, 50].iter() {
        let text = create_test_markdown(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| markdown.render(black_box(&text), &parser));
        });
    }

    group.finish();
}

/// Benchmark rendering of an already parsed tree.
fn bench_render_tree(c: &mut Criterion) {
    let markdown = Markdown::new();
    let text = create_test_markdown(10);
    let tree: DocumentNode = match PulldownParser::new().parse(&text, &ParserOptions::default()) {
        Ok(tree) => tree,
        Err(e) => panic!("benchmark input failed to parse: {}", e),
    };

    c.bench_function("render_tree_10_sections", |b| {
        b.iter(|| markdown.render_tree(black_box(&tree)));
    });
}

/// Benchmark a token stream flushed every window.
fn bench_streaming(c: &mut Criterion) {
    let text = create_test_markdown(5);
    let tokens: Vec<String> = text.split_inclusive(' ').map(str::to_string).collect();

    c.bench_function("stream_5_sections", |b| {
        b.iter(|| {
            let session = MarkdownSession::new();
            let scheduler = Rc::new(IntervalScheduler::default());
            let stream = MarkdownStream::new(
                &session,
                scheduler.clone(),
                Markdown::new(),
                PulldownParser::new(),
            );
            for (i, token) in tokens.iter().enumerate() {
                session.append(token);
                if i % 8 == 7 {
                    scheduler.advance(scheduler.interval());
                }
            }
            scheduler.advance(scheduler.interval());
            black_box(stream.revision())
        });
    });
}

/// Benchmark timeline resolution.
fn bench_timeline(c: &mut Criterion) {
    let monotonic = Timeline::new((0..10_000).map(|i| (i as f64, i as f64 * 250.0)));
    let shuffled = Timeline::new((0..10_000).map(|i| (i as f64, ((i * 7919) % 10_000) as f64)));

    c.bench_function("resolve_monotonic", |b| {
        b.iter(|| monotonic.resolve(black_box(1_234_567.0)));
    });
    c.bench_function("resolve_non_monotonic", |b| {
        b.iter(|| shuffled.resolve(black_box(5_000.0)));
    });
}

criterion_group!(
    benches,
    bench_render,
    bench_render_tree,
    bench_streaming,
    bench_timeline,
);
criterion_main!(benches);
