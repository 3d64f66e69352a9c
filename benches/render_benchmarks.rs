use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use markdown_debug::RendererHandle;
use markdown_debug::configuration::MarkdownOptions;
use markdown_debug::renderer::options::RenderOptions;

/// Generate Markdown content of different patterns for benchmarking
fn generate_markdown(sections: usize, pattern: &str) -> String {
    let mut content = String::new();

    for i in 0..sections {
        match pattern {
            "prose" => content.push_str(&format!(
                "## Section {}\n\nSome *emphasis*, some **strong** text and a [link](https://example.com/{}).\n\n",
                i, i
            )),
            "lists" => {
                content.push_str(&format!("- item {}\n  - nested {}\n", i, i));
                content.push_str(&format!("{}. ordered\n\n", i + 1));
            }
            "tables" => {
                if i % 10 == 0 {
                    content.push_str("\n| name | value |\n|------|-------|\n");
                }
                content.push_str(&format!("| row {} | {} |\n", i, i * 3));
            }
            "quotes" => content.push_str(&format!(
                "\"Quoted {}\" and 'single {}' -- with dashes...\n\n",
                i, i
            )),
            _ => panic!("unknown pattern {}", pattern),
        }
    }

    content
}

fn handle(quotes: &str) -> RendererHandle {
    let options = MarkdownOptions {
        quotes: quotes.to_string(),
        ..MarkdownOptions::default()
    };
    RendererHandle::new(RenderOptions::from_configuration(&options))
}

fn bench_patterns(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");
    let handle = handle("\"\"''");

    let mut group = c.benchmark_group("render_patterns");
    for pattern in ["prose", "lists", "tables", "quotes"] {
        let content = generate_markdown(200, pattern);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("render", pattern), &content, |b, content| {
            b.iter(|| runtime.block_on(handle.render(black_box(content))))
        });
    }
    group.finish();
}

fn bench_document_sizes(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");
    let handle = handle("\"\"''");

    let mut group = c.benchmark_group("render_sizes");
    for sections in [10, 100, 1000] {
        let content = generate_markdown(sections, "prose");
        group.throughput(Throughput::Elements(sections as u64));
        group.bench_with_input(
            BenchmarkId::new("prose_sections", sections),
            &content,
            |b, content| b.iter(|| runtime.block_on(handle.render(black_box(content)))),
        );
    }
    group.finish();
}

fn bench_custom_quotes(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");
    let content = generate_markdown(500, "quotes");

    let mut group = c.benchmark_group("custom_quotes");
    group.throughput(Throughput::Bytes(content.len() as u64));
    for (name, quotes) in [("straight", "\"\"''"), ("guillemets", "«»‹›")] {
        let handle = handle(quotes);
        group.bench_with_input(BenchmarkId::new("render", name), &content, |b, content| {
            b.iter(|| runtime.block_on(handle.render(black_box(content))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_patterns,
    bench_document_sizes,
    bench_custom_quotes
);
criterion_main!(benches);
