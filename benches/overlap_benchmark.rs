/// Benchmarks for crawling, chunking and common-line detection
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use repo_overlap::config::CrawlConfig;
use repo_overlap::{CorpusChunker, MemorySource, MemoryTree, RepositoryRef, TreeCrawler, common_lines};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

/// Helper to create a synthetic source file
fn module_source(i: usize) -> String {
    format!(
        r#"// Module {i}
export function handler{i}(req, res) {{
  const value = req.body.value * {};
  if (value > 100) {{
    return res.status(400).json({{ error: "too large" }});
  }}
  return res.json({{ id: {i}, value }});
}}
"#,
        i + 1
    )
}

fn corpus(file_count: usize) -> String {
    (0..file_count).map(module_source).collect()
}

fn tree(file_count: usize) -> MemoryTree {
    (0..file_count).fold(MemoryTree::new(), |tree, i| {
        tree.with_file(&format!("src/dir{}/module_{}.js", i % 10, i), &module_source(i))
    })
}

fn benchmark_crawling(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("crawling");

    for file_count in [10, 100, 500].iter() {
        let source = Arc::new(MemorySource::with_tree(tree(*file_count)));
        let crawler = TreeCrawler::new(source, &CrawlConfig::default()).unwrap();
        let repo = RepositoryRef::new("bench", "repo");

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_files", file_count)),
            file_count,
            |b, _| {
                b.iter(|| {
                    rt.block_on(async {
                        crawler
                            .crawl(black_box(&repo), &CancellationToken::new())
                            .await
                            .unwrap()
                    })
                });
            },
        );
    }

    group.finish();
}

fn benchmark_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunking");
    let text = corpus(2_000);

    for bound_size in [1_000, 30_000].iter() {
        let chunker = CorpusChunker::new(*bound_size).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("bound_{}", bound_size)),
            bound_size,
            |b, _| b.iter(|| chunker.chunk(black_box(&text))),
        );
    }

    group.finish();
}

fn benchmark_common_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("common_lines");
    let chunker = CorpusChunker::new(30_000).unwrap();

    for file_count in [100, 1_000].iter() {
        let a = chunker.chunk(&corpus(*file_count));
        // Half of b overlaps with a
        let b_text: String = (file_count / 2..file_count + file_count / 2)
            .map(module_source)
            .collect();
        let b = chunker.chunk(&b_text);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_files", file_count)),
            file_count,
            |bench, _| bench.iter(|| common_lines(black_box(&a), black_box(&b))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_crawling,
    benchmark_chunking,
    benchmark_common_lines
);
criterion_main!(benches);
