//! Lock file parsing benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nodext_benchmarks::{criterion_config, lock_file_document};
use nodext_config::json::parse_lock_graph;

fn bench_lock_file_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock_file_parsing");

    for (layers, width) in [(4, 25), (8, 50), (10, 100)] {
        let document = lock_file_document(layers, width);
        group.throughput(Throughput::Bytes(document.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("packages", layers * width),
            &document,
            |b, document| b.iter(|| black_box(parse_lock_graph("package-lock.json", document).unwrap())),
        );
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_lock_file_parsing
}
criterion_main!(benches);
