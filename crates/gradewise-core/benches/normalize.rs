use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradewise_core::normalize::Normalizer;

const SHORT: &str = "list() or using square brackets []";
const LONG: &str = "It is an infrastructure-less network where all nodes are potentially \
mobile and communicate directly with each other, forwarding packets on behalf of \
neighbours that are out of radio range of the destination.";

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let stemming = Normalizer::english();
    let plain = Normalizer::english().with_stemming(false);

    group.bench_function("short/stemmed", |b| {
        b.iter(|| stemming.normalize(black_box(SHORT)))
    });

    group.bench_function("long/stemmed", |b| {
        b.iter(|| stemming.normalize(black_box(LONG)))
    });

    group.bench_function("long/unstemmed", |b| {
        b.iter(|| plain.normalize(black_box(LONG)))
    });

    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
