use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vast_bitmap::{and, or, rank, select, Bitmap};

fn sparse_bitmap(size: u64, stride: u64) -> Bitmap {
    let mut bm = Bitmap::new();
    let mut i = 0;
    while i < size {
        let run = stride.min(size - i);
        bm.append_bits(i % (stride * 2) < stride, run);
        i += run;
    }
    bm
}

fn combine_throughput(c: &mut Criterion) {
    let a = sparse_bitmap(1_000_000, 64);
    let b = sparse_bitmap(1_000_000, 97);

    let mut group = c.benchmark_group("bitmap_combine");
    group.throughput(Throughput::Elements(1_000_000));

    group.bench_function("and_1m", |bch| bch.iter(|| and(black_box(&a), black_box(&b))));
    group.bench_function("or_1m", |bch| bch.iter(|| or(black_box(&a), black_box(&b))));

    group.finish();
}

fn rank_select_throughput(c: &mut Criterion) {
    let bm = sparse_bitmap(1_000_000, 64);

    let mut group = c.benchmark_group("rank_select");

    group.bench_function("rank_mid", |bch| {
        bch.iter(|| rank(black_box(&bm), black_box(500_000), true))
    });

    group.bench_function("select_mid", |bch| {
        bch.iter(|| select(black_box(&bm), black_box(250_000), true))
    });

    group.finish();
}

fn append_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    group.throughput(Throughput::Elements(1_000_000));

    group.bench_function("append_bits_runs", |bch| {
        bch.iter(|| sparse_bitmap(black_box(1_000_000), black_box(64)))
    });

    group.finish();
}

criterion_group!(benches, combine_throughput, rank_select_throughput, append_throughput);
criterion_main!(benches);
