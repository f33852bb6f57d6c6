use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dtps_selftest::rng::seeded;
use dtps_selftest::*;

fn bench_digest(c: &mut Criterion) {
    let data = vec![0xA5u8; 512 * 512 * 4];

    c.bench_function("compute_digest_1mib", |b| {
        b.iter(|| black_box(compute_digest(black_box(&data))))
    });
}

fn bench_transform(c: &mut Criterion) {
    let mut rng = seeded(42);
    let mut ctx = LatticeContext::new(128, 256).unwrap();
    ctx.fill_basis(BasisFill::Random, &mut rng);
    let mut workspace = TransformWorkspace::for_context(&ctx).unwrap();

    c.bench_function("lattice_transform_128", |b| {
        b.iter(|| black_box(test_lattice_transform(&ctx, &mut workspace, &mut rng).unwrap()))
    });

    c.bench_function("generate_certificate", |b| {
        b.iter(|| black_box(generate_certificate(&ctx, &mut rng).unwrap()))
    });
}

fn bench_parallel(c: &mut Criterion) {
    c.bench_function("run_benchmark_64x16", |b| {
        b.iter(|| black_box(run_benchmark(64, 16, 7).unwrap()))
    });
}

criterion_group!(benches, bench_digest, bench_transform, bench_parallel);
criterion_main!(benches);
