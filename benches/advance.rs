use criterion::{criterion_group, criterion_main, Criterion};
use driftview::particles::ParticleCloud;

fn bench_advance(c: &mut Criterion) {
    // Reference cloud size and jitter.
    let mut cloud = ParticleCloud::spawn_seeded(10_000, 0.01, 42);

    c.bench_function("advance_10k", |b| b.iter(|| cloud.advance()));
}

criterion_group!(benches, bench_advance);
criterion_main!(benches);
