use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use guildxp::progression::{calculate_level, calculate_level_progress, LevelCurve};

fn bench_calculate_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_level");
    for xp in [0i64, 1_000, 1_000_000, 1_000_000_000, i64::MAX] {
        group.bench_with_input(BenchmarkId::from_parameter(xp), &xp, |b, &xp| {
            b.iter(|| calculate_level(black_box(xp)))
        });
    }
    group.finish();
}

fn bench_progress(c: &mut Criterion) {
    let curve = LevelCurve::DEFAULT;
    let level = curve.level_for_xp(250_000);
    c.bench_function("calculate_level_progress", |b| {
        b.iter(|| calculate_level_progress(black_box(250_000), black_box(level as i64)))
    });
}

criterion_group!(benches, bench_calculate_level, bench_progress);
criterion_main!(benches);
