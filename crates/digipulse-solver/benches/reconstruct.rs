//! Benchmarks for reconstruction and the reference integral.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use digipulse_core::PulseParameters;
use digipulse_solver::{ReconstructionKind, reference_integral, sample};

fn params() -> PulseParameters {
    PulseParameters::from_rise_time(0.6, 3.0e-9).unwrap()
}

fn bench_reconstruct(c: &mut Criterion) {
    let p = params();
    let mut group = c.benchmark_group("reconstruct");

    for n in [26, 104, 416] {
        let samples = sample(-5.0 * p.sigma, 7.0 * p.tau, n, &p).unwrap();
        for kind in [ReconstructionKind::Linear, ReconstructionKind::CubicSpline] {
            group.bench_with_input(BenchmarkId::new(kind.label(), n), &samples, |bencher, s| {
                bencher.iter(|| kind.reconstruct(black_box(s)).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_reference_integral(c: &mut Criterion) {
    let p = params();
    c.bench_function("reference_integral", |bencher| {
        bencher.iter(|| {
            reference_integral(black_box(&p), black_box(-5.0 * p.sigma), 7.0 * p.tau).unwrap()
        });
    });
}

criterion_group!(benches, bench_reconstruct, bench_reference_integral);
criterion_main!(benches);
