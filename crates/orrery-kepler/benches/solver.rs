use criterion::{Criterion, black_box, criterion_group, criterion_main};
use orrery_kepler::*;

fn bench_elliptic(c: &mut Criterion) {
    let solver = KeplerSolver::default();
    let conic = Conic::Elliptic { eccentricity: 0.4 };
    c.bench_function("solve_elliptic", |bencher| {
        bencher.iter(|| solver.eccentric_anomaly(black_box(2.1), black_box(conic)))
    });
}

fn bench_high_eccentricity(c: &mut Criterion) {
    let solver = KeplerSolver::default();
    let conic = Conic::Elliptic { eccentricity: 0.97 };
    c.bench_function("solve_elliptic_e097", |bencher| {
        bencher.iter(|| solver.eccentric_anomaly(black_box(0.05), black_box(conic)))
    });
}

fn bench_parabolic(c: &mut Criterion) {
    let solver = KeplerSolver::default();
    c.bench_function("solve_parabolic", |bencher| {
        bencher.iter(|| solver.eccentric_anomaly(black_box(3.0), black_box(Conic::Parabolic)))
    });
}

fn bench_hyperbolic(c: &mut Criterion) {
    let solver = KeplerSolver::default();
    let conic = Conic::Hyperbolic { eccentricity: 2.5 };
    c.bench_function("solve_hyperbolic", |bencher| {
        bencher.iter(|| solver.eccentric_anomaly(black_box(-12.0), black_box(conic)))
    });
}

fn bench_full_state(c: &mut Criterion) {
    let solver = KeplerSolver::default();
    let conic = Conic::Elliptic { eccentricity: 0.4 };
    let orientation = orbital_orientation(30.0, 45.0, 10.0);
    let l = conic.semi_latus_rectum(1.0);
    c.bench_function("full_state_elliptic", |bencher| {
        bencher.iter(|| {
            let ea = solver.eccentric_anomaly(black_box(1.3), conic).unwrap_or(0.0);
            let v = true_anomaly(ea, conic);
            let r = radius(l, 0.4, v);
            let p = orientation * position(r, v);
            let vel = orientation * velocity(conic, 1.0, r, 0.6, ea, v);
            black_box((p, vel))
        })
    });
}

criterion_group!(
    benches,
    bench_elliptic,
    bench_high_eccentricity,
    bench_parabolic,
    bench_hyperbolic,
    bench_full_state,
);
criterion_main!(benches);
