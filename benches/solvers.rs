use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use numsolve::linalg::{
    gauss_solve, jacobi, seidel, thomas_solve, IterativeSettings, LuDecomposition, Pivoting,
    QrDecomposition,
};
use numsolve::optim::{fibonacci, golden_section, SearchSettings};
use numsolve::quad::{rectangle, simpson, trapezoid, QuadSettings};
use numsolve::{Matrix, Vector};

// ---------------------------------------------------------------------------
// Helpers: strictly diagonally dominant systems so every solver converges
// ---------------------------------------------------------------------------

fn dominant_system(n: usize, seed: u64) -> (Matrix<f64>, Vector<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut a = Matrix::from_fn(n, n, |_, _| rng.gen_range(-1.0_f64..1.0));
    for i in 0..n {
        let off: f64 = a.row(i).iter().map(|x| x.abs()).sum();
        a[(i, i)] = off + 1.0;
    }
    let b = Vector::from_vec((0..n).map(|_| rng.gen_range(-1.0..1.0)).collect());
    (a, b)
}

fn tridiagonal_system(n: usize) -> (Matrix<f64>, Vector<f64>) {
    let a = Matrix::from_fn(n, n, |i, j| match i.abs_diff(j) {
        0 => 4.0,
        1 => -1.0,
        _ => 0.0,
    });
    let b = Vector::from_vec((0..n).map(|i| (i % 7) as f64).collect());
    (a, b)
}

// ---------------------------------------------------------------------------
// Linear systems
// ---------------------------------------------------------------------------

fn direct(c: &mut Criterion) {
    let mut g = c.benchmark_group("direct");
    for n in [16, 64, 128] {
        let (a, b) = dominant_system(n, n as u64);
        for p in [Pivoting::None, Pivoting::PartialByColumn, Pivoting::Complete] {
            g.bench_with_input(BenchmarkId::new(format!("gauss_{p:?}"), n), &n, |bench, _| {
                bench.iter(|| gauss_solve(std::hint::black_box(&a), std::hint::black_box(&b), p))
            });
        }
        g.bench_with_input(BenchmarkId::new("lu", n), &n, |bench, _| {
            bench.iter(|| LuDecomposition::new(std::hint::black_box(&a)).and_then(|lu| lu.solve(&b)))
        });
        g.bench_with_input(BenchmarkId::new("qr", n), &n, |bench, _| {
            bench.iter(|| QrDecomposition::new(std::hint::black_box(&a)).and_then(|qr| qr.solve(&b)))
        });

        let (t, tb) = tridiagonal_system(n);
        g.bench_with_input(BenchmarkId::new("thomas", n), &n, |bench, _| {
            bench.iter(|| thomas_solve(std::hint::black_box(&t), std::hint::black_box(&tb)))
        });
    }
    g.finish();
}

fn iterative(c: &mut Criterion) {
    let mut g = c.benchmark_group("iterative");
    let s = IterativeSettings::default();
    for n in [16, 64] {
        let (a, b) = dominant_system(n, 99);
        g.bench_with_input(BenchmarkId::new("jacobi", n), &n, |bench, _| {
            bench.iter(|| jacobi(std::hint::black_box(&a), &b, None, &s))
        });
        g.bench_with_input(BenchmarkId::new("seidel", n), &n, |bench, _| {
            bench.iter(|| seidel(std::hint::black_box(&a), &b, None, &s))
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Scalar search and quadrature
// ---------------------------------------------------------------------------

fn scalar(c: &mut Criterion) {
    let f = |x: f64| (x - 1.0).powi(2) + (x + 5.0).powi(2);
    let s = SearchSettings::default();
    let q = QuadSettings::default();

    let mut g = c.benchmark_group("scalar");
    g.bench_function("golden_section", |b| {
        b.iter(|| golden_section(f, std::hint::black_box(-10.0), 10.0, &s))
    });
    g.bench_function("fibonacci", |b| {
        b.iter(|| fibonacci(f, std::hint::black_box(-10.0), 10.0, &s))
    });
    g.bench_function("rectangle", |b| {
        b.iter(|| rectangle(f64::sin, std::hint::black_box(0.0), 3.0, &q))
    });
    g.bench_function("trapezoid", |b| {
        b.iter(|| trapezoid(f64::sin, std::hint::black_box(0.0), 3.0, &q))
    });
    g.bench_function("simpson", |b| {
        b.iter(|| simpson(f64::sin, std::hint::black_box(0.0), 3.0, &q))
    });
    g.finish();
}

criterion_group!(benches, direct, iterative, scalar);
criterion_main!(benches);
