//! End-to-end checks across the public API.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use numsolve::linalg::{
    gauss_solve, jacobi, seidel, strassen_with, thomas_solve, winograd, IterativeSettings,
    LuDecomposition, Pivoting, QrDecomposition, QrMethod, QrSettings, StrassenSettings,
    StrassenVariant,
};
use numsolve::optim::{fibonacci, golden_section, svenn, SearchSettings, SvennSettings};
use numsolve::quad::{rectangle, simpson, trapezoid, QuadSettings};
use numsolve::{ErrorKind, Matrix, Vector};

fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff {})",
        msg,
        a,
        b,
        (a - b).abs()
    );
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_matrix(rng: &mut ChaCha8Rng, n: usize) -> Matrix<f64> {
    Matrix::from_fn(n, n, |_, _| rng.gen_range(-1.0..1.0))
}

// ── Linear systems ───────────────────────────────────────────────────

#[test]
fn concrete_system_all_direct_solvers() {
    init_logging();
    let a = Matrix::from_rows(&[[4.0_f64, 1.0], [2.0, 3.0]]);
    let b = Vector::from_slice(&[1.0, 2.0]);
    let householder = QrSettings {
        method: QrMethod::Householder,
        ..QrSettings::default()
    };

    let mut xs = vec![
        ("thomas", thomas_solve(&a, &b).unwrap()),
        ("lu", LuDecomposition::new(&a).unwrap().solve(&b).unwrap()),
        ("qr mgs", QrDecomposition::new(&a).unwrap().solve(&b).unwrap()),
        (
            "qr householder",
            QrDecomposition::with_settings(&a, &householder)
                .unwrap()
                .solve(&b)
                .unwrap(),
        ),
        ("matrix solve", a.solve(&b).unwrap()),
    ];
    for p in [
        Pivoting::None,
        Pivoting::PartialByColumn,
        Pivoting::PartialByRow,
        Pivoting::Complete,
    ] {
        xs.push(("gauss", gauss_solve(&a, &b, p).unwrap()));
    }
    for (name, x) in xs {
        assert_near(x[0], 0.1, 1e-6, name);
        assert_near(x[1], 0.6, 1e-6, name);
    }
}

#[test]
fn zero_row_is_singular() {
    let a = Matrix::from_rows(&[[2.0_f64, 1.0, 0.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
    let b = Vector::from_slice(&[1.0, 2.0, 3.0]);
    for p in [
        Pivoting::None,
        Pivoting::PartialByColumn,
        Pivoting::PartialByRow,
        Pivoting::Complete,
    ] {
        let err = gauss_solve(&a, &b, p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Singularity, "{p:?}");
    }
    assert_eq!(LuDecomposition::new(&a).unwrap_err().kind(), ErrorKind::Singularity);
    assert_eq!(a.det().unwrap(), 0.0);
    assert!(!a.is_invertible());
}

#[test]
fn non_dominant_system_does_not_converge() {
    let a = Matrix::from_rows(&[[1.0_f64, 2.0], [2.0, 1.0]]);
    let b = Vector::from_slice(&[3.0, 3.0]);
    let s = IterativeSettings {
        max_iter: 100,
        ..IterativeSettings::default()
    };
    assert_eq!(jacobi(&a, &b, None, &s).unwrap_err().kind(), ErrorKind::NonConvergence);
    assert_eq!(seidel(&a, &b, None, &s).unwrap_err().kind(), ErrorKind::NonConvergence);
}

#[test]
fn random_dominant_systems() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for n in [3, 10, 25] {
        let mut a = random_matrix(&mut rng, n);
        for i in 0..n {
            let off: f64 = a.row(i).iter().map(|x| x.abs()).sum();
            a[(i, i)] = off + 0.5;
        }
        let x = Vector::from_vec((0..n).map(|_| rng.gen_range(-3.0..3.0)).collect());
        let b = &a * &x;

        let g = gauss_solve(&a, &b, Pivoting::Complete).unwrap();
        let lu = a.lu().unwrap().solve(&b).unwrap();
        let it = seidel(&a, &b, None, &IterativeSettings::default()).unwrap();
        assert!(g.max_abs_diff(&x) < 1e-9, "gauss n={n}");
        assert!(lu.max_abs_diff(&x) < 1e-9, "lu n={n}");
        assert!(it.x.max_abs_diff(&x) < 1e-8, "seidel n={n}");
    }
}

// ── Multiplication ───────────────────────────────────────────────────

#[test]
fn strassen_matches_schoolbook() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for variant in [StrassenVariant::Classic, StrassenVariant::Winograd] {
        let settings = StrassenSettings {
            threshold: 2,
            parallel_depth: 2,
            variant,
        };
        for n in [1, 2, 4, 8, 16, 33] {
            let a = random_matrix(&mut rng, n);
            let b = random_matrix(&mut rng, n);
            let expected = a.mul_naive(&b);
            let c = strassen_with(&a, &b, &settings).unwrap();
            assert!(c.max_abs_diff(&expected) < 1e-9, "{variant:?} n={n}");
            assert!(winograd(&a, &b).unwrap().max_abs_diff(&expected) < 1e-12, "winograd n={n}");
        }
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_strassen_equals_sequential() {
    use numsolve::linalg::{strassen_parallel, strassen_parallel_timeout, winograd_parallel};
    use std::time::Duration;

    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let settings = StrassenSettings {
        threshold: 4,
        parallel_depth: 3,
        variant: StrassenVariant::Classic,
    };
    for n in [1, 2, 4, 8, 16, 33] {
        let a = random_matrix(&mut rng, n);
        let b = random_matrix(&mut rng, n);
        let seq = strassen_with(&a, &b, &settings).unwrap();
        let par = strassen_parallel(&a, &b, &settings).unwrap();
        assert_eq!(seq, par, "n={n}");
        let bounded = strassen_parallel_timeout(&a, &b, &settings, Duration::from_secs(30)).unwrap();
        assert_eq!(seq, bounded, "n={n}");
        assert_eq!(winograd(&a, &b).unwrap(), winograd_parallel(&a, &b).unwrap());
    }
}

#[test]
fn multiplication_shape_errors() {
    let a = Matrix::<f64>::zeros(2, 3);
    let sq = Matrix::<f64>::identity(3);
    assert_eq!(strassen_with(&a, &a, &StrassenSettings::default()).unwrap_err().kind(), ErrorKind::Shape);
    assert_eq!(
        strassen_with(&sq, &Matrix::identity(4), &StrassenSettings::default())
            .unwrap_err()
            .kind(),
        ErrorKind::Shape
    );
    assert_eq!(winograd(&a, &a).unwrap_err().kind(), ErrorKind::Shape);
}

// ── Search and quadrature ────────────────────────────────────────────

#[test]
fn bracket_then_minimize() {
    init_logging();
    let f = |x: f64| (x - 1.0).powi(2) + (x + 5.0).powi(2);
    let s = SearchSettings::default();

    let g = golden_section(f, -10.0, 10.0, &s).unwrap();
    let fib = fibonacci(f, -10.0, 10.0, &s).unwrap();
    assert_near(g.x, -2.0, 1e-6, "golden");
    assert_near(fib.x, -2.0, 1e-6, "fibonacci");
    assert_near(g.fx, 18.0, 1e-9, "golden f");

    let bracket = svenn(f, 25.0, &SvennSettings::default()).unwrap();
    assert!(bracket.contains(-2.0), "{bracket}");
    let r = golden_section(f, bracket.a, bracket.b, &s).unwrap();
    assert_near(r.x, -2.0, 1e-6, "golden in svenn bracket");
}

#[test]
fn quadrature_rules_agree() {
    let f = |x: f64| x.exp() * x.sin();
    // ∫₀¹ eˣ sin x dx = (e(sin 1 − cos 1) + 1) / 2
    let exact = (1f64.exp() * (1f64.sin() - 1f64.cos()) + 1.0) / 2.0;
    let s = QuadSettings::default();
    assert_near(rectangle(f, 0.0, 1.0, &s).unwrap().value, exact, 1e-8, "rectangle");
    assert_near(trapezoid(f, 0.0, 1.0, &s).unwrap().value, exact, 1e-8, "trapezoid");
    assert_near(simpson(f, 0.0, 1.0, &s).unwrap().value, exact, 1e-8, "simpson");
}

#[test]
fn degenerate_interval_everywhere() {
    let f = |x: f64| x * x;
    let (q, s) = (QuadSettings::default(), SearchSettings::default());
    let kinds = [
        rectangle(f, 1.0, 1.0, &q).unwrap_err().kind(),
        trapezoid(f, 1.0, 1.0, &q).unwrap_err().kind(),
        simpson(f, 1.0, 1.0, &q).unwrap_err().kind(),
        golden_section(f, 1.0, 1.0, &s).unwrap_err().kind(),
        fibonacci(f, 1.0, 1.0, &s).unwrap_err().kind(),
    ];
    assert!(kinds.iter().all(|&k| k == ErrorKind::DegenerateInterval));
}
