use tracing::debug;
#[cfg(feature = "parallel")]
use tracing::warn;

use crate::error::{Error, Result};
use crate::traits::FloatScalar;
use crate::Matrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which seven-product scheme the recursion uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrassenVariant {
    /// Strassen's original scheme: 7 products, 18 block additions.
    #[default]
    Classic,
    /// Winograd's reordering: 7 products, 15 block additions.
    Winograd,
}

/// Settings for [`strassen_with`] and the parallel variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrassenSettings {
    /// Orders at or below this use schoolbook multiplication.
    pub threshold: usize,
    /// Recursion levels whose seven products run as parallel tasks.
    /// Deeper levels run sequentially inside each task.
    pub parallel_depth: usize,
    /// Product scheme.
    pub variant: StrassenVariant,
}

impl Default for StrassenSettings {
    fn default() -> Self {
        Self {
            threshold: 64,
            parallel_depth: 2,
            variant: StrassenVariant::Classic,
        }
    }
}

/// Multiply two square matrices of equal order with Strassen's algorithm.
///
/// Orders that are not a power of two are zero-padded to the next power of
/// two and the product is cropped back.
///
/// ```
/// use numsolve::Matrix;
/// use numsolve::linalg::strassen;
///
/// let a = Matrix::from_fn(5, 5, |i, j| (i + 2 * j) as f64);
/// let b = Matrix::from_fn(5, 5, |i, j| (i as f64) - (j as f64));
/// let c = strassen(&a, &b).unwrap();
/// assert!(c.approx_eq(&a.mul_naive(&b), 1e-9));
/// ```
pub fn strassen<T: FloatScalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    strassen_with(a, b, &StrassenSettings::default())
}

/// [`strassen`] with explicit settings.
pub fn strassen_with<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    settings: &StrassenSettings,
) -> Result<Matrix<T>> {
    let (n, padded) = conform(a, b)?;
    debug!(n, padded, threshold = settings.threshold, "strassen");
    let c = multiply(&a.padded(padded, padded), &b.padded(padded, padded), settings);
    Ok(crop(c, n))
}

/// Task-parallel Strassen: the seven products of each of the top
/// `parallel_depth` levels run concurrently on the rayon pool and are joined
/// before recombination. Results are identical to [`strassen_with`].
///
/// A panic in any branch propagates to the caller; use
/// [`strassen_parallel_timeout`] to receive it as an error instead.
#[cfg(feature = "parallel")]
pub fn strassen_parallel<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    settings: &StrassenSettings,
) -> Result<Matrix<T>> {
    let (n, padded) = conform(a, b)?;
    debug!(n, padded, depth = settings.parallel_depth, "parallel strassen");
    let c = multiply_par(
        &a.padded(padded, padded),
        &b.padded(padded, padded),
        settings,
        settings.parallel_depth,
    );
    Ok(crop(c, n))
}

/// [`strassen_parallel`] with a bounded wait.
///
/// The multiply runs on the rayon pool while the caller waits at most
/// `timeout`. Fails with [`Error::Timeout`] if the deadline passes (the
/// background work is abandoned, not cancelled) and with
/// [`Error::TaskPanicked`] if any branch panics.
///
/// ```
/// use std::time::Duration;
/// use numsolve::Matrix;
/// use numsolve::linalg::{strassen_parallel_timeout, StrassenSettings};
///
/// let a = Matrix::<f64>::identity(4);
/// let b = Matrix::from_fn(4, 4, |i, j| (i * 4 + j) as f64);
/// let c = strassen_parallel_timeout(&a, &b, &StrassenSettings::default(), Duration::from_secs(10)).unwrap();
/// assert_eq!(c, b);
/// ```
#[cfg(feature = "parallel")]
pub fn strassen_parallel_timeout<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    settings: &StrassenSettings,
    timeout: std::time::Duration,
) -> Result<Matrix<T>> {
    conform(a, b)?;
    let (a, b, settings) = (a.clone(), b.clone(), *settings);
    run_bounded(timeout, move || strassen_parallel(&a, &b, &settings))
}

/// Run `job` on the rayon pool and wait for it at most `timeout`.
#[cfg(feature = "parallel")]
fn run_bounded<R: Send + 'static>(
    timeout: std::time::Duration,
    job: impl FnOnce() -> Result<R> + Send + 'static,
) -> Result<R> {
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::mpsc::{self, RecvTimeoutError};

    let (tx, rx) = mpsc::channel();
    rayon::spawn(move || {
        let outcome = catch_unwind(AssertUnwindSafe(job)).map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Error::TaskPanicked { message }
        });
        // The receiver is gone once the caller has timed out.
        let _ = tx.send(outcome.and_then(|r| r));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            warn!(millis = timeout.as_millis(), "parallel multiply timed out");
            Err(Error::Timeout {
                millis: timeout.as_millis(),
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(Error::TaskPanicked {
            message: "worker exited without a result".to_string(),
        }),
    }
}

/// Check operands and return `(order, padded order)`.
fn conform<T>(a: &Matrix<T>, b: &Matrix<T>) -> Result<(usize, usize)> {
    let n = a.require_square()?;
    let m = b.require_square()?;
    if n != m {
        return Err(Error::mismatch(a.shape(), b.shape()));
    }
    Ok((n, n.next_power_of_two()))
}

fn crop<T: FloatScalar>(c: Matrix<T>, n: usize) -> Matrix<T> {
    if c.nrows() == n {
        c
    } else {
        c.submatrix(0, 0, n, n)
    }
}

// ── Recursion ───────────────────────────────────────────────────────

/// Power-of-two order product.
fn multiply<T: FloatScalar>(a: &Matrix<T>, b: &Matrix<T>, settings: &StrassenSettings) -> Matrix<T> {
    let n = a.nrows();
    if n <= settings.threshold.max(1) {
        return a.mul_naive(b);
    }
    let products: Vec<Matrix<T>> = operands(settings.variant, a, b)
        .iter()
        .map(|(l, r)| multiply(l, r, settings))
        .collect();
    combine(settings.variant, &products)
}

#[cfg(feature = "parallel")]
fn multiply_par<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    settings: &StrassenSettings,
    depth: usize,
) -> Matrix<T> {
    let n = a.nrows();
    if depth == 0 || n <= settings.threshold.max(1) {
        return multiply(a, b, settings);
    }
    let pairs = operands(settings.variant, a, b);
    let products: Vec<Matrix<T>> = pairs[..]
        .par_iter()
        .map(|(l, r)| multiply_par(l, r, settings, depth - 1))
        .collect();
    combine(settings.variant, &products)
}

/// The seven operand pairs whose products recombine into `A·B`.
fn operands<T: FloatScalar>(
    variant: StrassenVariant,
    a: &Matrix<T>,
    b: &Matrix<T>,
) -> [(Matrix<T>, Matrix<T>); 7] {
    let [a11, a12, a21, a22] = a.quadrants();
    let [b11, b12, b21, b22] = b.quadrants();
    match variant {
        StrassenVariant::Classic => [
            (&a11 + &a22, &b11 + &b22),
            (&a21 + &a22, b11.clone()),
            (a11.clone(), &b12 - &b22),
            (a22.clone(), &b21 - &b11),
            (&a11 + &a12, b22.clone()),
            (&a21 - &a11, &b11 + &b12),
            (&a12 - &a22, &b21 + &b22),
        ],
        StrassenVariant::Winograd => {
            let s1 = &a21 + &a22;
            let s2 = &s1 - &a11;
            let s3 = &a11 - &a21;
            let s4 = &a12 - &s2;
            let t1 = &b12 - &b11;
            let t2 = &b22 - &t1;
            let t3 = &b22 - &b12;
            let t4 = &t2 - &b21;
            [
                (a11, b11),
                (a12, b21),
                (s4, b22),
                (a22, t4),
                (s1, t1),
                (s2, t2),
                (s3, t3),
            ]
        }
    }
}

/// Assemble the result quadrants from the seven products.
fn combine<T: FloatScalar>(variant: StrassenVariant, m: &[Matrix<T>]) -> Matrix<T> {
    let (m1, m2, m3, m4, m5, m6, m7) = (&m[0], &m[1], &m[2], &m[3], &m[4], &m[5], &m[6]);
    match variant {
        StrassenVariant::Classic => {
            let c11 = &(&(m1 + m4) - m5) + m7;
            let c12 = m3 + m5;
            let c21 = m2 + m4;
            let c22 = &(&(m1 - m2) + m3) + m6;
            Matrix::from_quadrants(&c11, &c12, &c21, &c22)
        }
        StrassenVariant::Winograd => {
            let u1 = m1 + m2;
            let u2 = m1 + m6;
            let u3 = &u2 + m7;
            let u4 = &u2 + m5;
            let u5 = &u4 + m3;
            let u6 = &u3 - m4;
            let u7 = &u3 + m5;
            Matrix::from_quadrants(&u1, &u5, &u6, &u7)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize, seed: f64) -> Matrix<f64> {
        Matrix::from_fn(n, n, |i, j| ((i * 7 + j * 3) as f64 * seed).sin())
    }

    fn small(variant: StrassenVariant) -> StrassenSettings {
        StrassenSettings {
            threshold: 2,
            parallel_depth: 2,
            variant,
        }
    }

    #[test]
    fn matches_schoolbook_with_recursion() {
        for variant in [StrassenVariant::Classic, StrassenVariant::Winograd] {
            for n in [1, 2, 3, 4, 7, 8, 16] {
                let (a, b) = (sample(n, 0.37), sample(n, 1.13));
                let c = strassen_with(&a, &b, &small(variant)).unwrap();
                assert!(c.approx_eq(&a.mul_naive(&b), 1e-10), "{variant:?} n={n}");
            }
        }
    }

    #[test]
    fn padding_crops_back() {
        let a = sample(5, 0.5);
        let c = strassen_with(&a, &Matrix::identity(5), &small(StrassenVariant::Classic)).unwrap();
        assert_eq!(c.shape(), (5, 5));
        assert!(c.approx_eq(&a, 1e-12));
    }

    #[test]
    fn rejects_mismatched_orders() {
        let a = Matrix::<f64>::identity(4);
        let b = Matrix::<f64>::identity(3);
        assert_eq!(strassen(&a, &b), Err(Error::mismatch((4, 4), (3, 3))));
        let rect = Matrix::<f64>::zeros(2, 3);
        assert_eq!(strassen(&rect, &rect), Err(Error::not_square(2, 3)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_is_identical() {
        for variant in [StrassenVariant::Classic, StrassenVariant::Winograd] {
            let (a, b) = (sample(12, 0.21), sample(12, 0.77));
            let s = small(variant);
            let seq = strassen_with(&a, &b, &s).unwrap();
            let par = strassen_parallel(&a, &b, &s).unwrap();
            assert_eq!(seq, par, "{variant:?}");
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn bounded_wait_outcomes() {
        use std::time::Duration;

        let ok = run_bounded(Duration::from_secs(5), || Ok(42));
        assert_eq!(ok, Ok(42));

        let panicked = run_bounded::<()>(Duration::from_secs(5), || panic!("branch failed"));
        assert_eq!(
            panicked,
            Err(Error::TaskPanicked {
                message: "branch failed".to_string()
            })
        );

        let slow = run_bounded(Duration::from_millis(10), || {
            std::thread::sleep(Duration::from_millis(500));
            Ok(())
        });
        assert_eq!(slow, Err(Error::Timeout { millis: 10 }));
    }
}
