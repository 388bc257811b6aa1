use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::matrix::vector::Vector;
use crate::optim::check_tol;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Quantity compared against the tolerance after each sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopCriterion {
    /// Largest absolute component change between iterates.
    #[default]
    MaxChange,
    /// Sum of absolute component changes between iterates.
    L1Change,
    /// Infinity norm of the residual `A·x − b`.
    Residual,
}

/// Settings for [`jacobi`] and [`seidel`].
#[derive(Debug, Clone, Copy)]
pub struct IterativeSettings<T> {
    /// Convergence tolerance on the chosen stop criterion.
    pub tol: T,
    /// Iteration cap; exceeding it is a non-convergence error.
    pub max_iter: usize,
    /// Stop criterion.
    pub stop: StopCriterion,
    /// Fail up front unless `A` is strictly diagonally dominant.
    pub require_dominance: bool,
}

impl Default for IterativeSettings<f64> {
    fn default() -> Self {
        Self {
            tol: 1e-10,
            max_iter: 10_000,
            stop: StopCriterion::MaxChange,
            require_dominance: false,
        }
    }
}

impl Default for IterativeSettings<f32> {
    fn default() -> Self {
        Self {
            tol: 1e-5,
            max_iter: 10_000,
            stop: StopCriterion::MaxChange,
            require_dominance: false,
        }
    }
}

/// Converged iterate of [`jacobi`] or [`seidel`].
#[derive(Debug, Clone)]
pub struct IterativeSolution<T> {
    /// Solution vector.
    pub x: Vector<T>,
    /// Sweeps performed.
    pub iterations: usize,
    /// Final value of the stop criterion.
    pub change: T,
}

/// Jacobi iteration: every component of `x^{k+1}` is computed from `x^k` only.
///
/// `x0` defaults to the zero vector.
///
/// # Errors
///
/// A non-convergent system fails in one of two ways, both of
/// [`ErrorKind::NonConvergence`](crate::ErrorKind::NonConvergence):
/// [`Error::NonConvergence`] when the cap is reached with finite iterates, or
/// [`Error::Diverged`] as soon as an iterate overflows. A growing iterate
/// usually overflows long before the default cap, so match on the kind
/// rather than the variant.
///
/// ```
/// use numsolve::{Matrix, Vector};
/// use numsolve::linalg::{jacobi, IterativeSettings};
///
/// let a = Matrix::from_rows(&[[4.0_f64, 1.0], [2.0, 3.0]]);
/// let b = Vector::from_slice(&[1.0, 2.0]);
/// let sol = jacobi(&a, &b, None, &IterativeSettings::default()).unwrap();
/// assert!((sol.x[0] - 0.1).abs() < 1e-8);
/// assert!((sol.x[1] - 0.6).abs() < 1e-8);
/// ```
pub fn jacobi<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Vector<T>,
    x0: Option<&Vector<T>>,
    settings: &IterativeSettings<T>,
) -> Result<IterativeSolution<T>> {
    let mut next = Vec::new();
    iterate("jacobi", a, b, x0, settings, |x| {
        let prev: &[T] = x;
        next.clear();
        next.extend(a.rows().enumerate().map(|(i, row)| relax(row, b[i], prev, i)));
        x.copy_from_slice(&next);
    })
}

/// Gauss–Seidel iteration: components with `j < i` already hold `x^{k+1}`.
///
/// Fails like [`jacobi`] does.
///
/// ```
/// use numsolve::{Matrix, Vector};
/// use numsolve::linalg::{seidel, IterativeSettings};
///
/// let a = Matrix::from_rows(&[[4.0_f64, 1.0], [2.0, 3.0]]);
/// let b = Vector::from_slice(&[1.0, 2.0]);
/// let sol = seidel(&a, &b, None, &IterativeSettings::default()).unwrap();
/// assert!((sol.x[0] - 0.1).abs() < 1e-8);
/// ```
pub fn seidel<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Vector<T>,
    x0: Option<&Vector<T>>,
    settings: &IterativeSettings<T>,
) -> Result<IterativeSolution<T>> {
    iterate("seidel", a, b, x0, settings, |x| {
        for (i, row) in a.rows().enumerate() {
            let xi = relax(row, b[i], x, i);
            x[i] = xi;
        }
    })
}

/// `(b_i − Σ_{j≠i} A_ij·x_j) / A_ii`
#[inline]
fn relax<T: FloatScalar>(row: &[T], b_i: T, x: &[T], i: usize) -> T {
    let mut sum = b_i;
    for (j, (&a_ij, &x_j)) in row.iter().zip(x).enumerate() {
        if j != i {
            sum = sum - a_ij * x_j;
        }
    }
    sum / row[i]
}

fn iterate<T: FloatScalar>(
    method: &'static str,
    a: &Matrix<T>,
    b: &Vector<T>,
    x0: Option<&Vector<T>>,
    settings: &IterativeSettings<T>,
    mut sweep: impl FnMut(&mut [T]),
) -> Result<IterativeSolution<T>> {
    let n = a.require_square()?;
    if b.len() != n {
        return Err(Error::mismatch((n, 1), (b.len(), 1)));
    }
    check_tol(settings.tol)?;
    if let Some(i) = (0..n).find(|&i| a[(i, i)] == T::zero()) {
        return Err(Error::Singular { step: i });
    }
    if settings.require_dominance {
        if let Some(row) = a.first_non_dominant_row() {
            return Err(Error::NotDiagonallyDominant { row });
        }
    }

    let mut x = match x0 {
        Some(v) if v.len() != n => return Err(Error::mismatch((n, 1), (v.len(), 1))),
        Some(v) => v.as_slice().to_vec(),
        None => vec![T::zero(); n],
    };
    debug!(method, n, tol = %settings.tol, max_iter = settings.max_iter, "iterative solve");

    let mut prev = x.clone();
    let mut change = T::infinity();
    for k in 1..=settings.max_iter {
        prev.copy_from_slice(&x);
        sweep(&mut x);

        if x.iter().any(|v| !v.is_finite()) {
            warn!(method, iteration = k, "iterate is no longer finite");
            return Err(Error::Diverged { iteration: k });
        }

        change = match settings.stop {
            StopCriterion::MaxChange => x
                .iter()
                .zip(&prev)
                .fold(T::zero(), |acc, (&a, &b)| acc.max((a - b).abs())),
            StopCriterion::L1Change => x
                .iter()
                .zip(&prev)
                .fold(T::zero(), |acc, (&a, &b)| acc + (a - b).abs()),
            StopCriterion::Residual => a
                .rows()
                .zip(b.iter())
                .map(|(row, &b_i)| {
                    let ax = row.iter().zip(&x).fold(T::zero(), |acc, (&a, &v)| acc + a * v);
                    (ax - b_i).abs()
                })
                .fold(T::zero(), T::max),
        };
        trace!(method, iteration = k, change = %change);

        if change < settings.tol {
            debug!(method, iterations = k, "converged");
            return Ok(IterativeSolution {
                x: Vector::from_vec(x),
                iterations: k,
                change,
            });
        }
    }

    warn!(method, max_iter = settings.max_iter, change = %change, "iteration cap reached");
    Err(Error::NonConvergence {
        iterations: settings.max_iter,
        change: change.as_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn dominant() -> (Matrix<f64>, Vector<f64>, Vector<f64>) {
        let a = Matrix::from_rows(&[
            [10.0, -1.0, 2.0, 0.0],
            [-1.0, 11.0, -1.0, 3.0],
            [2.0, -1.0, 10.0, -1.0],
            [0.0, 3.0, -1.0, 8.0],
        ]);
        let b = Vector::from_slice(&[6.0, 25.0, -11.0, 15.0]);
        let x = Vector::from_slice(&[1.0, 2.0, -1.0, 1.0]);
        (a, b, x)
    }

    #[test]
    fn seidel_needs_fewer_sweeps() {
        let (a, b, x_true) = dominant();
        let s = IterativeSettings::default();
        let j = jacobi(&a, &b, None, &s).unwrap();
        let g = seidel(&a, &b, None, &s).unwrap();
        assert!(j.x.max_abs_diff(&x_true) < 1e-8);
        assert!(g.x.max_abs_diff(&x_true) < 1e-8);
        assert!(g.iterations < j.iterations);
    }

    #[test]
    fn stop_criteria() {
        let (a, b, x_true) = dominant();
        for stop in [StopCriterion::MaxChange, StopCriterion::L1Change, StopCriterion::Residual] {
            let s = IterativeSettings {
                stop,
                ..IterativeSettings::default()
            };
            let sol = seidel(&a, &b, None, &s).unwrap();
            assert!(sol.x.max_abs_diff(&x_true) < 1e-8, "{stop:?}");
            assert!(sol.change < s.tol);
        }
    }

    #[test]
    fn exact_initial_guess_converges_immediately() {
        let (a, b, x_true) = dominant();
        let sol = jacobi(&a, &b, Some(&x_true), &IterativeSettings::default()).unwrap();
        assert_eq!(sol.iterations, 1);
    }

    #[test]
    fn oscillation_hits_cap() {
        // Jacobi iteration matrix is a 90° rotation: spectral radius exactly 1.
        let a = Matrix::from_rows(&[[1.0_f64, 1.0], [-1.0, 1.0]]);
        let b = Vector::from_slice(&[1.0, 0.0]);
        let s = IterativeSettings {
            max_iter: 50,
            ..IterativeSettings::default()
        };
        let err = jacobi(&a, &b, None, &s).unwrap_err();
        assert!(matches!(err, Error::NonConvergence { iterations: 50, .. }));
        assert_eq!(err.kind(), ErrorKind::NonConvergence);
    }

    #[test]
    fn growth_is_reported() {
        let a = Matrix::from_rows(&[[1.0_f64, 3.0], [3.0, 1.0]]);
        let b = Vector::from_slice(&[1.0, 1.0]);
        let err = jacobi(&a, &b, None, &IterativeSettings::default()).unwrap_err();
        assert!(matches!(err, Error::Diverged { iteration } if iteration < 10_000), "{err}");
        assert_eq!(err.kind(), ErrorKind::NonConvergence);

        let err = seidel(&a, &b, None, &IterativeSettings::default()).unwrap_err();
        assert!(matches!(err, Error::Diverged { .. }), "{err}");
        assert_eq!(err.kind(), ErrorKind::NonConvergence);
    }

    #[test]
    fn dominance_check() {
        let a = Matrix::from_rows(&[[1.0_f64, 3.0], [3.0, 1.0]]);
        let b = Vector::from_slice(&[1.0, 1.0]);
        let s = IterativeSettings {
            require_dominance: true,
            ..IterativeSettings::default()
        };
        assert_eq!(seidel(&a, &b, None, &s).unwrap_err(), Error::NotDiagonallyDominant { row: 0 });
    }

    #[test]
    fn input_validation() {
        let a = Matrix::from_rows(&[[0.0_f64, 1.0], [1.0, 1.0]]);
        let b = Vector::from_slice(&[1.0, 1.0]);
        let s = IterativeSettings::default();
        assert_eq!(jacobi(&a, &b, None, &s).unwrap_err(), Error::Singular { step: 0 });

        let a = Matrix::<f64>::identity(2);
        let bad_tol = IterativeSettings { tol: 0.0, ..s };
        assert_eq!(jacobi(&a, &b, None, &bad_tol).unwrap_err().kind(), ErrorKind::DegenerateInterval);
        let x0 = Vector::zeros(3);
        assert!(seidel(&a, &b, Some(&x0), &s).is_err());
    }
}
