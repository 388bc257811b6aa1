use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::vector::Vector;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Settings for [`thomas_solve_with`].
#[derive(Debug, Clone, Copy)]
pub struct ThomasSettings<T> {
    /// Scan the matrix for non-zero entries outside the three central
    /// diagonals before solving. Disabling skips an `O(n²)` pass but a
    /// non-tridiagonal input then yields a wrong answer.
    pub check_structure: bool,
    /// Relative threshold below which a modified diagonal entry counts as zero.
    pub pivot_tol: T,
}

impl<T: FloatScalar> Default for ThomasSettings<T> {
    fn default() -> Self {
        Self {
            check_structure: true,
            pivot_tol: T::epsilon() * T::lit(8.0),
        }
    }
}

/// Solve a tridiagonal system `A·x = b` in `O(n)` with the Thomas algorithm.
///
/// The banded structure is validated first; use [`thomas_solve_with`] to
/// skip the check.
///
/// ```
/// use numsolve::{Matrix, Vector};
/// use numsolve::linalg::thomas_solve;
///
/// let a = Matrix::from_rows(&[
///     [2.0_f64, -1.0, 0.0],
///     [-1.0, 2.0, -1.0],
///     [0.0, -1.0, 2.0],
/// ]);
/// let b = Vector::from_slice(&[1.0, 0.0, 1.0]);
/// let x = thomas_solve(&a, &b).unwrap();
/// assert!(x.max_abs_diff(&Vector::from_slice(&[1.0, 1.0, 1.0])) < 1e-12);
/// ```
pub fn thomas_solve<T: FloatScalar>(a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    thomas_solve_with(a, b, &ThomasSettings::default())
}

/// [`thomas_solve`] with explicit settings.
pub fn thomas_solve_with<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Vector<T>,
    settings: &ThomasSettings<T>,
) -> Result<Vector<T>> {
    let n = a.require_square()?;
    if b.len() != n {
        return Err(Error::mismatch((n, 1), (b.len(), 1)));
    }
    if settings.check_structure {
        if let Some((row, col)) = a.first_off_band() {
            return Err(Error::NotTridiagonal { row, col });
        }
    }

    let sub: Vec<T> = (1..n).map(|i| a[(i, i - 1)]).collect();
    let diag: Vec<T> = (0..n).map(|i| a[(i, i)]).collect();
    let sup: Vec<T> = (0..n - 1).map(|i| a[(i, i + 1)]).collect();
    sweep(&sub, &diag, &sup, b.as_slice(), settings.pivot_tol)
}

/// Solve from the three bands directly.
///
/// `sub[i]` is `A[i+1][i]`, `diag[i]` is `A[i][i]`, `sup[i]` is `A[i][i+1]`;
/// both off-diagonal bands have length `n - 1`.
///
/// ```
/// use numsolve::linalg::thomas_solve_bands;
///
/// let x = thomas_solve_bands(&[1.0_f64], &[4.0, 3.0], &[1.0], &[6.0, 7.0]).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 2.0).abs() < 1e-12);
/// ```
pub fn thomas_solve_bands<T: FloatScalar>(
    sub: &[T],
    diag: &[T],
    sup: &[T],
    rhs: &[T],
) -> Result<Vector<T>> {
    let n = diag.len();
    if n == 0 {
        return Err(Error::Empty);
    }
    let off = n - 1;
    if sub.len() != off {
        return Err(Error::mismatch((off, 1), (sub.len(), 1)));
    }
    if sup.len() != off {
        return Err(Error::mismatch((off, 1), (sup.len(), 1)));
    }
    if rhs.len() != n {
        return Err(Error::mismatch((n, 1), (rhs.len(), 1)));
    }
    sweep(sub, diag, sup, rhs, ThomasSettings::<T>::default().pivot_tol)
}

fn sweep<T: FloatScalar>(sub: &[T], diag: &[T], sup: &[T], rhs: &[T], pivot_tol: T) -> Result<Vector<T>> {
    let n = diag.len();
    debug!(n, "thomas sweep");

    let scale = diag
        .iter()
        .chain(sub)
        .chain(sup)
        .fold(T::zero(), |acc, &x| acc.max(x.abs()));
    let threshold = pivot_tol * scale;

    // Forward sweep: c[i], d[i] are the modified super-diagonal and rhs.
    let mut c = vec![T::zero(); n];
    let mut d = vec![T::zero(); n];
    let mut denom = diag[0];
    if denom.abs() <= threshold {
        return Err(Error::Singular { step: 0 });
    }
    if n > 1 {
        c[0] = sup[0] / denom;
    }
    d[0] = rhs[0] / denom;

    for i in 1..n {
        let a = sub[i - 1];
        denom = diag[i] - a * c[i - 1];
        if denom.abs() <= threshold {
            return Err(Error::Singular { step: i });
        }
        if i < n - 1 {
            c[i] = sup[i] / denom;
        }
        d[i] = (rhs[i] - a * d[i - 1]) / denom;
    }

    // Back substitution
    let mut x = d;
    for i in (0..n - 1).rev() {
        x[i] = x[i] - c[i] * x[i + 1];
    }
    Ok(Vector::from_vec(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{gauss_solve, Pivoting};

    fn poisson(n: usize) -> Matrix<f64> {
        Matrix::from_fn(n, n, |i, j| {
            if i == j {
                2.0
            } else if i.abs_diff(j) == 1 {
                -1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn matches_gauss() {
        let a = poisson(8);
        let b = Vector::from_vec((0..8).map(|i| (i as f64).sin()).collect());
        let x_t = thomas_solve(&a, &b).unwrap();
        let x_g = gauss_solve(&a, &b, Pivoting::PartialByColumn).unwrap();
        assert!(x_t.max_abs_diff(&x_g) < 1e-12);
    }

    #[test]
    fn concrete_two_by_two() {
        let a = Matrix::from_rows(&[[4.0_f64, 1.0], [2.0, 3.0]]);
        let b = Vector::from_slice(&[1.0, 2.0]);
        let x = thomas_solve(&a, &b).unwrap();
        assert!((x[0] - 0.1).abs() < 1e-12);
        assert!((x[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn single_unknown() {
        let a = Matrix::from_rows(&[[4.0_f64]]);
        let x = thomas_solve(&a, &Vector::from_slice(&[2.0])).unwrap();
        assert_eq!(x.as_slice(), &[0.5]);
    }

    #[test]
    fn rejects_non_tridiagonal() {
        let mut a = poisson(4);
        a[(0, 3)] = 1.0;
        let b = Vector::zeros(4);
        assert_eq!(thomas_solve(&a, &b), Err(Error::NotTridiagonal { row: 0, col: 3 }));

        // Unchecked: solves the banded part and ignores the stray entry.
        let unchecked = ThomasSettings {
            check_structure: false,
            ..ThomasSettings::default()
        };
        assert!(thomas_solve_with(&a, &b, &unchecked).is_ok());
    }

    #[test]
    fn zero_modified_diagonal() {
        let a = Matrix::from_rows(&[[1.0_f64, 1.0], [1.0, 1.0]]);
        let b = Vector::from_slice(&[1.0, 1.0]);
        assert_eq!(thomas_solve(&a, &b), Err(Error::Singular { step: 1 }));
    }

    #[test]
    fn band_length_checks() {
        assert_eq!(thomas_solve_bands::<f64>(&[], &[], &[], &[]), Err(Error::Empty));
        assert!(thomas_solve_bands(&[1.0_f64, 1.0], &[2.0, 2.0], &[1.0], &[0.0, 0.0]).is_err());
        assert!(thomas_solve_bands(&[1.0_f64], &[2.0, 2.0], &[1.0], &[0.0]).is_err());
    }
}
