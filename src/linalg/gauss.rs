use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::matrix::vector::Vector;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Pivot selection strategy for Gaussian elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pivoting {
    /// Use the diagonal entry as-is; no exchanges.
    None,
    /// Swap rows to bring the largest magnitude in the current column to the
    /// pivot position.
    #[default]
    PartialByColumn,
    /// Swap columns to bring the largest magnitude in the current row to the
    /// pivot position, tracking the column permutation.
    PartialByRow,
    /// Search the whole trailing submatrix, swapping both rows and columns.
    Complete,
}

/// Settings for [`gauss_solve_with`].
#[derive(Debug, Clone, Copy)]
pub struct GaussSettings<T> {
    /// Pivot selection strategy.
    pub pivoting: Pivoting,
    /// Relative pivot threshold. A pivot with
    /// `|p| <= pivot_tol * max|A_ij|` is treated as zero.
    pub pivot_tol: T,
}

impl<T: FloatScalar> Default for GaussSettings<T> {
    fn default() -> Self {
        Self {
            pivoting: Pivoting::default(),
            pivot_tol: T::epsilon() * T::lit(8.0),
        }
    }
}

impl<T: FloatScalar> GaussSettings<T> {
    /// Default tolerance with the given pivoting strategy.
    pub fn with_pivoting(pivoting: Pivoting) -> Self {
        Self {
            pivoting,
            ..Self::default()
        }
    }
}

/// Solve `A·x = b` by Gaussian elimination and back substitution.
///
/// Fails with a shape error for non-square `A` or a mismatched `b`, and with
/// [`Error::Singular`] when elimination meets a negligible pivot.
///
/// ```
/// use numsolve::{Matrix, Vector};
/// use numsolve::linalg::{gauss_solve, Pivoting};
///
/// let a = Matrix::from_rows(&[[4.0_f64, 1.0], [2.0, 3.0]]);
/// let b = Vector::from_slice(&[1.0, 2.0]);
/// for p in [Pivoting::None, Pivoting::PartialByColumn, Pivoting::PartialByRow, Pivoting::Complete] {
///     let x = gauss_solve(&a, &b, p).unwrap();
///     assert!((x[0] - 0.1).abs() < 1e-12);
///     assert!((x[1] - 0.6).abs() < 1e-12);
/// }
/// ```
pub fn gauss_solve<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Vector<T>,
    pivoting: Pivoting,
) -> Result<Vector<T>> {
    gauss_solve_with(a, b, &GaussSettings::with_pivoting(pivoting))
}

/// [`gauss_solve`] with explicit settings.
pub fn gauss_solve_with<T: FloatScalar>(
    a: &Matrix<T>,
    b: &Vector<T>,
    settings: &GaussSettings<T>,
) -> Result<Vector<T>> {
    let n = a.require_square()?;
    if b.len() != n {
        return Err(Error::mismatch((n, 1), (b.len(), 1)));
    }
    debug!(n, pivoting = ?settings.pivoting, "gauss elimination");

    let mut work = Elimination::new(a, b.as_slice().to_vec());
    let threshold = settings.pivot_tol * a.max_abs();
    work.forward(settings.pivoting, threshold)?;
    let x = work.back_substitute();

    debug!(n, "gauss elimination finished");
    Ok(Vector::from_vec(x))
}

/// Determinant by forward elimination with row pivoting.
///
/// Each row swap flips the sign; the result is the signed product of pivots.
/// A column with no non-zero candidate yields exactly zero rather than an error.
///
/// ```
/// use numsolve::Matrix;
/// use numsolve::linalg::determinant;
///
/// let a = Matrix::from_rows(&[[0.0_f64, 2.0], [3.0, 1.0]]);
/// assert!((determinant(&a).unwrap() - (-6.0)).abs() < 1e-12);
/// ```
pub fn determinant<T: FloatScalar>(a: &Matrix<T>) -> Result<T> {
    let n = a.require_square()?;
    let mut m = a.clone();
    let mut det = T::one();
    for k in 0..n {
        let p = argmax_in_col(&m, k);
        if m[(p, k)] == T::zero() {
            return Ok(T::zero());
        }
        if p != k {
            m.swap_rows(p, k);
            det = -det;
        }
        let pivot = m[(k, k)];
        det = det * pivot;
        eliminate_below(&mut m, k, None);
    }
    Ok(det)
}

/// Whether row-pivoted elimination finds only non-negligible pivots.
pub(crate) fn is_nonsingular<T: FloatScalar>(a: &Matrix<T>) -> bool {
    let Ok(n) = a.require_square() else {
        return false;
    };
    let threshold = T::epsilon() * T::lit(8.0) * a.max_abs();
    let mut m = a.clone();
    for k in 0..n {
        let p = argmax_in_col(&m, k);
        if m[(p, k)].abs() <= threshold {
            return false;
        }
        m.swap_rows(p, k);
        eliminate_below(&mut m, k, None);
    }
    true
}

/// Inverse by Gauss–Jordan elimination on `[A | I]` with row pivoting.
pub fn inverse<T: FloatScalar>(a: &Matrix<T>) -> Result<Matrix<T>> {
    let n = a.require_square()?;
    let threshold = T::epsilon() * T::lit(8.0) * a.max_abs();
    let mut m = a.clone();
    let mut inv = Matrix::identity(n);

    for k in 0..n {
        let p = argmax_in_col(&m, k);
        if m[(p, k)].abs() <= threshold {
            return Err(Error::Singular { step: k });
        }
        m.swap_rows(p, k);
        inv.swap_rows(p, k);

        let inv_pivot = T::one() / m[(k, k)];
        for x in m.row_mut(k) {
            *x = *x * inv_pivot;
        }
        for x in inv.row_mut(k) {
            *x = *x * inv_pivot;
        }

        for i in (0..n).filter(|&i| i != k) {
            let factor = m[(i, k)];
            if factor == T::zero() {
                continue;
            }
            for j in 0..n {
                m[(i, j)] = m[(i, j)] - factor * m[(k, j)];
                inv[(i, j)] = inv[(i, j)] - factor * inv[(k, j)];
            }
        }
    }
    Ok(inv)
}

// ── Elimination workspace ───────────────────────────────────────────

/// Working copy of `[A | b]` plus the column permutation from column swaps.
struct Elimination<T> {
    m: Matrix<T>,
    rhs: Vec<T>,
    /// `perm[k]` is the original unknown now stored in column `k`.
    perm: Vec<usize>,
}

impl<T: FloatScalar> Elimination<T> {
    fn new(a: &Matrix<T>, rhs: Vec<T>) -> Self {
        let n = a.nrows();
        Self {
            m: a.clone(),
            rhs,
            perm: (0..n).collect(),
        }
    }

    /// Reduce to upper-triangular form.
    fn forward(&mut self, pivoting: Pivoting, threshold: T) -> Result<()> {
        let n = self.m.nrows();
        for k in 0..n {
            let (pr, pc) = self.select_pivot(pivoting, k);
            if pr != k {
                self.m.swap_rows(pr, k);
                self.rhs.swap(pr, k);
            }
            if pc != k {
                self.m.swap_cols(pc, k);
                self.perm.swap(pc, k);
            }

            let pivot = self.m[(k, k)];
            trace!(step = k, row = pr, col = pc, pivot = %pivot, "pivot");
            if pivot.abs() <= threshold {
                return Err(Error::Singular { step: k });
            }
            eliminate_below(&mut self.m, k, Some(&mut self.rhs));
        }
        Ok(())
    }

    fn select_pivot(&self, pivoting: Pivoting, k: usize) -> (usize, usize) {
        let m = &self.m;
        let n = m.nrows();
        match pivoting {
            Pivoting::None => (k, k),
            Pivoting::PartialByColumn => (argmax_in_col(m, k), k),
            Pivoting::PartialByRow => {
                let row = m.row(k);
                let mut best = k;
                for j in k + 1..n {
                    if row[j].abs() > row[best].abs() {
                        best = j;
                    }
                }
                (k, best)
            }
            Pivoting::Complete => {
                let mut best = (k, k);
                let mut best_val = m[(k, k)].abs();
                for i in k..n {
                    for j in k..n {
                        let v = m[(i, j)].abs();
                        if v > best_val {
                            best_val = v;
                            best = (i, j);
                        }
                    }
                }
                best
            }
        }
    }

    /// `y_i = (rhs_i − Σ_{j>i} U_ij·y_j) / U_ii`, then undo the column permutation.
    fn back_substitute(&self) -> Vec<T> {
        let n = self.m.nrows();
        let mut y = vec![T::zero(); n];
        for i in (0..n).rev() {
            let row = self.m.row(i);
            let mut sum = self.rhs[i];
            for j in i + 1..n {
                sum = sum - row[j] * y[j];
            }
            y[i] = sum / row[i];
        }
        let mut x = vec![T::zero(); n];
        for (k, &orig) in self.perm.iter().enumerate() {
            x[orig] = y[k];
        }
        x
    }
}

/// Row index of the largest magnitude in column `k` at or below the diagonal.
/// Ties go to the first row.
fn argmax_in_col<T: FloatScalar>(m: &Matrix<T>, k: usize) -> usize {
    let mut best = k;
    let mut best_val = m[(k, k)].abs();
    for i in k + 1..m.nrows() {
        let v = m[(i, k)].abs();
        if v > best_val {
            best_val = v;
            best = i;
        }
    }
    best
}

/// Subtract multiples of row `k` from every row below it, zeroing column `k`.
fn eliminate_below<T: FloatScalar>(m: &mut Matrix<T>, k: usize, mut rhs: Option<&mut Vec<T>>) {
    let n = m.nrows();
    let ncols = m.ncols();
    let pivot = m[(k, k)];
    for i in k + 1..n {
        let factor = m[(i, k)] / pivot;
        if factor == T::zero() {
            continue;
        }
        for j in k + 1..ncols {
            m[(i, j)] = m[(i, j)] - factor * m[(k, j)];
        }
        m[(i, k)] = T::zero();
        if let Some(r) = rhs.as_deref_mut() {
            r[i] = r[i] - factor * r[k];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Pivoting; 4] = [
        Pivoting::None,
        Pivoting::PartialByColumn,
        Pivoting::PartialByRow,
        Pivoting::Complete,
    ];

    #[test]
    fn zero_leading_pivot_needs_pivoting() {
        let a = Matrix::from_rows(&[[0.0_f64, 1.0], [1.0, 1.0]]);
        let b = Vector::from_slice(&[1.0, 3.0]);
        assert_eq!(
            gauss_solve(&a, &b, Pivoting::None),
            Err(Error::Singular { step: 0 })
        );
        for p in &ALL[1..] {
            let x = gauss_solve(&a, &b, *p).unwrap();
            assert!((x[0] - 2.0).abs() < 1e-12, "{p:?}");
            assert!((x[1] - 1.0).abs() < 1e-12, "{p:?}");
        }
    }

    #[test]
    fn complete_pivoting_unpermutes() {
        let a = Matrix::from_rows(&[
            [1.0_f64, 2.0, 10.0],
            [3.0, 20.0, 1.0],
            [30.0, 1.0, 2.0],
        ]);
        let x_true = Vector::from_slice(&[1.0, -2.0, 3.0]);
        let b = &a * &x_true;
        for p in ALL {
            let x = gauss_solve(&a, &b, p).unwrap();
            assert!(x.max_abs_diff(&x_true) < 1e-12, "{p:?}");
        }
    }

    #[test]
    fn pivot_selection_first_max_wins() {
        let a = Matrix::from_rows(&[[1.0_f64, 5.0, -5.0], [5.0, 1.0, 0.0], [-5.0, 0.0, 1.0]]);
        let work = Elimination::new(&a, vec![0.0; 3]);
        assert_eq!(work.select_pivot(Pivoting::PartialByColumn, 0), (1, 0));
        assert_eq!(work.select_pivot(Pivoting::PartialByRow, 0), (0, 1));
        assert_eq!(work.select_pivot(Pivoting::Complete, 0), (0, 1));
    }

    #[test]
    fn singular_zero_row() {
        let a = Matrix::from_rows(&[[1.0_f64, 2.0, 3.0], [0.0, 0.0, 0.0], [4.0, 5.0, 6.0]]);
        let b = Vector::from_slice(&[1.0, 0.0, 2.0]);
        for p in ALL {
            let err = gauss_solve(&a, &b, p).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Singularity, "{p:?}");
        }
    }

    #[test]
    fn shape_errors() {
        let rect = Matrix::<f64>::zeros(2, 3);
        let b = Vector::zeros(2);
        assert_eq!(gauss_solve(&rect, &b, Pivoting::None), Err(Error::not_square(2, 3)));

        let sq = Matrix::<f64>::identity(3);
        assert_eq!(
            gauss_solve(&sq, &b, Pivoting::None),
            Err(Error::mismatch((3, 1), (2, 1)))
        );
    }

    #[test]
    fn determinant_sign_and_zero() {
        let p = Matrix::from_rows(&[[0.0_f64, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(determinant(&p).unwrap(), -1.0);
        let s = Matrix::from_rows(&[[1.0_f64, 2.0], [2.0, 4.0]]);
        assert!(determinant(&s).unwrap().abs() < 1e-12);
        assert_eq!(determinant(&Matrix::<f64>::zeros(3, 3)).unwrap(), 0.0);
    }

    #[test]
    fn inverse_roundtrip() {
        let a = Matrix::from_rows(&[[2.0_f64, -1.0, 0.0], [-1.0, 2.0, -1.0], [0.0, -1.0, 2.0]]);
        let inv = inverse(&a).unwrap();
        assert!((&a * &inv).approx_eq(&Matrix::identity(3), 1e-12));
        assert!((&inv * &a).approx_eq(&Matrix::identity(3), 1e-12));
    }

    #[test]
    fn inverse_singular() {
        let s = Matrix::from_rows(&[[1.0_f64, 2.0], [2.0, 4.0]]);
        assert_eq!(inverse(&s), Err(Error::Singular { step: 1 }));
    }

    #[test]
    fn f32_solve() {
        let a = Matrix::from_rows(&[[4.0_f32, 1.0], [2.0, 3.0]]);
        let b = Vector::from_slice(&[1.0_f32, 2.0]);
        let x = gauss_solve(&a, &b, Pivoting::Complete).unwrap();
        assert!((x[0] - 0.1).abs() < 1e-6);
        assert!((x[1] - 0.6).abs() < 1e-6);
    }
}
