use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::linalg::symmetric_eigen::{givens, rotate_cols};
use crate::matrix::vector::Vector;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Householder bidiagonalization of an `m x n` matrix, `m >= n`.
///
/// Returns the upper bidiagonal `(diag, off_diag)` with `A = U·B·Vᵗ`, where
/// `off_diag[k] = B[k][k+1]`. `u` (`m x m`) and `v` (`n x n`) receive the
/// transforms when the matching flag is set; otherwise they are untouched.
fn bidiagonalize<T: FloatScalar>(
    a: &mut Matrix<T>,
    u: &mut Matrix<T>,
    v: &mut Matrix<T>,
    compute_u: bool,
    compute_v: bool,
) -> (Vec<T>, Vec<T>) {
    let (m, n) = a.shape();
    let eps = T::epsilon();
    let mut diag = vec![T::zero(); n];
    let mut off_diag = vec![T::zero(); n.saturating_sub(1)];
    if compute_u {
        *u = Matrix::identity(m);
    }
    if compute_v {
        *v = Matrix::identity(n);
    }

    for k in 0..n {
        // left reflection zeroes a[k+1.., k]
        let norm_sq = (k..m).fold(T::zero(), |acc, i| acc + a[(i, k)] * a[(i, k)]);
        if norm_sq > eps * eps {
            let norm = norm_sq.sqrt();
            let a_kk = a[(k, k)];
            let sigma = if a_kk.abs() < eps { norm } else { norm * a_kk.signum() };
            let v0 = a_kk + sigma;
            a[(k, k)] = v0;
            for i in (k + 1)..m {
                a[(i, k)] = a[(i, k)] / v0;
            }
            let tau = v0 / sigma;

            for j in (k + 1)..n {
                let dot = tau
                    * ((k + 1)..m).fold(a[(k, j)], |acc, i| acc + a[(i, k)] * a[(i, j)]);
                a[(k, j)] = a[(k, j)] - dot;
                for i in (k + 1)..m {
                    a[(i, j)] = a[(i, j)] - dot * a[(i, k)];
                }
            }
            if compute_u {
                for row in 0..m {
                    let dot = tau
                        * ((k + 1)..m)
                            .fold(u[(row, k)], |acc, i| acc + u[(row, i)] * a[(i, k)]);
                    u[(row, k)] = u[(row, k)] - dot;
                    for i in (k + 1)..m {
                        u[(row, i)] = u[(row, i)] - dot * a[(i, k)];
                    }
                }
            }
            diag[k] = -sigma;
        } else {
            diag[k] = a[(k, k)];
        }

        if k + 2 >= n {
            if k + 1 < n {
                off_diag[k] = a[(k, k + 1)];
            }
            continue;
        }

        // right reflection zeroes a[k, k+2..]
        let norm_sq = ((k + 1)..n).fold(T::zero(), |acc, j| acc + a[(k, j)] * a[(k, j)]);
        if norm_sq <= eps * eps {
            off_diag[k] = a[(k, k + 1)];
            continue;
        }
        let norm = norm_sq.sqrt();
        let head = a[(k, k + 1)];
        let sigma = if head.abs() < eps { norm } else { norm * head.signum() };
        let v0 = head + sigma;
        a[(k, k + 1)] = v0;
        for j in (k + 2)..n {
            a[(k, j)] = a[(k, j)] / v0;
        }
        let tau = v0 / sigma;

        for i in (k + 1)..m {
            let dot = tau
                * ((k + 2)..n).fold(a[(i, k + 1)], |acc, j| acc + a[(i, j)] * a[(k, j)]);
            a[(i, k + 1)] = a[(i, k + 1)] - dot;
            for j in (k + 2)..n {
                a[(i, j)] = a[(i, j)] - dot * a[(k, j)];
            }
        }
        if compute_v {
            for row in 0..n {
                let dot = tau
                    * ((k + 2)..n)
                        .fold(v[(row, k + 1)], |acc, j| acc + v[(row, j)] * a[(k, j)]);
                v[(row, k + 1)] = v[(row, k + 1)] - dot;
                for j in (k + 2)..n {
                    v[(row, j)] = v[(row, j)] - dot * a[(k, j)];
                }
            }
        }
        off_diag[k] = -sigma;
    }
    (diag, off_diag)
}

/// Golub–Kahan implicit-shift QR on an upper bidiagonal matrix.
///
/// On return `diag` holds the singular values, non-negative and sorted
/// descending, and `off_diag` is zero. Rotations are accumulated into the
/// columns of `u` and `v` when the matching flag is set.
fn bidiagonal_qr<T: FloatScalar>(
    diag: &mut [T],
    off_diag: &mut [T],
    u: &mut Matrix<T>,
    v: &mut Matrix<T>,
    compute_u: bool,
    compute_v: bool,
    max_iter: usize,
) -> Result<()> {
    let n = diag.len();
    let eps = T::epsilon();
    let two = T::lit(2.0);
    let mut iter = 0;
    let mut hi = n.saturating_sub(1);

    while hi > 0 {
        if off_diag[hi - 1].abs() <= eps * (diag[hi - 1].abs() + diag[hi].abs()) {
            off_diag[hi - 1] = T::zero();
            hi -= 1;
            continue;
        }

        let mut lo = hi - 1;
        while lo > 0 {
            if off_diag[lo - 1].abs() <= eps * (diag[lo - 1].abs() + diag[lo].abs()) {
                off_diag[lo - 1] = T::zero();
                break;
            }
            lo -= 1;
        }

        iter += 1;
        if iter > max_iter {
            let change = off_diag.iter().fold(T::zero(), |acc, e| acc.max(e.abs()));
            warn!(n, max_iter, "bidiagonal QR did not converge");
            return Err(Error::NonConvergence {
                iterations: max_iter,
                change: change.as_f64(),
            });
        }

        // A zero on the diagonal breaks the shift: chase its row off the
        // bottom with left rotations, which splits the block.
        if let Some(idx) = (lo..hi).find(|&idx| diag[idx].abs() <= eps) {
            diag[idx] = T::zero();
            let mut z = off_diag[idx];
            off_diag[idx] = T::zero();
            for j in (idx + 1)..=hi {
                let (c, s) = givens(diag[j], z);
                diag[j] = c * diag[j] + s * z;
                if j < hi {
                    z = -s * off_diag[j];
                    off_diag[j] = c * off_diag[j];
                }
                if compute_u {
                    rotate_cols(u, j, idx, c, s);
                }
            }
            continue;
        }

        // Wilkinson shift from the trailing 2x2 of BᵗB
        let d_hi = diag[hi];
        let d_hi1 = diag[hi - 1];
        let e_hi1 = off_diag[hi - 1];
        let e_hi2 = if hi >= lo + 2 { off_diag[hi - 2] } else { T::zero() };
        let t11 = d_hi1 * d_hi1 + e_hi2 * e_hi2;
        let t12 = d_hi1 * e_hi1;
        let t22 = d_hi * d_hi + e_hi1 * e_hi1;
        let d = (t11 - t22) / two;
        let sign_d = if d >= T::zero() { T::one() } else { -T::one() };
        let mu = t22 - t12 * t12 / (d + sign_d * (d * d + t12 * t12).sqrt());

        let mut x = diag[lo] * diag[lo] - mu;
        let mut z = diag[lo] * off_diag[lo];
        for k in lo..hi {
            // right rotation on columns k, k+1 creates a bulge at (k+1, k)
            let (c, s) = givens(x, z);
            if k > lo {
                off_diag[k - 1] = c * x + s * z;
            }
            let (d_k, e_k, d_k1) = (diag[k], off_diag[k], diag[k + 1]);
            diag[k] = c * d_k + s * e_k;
            off_diag[k] = c * e_k - s * d_k;
            let bulge = s * d_k1;
            diag[k + 1] = c * d_k1;
            if compute_v {
                rotate_cols(v, k, k + 1, c, s);
            }

            // left rotation on rows k, k+1 removes it and fills (k, k+2)
            let (c2, s2) = givens(diag[k], bulge);
            diag[k] = c2 * diag[k] + s2 * bulge;
            let (e_k, d_k1) = (off_diag[k], diag[k + 1]);
            off_diag[k] = c2 * e_k + s2 * d_k1;
            diag[k + 1] = c2 * d_k1 - s2 * e_k;
            if k + 1 < hi {
                let e_k1 = off_diag[k + 1];
                x = off_diag[k];
                z = s2 * e_k1;
                off_diag[k + 1] = c2 * e_k1;
            }
            if compute_u {
                rotate_cols(u, k, k + 1, c2, s2);
            }
        }
    }

    for i in 0..n {
        if diag[i] < T::zero() {
            diag[i] = -diag[i];
            if compute_u {
                for row in 0..u.nrows() {
                    u[(row, i)] = -u[(row, i)];
                }
            }
        }
    }

    for i in 0..n {
        let max = (i..n).fold(i, |m, j| if diag[j] > diag[m] { j } else { m });
        if max != i {
            diag.swap(i, max);
            if compute_u {
                u.swap_cols(i, max);
            }
            if compute_v {
                v.swap_cols(i, max);
            }
        }
    }
    Ok(())
}

/// Thin SVD of a tall or square matrix: `(U, σ, V)` with `U` as `m x n`.
fn svd_tall<T: FloatScalar>(a: &Matrix<T>, vectors: bool) -> Result<(Matrix<T>, Vec<T>, Matrix<T>)> {
    let (m, n) = a.shape();
    let mut work = a.clone();
    let mut u = Matrix::zeros(0, 0);
    let mut v = Matrix::zeros(0, 0);
    let (mut diag, mut off_diag) = bidiagonalize(&mut work, &mut u, &mut v, vectors, vectors);
    bidiagonal_qr(&mut diag, &mut off_diag, &mut u, &mut v, vectors, vectors, 30 * m.max(n))?;
    if vectors {
        u = u.submatrix(0, 0, m, n);
    }
    Ok((u, diag, v))
}

/// Singular value decomposition `A = U·Σ·Vᵗ` of an `m x n` matrix.
///
/// With `k = min(m, n)`, `U` is `m x k` and `V` is `n x k`, both with
/// orthonormal columns, and the `k` singular values are non-negative and
/// sorted descending. Wide matrices are handled through their transpose.
///
/// ```
/// use numsolve::Matrix;
///
/// let a = Matrix::from_rows(&[[0.96_f64, 1.72], [2.28, 0.96]]);
/// let svd = a.svd().unwrap();
/// assert!((svd.singular_values()[0] - 3.0).abs() < 1e-10);
/// assert!((svd.singular_values()[1] - 1.0).abs() < 1e-10);
/// assert!((svd.cond() - 3.0).abs() < 1e-10);
/// assert_eq!(svd.rank(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SvdDecomposition<T> {
    u: Matrix<T>,
    singular_values: Vector<T>,
    v: Matrix<T>,
}

impl<T: FloatScalar> SvdDecomposition<T> {
    /// Decompose `a`.
    ///
    /// Fails with [`Error::Empty`] when `a` has no rows or columns, and with
    /// [`Error::NonConvergence`] when the bidiagonal QR exceeds its
    /// `30·max(m, n)` sweep budget.
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        let (m, n) = a.shape();
        if a.is_empty() {
            return Err(Error::Empty);
        }
        debug!(m, n, "singular value decomposition");
        let (u, s, v) = if m >= n {
            svd_tall(a, true)?
        } else {
            let (u, s, v) = svd_tall(&a.transpose(), true)?;
            (v, s, u)
        };
        Ok(Self {
            u,
            singular_values: Vector::from_vec(s),
            v,
        })
    }

    /// Singular values only, descending.
    pub fn singular_values_only(a: &Matrix<T>) -> Result<Vector<T>> {
        if a.is_empty() {
            return Err(Error::Empty);
        }
        let (_, s, _) = if a.nrows() >= a.ncols() {
            svd_tall(a, false)?
        } else {
            svd_tall(&a.transpose(), false)?
        };
        Ok(Vector::from_vec(s))
    }

    /// Left singular vectors (`m x k`).
    #[inline]
    pub fn u(&self) -> &Matrix<T> {
        &self.u
    }

    /// Right singular vectors (`n x k`), one per column.
    #[inline]
    pub fn v(&self) -> &Matrix<T> {
        &self.v
    }

    /// Singular values, descending.
    #[inline]
    pub fn singular_values(&self) -> &Vector<T> {
        &self.singular_values
    }

    /// `Σ` as a `k x k` diagonal matrix.
    pub fn s(&self) -> Matrix<T> {
        Matrix::from_diag(&self.singular_values)
    }

    /// `U·Σ·Vᵗ`.
    pub fn reconstruct(&self) -> Matrix<T> {
        let (m, k) = self.u.shape();
        let n = self.v.nrows();
        Matrix::from_fn(m, n, |i, j| {
            (0..k).fold(T::zero(), |acc, t| {
                acc + self.u[(i, t)] * self.singular_values[t] * self.v[(j, t)]
            })
        })
    }

    /// Spectral norm `‖A‖₂ = σ_max`.
    pub fn norm2(&self) -> T {
        self.singular_values[0]
    }

    /// Two-norm condition number `σ_max / σ_min`; infinite when `σ_min = 0`.
    pub fn cond(&self) -> T {
        let s_min = self.singular_values[self.singular_values.len() - 1];
        if s_min == T::zero() {
            T::infinity()
        } else {
            self.norm2() / s_min
        }
    }

    /// Numerical rank with the default cutoff `max(m, n)·σ_max·ε`.
    pub fn rank(&self) -> usize {
        let dim = self.u.nrows().max(self.v.nrows());
        self.rank_with_tol(T::from_count(dim) * self.norm2() * T::epsilon())
    }

    /// Number of singular values strictly above `tol`.
    pub fn rank_with_tol(&self, tol: T) -> usize {
        self.singular_values.iter().filter(|&&s| s > tol).count()
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Singular value decomposition; see [`SvdDecomposition`].
    pub fn svd(&self) -> Result<SvdDecomposition<T>> {
        SvdDecomposition::new(self)
    }

    /// Singular values, descending, without computing `U` or `V`.
    ///
    /// ```
    /// use numsolve::Matrix;
    ///
    /// let a = Matrix::from_rows(&[[3.0_f64, 0.0], [0.0, 4.0]]);
    /// let s = a.singular_values().unwrap();
    /// assert!((s[0] - 4.0).abs() < 1e-10);
    /// assert!((s[1] - 3.0).abs() < 1e-10);
    /// ```
    pub fn singular_values(&self) -> Result<Vector<T>> {
        SvdDecomposition::singular_values_only(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

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

    fn assert_orthonormal_cols(m: &Matrix<f64>, tol: f64, name: &str) {
        let k = m.ncols();
        let mtm = &m.transpose() * m;
        assert!(mtm.approx_eq(&Matrix::identity(k), tol), "{name}ᵗ{name} != I");
    }

    #[test]
    fn identity() {
        let svd = Matrix::<f64>::identity(3).svd().unwrap();
        for i in 0..3 {
            assert_near(svd.singular_values()[i], 1.0, TOL, &format!("σ[{i}]"));
        }
        assert_orthonormal_cols(svd.u(), TOL, "U");
        assert_orthonormal_cols(svd.v(), TOL, "V");
    }

    #[test]
    fn known_2x2() {
        // AᵗA = [[13, 12], [12, 13]], eigenvalues 25 and 1
        let a = Matrix::from_rows(&[[3.0_f64, 2.0], [2.0, 3.0]]);
        let svd = a.svd().unwrap();
        assert_near(svd.singular_values()[0], 5.0, TOL, "σ[0]");
        assert_near(svd.singular_values()[1], 1.0, TOL, "σ[1]");
        assert_near(svd.norm2(), 5.0, TOL, "norm2");
        assert_near(svd.cond(), 5.0, TOL, "cond");
    }

    #[test]
    fn negative_diagonal() {
        let a = Matrix::from_rows(&[[-3.0_f64, 0.0], [0.0, 2.0]]);
        let svd = a.svd().unwrap();
        assert_near(svd.singular_values()[0], 3.0, TOL, "σ[0]");
        assert_near(svd.singular_values()[1], 2.0, TOL, "σ[1]");
        assert!(svd.reconstruct().approx_eq(&a, TOL));
    }

    #[test]
    fn sorted_descending() {
        let a = Matrix::from_rows(&[
            [10.0_f64, 3.0, 0.0, 0.0],
            [3.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 7.0, 2.0],
            [0.0, 0.0, 2.0, 4.0],
        ]);
        let s = a.singular_values().unwrap();
        assert!(s.as_slice().windows(2).all(|w| w[0] >= w[1]), "{s:?}");
    }

    #[test]
    fn rank_deficient() {
        let a = Matrix::from_rows(&[[1.0_f64, 2.0, 3.0], [2.0, 4.0, 6.0], [3.0, 6.0, 9.0]]);
        let svd = a.svd().unwrap();
        assert!(svd.singular_values()[1] < 1e-9);
        assert_eq!(svd.rank_with_tol(1e-9), 1);
        assert!(svd.cond() > 1e12);

        let d = Matrix::from_rows(&[[2.0_f64, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.5]]);
        let svd = d.svd().unwrap();
        assert_eq!(svd.rank(), 2);
        assert_eq!(svd.singular_values().as_slice(), &[2.0, 0.5, 0.0]);
    }

    #[test]
    fn zero_matrix() {
        let svd = Matrix::<f64>::zeros(3, 2).svd().unwrap();
        assert_eq!(svd.singular_values().as_slice(), &[0.0, 0.0]);
        assert_eq!(svd.rank(), 0);
        assert!(svd.cond().is_infinite());
    }

    #[test]
    fn one_by_one_negative() {
        let svd = Matrix::from_rows(&[[-5.0_f64]]).svd().unwrap();
        assert_near(svd.singular_values()[0], 5.0, TOL, "σ[0]");
        assert_near(svd.u()[(0, 0)] * svd.v()[(0, 0)], -1.0, TOL, "sign");
    }

    #[test]
    fn f32_support() {
        let a = Matrix::from_rows(&[[3.0_f32, 1.0], [1.0, 3.0]]);
        let s = a.singular_values().unwrap();
        assert!((s[0] - 4.0).abs() < 1e-5);
        assert!((s[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(Matrix::<f64>::zeros(0, 3).svd().unwrap_err(), Error::Empty);
        assert_eq!(Matrix::<f64>::zeros(2, 0).singular_values().unwrap_err(), Error::Empty);
    }
}
