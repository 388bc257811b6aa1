use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::matrix::vector::Vector;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Householder reduction of a symmetric matrix to tridiagonal form.
///
/// Returns `(diag, off_diag, q)` with `Qᵗ·A·Q = T`, where `T` has `diag` on
/// its diagonal and `off_diag[i] = T[i+1][i]` below it. Only the lower
/// triangle of `a` is read.
pub(crate) fn tridiagonalize<T: FloatScalar>(a: &Matrix<T>) -> (Vec<T>, Vec<T>, Matrix<T>) {
    let n = a.nrows();
    let eps = T::epsilon();
    let mut w = Matrix::from_fn(n, n, |i, j| if i >= j { a[(i, j)] } else { a[(j, i)] });
    let mut q = Matrix::identity(n);
    let mut off_diag = vec![T::zero(); n.saturating_sub(1)];

    for k in 0..n.saturating_sub(2) {
        let norm_sq = ((k + 1)..n).fold(T::zero(), |acc, i| acc + w[(i, k)] * w[(i, k)]);
        if norm_sq <= eps * eps {
            off_diag[k] = T::zero();
            continue;
        }

        let norm = norm_sq.sqrt();
        let head = w[(k + 1, k)];
        let sigma = if head.abs() < eps { norm } else { norm * head.signum() };
        let v0 = head + sigma;
        // v = [v0, w[k+2..n, k]], kept in place below the sub-diagonal
        let v = |i: usize| if i == 0 { v0 } else { w[(k + 1 + i, k)] };

        let sub_n = n - k - 1;
        let v_norm_sq = (0..sub_n).fold(T::zero(), |acc, i| acc + v(i) * v(i));
        let tau = T::lit(2.0) / v_norm_sq;

        // p = tau · A_sub · v
        let p: Vec<T> = (0..sub_n)
            .map(|i| {
                tau * (0..sub_n).fold(T::zero(), |acc, j| acc + w[(k + 1 + i, k + 1 + j)] * v(j))
            })
            .collect();
        let vtp = (0..sub_n).fold(T::zero(), |acc, i| acc + v(i) * p[i]);
        let half = tau * vtp / T::lit(2.0);
        let r: Vec<T> = (0..sub_n).map(|i| p[i] - half * v(i)).collect();
        let vs: Vec<T> = (0..sub_n).map(v).collect();

        // A_sub -= v·rᵗ + r·vᵗ
        for i in 0..sub_n {
            for j in 0..sub_n {
                let x = w[(k + 1 + i, k + 1 + j)] - vs[i] * r[j] - r[i] * vs[j];
                w[(k + 1 + i, k + 1 + j)] = x;
            }
        }
        off_diag[k] = -sigma;

        // Q ← Q·(I − tau·v·vᵗ)
        for row in 0..n {
            let s = tau * (0..sub_n).fold(T::zero(), |acc, j| acc + q[(row, k + 1 + j)] * vs[j]);
            for j in 0..sub_n {
                q[(row, k + 1 + j)] = q[(row, k + 1 + j)] - s * vs[j];
            }
        }
    }

    let diag = (0..n).map(|i| w[(i, i)]).collect();
    if n >= 2 {
        off_diag[n - 2] = w[(n - 1, n - 2)];
    }
    (diag, off_diag, q)
}

/// Implicit QR with Wilkinson shifts on a symmetric tridiagonal matrix.
///
/// `diag` is overwritten with the eigenvalues in ascending order and
/// `off_diag` is destroyed. When `q` is given, the Givens rotations are
/// accumulated into its columns, which are permuted alongside the sort.
pub(crate) fn tridiagonal_qr<T: FloatScalar>(
    diag: &mut [T],
    off_diag: &mut [T],
    mut q: Option<&mut Matrix<T>>,
    max_iter: usize,
) -> Result<()> {
    let n = diag.len();
    if n <= 1 {
        return Ok(());
    }

    let eps = T::epsilon();
    let two = T::lit(2.0);
    let mut iter = 0;
    let mut hi = n - 1;

    while hi > 0 {
        let mut lo = hi;
        while lo > 0 {
            if off_diag[lo - 1].abs() <= eps * (diag[lo - 1].abs() + diag[lo].abs()) {
                off_diag[lo - 1] = T::zero();
                break;
            }
            lo -= 1;
        }
        if lo == hi {
            hi -= 1;
            continue;
        }

        iter += 1;
        if iter > max_iter {
            let change = off_diag.iter().fold(T::zero(), |acc, e| acc.max(e.abs()));
            warn!(n, max_iter, "tridiagonal QR did not converge");
            return Err(Error::NonConvergence {
                iterations: max_iter,
                change: change.as_f64(),
            });
        }

        let d = (diag[hi - 1] - diag[hi]) / two;
        let e = off_diag[hi - 1];
        let r = (d * d + e * e).sqrt();
        let shift = diag[hi] - e * e / (d + if d >= T::zero() { r } else { -r });

        let mut x = diag[lo] - shift;
        let mut z = off_diag[lo];
        for k in lo..hi {
            let (c, s) = givens(x, z);
            if k > lo {
                off_diag[k - 1] = c * x + s * z;
            }

            let (d_k, d_k1, e_k) = (diag[k], diag[k + 1], off_diag[k]);
            diag[k] = c * c * d_k + two * c * s * e_k + s * s * d_k1;
            diag[k + 1] = s * s * d_k - two * c * s * e_k + c * c * d_k1;
            off_diag[k] = c * s * (d_k1 - d_k) + (c * c - s * s) * e_k;

            // bulge at (k, k+2) drives the next rotation
            if k + 1 < hi {
                let e_next = off_diag[k + 1];
                x = off_diag[k];
                z = s * e_next;
                off_diag[k + 1] = c * e_next;
            }

            if let Some(q) = q.as_deref_mut() {
                rotate_cols(q, k, k + 1, c, s);
            }
        }
    }

    for i in 0..n {
        let min = (i..n).fold(i, |m, j| if diag[j] < diag[m] { j } else { m });
        if min != i {
            diag.swap(i, min);
            if let Some(q) = q.as_deref_mut() {
                q.swap_cols(i, min);
            }
        }
    }
    Ok(())
}

/// `(c, s)` with `[c s; −s c]·[a; b] = [r; 0]`.
#[inline]
pub(crate) fn givens<T: FloatScalar>(a: T, b: T) -> (T, T) {
    if b == T::zero() {
        (T::one(), T::zero())
    } else if b.abs() > a.abs() {
        let t = a / b;
        let s = T::one() / (T::one() + t * t).sqrt();
        (s * t, s)
    } else {
        let t = b / a;
        let c = T::one() / (T::one() + t * t).sqrt();
        (c, c * t)
    }
}

/// Columns `(i, j)` ← `(c·col_i + s·col_j, c·col_j − s·col_i)`.
#[inline]
pub(crate) fn rotate_cols<T: FloatScalar>(m: &mut Matrix<T>, i: usize, j: usize, c: T, s: T) {
    for row in 0..m.nrows() {
        let (a, b) = (m[(row, i)], m[(row, j)]);
        m[(row, i)] = c * a + s * b;
        m[(row, j)] = c * b - s * a;
    }
}

/// Fails with [`Error::NotSymmetric`] at the first pair that differs by more
/// than a few ulps of the largest entry.
fn check_symmetric<T: FloatScalar>(a: &Matrix<T>) -> Result<usize> {
    let n = a.require_square()?;
    let tol = T::epsilon() * T::lit(64.0) * a.max_abs();
    for i in 0..n {
        for j in 0..i {
            if (a[(i, j)] - a[(j, i)]).abs() > tol {
                return Err(Error::NotSymmetric { row: i, col: j });
            }
        }
    }
    Ok(n)
}

/// Eigendecomposition `A = Q·Λ·Qᵗ` of a real symmetric matrix.
///
/// Householder tridiagonalization followed by implicit QR with Wilkinson
/// shifts. Eigenvalues are sorted ascending; column `i` of
/// [`eigenvectors`](Self::eigenvectors) belongs to eigenvalue `i`.
///
/// ```
/// use numsolve::Matrix;
/// use numsolve::linalg::SymmetricEigen;
///
/// let a = Matrix::from_rows(&[[2.0_f64, -1.0], [-1.0, 2.0]]);
/// let eig = SymmetricEigen::new(&a).unwrap();
/// assert!((eig.eigenvalues()[0] - 1.0).abs() < 1e-10);
/// assert!((eig.eigenvalues()[1] - 3.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct SymmetricEigen<T> {
    eigenvalues: Vector<T>,
    eigenvectors: Matrix<T>,
}

impl<T: FloatScalar> SymmetricEigen<T> {
    /// Decompose a symmetric matrix.
    ///
    /// Fails with a shape error for non-square, empty or non-symmetric input,
    /// and with [`Error::NonConvergence`] if QR iteration runs past `30·n`
    /// sweeps.
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        let n = check_symmetric(a)?;
        debug!(n, "symmetric eigendecomposition");
        let (mut diag, mut off_diag, mut q) = tridiagonalize(a);
        tridiagonal_qr(&mut diag, &mut off_diag, Some(&mut q), 30 * n)?;
        Ok(Self {
            eigenvalues: Vector::from_vec(diag),
            eigenvectors: q,
        })
    }

    /// Eigenvalues only, ascending.
    pub fn eigenvalues_only(a: &Matrix<T>) -> Result<Vector<T>> {
        let n = check_symmetric(a)?;
        let (mut diag, mut off_diag, _) = tridiagonalize(a);
        tridiagonal_qr(&mut diag, &mut off_diag, None, 30 * n)?;
        Ok(Vector::from_vec(diag))
    }

    /// Eigenvalues, ascending.
    #[inline]
    pub fn eigenvalues(&self) -> &Vector<T> {
        &self.eigenvalues
    }

    /// Orthogonal matrix whose columns are the eigenvectors.
    #[inline]
    pub fn eigenvectors(&self) -> &Matrix<T> {
        &self.eigenvectors
    }

    /// `Q·Λ·Qᵗ`.
    pub fn reconstruct(&self) -> Matrix<T> {
        let q = &self.eigenvectors;
        let n = q.nrows();
        Matrix::from_fn(n, n, |i, j| {
            (0..n).fold(T::zero(), |acc, k| acc + q[(i, k)] * self.eigenvalues[k] * q[(j, k)])
        })
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Symmetric eigendecomposition; see [`SymmetricEigen`].
    ///
    /// ```
    /// use numsolve::Matrix;
    ///
    /// let a = Matrix::from_rows(&[[5.0_f64, 2.0], [2.0, 2.0]]);
    /// let vals = a.eigenvalues_symmetric().unwrap();
    /// assert!((vals[0] - 1.0).abs() < 1e-10);
    /// assert!((vals[1] - 6.0).abs() < 1e-10);
    /// ```
    pub fn eig_symmetric(&self) -> Result<SymmetricEigen<T>> {
        SymmetricEigen::new(self)
    }

    /// Eigenvalues of a symmetric matrix, ascending.
    pub fn eigenvalues_symmetric(&self) -> Result<Vector<T>> {
        SymmetricEigen::eigenvalues_only(self)
    }
}
