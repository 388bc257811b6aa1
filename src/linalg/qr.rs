use tracing::debug;

use crate::error::{Error, Result};
use crate::linalg::gauss;
use crate::matrix::vector::Vector;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Orthogonalization method for [`QrDecomposition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrMethod {
    /// Modified Gram–Schmidt: normalize each column after removing its
    /// projection onto the previous orthonormal columns.
    #[default]
    GramSchmidt,
    /// Householder reflections.
    Householder,
}

/// Settings for [`QrDecomposition::with_settings`].
#[derive(Debug, Clone, Copy)]
pub struct QrSettings<T> {
    /// Orthogonalization method.
    pub method: QrMethod,
    /// A column whose remaining norm after projection removal is at or below
    /// `rank_tol` times the largest column norm of `A` is rank deficient.
    pub rank_tol: T,
}

impl<T: FloatScalar> Default for QrSettings<T> {
    fn default() -> Self {
        Self {
            method: QrMethod::default(),
            rank_tol: T::epsilon() * T::lit(64.0),
        }
    }
}

/// Householder QR in place on a row-major `m x n` matrix, `m >= n`.
///
/// On return, `a` contains the packed factorization:
/// - Upper triangle (including diagonal): R
/// - Lower triangle (excluding diagonal): Householder vectors, scaled so the
///   leading entry is an implicit 1
///
/// `tau` receives the reflection scalars, so `H_k = I − tau_k·v_k·v_kᵗ`.
/// Fails with [`Error::RankDeficient`] when a sub-column norm is at or below
/// `threshold`.
pub fn householder_in_place<T: FloatScalar>(
    a: &mut Matrix<T>,
    tau: &mut [T],
    threshold: T,
) -> Result<()> {
    let (m, n) = a.shape();
    debug_assert!(m >= n);
    debug_assert_eq!(tau.len(), n);

    for col in 0..n {
        let norm = (col..m)
            .fold(T::zero(), |acc, i| acc + a[(i, col)] * a[(i, col)])
            .sqrt();
        if norm <= threshold {
            return Err(Error::RankDeficient { column: col });
        }

        // sigma carries the sign of the diagonal so v0 = a + sigma avoids cancellation
        let a_cc = a[(col, col)];
        let sigma = if a_cc < T::zero() { -norm } else { norm };
        let v0 = a_cc + sigma;
        let tau_val = v0 / sigma;
        tau[col] = tau_val;

        for i in (col + 1)..m {
            a[(i, col)] = a[(i, col)] / v0;
        }

        // Apply H to trailing columns: A[col:m, j] -= tau * v * (vᵗ A[col:m, j])
        for j in (col + 1)..n {
            let mut dot = a[(col, j)];
            for i in (col + 1)..m {
                dot = dot + a[(i, col)] * a[(i, j)];
            }
            dot = dot * tau_val;

            a[(col, j)] = a[(col, j)] - dot;
            for i in (col + 1)..m {
                a[(i, j)] = a[(i, j)] - dot * a[(i, col)];
            }
        }

        a[(col, col)] = -sigma;
    }
    Ok(())
}

/// Modified Gram–Schmidt on the columns of `a`, returning thin `Q` and `R`.
fn gram_schmidt<T: FloatScalar>(a: &Matrix<T>, threshold: T) -> Result<(Matrix<T>, Matrix<T>)> {
    let (m, n) = a.shape();
    let mut cols: Vec<Vec<T>> = (0..n).map(|j| a.col(j)).collect();
    let mut r = Matrix::zeros(n, n);

    for k in 0..n {
        let norm = cols[k].iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt();
        if norm <= threshold {
            return Err(Error::RankDeficient { column: k });
        }
        r[(k, k)] = norm;
        for x in cols[k].iter_mut() {
            *x = *x / norm;
        }

        let (done, rest) = cols.split_at_mut(k + 1);
        let q_k = &done[k];
        for (offset, v) in rest.iter_mut().enumerate() {
            let r_kj = q_k.iter().zip(v.iter()).fold(T::zero(), |acc, (&q, &x)| acc + q * x);
            r[(k, k + 1 + offset)] = r_kj;
            for (x, &q) in v.iter_mut().zip(q_k) {
                *x = *x - r_kj * q;
            }
        }
    }

    let q = Matrix::from_fn(m, n, |i, j| cols[j][i]);
    Ok((q, r))
}

/// QR decomposition `A = Q·R` of an `m x n` matrix with `m >= n`.
///
/// `Q` is `m x n` with orthonormal columns, `R` is `n x n` upper triangular.
/// `solve()` gives the least-squares solution for tall systems.
///
/// # Example
///
/// ```
/// use numsolve::{Matrix, Vector};
///
/// // Least-squares fit: y = c0 + c1*x to points (0,1), (1,2), (2,4)
/// let a = Matrix::from_rows(&[
///     [1.0_f64, 0.0],
///     [1.0, 1.0],
///     [1.0, 2.0],
/// ]);
/// let b = Vector::from_slice(&[1.0, 2.0, 4.0]);
/// let x = a.qr().unwrap().solve(&b).unwrap();
/// assert!((x[0] - 5.0 / 6.0).abs() < 1e-10);
/// assert!((x[1] - 3.0 / 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct QrDecomposition<T> {
    q: Matrix<T>,
    r: Matrix<T>,
    /// `det(Q)` for square input, `1` otherwise.
    q_det: T,
}

impl<T: FloatScalar> QrDecomposition<T> {
    /// Decompose with default settings (modified Gram–Schmidt).
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        Self::with_settings(a, &QrSettings::default())
    }

    /// Decompose with explicit settings.
    ///
    /// Fails with a shape error when `m < n` or `A` is empty, and with
    /// [`Error::RankDeficient`] when the columns are linearly dependent.
    pub fn with_settings(a: &Matrix<T>, settings: &QrSettings<T>) -> Result<Self> {
        let (m, n) = a.shape();
        if m == 0 || n == 0 {
            return Err(Error::Empty);
        }
        if m < n {
            return Err(Error::mismatch((n, n), (m, n)));
        }
        debug!(m, n, method = ?settings.method, "qr decomposition");

        let max_col_norm = (0..n)
            .map(|j| (0..m).fold(T::zero(), |acc, i| acc + a[(i, j)] * a[(i, j)]).sqrt())
            .fold(T::zero(), T::max);
        let threshold = settings.rank_tol * max_col_norm;

        match settings.method {
            QrMethod::GramSchmidt => {
                let (q, r) = gram_schmidt(a, threshold)?;
                let q_det = if m == n {
                    gauss::determinant(&q)?.signum()
                } else {
                    T::one()
                };
                Ok(Self { q, r, q_det })
            }
            QrMethod::Householder => {
                let mut packed = a.clone();
                let mut tau = vec![T::zero(); n];
                householder_in_place(&mut packed, &mut tau, threshold)?;
                let r = Matrix::from_fn(n, n, |i, j| if i <= j { packed[(i, j)] } else { T::zero() });
                let q = householder_q(&packed, &tau);
                // Every step is a proper reflection with determinant -1.
                let q_det = if m == n && n % 2 == 1 { -T::one() } else { T::one() };
                Ok(Self { q, r, q_det })
            }
        }
    }

    /// Thin orthonormal factor (`m x n`).
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let a = Matrix::from_rows(&[[12.0_f64, -51.0, 4.0], [6.0, 167.0, -68.0], [-4.0, 24.0, -41.0]]);
    /// let q = a.qr().unwrap().q().clone();
    /// let qtq = &q.transpose() * &q;
    /// assert!(qtq.approx_eq(&Matrix::identity(3), 1e-10));
    /// ```
    pub fn q(&self) -> &Matrix<T> {
        &self.q
    }

    /// Upper-triangular factor (`n x n`).
    pub fn r(&self) -> &Matrix<T> {
        &self.r
    }

    /// Consume into `(Q, R)`.
    pub fn into_parts(self) -> (Matrix<T>, Matrix<T>) {
        (self.q, self.r)
    }

    /// Solve the least-squares problem `min ‖A·x − b‖` as `x = R⁻¹·Qᵗ·b`.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let (m, n) = self.q.shape();
        if b.len() != m {
            return Err(Error::mismatch((m, 1), (b.len(), 1)));
        }
        let mut qtb: Vec<T> = (0..n)
            .map(|j| (0..m).fold(T::zero(), |acc, i| acc + self.q[(i, j)] * b[i]))
            .collect();

        for i in (0..n).rev() {
            let mut sum = qtb[i];
            for j in (i + 1)..n {
                sum = sum - self.r[(i, j)] * qtb[j];
            }
            qtb[i] = sum / self.r[(i, i)];
        }
        Ok(Vector::from_vec(qtb))
    }

    /// Determinant of the original matrix, `det(Q)·∏ R_ii`.
    ///
    /// Fails for non-square input.
    pub fn det(&self) -> Result<T> {
        let (m, n) = self.q.shape();
        if m != n {
            return Err(Error::not_square(m, n));
        }
        Ok((0..n).fold(self.q_det, |d, i| d * self.r[(i, i)]))
    }
}

/// Thin Q from packed Householder vectors: apply the reflections in reverse
/// to the first `n` columns of the identity.
fn householder_q<T: FloatScalar>(packed: &Matrix<T>, tau: &[T]) -> Matrix<T> {
    let (m, n) = packed.shape();
    let mut q = Matrix::zeros(m, n);
    for i in 0..n {
        q[(i, i)] = T::one();
    }

    for col in (0..n).rev() {
        let tau_val = tau[col];
        for j in col..n {
            let mut dot = q[(col, j)];
            for i in (col + 1)..m {
                dot = dot + packed[(i, col)] * q[(i, j)];
            }
            dot = dot * tau_val;

            q[(col, j)] = q[(col, j)] - dot;
            for i in (col + 1)..m {
                q[(i, j)] = q[(i, j)] - dot * packed[(i, col)];
            }
        }
    }
    q
}

/// Convenience methods on rectangular matrices.
impl<T: FloatScalar> Matrix<T> {
    /// QR decomposition by modified Gram–Schmidt.
    pub fn qr(&self) -> Result<QrDecomposition<T>> {
        QrDecomposition::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;
    const METHODS: [QrMethod; 2] = [QrMethod::GramSchmidt, QrMethod::Householder];

    fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
        assert!((a - b).abs() < tol, "{}: {} vs {} (diff {})", msg, a, b, (a - b).abs());
    }

    fn decompose(a: &Matrix<f64>, method: QrMethod) -> Result<QrDecomposition<f64>> {
        let settings = QrSettings {
            method,
            ..QrSettings::default()
        };
        QrDecomposition::with_settings(a, &settings)
    }

    #[test]
    fn square_3x3() {
        let a = Matrix::from_rows(&[
            [12.0_f64, -51.0, 4.0],
            [6.0, 167.0, -68.0],
            [-4.0, 24.0, -41.0],
        ]);
        for method in METHODS {
            let qr = decompose(&a, method).unwrap();
            let (q, r) = (qr.q(), qr.r());

            let prod = q * r;
            for i in 0..3 {
                for j in 0..3 {
                    assert_near(prod[(i, j)], a[(i, j)], TOL, &format!("{method:?} QR[({i},{j})]"));
                }
            }
            let qtq = &q.transpose() * q;
            assert!(qtq.approx_eq(&Matrix::identity(3), TOL), "{method:?}");
            for i in 1..3 {
                for j in 0..i {
                    assert_eq!(r[(i, j)], 0.0);
                }
            }
            assert_near(qr.det().unwrap(), a.det().unwrap(), 1e-6, &format!("{method:?} det"));
        }
    }

    #[test]
    fn gram_schmidt_known_r() {
        let a = Matrix::from_rows(&[[3.0_f64, 0.0], [4.0, 5.0]]);
        let qr = a.qr().unwrap();
        assert_near(qr.r()[(0, 0)], 5.0, TOL, "r00");
        assert_near(qr.r()[(0, 1)], 4.0, TOL, "r01");
        assert_near(qr.r()[(1, 1)], 3.0, TOL, "r11");
        assert_near(qr.det().unwrap(), 15.0, TOL, "det");
    }

    #[test]
    fn rectangular_4x3() {
        let a = Matrix::from_rows(&[
            [1.0_f64, -1.0, 4.0],
            [1.0, 4.0, -2.0],
            [1.0, 4.0, 2.0],
            [1.0, -1.0, 0.0],
        ]);
        for method in METHODS {
            let qr = decompose(&a, method).unwrap();
            assert_eq!(qr.q().shape(), (4, 3));
            assert_eq!(qr.r().shape(), (3, 3));
            assert!((qr.q() * qr.r()).approx_eq(&a, TOL), "{method:?}");
            assert!(qr.det().is_err());
        }
    }

    #[test]
    fn solve_matches_direct() {
        let a = Matrix::from_rows(&[[4.0_f64, 1.0], [2.0, 3.0]]);
        let b = Vector::from_slice(&[1.0, 2.0]);
        for method in METHODS {
            let x = decompose(&a, method).unwrap().solve(&b).unwrap();
            assert_near(x[0], 0.1, 1e-12, "x0");
            assert_near(x[1], 0.6, 1e-12, "x1");
        }
    }

    #[test]
    fn dependent_columns() {
        let a = Matrix::from_rows(&[[1.0_f64, 2.0, 0.0], [2.0, 4.0, 1.0], [3.0, 6.0, 1.0]]);
        for method in METHODS {
            let err = decompose(&a, method).unwrap_err();
            assert_eq!(err, Error::RankDeficient { column: 1 }, "{method:?}");
        }
    }

    #[test]
    fn shape_errors() {
        let wide = Matrix::<f64>::zeros(2, 3);
        assert_eq!(wide.qr().unwrap_err().kind(), crate::ErrorKind::Shape);
        assert_eq!(Matrix::<f64>::zeros(0, 0).qr().unwrap_err(), Error::Empty);
    }
}
