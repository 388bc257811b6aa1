use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::vector::Vector;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Doolittle LU decomposition in place, without pivoting.
///
/// On return, `a` contains both factors packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (diagonal of L is implicitly 1)
///
/// Fails with [`Error::Singular`] when a pivot magnitude is at or below
/// `pivot_tol`.
pub fn lu_in_place<T: FloatScalar>(a: &mut Matrix<T>, pivot_tol: T) -> Result<()> {
    let n = a.require_square()?;

    for k in 0..n {
        let pivot = a[(k, k)];
        if pivot.abs() <= pivot_tol {
            return Err(Error::Singular { step: k });
        }
        let inv_pivot = T::one() / pivot;

        for i in (k + 1)..n {
            let l_ik = a[(i, k)] * inv_pivot;
            a[(i, k)] = l_ik;
            if l_ik == T::zero() {
                continue;
            }
            for j in (k + 1)..n {
                a[(i, j)] = a[(i, j)] - l_ik * a[(k, j)];
            }
        }
    }
    Ok(())
}

/// Solve `L·U·x = b` given the packed factors from [`lu_in_place`].
pub fn lu_solve<T: FloatScalar>(lu: &Matrix<T>, b: &[T], x: &mut [T]) {
    let n = lu.nrows();

    // Forward substitution (solve Ly = b)
    for i in 0..n {
        let row = lu.row(i);
        let mut sum = b[i];
        for j in 0..i {
            sum = sum - row[j] * x[j];
        }
        x[i] = sum;
    }

    // Back substitution (solve Ux = y)
    for i in (0..n).rev() {
        let row = lu.row(i);
        let mut sum = x[i];
        for j in (i + 1)..n {
            sum = sum - row[j] * x[j];
        }
        x[i] = sum / row[i];
    }
}

/// LU decomposition `A = L·U` of a square matrix.
///
/// Stores the packed L/U factors. Use `solve()`, `solve_matrix()`,
/// `inverse()`, or `det()` to reuse one factorization for many right-hand
/// sides.
///
/// # Example
///
/// ```
/// use numsolve::{Matrix, Vector};
///
/// let a = Matrix::from_rows(&[[4.0_f64, 1.0], [2.0, 3.0]]);
/// let lu = a.lu().unwrap();
///
/// let x = lu.solve(&Vector::from_slice(&[1.0, 2.0])).unwrap();
/// assert!((x[0] - 0.1).abs() < 1e-12);
/// assert!((x[1] - 0.6).abs() < 1e-12);
/// assert!((lu.det() - 10.0).abs() < 1e-12);
///
/// let rebuilt = &lu.l() * &lu.u();
/// assert!(rebuilt.approx_eq(&a, 1e-12));
/// ```
#[derive(Debug, Clone)]
pub struct LuDecomposition<T> {
    lu: Matrix<T>,
}

impl<T: FloatScalar> LuDecomposition<T> {
    /// Decompose a matrix. Fails on a non-square input or a negligible pivot.
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        let n = a.require_square()?;
        debug!(n, "lu decomposition");
        let mut lu = a.clone();
        let pivot_tol = T::epsilon() * T::lit(8.0) * a.max_abs();
        lu_in_place(&mut lu, pivot_tol)?;
        Ok(Self { lu })
    }

    /// Order of the decomposed matrix.
    pub fn order(&self) -> usize {
        self.lu.nrows()
    }

    /// Unit lower-triangular factor.
    pub fn l(&self) -> Matrix<T> {
        let n = self.order();
        Matrix::from_fn(n, n, |i, j| match i.cmp(&j) {
            core::cmp::Ordering::Greater => self.lu[(i, j)],
            core::cmp::Ordering::Equal => T::one(),
            core::cmp::Ordering::Less => T::zero(),
        })
    }

    /// Upper-triangular factor.
    pub fn u(&self) -> Matrix<T> {
        let n = self.order();
        Matrix::from_fn(n, n, |i, j| if i <= j { self.lu[(i, j)] } else { T::zero() })
    }

    /// Solve `A·x = b`.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let n = self.order();
        if b.len() != n {
            return Err(Error::mismatch((n, 1), (b.len(), 1)));
        }
        let mut x = vec![T::zero(); n];
        lu_solve(&self.lu, b.as_slice(), &mut x);
        Ok(Vector::from_vec(x))
    }

    /// Solve `A·X = B` column by column.
    pub fn solve_matrix(&self, b: &Matrix<T>) -> Result<Matrix<T>> {
        let n = self.order();
        if b.nrows() != n {
            return Err(Error::mismatch((n, b.ncols()), b.shape()));
        }
        let mut out = Matrix::zeros(n, b.ncols());
        let mut x = vec![T::zero(); n];
        for j in 0..b.ncols() {
            lu_solve(&self.lu, &b.col(j), &mut x);
            for (i, &xi) in x.iter().enumerate() {
                out[(i, j)] = xi;
            }
        }
        Ok(out)
    }

    /// Compute the matrix inverse.
    pub fn inverse(&self) -> Matrix<T> {
        let n = self.order();
        let mut inv = Matrix::zeros(n, n);
        let mut e = vec![T::zero(); n];
        let mut col_buf = vec![T::zero(); n];

        for col in 0..n {
            if col > 0 {
                e[col - 1] = T::zero();
            }
            e[col] = T::one();
            lu_solve(&self.lu, &e, &mut col_buf);
            for row in 0..n {
                inv[(row, col)] = col_buf[row];
            }
        }
        inv
    }

    /// Determinant: product of the diagonal of U.
    pub fn det(&self) -> T {
        (0..self.order()).fold(T::one(), |d, i| d * self.lu[(i, i)])
    }
}

/// Convenience methods on square matrices.
impl<T: FloatScalar> Matrix<T> {
    /// Doolittle LU decomposition (no pivoting).
    pub fn lu(&self) -> Result<LuDecomposition<T>> {
        LuDecomposition::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix<f64> {
        Matrix::from_rows(&[
            [2.0, -1.0, -2.0],
            [-4.0, 6.0, 3.0],
            [-4.0, -2.0, 8.0],
        ])
    }

    #[test]
    fn factors_known_values() {
        let lu = sample().lu().unwrap();
        let l = Matrix::from_rows(&[[1.0, 0.0, 0.0], [-2.0, 1.0, 0.0], [-2.0, -1.0, 1.0]]);
        let u = Matrix::from_rows(&[[2.0, -1.0, -2.0], [0.0, 4.0, -1.0], [0.0, 0.0, 3.0]]);
        assert!(lu.l().approx_eq(&l, 1e-12));
        assert!(lu.u().approx_eq(&u, 1e-12));
        assert!((lu.det() - 24.0).abs() < 1e-12);
    }

    #[test]
    fn reconstructs_and_is_unit_lower() {
        let a = sample();
        let lu = a.lu().unwrap();
        let l = lu.l();
        for i in 0..3 {
            assert_eq!(l[(i, i)], 1.0);
            for j in i + 1..3 {
                assert_eq!(l[(i, j)], 0.0);
            }
        }
        assert!((&l * &lu.u()).approx_eq(&a, 1e-12));
    }

    #[test]
    fn multiple_rhs_and_inverse() {
        let a = sample();
        let lu = a.lu().unwrap();
        let b = Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0], [2.0, -1.0]]);
        let x = lu.solve_matrix(&b).unwrap();
        assert!((&a * &x).approx_eq(&b, 1e-12));
        assert!((&a * &lu.inverse()).approx_eq(&Matrix::identity(3), 1e-12));
    }

    #[test]
    fn zero_pivot_is_singular() {
        let a = Matrix::from_rows(&[[0.0_f64, 1.0], [1.0, 0.0]]);
        assert_eq!(a.lu().unwrap_err(), Error::Singular { step: 0 });

        let zero_row = Matrix::from_rows(&[[1.0_f64, 2.0], [0.0, 0.0]]);
        assert_eq!(zero_row.lu().unwrap_err().kind(), crate::ErrorKind::Singularity);
    }

    #[test]
    fn shape_checks() {
        assert!(Matrix::<f64>::zeros(2, 3).lu().is_err());
        let lu = sample().lu().unwrap();
        assert!(lu.solve(&Vector::zeros(2)).is_err());
        assert!(lu.solve_matrix(&Matrix::zeros(2, 2)).is_err());
    }
}
