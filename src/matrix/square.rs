use crate::error::{Error, Result};
use crate::linalg::gauss;
use crate::traits::{FloatScalar, Scalar};

use super::vector::Vector;
use super::Matrix;

impl<T: Scalar> Matrix<T> {
    /// Transpose.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::from_rows(&[[1, 2, 3], [4, 5, 6]]);
    /// let t = m.transpose();
    /// assert_eq!(t.shape(), (3, 2));
    /// assert_eq!(t[(2, 1)], 6);
    /// ```
    pub fn transpose(&self) -> Matrix<T> {
        Matrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// Sum of diagonal elements.
    pub fn trace(&self) -> T {
        let n = self.nrows.min(self.ncols);
        (0..n).fold(T::zero(), |acc, i| acc + self[(i, i)])
    }

    /// Extract the diagonal.
    pub fn diag(&self) -> Vector<T> {
        let n = self.nrows.min(self.ncols);
        Vector::from_vec((0..n).map(|i| self[(i, i)]).collect())
    }

    /// Square matrix with `v` on the diagonal.
    pub fn from_diag(v: &Vector<T>) -> Matrix<T> {
        let n = v.len();
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = v[i];
        }
        m
    }

    /// The matrix with row `row` and column `col` removed.
    ///
    /// Panics if the matrix has fewer than one row or column.
    pub fn minor(&self, row: usize, col: usize) -> Matrix<T> {
        assert!(row < self.nrows && col < self.ncols, "minor ({row}, {col}) out of bounds");
        let mut data = Vec::with_capacity((self.nrows - 1) * (self.ncols - 1));
        for i in (0..self.nrows).filter(|&i| i != row) {
            for j in (0..self.ncols).filter(|&j| j != col) {
                data.push(self[(i, j)]);
            }
        }
        Matrix::from_vec(self.nrows - 1, self.ncols - 1, data)
    }

    /// Whether every entry off the three central diagonals is exactly zero.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let t = Matrix::from_rows(&[[2.0, 1.0, 0.0], [1.0, 2.0, 1.0], [0.0, 1.0, 2.0]]);
    /// assert!(t.is_tridiagonal());
    /// let full = Matrix::from_rows(&[[2.0, 1.0, 1.0], [1.0, 2.0, 1.0], [0.0, 1.0, 2.0]]);
    /// assert!(!full.is_tridiagonal());
    /// ```
    pub fn is_tridiagonal(&self) -> bool {
        self.first_off_band().is_none()
    }

    /// First `(row, col)` in row-major order holding a non-zero entry outside
    /// the sub-, main and super-diagonal.
    pub(crate) fn first_off_band(&self) -> Option<(usize, usize)> {
        for i in 0..self.nrows {
            for j in 0..self.ncols {
                let in_band = j + 1 >= i && j <= i + 1;
                if !in_band && self[(i, j)] != T::zero() {
                    return Some((i, j));
                }
            }
        }
        None
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Determinant via Gaussian elimination with row pivoting.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::from_rows(&[[3.0_f64, 8.0], [4.0, 6.0]]);
    /// assert!((m.det().unwrap() - (-14.0)).abs() < 1e-12);
    /// ```
    pub fn det(&self) -> Result<T> {
        gauss::determinant(self)
    }

    /// Whether Gaussian elimination meets only non-negligible pivots.
    ///
    /// Non-square matrices are never invertible.
    pub fn is_invertible(&self) -> bool {
        gauss::is_nonsingular(self)
    }

    /// Cofactor `(-1)^(i+j) · det(minor(i, j))`.
    ///
    /// Fails with [`Error::IndexOutOfBounds`] unless `row, col < n`.
    pub fn cofactor(&self, row: usize, col: usize) -> Result<T> {
        let n = self.require_square()?;
        if row >= n || col >= n {
            return Err(Error::IndexOutOfBounds { row, col, rows: n, cols: n });
        }
        if n == 1 {
            return Ok(T::one());
        }
        let d = self.minor(row, col).det()?;
        Ok(if (row + col) % 2 == 0 { d } else { -d })
    }

    /// Adjoint (adjugate): the transposed cofactor matrix, so that
    /// `A · adj(A) = det(A) · I`.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let a = Matrix::from_rows(&[[4.0_f64, 7.0], [2.0, 6.0]]);
    /// let adj = a.adjoint().unwrap();
    /// assert_eq!(adj, Matrix::from_rows(&[[6.0, -7.0], [-2.0, 4.0]]));
    /// ```
    pub fn adjoint(&self) -> Result<Matrix<T>> {
        let n = self.require_square()?;
        let mut adj = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                adj[(j, i)] = self.cofactor(i, j)?;
            }
        }
        Ok(adj)
    }

    /// Inverse via Gauss–Jordan elimination with row pivoting.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let a = Matrix::from_rows(&[[4.0_f64, 7.0], [2.0, 6.0]]);
    /// let id = &a * &a.inverse().unwrap();
    /// assert!(id.approx_eq(&Matrix::identity(2), 1e-12));
    /// ```
    pub fn inverse(&self) -> Result<Matrix<T>> {
        gauss::inverse(self)
    }

    /// Whether each diagonal magnitude strictly exceeds the sum of the other
    /// magnitudes in its row.
    pub fn is_diagonally_dominant(&self) -> bool {
        self.first_non_dominant_row().is_none()
    }

    pub(crate) fn first_non_dominant_row(&self) -> Option<usize> {
        if !self.is_square() {
            return Some(0);
        }
        self.rows().enumerate().find_map(|(i, row)| {
            let off: T = row
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(T::zero(), |acc, (_, &x)| acc + x.abs());
            if row[i].abs() > off {
                None
            } else {
                Some(i)
            }
        })
    }

    /// Solve `A·x = b` with partially pivoted Gaussian elimination.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        gauss::gauss_solve(self, b, gauss::Pivoting::PartialByColumn)
    }

    /// Residual `A·x − b`, failing on shape mismatch.
    pub fn residual(&self, x: &Vector<T>, b: &Vector<T>) -> Result<Vector<T>> {
        if b.len() != self.nrows {
            return Err(Error::mismatch((self.nrows, 1), (b.len(), 1)));
        }
        let ax = self.checked_mul_vec(x)?;
        Ok(&ax - b)
    }
}
