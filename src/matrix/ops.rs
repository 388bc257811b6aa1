use core::ops::{Add, Mul, Neg, Sub};

use crate::error::{Error, Result};
use crate::traits::Scalar;

use super::vector::Vector;
use super::Matrix;

impl<T: Scalar> Matrix<T> {
    /// Element-wise sum, failing on shape mismatch.
    pub fn checked_add(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.shape() != rhs.shape() {
            return Err(Error::mismatch(self.shape(), rhs.shape()));
        }
        Ok(self.zip_with(rhs, |a, b| a + b))
    }

    /// Element-wise difference, failing on shape mismatch.
    pub fn checked_sub(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.shape() != rhs.shape() {
            return Err(Error::mismatch(self.shape(), rhs.shape()));
        }
        Ok(self.zip_with(rhs, |a, b| a - b))
    }

    /// Matrix product, failing unless `self.ncols() == rhs.nrows()`.
    pub fn checked_mul(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.ncols != rhs.nrows {
            return Err(Error::mismatch((self.ncols, rhs.ncols), rhs.shape()));
        }
        Ok(self.mul_naive(rhs))
    }

    /// Matrix-vector product, failing unless `self.ncols() == v.len()`.
    pub fn checked_mul_vec(&self, v: &Vector<T>) -> Result<Vector<T>> {
        if self.ncols != v.len() {
            return Err(Error::mismatch((self.ncols, 1), (v.len(), 1)));
        }
        Ok(self.mul_vec_unchecked(v))
    }

    /// Multiply every element by `s`.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]);
    /// assert_eq!(m.scale(2.0)[(1, 1)], 8.0);
    /// ```
    pub fn scale(&self, s: T) -> Matrix<T> {
        self.map(|x| x * s)
    }

    /// Apply `f` to every element.
    pub fn map(&self, mut f: impl FnMut(T) -> T) -> Matrix<T> {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    /// Schoolbook `O(n·k·m)` product. Panics on inner-dimension mismatch.
    ///
    /// Uses the i-k-j loop order so the innermost loop walks contiguous rows
    /// of both `rhs` and the output.
    pub fn mul_naive(&self, rhs: &Matrix<T>) -> Matrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let mut out = Matrix::zeros(self.nrows, rhs.ncols);
        for i in 0..self.nrows {
            let out_row = &mut out.data[i * rhs.ncols..(i + 1) * rhs.ncols];
            for k in 0..self.ncols {
                let a_ik = self.data[i * self.ncols + k];
                if a_ik == T::zero() {
                    continue;
                }
                let rhs_row = &rhs.data[k * rhs.ncols..(k + 1) * rhs.ncols];
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o = *o + a_ik * b;
                }
            }
        }
        out
    }

    fn mul_vec_unchecked(&self, v: &Vector<T>) -> Vector<T> {
        let x = v.as_slice();
        let data = self
            .rows()
            .map(|row| row.iter().zip(x).fold(T::zero(), |acc, (&a, &b)| acc + a * b))
            .collect();
        Vector::from_vec(data)
    }

    pub(crate) fn zip_with(&self, rhs: &Matrix<T>, f: impl Fn(T, T) -> T) -> Matrix<T> {
        Matrix {
            data: self.data.iter().zip(&rhs.data).map(|(&a, &b)| f(a, b)).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

// ── Element-wise addition / subtraction ─────────────────────────────

impl<T: Scalar> Add<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn add(self, rhs: &Matrix<T>) -> Matrix<T> {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "dimension mismatch: {}x{} + {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl<T: Scalar> Add for Matrix<T> {
    type Output = Matrix<T>;

    fn add(self, rhs: Matrix<T>) -> Matrix<T> {
        &self + &rhs
    }
}

impl<T: Scalar> Sub<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn sub(self, rhs: &Matrix<T>) -> Matrix<T> {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "dimension mismatch: {}x{} - {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl<T: Scalar> Sub for Matrix<T> {
    type Output = Matrix<T>;

    fn sub(self, rhs: Matrix<T>) -> Matrix<T> {
        &self - &rhs
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        self.map(|x| -x)
    }
}

// ── Multiplication ──────────────────────────────────────────────────

impl<T: Scalar> Mul<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: &Matrix<T>) -> Matrix<T> {
        self.mul_naive(rhs)
    }
}

impl<T: Scalar> Mul for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: Matrix<T>) -> Matrix<T> {
        self.mul_naive(&rhs)
    }
}

impl<T: Scalar> Mul<&Vector<T>> for &Matrix<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: &Vector<T>) -> Vector<T> {
        assert_eq!(
            self.ncols,
            rhs.len(),
            "dimension mismatch: {}x{} * vector of length {}",
            self.nrows, self.ncols, rhs.len(),
        );
        self.mul_vec_unchecked(rhs)
    }
}

impl<T: Scalar> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: T) -> Matrix<T> {
        self.scale(rhs)
    }
}
