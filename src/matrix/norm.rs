use crate::traits::FloatScalar;

use super::Matrix;

impl<T: FloatScalar> Matrix<T> {
    /// Frobenius norm (square root of the sum of squared elements).
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::from_rows(&[[1.0_f64, 2.0], [3.0, 4.0]]);
    /// assert!((m.frobenius_norm() - 30.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn frobenius_norm(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt()
    }

    /// Infinity norm (maximum absolute row sum).
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::from_rows(&[[1.0_f64, -2.0], [3.0, 4.0]]);
    /// assert!((m.norm_inf() - 7.0).abs() < 1e-12);
    /// ```
    pub fn norm_inf(&self) -> T {
        self.rows()
            .map(|row| row.iter().fold(T::zero(), |acc, &x| acc + x.abs()))
            .fold(T::zero(), T::max)
    }

    /// One norm (maximum absolute column sum).
    pub fn norm_one(&self) -> T {
        let mut best = T::zero();
        for j in 0..self.ncols {
            let mut sum = T::zero();
            for i in 0..self.nrows {
                sum = sum + self[(i, j)].abs();
            }
            best = best.max(sum);
        }
        best
    }

    /// Largest absolute element.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
    }

    /// Largest element-wise absolute difference. Panics on shape mismatch.
    pub fn max_abs_diff(&self, rhs: &Matrix<T>) -> T {
        assert_eq!(self.shape(), rhs.shape(), "dimension mismatch");
        self.data
            .iter()
            .zip(&rhs.data)
            .fold(T::zero(), |acc, (&a, &b)| acc.max((a - b).abs()))
    }

    /// Whether shapes match and every element is within `tol`.
    pub fn approx_eq(&self, rhs: &Matrix<T>, tol: T) -> bool {
        self.shape() == rhs.shape() && self.max_abs_diff(rhs) <= tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norms() {
        let m = Matrix::from_rows(&[[1.0_f64, -2.0], [-3.0, 4.0]]);
        assert_eq!(m.norm_inf(), 7.0);
        assert_eq!(m.norm_one(), 6.0);
        assert_eq!(m.max_abs(), 4.0);
        assert!((m.frobenius_norm() - 30.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn approx_eq() {
        let a = Matrix::from_rows(&[[1.0_f64, 2.0]]);
        let b = Matrix::from_rows(&[[1.0_f64 + 1e-10, 2.0]]);
        assert!(a.approx_eq(&b, 1e-9));
        assert!(!a.approx_eq(&b, 1e-11));
        assert!(!a.approx_eq(&Matrix::zeros(2, 1), 1.0));
    }
}
