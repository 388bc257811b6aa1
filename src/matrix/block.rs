use crate::traits::Scalar;

use super::Matrix;

// ── Block extraction & insertion ────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// Extract the `rows x cols` block starting at `(i, j)`.
    ///
    /// Panics if the block extends beyond the matrix bounds.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
    /// let b = m.submatrix(1, 1, 2, 2);
    /// assert_eq!(b, Matrix::from_rows(&[[5.0, 6.0], [8.0, 9.0]]));
    /// ```
    pub fn submatrix(&self, i: usize, j: usize, rows: usize, cols: usize) -> Matrix<T> {
        assert!(
            i + rows <= self.nrows && j + cols <= self.ncols,
            "submatrix ({i},{j}) size {rows}x{cols} out of bounds for {}x{} matrix",
            self.nrows,
            self.ncols,
        );
        let mut data = Vec::with_capacity(rows * cols);
        for r in i..i + rows {
            data.extend_from_slice(&self.row(r)[j..j + cols]);
        }
        Matrix::from_vec(rows, cols, data)
    }

    /// Write `src` into self starting at `(i, j)`.
    ///
    /// Panics if the block extends beyond the matrix bounds.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let mut m = Matrix::<f64>::zeros(3, 3);
    /// m.set_submatrix(1, 1, &Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]));
    /// assert_eq!(m[(1, 1)], 1.0);
    /// assert_eq!(m[(2, 2)], 4.0);
    /// ```
    pub fn set_submatrix(&mut self, i: usize, j: usize, src: &Matrix<T>) {
        assert!(
            i + src.nrows <= self.nrows && j + src.ncols <= self.ncols,
            "set_submatrix ({i},{j}) size {}x{} out of bounds for {}x{} matrix",
            src.nrows,
            src.ncols,
            self.nrows,
            self.ncols,
        );
        for (r, src_row) in src.rows().enumerate() {
            self.row_mut(i + r)[j..j + src.ncols].copy_from_slice(src_row);
        }
    }

    /// Copy into the top-left corner of an `nrows x ncols` zero matrix.
    ///
    /// Panics if the target is smaller than self.
    pub fn padded(&self, nrows: usize, ncols: usize) -> Matrix<T> {
        assert!(
            nrows >= self.nrows && ncols >= self.ncols,
            "cannot pad {}x{} matrix to {nrows}x{ncols}",
            self.nrows,
            self.ncols,
        );
        if (nrows, ncols) == self.shape() {
            return self.clone();
        }
        let mut out = Matrix::zeros(nrows, ncols);
        out.set_submatrix(0, 0, self);
        out
    }
}

// ── Quadrants ───────────────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// Split an even-order square matrix into `[A11, A12, A21, A22]`.
    pub(crate) fn quadrants(&self) -> [Matrix<T>; 4] {
        debug_assert!(self.is_square() && self.nrows % 2 == 0);
        let h = self.nrows / 2;
        [
            self.submatrix(0, 0, h, h),
            self.submatrix(0, h, h, h),
            self.submatrix(h, 0, h, h),
            self.submatrix(h, h, h, h),
        ]
    }

    /// Assemble four equal square blocks into one matrix of twice the order.
    pub(crate) fn from_quadrants(c11: &Matrix<T>, c12: &Matrix<T>, c21: &Matrix<T>, c22: &Matrix<T>) -> Matrix<T> {
        let h = c11.nrows;
        let mut out = Matrix::zeros(2 * h, 2 * h);
        out.set_submatrix(0, 0, c11);
        out.set_submatrix(0, h, c12);
        out.set_submatrix(h, 0, c21);
        out.set_submatrix(h, h, c22);
        out
    }
}
