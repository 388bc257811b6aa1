mod block;
mod norm;
mod ops;
mod square;
pub mod vector;

use core::ops::{Index, IndexMut};

use crate::error::{Error, Result};
use crate::traits::Scalar;

pub use vector::Vector;

/// Dense heap-allocated matrix with runtime dimensions.
///
/// Row-major `Vec<T>` storage. Every algorithm in the crate reads its
/// operands through `&Matrix<T>` and returns freshly allocated results; the
/// only mutation happens on private working copies.
///
/// # Examples
///
/// ```
/// use numsolve::Matrix;
///
/// let a = Matrix::from_rows(&[[1.0_f64, 2.0], [3.0, 4.0]]);
/// assert_eq!(a[(0, 1)], 2.0);
/// assert_eq!(a.nrows(), 2);
/// assert_eq!(a.ncols(), 2);
///
/// let id = Matrix::<f64>::identity(3);
/// assert_eq!(id[(1, 1)], 1.0);
/// assert_eq!(id[(0, 1)], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// Create an `nrows x ncols` matrix of zeros.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::<f64>::zeros(2, 3);
    /// assert_eq!(m.nrows(), 2);
    /// assert_eq!(m.ncols(), 3);
    /// assert_eq!(m[(1, 2)], 0.0);
    /// ```
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![T::zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Create a matrix filled with `value`.
    pub fn fill(nrows: usize, ncols: usize, value: T) -> Self {
        Self {
            data: vec![value; nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Create a matrix from a slice of fixed-length rows.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    /// assert_eq!(m[(0, 2)], 3.0);
    /// assert_eq!(m[(1, 0)], 4.0);
    /// ```
    pub fn from_rows<const N: usize>(rows: &[[T; N]]) -> Self {
        let mut data = Vec::with_capacity(rows.len() * N);
        for row in rows {
            data.extend_from_slice(row);
        }
        Self {
            data,
            nrows: rows.len(),
            ncols: N,
        }
    }

    /// Create a matrix from a flat slice in row-major order.
    ///
    /// Panics if `slice.len() != nrows * ncols`.
    pub fn from_row_slice(nrows: usize, ncols: usize, slice: &[T]) -> Self {
        assert_eq!(
            slice.len(),
            nrows * ncols,
            "slice length {} does not match {}x{} matrix",
            slice.len(),
            nrows,
            ncols,
        );
        Self {
            data: slice.to_vec(),
            nrows,
            ncols,
        }
    }

    /// Create a matrix from nested `Vec` rows, as read from user input.
    ///
    /// Fails with [`Error::DimensionMismatch`] if the rows are ragged.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let ok = Matrix::try_from_nested(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    /// assert!(ok.is_ok());
    /// let ragged = Matrix::try_from_nested(vec![vec![1.0, 2.0], vec![3.0]]);
    /// assert!(ragged.is_err());
    /// ```
    pub fn try_from_nested(rows: Vec<Vec<T>>) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(Error::mismatch((nrows, ncols), (nrows, row.len())));
            }
            data.extend(row);
        }
        Ok(Self { data, nrows, ncols })
    }
}

impl<T> Matrix<T> {
    /// Create a matrix from an owned row-major `Vec<T>`.
    ///
    /// Panics if `data.len() != nrows * ncols`.
    pub fn from_vec(nrows: usize, ncols: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            nrows * ncols,
            "vec length {} does not match {}x{} matrix",
            data.len(),
            nrows,
            ncols,
        );
        Self { data, nrows, ncols }
    }

    /// Create a matrix by calling `f(row, col)` for each element.
    ///
    /// ```
    /// use numsolve::Matrix;
    /// let m = Matrix::from_fn(3, 3, |i, j| if i == j { 1.0_f64 } else { 0.0 });
    /// assert_eq!(m, Matrix::identity(3));
    /// ```
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Whether the matrix is square.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Whether the matrix has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    /// Row `i` as a mutable slice.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    /// Row-major element storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume the matrix, returning its row-major storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // empty slices when ncols == 0, one per row
        (0..self.nrows).map(move |i| &self.data[i * self.ncols..(i + 1) * self.ncols])
    }

    /// Swap rows `a` and `b` in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.data.split_at_mut(hi * self.ncols);
        head[lo * self.ncols..(lo + 1) * self.ncols].swap_with_slice(&mut tail[..self.ncols]);
    }

    /// Swap columns `a` and `b` in place.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for i in 0..self.nrows {
            self.data.swap(i * self.ncols + a, i * self.ncols + b);
        }
    }

    /// Fail with [`Error::NotSquare`] unless square, and [`Error::Empty`] for `0x0`.
    pub(crate) fn require_square(&self) -> Result<usize> {
        if !self.is_square() {
            return Err(Error::not_square(self.nrows, self.ncols));
        }
        if self.nrows == 0 {
            return Err(Error::Empty);
        }
        Ok(self.nrows)
    }
}

impl<T: Copy> Matrix<T> {
    /// Column `j` copied into a new `Vec`.
    pub fn col(&self, j: usize) -> Vec<T> {
        (0..self.nrows).map(|i| self.data[i * self.ncols + j]).collect()
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        debug_assert!(row < self.nrows && col < self.ncols);
        &self.data[row * self.ncols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        debug_assert!(row < self.nrows && col < self.ncols);
        &mut self.data[row * self.ncols + col]
    }
}

impl<T: Scalar, const M: usize, const N: usize> From<[[T; N]; M]> for Matrix<T> {
    fn from(rows: [[T; N]; M]) -> Self {
        Matrix::from_rows(&rows)
    }
}

impl<T: core::fmt::Display> core::fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for i in 0..self.nrows {
            write!(f, "[")?;
            for j in 0..self.ncols {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.data[i * self.ncols + j])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
