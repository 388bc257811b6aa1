use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::FloatScalar;
use crate::Matrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Winograd's inner-product multiplication of an `m x k` by a `k x p` matrix.
///
/// Pair products within each row of `A` and each column of `B` are computed
/// once up front, so each output element needs only `k/2` multiplications:
///
/// `c_ij = Σ_t (a_i,2t + b_2t+1,j)(a_i,2t+1 + b_2t,j) − row_i − col_j`
///
/// plus `a_i,k−1 · b_k−1,j` when `k` is odd.
///
/// ```
/// use numsolve::Matrix;
/// use numsolve::linalg::winograd;
///
/// let a = Matrix::from_rows(&[[1.0_f64, 2.0, 3.0], [4.0, 5.0, 6.0]]);
/// let b = Matrix::from_rows(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]);
/// let c = winograd(&a, &b).unwrap();
/// assert_eq!(c, Matrix::from_rows(&[[58.0, 64.0], [139.0, 154.0]]));
/// ```
pub fn winograd<T: FloatScalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    let factors = Factors::new(a, b)?;
    let (m, p) = (a.nrows(), b.ncols());
    debug!(m, k = a.ncols(), p, "winograd multiply");

    let mut c = Matrix::zeros(m, p);
    for i in 0..m {
        factors.fill_row(a, b, i, c.row_mut(i));
    }
    Ok(c)
}

/// [`winograd`] with output rows computed in parallel.
#[cfg(feature = "parallel")]
pub fn winograd_parallel<T: FloatScalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    let factors = Factors::new(a, b)?;
    let (m, p) = (a.nrows(), b.ncols());
    debug!(m, k = a.ncols(), p, "parallel winograd multiply");

    let mut data = vec![T::zero(); m * p];
    if p > 0 {
        data.par_chunks_mut(p)
            .enumerate()
            .for_each(|(i, row)| factors.fill_row(a, b, i, row));
    }
    Ok(Matrix::from_vec(m, p, data))
}

/// Precomputed pair products.
struct Factors<T> {
    row: Vec<T>,
    col: Vec<T>,
}

impl<T: FloatScalar> Factors<T> {
    fn new(a: &Matrix<T>, b: &Matrix<T>) -> Result<Self> {
        if a.ncols() != b.nrows() {
            return Err(Error::mismatch((a.ncols(), b.ncols()), b.shape()));
        }
        let half = a.ncols() / 2;
        let row = a
            .rows()
            .map(|r| (0..half).fold(T::zero(), |acc, t| acc + r[2 * t] * r[2 * t + 1]))
            .collect();
        let col = (0..b.ncols())
            .map(|j| {
                (0..half).fold(T::zero(), |acc, t| acc + b[(2 * t, j)] * b[(2 * t + 1, j)])
            })
            .collect();
        Ok(Self { row, col })
    }

    fn fill_row(&self, a: &Matrix<T>, b: &Matrix<T>, i: usize, out: &mut [T]) {
        let k = a.ncols();
        let half = k / 2;
        let a_row = a.row(i);
        for (j, c_ij) in out.iter_mut().enumerate() {
            let mut sum = -self.row[i] - self.col[j];
            for t in 0..half {
                sum = sum + (a_row[2 * t] + b[(2 * t + 1, j)]) * (a_row[2 * t + 1] + b[(2 * t, j)]);
            }
            if k % 2 == 1 {
                sum = sum + a_row[k - 1] * b[(k - 1, j)];
            }
            *c_ij = sum;
        }
    }
}
