//! Crate-wide error type.
//!
//! Every algorithm returns [`Result<T>`]; success carries the value, failure
//! carries an [`Error`] whose `Display` is a human-readable description.
//! [`Error::kind`] groups variants into the coarse taxonomy callers branch on.
//!
//! ```
//! use numsolve::{Matrix, Vector, ErrorKind};
//! use numsolve::linalg::{gauss_solve, Pivoting};
//!
//! let a = Matrix::from_rows(&[[1.0_f64, 2.0], [0.0, 0.0]]);
//! let b = Vector::from_slice(&[1.0, 2.0]);
//! let err = gauss_solve(&a, &b, Pivoting::PartialByColumn).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Singularity);
//! ```

use thiserror::Error;

/// Crate result alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Coarse failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Dimension mismatch, non-square input, or violated structure.
    Shape,
    /// Zero or near-zero pivot, rank deficiency.
    Singularity,
    /// `a >= b`, non-finite bounds, or a non-positive tolerance.
    DegenerateInterval,
    /// An iterative method ran out of budget or diverged.
    NonConvergence,
    /// The function has a local maximum at the search start point.
    NotUnimodal,
    /// A parallel computation timed out or one of its branches panicked.
    Parallel,
}

/// Errors from every algorithm in the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Operation requires a square matrix.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Operand shapes do not conform.
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .got.0, .got.1)]
    DimensionMismatch {
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Got `(rows, cols)`.
        got: (usize, usize),
    },

    /// Operation requires at least one row and column.
    #[error("matrix or vector is empty")]
    Empty,

    /// Row or column index past the matrix bounds.
    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// A non-zero entry lies outside the three central diagonals.
    #[error("matrix is not tridiagonal: non-zero entry at ({row}, {col})")]
    NotTridiagonal { row: usize, col: usize },

    /// Entries `(row, col)` and `(col, row)` differ.
    #[error("matrix is not symmetric: ({row}, {col}) differs from its transpose entry")]
    NotSymmetric { row: usize, col: usize },

    /// Elimination met a zero (or below-tolerance) pivot.
    #[error("matrix is singular: zero pivot at elimination step {step}")]
    Singular { step: usize },

    /// Columns are linearly dependent.
    #[error("matrix is rank deficient: column {column} is linearly dependent on earlier columns")]
    RankDeficient { column: usize },

    /// Search or integration interval is empty, reversed, or not finite.
    #[error("degenerate interval [{a}, {b}]")]
    DegenerateInterval { a: f64, b: f64 },

    /// Tolerance must be positive and finite.
    #[error("tolerance must be positive and finite, got {tol}")]
    InvalidTolerance { tol: f64 },

    /// Iteration budget exhausted before meeting the tolerance.
    #[error("no convergence after {iterations} iterations (last change {change:e})")]
    NonConvergence { iterations: usize, change: f64 },

    /// The iterate became NaN or infinite.
    #[error("iteration diverged at step {iteration}")]
    Diverged { iteration: usize },

    /// Strict diagonal dominance was requested and does not hold.
    #[error("matrix is not strictly diagonally dominant in row {row}")]
    NotDiagonallyDominant { row: usize },

    /// Bracketing started at a local maximum.
    #[error("function is not unimodal around x = {x}: start point is a local maximum")]
    NotUnimodal { x: f64 },

    /// Parallel computation did not finish in time.
    #[error("parallel computation did not finish within {millis} ms")]
    Timeout { millis: u128 },

    /// A parallel branch panicked.
    #[error("parallel task panicked: {message}")]
    TaskPanicked { message: String },
}

impl Error {
    /// Coarse class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotSquare { .. }
            | Error::DimensionMismatch { .. }
            | Error::Empty
            | Error::IndexOutOfBounds { .. }
            | Error::NotSymmetric { .. }
            | Error::NotTridiagonal { .. } => ErrorKind::Shape,
            Error::Singular { .. } | Error::RankDeficient { .. } => ErrorKind::Singularity,
            Error::DegenerateInterval { .. } | Error::InvalidTolerance { .. } => {
                ErrorKind::DegenerateInterval
            }
            Error::NonConvergence { .. }
            | Error::Diverged { .. }
            | Error::NotDiagonallyDominant { .. } => ErrorKind::NonConvergence,
            Error::NotUnimodal { .. } => ErrorKind::NotUnimodal,
            Error::Timeout { .. } | Error::TaskPanicked { .. } => ErrorKind::Parallel,
        }
    }

    pub(crate) fn not_square(rows: usize, cols: usize) -> Self {
        Error::NotSquare { rows, cols }
    }

    pub(crate) fn mismatch(expected: (usize, usize), got: (usize, usize)) -> Self {
        Error::DimensionMismatch { expected, got }
    }
}
