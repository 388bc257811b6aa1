//! # numsolve
//!
//! Dense linear-system solvers, matrix factorizations, fast matrix
//! multiplication, and scalar search / quadrature over a function callback.
//!
//! ## Quick start
//!
//! ```
//! use numsolve::{Matrix, Vector};
//! use numsolve::linalg::{gauss_solve, Pivoting};
//!
//! let a = Matrix::from_rows(&[[4.0_f64, 1.0], [2.0, 3.0]]);
//! let b = Vector::from_slice(&[1.0, 2.0]);
//! let x = gauss_solve(&a, &b, Pivoting::Complete).unwrap();
//! assert!((x[0] - 0.1).abs() < 1e-12);
//! assert!((x[1] - 0.6).abs() < 1e-12);
//! ```
//!
//! ## Modules
//!
//! - [`matrix`]: Heap-allocated row-major `Matrix<T>` with runtime
//!   dimensions, and the [`Vector<T>`] newtype. Arithmetic (panicking
//!   operators plus `checked_*` variants), norms, block access, and
//!   square-matrix operations: `det`, `minor`, `cofactor`, `adjoint`,
//!   `inverse`.
//!
//! - [`linalg`]: Gauss elimination with four pivoting strategies, the
//!   Thomas tridiagonal sweep, Jacobi and Gauss–Seidel iteration, LU
//!   (Doolittle) and QR (Gram–Schmidt or Householder) decompositions, SVD,
//!   symmetric eigendecomposition, and Strassen and Winograd multiplication.
//!   With the `parallel` feature the seven Strassen products run on the
//!   rayon pool, optionally under a bounded wait.
//!
//! - [`optim`]: Svenn bracketing, golden-section and Fibonacci search for
//!   the minimum of a unimodal function.
//!
//! - [`quad`]: Rectangle, trapezoid and Simpson quadrature with Richardson
//!   refinement.
//!
//! - [`error`]: The crate [`Error`], its coarse [`ErrorKind`], and the
//!   [`Result`] alias every algorithm returns.
//!
//! - [`traits`]: Element trait hierarchy:
//!   - [`Scalar`]: all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`]: `f32` / `f64`, used by every algorithm
//!
//! ## Logging
//!
//! Algorithms emit `tracing` events: `debug` on start and finish, `trace`
//! per iteration or pivot, `warn` when giving up. Install any subscriber to
//! see them.
//!
//! ## Cargo features
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `parallel` | yes     | rayon-backed `strassen_parallel`, `strassen_parallel_timeout`, `winograd_parallel` |

pub mod error;
pub mod linalg;
pub mod matrix;
pub mod optim;
pub mod quad;
pub mod traits;

pub use error::{Error, ErrorKind, Result};
pub use matrix::vector::Vector;
pub use matrix::Matrix;
pub use traits::{FloatScalar, Scalar};
