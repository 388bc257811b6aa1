//! Linear systems, factorizations and matrix multiplication.
//!
//! # Direct solvers
//!
//! - [`gauss_solve`]: Gaussian elimination with a selectable [`Pivoting`] strategy
//! - [`thomas_solve`]: `O(n)` tridiagonal solve, with optional structure check
//! - [`determinant`] / [`inverse`]: elimination with row pivoting
//!
//! # Iterative solvers
//!
//! - [`jacobi`] and [`seidel`], capped by [`IterativeSettings::max_iter`]
//!
//! # Factorizations
//!
//! - [`LuDecomposition`]: Doolittle, no pivoting
//! - [`QrDecomposition`]: modified Gram–Schmidt or Householder
//! - [`SvdDecomposition`]: Golub–Kahan SVD with `norm2`, `cond` and `rank`
//! - [`SymmetricEigen`]: Householder tridiagonalization plus implicit QR
//!
//! # Multiplication
//!
//! - [`strassen`]: seven-product recursion, padding to a power of two
//! - `strassen_parallel` / `strassen_parallel_timeout`: rayon fork-join
//!   (feature `parallel`)
//! - [`winograd`]: inner-product scheme for any conforming shapes

pub(crate) mod gauss;
mod iterative;
mod lu;
mod qr;
mod strassen;
mod svd;
mod symmetric_eigen;
mod thomas;
mod winograd;


pub use gauss::{determinant, gauss_solve, gauss_solve_with, inverse, GaussSettings, Pivoting};
pub use iterative::{jacobi, seidel, IterativeSettings, IterativeSolution, StopCriterion};
pub use lu::{lu_in_place, lu_solve, LuDecomposition};
pub use qr::{householder_in_place, QrDecomposition, QrMethod, QrSettings};
pub use strassen::{strassen, strassen_with, StrassenSettings, StrassenVariant};
#[cfg(feature = "parallel")]
pub use strassen::{strassen_parallel, strassen_parallel_timeout};
pub use svd::SvdDecomposition;
pub use symmetric_eigen::SymmetricEigen;
pub use thomas::{thomas_solve, thomas_solve_bands, thomas_solve_with, ThomasSettings};
pub use winograd::winograd;
#[cfg(feature = "parallel")]
pub use winograd::winograd_parallel;
