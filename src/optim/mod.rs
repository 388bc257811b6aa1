//! One-dimensional minimization over a scalar callback.
//!
//! - [`svenn`]: bracket a minimum by geometric step expansion from a start point
//! - [`golden_section`]: shrink a bracket by the golden ratio
//! - [`fibonacci`]: shrink a bracket by Fibonacci ratios, with the iteration
//!   count fixed up front from the tolerance
//!
//! Golden-section and Fibonacci search assume the function is unimodal on
//! the interval. Each iteration discards the sub-interval that cannot hold
//! the minimum and reuses one interior evaluation from the previous step.
//!
//! ```
//! use numsolve::optim::{golden_section, svenn, SearchSettings, SvennSettings};
//!
//! let f = |x: f64| (x - 1.0).powi(2) + (x + 5.0).powi(2);
//! let bracket = svenn(f, 7.0, &SvennSettings::default()).unwrap();
//! assert!(bracket.contains(-2.0));
//!
//! let r = golden_section(f, bracket.a, bracket.b, &SearchSettings::default()).unwrap();
//! assert!((r.x + 2.0).abs() < 1e-6);
//! ```

mod fibonacci;
mod golden_section;
mod svenn;


pub use fibonacci::fibonacci;
pub use golden_section::golden_section;
pub use svenn::{svenn, SvennSettings};

use crate::error::{Error, Result};
use crate::traits::FloatScalar;

/// Closed interval `[a, b]` with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<T> {
    /// Lower bound.
    pub a: T,
    /// Upper bound.
    pub b: T,
}

impl<T: FloatScalar> Interval<T> {
    /// Create an interval, failing with [`Error::DegenerateInterval`] unless
    /// both bounds are finite and `a < b`.
    pub fn new(a: T, b: T) -> Result<Self> {
        check_bounds(a, b)?;
        Ok(Self { a, b })
    }

    /// `b − a`.
    pub fn width(&self) -> T {
        self.b - self.a
    }

    /// `(a + b) / 2`.
    pub fn midpoint(&self) -> T {
        (self.a + self.b) * T::lit(0.5)
    }

    /// Whether `x` lies in `[a, b]`.
    pub fn contains(&self, x: T) -> bool {
        self.a <= x && x <= self.b
    }
}

impl<T: core::fmt::Display> core::fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}]", self.a, self.b)
    }
}

/// Settings for [`golden_section`] and [`fibonacci`].
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings<T> {
    /// Stop once the bracket is no wider than this.
    pub tol: T,
    /// Maximum number of interval reductions.
    pub max_iter: usize,
}

impl Default for SearchSettings<f64> {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            max_iter: 500,
        }
    }
}

impl Default for SearchSettings<f32> {
    fn default() -> Self {
        Self {
            tol: 1e-4,
            max_iter: 500,
        }
    }
}

/// Result of a bracketing minimization.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult<T> {
    /// Midpoint of the final bracket.
    pub x: T,
    /// `f(x)`.
    pub fx: T,
    /// Interval reductions performed.
    pub iterations: usize,
    /// Function evaluations.
    pub evals: usize,
}

/// Fail with [`Error::DegenerateInterval`] unless `a < b` and both are finite.
pub(crate) fn check_bounds<T: FloatScalar>(a: T, b: T) -> Result<()> {
    if a.is_finite() && b.is_finite() && a < b {
        Ok(())
    } else {
        Err(Error::DegenerateInterval {
            a: a.as_f64(),
            b: b.as_f64(),
        })
    }
}

/// Fail with [`Error::InvalidTolerance`] unless `tol` is positive and finite.
pub(crate) fn check_tol<T: FloatScalar>(tol: T) -> Result<()> {
    if tol > T::zero() && tol.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidTolerance { tol: tol.as_f64() })
    }
}
