//! Definite integrals of a scalar callback on `[a, b]`.
//!
//! - [`rectangle`]: composite midpoint rule, error `O(h²)`
//! - [`trapezoid`]: composite trapezoid rule, error `O(h²)`
//! - [`simpson`]: composite Simpson rule, error `O(h⁴)`
//!
//! Each rule starts from [`QuadSettings::initial_splits`] sub-intervals and
//! doubles the count until the Richardson estimate
//! `R = (I(2n) − I(n)) / (2^p − 1)` falls below the tolerance. The returned
//! value is the extrapolated `I(2n) + R`.
//!
//! ```
//! use numsolve::quad::{simpson, QuadSettings};
//!
//! let r = simpson(|x: f64| x.sin(), 0.0, core::f64::consts::PI, &QuadSettings::default()).unwrap();
//! assert!((r.value - 2.0).abs() < 1e-10);
//! ```

mod rectangle;
mod simpson;
mod trapezoid;


pub use rectangle::rectangle;
pub use simpson::simpson;
pub use trapezoid::trapezoid;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::optim::{check_bounds, check_tol};
use crate::traits::FloatScalar;

/// Settings for the quadrature rules.
#[derive(Debug, Clone, Copy)]
pub struct QuadSettings<T> {
    /// Stop once the Richardson error estimate is below this.
    pub tol: T,
    /// Sub-intervals of the first estimate (rounded up to even for Simpson).
    pub initial_splits: usize,
    /// Maximum number of split doublings.
    pub max_refinements: usize,
}

impl Default for QuadSettings<f64> {
    fn default() -> Self {
        Self {
            tol: 1e-10,
            initial_splits: 2,
            max_refinements: 20,
        }
    }
}

impl Default for QuadSettings<f32> {
    fn default() -> Self {
        Self {
            tol: 1e-5,
            initial_splits: 2,
            max_refinements: 16,
        }
    }
}

/// Result of a quadrature.
#[derive(Debug, Clone, Copy)]
pub struct QuadResult<T> {
    /// Extrapolated integral `I(splits) + R`.
    pub value: T,
    /// `|R|` of the final refinement.
    pub error_estimate: T,
    /// Sub-intervals of the finest estimate.
    pub splits: usize,
    /// Function evaluations over all refinements.
    pub evals: usize,
}

/// A composite rule: `sum(f, a, b, n)` integrates over `n` equal sub-intervals.
struct Rule<T> {
    name: &'static str,
    /// Error exponent `p` in `O(h^p)`.
    order: i32,
    even_splits: bool,
    sum: fn(&mut dyn FnMut(T) -> T, T, T, usize) -> T,
}

fn refine<T: FloatScalar, F: FnMut(T) -> T>(
    rule: &Rule<T>,
    mut f: F,
    a: T,
    b: T,
    settings: &QuadSettings<T>,
) -> Result<QuadResult<T>> {
    check_bounds(a, b)?;
    check_tol(settings.tol)?;

    let mut n = settings.initial_splits.max(1);
    if rule.even_splits && n % 2 == 1 {
        n += 1;
    }
    debug!(rule = rule.name, a = %a, b = %b, tol = %settings.tol, n, "quadrature");

    let mut evals = 0;
    let mut counted = |x: T| {
        evals += 1;
        f(x)
    };
    let denom = T::lit(2.0).powi(rule.order) - T::one();

    let mut coarse = (rule.sum)(&mut counted, a, b, n);
    let mut correction = T::infinity();
    for k in 1..=settings.max_refinements {
        n *= 2;
        let fine = (rule.sum)(&mut counted, a, b, n);
        correction = (fine - coarse) / denom;
        trace!(rule = rule.name, refinement = k, n, estimate = %fine, correction = %correction);

        if correction.abs() < settings.tol {
            let value = fine + correction;
            debug!(rule = rule.name, value = %value, splits = n, "quadrature converged");
            return Ok(QuadResult {
                value,
                error_estimate: correction.abs(),
                splits: n,
                evals,
            });
        }
        if !fine.is_finite() {
            warn!(rule = rule.name, n, "integral estimate is not finite");
            return Err(Error::Diverged { iteration: k });
        }
        coarse = fine;
    }

    warn!(rule = rule.name, max_refinements = settings.max_refinements, "quadrature did not converge");
    Err(Error::NonConvergence {
        iterations: settings.max_refinements,
        change: correction.abs().as_f64(),
    })
}
