use tracing::{debug, trace, warn};

use super::{check_bounds, check_tol, SearchResult, SearchSettings};
use crate::error::{Error, Result};
use crate::traits::FloatScalar;

/// Minimize a unimodal `f` on `[a, b]` by golden-section search.
///
/// Interior points sit at `a + ρ(b − a)` and `b − ρ(b − a)` with
/// `ρ = (3 − √5)/2`. Each step keeps the sub-interval around the lower of
/// the two values, so one interior point and its function value carry over.
///
/// ```
/// use numsolve::optim::{golden_section, SearchSettings};
///
/// let r = golden_section(|x: f64| (x - 1.0).powi(2) + (x + 5.0).powi(2), -10.0, 10.0,
///     &SearchSettings::default()).unwrap();
/// assert!((r.x + 2.0).abs() < 1e-6);
/// assert!((r.fx - 18.0).abs() < 1e-9);
/// ```
pub fn golden_section<T: FloatScalar, F: FnMut(T) -> T>(
    mut f: F,
    a: T,
    b: T,
    settings: &SearchSettings<T>,
) -> Result<SearchResult<T>> {
    check_bounds(a, b)?;
    check_tol(settings.tol)?;
    debug!(a = %a, b = %b, tol = %settings.tol, "golden-section search");

    let rho = (T::lit(3.0) - T::lit(5.0).sqrt()) * T::lit(0.5);
    let (mut a, mut b) = (a, b);
    let mut y = a + rho * (b - a);
    let mut z = b - rho * (b - a);
    let mut fy = f(y);
    let mut fz = f(z);
    let mut evals = 2;
    let mut iterations = 0;

    while b - a > settings.tol {
        if iterations == settings.max_iter {
            warn!(iterations, width = %(b - a), "golden-section search hit the iteration cap");
            return Err(Error::NonConvergence {
                iterations,
                change: (b - a).as_f64(),
            });
        }
        if fy <= fz {
            b = z;
            z = y;
            fz = fy;
            y = a + rho * (b - a);
            fy = f(y);
        } else {
            a = y;
            y = z;
            fy = fz;
            z = b - rho * (b - a);
            fz = f(z);
        }
        evals += 1;
        iterations += 1;
        trace!(iterations, a = %a, b = %b);
    }

    let x = (a + b) * T::lit(0.5);
    let fx = f(x);
    evals += 1;
    debug!(x = %x, iterations, evals, "golden-section search finished");
    Ok(SearchResult {
        x,
        fx,
        iterations,
        evals,
    })
}
