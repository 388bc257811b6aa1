use tracing::{debug, trace, warn};

use super::{check_tol, Interval};
use crate::error::{Error, Result};
use crate::traits::FloatScalar;

/// Settings for [`svenn`].
#[derive(Debug, Clone, Copy)]
pub struct SvennSettings<T> {
    /// Initial step `h`; step `k` moves `2^k·h`.
    pub step: T,
    /// Maximum number of step doublings before giving up.
    pub max_expansions: usize,
}

impl Default for SvennSettings<f64> {
    fn default() -> Self {
        Self {
            step: 1e-6,
            max_expansions: 100,
        }
    }
}

impl Default for SvennSettings<f32> {
    fn default() -> Self {
        Self {
            step: 1e-3,
            max_expansions: 60,
        }
    }
}

/// Bracket a minimum of `f` starting from `x0` (Svenn's method).
///
/// Compares `f(x0 − h)`, `f(x0)`, `f(x0 + h)`. If `x0` is already the lowest
/// of the three the bracket is `[x0 − h, x0 + h]`; if it is the highest,
/// `x0` sits on a local maximum and the call fails with
/// [`Error::NotUnimodal`]. Otherwise it walks downhill with steps
/// `x_{k+1} = x_k + 2^k·Δ` until `f` stops decreasing and returns
/// `[x_{k−1}, x_{k+1}]`.
///
/// ```
/// use numsolve::optim::{svenn, SvennSettings};
///
/// let f = |x: f64| (x - 3.0).powi(2);
/// let s = SvennSettings { step: 0.5, max_expansions: 50 };
/// let bracket = svenn(f, -4.0, &s).unwrap();
/// assert!(bracket.contains(3.0));
/// ```
pub fn svenn<T: FloatScalar, F: FnMut(T) -> T>(
    mut f: F,
    x0: T,
    settings: &SvennSettings<T>,
) -> Result<Interval<T>> {
    let h = settings.step;
    check_tol(h)?;
    if !x0.is_finite() {
        return Err(Error::DegenerateInterval {
            a: x0.as_f64(),
            b: x0.as_f64(),
        });
    }
    debug!(x0 = %x0, step = %h, "svenn bracketing");

    let (f_left, f_mid, f_right) = (f(x0 - h), f(x0), f(x0 + h));
    if f_left >= f_mid && f_mid <= f_right {
        return Ok(Interval { a: x0 - h, b: x0 + h });
    }
    if f_left <= f_mid && f_mid >= f_right {
        warn!(x0 = %x0, "start point is a local maximum");
        return Err(Error::NotUnimodal { x: x0.as_f64() });
    }

    // Exactly one side is downhill here.
    let (delta, f_first) = if f_left >= f_mid { (h, f_right) } else { (-h, f_left) };

    let mut prev = x0;
    let mut cur = x0 + delta;
    let mut f_cur = f_first;
    let mut scale = T::one();
    for k in 1..=settings.max_expansions {
        scale = scale * T::lit(2.0);
        let next = cur + scale * delta;
        let f_next = f(next);
        trace!(k, x = %next, fx = %f_next, "svenn step");

        if f_next >= f_cur {
            let (a, b) = if prev < next { (prev, next) } else { (next, prev) };
            debug!(a = %a, b = %b, expansions = k, "bracket found");
            return Ok(Interval { a, b });
        }
        prev = cur;
        cur = next;
        f_cur = f_next;
    }

    warn!(max_expansions = settings.max_expansions, "function kept decreasing");
    Err(Error::NonConvergence {
        iterations: settings.max_expansions,
        change: (cur - prev).abs().as_f64(),
    })
}
