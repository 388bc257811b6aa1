use tracing::{debug, trace, warn};

use super::{check_bounds, check_tol, SearchResult, SearchSettings};
use crate::error::{Error, Result};
use crate::traits::FloatScalar;

/// Minimize a unimodal `f` on `[a, b]` by Fibonacci search.
///
/// The number of reductions `n` is fixed up front as the smallest with
/// `F(n+2) ≥ (b − a)/tol`. Interior points sit at the ratios
/// `F(n)/F(n+2)` and `F(n+1)/F(n+2)` of the current interval, so one point
/// and its value carry over at every step.
///
/// ```
/// use numsolve::optim::{fibonacci, SearchSettings};
///
/// let r = fibonacci(|x: f64| (x - 1.0).powi(2) + (x + 5.0).powi(2), -10.0, 10.0,
///     &SearchSettings::default()).unwrap();
/// assert!((r.x + 2.0).abs() < 1e-6);
/// ```
pub fn fibonacci<T: FloatScalar, F: FnMut(T) -> T>(
    mut f: F,
    a: T,
    b: T,
    settings: &SearchSettings<T>,
) -> Result<SearchResult<T>> {
    check_bounds(a, b)?;
    check_tol(settings.tol)?;

    let ratio = (b - a) / settings.tol;
    let fib = fibonacci_table(ratio, settings.max_iter + 2).ok_or_else(|| {
        warn!(max_iter = settings.max_iter, "tolerance needs more reductions than allowed");
        Error::NonConvergence {
            iterations: settings.max_iter,
            change: (b - a).as_f64(),
        }
    })?;
    let mut n = fib.len() - 3;
    debug!(a = %a, b = %b, tol = %settings.tol, n, "fibonacci search");

    let (mut a, mut b) = (a, b);
    let mut c = a + (b - a) * fib[n] / fib[n + 2];
    let mut d = a + (b - a) * fib[n + 1] / fib[n + 2];
    let mut fc = f(c);
    let mut fd = f(d);
    let mut evals = 2;
    let mut iterations = 0;

    while n >= 2 {
        n -= 1;
        if fc <= fd {
            b = d;
            d = c;
            fd = fc;
            c = a + (b - a) * fib[n] / fib[n + 2];
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + (b - a) * fib[n + 1] / fib[n + 2];
            fd = f(d);
        }
        evals += 1;
        iterations += 1;
        trace!(iterations, a = %a, b = %b);
    }

    let x = (a + b) * T::lit(0.5);
    let fx = f(x);
    evals += 1;
    debug!(x = %x, iterations, evals, "fibonacci search finished");
    Ok(SearchResult {
        x,
        fx,
        iterations,
        evals,
    })
}

/// `F(0..=n+2)` with `F(1) = F(2) = 1`, for the smallest `n ≥ 1` such that
/// `F(n+2) ≥ ratio`. `None` if that needs an index above `max_index`.
fn fibonacci_table<T: FloatScalar>(ratio: T, max_index: usize) -> Option<Vec<T>> {
    let mut fib = vec![T::zero(), T::one(), T::one(), T::lit(2.0)];
    while fib[fib.len() - 1] < ratio {
        if fib.len() > max_index {
            return None;
        }
        let k = fib.len();
        fib.push(fib[k - 1] + fib[k - 2]);
    }
    Some(fib)
}
