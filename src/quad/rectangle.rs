use super::{refine, QuadResult, QuadSettings, Rule};
use crate::error::Result;
use crate::traits::FloatScalar;

/// Integrate `f` over `[a, b]` with the composite midpoint (rectangle) rule.
///
/// ```
/// use numsolve::quad::{rectangle, QuadSettings};
///
/// let r = rectangle(|x: f64| x * x, 0.0, 1.0, &QuadSettings::default()).unwrap();
/// assert!((r.value - 1.0 / 3.0).abs() < 1e-10);
/// ```
pub fn rectangle<T: FloatScalar, F: FnMut(T) -> T>(
    f: F,
    a: T,
    b: T,
    settings: &QuadSettings<T>,
) -> Result<QuadResult<T>> {
    let rule = Rule {
        name: "rectangle",
        order: 2,
        even_splits: false,
        sum: midpoint_sum,
    };
    refine(&rule, f, a, b, settings)
}

fn midpoint_sum<T: FloatScalar>(f: &mut dyn FnMut(T) -> T, a: T, b: T, n: usize) -> T {
    let h = (b - a) / T::from_count(n);
    let half = T::lit(0.5);
    let sum = (0..n).fold(T::zero(), |acc, i| acc + f(a + (T::from_count(i) + half) * h));
    sum * h
}
