use super::{refine, QuadResult, QuadSettings, Rule};
use crate::error::Result;
use crate::traits::FloatScalar;

/// Integrate `f` over `[a, b]` with the composite trapezoid rule.
pub fn trapezoid<T: FloatScalar, F: FnMut(T) -> T>(
    f: F,
    a: T,
    b: T,
    settings: &QuadSettings<T>,
) -> Result<QuadResult<T>> {
    let rule = Rule {
        name: "trapezoid",
        order: 2,
        even_splits: false,
        sum: trapezoid_sum,
    };
    refine(&rule, f, a, b, settings)
}

/// `h·(f(a)/2 + Σ f(x_i) + f(b)/2)`, `n + 1` evaluations.
fn trapezoid_sum<T: FloatScalar>(f: &mut dyn FnMut(T) -> T, a: T, b: T, n: usize) -> T {
    let h = (b - a) / T::from_count(n);
    let ends = (f(a) + f(b)) * T::lit(0.5);
    let inner = (1..n).fold(T::zero(), |acc, i| acc + f(a + T::from_count(i) * h));
    (ends + inner) * h
}
