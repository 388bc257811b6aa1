use super::{refine, QuadResult, QuadSettings, Rule};
use crate::error::Result;
use crate::traits::FloatScalar;

/// Integrate `f` over `[a, b]` with the composite Simpson rule.
///
/// Exact for cubics, so the first refinement already meets any tolerance.
///
/// ```
/// use numsolve::quad::{simpson, QuadSettings};
///
/// let r = simpson(|x: f64| x * x * x, 0.0, 2.0, &QuadSettings::default()).unwrap();
/// assert!((r.value - 4.0).abs() < 1e-12);
/// assert_eq!(r.splits, 4);
/// ```
pub fn simpson<T: FloatScalar, F: FnMut(T) -> T>(
    f: F,
    a: T,
    b: T,
    settings: &QuadSettings<T>,
) -> Result<QuadResult<T>> {
    let rule = Rule {
        name: "simpson",
        order: 4,
        even_splits: true,
        sum: simpson_sum,
    };
    refine(&rule, f, a, b, settings)
}

/// `h/3·(f_0 + 4·Σ f_odd + 2·Σ f_even + f_n)` for even `n`.
fn simpson_sum<T: FloatScalar>(f: &mut dyn FnMut(T) -> T, a: T, b: T, n: usize) -> T {
    let h = (b - a) / T::from_count(n);
    let mut odd = T::zero();
    let mut even = T::zero();
    for i in 1..n {
        let fx = f(a + T::from_count(i) * h);
        if i % 2 == 1 {
            odd = odd + fx;
        } else {
            even = even + fx;
        }
    }
    (f(a) + f(b) + T::lit(4.0) * odd + T::lit(2.0) * even) * h / T::lit(3.0)
}
