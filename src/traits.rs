use core::fmt::{Debug, Display};
use num_traits::{Float, FromPrimitive, Num, One, Zero};

/// Trait for types that can be stored in a [`Matrix`](crate::Matrix) or
/// [`Vector`](crate::Vector).
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, and all integer types.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for floating-point elements used by every solver and factorization.
///
/// Required by operations that need `abs`, `sqrt`, comparisons against a
/// tolerance, or conversion of small integer constants.
/// `Send + Sync` lets the same element type flow through the parallel
/// Strassen variant.
pub trait FloatScalar: Scalar + Float + FromPrimitive + Display + Send + Sync + 'static {
    /// Convert a small `f64` constant into `Self`.
    ///
    /// Only used for literals that are exactly representable in every
    /// float type (`0.5`, `2.0`, `4.0`, ...).
    #[inline]
    fn lit(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).unwrap_or_else(Self::nan)
    }

    /// Convert a count (split number, iteration index) into `Self`.
    #[inline]
    fn from_count(n: usize) -> Self {
        <Self as FromPrimitive>::from_usize(n).unwrap_or_else(Self::infinity)
    }

    /// Widen to `f64` for error payloads and log fields.
    #[inline]
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl<T: Scalar + Float + FromPrimitive + Display + Send + Sync + 'static> FloatScalar for T {}
