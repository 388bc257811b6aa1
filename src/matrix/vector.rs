use core::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use crate::error::{Error, Result};
use crate::traits::{FloatScalar, Scalar};

/// Dense heap-allocated vector.
///
/// Paired with a square [`Matrix`](crate::Matrix) of the same order for
/// system solves.
///
/// # Examples
///
/// ```
/// use numsolve::Vector;
///
/// let v = Vector::from_slice(&[1.0_f64, 2.0, 3.0]);
/// assert_eq!(v[0], 1.0);
/// assert_eq!(v.len(), 3);
/// assert!((v.dot(&v) - 14.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T> {
    data: Vec<T>,
}

impl<T: Scalar> Vector<T> {
    /// Create a zero vector of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![T::zero(); n],
        }
    }

    /// Create a vector filled with `value`.
    pub fn fill(n: usize, value: T) -> Self {
        Self {
            data: vec![value; n],
        }
    }

    /// Create a vector from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Dot product. Panics on length mismatch.
    ///
    /// ```
    /// use numsolve::Vector;
    /// let a = Vector::from_slice(&[1.0, 2.0, 3.0]);
    /// let b = Vector::from_slice(&[4.0, 5.0, 6.0]);
    /// assert_eq!(a.dot(&b), 32.0);
    /// ```
    pub fn dot(&self, rhs: &Self) -> T {
        assert_eq!(self.len(), rhs.len(), "vector length mismatch");
        self.data
            .iter()
            .zip(&rhs.data)
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }

    /// Dot product, failing on length mismatch.
    pub fn checked_dot(&self, rhs: &Self) -> Result<T> {
        if self.len() != rhs.len() {
            return Err(Error::mismatch((self.len(), 1), (rhs.len(), 1)));
        }
        Ok(self.dot(rhs))
    }

    /// Multiply every element by `s`.
    pub fn scale(&self, s: T) -> Self {
        self.map(|x| x * s)
    }
}

impl<T> Vector<T> {
    /// Create a vector from an owned `Vec`.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View the elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// View the elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the vector, returning its storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterate over elements.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Apply `f` to every element.
    pub fn map<U>(&self, f: impl FnMut(T) -> U) -> Vector<U>
    where
        T: Copy,
    {
        Vector {
            data: self.data.iter().copied().map(f).collect(),
        }
    }
}

impl<T: FloatScalar> Vector<T> {
    /// L2 (Euclidean) norm.
    ///
    /// ```
    /// use numsolve::Vector;
    /// let v = Vector::from_slice(&[3.0_f64, 4.0]);
    /// assert!((v.norm() - 5.0).abs() < 1e-12);
    /// ```
    pub fn norm(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt()
    }

    /// L1 norm (sum of absolute values).
    pub fn norm_l1(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc + x.abs())
    }

    /// Infinity norm (largest absolute value).
    pub fn norm_inf(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
    }

    /// Largest component-wise absolute difference. Panics on length mismatch.
    ///
    /// ```
    /// use numsolve::Vector;
    /// let a = Vector::from_slice(&[1.0_f64, 2.0]);
    /// let b = Vector::from_slice(&[1.5_f64, 1.0]);
    /// assert_eq!(a.max_abs_diff(&b), 1.0);
    /// ```
    pub fn max_abs_diff(&self, rhs: &Self) -> T {
        assert_eq!(self.len(), rhs.len(), "vector length mismatch");
        self.data
            .iter()
            .zip(&rhs.data)
            .fold(T::zero(), |acc, (&a, &b)| acc.max((a - b).abs()))
    }

    /// Whether every element is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Vector<T> {
    fn from(data: [T; N]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

// ── Arithmetic ──────────────────────────────────────────────────────

impl<T: Scalar> Add<&Vector<T>> for &Vector<T> {
    type Output = Vector<T>;

    fn add(self, rhs: &Vector<T>) -> Vector<T> {
        assert_eq!(self.len(), rhs.len(), "vector length mismatch: {} + {}", self.len(), rhs.len());
        Vector {
            data: self.data.iter().zip(&rhs.data).map(|(&a, &b)| a + b).collect(),
        }
    }
}

impl<T: Scalar> Sub<&Vector<T>> for &Vector<T> {
    type Output = Vector<T>;

    fn sub(self, rhs: &Vector<T>) -> Vector<T> {
        assert_eq!(self.len(), rhs.len(), "vector length mismatch: {} - {}", self.len(), rhs.len());
        Vector {
            data: self.data.iter().zip(&rhs.data).map(|(&a, &b)| a - b).collect(),
        }
    }
}

impl<T: Scalar> Mul<T> for &Vector<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: T) -> Vector<T> {
        self.scale(rhs)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for &Vector<T> {
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        self.map(|x| -x)
    }
}
