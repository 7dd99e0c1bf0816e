//! Invertible scalar transforms
//!
//! A [`Transform`] decouples the natural scale of a parameter from the scale an
//! optimizer works on. Transforms are stateless (or immutable once built), so a
//! single instance can be shared by any number of parameters through an `Arc`.
//!
//! Transforms never check their domain: `LogTransform::forward(-1.0)` is NaN, not an
//! error. Keeping values inside a compatible domain is the job of the [`Limits`]
//! attached to the owning parameter.

use crate::parameters::limits::Limits;
use crate::parameters::scalar::Scalar;
use std::fmt;

/// A reversible, differentiable transformation of a real scalar value
///
/// Implementations must satisfy `reverse(forward(x)) == x` (to rounding error) for
/// every `x` in their domain, and `derivative(x)` must be the derivative of
/// `forward` at `x`.
pub trait Transform<T: Scalar>: fmt::Debug + fmt::Display + Send + Sync {
    /// A description of this transform
    fn description(&self) -> &str;

    /// The derivative of `forward` at `x`
    fn derivative(&self, x: T) -> T;

    /// The transformed value of `x`
    fn forward(&self, x: T) -> T;

    /// The original value given a transformed value `y`
    fn reverse(&self, y: T) -> T;
}

/// The identity transform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityTransform;

impl<T: Scalar> Transform<T> for IdentityTransform {
    fn description(&self) -> &str {
        "Identity (unit) transform"
    }

    #[inline]
    fn derivative(&self, _x: T) -> T {
        T::one()
    }

    #[inline]
    fn forward(&self, x: T) -> T {
        x
    }

    #[inline]
    fn reverse(&self, y: T) -> T {
        y
    }
}

impl fmt::Display for IdentityTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityTransform()")
    }
}

/// Natural (base e) logarithmic transform, valid for `x > 0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogTransform;

impl<T: Scalar> Transform<T> for LogTransform {
    fn description(&self) -> &str {
        "Natural (base e) logarithmic transform"
    }

    #[inline]
    fn derivative(&self, x: T) -> T {
        T::one() / x
    }

    #[inline]
    fn forward(&self, x: T) -> T {
        x.ln()
    }

    #[inline]
    fn reverse(&self, y: T) -> T {
        y.exp()
    }
}

impl fmt::Display for LogTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogTransform()")
    }
}

/// Base 10 logarithmic transform, valid for `x > 0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Log10Transform;

impl<T: Scalar> Transform<T> for Log10Transform {
    fn description(&self) -> &str {
        "Base 10 logarithmic transform"
    }

    /// `d/dx log10(x) = 1 / (x ln 10)`
    #[inline]
    fn derivative(&self, x: T) -> T {
        T::one() / (x * T::from_f64(std::f64::consts::LN_10))
    }

    #[inline]
    fn forward(&self, x: T) -> T {
        x.log10()
    }

    #[inline]
    fn reverse(&self, y: T) -> T {
        T::from_f64(10.0).powf(y)
    }
}

impl fmt::Display for Log10Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Log10Transform()")
    }
}

/// Minuit-style transform mapping a bounded range onto an unbounded scale
///
/// The forward direction takes a value inside the limits to the optimizer's
/// unbounded scale; the reverse direction maps any real back inside the limits.
///
/// - both bounds: `asin(2 (x - min) / (max - min) - 1)`
/// - lower bound only: `sqrt((x - min + 1)^2 - 1)`
/// - upper bound only: `sqrt((max - x + 1)^2 - 1)`
/// - unbounded: identity
///
/// Degenerate limits (`min == max`) admit a single value: `forward` maps it to 0
/// with derivative 0, and `reverse` always returns `min`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedTransform<T> {
    limits: Limits<T>,
}

impl<T: Scalar> BoundedTransform<T> {
    /// Create a bounded transform for the given limits
    ///
    /// # Examples
    ///
    /// ```
    /// use modelfit_params::parameters::{BoundedTransform, Limits, Transform};
    ///
    /// let transform = BoundedTransform::new(Limits::new(0.0_f64, 10.0, "").unwrap());
    /// let internal = transform.forward(7.5);
    /// assert!((transform.reverse(internal) - 7.5).abs() < 1e-12);
    /// ```
    pub fn new(limits: Limits<T>) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits<T> {
        &self.limits
    }

    fn two() -> T {
        T::one() + T::one()
    }
}

impl<T: Scalar> Transform<T> for BoundedTransform<T> {
    fn description(&self) -> &str {
        "Minuit-style bounded transform"
    }

    fn derivative(&self, x: T) -> T {
        let (min, max) = (self.limits.min(), self.limits.max());
        match (self.limits.has_lower_bound(), self.limits.has_upper_bound()) {
            (false, false) => T::one(),
            (true, false) => {
                let u = x - min + T::one();
                u / (u * u - T::one()).sqrt()
            }
            (false, true) => {
                let u = max - x + T::one();
                -u / (u * u - T::one()).sqrt()
            }
            (true, true) => {
                let range = max - min;
                if range == T::zero() {
                    return T::zero();
                }
                let scaled = Self::two() * (x - min) / range - T::one();
                Self::two() / (range * (T::one() - scaled * scaled).sqrt())
            }
        }
    }

    fn forward(&self, x: T) -> T {
        let (min, max) = (self.limits.min(), self.limits.max());
        match (self.limits.has_lower_bound(), self.limits.has_upper_bound()) {
            (false, false) => x,
            (true, false) => {
                let u = x - min + T::one();
                (u * u - T::one()).sqrt()
            }
            (false, true) => {
                let u = max - x + T::one();
                (u * u - T::one()).sqrt()
            }
            (true, true) => {
                let range = max - min;
                if range == T::zero() {
                    return T::zero();
                }
                let scaled = Self::two() * (x - min) / range - T::one();
                // Guard against rounding just outside [-1, 1]
                let scaled = if scaled > T::one() {
                    T::one()
                } else if scaled < -T::one() {
                    -T::one()
                } else {
                    scaled
                };
                scaled.asin()
            }
        }
    }

    fn reverse(&self, y: T) -> T {
        let (min, max) = (self.limits.min(), self.limits.max());
        match (self.limits.has_lower_bound(), self.limits.has_upper_bound()) {
            (false, false) => y,
            (true, false) => min - T::one() + (y * y + T::one()).sqrt(),
            (false, true) => max + T::one() - (y * y + T::one()).sqrt(),
            (true, true) => min + (y.sin() + T::one()) * (max - min) / Self::two(),
        }
    }
}

impl<T: Scalar> fmt::Display for BoundedTransform<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundedTransform({})", self.limits)
    }
}
