//! Parameter categories
//!
//! A [`Category`] is the compile-time configuration shared by every parameter of a
//! kind: its name and description, its default value, and the widest range any
//! instance may be limited to. New kinds of parameter are defined by implementing
//! this trait on a unit struct.

use crate::parameters::limits::{Limits, LimitsError};
use crate::parameters::scalar::Scalar;
use crate::parameters::transform::{IdentityTransform, Transform};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Compile-time constants for a kind of parameter
///
/// # Examples
///
/// ```
/// use modelfit_params::parameters::{Category, Parameter, ParameterBase};
///
/// struct Fraction;
///
/// impl Category<f64> for Fraction {
///     const NAME: &'static str = "fraction";
///     const DESCRIPTION: &'static str = "Fraction between 0 and 1";
///
///     fn min() -> f64 {
///         0.0
///     }
///     fn max() -> f64 {
///         1.0
///     }
/// }
///
/// let frac = Parameter::<f64, Fraction>::new(0.25).unwrap();
/// assert_eq!(frac.name(), "fraction");
/// assert!(Parameter::<f64, Fraction>::new(1.5).is_err());
/// ```
pub trait Category<T: Scalar>: 'static {
    /// Name of this kind of parameter
    const NAME: &'static str;

    /// Description of this kind of parameter
    const DESCRIPTION: &'static str;

    /// Whether parameters of this kind enter a model linearly
    const LINEAR: bool = false;

    /// Default untransformed value
    fn default_value() -> T {
        T::zero()
    }

    /// Minimum valid value (inclusive) for any instance
    fn min() -> T {
        T::neg_infinity()
    }

    /// Maximum valid value (inclusive) for any instance
    fn max() -> T {
        T::infinity()
    }

    /// The widest limits an instance may have
    fn limits_maximal() -> Result<Limits<T>, LimitsError> {
        Limits::new(Self::min(), Self::max(), format!("{}.limits_maximal", Self::NAME))
    }
}

/// Shared default limits and transform for one category
///
/// Built once and handed to any number of parameters of the category, which then
/// all refer to the same maximal limits and identity transform instead of each
/// allocating their own.
pub struct CategoryDefaults<T: Scalar, C: Category<T>> {
    limits_maximal: Arc<Limits<T>>,
    transform_none: Arc<dyn Transform<T>>,
    category: PhantomData<fn() -> C>,
}

impl<T: Scalar, C: Category<T>> CategoryDefaults<T, C> {
    /// Build the defaults for category `C`
    ///
    /// Fails only if the category's own bounds are invalid (NaN or min > max).
    pub fn new() -> Result<Self, LimitsError> {
        Ok(Self {
            limits_maximal: Arc::new(C::limits_maximal()?),
            transform_none: Arc::new(IdentityTransform),
            category: PhantomData,
        })
    }

    pub fn limits_maximal(&self) -> &Arc<Limits<T>> {
        &self.limits_maximal
    }

    pub fn transform_none(&self) -> &Arc<dyn Transform<T>> {
        &self.transform_none
    }
}

impl<T: Scalar, C: Category<T>> Clone for CategoryDefaults<T, C> {
    fn clone(&self) -> Self {
        Self {
            limits_maximal: Arc::clone(&self.limits_maximal),
            transform_none: Arc::clone(&self.transform_none),
            category: PhantomData,
        }
    }
}

impl<T: Scalar, C: Category<T>> fmt::Debug for CategoryDefaults<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryDefaults")
            .field("category", &C::NAME)
            .field("limits_maximal", &self.limits_maximal)
            .field("transform_none", &self.transform_none)
            .finish()
    }
}

/// Real, potentially infinite values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Real;

impl<T: Scalar> Category<T> for Real {
    const NAME: &'static str = "real";
    const DESCRIPTION: &'static str = "Real, potentially infinite parameter";
}

/// Non-negative, potentially infinite values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonNegative;

impl<T: Scalar> Category<T> for NonNegative {
    const NAME: &'static str = "non_negative";
    const DESCRIPTION: &'static str = "Non-negative, potentially infinite parameter";

    fn min() -> T {
        T::zero()
    }
}

/// Strictly positive, potentially infinite values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Positive;

impl<T: Scalar> Category<T> for Positive {
    const NAME: &'static str = "positive";
    const DESCRIPTION: &'static str = "Positive, potentially infinite parameter";

    fn default_value() -> T {
        T::one()
    }

    fn min() -> T {
        T::min_positive_subnormal()
    }
}
