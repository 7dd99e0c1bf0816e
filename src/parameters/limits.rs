//! Parameter limits implementation
//!
//! This module provides [`Limits`], an inclusive, named range that constrains the
//! untransformed value of a parameter. The range is validated on construction and
//! on every mutation: neither bound may be NaN and `min <= max` must hold.

use crate::parameters::scalar::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when constructing or mutating limits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LimitsError {
    #[error("Limits '{name}' can't be set with a NaN bound: min={min}, max={max}")]
    NanBound { name: String, min: f64, max: f64 },

    #[error("Limits '{name}' can't be set with !(min <= max): min={min}, max={max}")]
    Inverted { name: String, min: f64, max: f64 },
}

/// An inclusive range of valid values for a parameter
///
/// Limits are usually shared between many parameters of the same kind through an
/// `Arc`, and are therefore treated as immutable once published. The mutators
/// below are for limits that are still exclusively owned (or copied with
/// `Arc::make_mut`).
#[derive(Debug, Clone, PartialEq)]
pub struct Limits<T> {
    min: T,
    max: T,
    name: String,
}

impl<T: Scalar> Default for Limits<T> {
    fn default() -> Self {
        Self {
            min: T::neg_infinity(),
            max: T::infinity(),
            name: String::new(),
        }
    }
}

impl<T: Scalar> Limits<T> {
    /// Create new limits from a minimum and maximum value
    ///
    /// # Arguments
    ///
    /// * `min` - Minimum allowed value (inclusive)
    /// * `max` - Maximum allowed value (inclusive)
    /// * `name` - Descriptive name, used in error messages
    ///
    /// # Returns
    ///
    /// New `Limits` if neither bound is NaN and min <= max, or an error otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use modelfit_params::parameters::Limits;
    ///
    /// let limits = Limits::new(0.0, 10.0, "amplitude").unwrap();
    /// assert_eq!(limits.min(), 0.0);
    /// assert_eq!(limits.max(), 10.0);
    /// assert!(Limits::new(10.0, 0.0, "inverted").is_err());
    /// ```
    pub fn new(min: T, max: T, name: impl Into<String>) -> Result<Self, LimitsError> {
        let name = name.into();
        Self::validate(&name, min, max)?;
        Ok(Self { min, max, name })
    }

    /// Create limits spanning negative to positive infinity
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create limits with only a minimum value
    pub fn lower(min: T) -> Result<Self, LimitsError> {
        Self::new(min, T::infinity(), "")
    }

    /// Create limits with only a maximum value
    pub fn upper(max: T) -> Result<Self, LimitsError> {
        Self::new(T::neg_infinity(), max, "")
    }

    fn validate(name: &str, min: T, max: T) -> Result<(), LimitsError> {
        if min.is_nan() || max.is_nan() {
            return Err(LimitsError::NanBound {
                name: name.to_string(),
                min: min.to_f64(),
                max: max.to_f64(),
            });
        }
        if !(min <= max) {
            return Err(LimitsError::Inverted {
                name: name.to_string(),
                min: min.to_f64(),
                max: max.to_f64(),
            });
        }
        Ok(())
    }

    /// Check if a value is within the limits (inclusive)
    ///
    /// NaN is never within limits.
    #[inline]
    pub fn check(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Return the closest value to the input that is within the limits
    #[inline]
    pub fn clip(&self, value: T) -> T {
        if value > self.max {
            self.max
        } else if value < self.min {
            self.min
        } else {
            value
        }
    }

    /// The minimum allowed value
    #[inline]
    pub fn min(&self) -> T {
        self.min
    }

    /// The maximum allowed value
    #[inline]
    pub fn max(&self) -> T {
        self.max
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set both the minimum and the maximum
    ///
    /// The limits are left unchanged if the new pair is invalid.
    pub fn set(&mut self, min: T, max: T) -> Result<(), LimitsError> {
        Self::validate(&self.name, min, max)?;
        self.min = min;
        self.max = max;
        Ok(())
    }

    /// Set the minimum, checked against the current maximum
    pub fn set_min(&mut self, min: T) -> Result<(), LimitsError> {
        Self::validate(&self.name, min, self.max)?;
        self.min = min;
        Ok(())
    }

    /// Set the maximum, checked against the current minimum
    pub fn set_max(&mut self, max: T) -> Result<(), LimitsError> {
        Self::validate(&self.name, self.min, max)?;
        self.max = max;
        Ok(())
    }

    /// Check if both bounds are finite
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check if the range is bounded from below
    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    /// Check if the range is bounded from above
    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }
}

impl<T: Scalar> fmt::Display for Limits<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Limits({}, {}, '{}')", self.min, self.max, self.name)
    }
}

/// Serialized form of one bound
///
/// The unbounded side of a range (`-inf` for `min`, `+inf` for `max`) is written as
/// null. An infinity on the other side is written as the string `"inf"` or `"-inf"`,
/// since formats like JSON have no infinite numbers.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BoundRepr<T> {
    Value(T),
    Infinite(String),
}

impl<T: Scalar> BoundRepr<T> {
    fn encode(value: T, unbounded: T) -> Option<Self> {
        if value == unbounded {
            None
        } else if value.is_finite() {
            Some(BoundRepr::Value(value))
        } else if value > T::zero() {
            Some(BoundRepr::Infinite("inf".to_string()))
        } else {
            Some(BoundRepr::Infinite("-inf".to_string()))
        }
    }

    fn decode<E: serde::de::Error>(repr: Option<Self>, unbounded: T) -> Result<T, E> {
        match repr {
            None => Ok(unbounded),
            Some(BoundRepr::Value(value)) => Ok(value),
            Some(BoundRepr::Infinite(text)) => match text.as_str() {
                "inf" => Ok(T::infinity()),
                "-inf" => Ok(T::neg_infinity()),
                other => Err(E::custom(format!("invalid bound '{}'", other))),
            },
        }
    }
}

impl<T: Scalar + Serialize> Serialize for Limits<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Limits", 3)?;

        state.serialize_field("min", &BoundRepr::encode(self.min, T::neg_infinity()))?;
        state.serialize_field("max", &BoundRepr::encode(self.max, T::infinity()))?;
        state.serialize_field("name", &self.name)?;

        state.end()
    }
}

impl<'de, T: Scalar + Deserialize<'de>> Deserialize<'de> for Limits<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct LimitsHelper<T> {
            min: Option<BoundRepr<T>>,

            max: Option<BoundRepr<T>>,

            #[serde(default)]
            name: String,
        }

        let helper = LimitsHelper::<T>::deserialize(deserializer)?;

        let min = BoundRepr::decode(helper.min, T::neg_infinity())?;
        let max = BoundRepr::decode(helper.max, T::infinity())?;

        Limits::new(min, max, helper.name).map_err(serde::de::Error::custom)
    }
}
