//! Parameter definition and implementation
//!
//! This module provides [`Parameter`], a single scalar value with validated limits,
//! an optional transform to an optimizer-friendly scale, and free/fixed state. The
//! untransformed value and the cached transformed value are kept consistent by
//! every successful mutation.
//!
//! [`ParameterBase`] is the object-safe interface shared by all parameters of a
//! value type, whatever their [`Category`]. It is what a
//! [`ParameterRegistry`](crate::parameters::ParameterRegistry) stores.

use crate::config::LimitsPolicy;
use crate::error::ErrorKind;
use crate::parameters::category::{Category, CategoryDefaults};
use crate::parameters::limits::{Limits, LimitsError};
use crate::parameters::scalar::Scalar;
use crate::parameters::transform::Transform;
use crate::unit::Unit;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{self, AtomicU64};
use std::sync::Arc;
use thiserror::Error;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// Unique identity of a parameter
///
/// Ids are issued in creation order and never reused within a process, so
/// ordering by id is deterministic and independent of values or memory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParamId(u64);

impl ParamId {
    fn next() -> Self {
        ParamId(NEXT_PARAM_ID.fetch_add(1, atomic::Ordering::Relaxed))
    }

    /// The raw id number
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("{parameter}: value={value} beyond limits {limits}")]
    OutOfLimits {
        parameter: String,
        value: f64,
        limits: String,
    },

    #[error("{name}.set_limits({limits}) sets limits that are less restrictive than the maximal {maximal}")]
    LimitsExceedCategory {
        name: String,
        limits: String,
        maximal: String,
    },

    #[error("{parameter}: current value={value} is outside new limits {limits}")]
    ValueOutsideNewLimits {
        parameter: String,
        value: f64,
        limits: String,
    },

    #[error("Limits error: {0}")]
    Limits(#[from] LimitsError),

    #[error("No parameter {0} is registered")]
    UnknownParameter(ParamId),

    #[error("Can't set {parameter} free while it inherits from {inheritee}")]
    FreeWhileInheriting {
        parameter: String,
        inheritee: ParamId,
    },

    #[error("Can't add_inheritor({child}) with fixed inheritor")]
    FixedInheritor { child: ParamId },

    #[error("Can't add_inheritor({child}) with inheritors of its own; inheritance may not be nested")]
    NestedInheritor { child: ParamId },

    #[error("Can't add an inheritor to {parent}, which inherits from {inheritee}; inheritance may not be nested")]
    InheritingParent { parent: ParamId, inheritee: ParamId },

    #[error("Can't add_inheritor({child}), which already inherits from {inheritee}")]
    AlreadyInheriting { child: ParamId, inheritee: ParamId },

    #[error("Parameter {0} can't inherit from itself")]
    SelfInheritance(ParamId),

    #[error("Parameter {id} is still linked from {by}")]
    StillLinked { id: ParamId, by: ParamId },

    #[error("Inheritor {inheritor} of {parent} rejects the value: {source}")]
    InheritorRejected {
        parent: ParamId,
        inheritor: ParamId,
        source: Box<ParameterError>,
    },

    #[error("Propagation from {parent} stopped at inheritor {failed} after updating {updated:?}: {source}")]
    PartialPropagation {
        parent: ParamId,
        failed: ParamId,
        updated: Vec<ParamId>,
        source: Box<ParameterError>,
    },
}

impl ParameterError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParameterError::Limits(_) => ErrorKind::Construction,
            ParameterError::OutOfLimits { .. }
            | ParameterError::LimitsExceedCategory { .. }
            | ParameterError::ValueOutsideNewLimits { .. }
            | ParameterError::InheritorRejected { .. }
            | ParameterError::PartialPropagation { .. } => ErrorKind::BoundsViolation,
            ParameterError::UnknownParameter(_)
            | ParameterError::FreeWhileInheriting { .. }
            | ParameterError::FixedInheritor { .. }
            | ParameterError::NestedInheritor { .. }
            | ParameterError::InheritingParent { .. }
            | ParameterError::AlreadyInheriting { .. }
            | ParameterError::SelfInheritance(_)
            | ParameterError::StillLinked { .. } => ErrorKind::InheritanceRuleViolation,
        }
    }
}

pub(crate) mod sealed {
    use super::ParamId;

    pub trait Sealed {
        /// Record the parameter driving this one; only the registry does this.
        fn set_inheritee(&mut self, inheritee: Option<ParamId>);
    }
}

/// Interface for parameters with values and metadata
///
/// Implemented by every [`Parameter<T, C>`], so that parameters of different
/// categories can be stored together as `Box<dyn ParameterBase<T>>`. Equality and
/// ordering of trait objects compare identity ([`ParamId`]), never values.
pub trait ParameterBase<T: Scalar>: sealed::Sealed + fmt::Debug + fmt::Display + Send + Sync {
    /// The unique identity of this parameter
    fn id(&self) -> ParamId;

    /// The default value of this kind of parameter
    fn default_value(&self) -> T;

    /// The description of this kind of parameter
    fn description(&self) -> &'static str;

    /// The name of this kind of parameter
    fn name(&self) -> &'static str;

    /// Whether this kind of parameter enters a model linearly
    fn linear(&self) -> bool;

    fn free(&self) -> bool;

    fn fixed(&self) -> bool {
        !self.free()
    }

    fn label(&self) -> &str;

    /// The limits for the untransformed value
    fn limits(&self) -> &Limits<T>;

    /// The shared handle to this parameter's limits
    fn limits_arc(&self) -> Arc<Limits<T>>;

    /// The widest limits this kind of parameter allows
    fn limits_maximal(&self) -> &Limits<T>;

    /// The category minimum
    fn category_min(&self) -> T;

    /// The category maximum
    fn category_max(&self) -> T;

    fn transform(&self) -> &dyn Transform<T>;

    /// The shared handle to this parameter's transform
    fn transform_arc(&self) -> Arc<dyn Transform<T>>;

    /// The derivative of the transform at the current untransformed value
    fn transform_derivative(&self) -> T {
        self.transform().derivative(self.value())
    }

    fn unit(&self) -> Option<&dyn Unit>;

    /// The untransformed value
    fn value(&self) -> T;

    /// The cached transformed value
    fn value_transformed(&self) -> T;

    /// The parameter whose values are pushed into this one, if any
    fn inheritee(&self) -> Option<ParamId>;

    /// Check a prospective untransformed value against the current limits
    fn check_value(&self, value: T) -> Result<(), ParameterError>;

    /// Set whether the parameter is free; fails when freeing a parameter that inherits
    fn set_free(&mut self, free: bool) -> Result<(), ParameterError>;

    fn set_fixed(&mut self, fixed: bool) -> Result<(), ParameterError> {
        self.set_free(!fixed)
    }

    fn set_label(&mut self, label: String);

    /// Replace the limits (`None` resets to the maximal limits) with the default policy
    fn set_limits(&mut self, limits: Option<Arc<Limits<T>>>) -> Result<(), ParameterError> {
        self.set_limits_with(limits, LimitsPolicy::default())
    }

    /// Replace the limits, handling the stored value according to `policy`
    fn set_limits_with(
        &mut self,
        limits: Option<Arc<Limits<T>>>,
        policy: LimitsPolicy,
    ) -> Result<(), ParameterError>;

    /// Replace the transform (`None` resets to identity) and recompute the transformed value
    fn set_transform(&mut self, transform: Option<Arc<dyn Transform<T>>>);

    /// Set the untransformed value, checking limits
    fn set_value(&mut self, value: T) -> Result<(), ParameterError>;

    /// Set the value from the transformed scale, checking limits on the untransformed value
    fn set_value_transformed(&mut self, value_transformed: T) -> Result<(), ParameterError>;

    fn set_unit(&mut self, unit: Option<Arc<dyn Unit>>);
}

impl<'a, T: Scalar> PartialEq for dyn ParameterBase<T> + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<'a, T: Scalar> Eq for dyn ParameterBase<T> + 'a {}

impl<'a, T: Scalar> PartialOrd for dyn ParameterBase<T> + 'a {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, T: Scalar> Ord for dyn ParameterBase<T> + 'a {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

/// A parameter with a value and metadata
///
/// `C` supplies the compile-time configuration: name, description, default value
/// and the widest allowed range. Limits, transform and unit are shared handles,
/// typically reused across many parameters.
///
/// Whether a parameter is free or fixed is indicative for whatever optimizer uses
/// it; it does not prevent the value from being set.
pub struct Parameter<T: Scalar, C: Category<T>> {
    id: ParamId,
    value: T,
    value_transformed: T,
    limits: Arc<Limits<T>>,
    transform: Arc<dyn Transform<T>>,
    unit: Option<Arc<dyn Unit>>,
    free: bool,
    label: String,
    inheritee: Option<ParamId>,
    defaults: CategoryDefaults<T, C>,
}

/// A double precision parameter of the [`Real`](crate::parameters::Real) category
pub type RealParameter = Parameter<f64, crate::parameters::category::Real>;

/// A double precision parameter of the [`NonNegative`](crate::parameters::NonNegative) category
pub type NonNegativeParameter = Parameter<f64, crate::parameters::category::NonNegative>;

/// A double precision parameter of the [`Positive`](crate::parameters::Positive) category
pub type PositiveParameter = Parameter<f64, crate::parameters::category::Positive>;

impl<T: Scalar, C: Category<T>> Parameter<T, C> {
    /// Create a new parameter with the given value
    ///
    /// The parameter gets the category's maximal limits, the identity transform,
    /// no unit, and is free.
    ///
    /// # Examples
    ///
    /// ```
    /// use modelfit_params::parameters::{ParameterBase, RealParameter};
    ///
    /// let param = RealParameter::new(10.0).unwrap();
    /// assert_eq!(param.value(), 10.0);
    /// assert_eq!(param.value_transformed(), 10.0);
    /// assert!(param.free());
    /// ```
    pub fn new(value: T) -> Result<Self, ParameterError> {
        Self::builder().value(value).build()
    }

    /// Create a new parameter with the category's default value
    pub fn try_default() -> Result<Self, ParameterError> {
        Self::builder().build()
    }

    /// Start building a parameter with non-default limits, transform, unit or state
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use modelfit_params::parameters::{Limits, LogTransform, ParameterBase, PositiveParameter};
    ///
    /// let param = PositiveParameter::builder()
    ///     .value(100.0)
    ///     .limits(Arc::new(Limits::new(1.0, 1e4, "flux").unwrap()))
    ///     .transform(Arc::new(LogTransform))
    ///     .label("flux")
    ///     .build()
    ///     .unwrap();
    /// assert!((param.value_transformed() - 100f64.ln()).abs() < 1e-12);
    /// ```
    pub fn builder() -> ParameterBuilder<T, C> {
        ParameterBuilder::new()
    }

    /// Whether the limits are the shared maximal limits of the category
    pub fn is_limits_maximal(&self) -> bool {
        Arc::ptr_eq(&self.limits, self.defaults.limits_maximal())
    }

    /// Whether the transform is the shared identity transform of the category
    pub fn is_transform_none(&self) -> bool {
        Arc::ptr_eq(&self.transform, self.defaults.transform_none())
    }

    /// The category defaults this parameter falls back to
    pub fn defaults(&self) -> &CategoryDefaults<T, C> {
        &self.defaults
    }

    fn check_category(limits: &Limits<T>, maximal: &Limits<T>) -> Result<(), ParameterError> {
        if !(limits.min() >= C::min() && limits.max() <= C::max()) {
            return Err(ParameterError::LimitsExceedCategory {
                name: C::NAME.to_string(),
                limits: limits.to_string(),
                maximal: maximal.to_string(),
            });
        }
        Ok(())
    }

    fn out_of_limits(parameter: String, value: T, limits: &Limits<T>) -> ParameterError {
        ParameterError::OutOfLimits {
            parameter,
            value: value.to_f64(),
            limits: limits.to_string(),
        }
    }
}

impl<T: Scalar, C: Category<T>> sealed::Sealed for Parameter<T, C> {
    fn set_inheritee(&mut self, inheritee: Option<ParamId>) {
        self.inheritee = inheritee;
    }
}

impl<T: Scalar, C: Category<T>> ParameterBase<T> for Parameter<T, C> {
    fn id(&self) -> ParamId {
        self.id
    }

    fn default_value(&self) -> T {
        C::default_value()
    }

    fn description(&self) -> &'static str {
        C::DESCRIPTION
    }

    fn name(&self) -> &'static str {
        C::NAME
    }

    fn linear(&self) -> bool {
        C::LINEAR
    }

    fn free(&self) -> bool {
        self.free
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn limits(&self) -> &Limits<T> {
        &self.limits
    }

    fn limits_arc(&self) -> Arc<Limits<T>> {
        Arc::clone(&self.limits)
    }

    fn limits_maximal(&self) -> &Limits<T> {
        self.defaults.limits_maximal()
    }

    fn category_min(&self) -> T {
        C::min()
    }

    fn category_max(&self) -> T {
        C::max()
    }

    fn transform(&self) -> &dyn Transform<T> {
        self.transform.as_ref()
    }

    fn transform_arc(&self) -> Arc<dyn Transform<T>> {
        Arc::clone(&self.transform)
    }

    fn unit(&self) -> Option<&dyn Unit> {
        self.unit.as_deref()
    }

    fn value(&self) -> T {
        self.value
    }

    fn value_transformed(&self) -> T {
        self.value_transformed
    }

    fn inheritee(&self) -> Option<ParamId> {
        self.inheritee
    }

    fn check_value(&self, value: T) -> Result<(), ParameterError> {
        if !self.limits.check(value) {
            return Err(Self::out_of_limits(self.to_string(), value, &self.limits));
        }
        Ok(())
    }

    fn set_free(&mut self, free: bool) -> Result<(), ParameterError> {
        if free {
            if let Some(inheritee) = self.inheritee {
                return Err(ParameterError::FreeWhileInheriting {
                    parameter: self.to_string(),
                    inheritee,
                });
            }
        }
        self.free = free;
        Ok(())
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }

    fn set_limits_with(
        &mut self,
        limits: Option<Arc<Limits<T>>>,
        policy: LimitsPolicy,
    ) -> Result<(), ParameterError> {
        let limits = match limits {
            None => Arc::clone(self.defaults.limits_maximal()),
            Some(limits) => {
                Self::check_category(&limits, self.defaults.limits_maximal())?;
                limits
            }
        };

        if !limits.check(self.value) {
            match policy {
                LimitsPolicy::Reject => {
                    return Err(ParameterError::ValueOutsideNewLimits {
                        parameter: self.to_string(),
                        value: self.value.to_f64(),
                        limits: limits.to_string(),
                    });
                }
                LimitsPolicy::Clip => {
                    let clipped = limits.clip(self.value);
                    log::debug!("{}: clipping value {} to {} for new {}", self, self.value, clipped, limits);
                    self.value = clipped;
                    self.value_transformed = self.transform.forward(clipped);
                }
                LimitsPolicy::Keep => {
                    log::warn!("{}: keeping value {} outside new {}", self, self.value, limits);
                }
            }
        }

        self.limits = limits;
        Ok(())
    }

    fn set_transform(&mut self, transform: Option<Arc<dyn Transform<T>>>) {
        self.transform = transform.unwrap_or_else(|| Arc::clone(self.defaults.transform_none()));
        self.value_transformed = self.transform.forward(self.value);
    }

    fn set_value(&mut self, value: T) -> Result<(), ParameterError> {
        self.check_value(value)?;
        self.value = value;
        self.value_transformed = self.transform.forward(value);
        log::trace!("{}: value set", self);
        Ok(())
    }

    fn set_value_transformed(&mut self, value_transformed: T) -> Result<(), ParameterError> {
        let value = self.transform.reverse(value_transformed);
        self.set_value(value)
    }

    fn set_unit(&mut self, unit: Option<Arc<dyn Unit>>) {
        self.unit = unit;
    }
}

/// A copy is a new parameter: it gets a fresh id and no inheritee.
impl<T: Scalar, C: Category<T>> Clone for Parameter<T, C> {
    fn clone(&self) -> Self {
        Self {
            id: ParamId::next(),
            value: self.value,
            value_transformed: self.value_transformed,
            limits: Arc::clone(&self.limits),
            transform: Arc::clone(&self.transform),
            unit: self.unit.clone(),
            free: self.free,
            label: self.label.clone(),
            inheritee: None,
            defaults: self.defaults.clone(),
        }
    }
}

impl<T: Scalar, C: Category<T>> PartialEq for Parameter<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: Scalar, C: Category<T>> Eq for Parameter<T, C> {}

impl<T: Scalar, C: Category<T>> PartialOrd for Parameter<T, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Scalar, C: Category<T>> Ord for Parameter<T, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T: Scalar, C: Category<T>> Hash for Parameter<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: Scalar, C: Category<T>> fmt::Debug for Parameter<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("id", &self.id)
            .field("category", &C::NAME)
            .field("value", &self.value)
            .field("value_transformed", &self.value_transformed)
            .field("limits", &self.limits)
            .field("transform", &self.transform)
            .field("unit", &self.unit)
            .field("free", &self.free)
            .field("label", &self.label)
            .field("inheritee", &self.inheritee)
            .finish()
    }
}

/// Brief representation; default limits, transform, free state and an empty
/// label are omitted.
impl<T: Scalar, C: Category<T>> fmt::Display for Parameter<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(value={}", C::NAME, self.value)?;
        if !self.is_limits_maximal() {
            write!(f, ", limits={}", self.limits)?;
        }
        if !self.is_transform_none() {
            write!(f, ", transform={}", self.transform)?;
        }
        if !self.free {
            write!(f, ", fixed=1")?;
        }
        if !self.label.is_empty() {
            write!(f, ", label='{}'", self.label)?;
        }
        write!(f, ")")
    }
}

/// Builder for [`Parameter`]
///
/// Anything left unset falls back to the category defaults: the default value,
/// the maximal limits, the identity transform, no unit, free, and an empty label.
pub struct ParameterBuilder<T: Scalar, C: Category<T>> {
    value: Option<T>,
    limits: Option<Arc<Limits<T>>>,
    transform: Option<Arc<dyn Transform<T>>>,
    unit: Option<Arc<dyn Unit>>,
    fixed: bool,
    label: String,
    defaults: Option<CategoryDefaults<T, C>>,
}

impl<T: Scalar, C: Category<T>> ParameterBuilder<T, C> {
    fn new() -> Self {
        Self {
            value: None,
            limits: None,
            transform: None,
            unit: None,
            fixed: false,
            label: String::new(),
            defaults: None,
        }
    }

    /// The initial untransformed value
    pub fn value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    /// Limits for the untransformed value; must lie within the category's range
    pub fn limits(mut self, limits: Arc<Limits<T>>) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn transform(mut self, transform: Arc<dyn Transform<T>>) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn unit(mut self, unit: Arc<dyn Unit>) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Share already-built category defaults instead of creating new ones
    pub fn defaults(mut self, defaults: CategoryDefaults<T, C>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Build the parameter
    ///
    /// Fails if the limits are wider than the category allows, or if the value
    /// is outside the resulting limits.
    pub fn build(self) -> Result<Parameter<T, C>, ParameterError> {
        let defaults = match self.defaults {
            Some(defaults) => defaults,
            None => CategoryDefaults::new()?,
        };

        let limits = match self.limits {
            None => Arc::clone(defaults.limits_maximal()),
            Some(limits) => {
                Parameter::<T, C>::check_category(&limits, defaults.limits_maximal())?;
                limits
            }
        };

        let value = self.value.unwrap_or_else(C::default_value);
        if !limits.check(value) {
            return Err(Parameter::<T, C>::out_of_limits(
                C::NAME.to_string(),
                value,
                &limits,
            ));
        }

        let transform = self
            .transform
            .unwrap_or_else(|| Arc::clone(defaults.transform_none()));
        let value_transformed = transform.forward(value);

        Ok(Parameter {
            id: ParamId::next(),
            value,
            value_transformed,
            limits,
            transform,
            unit: self.unit,
            free: !self.fixed,
            label: self.label,
            inheritee: None,
            defaults,
        })
    }
}
