//! # Parameter System
//!
//! This module provides a bounded, transformable scalar parameter abstraction for
//! model fitting. Each parameter carries a value, validated limits, an optional
//! transform to the scale an optimizer works on, free/fixed state, a label and an
//! optional unit.
//!
//! ## Key Features
//!
//! - **Validated Limits**: Inclusive, named ranges that never hold a NaN bound or `min > max`
//! - **Transforms**: Bijective maps between a parameter's natural scale and its fitting scale
//! - **Categories**: Compile-time kinds of parameter with a name, default value and widest range
//! - **Inheritance**: Values written to one parameter are pushed into its inheritors
//! - **Serialization Support**: Save and load limits with serde
//!
//! ## Core Components
//!
//! - [`Limits`]: Inclusive range of valid values
//! - [`Transform`]: Forward, reverse and derivative of a scale change
//! - [`Category`]: Name, description, default value and maximal limits of a kind of parameter
//! - [`Parameter`] and [`ParameterBase`]: Individual parameters and their object-safe interface
//! - [`ParameterRegistry`]: Parameters addressed by [`ParamId`], with inheritor and modifier links
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use modelfit_params::parameters::{
//!     Limits, LogTransform, ParameterBase, ParameterRegistry, PositiveParameter, RealParameter,
//! };
//!
//! let mut registry = ParameterRegistry::new();
//!
//! // A positive flux fitted on a log scale
//! let flux = PositiveParameter::builder()
//!     .value(10.0)
//!     .limits(Arc::new(Limits::new(1e-3, 1e6, "flux").unwrap()))
//!     .transform(Arc::new(LogTransform))
//!     .build()
//!     .unwrap();
//! let flux = registry.insert(flux);
//!
//! // Two centroids sharing one value
//! let cen_x = registry.insert(RealParameter::new(0.0).unwrap());
//! let cen_y = registry.insert(RealParameter::new(0.0).unwrap());
//! registry.add_inheritor(cen_x, cen_y).unwrap();
//!
//! registry.set_value(cen_x, 1.5).unwrap();
//! assert_eq!(registry.value(cen_y).unwrap(), 1.5);
//!
//! // Optimizers work on the transformed scale
//! registry.set_value_transformed(flux, 0.0).unwrap();
//! assert!((registry.value(flux).unwrap() - 1.0).abs() < 1e-12);
//! ```

pub mod category;
pub mod limits;
pub mod parameter;
pub mod registry;
pub mod scalar;
pub mod transform;


// Re-export key types
pub use category::{Category, CategoryDefaults, NonNegative, Positive, Real};
pub use limits::{Limits, LimitsError};
pub use parameter::{
    NonNegativeParameter, ParamId, Parameter, ParameterBase, ParameterBuilder, ParameterError,
    PositiveParameter, RealParameter,
};
pub use registry::ParameterRegistry;
pub use scalar::Scalar;
pub use transform::{BoundedTransform, IdentityTransform, Log10Transform, LogTransform, Transform};
