//! # modelfit-params
//!
//! `modelfit-params` provides the parameter layer of a model-fitting library: scalar
//! parameters with validated limits, transforms to the scale an optimizer works
//! on, free/fixed state, and inheritance links that keep several parameters at
//! one value.
//!
//! The library provides:
//! - [`Limits`](parameters::Limits): validated, named, inclusive ranges
//! - [`Transform`](parameters::Transform) implementations: identity, natural log, log10 and bounded
//! - [`Category`](parameters::Category): compile-time kinds of parameter (real, non-negative, positive)
//! - [`Parameter`](parameters::Parameter) and the [`ParameterRegistry`](parameters::ParameterRegistry)
//!   that owns inheritor and modifier links
//!
//! ## Basic Usage
//!
//! ```
//! use modelfit_params::parameters::{ParameterBase, ParameterRegistry, RealParameter};
//!
//! let mut registry = ParameterRegistry::new();
//! let sigma_x = registry.insert(RealParameter::new(1.0)?);
//! let sigma_y = registry.insert(RealParameter::new(1.0)?);
//! registry.add_inheritor(sigma_x, sigma_y)?;
//!
//! registry.set_value(sigma_x, 2.5)?;
//! assert_eq!(registry.value(sigma_y)?, 2.5);
//! assert!(registry.get(sigma_y).unwrap().fixed());
//! # Ok::<(), modelfit_params::ModelfitError>(())
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod unit;

// Parameter system
pub mod parameters;

// Re-exports for convenience
pub use config::{LimitsPolicy, ParameterConfig, Propagation};
pub use error::{ErrorKind, ModelfitError, Result};
pub use parameters::{Limits, ParamId, Parameter, ParameterBase, ParameterRegistry};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
