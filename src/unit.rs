//! Units of measurement
//!
//! A unit is attached to a parameter for bookkeeping only. It is never consulted
//! during validation, and choosing a unit does not rescale any value.

use std::fmt;

/// A unit of measurement, identified by name
pub trait Unit: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;
}

/// The absence of a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitNone;

impl Unit for UnitNone {
    fn name(&self) -> &str {
        "None"
    }
}

/// A unit known only by its name, e.g. `"arcsec"` or `"nJy"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedUnit {
    name: String,
}

impl NamedUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Unit for NamedUnit {
    fn name(&self) -> &str {
        &self.name
    }
}
