//! Configuration options for parameters and parameter registries.
//!
//! This module defines how a parameter treats its stored value when its limits are
//! replaced, and how a value written to a parameter is propagated to its inheritors.

/// What to do with the stored value when a parameter's limits are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitsPolicy {
    /// Clip the stored value into the new limits and recompute the transformed value
    #[default]
    Clip,

    /// Refuse new limits that exclude the stored value
    Reject,

    /// Accept the new limits and leave the stored value as is, even if it is now
    /// outside them. The next successful `set_value` restores the invariant.
    Keep,
}

/// How a value written to a parameter is propagated to its inheritors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Validate the value against the parent and every inheritor before writing
    /// anything. Either all of them are updated or none is.
    #[default]
    AllOrNothing,

    /// Write the parent, then each inheritor in id order, stopping at the first
    /// inheritor that rejects the value. Earlier writes are not rolled back.
    Sequential,
}

/// Configuration options for a parameter registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterConfig {
    /// Handling of the stored value on limits replacement. Default: `Clip`
    pub limits_policy: LimitsPolicy,

    /// Inheritor propagation mode. Default: `AllOrNothing`
    pub propagation: Propagation,
}

impl ParameterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits replacement policy
    pub fn with_limits_policy(mut self, limits_policy: LimitsPolicy) -> Self {
        self.limits_policy = limits_policy;
        self
    }

    /// Set the propagation mode
    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }
}
