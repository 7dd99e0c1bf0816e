//! Parameter registry implementation
//!
//! This module provides [`ParameterRegistry`], an arena of parameters addressed by
//! [`ParamId`]. The registry owns the links between parameters:
//!
//! - **Inheritors**: parameters that receive every value written to their parent
//!   through the registry. Inheritance is exactly one level deep: an inheritor has
//!   no inheritors of its own and a parent is not itself an inheritor, so there
//!   are no chains and no cycles.
//! - **Modifiers**: informational links with no propagation.
//!
//! Records are kept in id order, so propagation visits inheritors in creation
//! order regardless of their values.

use crate::config::{LimitsPolicy, ParameterConfig, Propagation};
use crate::parameters::limits::Limits;
use crate::parameters::parameter::{ParamId, ParameterBase, ParameterError};
use crate::parameters::scalar::Scalar;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug)]
struct Record<T: Scalar> {
    param: Box<dyn ParameterBase<T>>,
    inheritors: BTreeSet<ParamId>,
    modifiers: BTreeSet<ParamId>,
}

/// An arena of parameters with inheritor and modifier links
///
/// # Examples
///
/// ```
/// use modelfit_params::parameters::{ParameterRegistry, RealParameter};
///
/// let mut registry = ParameterRegistry::new();
/// let parent = registry.insert(RealParameter::new(1.0).unwrap());
/// let child = registry.insert(RealParameter::new(1.0).unwrap());
///
/// registry.add_inheritor(parent, child).unwrap();
/// registry.set_value(parent, 5.0).unwrap();
/// assert_eq!(registry.value(child).unwrap(), 5.0);
/// ```
#[derive(Debug)]
pub struct ParameterRegistry<T: Scalar> {
    records: BTreeMap<ParamId, Record<T>>,
    config: ParameterConfig,
}

impl<T: Scalar> Default for ParameterRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> ParameterRegistry<T> {
    /// Create an empty registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(ParameterConfig::default())
    }

    /// Create an empty registry with the given configuration
    pub fn with_config(config: ParameterConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ParameterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ParameterConfig) {
        self.config = config;
    }

    /// Add a parameter and return its handle
    pub fn insert<P: ParameterBase<T> + 'static>(&mut self, param: P) -> ParamId {
        self.insert_boxed(Box::new(param))
    }

    /// Add an already boxed parameter and return its handle
    pub fn insert_boxed(&mut self, param: Box<dyn ParameterBase<T>>) -> ParamId {
        let id = param.id();
        self.records.insert(
            id,
            Record {
                param,
                inheritors: BTreeSet::new(),
                modifiers: BTreeSet::new(),
            },
        );
        id
    }

    /// Remove a parameter and hand it back
    ///
    /// Fails while the parameter is still an inheritor or modifier of another
    /// parameter. Its own inheritors are released.
    pub fn remove(&mut self, id: ParamId) -> Result<Box<dyn ParameterBase<T>>, ParameterError> {
        self.record(id)?;

        let linked_from = self
            .records
            .iter()
            .find(|(&other, record)| {
                other != id && (record.inheritors.contains(&id) || record.modifiers.contains(&id))
            })
            .map(|(&by, _)| by);
        if let Some(by) = linked_from {
            return Err(ParameterError::StillLinked { id, by });
        }

        let record = self
            .records
            .remove(&id)
            .ok_or(ParameterError::UnknownParameter(id))?;
        for child in &record.inheritors {
            if let Some(child) = self.records.get_mut(child) {
                child.param.set_inheritee(None);
            }
        }
        log::debug!("removed {} ({} inheritors released)", id, record.inheritors.len());

        Ok(record.param)
    }

    pub fn get(&self, id: ParamId) -> Option<&dyn ParameterBase<T>> {
        self.records.get(&id).map(|record| record.param.as_ref())
    }

    /// Mutable access to a parameter
    ///
    /// Values written through this accessor are not propagated to inheritors; use
    /// [`set_value`](Self::set_value) for that.
    pub fn get_mut(&mut self, id: ParamId) -> Option<&mut (dyn ParameterBase<T> + 'static)> {
        self.records.get_mut(&id).map(|record| record.param.as_mut())
    }

    pub fn contains(&self, id: ParamId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Handles of all parameters, in id order
    pub fn ids(&self) -> impl Iterator<Item = ParamId> + '_ {
        self.records.keys().copied()
    }

    /// All parameters, in id order
    pub fn iter(&self) -> impl Iterator<Item = &dyn ParameterBase<T>> + '_ {
        self.records.values().map(|record| record.param.as_ref())
    }

    fn record(&self, id: ParamId) -> Result<&Record<T>, ParameterError> {
        self.records
            .get(&id)
            .ok_or(ParameterError::UnknownParameter(id))
    }

    fn record_mut(&mut self, id: ParamId) -> Result<&mut Record<T>, ParameterError> {
        self.records
            .get_mut(&id)
            .ok_or(ParameterError::UnknownParameter(id))
    }

    /// The untransformed value of a parameter
    pub fn value(&self, id: ParamId) -> Result<T, ParameterError> {
        Ok(self.record(id)?.param.value())
    }

    /// The transformed value of a parameter
    pub fn value_transformed(&self, id: ParamId) -> Result<T, ParameterError> {
        Ok(self.record(id)?.param.value_transformed())
    }

    /// Set the untransformed value of a parameter and push it to its inheritors
    ///
    /// The parameter itself is always written before any inheritor, and
    /// inheritors are written in id order. What happens when an inheritor rejects
    /// the value depends on the configured [`Propagation`].
    pub fn set_value(&mut self, id: ParamId, value: T) -> Result<(), ParameterError> {
        let inheritors: Vec<ParamId> = self.record(id)?.inheritors.iter().copied().collect();

        if self.config.propagation == Propagation::AllOrNothing {
            self.record(id)?.param.check_value(value)?;
            self.check_inheritors(id, &inheritors, value)?;
        }

        self.record_mut(id)?.param.set_value(value)?;
        self.write_inheritors(id, &inheritors, value)
    }

    fn check_inheritors(&self, parent: ParamId, inheritors: &[ParamId], value: T) -> Result<(), ParameterError> {
        for &child in inheritors {
            self.record(child)?
                .param
                .check_value(value)
                .map_err(|err| ParameterError::InheritorRejected {
                    parent,
                    inheritor: child,
                    source: Box::new(err),
                })?;
        }
        Ok(())
    }

    fn write_inheritors(&mut self, parent: ParamId, inheritors: &[ParamId], value: T) -> Result<(), ParameterError> {
        let mut updated = Vec::with_capacity(inheritors.len());
        for &child in inheritors {
            if let Err(err) = self.record_mut(child)?.param.set_value(value) {
                log::warn!(
                    "propagation from {} stopped at {}; {} of {} inheritors updated",
                    parent,
                    child,
                    updated.len(),
                    inheritors.len()
                );
                return Err(ParameterError::PartialPropagation {
                    parent,
                    failed: child,
                    updated,
                    source: Box::new(err),
                });
            }
            updated.push(child);
        }

        if !inheritors.is_empty() {
            log::debug!("propagated value {} from {} to {} inheritors", value, parent, inheritors.len());
        }
        Ok(())
    }

    /// Set a parameter from its transformed scale and push the untransformed value
    /// to its inheritors
    ///
    /// Equivalent to `set_value(id, transform.reverse(value_transformed))`.
    pub fn set_value_transformed(&mut self, id: ParamId, value_transformed: T) -> Result<(), ParameterError> {
        let value = self.record(id)?.param.transform().reverse(value_transformed);
        self.set_value(id, value)
    }

    /// Replace a parameter's limits using the configured limits policy
    ///
    /// When [`LimitsPolicy::Clip`] moves the stored value, the clipped value is
    /// pushed to the inheritors like any other write. Under
    /// [`Propagation::AllOrNothing`] the inheritors are checked first, and if one
    /// rejects the clipped value the limits are not replaced.
    pub fn set_limits(&mut self, id: ParamId, limits: Option<Arc<Limits<T>>>) -> Result<(), ParameterError> {
        let policy = self.config.limits_policy;
        let record = self.record(id)?;
        let current = record.param.value();
        let target = match &limits {
            Some(limits) => limits.as_ref(),
            None => record.param.limits_maximal(),
        };
        let value = if policy == LimitsPolicy::Clip && !target.check(current) {
            target.clip(current)
        } else {
            current
        };
        let inheritors: Vec<ParamId> = if value != current {
            record.inheritors.iter().copied().collect()
        } else {
            Vec::new()
        };

        if self.config.propagation == Propagation::AllOrNothing {
            self.check_inheritors(id, &inheritors, value)?;
        }

        self.record_mut(id)?.param.set_limits_with(limits, policy)?;
        self.write_inheritors(id, &inheritors, value)
    }

    pub fn set_free(&mut self, id: ParamId, free: bool) -> Result<(), ParameterError> {
        self.record_mut(id)?.param.set_free(free)
    }

    pub fn set_fixed(&mut self, id: ParamId, fixed: bool) -> Result<(), ParameterError> {
        self.set_free(id, !fixed)
    }

    /// Make `child` receive every value written to `parent` through the registry
    ///
    /// Fails if either parameter is unknown, if `child` is fixed, has inheritors of
    /// its own or already inherits from another parameter, or if `parent` itself
    /// inherits. On success `child` is fixed, since its value is now driven.
    pub fn add_inheritor(&mut self, parent: ParamId, child: ParamId) -> Result<(), ParameterError> {
        if parent == child {
            self.record(parent)?;
            return Err(ParameterError::SelfInheritance(parent));
        }

        let parent_record = self.record(parent)?;
        let child_record = self.record(child)?;

        if parent_record.inheritors.contains(&child) {
            return Ok(());
        }
        if let Some(inheritee) = parent_record.param.inheritee() {
            return Err(ParameterError::InheritingParent { parent, inheritee });
        }
        if child_record.param.fixed() {
            return Err(ParameterError::FixedInheritor { child });
        }
        if !child_record.inheritors.is_empty() {
            return Err(ParameterError::NestedInheritor { child });
        }
        if let Some(inheritee) = child_record.param.inheritee() {
            return Err(ParameterError::AlreadyInheriting { child, inheritee });
        }

        let child_record = self.record_mut(child)?;
        child_record.param.set_free(false)?;
        child_record.param.set_inheritee(Some(parent));
        self.record_mut(parent)?.inheritors.insert(child);

        log::debug!("{} now inherits from {}", child, parent);
        Ok(())
    }

    /// Stop propagating values from `parent` to `child`
    ///
    /// Returns whether `child` was an inheritor. The child stays fixed.
    pub fn remove_inheritor(&mut self, parent: ParamId, child: ParamId) -> Result<bool, ParameterError> {
        self.record(child)?;
        let removed = self.record_mut(parent)?.inheritors.remove(&child);
        if removed {
            self.record_mut(child)?.param.set_inheritee(None);
        }
        Ok(removed)
    }

    /// The inheritors of a parameter, in id order
    pub fn inheritors(&self, id: ParamId) -> Result<&BTreeSet<ParamId>, ParameterError> {
        Ok(&self.record(id)?.inheritors)
    }

    /// The parameter whose values are pushed into this one, if any
    pub fn inheritee(&self, id: ParamId) -> Result<Option<ParamId>, ParameterError> {
        Ok(self.record(id)?.param.inheritee())
    }

    /// Associate `modifier` with `id`; modifiers receive no values
    pub fn add_modifier(&mut self, id: ParamId, modifier: ParamId) -> Result<(), ParameterError> {
        self.record(modifier)?;
        self.record_mut(id)?.modifiers.insert(modifier);
        Ok(())
    }

    /// Returns whether `modifier` was associated with `id`
    pub fn remove_modifier(&mut self, id: ParamId, modifier: ParamId) -> Result<bool, ParameterError> {
        self.record(modifier)?;
        Ok(self.record_mut(id)?.modifiers.remove(&modifier))
    }

    /// The modifiers of a parameter, in id order
    pub fn modifiers(&self, id: ParamId) -> Result<&BTreeSet<ParamId>, ParameterError> {
        Ok(&self.record(id)?.modifiers)
    }
}
