// Per-player channel registry
//
// Name-keyed collection of virtual channels belonging to one player slot.
// Names are unique within a registry.

use super::axis::{AxisDefinition, AxisRuntime};
use super::source::RawInputSource;
use super::InputError;
use log::warn;
use std::collections::HashMap;
use std::time::Instant;

/// All virtual channels of one player
#[derive(Debug, Clone, Default)]
pub struct PlayerAxisRegistry {
    /// Human-readable registry name, persisted alongside the channels
    name: String,

    /// Channels by name
    axes: HashMap<String, AxisRuntime>,
}

impl PlayerAxisRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            axes: HashMap::new(),
        }
    }

    /// Build a registry from stored definitions, rejecting duplicate names
    pub fn from_definitions(
        name: impl Into<String>,
        definitions: impl IntoIterator<Item = AxisDefinition>,
        now: Instant,
    ) -> Result<Self, InputError> {
        let mut registry = Self::new(name);
        for definition in definitions {
            registry.add(definition, now)?;
        }
        Ok(registry)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Insert a channel; fails without mutation if the name is taken
    pub fn add(&mut self, definition: AxisDefinition, now: Instant) -> Result<(), InputError> {
        if self.axes.contains_key(&definition.name) {
            warn!(
                "Registry '{}' already has a channel named '{}'",
                self.name, definition.name
            );
            return Err(InputError::DuplicateChannelName(definition.name));
        }
        self.axes
            .insert(definition.name.clone(), AxisRuntime::new(definition, now));
        Ok(())
    }

    /// Remove a channel, reporting whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        self.axes.remove(name).is_some()
    }

    /// Copy of every definition, as a fresh registry with neutral state
    pub fn duplicate(&self, now: Instant) -> Self {
        let axes = self
            .axes
            .iter()
            .map(|(name, axis)| {
                (
                    name.clone(),
                    AxisRuntime::new(axis.definition().clone(), now),
                )
            })
            .collect();
        Self {
            name: self.name.clone(),
            axes,
        }
    }

    /// Take a channel's definition out of the registry
    pub fn pop_axis(&mut self, name: &str) -> Option<AxisDefinition> {
        self.axes.remove(name).map(AxisRuntime::into_definition)
    }

    pub fn get(&self, name: &str) -> Option<&AxisRuntime> {
        self.axes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AxisRuntime> {
        self.axes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.axes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisRuntime> {
        self.axes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AxisRuntime> {
        self.axes.values_mut()
    }

    /// Definitions sorted by name, for stable persistence
    pub fn definitions(&self) -> Vec<AxisDefinition> {
        let mut definitions: Vec<AxisDefinition> =
            self.axes.values().map(|a| a.definition().clone()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Tick every channel
    pub fn update_all<S: RawInputSource + ?Sized>(&mut self, now: Instant, source: &S) {
        for axis in self.axes.values_mut() {
            axis.update(now, source);
        }
    }

    /// Reset every channel's live state
    pub fn init_all(&mut self, now: Instant) {
        for axis in self.axes.values_mut() {
            axis.init(now);
        }
    }
}
