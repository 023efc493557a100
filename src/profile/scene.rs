// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene table: bus scene numbers mapped to appliance presets.

use std::collections::HashSet;

use crate::types::FanSpeed;

/// Target settings of a scene.
///
/// Every field is optional. `None` means the scene leaves that setting
/// alone when invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneSpec {
    /// Target fan speed.
    pub fan: Option<FanSpeed>,
    /// Target sleep mode.
    pub sleep_mode: Option<bool>,
    /// Target automatic mode.
    pub auto_mode: Option<bool>,
}

impl SceneSpec {
    /// Returns `true` if the scene changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fan.is_none() && self.sleep_mode.is_none() && self.auto_mode.is_none()
    }
}

/// One configured scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSlot {
    /// Bus scene number.
    pub ds_id: i32,
    /// Settings applied on invocation.
    pub spec: SceneSpec,
}

/// Result of storing a scene number in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A slot with the same number existed and was kept.
    Updated,
    /// A new slot was taken.
    Added,
    /// The table is full, nothing was stored.
    Full,
}

/// Fixed capacity, ordered scene table.
///
/// Keeps a set of configured scene numbers next to the slots so membership
/// checks do not scan the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneTable {
    slots: Vec<SceneSlot>,
    configured: HashSet<i32>,
    capacity: usize,
}

impl SceneTable {
    /// Default number of scene slots.
    pub const DEFAULT_CAPACITY: usize = 128;

    /// Creates an empty table with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates an empty table holding at most `capacity` scenes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            configured: HashSet::new(),
            capacity,
        }
    }

    /// Returns the maximum number of scenes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of configured scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no scene is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the configured slots in table order.
    #[must_use]
    pub fn slots(&self) -> &[SceneSlot] {
        &self.slots
    }

    /// Returns `true` if the scene number is configured.
    #[must_use]
    pub fn is_configured(&self, ds_id: i32) -> bool {
        self.configured.contains(&ds_id)
    }

    /// Returns the settings of a configured scene.
    #[must_use]
    pub fn get(&self, ds_id: i32) -> Option<&SceneSpec> {
        if !self.is_configured(ds_id) {
            return None;
        }
        self.slots.iter().find(|s| s.ds_id == ds_id).map(|s| &s.spec)
    }

    /// Stores a scene with its settings, replacing an existing one with the
    /// same number.
    pub fn insert(&mut self, ds_id: i32, spec: SceneSpec) -> SaveOutcome {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.ds_id == ds_id) {
            slot.spec = spec;
            return SaveOutcome::Updated;
        }
        if self.slots.len() >= self.capacity {
            return SaveOutcome::Full;
        }
        self.slots.push(SceneSlot { ds_id, spec });
        self.configured.insert(ds_id);
        SaveOutcome::Added
    }

    /// Records a scene number sent by a bus save-scene call.
    ///
    /// An existing slot keeps its settings. A new slot starts empty. When
    /// the table is full the call is dropped.
    pub fn save(&mut self, ds_id: i32) -> SaveOutcome {
        if self.is_configured(ds_id) {
            return SaveOutcome::Updated;
        }
        self.insert(ds_id, SceneSpec::default())
    }
}

impl Default for SceneTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan_scene(level: u8) -> SceneSpec {
        SceneSpec {
            fan: Some(FanSpeed::new(level).unwrap()),
            ..SceneSpec::default()
        }
    }

    #[test]
    fn save_then_lookup() {
        let mut table = SceneTable::new();
        assert_eq!(table.save(42), SaveOutcome::Added);
        assert!(table.is_configured(42));
        assert_eq!(table.slots()[0].ds_id, 42);
        assert_eq!(table.get(42), Some(&SceneSpec::default()));
    }

    #[test]
    fn save_existing_keeps_settings() {
        let mut table = SceneTable::new();
        table.insert(5, fan_scene(3));
        assert_eq!(table.save(5), SaveOutcome::Updated);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(5), Some(&fan_scene(3)));
    }

    #[test]
    fn insert_replaces_settings() {
        let mut table = SceneTable::new();
        table.insert(5, fan_scene(1));
        assert_eq!(table.insert(5, fan_scene(2)), SaveOutcome::Updated);
        assert_eq!(table.get(5), Some(&fan_scene(2)));
    }

    #[test]
    fn saves_beyond_capacity_are_dropped() {
        let mut table = SceneTable::new();
        for n in 0..128 {
            assert_eq!(table.save(n), SaveOutcome::Added);
        }
        let before = table.clone();
        for n in 128..140 {
            assert_eq!(table.save(n), SaveOutcome::Full);
        }
        assert_eq!(table, before);
        assert!(!table.is_configured(130));
    }

    #[test]
    fn full_table_still_updates_existing() {
        let mut table = SceneTable::with_capacity(1);
        table.insert(1, fan_scene(1));
        assert_eq!(table.insert(2, fan_scene(2)), SaveOutcome::Full);
        assert_eq!(table.insert(1, fan_scene(3)), SaveOutcome::Updated);
    }

    #[test]
    fn unconfigured_scene_is_absent() {
        let table = SceneTable::new();
        assert!(table.get(17).is_none());
        assert!(!table.is_configured(17));
    }

    #[test]
    fn empty_spec() {
        assert!(SceneSpec::default().is_empty());
        assert!(!fan_scene(2).is_empty());
    }
}
