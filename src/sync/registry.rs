use std::collections::HashMap;

use crate::domain::{TargetKey, TogglePatch, ToggleTarget};

/// Perceived state of every entity currently in view.
#[derive(Debug, Default)]
pub struct ToggleRegistry {
    targets: HashMap<TargetKey, ToggleTarget>,
    /// Last version handed out. Survives `forget`, so a re-tracked target
    /// never reuses a version an older request still carries.
    clock: u64,
}

impl ToggleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tracked target, seeding it from server-loaded values on first sight.
    ///
    /// The seed is ignored once the target exists.
    pub fn get_or_seed(&mut self, key: &TargetKey, is_active: bool, count: u64) -> &ToggleTarget {
        self.targets
            .entry(key.clone())
            .or_insert_with(|| ToggleTarget::seeded(key.clone(), is_active, count))
    }

    pub fn next_version(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn get(&self, key: &TargetKey) -> Option<&ToggleTarget> {
        self.targets.get(key)
    }

    pub fn snapshot(&self, key: &TargetKey) -> Option<ToggleTarget> {
        self.targets.get(key).cloned()
    }

    /// Merges a partial update. Returns false when the key is not tracked.
    pub fn set(&mut self, key: &TargetKey, patch: TogglePatch) -> bool {
        match self.targets.get_mut(key) {
            Some(target) => {
                patch.apply(target);
                true
            }
            None => false,
        }
    }

    /// Drops a target once its entity leaves the view.
    pub fn forget(&mut self, key: &TargetKey) -> Option<ToggleTarget> {
        self.targets.remove(key)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
