use crate::domain::{TargetKey, TogglePatch};
use crate::sync::registry::ToggleRegistry;

/// Pre-toggle values, kept so a rejected toggle can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inverse {
    pub is_active: bool,
    pub count: u64,
}

impl Inverse {
    pub fn patch(&self) -> TogglePatch {
        TogglePatch {
            is_active: Some(self.is_active),
            count: Some(self.count),
            ..Default::default()
        }
    }
}

/// Applies the local half of a toggle immediately.
///
/// Flips `is_active`, moves a like count by one (never below zero) and stamps
/// a fresh version from the registry clock. Returns `None` for an untracked key.
pub fn apply_toggle(registry: &mut ToggleRegistry, key: &TargetKey) -> Option<Inverse> {
    let current = registry.get(key)?;
    let inverse = Inverse {
        is_active: current.is_active,
        count: current.count,
    };

    let is_active = !current.is_active;
    let count = if !key.kind.is_counted() {
        current.count
    } else if is_active {
        current.count.saturating_add(1)
    } else {
        current.count.saturating_sub(1)
    };

    let patch = TogglePatch {
        is_active: Some(is_active),
        count: Some(count),
        version: Some(registry.next_version()),
        pending: None,
    };
    registry.set(key, patch);

    Some(inverse)
}
