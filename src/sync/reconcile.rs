use crate::domain::{TargetKey, ToggleAck, TogglePatch};
use crate::sync::mutator::Inverse;
use crate::sync::registry::ToggleRegistry;

/// What a server response did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Server state adopted as ground truth.
    Adopted,
    /// A newer local toggle exists; server values discarded.
    Superseded,
    /// Failure for the latest toggle; optimistic change undone.
    RolledBack,
    /// Failure for an older toggle; newer local intent kept.
    FailureSuperseded,
    /// The target left the view while the request was in flight.
    Untracked,
}

pub fn on_success(
    registry: &mut ToggleRegistry,
    key: &TargetKey,
    request_version: u64,
    ack: ToggleAck,
) -> Reconciliation {
    let Some(current) = registry.get(key) else {
        return Reconciliation::Untracked;
    };

    if current.version == request_version {
        let patch = TogglePatch {
            is_active: Some(ack.is_active),
            count: if key.kind.is_counted() { ack.count } else { None },
            version: None,
            pending: Some(false),
        };
        registry.set(key, patch);
        Reconciliation::Adopted
    } else {
        registry.set(key, TogglePatch::pending(false));
        Reconciliation::Superseded
    }
}

/// Folds a successful response into the last state the server confirmed.
///
/// Uncounted kinds keep the previous count. A like response without `likes`
/// moves the previous count by the flip, clamped at zero.
pub fn acknowledge(previous: Inverse, key: &TargetKey, ack: ToggleAck) -> Inverse {
    let count = if !key.kind.is_counted() {
        previous.count
    } else if let Some(count) = ack.count {
        count
    } else if ack.is_active == previous.is_active {
        previous.count
    } else if ack.is_active {
        previous.count.saturating_add(1)
    } else {
        previous.count.saturating_sub(1)
    };

    Inverse {
        is_active: ack.is_active,
        count,
    }
}

pub fn on_failure(
    registry: &mut ToggleRegistry,
    key: &TargetKey,
    request_version: u64,
    inverse: Inverse,
) -> Reconciliation {
    let Some(current) = registry.get(key) else {
        return Reconciliation::Untracked;
    };

    if current.version == request_version {
        let mut patch = inverse.patch();
        patch.pending = Some(false);
        registry.set(key, patch);
        Reconciliation::RolledBack
    } else {
        registry.set(key, TogglePatch::pending(false));
        Reconciliation::FailureSuperseded
    }
}
