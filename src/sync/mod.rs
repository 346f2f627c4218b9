//! Optimistic toggle synchronization.
//!
//! ```text
//! toggle -> mutator (apply, keep inverse) -> coordinator (send or coalesce)
//!        -> reconcile (adopt, discard, or roll back by version) -> registry
//!        -> coordinator (trailing request only if intent differs from server)
//! ```

pub mod coordinator;
pub mod mutator;
pub mod reconcile;
pub mod registry;

pub use coordinator::{SyncEngine, SyncNotice, ToggleOutcome};
pub use mutator::{apply_toggle, Inverse};
pub use reconcile::{acknowledge, on_failure, on_success, Reconciliation};
pub use registry::ToggleRegistry;
