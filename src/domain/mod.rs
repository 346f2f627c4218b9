pub mod session;
pub mod target;

pub use session::{can_access, Role, Session};
pub use target::{TargetId, TargetKey, ToggleAck, ToggleKind, TogglePatch, ToggleTarget};
