pub mod context;
pub mod error;
pub mod guard;
pub mod session;

pub use context::AppContext;
pub use error::{Result, UttarError};
pub use guard::{navigate, Navigation, Route};
pub use session::SessionContext;
