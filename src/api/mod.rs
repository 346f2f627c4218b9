pub mod http_client;
pub mod response;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{TargetKey, ToggleAck};

pub use http_client::HttpToggleApi;
pub use response::ToggleResponse;

#[async_trait]
pub trait ToggleApi {
    /// Asks the server to flip `key`.
    ///
    /// Resolves to the server's view of the target after the flip; an
    /// application-level rejection is an error just like a transport failure.
    async fn send(&self, key: &TargetKey) -> Result<ToggleAck>;
}
