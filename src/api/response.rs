use serde::Deserialize;

use crate::app::{Result, UttarError};
use crate::domain::{ToggleAck, ToggleKind};

/// Body returned by the like and bookmark endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub success: bool,
    pub is_liked: Option<bool>,
    pub likes: Option<i64>,
    pub is_bookmarked: Option<bool>,
    pub message: Option<String>,
}

impl ToggleResponse {
    pub fn parse(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Validates the payload for `kind` and reduces it to the state we track.
    pub fn into_ack(self, kind: ToggleKind) -> Result<ToggleAck> {
        if !self.success {
            return Err(UttarError::Rejected(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }

        let (flag, field) = match kind {
            ToggleKind::QuestionLike | ToggleKind::CommentLike => (self.is_liked, "isLiked"),
            ToggleKind::QuestionBookmark => (self.is_bookmarked, "isBookmarked"),
        };

        let is_active = flag.ok_or_else(|| {
            UttarError::Schema(format!("{} response is missing {}", kind.label(), field))
        })?;

        let count = if kind.is_counted() {
            self.likes.map(|n| n.max(0) as u64)
        } else {
            None
        };

        Ok(ToggleAck { is_active, count })
    }
}
