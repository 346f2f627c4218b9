use std::fmt;

use serde::{Deserialize, Serialize};

/// Which toggle on an entity a target tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToggleKind {
    QuestionLike,
    CommentLike,
    QuestionBookmark,
}

impl ToggleKind {
    /// Likes carry an aggregate count, bookmarks do not.
    pub fn is_counted(self) -> bool {
        match self {
            ToggleKind::QuestionLike | ToggleKind::CommentLike => true,
            ToggleKind::QuestionBookmark => false,
        }
    }

    /// Path of the toggle endpoint, relative to the API base URL.
    pub fn endpoint(self, id: &TargetId) -> String {
        match self {
            ToggleKind::QuestionLike => format!("api/questions/{}/like", id),
            ToggleKind::CommentLike => format!("api/comments/{}/like", id),
            ToggleKind::QuestionBookmark => format!("api/questions/{}/bookmark", id),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToggleKind::QuestionLike => "question-like",
            ToggleKind::CommentLike => "comment-like",
            ToggleKind::QuestionBookmark => "question-bookmark",
        }
    }
}

/// Opaque server identifier of a question or comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetKey {
    pub kind: ToggleKind,
    pub id: TargetId,
}

impl TargetKey {
    pub fn new(kind: ToggleKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: TargetId::new(id),
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.label(), self.id)
    }
}

/// Perceived state of one likeable or bookmarkable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleTarget {
    pub key: TargetKey,
    pub is_active: bool,
    pub count: u64,
    /// Bumped on every local toggle; responses to older versions are stale.
    pub version: u64,
    pub pending: bool,
}

impl ToggleTarget {
    pub fn seeded(key: TargetKey, is_active: bool, count: u64) -> Self {
        Self {
            key,
            is_active,
            count,
            version: 0,
            pending: false,
        }
    }
}

/// Partial update applied through the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TogglePatch {
    pub is_active: Option<bool>,
    pub count: Option<u64>,
    pub version: Option<u64>,
    pub pending: Option<bool>,
}

impl TogglePatch {
    pub fn pending(pending: bool) -> Self {
        Self {
            pending: Some(pending),
            ..Default::default()
        }
    }

    pub fn apply(&self, target: &mut ToggleTarget) {
        if let Some(is_active) = self.is_active {
            target.is_active = is_active;
        }
        if let Some(count) = self.count {
            target.count = count;
        }
        if let Some(version) = self.version {
            target.version = version;
        }
        if let Some(pending) = self.pending {
            target.pending = pending;
        }
    }
}

/// Authoritative state reported by the server after a toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleAck {
    pub is_active: bool,
    /// Absent for bookmarks.
    pub count: Option<u64>,
}
