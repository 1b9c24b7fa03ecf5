use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who authored a chat message. The wire form is the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
            Self::System => "System",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Immutable once appended to a transcript or feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    #[serde(
        rename = "avatarUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.avatar_url = (!url.is_empty()).then_some(url);
        self
    }
}

/// A stored login credential. Created at registration, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    Duplicate,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Lookup and insertion of credentials. Implementations are blocking;
/// async callers run them on `spawn_blocking`.
pub trait CredentialStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Credential>>;

    /// Must be atomic: of two concurrent inserts for one username, exactly
    /// one succeeds and the other gets [`StoreError::Duplicate`].
    fn insert(&self, credential: &Credential) -> Result<(), StoreError>;
}
