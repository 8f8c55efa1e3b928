//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::util::now_millis;

/// A unique identifier for a note.
///
/// Ids are generated on the client as UUID v7 strings, but any non-empty
/// string read back from a store is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for NoteId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::Error::InvalidInput(
                "note id cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Title, never empty once accepted by an interactor
    pub title: String,
    /// Body text, may be empty
    pub body: String,
    /// Creation timestamp (Unix ms), never changed after creation
    pub created_at: i64,
    /// Last mutation timestamp (Unix ms), the conflict-resolution signal
    pub updated_at: i64,
}

impl Note {
    /// Create a new note with a fresh id
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_id(NoteId::new(), title, body)
    }

    /// Create a new note with a caller-supplied id
    #[must_use]
    pub fn with_id(id: NoteId, title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id,
            title: title.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this note with new content and a fresh `updated_at`
    #[must_use]
    pub fn edited(&self, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            title: title.into(),
            body: body.into(),
            created_at: self.created_at,
            updated_at: now_millis().max(self.updated_at),
        }
    }

    /// Copy of this note with only `updated_at` moved to now
    #[must_use]
    pub fn touched(&self) -> Self {
        self.edited(self.title.clone(), self.body.clone())
    }

    /// Whether two copies of a note carry the same user-visible content
    pub fn same_content(&self, other: &Self) -> bool {
        self.title == other.title && self.body == other.body
    }

    /// Get first line of the body as a preview, truncated to `max_len` characters
    #[must_use]
    pub fn body_preview(&self, max_len: usize) -> String {
        self.body
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

/// Normalize a title for storage, rejecting empty or whitespace-only titles.
pub fn normalize_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
