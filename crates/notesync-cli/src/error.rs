use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] notesync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("A note needs a title")]
    EmptyTitle,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Some notes could not be resolved: {}", .0.join("; "))]
    UnresolvedNotes(Vec<String>),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("{0}")]
    Rejected(String),
    #[error("Job {0} did not run")]
    JobNotRun(&'static str),
    #[error("Sync failed: {0}")]
    SyncFailed(String),
    #[error(
        "Remote store is not configured. Set NOTESYNC_FIRESTORE_PROJECT and NOTESYNC_USER_ID (plus NOTESYNC_FIRESTORE_TOKEN) to enable it."
    )]
    SyncNotConfigured,
}
