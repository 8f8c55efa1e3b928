//! Network store used when no remote store is configured.

use async_trait::async_trait;
use notesync_core::data::NoteNetworkStore;
use notesync_core::{Error, Note, NoteId, Result};

/// Accepts mirrored writes without sending them anywhere; reads fail.
///
/// Local edits made while unconfigured reach the remote store on the first
/// sync after it is configured. Deletes made in that window leave no
/// tombstone, so another device can still hand those notes back.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineNoteNetwork;

fn not_configured<T>() -> Result<T> {
    Err(Error::NotConfigured("remote store".to_string()))
}

#[async_trait]
impl NoteNetworkStore for OfflineNoteNetwork {
    async fn insert_or_update_note(&self, note: &Note) -> Result<()> {
        tracing::debug!(note = %note.id, "offline, skipping remote write");
        Ok(())
    }

    async fn insert_or_update_notes(&self, _notes: &[Note]) -> Result<()> {
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        tracing::debug!(note = %id, "offline, skipping remote delete");
        Ok(())
    }

    async fn insert_deleted_note(&self, _note: &Note) -> Result<()> {
        Ok(())
    }

    async fn insert_deleted_notes(&self, _notes: &[Note]) -> Result<()> {
        Ok(())
    }

    async fn delete_deleted_note(&self, _note: &Note) -> Result<()> {
        Ok(())
    }

    async fn get_deleted_notes(&self) -> Result<Vec<Note>> {
        not_configured()
    }

    async fn delete_all_notes(&self) -> Result<()> {
        not_configured()
    }

    async fn search_note(&self, _note: &Note) -> Result<Option<Note>> {
        not_configured()
    }

    async fn get_all_notes(&self) -> Result<Vec<Note>> {
        not_configured()
    }
}
