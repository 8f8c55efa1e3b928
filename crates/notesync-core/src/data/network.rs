//! Contract for the remote document store.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{Note, NoteId};

/// Largest number of notes one batch write may carry.
pub const MAX_BATCH_SIZE: usize = 500;

/// Remote per-user namespace with two collections: live notes and the
/// tombstone ledger of deleted notes.
///
/// Writes to the live collection stamp `updated_at` with the store's own
/// clock, overriding whatever the client sent. Tombstones are stored as given.
#[async_trait]
pub trait NoteNetworkStore: Send + Sync {
    async fn insert_or_update_note(&self, note: &Note) -> Result<()>;

    /// Batch variant; more than [`MAX_BATCH_SIZE`] notes is rejected outright.
    async fn insert_or_update_notes(&self, notes: &[Note]) -> Result<()>;

    /// Remove a note from the live collection only.
    async fn delete_note(&self, id: &NoteId) -> Result<()>;

    /// Record a tombstone.
    async fn insert_deleted_note(&self, note: &Note) -> Result<()>;

    /// Batch variant; more than [`MAX_BATCH_SIZE`] notes is rejected outright.
    async fn insert_deleted_notes(&self, notes: &[Note]) -> Result<()>;

    /// Remove a tombstone, used when a note is restored.
    async fn delete_deleted_note(&self, note: &Note) -> Result<()>;

    async fn get_deleted_notes(&self) -> Result<Vec<Note>>;

    /// Wipe both collections for this user.
    async fn delete_all_notes(&self) -> Result<()>;

    /// Fetch the live copy of `note` by id.
    async fn search_note(&self, note: &Note) -> Result<Option<Note>>;

    async fn get_all_notes(&self) -> Result<Vec<Note>>;
}

/// Reject batches above [`MAX_BATCH_SIZE`] before anything is written.
pub fn check_batch_size(len: usize) -> Result<()> {
    if len > MAX_BATCH_SIZE {
        return Err(Error::BatchLimit {
            size: len,
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}
