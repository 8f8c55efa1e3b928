//! Contract for the local structured note cache.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Note, NoteId, NoteOrder};

/// Local note store: the single source of truth for current device state.
///
/// Mutations return affected-row style counts. A non-positive count means
/// "nothing matched" and is not an error; errors are reserved for faults.
#[async_trait]
pub trait NoteCacheStore: Send + Sync {
    /// Insert a note, replacing any existing row with the same id.
    ///
    /// Returns a positive value on success.
    async fn insert_note(&self, note: &Note) -> Result<i64>;

    /// Insert many notes, skipping ids that already exist.
    ///
    /// Returns one entry per input: positive when inserted, `-1` when skipped.
    async fn insert_notes(&self, notes: &[Note]) -> Result<Vec<i64>>;

    /// Delete one note. Deleting an absent id returns 0.
    async fn delete_note(&self, id: &NoteId) -> Result<i64>;

    /// Delete every listed id, returning how many rows were removed.
    async fn delete_notes(&self, ids: &[NoteId]) -> Result<i64>;

    /// Replace title and body of a note.
    ///
    /// `timestamp` of `None` stamps the current time; `Some` is stored verbatim.
    async fn update_note(
        &self,
        id: &NoteId,
        title: &str,
        body: &str,
        timestamp: Option<i64>,
    ) -> Result<i64>;

    /// Case-sensitive substring search over title or body.
    ///
    /// Returns the first `page * page_size` matches in `order`.
    async fn search_notes(&self, query: &str, order: NoteOrder, page: u32) -> Result<Vec<Note>>;

    async fn get_all_notes(&self) -> Result<Vec<Note>>;

    async fn search_note_by_id(&self, id: &NoteId) -> Result<Option<Note>>;

    async fn get_num_notes(&self) -> Result<i64>;
}
