//! In-process note stores.
//!
//! Both stores keep their state behind a `std::sync::Mutex` that is never
//! held across an await. The cache honours a set of sentinel ids and queries
//! that force a fault, so callers can exercise their failure paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::cache::NoteCacheStore;
use super::network::{check_batch_size, NoteNetworkStore};
use crate::error::{Error, Result};
use crate::models::{Note, NoteId, NoteOrder};
use crate::util::now_millis;

pub const FORCE_NEW_NOTE_EXCEPTION: &str = "FORCE_NEW_NOTE_EXCEPTION";
pub const FORCE_GENERAL_FAILURE: &str = "FORCE_GENERAL_FAILURE";
pub const FORCE_DELETE_NOTE_EXCEPTION: &str = "FORCE_DELETE_NOTE_EXCEPTION";
pub const FORCE_DELETES_NOTE_EXCEPTION: &str = "FORCE_DELETES_NOTE_EXCEPTION";
pub const FORCE_UPDATE_NOTE_EXCEPTION: &str = "FORCE_UPDATE_NOTE_EXCEPTION";
pub const FORCE_SEARCH_NOTES_EXCEPTION: &str = "FORCE_SEARCH_NOTES_EXCEPTION";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Cache store backed by an ordered map.
#[derive(Debug)]
pub struct InMemoryNoteCache {
    notes: Mutex<BTreeMap<NoteId, Note>>,
    page_size: u32,
    unavailable: AtomicBool,
}

impl InMemoryNoteCache {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            notes: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Start from `notes`, stored exactly as given.
    #[must_use]
    pub fn with_notes(page_size: u32, notes: impl IntoIterator<Item = Note>) -> Self {
        let cache = Self::new(page_size);
        lock(&cache.notes).extend(notes.into_iter().map(|note| (note.id.clone(), note)));
        cache
    }

    /// Copy of every stored note, ordered by id.
    pub fn snapshot(&self) -> Vec<Note> {
        lock(&self.notes).values().cloned().collect()
    }

    /// While set, full reads through `get_all_notes` fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl NoteCacheStore for InMemoryNoteCache {
    async fn insert_note(&self, note: &Note) -> Result<i64> {
        match note.id.as_str() {
            FORCE_NEW_NOTE_EXCEPTION => Err(Error::Forced(
                "Something went wrong inserting the note.".to_string(),
            )),
            FORCE_GENERAL_FAILURE => Ok(-1),
            _ => {
                lock(&self.notes).insert(note.id.clone(), note.clone());
                Ok(1)
            }
        }
    }

    async fn insert_notes(&self, notes: &[Note]) -> Result<Vec<i64>> {
        let mut stored = lock(&self.notes);
        Ok(notes
            .iter()
            .map(|note| {
                if stored.contains_key(&note.id) {
                    -1
                } else {
                    stored.insert(note.id.clone(), note.clone());
                    1
                }
            })
            .collect())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<i64> {
        if matches!(
            id.as_str(),
            FORCE_DELETE_NOTE_EXCEPTION | FORCE_DELETES_NOTE_EXCEPTION
        ) {
            return Err(Error::Forced(
                "Something went wrong deleting the note.".to_string(),
            ));
        }
        Ok(i64::from(lock(&self.notes).remove(id).is_some()))
    }

    async fn delete_notes(&self, ids: &[NoteId]) -> Result<i64> {
        if ids
            .iter()
            .any(|id| id.as_str() == FORCE_DELETES_NOTE_EXCEPTION)
        {
            return Err(Error::Forced(
                "Something went wrong deleting the notes.".to_string(),
            ));
        }
        let mut stored = lock(&self.notes);
        let removed = ids.iter().filter(|id| stored.remove(id).is_some()).count();
        Ok(i64::try_from(removed).unwrap_or(i64::MAX))
    }

    async fn update_note(
        &self,
        id: &NoteId,
        title: &str,
        body: &str,
        timestamp: Option<i64>,
    ) -> Result<i64> {
        if id.as_str() == FORCE_UPDATE_NOTE_EXCEPTION {
            return Err(Error::Forced(
                "Something went wrong updating the note.".to_string(),
            ));
        }
        let mut stored = lock(&self.notes);
        let Some(note) = stored.get_mut(id) else {
            return Ok(0);
        };
        note.title = title.to_string();
        note.body = body.to_string();
        note.updated_at = timestamp.unwrap_or_else(now_millis);
        Ok(1)
    }

    async fn search_notes(&self, query: &str, order: NoteOrder, page: u32) -> Result<Vec<Note>> {
        if query == FORCE_SEARCH_NOTES_EXCEPTION {
            return Err(Error::Forced(
                "Something went wrong searching the cache for notes.".to_string(),
            ));
        }
        let mut matches: Vec<Note> = lock(&self.notes)
            .values()
            .filter(|note| note.title.contains(query) || note.body.contains(query))
            .cloned()
            .collect();
        order.sort(&mut matches);
        let limit = usize::try_from(page.max(1).saturating_mul(self.page_size)).unwrap_or(usize::MAX);
        matches.truncate(limit);
        Ok(matches)
    }

    async fn get_all_notes(&self) -> Result<Vec<Note>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Forced("The note cache is unavailable.".to_string()));
        }
        Ok(self.snapshot())
    }

    async fn search_note_by_id(&self, id: &NoteId) -> Result<Option<Note>> {
        Ok(lock(&self.notes).get(id).cloned())
    }

    async fn get_num_notes(&self) -> Result<i64> {
        Ok(i64::try_from(lock(&self.notes).len()).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Default)]
struct Collections {
    notes: BTreeMap<NoteId, Note>,
    deletes: BTreeMap<NoteId, Note>,
    last_stamp: i64,
    offline: bool,
}

impl Collections {
    /// Server clock: strictly increasing across writes.
    fn stamp(&mut self) -> i64 {
        self.last_stamp = now_millis().max(self.last_stamp + 1);
        self.last_stamp
    }

    fn reachable(&self) -> Result<()> {
        if self.offline {
            return Err(Error::Io(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            )));
        }
        Ok(())
    }

    fn put_live(&mut self, note: &Note) {
        let mut stored = note.clone();
        stored.updated_at = self.stamp();
        self.notes.insert(stored.id.clone(), stored);
    }
}

/// Network store with a live collection and a tombstone ledger.
///
/// Live writes are stamped with this store's clock, like the hosted store does.
#[derive(Debug, Default)]
pub struct InMemoryNoteNetwork {
    inner: Mutex<Collections>,
}

impl InMemoryNoteNetwork {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place notes in the live collection without stamping them.
    pub fn seed_notes(&self, notes: impl IntoIterator<Item = Note>) {
        lock(&self.inner)
            .notes
            .extend(notes.into_iter().map(|note| (note.id.clone(), note)));
    }

    /// Place tombstones in the ledger as given.
    pub fn seed_deleted_notes(&self, notes: impl IntoIterator<Item = Note>) {
        lock(&self.inner)
            .deletes
            .extend(notes.into_iter().map(|note| (note.id.clone(), note)));
    }

    /// Make every call fail with a connection error until switched back.
    pub fn set_offline(&self, offline: bool) {
        lock(&self.inner).offline = offline;
    }

    pub fn live_notes(&self) -> Vec<Note> {
        lock(&self.inner).notes.values().cloned().collect()
    }

    pub fn tombstones(&self) -> Vec<Note> {
        lock(&self.inner).deletes.values().cloned().collect()
    }

    pub fn has_tombstone(&self, id: &NoteId) -> bool {
        lock(&self.inner).deletes.contains_key(id)
    }
}

#[async_trait]
impl NoteNetworkStore for InMemoryNoteNetwork {
    async fn insert_or_update_note(&self, note: &Note) -> Result<()> {
        let mut inner = lock(&self.inner);
        inner.reachable()?;
        inner.put_live(note);
        Ok(())
    }

    async fn insert_or_update_notes(&self, notes: &[Note]) -> Result<()> {
        check_batch_size(notes.len())?;
        let mut inner = lock(&self.inner);
        inner.reachable()?;
        for note in notes {
            inner.put_live(note);
        }
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let mut inner = lock(&self.inner);
        inner.reachable()?;
        inner.notes.remove(id);
        Ok(())
    }

    async fn insert_deleted_note(&self, note: &Note) -> Result<()> {
        let mut inner = lock(&self.inner);
        inner.reachable()?;
        inner.deletes.insert(note.id.clone(), note.clone());
        Ok(())
    }

    async fn insert_deleted_notes(&self, notes: &[Note]) -> Result<()> {
        check_batch_size(notes.len())?;
        let mut inner = lock(&self.inner);
        inner.reachable()?;
        inner
            .deletes
            .extend(notes.iter().map(|note| (note.id.clone(), note.clone())));
        Ok(())
    }

    async fn delete_deleted_note(&self, note: &Note) -> Result<()> {
        let mut inner = lock(&self.inner);
        inner.reachable()?;
        inner.deletes.remove(&note.id);
        Ok(())
    }

    async fn get_deleted_notes(&self) -> Result<Vec<Note>> {
        let inner = lock(&self.inner);
        inner.reachable()?;
        Ok(inner.deletes.values().cloned().collect())
    }

    async fn delete_all_notes(&self) -> Result<()> {
        let mut inner = lock(&self.inner);
        inner.reachable()?;
        inner.notes.clear();
        inner.deletes.clear();
        Ok(())
    }

    async fn search_note(&self, note: &Note) -> Result<Option<Note>> {
        let inner = lock(&self.inner);
        inner.reachable()?;
        Ok(inner.notes.get(&note.id).cloned())
    }

    async fn get_all_notes(&self) -> Result<Vec<Note>> {
        let inner = lock(&self.inner);
        inner.reachable()?;
        Ok(inner.notes.values().cloned().collect())
    }
}

/// Builds notes with fixed timestamps for tests.
#[cfg(test)]
pub struct NoteFactory;

#[cfg(test)]
impl NoteFactory {
    pub const BASE_TIME: i64 = 1_611_927_910_000;

    pub fn create_note(id: &str, title: &str, body: &str, updated_at: i64) -> Note {
        Note {
            id: NoteId::from(id),
            title: title.to_string(),
            body: body.to_string(),
            created_at: Self::BASE_TIME,
            updated_at,
        }
    }

    /// `count` notes with ids `{prefix}-0..`, one second apart.
    pub fn create_note_list(prefix: &str, count: usize) -> Vec<Note> {
        (0..count)
            .map(|index| {
                let offset = i64::try_from(index).unwrap_or_default() * 1_000;
                Self::create_note(
                    &format!("{prefix}-{index}"),
                    &format!("Title {index}"),
                    &format!("Body of note {index}"),
                    Self::BASE_TIME + offset,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(flavor = "multi_thread")]
    async fn cache_sentinels_force_faults() {
        let cache = InMemoryNoteCache::new(30);

        let forced = NoteFactory::create_note(FORCE_NEW_NOTE_EXCEPTION, "t", "b", 1);
        assert!(matches!(cache.insert_note(&forced).await, Err(Error::Forced(_))));

        let failing = NoteFactory::create_note(FORCE_GENERAL_FAILURE, "t", "b", 1);
        assert_eq!(cache.insert_note(&failing).await.unwrap(), -1);

        assert!(cache
            .search_notes(FORCE_SEARCH_NOTES_EXCEPTION, NoteOrder::default(), 1)
            .await
            .is_err());
        assert_eq!(cache.get_num_notes().await.unwrap(), 0);

        cache.set_unavailable(true);
        assert!(matches!(cache.get_all_notes().await, Err(Error::Forced(_))));
        cache.set_unavailable(false);
        assert!(cache.get_all_notes().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn search_is_case_sensitive_and_paged() {
        let mut notes = NoteFactory::create_note_list("n", 5);
        notes[0].title = "Groceries".to_string();
        let cache = InMemoryNoteCache::with_notes(2, notes);

        let found = cache
            .search_notes("groceries", NoteOrder::TitleAsc, 1)
            .await
            .unwrap();
        assert!(found.is_empty());

        let page_one = cache.search_notes("", NoteOrder::DateDesc, 1).await.unwrap();
        let page_two = cache.search_notes("", NoteOrder::DateDesc, 2).await.unwrap();
        assert_eq!(page_one.len(), 2);
        assert_eq!(page_two.len(), 4);
        assert_eq!(page_one[..], page_two[..2]);
        assert_eq!(page_one[0].id.as_str(), "n-4");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_with_explicit_timestamp_is_verbatim() {
        let note = NoteFactory::create_note("a", "old", "body", NoteFactory::BASE_TIME);
        let cache = InMemoryNoteCache::with_notes(30, [note.clone()]);

        let count = cache
            .update_note(&note.id, "new", "text", Some(42))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let stored = cache.search_note_by_id(&note.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "new");
        assert_eq!(stored.updated_at, 42);
        assert_eq!(stored.created_at, note.created_at);

        let missing = cache
            .update_note(&NoteId::from("missing"), "x", "y", None)
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn bulk_insert_skips_existing_ids() {
        let existing = NoteFactory::create_note("a", "kept", "", 1);
        let cache = InMemoryNoteCache::with_notes(30, [existing]);

        let incoming = vec![
            NoteFactory::create_note("a", "replacement", "", 2),
            NoteFactory::create_note("b", "fresh", "", 2),
        ];
        let results = cache.insert_notes(&incoming).await.unwrap();
        assert_eq!(results, vec![-1, 1]);

        let kept = cache.search_note_by_id(&NoteId::from("a")).await.unwrap().unwrap();
        assert_eq!(kept.title, "kept");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn network_stamps_live_writes_but_not_tombstones() {
        let network = InMemoryNoteNetwork::new();
        let note = NoteFactory::create_note("a", "t", "b", 5);

        network.insert_or_update_note(&note).await.unwrap();
        network.insert_deleted_note(&note).await.unwrap();

        let live = network.search_note(&note).await.unwrap().unwrap();
        assert!(live.updated_at > note.updated_at);
        assert_eq!(network.tombstones(), vec![note]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn oversized_batch_writes_nothing() {
        let network = InMemoryNoteNetwork::new();
        let notes = NoteFactory::create_note_list("bulk", 501);

        assert!(matches!(
            network.insert_or_update_notes(&notes).await,
            Err(Error::BatchLimit { .. })
        ));
        assert!(network.get_all_notes().await.unwrap().is_empty());

        network.insert_or_update_notes(&notes[..500]).await.unwrap();
        assert_eq!(network.get_all_notes().await.unwrap().len(), 500);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_all_clears_both_collections() {
        let network = InMemoryNoteNetwork::new();
        network.seed_notes(NoteFactory::create_note_list("live", 3));
        network.seed_deleted_notes(NoteFactory::create_note_list("gone", 2));

        network.delete_all_notes().await.unwrap();
        assert!(network.live_notes().is_empty());
        assert!(network.tombstones().is_empty());
    }
}
