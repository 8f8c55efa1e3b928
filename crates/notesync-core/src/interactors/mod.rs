//! Use-case layer: one interactor per user operation.
//!
//! Interactors read and write the cache synchronously (from the caller's point
//! of view) and mirror successful mutations to the network through a
//! [`NetworkMirror`]. Each call yields at most one [`DataState`] outcome.
//!
//! [`DataState`]: crate::state::DataState

mod delete_multiple_notes;
mod delete_note;
mod events;
mod get_num_notes;
mod insert_new_note;
mod mirror;
mod restore_deleted_note;
mod search_notes;
mod update_note;
mod view_state;

use std::sync::Arc;

pub use delete_multiple_notes::{
    confirm_delete_notes, DeleteMultipleNotes, DELETE_NOTES_ARE_YOU_SURE, DELETE_NOTES_ERRORS,
    DELETE_NOTES_SUCCESS, DELETE_NOTES_YOU_MUST_SELECT,
};
pub use delete_note::{DeleteNote, DELETE_NOTE_FAILED, DELETE_NOTE_SUCCESS};
pub use events::{NoteDetailStateEvent, NoteListStateEvent};
pub use get_num_notes::{GetNumNotes, GET_NUM_NOTES_SUCCESS};
pub use insert_new_note::{
    InsertNewNote, INSERT_NOTE_EMPTY_TITLE, INSERT_NOTE_FAILED, INSERT_NOTE_SUCCESS,
};
pub use mirror::NetworkMirror;
pub use restore_deleted_note::{RestoreDeletedNote, RESTORE_NOTE_FAILED, RESTORE_NOTE_SUCCESS};
pub use search_notes::{SearchNotes, SEARCH_NOTES_NO_MATCHING_RESULTS, SEARCH_NOTES_SUCCESS};
pub use update_note::{UpdateNote, UPDATE_NOTE_EMPTY_TITLE, UPDATE_NOTE_FAILED, UPDATE_NOTE_SUCCESS};
pub use view_state::{NoteDetailViewState, NoteListViewState, NotePendingDelete};

use crate::data::{Deadlines, NoteCacheStore};

/// Interactors behind the note list surface.
#[derive(Clone)]
pub struct NoteListInteractors {
    pub insert_new_note: InsertNewNote,
    pub delete_note: DeleteNote<NoteListViewState>,
    pub search_notes: SearchNotes,
    pub get_num_notes: GetNumNotes,
    pub delete_multiple_notes: DeleteMultipleNotes,
    pub restore_deleted_note: RestoreDeletedNote,
}

impl NoteListInteractors {
    pub fn new(cache: Arc<dyn NoteCacheStore>, mirror: NetworkMirror, deadlines: Deadlines) -> Self {
        let deadline = deadlines.cache;
        Self {
            insert_new_note: InsertNewNote::new(Arc::clone(&cache), mirror.clone(), deadline),
            delete_note: DeleteNote::new(Arc::clone(&cache), mirror.clone(), deadline),
            search_notes: SearchNotes::new(Arc::clone(&cache), deadline),
            get_num_notes: GetNumNotes::new(Arc::clone(&cache), deadline),
            delete_multiple_notes: DeleteMultipleNotes::new(
                Arc::clone(&cache),
                mirror.clone(),
                deadline,
            ),
            restore_deleted_note: RestoreDeletedNote::new(cache, mirror, deadline),
        }
    }
}

/// Interactors behind the single-note surface.
#[derive(Clone)]
pub struct NoteDetailInteractors {
    pub update_note: UpdateNote,
    pub delete_note: DeleteNote<NoteDetailViewState>,
}

impl NoteDetailInteractors {
    pub fn new(cache: Arc<dyn NoteCacheStore>, mirror: NetworkMirror, deadlines: Deadlines) -> Self {
        Self {
            update_note: UpdateNote::new(Arc::clone(&cache), mirror.clone(), deadlines.cache),
            delete_note: DeleteNote::new(cache, mirror, deadlines.cache),
        }
    }
}
