//! Data payloads carried by interactor outcomes.

use serde::Serialize;

use crate::models::{Note, NoteOrder};

/// State of the note list surface. Each outcome fills only what it changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteListViewState {
    pub note_list: Option<Vec<Note>>,
    pub new_note: Option<Note>,
    /// Note offered for undo after a delete, or just brought back by restore
    pub note_pending_delete: Option<NotePendingDelete>,
    pub search_query: Option<String>,
    pub page: Option<u32>,
    pub order: Option<NoteOrder>,
    pub num_notes_in_cache: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotePendingDelete {
    pub note: Option<Note>,
    pub list_position: Option<usize>,
}

/// State of the single-note surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteDetailViewState {
    pub note: Option<Note>,
    pub is_update_pending: Option<bool>,
}
