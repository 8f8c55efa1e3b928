//! Job kinds for the note list and note detail surfaces.

use crate::state::StateEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteListStateEvent {
    InsertNewNote,
    DeleteNote,
    DeleteMultipleNotes,
    RestoreDeletedNote,
    SearchNotes,
    GetNumNotesInCache,
    /// Surface a ready-made message, e.g. a sync summary
    CreateStateMessage,
}

impl StateEvent for NoteListStateEvent {
    fn error_info(&self) -> String {
        match self {
            Self::InsertNewNote => "Error inserting new note.",
            Self::DeleteNote => "Error deleting note.",
            Self::DeleteMultipleNotes => "Error deleting the selected notes.",
            Self::RestoreDeletedNote => "Error restoring the deleted note.",
            Self::SearchNotes => "Error getting list of notes.",
            Self::GetNumNotesInCache => "Error getting the number of notes from the cache.",
            Self::CreateStateMessage => "Error creating a new state message.",
        }
        .to_string()
    }

    fn event_name(&self) -> &'static str {
        match self {
            Self::InsertNewNote => "InsertNewNoteEvent",
            Self::DeleteNote => "DeleteNoteEvent",
            Self::DeleteMultipleNotes => "DeleteMultipleNotesEvent",
            Self::RestoreDeletedNote => "RestoreDeletedNoteEvent",
            Self::SearchNotes => "SearchNotesEvent",
            Self::GetNumNotesInCache => "GetNumNotesInCacheEvent",
            Self::CreateStateMessage => "CreateStateMessageEvent",
        }
    }

    fn should_display_progress_bar(&self) -> bool {
        !matches!(self, Self::RestoreDeletedNote | Self::CreateStateMessage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteDetailStateEvent {
    UpdateNote,
    DeleteNote,
    CreateStateMessage,
}

impl StateEvent for NoteDetailStateEvent {
    fn error_info(&self) -> String {
        match self {
            Self::UpdateNote => "Error updating note.",
            Self::DeleteNote => "Error deleting note.",
            Self::CreateStateMessage => "Error creating a new state message.",
        }
        .to_string()
    }

    fn event_name(&self) -> &'static str {
        match self {
            Self::UpdateNote => "UpdateNoteEvent",
            Self::DeleteNote => "DeleteNoteEvent",
            Self::CreateStateMessage => "CreateStateMessageEvent",
        }
    }

    fn should_display_progress_bar(&self) -> bool {
        !matches!(self, Self::CreateStateMessage)
    }
}
