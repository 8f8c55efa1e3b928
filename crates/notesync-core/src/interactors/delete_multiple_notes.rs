use std::sync::Arc;
use std::time::Duration;

use super::delete_note::mirror_delete;
use super::{NetworkMirror, NoteListViewState};
use crate::data::{safe_cache_call, CallResult, NoteCacheStore};
use crate::models::Note;
use crate::state::{DataState, MessageType, Response, StateEvent, UiComponentType};

pub const DELETE_NOTES_SUCCESS: &str = "Successfully deleted notes.";
pub const DELETE_NOTES_ERRORS: &str =
    "Not all the notes you selected were deleted. There was some errors.";
pub const DELETE_NOTES_YOU_MUST_SELECT: &str = "You haven't selected any notes to delete.";
pub const DELETE_NOTES_ARE_YOU_SURE: &str = "Are you sure you want to delete these?";

#[derive(Clone)]
pub struct DeleteMultipleNotes {
    cache: Arc<dyn NoteCacheStore>,
    mirror: NetworkMirror,
    deadline: Duration,
}

impl DeleteMultipleNotes {
    pub fn new(cache: Arc<dyn NoteCacheStore>, mirror: NetworkMirror, deadline: Duration) -> Self {
        Self {
            cache,
            mirror,
            deadline,
        }
    }

    /// Delete each note on its own. Any failure yields the aggregate error
    /// outcome, but every note that did leave the cache is still mirrored.
    pub async fn delete_notes(
        &self,
        notes: &[Note],
        state_event: &dyn StateEvent,
    ) -> Option<DataState<NoteListViewState>> {
        if notes.is_empty() {
            return Some(DataState::data(
                Some(Response::new(
                    DELETE_NOTES_YOU_MUST_SELECT,
                    UiComponentType::Toast,
                    MessageType::Info,
                )),
                None,
            ));
        }

        let mut deleted = Vec::with_capacity(notes.len());
        let mut had_error = false;
        for note in notes {
            match safe_cache_call(self.deadline, self.cache.delete_note(&note.id)).await {
                CallResult::Success(rows) if rows > 0 => deleted.push(note),
                CallResult::Success(_) => had_error = true,
                failure => {
                    tracing::debug!(
                        event = state_event.event_name(),
                        note = %note.id,
                        error = ?failure.error_message(),
                        "note not deleted"
                    );
                    had_error = true;
                }
            }
        }

        for note in deleted {
            mirror_delete(&self.mirror, note);
        }

        let response = if had_error {
            Response::new(
                DELETE_NOTES_ERRORS,
                UiComponentType::Dialog,
                MessageType::Error,
            )
        } else {
            Response::new(
                DELETE_NOTES_SUCCESS,
                UiComponentType::Toast,
                MessageType::Success,
            )
        };
        Some(DataState::data(Some(response), None))
    }
}

/// Confirmation prompt shown before a multi-delete.
pub fn confirm_delete_notes() -> Response {
    Response::new(
        DELETE_NOTES_ARE_YOU_SURE,
        UiComponentType::AreYouSureDialog,
        MessageType::Info,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{NoteFactory, FORCE_DELETES_NOTE_EXCEPTION};
    use crate::data::NoteNetworkStore;
    use crate::interactors::testing::fixture;
    use crate::interactors::NoteListStateEvent;
    use pretty_assertions::assert_eq;

    const EVENT: NoteListStateEvent = NoteListStateEvent::DeleteMultipleNotes;

    #[tokio::test(flavor = "multi_thread")]
    async fn all_deleted_reports_success() {
        let notes = NoteFactory::create_note_list("n", 4);
        let f = fixture(notes.clone());

        let outcome = f
            .list
            .delete_multiple_notes
            .delete_notes(&notes, &EVENT)
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some(DELETE_NOTES_SUCCESS));
        assert_eq!(f.cache.get_num_notes().await.unwrap(), 0);

        f.mirror.flush().await;
        assert_eq!(f.network.tombstones(), notes);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn partial_failure_keeps_successful_deletes() {
        let valid = NoteFactory::create_note_list("valid", 3);
        let mut selection = valid.clone();
        selection.push(NoteFactory::create_note("missing-1", "t", "", 1));
        selection.push(NoteFactory::create_note("missing-2", "t", "", 1));

        let f = fixture(valid.clone());
        for note in &valid {
            f.network.insert_or_update_note(note).await.unwrap();
        }

        let outcome = f
            .list
            .delete_multiple_notes
            .delete_notes(&selection, &EVENT)
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some(DELETE_NOTES_ERRORS));
        assert!(outcome.is_error());

        for note in &valid {
            assert_eq!(f.cache.search_note_by_id(&note.id).await.unwrap(), None);
        }

        f.mirror.flush().await;
        assert_eq!(f.network.tombstones(), valid);
        assert!(f.network.live_notes().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cache_fault_counts_as_failure() {
        let mut notes = NoteFactory::create_note_list("n", 2);
        notes.push(NoteFactory::create_note(FORCE_DELETES_NOTE_EXCEPTION, "t", "", 1));
        let f = fixture(notes.clone());

        let outcome = f
            .list
            .delete_multiple_notes
            .delete_notes(&notes, &EVENT)
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some(DELETE_NOTES_ERRORS));
        assert_eq!(f.cache.get_num_notes().await.unwrap(), 1);

        f.mirror.flush().await;
        assert_eq!(f.network.tombstones().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_selection_is_informational() {
        let f = fixture(Vec::new());

        let outcome = f
            .list
            .delete_multiple_notes
            .delete_notes(&[], &EVENT)
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some(DELETE_NOTES_YOU_MUST_SELECT));
        assert_eq!(outcome.message_type(), Some(MessageType::Info));
    }

    #[test]
    fn confirmation_uses_are_you_sure_dialog() {
        let response = confirm_delete_notes();
        assert_eq!(response.ui_component_type, UiComponentType::AreYouSureDialog);
    }
}
