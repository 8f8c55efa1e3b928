use std::sync::Arc;
use std::time::Duration;

use super::{NetworkMirror, NoteListViewState, NotePendingDelete};
use crate::data::{handle_response, safe_cache_call, CallResult, NoteCacheStore};
use crate::models::Note;
use crate::state::{DataState, MessageType, Response, StateEvent, UiComponentType};

pub const RESTORE_NOTE_SUCCESS: &str = "Successfully restored the deleted note.";
pub const RESTORE_NOTE_FAILED: &str = "Failed to restore the deleted note.";

/// Undo for a delete: put the note back and retract its tombstone.
#[derive(Clone)]
pub struct RestoreDeletedNote {
    cache: Arc<dyn NoteCacheStore>,
    mirror: NetworkMirror,
    deadline: Duration,
}

impl RestoreDeletedNote {
    pub fn new(cache: Arc<dyn NoteCacheStore>, mirror: NetworkMirror, deadline: Duration) -> Self {
        Self {
            cache,
            mirror,
            deadline,
        }
    }

    /// The restored copy gets a fresh `updated_at` so it wins the next sync
    /// against any stale remote copy.
    pub async fn restore_deleted_note(
        &self,
        note: &Note,
        state_event: &dyn StateEvent,
    ) -> Option<DataState<NoteListViewState>> {
        let restored = note.touched();
        let result = safe_cache_call(self.deadline, self.cache.insert_note(&restored)).await;
        let inserted = matches!(&result, CallResult::Success(rows) if *rows > 0);

        let outcome = handle_response(result, Some(state_event), |rows| {
            Some(if rows > 0 {
                DataState::data(
                    Some(Response::new(
                        RESTORE_NOTE_SUCCESS,
                        UiComponentType::Toast,
                        MessageType::Success,
                    )),
                    Some(NoteListViewState {
                        note_pending_delete: Some(NotePendingDelete {
                            note: Some(restored.clone()),
                            list_position: None,
                        }),
                        ..NoteListViewState::default()
                    }),
                )
            } else {
                DataState::data(
                    Some(Response::new(
                        RESTORE_NOTE_FAILED,
                        UiComponentType::Toast,
                        MessageType::Error,
                    )),
                    None,
                )
            })
        });

        if inserted {
            let live = restored.clone();
            self.mirror.spawn("restore note", move |network| async move {
                network.insert_or_update_note(&live).await
            });
            self.mirror.spawn("retract tombstone", move |network| async move {
                network.delete_deleted_note(&restored).await
            });
        }
        outcome
    }
}
