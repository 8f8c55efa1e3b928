use std::sync::Arc;
use std::time::Duration;

use super::{NetworkMirror, NoteListViewState};
use crate::data::{handle_response, safe_cache_call, CallResult, NoteCacheStore};
use crate::models::{normalize_title, Note, NoteId};
use crate::state::{DataState, MessageType, Response, StateEvent, UiComponentType};

pub const INSERT_NOTE_SUCCESS: &str = "Successfully inserted new note.";
pub const INSERT_NOTE_FAILED: &str = "Failed to insert new note.";
pub const INSERT_NOTE_EMPTY_TITLE: &str = "A note needs a title.";

#[derive(Clone)]
pub struct InsertNewNote {
    cache: Arc<dyn NoteCacheStore>,
    mirror: NetworkMirror,
    deadline: Duration,
}

impl InsertNewNote {
    pub fn new(cache: Arc<dyn NoteCacheStore>, mirror: NetworkMirror, deadline: Duration) -> Self {
        Self {
            cache,
            mirror,
            deadline,
        }
    }

    /// Create a note in the cache, then mirror it to the network.
    ///
    /// `id` lets a caller pick the id up front; a fresh one is generated otherwise.
    pub async fn insert_new_note(
        &self,
        id: Option<NoteId>,
        title: &str,
        body: &str,
        state_event: &dyn StateEvent,
    ) -> Option<DataState<NoteListViewState>> {
        let Some(title) = normalize_title(title) else {
            return Some(DataState::error(Response::new(
                INSERT_NOTE_EMPTY_TITLE,
                UiComponentType::Toast,
                MessageType::Error,
            )));
        };
        let note = match id {
            Some(id) => Note::with_id(id, title, body),
            None => Note::new(title, body),
        };

        let result = safe_cache_call(self.deadline, self.cache.insert_note(&note)).await;
        let inserted = matches!(&result, CallResult::Success(rows) if *rows > 0);

        let outcome = handle_response(result, Some(state_event), |rows| {
            Some(if rows > 0 {
                DataState::data(
                    Some(Response::new(
                        INSERT_NOTE_SUCCESS,
                        UiComponentType::Toast,
                        MessageType::Success,
                    )),
                    Some(NoteListViewState {
                        new_note: Some(note.clone()),
                        ..NoteListViewState::default()
                    }),
                )
            } else {
                DataState::data(
                    Some(Response::new(
                        INSERT_NOTE_FAILED,
                        UiComponentType::Toast,
                        MessageType::Error,
                    )),
                    None,
                )
            })
        });

        if inserted {
            self.mirror.spawn("insert note", move |network| async move {
                network.insert_or_update_note(&note).await
            });
        }
        outcome
    }
}
