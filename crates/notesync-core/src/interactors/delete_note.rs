use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::NetworkMirror;
use crate::data::{handle_response, safe_cache_call, CallResult, NoteCacheStore};
use crate::models::Note;
use crate::state::{DataState, MessageType, Response, StateEvent, UiComponentType};

pub const DELETE_NOTE_SUCCESS: &str = "Successfully deleted note.";
pub const DELETE_NOTE_FAILED: &str = "Failed to delete note.";

/// Single-note delete, shared by every surface that shows a note.
pub struct DeleteNote<V> {
    cache: Arc<dyn NoteCacheStore>,
    mirror: NetworkMirror,
    deadline: Duration,
    _view: PhantomData<fn() -> V>,
}

impl<V> Clone for DeleteNote<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            mirror: self.mirror.clone(),
            deadline: self.deadline,
            _view: PhantomData,
        }
    }
}

impl<V> DeleteNote<V> {
    pub fn new(cache: Arc<dyn NoteCacheStore>, mirror: NetworkMirror, deadline: Duration) -> Self {
        Self {
            cache,
            mirror,
            deadline,
            _view: PhantomData,
        }
    }

    /// Remove `note` from the cache. On success the network loses the live
    /// copy and gains a tombstone; the two writes are independent.
    pub async fn delete_note(
        &self,
        note: &Note,
        state_event: &dyn StateEvent,
    ) -> Option<DataState<V>> {
        let result = safe_cache_call(self.deadline, self.cache.delete_note(&note.id)).await;
        let deleted = matches!(&result, CallResult::Success(rows) if *rows > 0);

        let outcome = handle_response(result, Some(state_event), |rows| {
            Some(if rows > 0 {
                DataState::data(
                    Some(Response::new(
                        DELETE_NOTE_SUCCESS,
                        UiComponentType::None,
                        MessageType::Success,
                    )),
                    None,
                )
            } else {
                DataState::data(
                    Some(Response::new(
                        DELETE_NOTE_FAILED,
                        UiComponentType::Toast,
                        MessageType::Error,
                    )),
                    None,
                )
            })
        });

        if deleted {
            mirror_delete(&self.mirror, note);
        }
        outcome
    }
}

/// Drop the live copy and record a tombstone, as two detached writes.
pub(super) fn mirror_delete(mirror: &NetworkMirror, note: &Note) {
    let id = note.id.clone();
    mirror.spawn("delete note", move |network| async move {
        network.delete_note(&id).await
    });
    let tombstone = note.clone();
    mirror.spawn("record tombstone", move |network| async move {
        network.insert_deleted_note(&tombstone).await
    });
}
