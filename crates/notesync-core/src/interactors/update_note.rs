use std::sync::Arc;
use std::time::Duration;

use super::{NetworkMirror, NoteDetailViewState};
use crate::data::{handle_response, safe_cache_call, CallResult, NoteCacheStore};
use crate::models::{normalize_title, Note};
use crate::state::{DataState, MessageType, Response, StateEvent, UiComponentType};

pub const UPDATE_NOTE_SUCCESS: &str = "Successfully updated note.";
pub const UPDATE_NOTE_FAILED: &str = "Failed to update note.";
pub const UPDATE_NOTE_EMPTY_TITLE: &str = "A note needs a title.";

#[derive(Clone)]
pub struct UpdateNote {
    cache: Arc<dyn NoteCacheStore>,
    mirror: NetworkMirror,
    deadline: Duration,
}

impl UpdateNote {
    pub fn new(cache: Arc<dyn NoteCacheStore>, mirror: NetworkMirror, deadline: Duration) -> Self {
        Self {
            cache,
            mirror,
            deadline,
        }
    }

    /// Replace title and body of `note`; the edited copy is mirrored on success.
    pub async fn update_note(
        &self,
        note: &Note,
        title: &str,
        body: &str,
        state_event: &dyn StateEvent,
    ) -> Option<DataState<NoteDetailViewState>> {
        let Some(title) = normalize_title(title) else {
            return Some(DataState::error(Response::new(
                UPDATE_NOTE_EMPTY_TITLE,
                UiComponentType::Toast,
                MessageType::Error,
            )));
        };
        let edited = note.edited(title, body);

        let result = safe_cache_call(
            self.deadline,
            self.cache.update_note(
                &edited.id,
                &edited.title,
                &edited.body,
                Some(edited.updated_at),
            ),
        )
        .await;
        let updated = matches!(&result, CallResult::Success(rows) if *rows > 0);

        let outcome = handle_response(result, Some(state_event), |rows| {
            Some(if rows > 0 {
                DataState::data(
                    Some(Response::new(
                        UPDATE_NOTE_SUCCESS,
                        UiComponentType::Toast,
                        MessageType::Success,
                    )),
                    Some(NoteDetailViewState {
                        note: Some(edited.clone()),
                        is_update_pending: Some(false),
                    }),
                )
            } else {
                DataState::data(
                    Some(Response::new(
                        UPDATE_NOTE_FAILED,
                        UiComponentType::Toast,
                        MessageType::Error,
                    )),
                    None,
                )
            })
        });

        if updated {
            self.mirror.spawn("update note", move |network| async move {
                network.insert_or_update_note(&edited).await
            });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{NoteFactory, FORCE_UPDATE_NOTE_EXCEPTION};
    use crate::interactors::testing::fixture;
    use crate::interactors::NoteDetailStateEvent;
    use pretty_assertions::assert_eq;

    const EVENT: NoteDetailStateEvent = NoteDetailStateEvent::UpdateNote;

    #[tokio::test(flavor = "multi_thread")]
    async fn updates_cache_and_mirrors_edit() {
        let original = NoteFactory::create_note("a", "old", "old body", NoteFactory::BASE_TIME);
        let f = fixture(vec![original.clone()]);

        let outcome = f
            .detail
            .update_note
            .update_note(&original, "new", "new body", &EVENT)
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some(UPDATE_NOTE_SUCCESS));

        let cached = f.cache.search_note_by_id(&original.id).await.unwrap().unwrap();
        assert_eq!(cached.title, "new");
        assert_eq!(cached.body, "new body");
        assert_eq!(cached.created_at, original.created_at);
        assert!(cached.updated_at > original.updated_at);
        assert_eq!(outcome.data.unwrap().note, Some(cached));

        f.mirror.flush().await;
        let remote = f.network.live_notes();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].title, "new");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_note_reports_failure() {
        let f = fixture(Vec::new());
        let ghost = NoteFactory::create_note("ghost", "t", "", 1);

        let outcome = f
            .detail
            .update_note
            .update_note(&ghost, "title", "", &EVENT)
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some(UPDATE_NOTE_FAILED));
        assert!(outcome.is_error());

        f.mirror.flush().await;
        assert!(f.network.live_notes().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cache_fault_is_reported_with_reason() {
        let forced = NoteFactory::create_note(FORCE_UPDATE_NOTE_EXCEPTION, "t", "", 1);
        let f = fixture(vec![forced.clone()]);

        let outcome = f
            .detail
            .update_note
            .update_note(&forced, "title", "", &EVENT)
            .await
            .unwrap();
        assert!(outcome
            .message()
            .unwrap()
            .contains("Something went wrong updating the note."));

        f.mirror.flush().await;
        assert!(f.network.live_notes().is_empty());
    }
}
