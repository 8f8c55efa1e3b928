use std::sync::Arc;
use std::time::Duration;

use super::NoteListViewState;
use crate::data::{handle_response, safe_cache_call, NoteCacheStore};
use crate::state::{DataState, MessageType, Response, StateEvent, UiComponentType};

pub const GET_NUM_NOTES_SUCCESS: &str = "Successfully retrieved the number of notes from the cache.";

#[derive(Clone)]
pub struct GetNumNotes {
    cache: Arc<dyn NoteCacheStore>,
    deadline: Duration,
}

impl GetNumNotes {
    pub fn new(cache: Arc<dyn NoteCacheStore>, deadline: Duration) -> Self {
        Self { cache, deadline }
    }

    pub async fn get_num_notes(
        &self,
        state_event: &dyn StateEvent,
    ) -> Option<DataState<NoteListViewState>> {
        let result = safe_cache_call(self.deadline, self.cache.get_num_notes()).await;

        handle_response(result, Some(state_event), |count| {
            Some(DataState::data(
                Some(Response::new(
                    GET_NUM_NOTES_SUCCESS,
                    UiComponentType::None,
                    MessageType::Success,
                )),
                Some(NoteListViewState {
                    num_notes_in_cache: Some(count),
                    ..NoteListViewState::default()
                }),
            ))
        })
    }
}
