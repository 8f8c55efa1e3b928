use std::sync::Arc;
use std::time::Duration;

use super::NoteListViewState;
use crate::data::{handle_response, safe_cache_call, NoteCacheStore};
use crate::models::NoteOrder;
use crate::state::{DataState, MessageType, Response, StateEvent, UiComponentType};

pub const SEARCH_NOTES_SUCCESS: &str = "Successfully retrieved list of notes.";
pub const SEARCH_NOTES_NO_MATCHING_RESULTS: &str = "There are no notes that match that query.";

#[derive(Clone)]
pub struct SearchNotes {
    cache: Arc<dyn NoteCacheStore>,
    deadline: Duration,
}

impl SearchNotes {
    pub fn new(cache: Arc<dyn NoteCacheStore>, deadline: Duration) -> Self {
        Self { cache, deadline }
    }

    /// Cumulative search: page `n` returns up to `n` pages of matches.
    /// Pages below 1 are treated as 1.
    pub async fn search_notes(
        &self,
        query: &str,
        order: NoteOrder,
        page: i64,
        state_event: &dyn StateEvent,
    ) -> Option<DataState<NoteListViewState>> {
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        let result =
            safe_cache_call(self.deadline, self.cache.search_notes(query, order, page)).await;

        handle_response(result, Some(state_event), |notes| {
            let response = if notes.is_empty() {
                Response::new(
                    SEARCH_NOTES_NO_MATCHING_RESULTS,
                    UiComponentType::Toast,
                    MessageType::Success,
                )
            } else {
                Response::new(
                    SEARCH_NOTES_SUCCESS,
                    UiComponentType::None,
                    MessageType::Success,
                )
            };
            Some(DataState::data(
                Some(response),
                Some(NoteListViewState {
                    note_list: Some(notes),
                    search_query: Some(query.to_string()),
                    page: Some(page),
                    order: Some(order),
                    ..NoteListViewState::default()
                }),
            ))
        })
    }
}
