//! Turns call results into user-facing outcomes.

use super::result::{CallResult, NETWORK_ERROR};
use crate::state::{DataState, MessageType, Response, StateEvent, UiComponentType};

/// Convert `result` into an outcome.
///
/// Failures become an error dialog prefixed with the event's error info;
/// successes are handed to `on_success`, which may decide to emit nothing.
pub fn handle_response<T, V>(
    result: CallResult<T>,
    state_event: Option<&dyn StateEvent>,
    on_success: impl FnOnce(T) -> Option<DataState<V>>,
) -> Option<DataState<V>> {
    match result {
        CallResult::Success(value) => on_success(value),
        CallResult::GenericError(error) => Some(failure(state_event, &error.message)),
        CallResult::NetworkError => Some(failure(state_event, NETWORK_ERROR)),
    }
}

fn failure<V>(state_event: Option<&dyn StateEvent>, reason: &str) -> DataState<V> {
    let message = match state_event {
        Some(event) => format!("{}\n\nReason: {reason}", event.error_info()),
        None => format!("Reason: {reason}"),
    };
    DataState::error(Response::new(
        message,
        UiComponentType::Dialog,
        MessageType::Error,
    ))
}
