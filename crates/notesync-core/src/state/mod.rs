//! Outcome types delivered to the presentation layer.
//!
//! Every interactor call yields at most one [`DataState`]: an optional
//! user-facing [`StateMessage`] plus an optional view-state payload.

mod coordinator;
mod event;
mod manager;

pub use coordinator::JobCoordinator;
pub use event::StateEvent;
pub use manager::StateEventManager;

/// Unified sync state used by front-ends to show connectivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Offline,
    Syncing,
    Synced,
    Error,
}

/// How a message should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiComponentType {
    Toast,
    Dialog,
    AreYouSureDialog,
    SnackBar,
    None,
}

/// Severity of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
    Info,
    None,
}

/// A user-facing message with its presentation hints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub message: String,
    pub ui_component_type: UiComponentType,
    pub message_type: MessageType,
}

impl Response {
    pub fn new(
        message: impl Into<String>,
        ui_component_type: UiComponentType,
        message_type: MessageType,
    ) -> Self {
        Self {
            message: message.into(),
            ui_component_type,
            message_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateMessage {
    pub response: Response,
}

/// One outcome event: a message, a data payload, or both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataState<V> {
    pub state_message: Option<StateMessage>,
    pub data: Option<V>,
}

impl<V> DataState<V> {
    /// Successful outcome, optionally carrying a message and/or data.
    pub fn data(response: Option<Response>, data: Option<V>) -> Self {
        Self {
            state_message: response.map(|response| StateMessage { response }),
            data,
        }
    }

    /// Failed outcome carrying only a message.
    pub fn error(response: Response) -> Self {
        Self {
            state_message: Some(StateMessage { response }),
            data: None,
        }
    }

    /// Message text, if any.
    pub fn message(&self) -> Option<&str> {
        self.state_message
            .as_ref()
            .map(|message| message.response.message.as_str())
    }

    /// Severity of the attached message, if any.
    pub fn message_type(&self) -> Option<MessageType> {
        self.state_message
            .as_ref()
            .map(|message| message.response.message_type)
    }

    /// Whether the attached message reports an error.
    pub fn is_error(&self) -> bool {
        self.message_type() == Some(MessageType::Error)
    }
}
