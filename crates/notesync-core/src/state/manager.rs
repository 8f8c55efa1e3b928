//! In-flight tracking for state events.

use std::collections::HashMap;

use super::StateEvent;

/// Tracks which operation kinds currently have a job running.
///
/// Keys are event names; values record whether that job wants a progress
/// indicator.
#[derive(Debug, Default)]
pub struct StateEventManager {
    active: HashMap<&'static str, bool>,
}

impl StateEventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an event as in flight.
    pub fn add_state_event(&mut self, event: &dyn StateEvent) {
        self.active
            .insert(event.event_name(), event.should_display_progress_bar());
    }

    /// Clear the in-flight mark for an event name.
    pub fn remove_state_event(&mut self, event_name: &str) {
        self.active.remove(event_name);
    }

    pub fn is_state_event_active(&self, event: &dyn StateEvent) -> bool {
        self.active.contains_key(event.event_name())
    }

    pub fn should_display_progress_bar(&self) -> bool {
        self.active.values().any(|shows_progress| *shows_progress)
    }

    pub fn active_job_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.active.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
