//! Job dispatch and outcome delivery for one UI surface.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{DataState, StateEvent, StateEventManager};

/// Launches interactor jobs and funnels their outcomes into one channel.
///
/// The outcome channel is unbounded so producers never drop or block; a
/// receiver that has gone away simply causes outcomes to be discarded. Jobs
/// that are already running are not cancelled when that happens.
pub struct JobCoordinator<V> {
    sender: mpsc::UnboundedSender<DataState<V>>,
    events: Arc<Mutex<StateEventManager>>,
}

impl<V> Clone for JobCoordinator<V> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            events: Arc::clone(&self.events),
        }
    }
}

impl<V: Send + 'static> JobCoordinator<V> {
    /// Create a coordinator and the receiving end of its outcome channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DataState<V>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let coordinator = Self {
            sender,
            events: Arc::new(Mutex::new(StateEventManager::new())),
        };
        (coordinator, receiver)
    }

    /// Run `job` for `event` unless a job of the same kind is in flight.
    ///
    /// Returns `None` when the launch was refused.
    pub fn launch_job<F>(&self, event: &dyn StateEvent, job: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = Option<DataState<V>>> + Send + 'static,
    {
        let event_name = event.event_name();
        {
            let mut events = lock(&self.events);
            if events.is_state_event_active(event) {
                tracing::debug!(event = event_name, "job already active, ignoring launch");
                return None;
            }
            events.add_state_event(event);
        }

        tracing::debug!(event = event_name, "launching job");
        let sender = self.sender.clone();
        let guard = InFlightGuard {
            events: Arc::clone(&self.events),
            event_name,
        };

        Some(tokio::spawn(async move {
            let _guard = guard;
            if let Some(outcome) = job.await {
                if sender.send(outcome).is_err() {
                    tracing::debug!(event = event_name, "outcome receiver closed, discarding");
                }
            }
        }))
    }

    pub fn is_job_active(&self, event: &dyn StateEvent) -> bool {
        lock(&self.events).is_state_event_active(event)
    }

    pub fn should_display_progress_bar(&self) -> bool {
        lock(&self.events).should_display_progress_bar()
    }

    pub fn active_job_names(&self) -> Vec<&'static str> {
        lock(&self.events).active_job_names()
    }

    /// Forget every in-flight mark, e.g. when the surface is rebuilt.
    pub fn clear_active_jobs(&self) {
        lock(&self.events).clear();
    }
}

/// Clears the in-flight mark when the job future finishes or unwinds.
struct InFlightGuard {
    events: Arc<Mutex<StateEventManager>>,
    event_name: &'static str,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.events).remove_state_event(self.event_name);
    }
}

fn lock(events: &Mutex<StateEventManager>) -> MutexGuard<'_, StateEventManager> {
    events.lock().unwrap_or_else(PoisonError::into_inner)
}
