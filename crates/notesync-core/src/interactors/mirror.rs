//! Detached network writes that follow a successful cache mutation.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::data::{safe_api_call, CallResult, NoteNetworkStore};
use crate::error::Result;

/// Spawns network writes without joining them back into the caller.
///
/// Propagation is at-least-once: a failed mirror is only logged, and the next
/// sync pass reconciles whatever it missed. Handles are kept so a caller that
/// is about to exit can [`flush`](Self::flush); dropping the mirror leaves
/// spawned writes running.
#[derive(Clone)]
pub struct NetworkMirror {
    network: Arc<dyn NoteNetworkStore>,
    deadline: Duration,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl NetworkMirror {
    pub fn new(network: Arc<dyn NoteNetworkStore>, deadline: Duration) -> Self {
        Self {
            network,
            deadline,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Spawn `call` against the network store under the network deadline.
    pub fn spawn<F, Fut>(&self, label: &'static str, call: F)
    where
        F: FnOnce(Arc<dyn NoteNetworkStore>) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let write = call(Arc::clone(&self.network));
        let deadline = self.deadline;
        let handle = tokio::spawn(async move {
            match safe_api_call(deadline, write).await {
                CallResult::Success(()) => tracing::debug!(label, "network mirror applied"),
                failure => tracing::warn!(
                    label,
                    error = ?failure.error_message(),
                    "network mirror failed"
                ),
            }
        });

        let mut pending = self.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    /// Number of mirrors spawned but not yet observed as finished.
    pub fn pending(&self) -> usize {
        self.lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Wait for every mirror spawned so far.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.lock());
        for handle in handles {
            if let Err(error) = handle.await {
                tracing::warn!(%error, "network mirror task aborted");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
