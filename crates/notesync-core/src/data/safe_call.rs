//! Deadline wrapper around store calls.
//!
//! This is the only place store errors are inspected: everything above it
//! consumes [`CallResult`]. No retries are attempted here.

use std::future::Future;
use std::time::Duration;

use super::result::{CallError, CallResult, StoreTier};
use crate::config::StoreConfig;
use crate::error::{Error, Result};

/// Deadlines applied to cache and network calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub cache: Duration,
    pub network: Duration,
}

impl From<&StoreConfig> for Deadlines {
    fn from(config: &StoreConfig) -> Self {
        Self {
            cache: config.cache_timeout(),
            network: config.network_timeout(),
        }
    }
}

impl Default for Deadlines {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

/// Run a cache call under `deadline`.
pub async fn safe_cache_call<T, F>(deadline: Duration, call: F) -> CallResult<T>
where
    F: Future<Output = Result<T>>,
{
    safe_call(StoreTier::Cache, deadline, call).await
}

/// Run a network call under `deadline`.
pub async fn safe_api_call<T, F>(deadline: Duration, call: F) -> CallResult<T>
where
    F: Future<Output = Result<T>>,
{
    safe_call(StoreTier::Network, deadline, call).await
}

async fn safe_call<T, F>(tier: StoreTier, deadline: Duration, call: F) -> CallResult<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(value)) => CallResult::Success(value),
        Ok(Err(error)) => {
            tracing::debug!(?tier, %error, "store call failed");
            classify(tier, &error)
        }
        Err(_) => {
            tracing::debug!(?tier, ?deadline, "store call timed out");
            CallResult::GenericError(CallError::timeout(tier))
        }
    }
}

fn classify<T>(tier: StoreTier, error: &Error) -> CallResult<T> {
    match tier {
        StoreTier::Network if error.is_transport() => CallResult::NetworkError,
        StoreTier::Network => CallResult::GenericError(CallError::unknown(
            tier,
            error.status_code(),
            &error.to_string(),
        )),
        StoreTier::Cache => {
            CallResult::GenericError(CallError::unknown(tier, None, &error.to_string()))
        }
    }
}
