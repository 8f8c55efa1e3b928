//! Result envelope returned by every cache and network call.

pub const CACHE_ERROR_UNKNOWN: &str = "Cache error unknown";
pub const CACHE_ERROR_TIMEOUT: &str = "Cache error timeout";
pub const CACHE_DATA_NULL: &str = "Cache data null";

pub const NETWORK_ERROR: &str = "Network error";
pub const NETWORK_ERROR_UNKNOWN: &str = "Unknown network error";
pub const NETWORK_ERROR_TIMEOUT: &str = "Network timeout";
pub const NETWORK_DATA_NULL: &str = "Network data null";

/// HTTP-style status attached to network timeouts.
pub const TIMEOUT_STATUS_CODE: u16 = 408;

/// Which store a call went to. Only affects error wording and whether
/// transport failures are reported as [`CallResult::NetworkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTier {
    Cache,
    Network,
}

impl StoreTier {
    pub const fn unknown_message(self) -> &'static str {
        match self {
            Self::Cache => CACHE_ERROR_UNKNOWN,
            Self::Network => NETWORK_ERROR_UNKNOWN,
        }
    }

    pub const fn timeout_message(self) -> &'static str {
        match self {
            Self::Cache => CACHE_ERROR_TIMEOUT,
            Self::Network => NETWORK_ERROR_TIMEOUT,
        }
    }

    pub const fn data_null_message(self) -> &'static str {
        match self {
            Self::Cache => CACHE_DATA_NULL,
            Self::Network => NETWORK_DATA_NULL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call did not finish before its deadline
    Timeout,
    /// The call finished without the value the caller required
    DataNull,
    /// Any other failure raised by the store
    Unknown,
}

/// Classification of a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError {
    pub kind: ErrorKind,
    pub code: Option<u16>,
    pub message: String,
}

impl CallError {
    pub fn timeout(tier: StoreTier) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            code: (tier == StoreTier::Network).then_some(TIMEOUT_STATUS_CODE),
            message: tier.timeout_message().to_string(),
        }
    }

    pub fn data_null(tier: StoreTier) -> Self {
        Self {
            kind: ErrorKind::DataNull,
            code: None,
            message: tier.data_null_message().to_string(),
        }
    }

    /// Unknown failure; the original error text is kept for diagnostics.
    pub fn unknown(tier: StoreTier, code: Option<u16>, detail: &str) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            code,
            message: format!("{}: {detail}", tier.unknown_message()),
        }
    }
}

/// Success value or failure classification of one store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult<T> {
    Success(T),
    GenericError(CallError),
    /// The remote store could not be reached (network calls only)
    NetworkError,
}

impl<T> CallResult<T> {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::GenericError(_) | Self::NetworkError => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallResult<U> {
        match self {
            Self::Success(value) => CallResult::Success(f(value)),
            Self::GenericError(error) => CallResult::GenericError(error),
            Self::NetworkError => CallResult::NetworkError,
        }
    }

    /// Success value, or the failure re-typed for a caller with another payload.
    pub fn split<U>(self) -> Result<T, CallResult<U>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::GenericError(error) => Err(CallResult::GenericError(error)),
            Self::NetworkError => Err(CallResult::NetworkError),
        }
    }

    /// Human-readable failure reason, `None` on success.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::GenericError(error) => Some(&error.message),
            Self::NetworkError => Some(NETWORK_ERROR),
        }
    }
}

impl<T> CallResult<Option<T>> {
    /// Treat an absent payload as a failure rather than valid data.
    pub fn require(self, tier: StoreTier) -> CallResult<T> {
        match self {
            Self::Success(Some(value)) => CallResult::Success(value),
            Self::Success(None) => CallResult::GenericError(CallError::data_null(tier)),
            Self::GenericError(error) => CallResult::GenericError(error),
            Self::NetworkError => CallResult::NetworkError,
        }
    }
}
