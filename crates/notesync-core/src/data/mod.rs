//! Store contracts and the call envelope every store call goes through.

mod cache;
mod handler;
pub mod memory;
mod network;
mod result;
mod safe_call;

pub use cache::NoteCacheStore;
pub use handler::handle_response;
pub use network::{check_batch_size, NoteNetworkStore, MAX_BATCH_SIZE};
pub use result::{
    CallError, CallResult, ErrorKind, StoreTier, CACHE_DATA_NULL, CACHE_ERROR_TIMEOUT,
    CACHE_ERROR_UNKNOWN, NETWORK_DATA_NULL, NETWORK_ERROR, NETWORK_ERROR_TIMEOUT,
    NETWORK_ERROR_UNKNOWN, TIMEOUT_STATUS_CODE,
};
pub use safe_call::{safe_api_call, safe_cache_call, Deadlines};
