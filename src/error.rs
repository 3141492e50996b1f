//! Error types for the dispatcher and its slot pool.

use thiserror::Error;

/// Errors surfaced by [`Dispatcher::dispatch`](crate::Dispatcher::dispatch)
/// and the slot pool operations behind it.
#[derive(Debug, Error)]
pub enum Error {
    /// Every usable slot is `InUse`. Retry once an in-flight exchange
    /// completes, or construct the dispatcher with a larger capacity.
    #[error("transport pool exhausted ({capacity} slots, none free)")]
    PoolExhausted { capacity: usize },

    /// The factory could not produce a transport for the chosen slot.
    /// The slot is freed again before this is returned.
    #[error("no transport available for slot {slot}: {reason}")]
    TransportUnavailable { slot: usize, reason: String },

    /// The transport failed mid-exchange. `dispatch` reports this through
    /// the error hook and log, then returns an empty response instead of
    /// propagating it.
    #[error("request failed on slot {slot}: {reason}")]
    RequestFailed { slot: usize, reason: String },

    /// A raw release named a handle outside the pool range. No slot state
    /// was changed.
    #[error("invalid handle {handle} for pool of capacity {capacity}")]
    InvalidHandle { handle: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
