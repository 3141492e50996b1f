//! Dispatcher configuration.

use std::time::Duration;

/// Configuration for a [`Dispatcher`](crate::Dispatcher), fixed at
/// construction time.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Slot count for the transport pool, including the reserved slot 0.
    pub pool_capacity: usize,
    /// Dispatch GET requests (whole request string as URL) on slots backed
    /// by a legacy-kind transport. Standard transports always POST.
    pub use_get_method: bool,
    /// Global timeout applied to every exchange. `None` blocks the calling
    /// thread until the transport gives up on its own.
    pub request_timeout: Option<Duration>,
}

const DEFAULT_POOL_CAPACITY: usize = 8;

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            use_get_method: false,
            request_timeout: None,
        }
    }
}

impl DispatcherConfig {
    /// Defaults overridden by `POSTLET_POOL_CAPACITY`,
    /// `POSTLET_USE_GET_METHOD` and `POSTLET_REQUEST_TIMEOUT` (seconds,
    /// fractional accepted). Malformed values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("POSTLET_POOL_CAPACITY")
            && let Some(capacity) = parse_capacity(&value)
        {
            config.pool_capacity = capacity;
        }
        if let Ok(value) = std::env::var("POSTLET_USE_GET_METHOD") {
            config.use_get_method = parse_flag(&value);
        }
        if let Ok(value) = std::env::var("POSTLET_REQUEST_TIMEOUT")
            && let Some(timeout) = parse_seconds(&value)
        {
            config.request_timeout = Some(timeout);
        }

        config
    }
}

fn parse_capacity(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn parse_seconds(value: &str) -> Option<Duration> {
    let seconds = value.trim().parse::<f64>().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_millis((seconds * 1000.0) as u64))
}
