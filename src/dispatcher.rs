//! Request dispatcher: allocate a slot, run one blocking exchange, strip
//! the status prefix from the response, release the slot.

use crate::config::DispatcherConfig;
use crate::error::{Error, Result};
use crate::pool::{PoolSnapshot, SlotGuard, SlotPool};
use crate::transport::{
    HttpTransportFactory, Transport, TransportError, TransportFactory, TransportKind,
};

/// Callback receiving every failure the dispatcher observes, in addition to
/// the structured log. Replaces the blocking alert dialog of the legacy
/// client environment.
pub type ErrorHook = Box<dyn Fn(&Error) + Send + Sync>;

/// Marks the end of out-of-band data in a response: everything up to and
/// including the first occurrence is discarded before the payload is
/// returned.
pub const PAYLOAD_DELIMITER: char = '\x07';

/// Blocking HTTP request dispatcher over a fixed pool of transport slots.
///
/// `dispatch` blocks its calling thread for the duration of the exchange.
/// The pool bounds concurrent exchanges at `pool_capacity - 1`; the
/// dispatcher itself is `Send + Sync` and is shared across threads by
/// reference.
pub struct Dispatcher {
    config: DispatcherConfig,
    pool: SlotPool,
    error_hook: Option<ErrorHook>,
}

impl Dispatcher {
    /// Dispatcher backed by the production HTTP transport.
    pub fn new(config: DispatcherConfig) -> Self {
        let factory = Box::new(HttpTransportFactory::new(config.request_timeout));
        Self::with_factory(config, factory)
    }

    /// Dispatcher backed by a caller-provided transport factory.
    pub fn with_factory(config: DispatcherConfig, factory: Box<dyn TransportFactory>) -> Self {
        let pool = SlotPool::new(config.pool_capacity, factory);
        Self {
            config,
            pool,
            error_hook: None,
        }
    }

    /// Install a hook observing every failure, including the recovered
    /// `RequestFailed` kind.
    pub fn on_error(mut self, hook: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.error_hook = Some(Box::new(hook));
        self
    }

    /// The underlying slot pool.
    pub fn pool(&self) -> &SlotPool {
        &self.pool
    }

    /// Counts of slot states right now.
    pub fn pool_snapshot(&self) -> PoolSnapshot {
        self.pool.snapshot()
    }

    /// Perform one blocking request/response exchange.
    ///
    /// `request` is `"<url>?<urlencoded-body>"` or a bare URL; the dispatch
    /// POSTs the body part (empty when absent) to the URL part. In GET mode
    /// on a legacy-kind slot the whole string is fetched as the URL.
    ///
    /// Transport failures during the exchange are reported through the
    /// error hook and log, then recovered as `Ok("")`. Pool exhaustion and
    /// transport construction failures are returned as errors. The held
    /// slot is released in every case.
    pub fn dispatch(&self, request: &str) -> Result<String> {
        let guard = match self.pool.acquire() {
            Ok(guard) => guard,
            Err(error) => {
                tracing::error!(%error, "dispatch aborted");
                self.report(&error);
                return Err(error);
            }
        };

        match self.exchange(&guard, request) {
            Ok(response) => Ok(strip_status_prefix(response)),
            Err(cause) => {
                let error = Error::RequestFailed {
                    slot: guard.index(),
                    reason: cause.to_string(),
                };
                tracing::error!(%error, "exchange failed, returning empty response");
                self.report(&error);
                Ok(String::new())
            }
        }
    }

    fn exchange(
        &self,
        guard: &SlotGuard<'_>,
        request: &str,
    ) -> std::result::Result<String, TransportError> {
        if self.config.use_get_method && guard.kind() == TransportKind::Legacy {
            tracing::debug!(slot = guard.index(), url = request, "dispatching GET");
            return guard.transport().get(request);
        }

        let (url, body) = split_request(request);
        tracing::debug!(
            slot = guard.index(),
            url,
            body_bytes = body.map_or(0, str::len),
            "dispatching POST"
        );
        guard.transport().post_form(url, body.unwrap_or(""))
    }

    fn report(&self, error: &Error) {
        if let Some(hook) = &self.error_hook {
            hook(error);
        }
    }
}

/// Split a request string at the first `?` into URL and body parts. With no
/// `?` the body is absent.
fn split_request(request: &str) -> (&str, Option<&str>) {
    match request.split_once('?') {
        Some((url, body)) => (url, Some(body)),
        None => (request, None),
    }
}

/// Drop everything up to and including the first BEL byte; servers prefix
/// out-of-band status data before it.
fn strip_status_prefix(mut response: String) -> String {
    if let Some(position) = response.find(PAYLOAD_DELIMITER) {
        tracing::trace!(discarded = position + 1, "stripped status prefix");
        response.drain(..=position);
    }
    response
}
