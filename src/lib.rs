//! Blocking HTTP request dispatcher over a reusable transport slot pool.
//!
//! A [`Dispatcher`] owns a fixed table of transport slots. Each
//! [`dispatch`](Dispatcher::dispatch) call takes the first free slot,
//! performs one blocking POST (or GET, in the legacy configuration) through
//! the slot's cached transport, strips the BEL-delimited status prefix from
//! the response text, and frees the slot. Calls block their own thread; the
//! pool caps concurrent exchanges at capacity - 1.

mod config;
mod dispatcher;
mod error;
mod pool;
mod request;
mod transport;
mod version;

pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, ErrorHook, PAYLOAD_DELIMITER};
pub use error::{Error, Result};
pub use pool::{PoolSnapshot, SlotGuard, SlotPool, SlotStatus};
pub use request::FormRequest;
pub use transport::{
    FORM_CONTENT_TYPE, HttpTransport, HttpTransportFactory, Transport, TransportError,
    TransportFactory, TransportKind,
};
pub use version::{POSTLET_VERSION, USER_AGENT};
