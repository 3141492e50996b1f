//! Transport abstraction and the production HTTP implementation.
//!
//! A [`Transport`] performs one blocking HTTP exchange at a time and reports
//! which of the two historical transport kinds it is; the kind matters only
//! for request-method selection in the dispatcher. Production code has
//! exactly one implementation, [`HttpTransport`], backed by a blocking
//! `ureq` agent.

use std::time::Duration;

use ureq::Agent;

use crate::version::USER_AGENT;

/// Content type for all POST dispatches.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Which of the two equivalent transport implementations backs a slot.
///
/// `Legacy` survives only as a capability value: GET-mode dispatch applies
/// to legacy transports alone, and no production transport reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    #[default]
    Standard,
    Legacy,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Legacy => "legacy",
        }
    }
}

/// Failure inside a transport or its factory.
///
/// Converted to [`Error`](crate::Error) at the pool and dispatcher
/// boundaries, where the slot context is known.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A handle capable of one blocking HTTP exchange at a time.
pub trait Transport: Send + Sync {
    /// The kind recorded on the slot when this transport is constructed.
    fn kind(&self) -> TransportKind;

    /// Blocking GET; the response body is returned as text.
    fn get(&self, url: &str) -> Result<String, TransportError>;

    /// Blocking POST with an `application/x-www-form-urlencoded` body.
    fn post_form(&self, url: &str, body: &str) -> Result<String, TransportError>;
}

/// Constructs transports for pool slots on first use.
pub trait TransportFactory: Send + Sync {
    /// Build a transport for `slot`. Failures surface as
    /// [`Error::TransportUnavailable`](crate::Error::TransportUnavailable)
    /// and the slot is freed again.
    fn create(&self, slot: usize) -> Result<Box<dyn Transport>, TransportError>;
}

/// Production transport over a blocking [`ureq::Agent`].
///
/// Non-2xx statuses are not treated as failures: the body is read and
/// returned like any other response. Only network-level problems (connect,
/// timeout, TLS, read) become [`TransportError`]s. A hung exchange blocks
/// the calling thread unless a timeout was configured.
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    fn read_text(mut response: ureq::http::Response<ureq::Body>) -> Result<String, TransportError> {
        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(e.to_string()))?;
        tracing::trace!(
            status = status.as_u16(),
            bytes = text.len(),
            "response received"
        );
        Ok(text)
    }
}

impl Transport for HttpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Standard
    }

    fn get(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| TransportError::new(e.to_string()))?;
        Self::read_text(response)
    }

    fn post_form(&self, url: &str, body: &str) -> Result<String, TransportError> {
        let response = self
            .agent
            .post(url)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .header("User-Agent", USER_AGENT)
            .send(body)
            .map_err(|e| TransportError::new(e.to_string()))?;
        Self::read_text(response)
    }
}

/// Factory producing [`HttpTransport`]s with the configured timeout.
pub struct HttpTransportFactory {
    timeout: Option<Duration>,
}

impl HttpTransportFactory {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self, slot: usize) -> Result<Box<dyn Transport>, TransportError> {
        tracing::debug!(slot, timeout = ?self.timeout, "constructing http transport");
        Ok(Box::new(HttpTransport::new(self.timeout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn kind_strings() {
        assert_eq!(TransportKind::Standard.as_str(), "standard");
        assert_eq!(TransportKind::Legacy.as_str(), "legacy");
        assert_eq!(TransportKind::default(), TransportKind::Standard);
    }

    #[test]
    fn factory_produces_standard_transports() {
        let transport = HttpTransportFactory::new(None).create(1).unwrap();
        assert_eq!(transport.kind(), TransportKind::Standard);
    }

    #[tokio::test]
    async fn get_returns_body_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None);
        let body = transport.get(&format!("{}/data", server.uri())).unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn post_form_sends_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/svc"))
            .and(header("content-type", FORM_CONTENT_TYPE))
            .and(header("user-agent", USER_AGENT))
            .and(body_string("a=1&b=2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None);
        let body = transport
            .post_form(&format!("{}/svc", server.uri()), "a=1&b=2")
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn non_2xx_body_is_returned_not_errored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/svc"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None);
        let body = transport
            .post_form(&format!("{}/svc", server.uri()), "")
            .unwrap();
        assert_eq!(body, "boom");
    }

    #[test]
    fn connection_refused_is_an_error() {
        // Port 9 (discard) is unbound in the test environment.
        let transport = HttpTransport::new(Some(Duration::from_millis(200)));
        let err = transport.get("http://127.0.0.1:9/none").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
