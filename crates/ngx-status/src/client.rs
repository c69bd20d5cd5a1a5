//! Status client — fetches the raw `stub_status` page.

use std::time::Duration;

use bytes::Bytes;
use http::header::HeaderValue;
use http::{Request, Uri};
use http_body_util::Empty;
use tracing::debug;

use crate::error::{ConfigError, ScrapeError, ScrapeResult};
use crate::transport::{HyperTransport, Transport, WithUserAgent};

/// Where and how to fetch the status page. Validated once at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    endpoint: Uri,
    user_agent: HeaderValue,
    timeout: Duration,
}

impl ClientConfig {
    /// Validate and build a config.
    ///
    /// The endpoint must be an absolute `http://` URL with a host.
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let bad_endpoint = |reason: &str| ConfigError::Endpoint {
            url: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = endpoint.parse().map_err(|e: http::uri::InvalidUri| bad_endpoint(&e.to_string()))?;
        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => return Err(bad_endpoint(&format!("unsupported scheme {other:?}"))),
            None => return Err(bad_endpoint("missing scheme")),
        }
        if uri.host().is_none_or(str::is_empty) {
            return Err(bad_endpoint("missing host"));
        }

        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|_| ConfigError::UserAgent(user_agent.to_string()))?;

        Ok(Self {
            endpoint: uri,
            user_agent,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Fetches the status page over a reusable transport.
///
/// Every request goes through [`WithUserAgent`], so the identity header is
/// set no matter which transport sits underneath.
pub struct StatusClient {
    config: ClientConfig,
    transport: Box<dyn Transport>,
}

impl StatusClient {
    /// Build a client over a pooled plain-HTTP transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, HyperTransport::new())
    }

    /// Build a client over a custom transport.
    pub fn with_transport<T: Transport + 'static>(config: ClientConfig, transport: T) -> Self {
        let transport = WithUserAgent::new(transport, config.user_agent.clone());
        Self {
            config,
            transport: Box::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the page once and return the body untouched.
    ///
    /// HTTP status codes are not interpreted: a non-2xx response is returned
    /// like any other and left for the parser to reject.
    pub async fn fetch(&self) -> ScrapeResult<Bytes> {
        let mut req = Request::new(Empty::new());
        *req.uri_mut() = self.config.endpoint.clone();

        let resp = tokio::time::timeout(self.config.timeout, self.transport.send(req))
            .await
            .map_err(|_| ScrapeError::Timeout(self.config.timeout))??;

        if !resp.status().is_success() {
            debug!(status = %resp.status(), endpoint = %self.config.endpoint, "status endpoint returned non-2xx");
        }
        Ok(resp.into_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubTransport, PAGE};
    use http::StatusCode;

    fn config() -> ClientConfig {
        ClientConfig::new("http://127.0.0.1/status", "ngx-test/1.0", Duration::from_millis(200)).unwrap()
    }

    #[test]
    fn config_accepts_http_endpoint() {
        let config = ClientConfig::new("http://nginx.local:8080/basic_status", "ua", Duration::from_secs(3)).unwrap();
        assert_eq!(config.endpoint().host(), Some("nginx.local"));
        assert_eq!(config.endpoint().port_u16(), Some(8080));
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn config_rejects_bad_endpoints() {
        for url in ["", "not a url", "/status", "https://nginx/status", "ftp://nginx/status"] {
            let err = ClientConfig::new(url, "ua", Duration::from_secs(1)).unwrap_err();
            assert!(matches!(err, ConfigError::Endpoint { .. }), "{url:?} gave {err:?}");
        }
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let err = ClientConfig::new("http://nginx/status", "ua", Duration::ZERO).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));
    }

    #[test]
    fn config_rejects_header_breaking_user_agent() {
        let err = ClientConfig::new("http://nginx/status", "bad\nagent", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ConfigError::UserAgent(_)));
    }

    #[tokio::test]
    async fn fetch_returns_body_unmodified() {
        let stub = StubTransport::ok(PAGE);
        let client = StatusClient::with_transport(config(), stub.clone());

        let body = client.fetch().await.unwrap();
        assert_eq!(body.as_ref(), PAGE.as_bytes());
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_sends_identity_header_every_time() {
        let stub = StubTransport::ok(PAGE);
        let client = StatusClient::with_transport(config(), stub.clone());

        client.fetch().await.unwrap();
        client.fetch().await.unwrap();
        assert_eq!(
            stub.user_agents(),
            vec![Some("ngx-test/1.0".to_string()), Some("ngx-test/1.0".to_string())]
        );
    }

    #[tokio::test]
    async fn fetch_passes_non_2xx_body_through() {
        let stub = StubTransport::status(StatusCode::FORBIDDEN, "forbidden");
        let client = StatusClient::with_transport(config(), stub);

        let body = client.fetch().await.unwrap();
        assert_eq!(body.as_ref(), b"forbidden");
    }

    #[tokio::test]
    async fn fetch_connection_failure_is_network_error() {
        let client = StatusClient::with_transport(config(), StubTransport::refused());
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Network(_)));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn fetch_times_out() {
        let client = StatusClient::with_transport(config(), StubTransport::hang());
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout(t) if t == Duration::from_millis(200)));
        assert!(err.is_network());
    }
}
