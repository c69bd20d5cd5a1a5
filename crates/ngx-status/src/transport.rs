//! Outbound HTTP plumbing for the status client.
//!
//! A [`Transport`] sends one request and hands back the fully buffered
//! response. [`HyperTransport`] is the real pooled client;
//! [`WithUserAgent`] decorates any transport so every request carries the
//! configured identity header.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::header::{HeaderValue, USER_AGENT};
use http::{Request, Response};
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::trace;

use crate::error::{ScrapeError, ScrapeResult};

/// Boxed future returned by [`Transport::send`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Request type sent to the status endpoint.
pub type StatusRequest = Request<Empty<Bytes>>;

/// Sends a request and buffers the whole response body.
pub trait Transport: Send + Sync {
    fn send(&self, req: StatusRequest) -> BoxFuture<'_, ScrapeResult<Response<Bytes>>>;
}

/// Plain-HTTP transport backed by a pooled hyper client.
pub struct HyperTransport {
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn send(&self, req: StatusRequest) -> BoxFuture<'_, ScrapeResult<Response<Bytes>>> {
        Box::pin(async move {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| ScrapeError::Network(e.to_string()))?;

            let (parts, body) = resp.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| ScrapeError::Network(format!("reading body: {e}")))?
                .to_bytes();

            trace!(status = %parts.status, bytes = body.len(), "status response received");
            Ok(Response::from_parts(parts, body))
        })
    }
}

/// Sets `User-Agent` on every request before delegating to `inner`.
pub struct WithUserAgent<T> {
    inner: T,
    user_agent: HeaderValue,
}

impl<T: Transport> WithUserAgent<T> {
    pub fn new(inner: T, user_agent: HeaderValue) -> Self {
        Self { inner, user_agent }
    }
}

impl<T: Transport> Transport for WithUserAgent<T> {
    fn send(&self, mut req: StatusRequest) -> BoxFuture<'_, ScrapeResult<Response<Bytes>>> {
        req.headers_mut().insert(USER_AGENT, self.user_agent.clone());
        self.inner.send(req)
    }
}
