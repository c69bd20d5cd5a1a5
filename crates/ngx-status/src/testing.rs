//! In-memory transport for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::header::USER_AGENT;
use http::{Response, StatusCode};

use crate::error::{ScrapeError, ScrapeResult};
use crate::transport::{BoxFuture, StatusRequest, Transport};

pub(crate) const PAGE: &str = "Active connections: 3\n\
                               server accepts handled requests\n\
                               10 9 15\n\
                               Reading: 1 Writing: 1 Waiting: 1\n";

enum Reply {
    Body(StatusCode, &'static str),
    Refused,
    Hang,
}

struct Inner {
    reply: Reply,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    user_agents: Mutex<Vec<Option<String>>>,
}

/// Answers every request the same way and records what it saw.
#[derive(Clone)]
pub(crate) struct StubTransport {
    inner: Arc<Inner>,
}

impl StubTransport {
    fn new(reply: Reply) -> Self {
        Self {
            inner: Arc::new(Inner {
                reply,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                user_agents: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn ok(body: &'static str) -> Self {
        Self::new(Reply::Body(StatusCode::OK, body))
    }

    pub(crate) fn status(status: StatusCode, body: &'static str) -> Self {
        Self::new(Reply::Body(status, body))
    }

    pub(crate) fn refused() -> Self {
        Self::new(Reply::Refused)
    }

    pub(crate) fn hang() -> Self {
        Self::new(Reply::Hang)
    }

    /// Hold each request for `delay` before answering.
    pub(crate) fn delayed(self, delay: Duration) -> Self {
        let inner = Arc::into_inner(self.inner).expect("stub already shared");
        Self {
            inner: Arc::new(Inner { delay, ..inner }),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn user_agents(&self) -> Vec<Option<String>> {
        self.inner.user_agents.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn send(&self, req: StatusRequest) -> BoxFuture<'_, ScrapeResult<Response<Bytes>>> {
        let inner = &self.inner;
        inner.calls.fetch_add(1, Ordering::SeqCst);
        inner.user_agents.lock().unwrap().push(
            req.headers()
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );

        Box::pin(async move {
            let now = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !inner.delay.is_zero() {
                tokio::time::sleep(inner.delay).await;
            }
            let result = match inner.reply {
                Reply::Body(status, body) => {
                    let mut resp = Response::new(Bytes::from_static(body.as_bytes()));
                    *resp.status_mut() = status;
                    Ok(resp)
                }
                Reply::Refused => Err(ScrapeError::Network("connection refused".to_string())),
                Reply::Hang => std::future::pending().await,
            };

            inner.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}
