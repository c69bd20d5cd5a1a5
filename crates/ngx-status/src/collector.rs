//! Snapshot collector — one fetch+parse pass per scrape.
//!
//! The collector owns the [`StatusClient`] behind an async mutex, so
//! overlapping scrapes queue up and each exposition reflects exactly one
//! status page.

use tokio::sync::Mutex;
use tracing::{Instrument, Span, debug, error, info_span, warn};

use crate::client::StatusClient;
use crate::error::{ConfigError, ScrapeResult};
use crate::prometheus::{MetricDesc, MetricKind, Sample, is_valid_name};
use crate::snapshot::{self, StatusSnapshot};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "nginx";

const ROLE: &[(&str, &str)] = &[("role", "web")];

/// Outcome of one collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionResult {
    pub up: bool,
    pub snapshot: Option<StatusSnapshot>,
}

impl CollectionResult {
    fn down() -> Self {
        Self {
            up: false,
            snapshot: None,
        }
    }

    fn up(snapshot: StatusSnapshot) -> Self {
        Self {
            up: true,
            snapshot: Some(snapshot),
        }
    }
}

/// The fixed metric families this collector exposes.
struct Descs {
    up: MetricDesc,
    active: MetricDesc,
    accepted: MetricDesc,
    handled: MetricDesc,
    reading: MetricDesc,
    writing: MetricDesc,
    waiting: MetricDesc,
    requests: MetricDesc,
}

impl Descs {
    fn new(ns: &str) -> Self {
        use MetricKind::{Counter, Gauge};
        Self {
            up: MetricDesc::new(ns, "up", "Whether the nginx status page could be scraped (1 = up, 0 = down)", Gauge, ROLE),
            active: MetricDesc::new(ns, "connections_active", "Active client connections", Gauge, ROLE),
            accepted: MetricDesc::new(ns, "connections_accepted", "Accepted client connections", Counter, ROLE),
            handled: MetricDesc::new(ns, "connections_handled", "Handled client connections", Counter, ROLE),
            reading: MetricDesc::new(ns, "connections_reading", "Connections reading the request header", Gauge, ROLE),
            writing: MetricDesc::new(ns, "connections_writing", "Connections writing the response", Gauge, ROLE),
            waiting: MetricDesc::new(ns, "connections_waiting", "Idle keep-alive connections", Gauge, ROLE),
            requests: MetricDesc::new(ns, "requests_total", "Total client requests served", Counter, ROLE),
        }
    }
}

/// Scrapes the status page on demand and maps it onto metric samples.
pub struct SnapshotCollector {
    client: Mutex<StatusClient>,
    descs: Descs,
    span: Span,
}

impl SnapshotCollector {
    /// Create a collector whose metric names are prefixed with `namespace`.
    pub fn new(namespace: &str, client: StatusClient) -> Result<Self, ConfigError> {
        if !is_valid_name(namespace) {
            return Err(ConfigError::Namespace(namespace.to_string()));
        }
        let span = info_span!("collector", endpoint = %client.config().endpoint());
        Ok(Self {
            client: Mutex::new(client),
            descs: Descs::new(namespace),
            span,
        })
    }

    /// Emit this collector's log records inside `span` instead of the
    /// default `collector` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// All metric families, in exposition order. Independent of any scrape.
    pub fn describe(&self) -> [&MetricDesc; 8] {
        let d = &self.descs;
        [
            &d.up,
            &d.active,
            &d.accepted,
            &d.handled,
            &d.reading,
            &d.writing,
            &d.waiting,
            &d.requests,
        ]
    }

    /// Run one fetch+parse pass.
    ///
    /// Failures are logged and reported as `up = false`; they never reach
    /// the caller as errors.
    pub async fn collect(&self) -> CollectionResult {
        let span = self.span.clone();
        async {
            let scraped = {
                let client = self.client.lock().await;
                scrape(&client).await
            };

            match scraped {
                Ok(snapshot) => {
                    if !snapshot.is_consistent() {
                        warn!(
                            accepted = snapshot.accepted,
                            handled = snapshot.handled,
                            "handled connections exceed accepted connections"
                        );
                    }
                    debug!(active = snapshot.active, requests = snapshot.requests, "status scraped");
                    CollectionResult::up(snapshot)
                }
                Err(e) => {
                    error!(error = %e, network = e.is_network(), "failed to scrape nginx status, reporting down");
                    CollectionResult::down()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Map a pass onto samples: availability first, then the seven
    /// connection/request metrics when a snapshot exists.
    pub fn samples(&self, result: &CollectionResult) -> Vec<Sample<'_>> {
        let d = &self.descs;
        let up = Sample {
            desc: &d.up,
            value: if result.up { 1.0 } else { 0.0 },
        };

        let Some(s) = result.snapshot.as_ref() else {
            return vec![up];
        };

        let sample = |desc, value: u64| Sample {
            desc,
            value: value as f64,
        };
        vec![
            up,
            sample(&d.active, s.active),
            sample(&d.accepted, s.accepted),
            sample(&d.handled, s.handled),
            sample(&d.reading, s.reading),
            sample(&d.writing, s.writing),
            sample(&d.waiting, s.waiting),
            sample(&d.requests, s.requests),
        ]
    }

    /// Collect once and render the result as Prometheus text.
    pub async fn render(&self) -> String {
        let result = self.collect().await;
        crate::prometheus::render_prometheus(&self.describe(), &self.samples(&result))
    }
}

async fn scrape(client: &StatusClient) -> ScrapeResult<StatusSnapshot> {
    let raw = client.fetch().await?;
    snapshot::parse(&raw)
}
