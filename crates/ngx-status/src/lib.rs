//! ngx-status — scrape nginx `stub_status` and expose it as Prometheus metrics.
//!
//! # Architecture
//!
//! ```text
//! SnapshotCollector
//!   ├── collect() ← one call per /metrics request, serialized by a mutex
//!   │   ├── StatusClient::fetch() → raw page (User-Agent injected by transport)
//!   │   └── snapshot::parse() → StatusSnapshot
//!   └── samples() → up + seven connection/request samples
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for the /metrics endpoint
//! ```
//!
//! Scrape failures never surface as errors: they show up as `<ns>_up 0`
//! plus one error log record.

pub mod client;
pub mod collector;
pub mod error;
pub mod prometheus;
pub mod snapshot;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{ClientConfig, StatusClient};
pub use collector::{CollectionResult, DEFAULT_NAMESPACE, SnapshotCollector};
pub use error::{ConfigError, ScrapeError, ScrapeResult};
pub use prometheus::{CONTENT_TYPE, MetricDesc, MetricKind, Sample, render_prometheus};
pub use snapshot::{StatusSnapshot, parse};
pub use transport::{HyperTransport, Transport, WithUserAgent};
