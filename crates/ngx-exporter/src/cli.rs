//! Command-line flags and their environment fallbacks.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ngx_status::{ClientConfig, ConfigError, DEFAULT_NAMESPACE, SnapshotCollector, StatusClient};

/// Identity header sent to nginx unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("ngx-exporter/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Parser)]
#[command(name = "ngx-exporter", version, about = "Prometheus exporter for nginx stub_status")]
pub struct Cli {
    /// URL of the nginx stub_status page.
    #[arg(long, env = "NGX_STATUS_URL", default_value = "http://127.0.0.1/status")]
    pub status_url: String,

    /// Timeout for one status request (e.g. "3s", "500ms", "1m").
    #[arg(long, env = "NGX_TIMEOUT", default_value = "3s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Prefix for all exported metric names.
    #[arg(long, env = "NGX_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// User-Agent header sent with every status request.
    #[arg(long, env = "NGX_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Address the /metrics endpoint listens on.
    #[arg(long, env = "NGX_LISTEN", default_value = "0.0.0.0:8888")]
    pub listen: SocketAddr,

    /// Also append error-level log records to this file.
    #[arg(long, env = "NGX_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Log to stdout as JSON lines.
    #[arg(long, env = "NGX_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    /// Build the collector described by these flags.
    pub fn collector(&self) -> Result<SnapshotCollector, ConfigError> {
        let config = ClientConfig::new(&self.status_url, &self.user_agent, self.timeout)?;
        SnapshotCollector::new(&self.namespace, StatusClient::new(config))
    }
}

/// Parse a request timeout: a whole number followed by `ms`, `s` or `m`.
/// A bare number counts as seconds. Zero and overflowing values are rejected.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    const UNITS: &[(&str, u64)] = &[("ms", 1), ("s", 1_000), ("m", 60_000), ("", 1_000)];

    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (amount, unit) = s.split_at(split);

    let millis_per_unit = UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, ms)| *ms)
        .ok_or_else(|| format!("invalid duration {s:?}: unknown unit {unit:?} (use ms, s or m)"))?;
    let amount: u64 = amount
        .parse()
        .map_err(|_| format!("invalid duration {s:?}: expected a whole number, e.g. 3s or 500ms"))?;

    match amount.checked_mul(millis_per_unit) {
        Some(0) => Err(format!("invalid duration {s:?}: must be greater than zero")),
        Some(ms) => Ok(Duration::from_millis(ms)),
        None => Err(format!("invalid duration {s:?}: too large")),
    }
}
