//! Tracing subscriber setup for the daemon.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,ngx_exporter=debug,ngx_status=debug";

/// Install the process subscriber, honouring `RUST_LOG` for stdout.
pub fn init(log_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    subscriber(filter, log_path, json)?
        .try_init()
        .context("installing tracing subscriber")
}

/// Build the daemon's subscriber without installing it.
///
/// `stdout_filter` only governs stdout. With `log_path`, error records are
/// appended to that file whatever the stdout filter says.
pub fn subscriber(
    stdout_filter: EnvFilter,
    log_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<impl Subscriber + Send + Sync + 'static> {
    let (plain, json) = if json {
        (None, Some(fmt::layer().json().with_filter(stdout_filter)))
    } else {
        (Some(fmt::layer().with_filter(stdout_filter)), None)
    };

    let errors = match log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::ERROR),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry().with(plain).with(json).with(errors))
}
