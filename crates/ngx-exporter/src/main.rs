//! ngx-exporter — Prometheus exporter for nginx `stub_status`.
//!
//! # Usage
//!
//! ```text
//! ngx-exporter --status-url http://127.0.0.1/status --listen 0.0.0.0:8888
//! ```

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use ngx_exporter::{Cli, build_router, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_path.as_deref(), cli.log_json)?;

    let collector = Arc::new(cli.collector()?);
    info!(
        status_url = %cli.status_url,
        timeout_ms = cli.timeout.as_millis() as u64,
        namespace = %cli.namespace,
        "nginx exporter starting"
    );

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!(addr = %cli.listen, "metrics endpoint listening");

    axum::serve(listener, build_router(collector))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("nginx exporter stopped");
    Ok(())
}
