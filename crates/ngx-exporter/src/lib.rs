//! ngx-exporter — serves nginx `stub_status` counters on `/metrics`.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Landing page |
//! | GET | `/metrics` | Prometheus exposition, one scrape per request, plus `process_*` self-metrics |

pub mod cli;
pub mod logging;
pub mod process;
pub mod server;

pub use cli::Cli;
pub use server::build_router;
