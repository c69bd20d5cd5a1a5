//! Self-metrics of the exporter process, served next to the nginx families.
//!
//! Start time is recorded once. Memory and open file descriptors are read
//! from `/proc/self` on every scrape and simply omitted where procfs is not
//! available.

use std::time::{SystemTime, UNIX_EPOCH};

use ngx_status::{MetricDesc, MetricKind, Sample, render_prometheus};
use tracing::trace;

const NO_LABELS: &[(&str, &str)] = &[];

/// Process metric families and the values fixed at startup.
pub struct ProcessMetrics {
    start_time: MetricDesc,
    resident_memory: MetricDesc,
    virtual_memory: MetricDesc,
    open_fds: MetricDesc,
    started_at: f64,
}

impl ProcessMetrics {
    pub fn new() -> Self {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        Self {
            start_time: MetricDesc::new(
                "process",
                "start_time_seconds",
                "Start time of the process since unix epoch in seconds",
                MetricKind::Gauge,
                NO_LABELS,
            ),
            resident_memory: MetricDesc::new(
                "process",
                "resident_memory_bytes",
                "Resident memory size in bytes",
                MetricKind::Gauge,
                NO_LABELS,
            ),
            virtual_memory: MetricDesc::new(
                "process",
                "virtual_memory_bytes",
                "Virtual memory size in bytes",
                MetricKind::Gauge,
                NO_LABELS,
            ),
            open_fds: MetricDesc::new(
                "process",
                "open_fds",
                "Number of open file descriptors",
                MetricKind::Gauge,
                NO_LABELS,
            ),
            started_at,
        }
    }

    /// Families that have a value on this platform.
    fn sample(&self) -> (Vec<&MetricDesc>, Vec<Sample<'_>>) {
        let mut descs = vec![&self.start_time];
        let mut samples = vec![Sample {
            desc: &self.start_time,
            value: self.started_at,
        }];

        let status = std::fs::read_to_string("/proc/self/status").ok();
        let memory = [
            (&self.resident_memory, "VmRSS:"),
            (&self.virtual_memory, "VmSize:"),
        ];
        for (desc, field) in memory {
            if let Some(bytes) = status.as_deref().and_then(|s| status_kib(s, field)) {
                descs.push(desc);
                samples.push(Sample {
                    desc,
                    value: bytes.saturating_mul(1024) as f64,
                });
            }
        }

        match std::fs::read_dir("/proc/self/fd") {
            Ok(entries) => {
                descs.push(&self.open_fds);
                samples.push(Sample {
                    desc: &self.open_fds,
                    value: entries.count() as f64,
                });
            }
            Err(e) => trace!(error = %e, "open fd count unavailable"),
        }

        (descs, samples)
    }

    /// Render the current process metrics as Prometheus text.
    pub fn render(&self) -> String {
        let (descs, samples) = self.sample();
        render_prometheus(&descs, &samples)
    }
}

impl Default for ProcessMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Value in KiB of a `/proc/<pid>/status` line such as `VmRSS:   1234 kB`.
fn status_kib(status: &str, field: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with(field))?;
    line[field.len()..].split_whitespace().next()?.parse().ok()
}
