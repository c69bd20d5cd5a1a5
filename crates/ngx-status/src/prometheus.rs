//! Prometheus text exposition format.
//!
//! Metric descriptors, samples, and the renderer that turns one collection
//! pass into the text format (version 0.0.4) served on `/metrics`.

use std::fmt;
use std::fmt::Write as _;

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Whether a metric can go down between scrapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Gauge => f.write_str("gauge"),
            MetricKind::Counter => f.write_str("counter"),
        }
    }
}

/// Name, help, kind and constant labels of one metric family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: String,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [(&'static str, &'static str)],
}

impl MetricDesc {
    pub fn new(
        namespace: &str,
        name: &str,
        help: &'static str,
        kind: MetricKind,
        labels: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name: fq_name(namespace, name),
            help,
            kind,
            labels,
        }
    }
}

/// One observed value of a metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a> {
    pub desc: &'a MetricDesc,
    pub value: f64,
}

/// Join namespace and name with `_`, skipping an empty namespace.
pub fn fq_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}

/// Whether `name` is usable as a Prometheus metric name (or prefix).
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Render descriptors and their samples into Prometheus text format.
///
/// Every descriptor gets `# HELP` and `# TYPE` lines, even when the pass
/// produced no sample for it.
pub fn render_prometheus(descs: &[&MetricDesc], samples: &[Sample<'_>]) -> String {
    let mut out = String::new();

    for desc in descs {
        let _ = writeln!(out, "# HELP {} {}", desc.name, escape_help(desc.help));
        let _ = writeln!(out, "# TYPE {} {}", desc.name, desc.kind);

        for sample in samples.iter().filter(|s| s.desc == *desc) {
            out.push_str(&desc.name);
            if !desc.labels.is_empty() {
                out.push('{');
                for (i, (key, value)) in desc.labels.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{key}=\"{}\"", escape_label(value));
                }
                out.push('}');
            }
            let _ = writeln!(out, " {}", sample.value);
        }
    }

    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
