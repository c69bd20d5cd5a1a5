//! The `stub_status` page and its decoded form.
//!
//! nginx renders the page as four lines followed by a trailing newline:
//!
//! ```text
//! Active connections: 291
//! server accepts handled requests
//!  16630948 16630948 31070465
//! Reading: 6 Writing: 179 Waiting: 106
//! ```

use tracing::trace;

use crate::error::{ScrapeError, ScrapeResult};

/// Number of `\n`-separated segments in a well-formed page, including the
/// empty one after the final newline.
const SEGMENTS: usize = 5;

/// One decoded status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    /// Currently open client connections.
    pub active: u64,
    /// Connections accepted since the server started.
    pub accepted: u64,
    /// Connections handled since the server started. Normally equal to
    /// `accepted` unless a resource limit was hit.
    pub handled: u64,
    /// Requests served since the server started.
    pub requests: u64,
    /// Connections reading the request header.
    pub reading: u64,
    /// Connections writing the response back.
    pub writing: u64,
    /// Idle keep-alive connections.
    pub waiting: u64,
}

impl StatusSnapshot {
    /// Whether `handled <= accepted` holds.
    ///
    /// The page format does not guarantee it, so parsing never checks it.
    pub fn is_consistent(&self) -> bool {
        self.handled <= self.accepted
    }
}

/// Decode a raw status page.
///
/// Every failure maps to [`ScrapeError::Format`] carrying the whole input.
pub fn parse(raw: &[u8]) -> ScrapeResult<StatusSnapshot> {
    let text = String::from_utf8_lossy(raw);
    let invalid = || ScrapeError::Format {
        raw: text.to_string(),
    };
    if std::str::from_utf8(raw).is_err() {
        return Err(invalid());
    }

    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() != SEGMENTS {
        trace!(segments = lines.len(), "unexpected status line count");
        return Err(invalid());
    }

    // Active connections: N
    let (_, active) = lines[0].split_once(':').ok_or_else(invalid)?;
    let active = number(active).ok_or_else(invalid)?;

    // <accepted> <handled> <requests>
    let totals: Vec<&str> = lines[2].trim().split(' ').collect();
    let [accepted, handled, requests] = totals[..] else {
        return Err(invalid());
    };
    let accepted = number(accepted).ok_or_else(invalid)?;
    let handled = number(handled).ok_or_else(invalid)?;
    let requests = number(requests).ok_or_else(invalid)?;

    // Reading: r Writing: w Waiting: wt
    let phases: Vec<&str> = lines[3].trim().split(' ').collect();
    let reading = labelled(&phases, "Reading:").ok_or_else(invalid)?;
    let writing = labelled(&phases, "Writing:").ok_or_else(invalid)?;
    let waiting = labelled(&phases, "Waiting:").ok_or_else(invalid)?;

    Ok(StatusSnapshot {
        active,
        accepted,
        handled,
        requests,
        reading,
        writing,
        waiting,
    })
}

fn number(token: &str) -> Option<u64> {
    token.trim().parse().ok()
}

/// Value of the token right after `label`.
fn labelled(tokens: &[&str], label: &str) -> Option<u64> {
    let at = tokens.iter().position(|t| *t == label)?;
    number(tokens.get(at + 1)?)
}
