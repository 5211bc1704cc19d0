use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;

use crate::error::ConfigError;

/// Latency reported on the wire when a probe got no reply.
pub const UNREACHABLE: i32 = -1;

static STATUS_PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/[^ #*,?\[\]{}]+[^ #*,?\[\]{}/]$").expect("status path pattern is valid")
});

/// OSC address prefix under which a target's status is published,
/// e.g. `/room1/projector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPath(String);

impl StatusPath {
    pub fn parse(path: &str) -> Option<Self> {
        STATUS_PATH_PATTERN.is_match(path).then(|| Self(path.to_string()))
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a leaf segment, producing exactly one `/` at each boundary.
    pub fn join(&self, leaf: &str) -> String {
        let prefix = self.0.trim_matches('/');
        let leaf = leaf.trim_matches('/');
        if prefix.is_empty() { format!("/{leaf}") } else { format!("/{prefix}/{leaf}") }
    }
}

impl fmt::Display for StatusPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A host to ping every round and where to report its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTask {
    pub label: String,
    pub address: IpAddr,
    pub status_path: StatusPath,
}

impl ProbeTask {
    pub fn new(label: impl Into<String>, address: IpAddr, status_path: StatusPath) -> Self {
        Self { label: label.into(), address, status_path }
    }

    /// Build a task from raw text, rejecting a bad address or status path.
    pub fn parse(label: &str, address: &str, status_path: &str) -> Result<Self, ConfigError> {
        let ip = address.parse::<IpAddr>().map_err(|_| ConfigError::InvalidAddress {
            label: label.to_string(),
            value: address.to_string(),
        })?;
        let path = StatusPath::parse(status_path).ok_or_else(|| ConfigError::InvalidStatusPath {
            label: label.to_string(),
            path: status_path.to_string(),
        })?;

        Ok(Self::new(label, ip, path))
    }
}

/// Result of probing one task in one round.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub task: Arc<ProbeTask>,

    /// Round-trip time in whole milliseconds, `None` when no reply arrived
    pub latency_ms: Option<u32>,
}

impl ProbeOutcome {
    pub fn reachable(task: Arc<ProbeTask>, rtt: Duration) -> Self {
        let latency_ms = u32::try_from(rtt.as_millis()).unwrap_or(u32::MAX);
        Self { task, latency_ms: Some(latency_ms) }
    }

    pub fn unreachable(task: Arc<ProbeTask>) -> Self {
        Self { task, latency_ms: None }
    }

    pub fn is_reachable(&self) -> bool {
        self.latency_ms.is_some()
    }

    /// Latency as carried on the wire: milliseconds, or [`UNREACHABLE`].
    pub fn latency_millis(&self) -> i32 {
        self.latency_ms.map_or(UNREACHABLE, |ms| i32::try_from(ms).unwrap_or(i32::MAX))
    }
}
