use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::time::Duration;
use std::{fmt, fs, path};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::osc::ListenerSet;

pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_MS: u64 = 120;
pub const INTERVAL_RANGE_MS: RangeInclusive<u64> = 500..=60_000;
pub const TIMEOUT_RANGE_MS: RangeInclusive<u64> = 10..=10_000;

/// Contents of the optional TOML settings file. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub osc: OscSection,
    pub ping: PingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OscSection {
    pub targets: Vec<String>,
    pub port: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PingSection {
    pub interval_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

impl SettingsFile {
    pub fn from_file(path: impl AsRef<path::Path>) -> Result<Self, ConfigError> {
        let path = normalize_toml_path(path.as_ref());
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed { path, source })?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Validated settings for a monitoring run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub listeners: ListenerSet,
    pub interval: Duration,
    pub timeout: Duration,
    pub concurrency: Option<NonZeroUsize>,
}

impl Settings {
    /// Merge command line and settings file values, command line winning,
    /// and check every value against its allowed range.
    pub fn resolve(cli: &Cli, file: SettingsFile) -> Result<Self, ConfigError> {
        let raw_targets = if cli.targets.is_empty() { file.osc.targets } else { cli.targets.clone() };
        let addresses = raw_targets
            .iter()
            .map(|t| t.trim().parse::<IpAddr>().map_err(|_| ConfigError::InvalidListener(t.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        if addresses.is_empty() {
            return Err(ConfigError::MissingOption("targets"));
        }

        let port = cli.port.or(file.osc.port).ok_or(ConfigError::MissingOption("port"))?;
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(ConfigError::PortOutOfRange(port))?;

        let interval = cli.interval.or(file.ping.interval_ms).unwrap_or(DEFAULT_INTERVAL_MS);
        if !INTERVAL_RANGE_MS.contains(&interval) {
            return Err(ConfigError::IntervalOutOfRange(interval));
        }

        let timeout = cli.timeout.or(file.ping.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS);
        if !TIMEOUT_RANGE_MS.contains(&timeout) {
            return Err(ConfigError::TimeoutOutOfRange(timeout));
        }

        let concurrency = match cli.concurrency.or(file.ping.concurrency) {
            Some(n) => Some(NonZeroUsize::new(n).ok_or(ConfigError::ZeroConcurrency)?),
            None => None,
        };

        Ok(Self {
            listeners: ListenerSet::new(addresses, port)?,
            interval: Duration::from_millis(interval),
            timeout: Duration::from_millis(timeout),
            concurrency,
        })
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
            writeln!(f, "  {label}: {value}")
        };

        let listeners =
            self.listeners.addresses().iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        let concurrency = self.concurrency.map_or_else(|| "unlimited".to_string(), |n| n.to_string());

        writeln!(f, "Monitoring settings:")?;
        write_indented(f, "Interval", &format_args!("{} ms", self.interval.as_millis()))?;
        write_indented(f, "Timeout", &format_args!("{} ms", self.timeout.as_millis()))?;
        write_indented(f, "Concurrency", &concurrency)?;
        write_indented(f, "OSC listeners", &listeners)?;
        write_indented(f, "OSC port", &self.listeners.port())
    }
}
