use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error;

/// Problems with the settings, the target list, or values derived from them.
///
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("item '{label}' has invalid IP '{value}'")]
    InvalidAddress { label: String, value: String },
    #[error("item '{label}' has invalid OSC address '{path}'")]
    InvalidStatusPath { label: String, path: String },
    #[error("invalid listener IP address '{0}'")]
    InvalidListener(String),
    #[error("no listener addresses configured")]
    NoListeners,
    #[error("invalid UDP port number '{0}'")]
    PortOutOfRange(u32),
    #[error("invalid interval time '{0}'. Interval time is specified in ms and must be between 500 and 60000")]
    IntervalOutOfRange(u64),
    #[error("invalid timeout '{0}'. Timeout is specified in ms and must be between 10 and 10000")]
    TimeoutOutOfRange(u64),
    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,
    #[error("concurrency limit must be greater than zero")]
    ZeroConcurrency,
    #[error("missing required option '{0}'")]
    MissingOption(&'static str),
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("target list is invalid: {0}")]
    Csv(#[from] csv::Error),
    #[error("settings file is invalid: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration invalid - {0}")]
    Config(#[from] ConfigError),
    #[error("{0:#}")]
    Io(#[from] IoError),
}
