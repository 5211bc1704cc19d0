use std::path::PathBuf;

use clap::Parser;

/// Ping a list of hosts and report their status to OSC listeners
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to the target list CSV (label,address,osc_path per line)
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,

    /// IP address(es) to send OSC status messages to
    #[arg(short, long, num_args = 1.., value_name = "IP")]
    pub targets: Vec<String>,

    /// UDP port to send OSC status messages to
    #[arg(short, long)]
    pub port: Option<u32>,

    /// Delay between ping rounds in ms [default: 1000]
    #[arg(short, long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Ping timeout in ms [default: 120]
    #[arg(short = 'o', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum number of pings in flight at once [default: unlimited]
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Optional TOML settings file; command line options take precedence
    #[arg(short, long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
