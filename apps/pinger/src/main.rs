#![warn(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use clap::Parser;
use tracing::info;

mod cli;
mod config;
mod error;
mod monitoring;
mod osc;
mod targets;
#[cfg(test)]
mod tests;

use cli::Cli;
use config::{Settings, SettingsFile};
use error::AppError;
use monitoring::{IcmpProber, LogObserver, ProbeDispatcher, RoundScheduler};
use osc::StatusNotifier;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    logger::init_tracing(cli.verbose);

    let file = match &cli.settings {
        Some(path) => SettingsFile::from_file(path)?,
        None => SettingsFile::default(),
    };
    let settings = Settings::resolve(&cli, file)?;
    let tasks = targets::load_tasks(&cli.config)?;

    info!("OSC Pinger v{}", env!("CARGO_PKG_VERSION"));
    info!("{settings}");

    let prober = Arc::new(IcmpProber::new()?);
    let dispatcher = ProbeDispatcher::new(prober, settings.timeout)?.with_concurrency(settings.concurrency);
    let notifier = StatusNotifier::bind(&settings.listeners).await?;
    info!(broadcast = notifier.broadcast_enabled()?, "Status socket ready");
    let scheduler =
        RoundScheduler::new(dispatcher, notifier, tasks, settings.interval).with_observer(LogObserver);

    tokio::select! {
        () = scheduler.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutting down");
        }
    }

    Ok(())
}
