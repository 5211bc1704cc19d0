use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

use super::dispatcher::ProbeDispatcher;
use super::observer::{LogObserver, OutcomeObserver};
use super::types::{ProbeOutcome, ProbeTask};
use crate::osc::StatusNotifier;

/// Whether a round is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    Running,
}

/// Repeats probe-then-report rounds forever.
///
/// The delay runs from the end of one round's notifications to the start of
/// the next round, so slow rounds push the whole schedule back. Rounds never
/// overlap.
pub struct RoundScheduler {
    dispatcher: ProbeDispatcher,
    notifier: StatusNotifier,
    tasks: Vec<Arc<ProbeTask>>,
    interval: Duration,
    observer: Box<dyn OutcomeObserver>,
    state: watch::Sender<RoundState>,
}

impl RoundScheduler {
    pub fn new(
        dispatcher: ProbeDispatcher,
        notifier: StatusNotifier,
        tasks: Vec<Arc<ProbeTask>>,
        interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(RoundState::Idle);
        Self { dispatcher, notifier, tasks, interval, observer: Box::new(LogObserver), state }
    }

    /// Replace the default per-outcome logging.
    pub fn with_observer(mut self, observer: impl OutcomeObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    #[cfg(test)]
    pub fn subscribe_state(&self) -> watch::Receiver<RoundState> {
        self.state.subscribe()
    }

    /// Run rounds until the process is stopped.
    pub async fn run(&self) {
        let mut round: u64 = 0;

        loop {
            round += 1;
            info!(round, targets = self.tasks.len(), "Sending pings...");

            let outcomes = self.run_round().await;

            let reachable = outcomes.iter().filter(|o| o.is_reachable()).count();
            info!(round, reachable, unreachable = outcomes.len() - reachable, "Finished sending pings");

            sleep(self.interval).await;
        }
    }

    /// Probe every task once, then observe and report each outcome in task
    /// order.
    pub async fn run_round(&self) -> Vec<ProbeOutcome> {
        self.state.send_replace(RoundState::Running);

        let outcomes = self.dispatcher.run_round(&self.tasks).await;

        for outcome in &outcomes {
            self.observer.observe(outcome);
            let delivery = self.notifier.notify(outcome).await;
            debug!(label = %outcome.task.label, sent = delivery.sent, failed = delivery.failed, "Reported status");
        }

        self.state.send_replace(RoundState::Idle);
        outcomes
    }
}
