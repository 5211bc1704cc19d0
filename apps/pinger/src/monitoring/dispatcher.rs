use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, future, stream};
use tokio::time::timeout;
use tracing::debug;

use super::prober::{ProbeError, Prober};
use super::types::{ProbeOutcome, ProbeTask};
use crate::error::ConfigError;

/// Runs one probe per task concurrently and collects the outcomes in task
/// order.
pub struct ProbeDispatcher {
    prober: Arc<dyn Prober>,
    timeout: Duration,
    concurrency: Option<NonZeroUsize>,
}

impl ProbeDispatcher {
    pub fn new(prober: Arc<dyn Prober>, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self { prober, timeout, concurrency: None })
    }

    /// Cap the number of probes in flight. Outcome order is unaffected.
    pub fn with_concurrency(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.concurrency = limit;
        self
    }

    /// Probe every task and wait for all of them to settle.
    ///
    /// The returned outcomes line up index-for-index with `tasks`, whatever
    /// order the replies arrived in. A slow or failing probe never cancels
    /// its siblings.
    pub async fn run_round(&self, tasks: &[Arc<ProbeTask>]) -> Vec<ProbeOutcome> {
        let probes = tasks.iter().cloned().map(|task| self.probe_task(task));

        match self.concurrency {
            Some(limit) => stream::iter(probes).buffered(limit.get()).collect().await,
            None => future::join_all(probes).await,
        }
    }

    async fn probe_task(&self, task: Arc<ProbeTask>) -> ProbeOutcome {
        let reply = timeout(self.timeout, self.prober.probe(task.address, self.timeout))
            .await
            .unwrap_or(Err(ProbeError::Timeout(self.timeout)));

        match reply {
            Ok(rtt) => ProbeOutcome::reachable(task, rtt),
            Err(e) => {
                debug!(label = %task.label, address = %task.address, "Probe failed: {e}");
                ProbeOutcome::unreachable(task)
            }
        }
    }
}
