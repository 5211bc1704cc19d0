use tracing::info;

use super::types::ProbeOutcome;

/// Receives every outcome of a round, in task order, before it is reported.
///
/// Implementations must return promptly; the round waits on them.
pub trait OutcomeObserver: Send + Sync {
    fn observe(&self, outcome: &ProbeOutcome);
}

impl<F> OutcomeObserver for F
where
    F: Fn(&ProbeOutcome) + Send + Sync,
{
    fn observe(&self, outcome: &ProbeOutcome) {
        self(outcome)
    }
}

/// Writes one log line per outcome.
pub struct LogObserver;

impl OutcomeObserver for LogObserver {
    fn observe(&self, outcome: &ProbeOutcome) {
        let task = &outcome.task;
        match outcome.latency_ms {
            Some(ms) => info!(
                label = %task.label,
                address = %task.address,
                latency_ms = ms,
                "Response from {} ({}) with ping time of {} ms",
                task.label,
                task.address,
                ms
            ),
            None => info!(
                label = %task.label,
                address = %task.address,
                "No response from {} ({})",
                task.label,
                task.address
            ),
        }
    }
}
