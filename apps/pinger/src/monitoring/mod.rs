/// Monitoring engine - probing targets and driving rounds
///
/// This module is responsible for:
/// - Sending ICMP echo probes with a bounded timeout
/// - Fanning probes out per round and collecting ordered outcomes
/// - Scheduling rounds at a fixed delay
pub mod dispatcher;
pub mod observer;
pub mod prober;
pub mod scheduler;
pub mod types;

pub use dispatcher::ProbeDispatcher;
pub use observer::LogObserver;
pub use prober::IcmpProber;
pub use scheduler::RoundScheduler;
pub use types::ProbeTask;
