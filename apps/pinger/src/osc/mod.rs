//! Status reporting over OSC: message encoding and UDP delivery.
pub mod message;
pub mod notifier;

pub use notifier::{ListenerSet, StatusNotifier};
