//! OSC 1.0 message encoding.
//!
//! Only the subset this program sends is supported: a message with a single
//! int32 argument.

use bytes::{BufMut, Bytes, BytesMut};

use crate::monitoring::types::ProbeOutcome;

pub const AVAILABLE: &str = "available";
pub const PINGTIME: &str = "pingtime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OscMessage {
    address: String,
    value: i32,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, value: i32) -> Self {
        Self { address: address.into(), value }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    #[cfg(test)]
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Encode as a single OSC packet.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(padded_len(self.address.len()) + 8);
        put_osc_string(&mut buf, &self.address);
        put_osc_string(&mut buf, ",i");
        buf.put_i32(self.value);
        buf.freeze()
    }
}

/// Messages describing one outcome: `available` = 0 when unreachable,
/// otherwise `available` = 1 followed by `pingtime`.
pub fn status_messages(outcome: &ProbeOutcome) -> Vec<OscMessage> {
    let path = &outcome.task.status_path;

    match outcome.latency_ms {
        None => vec![OscMessage::new(path.join(AVAILABLE), 0)],
        Some(_) => vec![
            OscMessage::new(path.join(AVAILABLE), 1),
            OscMessage::new(path.join(PINGTIME), outcome.latency_millis()),
        ],
    }
}

/// String length including its NUL terminator, rounded up to 4 bytes.
fn padded_len(len: usize) -> usize {
    (len + 4) & !3
}

fn put_osc_string(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_bytes(0, padded_len(s.len()) - s.len());
}
