//! Inbound event envelope.

use serde_json::Value;

/// Event name for live system metric snapshots on the admin stream.
pub const EVENT_SYSTEM_METRICS: &str = "system.metrics";

/// Event name for anomaly reports on the admin stream.
pub const EVENT_ANOMALY_DETECTED: &str = "anomaly.detected";

/// Name frames without an `event` field dispatch under. Chat replies
/// arrive this way.
pub const EVENT_MESSAGE: &str = "message";

/// One decoded frame from the backend stream.
///
/// Frames are JSON envelopes `{event, data, timestamp}`. The `event`
/// field routes the frame; `payload` keeps the whole envelope so
/// handlers see every field the backend sent, not just `data`.
#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub event: String,
    pub payload: Value,
}

impl StreamEvent {
    /// Wrap a decoded frame, filing it under [`EVENT_MESSAGE`] when no
    /// `event` field names it.
    pub fn from_value(payload: Value) -> Self {
        let event = payload
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or(EVENT_MESSAGE)
            .to_string();
        Self {
            event,
            payload,
        }
    }

    /// The envelope's `data` object, when present.
    pub fn data(&self) -> Option<&Value> {
        self.payload.get("data")
    }

    /// The envelope's `timestamp`, number or string, when present.
    pub fn timestamp(&self) -> Option<&Value> {
        self.payload.get("timestamp")
    }
}
