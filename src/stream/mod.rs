//! Live event stream from the backend.
//!
//! The backend pushes JSON envelopes over WebSocket: chat replies on
//! `/ws/chat/{agent_id}`, system metrics and anomaly reports on
//! `/ws/admin`. [`StreamClient`] keeps one such connection alive,
//! reconnecting with bounded, linearly backed-off retries, and fans
//! inbound events out to glob-matched handlers and broadcast
//! subscribers.

mod client;
mod event;

pub use client::{StreamClient, StreamEventHandle, SubscribeOptions};
pub use event::{EVENT_ANOMALY_DETECTED, EVENT_MESSAGE, EVENT_SYSTEM_METRICS, StreamEvent};
