//! # Flowcanvas
//!
//! Flowcanvas is the client-side core of a visual workflow builder for an
//! AI-agent platform. It owns the in-memory workflow graph, the editing
//! operations on it, and the HTTP/WebSocket clients that load, validate,
//! persist, and observe workflows against a remote backend.
//!
//! ## Core Features
//!
//! - **Graph Model**: nodes with a single `next` pointer; edges are derived,
//!   never stored independently
//! - **Editor Operations**: add, connect, delete, reconfigure, with the
//!   dangling-reference cleanup rules callers can rely on
//! - **Validate-then-Save**: a save is refused while the remote validator
//!   reports errors; warnings are confirmable
//! - **Live Events**: auto-reconnecting event-stream client with bounded
//!   retries and per-event handler dispatch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowcanvas::{ClientBuilder, NodeKind, WorkflowEditor, save_validated};
//!
//! let api = ClientBuilder::new().build()?;
//!
//! let mut editor = WorkflowEditor::new("agent_1", "Lead intake");
//! let trigger = editor.add_node(NodeKind::Trigger, "New conversation");
//! let turn = editor.add_node(NodeKind::AiTurn, "Qualify lead");
//! editor.connect(&trigger, &turn)?;
//!
//! let outcome = save_validated(&api, "user_1", editor.workflow_mut(), |_| true).await?;
//! ```

mod builder;
mod catalog;
mod client;
mod common;
mod config;
mod editor;
mod error;
mod model;
mod stream;
mod utils;

use std::sync::{Arc, RwLock};

pub use builder::ClientBuilder;
pub use catalog::{
    Catalog, IntegrationGate, IntegrationKind, IntegrationStatus, NodeTypeInfo, Requirement,
    Template,
};
pub use client::{ApiClient, Issue, SaveOutcome, ValidationReport, WorkflowApi, save, save_validated};
pub use config::{ApiAuth, ApiConfig, Config, StreamConfig};
pub use editor::WorkflowEditor;
pub use error::FlowcanvasError;
pub use model::*;
pub use stream::{
    EVENT_ANOMALY_DETECTED, EVENT_MESSAGE, EVENT_SYSTEM_METRICS, StreamClient, StreamEvent,
    StreamEventHandle, SubscribeOptions,
};

/// Result type alias for Flowcanvas operations.
pub type Result<T> = std::result::Result<T, FlowcanvasError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
