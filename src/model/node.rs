use serde::{Deserialize, Serialize};

use crate::model::NodeConfig;

/// node id
pub type NodeId = String;

/// Kind of a workflow step.
///
/// Serialized with the wire names the backend catalog uses; `AiTurn` is
/// `qwen` on the wire, after the model family the product ships with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Trigger,
    #[serde(rename = "qwen")]
    #[strum(serialize = "qwen")]
    AiTurn,
    Decision,
    Action,
    Integration,
}

/// Canvas coordinates. Layout only, no workflow meaning.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            x,
            y,
        }
    }
}

/// One step of an automation workflow.
///
/// `next` names the node this one transitions to on the default path; it is
/// the only place a transition is stored. Rendered edges are derived from it.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WorkflowNode {
    /// node id, unique within the workflow
    pub id: NodeId,
    /// node kind
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// display label
    pub label: String,
    /// kind-specific configuration
    #[serde(default)]
    pub config: NodeConfig,
    /// canvas position
    #[serde(default)]
    pub position: Position,
    /// id of the default-path successor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NodeId>,
}

impl WorkflowNode {
    pub fn new(
        id: NodeId,
        kind: NodeKind,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            config: NodeConfig::new(),
            position: Position::default(),
            next: None,
        }
    }
}
