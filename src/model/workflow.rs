use serde::{Deserialize, Serialize};

use crate::{
    FlowcanvasError, Result,
    model::{EdgeModel, NodeId, WorkflowNode},
};

/// Event that starts a workflow run. Chosen at creation, stored with the
/// workflow record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriggerKind {
    #[default]
    ConversationStart,
    IncomingCall,
    Webhook,
    Schedule,
    UserAction,
    LeadQualified,
}

/// An automation workflow as edited by the client and stored by the backend.
///
/// `id` is absent until the first save; the backend assigns it and the
/// client writes it back, after which saves become updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub agent_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trigger: TriggerKind,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub active: bool,
}

impl Workflow {
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            agent_id: agent_id.into(),
            name: name.into(),
            description: String::new(),
            trigger: TriggerKind::default(),
            nodes: Vec::new(),
            active: false,
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let workflow = serde_json::from_str::<Workflow>(s);
        match workflow {
            Ok(v) => Ok(v),
            Err(e) => Err(FlowcanvasError::Graph(format!("{}", e))),
        }
    }

    /// Find a node by id.
    pub fn find_node(
        &self,
        id: &str,
    ) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by id, mutably.
    pub fn find_node_mut(
        &mut self,
        id: &str,
    ) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(
        &self,
        id: &str,
    ) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// All node ids, in insertion order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// The rendered edge list derived from the current `next` pointers.
    pub fn derived_edges(&self) -> Vec<EdgeModel> {
        EdgeModel::derive(&self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    // ==================== serialization tests ====================

    #[test]
    fn test_from_json() {
        let json = r#"{
            "agent_id": "agent-1",
            "name": "Lead intake",
            "trigger": "conversation_start",
            "nodes": [
                {"id": "trigger_1", "type": "trigger", "label": "Start", "position": {"x": 80.0, "y": 120.0}, "next": "qwen_1"},
                {"id": "qwen_1", "type": "qwen", "label": "Qualify", "config": {"prompt": "Is this a lead?"}}
            ],
            "active": true
        }"#;

        let workflow = Workflow::from_json(json).unwrap();
        assert_eq!(workflow.id, None);
        assert_eq!(workflow.agent_id, "agent-1");
        assert_eq!(workflow.nodes.len(), 2);
        assert_eq!(workflow.nodes[0].kind, NodeKind::Trigger);
        assert_eq!(workflow.nodes[0].next.as_deref(), Some("qwen_1"));
        assert_eq!(workflow.nodes[1].kind, NodeKind::AiTurn);
        assert_eq!(workflow.nodes[1].config.get_str("prompt"), Some("Is this a lead?"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Workflow::from_json("{\"name\": 42}").is_err());
        assert!(Workflow::from_json("not json").is_err());
    }

    #[test]
    fn test_serialize_skips_absent_id_and_next() {
        let mut workflow = Workflow::new("agent-1", "Empty");
        workflow.nodes.push(WorkflowNode::new("n1".to_string(), NodeKind::Trigger, "Start"));

        let value = serde_json::to_value(&workflow).unwrap();
        assert!(value.get("id").is_none());
        assert!(value["nodes"][0].get("next").is_none());
        assert_eq!(value["nodes"][0]["type"], "trigger");
    }

    #[test]
    fn test_ai_turn_wire_name() {
        let node = WorkflowNode::new("n1".to_string(), NodeKind::AiTurn, "Turn");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "qwen");
    }

    // ==================== lookup tests ====================

    #[test]
    fn test_find_node() {
        let mut workflow = Workflow::new("agent-1", "Lookup");
        workflow.nodes.push(WorkflowNode::new("a".to_string(), NodeKind::Trigger, "A"));
        workflow.nodes.push(WorkflowNode::new("b".to_string(), NodeKind::Action, "B"));

        assert!(workflow.find_node("a").is_some());
        assert!(workflow.find_node("missing").is_none());
        assert!(workflow.contains_node("b"));

        workflow.find_node_mut("b").unwrap().next = Some("a".to_string());
        assert_eq!(workflow.derived_edges().len(), 1);
        assert_eq!(workflow.derived_edges()[0].id, "b-a");
    }
}
