//! Prebuilt workflow graphs offered as starting points.
//!
//! Templates come from the backend catalog; a fetched payload is checked
//! against [`Template::schema`] before deserialization so one malformed
//! entry cannot poison the list. Three built-in templates ship with the
//! client as an offline fallback.
//!
//! Branching note: decision nodes carry `true_path`/`false_path` keys inside
//! their opaque config, but only `next` produces an edge. The false branch
//! of a decision is reachable through config alone, which is how the backend
//! interprets it at execution time.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Result,
    model::{NodeConfig, NodeKind, WorkflowNode},
};

/// A prebuilt workflow graph. Applying one through
/// [`crate::WorkflowEditor::apply_template`] keeps node ids and `next`
/// chains verbatim.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
}

impl Template {
    /// Deserialize a fetched template payload, schema-checked first.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        jsonschema::validate(&value, &Self::schema())?;
        let template = serde_json::from_value::<Self>(value)?;
        Ok(template)
    }

    /// JSON Schema for one template payload.
    pub fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "required": ["id", "name", "description"],
            "properties": {
                "id": { "type": "string", "minLength": 1 },
                "name": { "type": "string", "minLength": 1 },
                "description": { "type": "string" },
                "nodes": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["id", "type"],
                        "properties": {
                            "id": { "type": "string", "minLength": 1 },
                            "type": {
                                "type": "string",
                                "enum": ["trigger", "qwen", "decision", "action", "integration"]
                            },
                            "label": { "type": "string" },
                            "config": { "type": "object" },
                            "position": {
                                "type": "object",
                                "properties": {
                                    "x": { "type": "number" },
                                    "y": { "type": "number" }
                                }
                            },
                            "next": { "type": ["string", "null"] }
                        }
                    }
                }
            }
        })
    }

    /// The built-in templates, used when the remote catalog is unreachable.
    pub fn builtins() -> Vec<Template> {
        vec![lead_qualification(), customer_support(), appointment_booking()]
    }
}

fn node(
    id: &str,
    kind: NodeKind,
    label: &str,
    next: Option<&str>,
) -> WorkflowNode {
    let mut node = WorkflowNode::new(id.to_string(), kind, label);
    node.next = next.map(str::to_string);
    node
}

fn lead_qualification() -> Template {
    let mut decision = node("node3", NodeKind::Decision, "Qualified?", Some("node4"));
    decision.config = NodeConfig::new()
        .with("condition", "interested_in_demo")
        .with("true_path", "node4")
        .with("false_path", "node5");

    let mut schedule = node("node4", NodeKind::Integration, "Schedule Meeting", None);
    schedule.config = NodeConfig::new().with("calendar_type", "google");

    Template {
        id: "lead_qualification".to_string(),
        name: "Lead Qualification".to_string(),
        description: "Qualify leads, schedule meetings, update CRM".to_string(),
        nodes: vec![
            node("node1", NodeKind::Trigger, "Incoming Call", Some("node2")),
            node("node2", NodeKind::AiTurn, "Greet & Qualify", Some("node3")),
            decision,
            schedule,
            node("node5", NodeKind::Integration, "Update CRM", None),
        ],
    }
}

fn customer_support() -> Template {
    let mut decision = node("node4", NodeKind::Decision, "Resolved?", Some("node5"));
    decision.config = NodeConfig::new().with("condition", "issue_resolved").with("false_path", "node5");

    Template {
        id: "customer_support".to_string(),
        name: "Customer Support".to_string(),
        description: "Troubleshoot issues, create tickets, follow up".to_string(),
        nodes: vec![
            node("node1", NodeKind::Trigger, "Support Request", Some("node2")),
            node("node2", NodeKind::AiTurn, "Understand Issue", Some("node3")),
            node("node3", NodeKind::Action, "Search Knowledge Base", Some("node4")),
            decision,
            node("node5", NodeKind::Integration, "Create Ticket", None),
        ],
    }
}

fn appointment_booking() -> Template {
    let mut check = node("node3", NodeKind::Integration, "Check Calendar", Some("node4"));
    check.config = NodeConfig::new().with("calendar_type", "google");

    Template {
        id: "appointment_booking".to_string(),
        name: "Appointment Booking".to_string(),
        description: "Check availability, book appointments, send reminders".to_string(),
        nodes: vec![
            node("node1", NodeKind::Trigger, "Schedule Request", Some("node2")),
            node("node2", NodeKind::AiTurn, "Ask Preferences", Some("node3")),
            check,
            node("node4", NodeKind::Integration, "Book Appointment", Some("node5")),
            node("node5", NodeKind::Action, "Send Confirmation", None),
        ],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::WorkflowGraph;

    // ==================== schema tests ====================

    #[test]
    fn test_from_value_accepts_valid_payload() {
        let payload = json!({
            "id": "welcome",
            "name": "Welcome Flow",
            "description": "Say hello",
            "nodes": [
                {"id": "n1", "type": "trigger", "label": "Start", "next": "n2"},
                {"id": "n2", "type": "qwen", "label": "Greet", "config": {"prompt": "hi"}}
            ]
        });

        let template = Template::from_value(payload).unwrap();
        assert_eq!(template.id, "welcome");
        assert_eq!(template.nodes.len(), 2);
        assert_eq!(template.nodes[0].next.as_deref(), Some("n2"));
    }

    #[test]
    fn test_from_value_rejects_missing_fields() {
        assert!(Template::from_value(json!({"name": "No id"})).is_err());
        assert!(Template::from_value(json!({"id": "x", "name": "x"})).is_err());
    }

    #[test]
    fn test_from_value_rejects_unknown_node_type() {
        let payload = json!({
            "id": "bad",
            "name": "Bad",
            "description": "",
            "nodes": [{"id": "n1", "type": "teleport"}]
        });
        assert!(Template::from_value(payload).is_err());
    }

    // ==================== builtin tests ====================

    #[test]
    fn test_builtins_are_structurally_valid() {
        for template in Template::builtins() {
            let mut workflow = crate::model::Workflow::new("agent-1", &template.name);
            workflow.nodes = template.nodes.clone();
            let graph = WorkflowGraph::try_from(&workflow).unwrap();
            assert_eq!(graph.node_count(), 5, "template {}", template.id);
            // the trigger always heads the chain; a decision's false branch
            // may leave a second root (config-only reachability)
            assert_eq!(graph.roots()[0], template.nodes[0].id, "template {}", template.id);
        }
    }

    #[test]
    fn test_builtins_round_trip_schema() {
        for template in Template::builtins() {
            let value = serde_json::to_value(&template).unwrap();
            assert!(Template::from_value(value).is_ok(), "template {}", template.id);
        }
    }

    #[test]
    fn test_decision_branches_stay_in_config() {
        let template = lead_qualification();
        let decision = template.nodes.iter().find(|n| n.kind == NodeKind::Decision).unwrap();

        assert_eq!(decision.config.get_str("true_path"), Some("node4"));
        assert_eq!(decision.config.get_str("false_path"), Some("node5"));
        // only next produces an edge; the false branch has none
        assert_eq!(decision.next.as_deref(), Some("node4"));
    }
}
