use serde::{Deserialize, Serialize};

use crate::model::WorkflowNode;

/// edge id
pub type EdgeId = String;

/// A rendered transition between two nodes.
///
/// Edges are derived from each node's `next` pointer, never stored on their
/// own; after any mutation the edge list is rebuilt from the surviving nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EdgeModel {
    pub id: EdgeId,
    pub source: String,
    pub target: String,
}

impl EdgeModel {
    /// Derive the edge list from the nodes' `next` pointers: one edge per
    /// node with a successor, id `{source}-{target}`.
    pub fn derive(nodes: &[WorkflowNode]) -> Vec<EdgeModel> {
        nodes
            .iter()
            .filter_map(|node| {
                node.next.as_ref().map(|target| EdgeModel {
                    id: format!("{}-{}", node.id, target),
                    source: node.id.clone(),
                    target: target.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    fn node(
        id: &str,
        next: Option<&str>,
    ) -> WorkflowNode {
        let mut node = WorkflowNode::new(id.to_string(), NodeKind::Action, id);
        node.next = next.map(str::to_string);
        node
    }

    // ==================== derive tests ====================

    #[test]
    fn test_derive_one_edge_per_next() {
        let nodes = vec![node("a", Some("b")), node("b", Some("c")), node("c", None)];

        let edges = EdgeModel::derive(&nodes);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].id, "a-b");
        assert_eq!(edges[0].source, "a");
        assert_eq!(edges[0].target, "b");
        assert_eq!(edges[1].id, "b-c");
    }

    #[test]
    fn test_derive_empty_for_unlinked_nodes() {
        let nodes = vec![node("a", None), node("b", None)];
        assert!(EdgeModel::derive(&nodes).is_empty());
    }

    #[test]
    fn test_derive_allows_fan_in() {
        // two nodes pointing at the same target produce two edges
        let nodes = vec![node("a", Some("c")), node("b", Some("c")), node("c", None)];

        let edges = EdgeModel::derive(&nodes);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.target == "c"));
    }
}
