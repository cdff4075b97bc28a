//! Structural snapshot of a workflow as a directed graph.
//!
//! The editor's node list stays authoritative; this wraps it in a petgraph
//! structure for the queries that are awkward on a flat list (roots,
//! successor chains, terminal checks). Building the snapshot is also where
//! the structural invariants are enforced: unique node ids and no dangling
//! `next` references.

use std::collections::{HashMap, HashSet};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use crate::{
    FlowcanvasError, Result,
    model::{EdgeModel, NodeId, Workflow, WorkflowNode},
};

/// Read-only directed-graph view over a [`Workflow`]'s nodes and derived
/// edges. Construct with `TryFrom<&Workflow>`; construction fails if the
/// workflow violates a structural invariant.
#[derive(Debug)]
pub struct WorkflowGraph {
    graph: DiGraph<WorkflowNode, EdgeModel>,
    index: HashMap<NodeId, NodeIndex>,
}

impl WorkflowGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes with no incoming edges, in workflow order. A freshly templated
    /// workflow has exactly one root, its trigger.
    pub fn roots(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|idx| self.graph.neighbors_directed(*idx, Direction::Incoming).count() == 0)
            .map(|idx| self.graph[idx].id.clone())
            .collect()
    }

    /// Whether a node has no successor.
    pub fn is_terminal(
        &self,
        id: &str,
    ) -> Result<bool> {
        let idx = self.index.get(id).ok_or(FlowcanvasError::Node(format!("node {} not found", id)))?;
        Ok(self.graph.neighbors_directed(*idx, Direction::Outgoing).count() == 0)
    }

    /// Walk the `next` chain starting at `id`, inclusive. Stops at the first
    /// node without a successor, or when a node repeats (a connect cycle),
    /// so it always terminates.
    pub fn chain_from(
        &self,
        id: &str,
    ) -> Result<Vec<NodeId>> {
        let mut idx = *self.index.get(id).ok_or(FlowcanvasError::Node(format!("node {} not found", id)))?;
        let mut seen = HashSet::new();
        let mut chain = Vec::new();

        loop {
            let nid = self.graph[idx].id.clone();
            if !seen.insert(nid.clone()) {
                break;
            }
            chain.push(nid);

            match self.graph.neighbors_directed(idx, Direction::Outgoing).next() {
                Some(next_idx) => idx = next_idx,
                None => break,
            }
        }

        Ok(chain)
    }

    /// Output a human-readable representation of the workflow graph
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Workflow Graph ===".to_string());
        lines.push(format!("Nodes: {}, Edges: {}", self.graph.node_count(), self.graph.edge_count()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            lines.push(format!("[{}] {} (kind: {})", node.id, node.label, node.kind.as_ref()));
        }
        lines.push(String::new());

        lines.push("--- Edges ---".to_string());
        for idx in self.graph.edge_indices() {
            let edge = &self.graph[idx];
            lines.push(format!("{} --> {} (id: {})", edge.source, edge.target, edge.id));
        }

        lines.join("\n")
    }
}

impl TryFrom<&Workflow> for WorkflowGraph {
    type Error = FlowcanvasError;

    fn try_from(workflow: &Workflow) -> Result<Self> {
        let mut graph: DiGraph<WorkflowNode, EdgeModel> = DiGraph::new();
        let mut index = HashMap::new();

        for node in workflow.nodes.iter() {
            if index.contains_key(&node.id) {
                return Err(FlowcanvasError::Graph(format!("duplicate node id {}", node.id)));
            }
            let idx = graph.add_node(node.clone());
            index.insert(node.id.clone(), idx);
        }
        for edge in workflow.derived_edges() {
            let source = index.get(&edge.source).ok_or(FlowcanvasError::Edge(format!("source node {} not found", edge.source)))?;
            let target = index.get(&edge.target).ok_or(FlowcanvasError::Edge(format!("target node {} not found", edge.target)))?;
            graph.add_edge(*source, *target, edge);
        }

        Ok(Self {
            graph,
            index,
        })
    }
}
