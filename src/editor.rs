//! The workflow graph editor.
//!
//! [`WorkflowEditor`] owns the authoritative node list and translates user
//! gestures (add, connect, delete, reconfigure) into graph mutations. All
//! operations are synchronous and local; network round-trips happen in
//! [`crate::ApiClient`], never here.
//!
//! Transitions live on the nodes themselves: each node carries at most one
//! `next` successor, and the rendered edge list is derived from those
//! pointers after every mutation. Deleting a node therefore cleans up the
//! edges touching it by clearing the `next` of every node that referenced
//! it.

use std::str::FromStr;

use tracing::warn;

use crate::{
    FlowcanvasError, Result,
    catalog::Template,
    model::{EdgeModel, NodeConfig, NodeId, NodeKind, Position, Workflow, WorkflowGraph, WorkflowNode},
    utils,
};

/// Layout rule for appended and templated nodes: a horizontal strip.
const LAYOUT_X_START: f64 = 50.0;
const LAYOUT_X_STEP: f64 = 200.0;
const LAYOUT_Y: f64 = 100.0;

/// Editing session over one [`Workflow`].
///
/// Holds the workflow plus the current node selection. The only silent
/// failure mode is malformed config text in [`WorkflowEditor::update_node_config`];
/// every other operation reports unknown ids as errors and leaves the
/// editor usable.
pub struct WorkflowEditor {
    workflow: Workflow,
    selected: Option<NodeId>,
}

impl WorkflowEditor {
    /// Start editing a brand-new workflow for `agent_id`.
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            workflow: Workflow::new(agent_id, name),
            selected: None,
        }
    }

    /// Start editing an existing workflow, e.g. one fetched from the backend.
    pub fn from_workflow(workflow: Workflow) -> Self {
        Self {
            workflow,
            selected: None,
        }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Mutable access to the underlying workflow, used by the save path to
    /// write back the backend-assigned id.
    pub fn workflow_mut(&mut self) -> &mut Workflow {
        &mut self.workflow
    }

    pub fn into_workflow(self) -> Workflow {
        self.workflow
    }

    /// Append a new node of `kind` with a generated unique id, empty config,
    /// and a position on the layout strip. Returns the new id.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        label: impl Into<String>,
    ) -> NodeId {
        let id = utils::id::node_id(kind.as_ref());
        let mut node = WorkflowNode::new(id.clone(), kind, label);
        node.position = Position::new(LAYOUT_X_START + self.workflow.nodes.len() as f64 * LAYOUT_X_STEP, LAYOUT_Y);
        self.workflow.nodes.push(node);
        id
    }

    /// Set `source`'s default-path successor to `target`.
    ///
    /// A node has one default path, so connecting a source that already has
    /// a successor replaces it (last connect wins). Fan-in is unrestricted:
    /// any number of nodes may point at the same target.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
    ) -> Result<()> {
        if source == target {
            return Err(FlowcanvasError::Edge(format!("cannot connect node {} to itself", source)));
        }
        if !self.workflow.contains_node(target) {
            return Err(FlowcanvasError::Edge(format!("target node {} not found", target)));
        }
        let node = self
            .workflow
            .find_node_mut(source)
            .ok_or(FlowcanvasError::Edge(format!("source node {} not found", source)))?;
        node.next = Some(target.to_string());
        Ok(())
    }

    /// Clear `source`'s successor.
    pub fn disconnect(
        &mut self,
        source: &str,
    ) -> Result<()> {
        let node = self.workflow.find_node_mut(source).ok_or(FlowcanvasError::Node(format!("node {} not found", source)))?;
        node.next = None;
        Ok(())
    }

    /// Remove a node. Every other node that had it as successor gets its
    /// `next` cleared, and the selection is dropped if it pointed here.
    pub fn delete_node(
        &mut self,
        id: &str,
    ) -> Result<()> {
        if !self.workflow.contains_node(id) {
            return Err(FlowcanvasError::Node(format!("node {} not found", id)));
        }
        self.workflow.nodes.retain(|n| n.id != id);
        for node in self.workflow.nodes.iter_mut() {
            if node.next.as_deref() == Some(id) {
                node.next = None;
            }
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Replace a node's config from raw editor text.
    ///
    /// Returns whether the edit was applied. Text that does not parse as a
    /// JSON object is ignored and the previous config retained; the caller
    /// keeps showing the last-valid state.
    pub fn update_node_config(
        &mut self,
        id: &str,
        text: &str,
    ) -> bool {
        let Some(node) = self.workflow.find_node_mut(id) else {
            return false;
        };
        match NodeConfig::from_str(text) {
            Ok(config) => {
                node.config = config;
                true
            }
            Err(e) => {
                warn!("config edit on node {} ignored: {}", id, e);
                false
            }
        }
    }

    /// Replace a node's config with an already-typed value.
    pub fn set_node_config(
        &mut self,
        id: &str,
        config: NodeConfig,
    ) -> Result<()> {
        let node = self.workflow.find_node_mut(id).ok_or(FlowcanvasError::Node(format!("node {} not found", id)))?;
        node.config = config;
        Ok(())
    }

    /// Move a node on the canvas. Layout only.
    pub fn move_node(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
    ) -> Result<()> {
        let node = self.workflow.find_node_mut(id).ok_or(FlowcanvasError::Node(format!("node {} not found", id)))?;
        node.position = Position::new(x, y);
        Ok(())
    }

    pub fn select(
        &mut self,
        id: &str,
    ) -> Result<()> {
        if !self.workflow.contains_node(id) {
            return Err(FlowcanvasError::Node(format!("node {} not found", id)));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Replace the graph with a template's nodes.
    ///
    /// Template node ids and `next` chains are kept verbatim so a templated
    /// workflow serializes with the same chain order as the template
    /// definition. Nodes the template did not position are laid out on the
    /// strip; positioned ones keep their coordinates. The workflow name and
    /// description follow the template, and the selection resets.
    pub fn apply_template(
        &mut self,
        template: &Template,
    ) {
        self.workflow.name = template.name.clone();
        self.workflow.description = template.description.clone();
        self.workflow.nodes = template
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let mut node = node.clone();
                if node.position == Position::default() {
                    node.position = Position::new(LAYOUT_X_START + i as f64 * LAYOUT_X_STEP, LAYOUT_Y);
                }
                node
            })
            .collect();
        self.selected = None;
    }

    /// The rendered edge list for the current graph.
    pub fn derived_edges(&self) -> Vec<EdgeModel> {
        self.workflow.derived_edges()
    }

    /// Build the structural snapshot, enforcing the graph invariants.
    pub fn graph(&self) -> Result<WorkflowGraph> {
        WorkflowGraph::try_from(&self.workflow)
    }
}
