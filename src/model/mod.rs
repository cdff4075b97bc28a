mod config;
mod edge;
mod graph;
mod node;
mod workflow;

pub use config::NodeConfig;
pub use edge::{EdgeId, EdgeModel};
pub use graph::WorkflowGraph;
pub use node::{NodeId, NodeKind, Position, WorkflowNode};
pub use workflow::{TriggerKind, Workflow};
