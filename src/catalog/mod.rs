//! Node-type catalog, workflow templates, and the integration gate.
//!
//! The palette is remote-first: node types and templates come from the
//! backend so new types ship without a client release. When the backend is
//! unreachable the built-in catalog keeps the editor usable offline; both
//! lists are cached with a short TTL to spare the backend per-keystroke
//! round-trips.

mod gate;
mod template;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Result, client::WorkflowApi, common::MemCache};

pub use gate::{IntegrationGate, IntegrationKind, IntegrationStatus, Requirement};
pub use template::Template;

const CACHE_SIZE: usize = 16;
const CACHE_TTL: Duration = Duration::from_secs(60);
const TYPES_KEY: &str = "node_types";
const TEMPLATES_KEY: &str = "templates";

/// One palette entry from the node-type catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeTypeInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

impl NodeTypeInfo {
    pub fn new(
        type_name: &str,
        label: &str,
        description: &str,
    ) -> Self {
        Self {
            type_name: type_name.to_string(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

/// Remote-first catalog with TTL caching and built-in fallback.
pub struct Catalog {
    api: Arc<dyn WorkflowApi>,
    node_types: MemCache<String, Vec<NodeTypeInfo>>,
    templates: MemCache<String, Vec<Template>>,
    gates: MemCache<String, IntegrationGate>,
}

impl Catalog {
    pub fn new(api: Arc<dyn WorkflowApi>) -> Self {
        Self {
            api,
            node_types: MemCache::with_ttl(CACHE_SIZE, CACHE_TTL),
            templates: MemCache::with_ttl(CACHE_SIZE, CACHE_TTL),
            gates: MemCache::with_ttl(CACHE_SIZE, CACHE_TTL),
        }
    }

    /// The node types offered by the palette. Falls back to the built-in
    /// five when the backend is unreachable; the fallback is not cached, so
    /// the next call retries the fetch.
    pub async fn node_types(&self) -> Vec<NodeTypeInfo> {
        if let Some(types) = self.node_types.get(&TYPES_KEY.to_string()) {
            return types;
        }
        match self.api.node_types().await {
            Ok(types) => {
                self.node_types.set(TYPES_KEY.to_string(), types.clone());
                types
            }
            Err(e) => {
                warn!("node type catalog unavailable, using built-ins: {}", e);
                Self::builtin_node_types()
            }
        }
    }

    /// The available workflow templates, built-ins when the backend is
    /// unreachable.
    pub async fn templates(&self) -> Vec<Template> {
        if let Some(templates) = self.templates.get(&TEMPLATES_KEY.to_string()) {
            return templates;
        }
        match self.api.templates().await {
            Ok(templates) => {
                self.templates.set(TEMPLATES_KEY.to_string(), templates.clone());
                templates
            }
            Err(e) => {
                warn!("template catalog unavailable, using built-ins: {}", e);
                Template::builtins()
            }
        }
    }

    /// The integration gate for one agent/user pair. Unlike the catalogs
    /// there is no offline fallback: integration state cannot be assumed,
    /// so fetch failures propagate.
    pub async fn integration_gate(
        &self,
        agent_id: &str,
        user_id: &str,
    ) -> Result<IntegrationGate> {
        let key = format!("{}:{}", agent_id, user_id);
        if let Some(gate) = self.gates.get(&key) {
            return Ok(gate);
        }
        let statuses = self.api.integration_status(agent_id, user_id).await?;
        let gate = IntegrationGate::from_raw(statuses);
        self.gates.set(key, gate.clone());
        Ok(gate)
    }

    /// Drop the cached gate for one agent/user pair. Call after the user
    /// connects or disconnects an integration so the palette reflects the
    /// change immediately instead of waiting out the TTL.
    pub fn invalidate_gate(
        &self,
        agent_id: &str,
        user_id: &str,
    ) {
        self.gates.remove(&format!("{}:{}", agent_id, user_id));
    }

    /// The five node types every deployment understands.
    pub fn builtin_node_types() -> Vec<NodeTypeInfo> {
        vec![
            NodeTypeInfo::new("trigger", "Trigger", "Starts the workflow from an incoming call, webhook, schedule, or user action"),
            NodeTypeInfo::new("qwen", "Qwen 3 Omni", "One conversation turn: voice or text, with emotion and language detection"),
            NodeTypeInfo::new("decision", "Decision", "Branches the flow with if/then/else or switch rules"),
            NodeTypeInfo::new("action", "Action", "Sends messages, waits, updates records, or logs events"),
            NodeTypeInfo::new("integration", "Integration", "Calls a connected service such as calendar, CRM, email, or SMS"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::{
        FlowcanvasError,
        client::ValidationReport,
        model::Workflow,
    };

    #[derive(Default)]
    struct FakeApi {
        fail: bool,
        type_calls: AtomicUsize,
        status_calls: AtomicUsize,
    }

    #[async_trait]
    impl WorkflowApi for FakeApi {
        async fn create_workflow(
            &self,
            _workflow: &Workflow,
        ) -> Result<Workflow> {
            unimplemented!()
        }

        async fn update_workflow(
            &self,
            _id: &str,
            _workflow: &Workflow,
        ) -> Result<Workflow> {
            unimplemented!()
        }

        async fn get_workflow(
            &self,
            _id: &str,
        ) -> Result<Workflow> {
            unimplemented!()
        }

        async fn list_workflows(
            &self,
            _agent_id: &str,
        ) -> Result<Vec<Workflow>> {
            unimplemented!()
        }

        async fn delete_workflow(
            &self,
            _id: &str,
        ) -> Result<()> {
            unimplemented!()
        }

        async fn validate_workflow(
            &self,
            _workflow: &Workflow,
            _user_id: &str,
        ) -> Result<ValidationReport> {
            unimplemented!()
        }

        async fn node_types(&self) -> Result<Vec<NodeTypeInfo>> {
            self.type_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FlowcanvasError::Api("connection refused".to_string()));
            }
            Ok(vec![NodeTypeInfo::new("trigger", "Trigger", "")])
        }

        async fn templates(&self) -> Result<Vec<Template>> {
            if self.fail {
                return Err(FlowcanvasError::Api("connection refused".to_string()));
            }
            Ok(vec![])
        }

        async fn integration_status(
            &self,
            _agent_id: &str,
            _user_id: &str,
        ) -> Result<HashMap<String, IntegrationStatus>> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FlowcanvasError::Api("connection refused".to_string()));
            }
            let mut statuses = HashMap::new();
            statuses.insert("calendar".to_string(), IntegrationStatus {
                configured: true,
                provider: Some("google".to_string()),
            });
            Ok(statuses)
        }
    }

    fn run_async<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    // ==================== node_types tests ====================

    #[test]
    fn test_node_types_cached_after_fetch() {
        let api = Arc::new(FakeApi::default());
        let catalog = Catalog::new(api.clone());

        run_async(async {
            let first = catalog.node_types().await;
            let second = catalog.node_types().await;
            assert_eq!(first, second);
        });
        assert_eq!(api.type_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_node_types_fallback_not_cached() {
        let api = Arc::new(FakeApi {
            fail: true,
            ..Default::default()
        });
        let catalog = Catalog::new(api.clone());

        run_async(async {
            let types = catalog.node_types().await;
            assert_eq!(types.len(), 5);
            assert_eq!(types[0].type_name, "trigger");

            // fallback was not cached, so the fetch is retried
            catalog.node_types().await;
        });
        assert_eq!(api.type_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_templates_fallback_is_builtin() {
        let api = Arc::new(FakeApi {
            fail: true,
            ..Default::default()
        });
        let catalog = Catalog::new(api);

        let templates = run_async(catalog.templates());
        assert_eq!(templates.len(), 3);
        assert!(templates.iter().any(|t| t.id == "lead_qualification"));
    }

    // ==================== integration_gate tests ====================

    #[test]
    fn test_integration_gate_cached_per_key() {
        let api = Arc::new(FakeApi::default());
        let catalog = Catalog::new(api.clone());

        run_async(async {
            let gate = catalog.integration_gate("agent-1", "user-1").await.unwrap();
            assert!(gate.can_add("schedule_meeting"));

            catalog.integration_gate("agent-1", "user-1").await.unwrap();
            assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);

            catalog.integration_gate("agent-2", "user-1").await.unwrap();
            assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn test_invalidate_gate_forces_refetch() {
        let api = Arc::new(FakeApi::default());
        let catalog = Catalog::new(api.clone());

        run_async(async {
            catalog.integration_gate("agent-1", "user-1").await.unwrap();
            catalog.invalidate_gate("agent-1", "user-1");
            catalog.integration_gate("agent-1", "user-1").await.unwrap();
        });
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_integration_gate_errors_propagate() {
        let api = Arc::new(FakeApi {
            fail: true,
            ..Default::default()
        });
        let catalog = Catalog::new(api);

        let result = run_async(catalog.integration_gate("agent-1", "user-1"));
        assert!(result.is_err());
    }
}
