//! Workflow backend operations.
//!
//! [`WorkflowApi`] is the seam between the editor-facing layers and the
//! HTTP transport: [`Catalog`](crate::catalog::Catalog) and the save flow
//! take the trait so tests can stand in a fake backend. [`ApiClient`]
//! implements it against the real endpoints.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    Result,
    catalog::{IntegrationStatus, NodeTypeInfo, Template},
    client::ApiClient,
    model::Workflow,
};

/// A single validation finding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub message: String,
}

impl Issue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of a validation round-trip.
///
/// `errors` block saving; `warnings` only require the caller's
/// confirmation. A report with `valid == false` blocks saving even when
/// the error list is empty.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<Issue>,
    #[serde(default)]
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    /// Whether the workflow may be persisted without confirmation.
    pub fn blocks_save(&self) -> bool {
        !self.valid || !self.errors.is_empty()
    }

    /// One bulleted line per finding, errors first.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .map(|issue| format!("• {}", issue.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Operations the workflow backend exposes.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Creates a workflow record.
    ///
    /// # Returns
    ///
    /// Returns the stored [`Workflow`]; its `id` is the authoritative
    /// identity for later updates.
    async fn create_workflow(
        &self,
        workflow: &Workflow,
    ) -> Result<Workflow>;

    /// Replaces the workflow stored under `id`.
    async fn update_workflow(
        &self,
        id: &str,
        workflow: &Workflow,
    ) -> Result<Workflow>;

    /// Fetches one workflow by id.
    async fn get_workflow(
        &self,
        id: &str,
    ) -> Result<Workflow>;

    /// Lists every workflow belonging to an agent.
    async fn list_workflows(
        &self,
        agent_id: &str,
    ) -> Result<Vec<Workflow>>;

    /// Deletes the workflow stored under `id`.
    async fn delete_workflow(
        &self,
        id: &str,
    ) -> Result<()>;

    /// Runs server-side validation without persisting anything.
    ///
    /// # Arguments
    ///
    /// * `workflow` - The draft to check, saved or not.
    /// * `user_id` - The user whose integrations the checks run against.
    ///
    /// # Returns
    ///
    /// Returns the [`ValidationReport`] for the draft.
    async fn validate_workflow(
        &self,
        workflow: &Workflow,
        user_id: &str,
    ) -> Result<ValidationReport>;

    /// Fetches the node-type palette.
    async fn node_types(&self) -> Result<Vec<NodeTypeInfo>>;

    /// Fetches the workflow templates.
    async fn templates(&self) -> Result<Vec<Template>>;

    /// Fetches per-integration configuration state for an agent.
    async fn integration_status(
        &self,
        agent_id: &str,
        user_id: &str,
    ) -> Result<HashMap<String, IntegrationStatus>>;
}

#[derive(Deserialize)]
struct WorkflowsBody {
    workflows: Vec<Workflow>,
}

#[derive(Deserialize)]
struct NodeTypesBody {
    node_types: Vec<NodeTypeInfo>,
}

#[derive(Deserialize)]
struct TemplatesBody {
    templates: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct IntegrationsBody {
    integrations: HashMap<String, IntegrationStatus>,
}

#[async_trait]
impl WorkflowApi for ApiClient {
    async fn create_workflow(
        &self,
        workflow: &Workflow,
    ) -> Result<Workflow> {
        self.execute(self.request(Method::POST, "/api/workflows/").json(workflow)).await
    }

    async fn update_workflow(
        &self,
        id: &str,
        workflow: &Workflow,
    ) -> Result<Workflow> {
        self.execute(self.request(Method::PUT, &format!("/api/workflows/{}", id)).json(workflow)).await
    }

    async fn get_workflow(
        &self,
        id: &str,
    ) -> Result<Workflow> {
        self.execute(self.request(Method::GET, &format!("/api/workflows/{}", id))).await
    }

    async fn list_workflows(
        &self,
        agent_id: &str,
    ) -> Result<Vec<Workflow>> {
        let body: WorkflowsBody = self.execute(self.request(Method::GET, &format!("/api/workflows/agent/{}", agent_id))).await?;
        Ok(body.workflows)
    }

    async fn delete_workflow(
        &self,
        id: &str,
    ) -> Result<()> {
        self.execute::<serde_json::Value>(self.request(Method::DELETE, &format!("/api/workflows/{}", id))).await?;
        Ok(())
    }

    async fn validate_workflow(
        &self,
        workflow: &Workflow,
        user_id: &str,
    ) -> Result<ValidationReport> {
        let request = self
            .request(Method::POST, "/api/workflows/validate")
            .query(&[("user_id", user_id)])
            .json(workflow);
        self.execute(request).await
    }

    async fn node_types(&self) -> Result<Vec<NodeTypeInfo>> {
        let body: NodeTypesBody = self.execute(self.request(Method::GET, "/api/workflows/node-types")).await?;
        Ok(body.node_types)
    }

    async fn templates(&self) -> Result<Vec<Template>> {
        let body: TemplatesBody = self.execute(self.request(Method::GET, "/api/workflows/templates")).await?;
        let mut templates = Vec::with_capacity(body.templates.len());
        for value in body.templates {
            match Template::from_value(value) {
                Ok(template) => templates.push(template),
                Err(err) => warn!("skipping malformed template: {}", err),
            }
        }
        Ok(templates)
    }

    async fn integration_status(
        &self,
        agent_id: &str,
        user_id: &str,
    ) -> Result<HashMap<String, IntegrationStatus>> {
        let request = self
            .request(Method::GET, &format!("/api/integrations/status/{}", agent_id))
            .query(&[("user_id", user_id)]);
        let body: IntegrationsBody = self.execute(request).await?;
        Ok(body.integrations)
    }
}
