//! Validate-then-persist flow for workflow drafts.
//!
//! Persistence routes on identity: a draft without an id is created, a
//! draft with one is updated in place. The id the backend returns on
//! create is written back into the draft so every later save becomes an
//! update of the same record.

use tracing::info;

use crate::{
    FlowcanvasError, Result,
    client::{ValidationReport, WorkflowApi},
    model::Workflow,
};

/// What a validated save attempt resolved to.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// The draft passed validation and was persisted.
    Saved(Workflow),
    /// Validation reported errors; nothing was sent to the backend.
    RefusedErrors(ValidationReport),
    /// Validation reported only warnings and the caller declined them.
    DeclinedWarnings(ValidationReport),
}

/// Persist a draft, creating or updating by id presence.
///
/// On create the backend-assigned id is written back into `workflow`.
///
/// # Returns
///
/// Returns the stored [`Workflow`] as the backend returned it.
pub async fn save<A>(
    api: &A,
    workflow: &mut Workflow,
) -> Result<Workflow>
where
    A: WorkflowApi + ?Sized,
{
    match workflow.id.clone() {
        None => {
            let created = api.create_workflow(workflow).await?;
            let Some(id) = created.id.clone() else {
                return Err(FlowcanvasError::Api("create response carried no workflow id".to_string()));
            };
            info!("workflow {} created ({})", workflow.name, id);
            workflow.id = Some(id);
            Ok(created)
        }
        Some(id) => {
            let updated = api.update_workflow(&id, workflow).await?;
            info!("workflow {} updated ({})", workflow.name, id);
            Ok(updated)
        }
    }
}

/// Validate a draft and persist it only when the report allows.
///
/// Errors refuse the save outright. Warnings are passed to `confirm`;
/// the draft is persisted only when it returns `true`. The backend is
/// never written to on a refused or declined save.
///
/// # Arguments
///
/// * `api` - The backend to validate against and persist to.
/// * `user_id` - The user whose integrations validation checks.
/// * `workflow` - The draft; its id is written back on create.
/// * `confirm` - Decides whether warnings are acceptable.
pub async fn save_validated<A, F>(
    api: &A,
    user_id: &str,
    workflow: &mut Workflow,
    confirm: F,
) -> Result<SaveOutcome>
where
    A: WorkflowApi + ?Sized,
    F: FnOnce(&ValidationReport) -> bool,
{
    let report = api.validate_workflow(workflow, user_id).await?;
    if report.blocks_save() {
        info!(
            "save of {} refused: {} validation error(s)",
            workflow.name,
            report.errors.len(),
        );
        return Ok(SaveOutcome::RefusedErrors(report));
    }
    if !report.warnings.is_empty() && !confirm(&report) {
        return Ok(SaveOutcome::DeclinedWarnings(report));
    }
    let saved = save(api, workflow).await?;
    Ok(SaveOutcome::Saved(saved))
}
