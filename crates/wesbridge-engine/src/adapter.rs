//! The abstract WES adapter contract.

use async_trait::async_trait;

use wesbridge_model::{
  RunId, RunListResponse, RunLog, RunRequest, RunStatus, ServiceInfo, WorkflowTypeVersions,
};

use crate::error::WesError;

/// The WES API version this service speaks.
pub const SUPPORTED_WES_VERSION: &str = "1.0.0";

/// The run-lifecycle capability set every engine variant implements.
///
/// Exactly one implementation is constructed per process, selected from
/// configuration at startup. Lookups return `Ok(None)` when the backend
/// does not recognize the run id — callers treat that as a 404-equivalent,
/// never as a failure.
#[async_trait]
pub trait WesAdapter: Send + Sync {
  /// Submit a workflow run; returns the backend-assigned run id.
  async fn run_workflow(&self, request: RunRequest) -> Result<RunId, WesError>;

  /// Cancel a running workflow; echoes the run id on success.
  async fn cancel_run(&self, run_id: &str) -> Result<RunId, WesError>;

  /// Abbreviated status of a run.
  async fn get_run_status(&self, run_id: &str) -> Result<Option<RunStatus>, WesError>;

  /// Detailed run information: head-job log, per-task logs and outputs.
  async fn get_run_log(&self, run_id: &str) -> Result<Option<RunLog>, WesError>;

  /// One page of known runs.
  async fn list_runs(
    &self,
    page_size: Option<i32>,
    page_token: Option<&str>,
  ) -> Result<RunListResponse, WesError>;

  /// Workflow types and versions the active engine accepts.
  fn workflow_type_versions(&self) -> &WorkflowTypeVersions;

  /// WES API versions this adapter supports.
  fn supported_wes_versions(&self) -> Vec<String> {
    vec![SUPPORTED_WES_VERSION.to_string()]
  }

  /// Service descriptor combining API versions with the type registry.
  /// Async so remote variants can fold a live health probe into the
  /// descriptor.
  async fn get_service_info(&self) -> ServiceInfo {
    ServiceInfo {
      supported_wes_versions: self.supported_wes_versions(),
      workflow_type_versions: self.workflow_type_versions().clone(),
      tags: None,
    }
  }

  /// Capability negotiation: whether this adapter accepts the workflow
  /// type and version. Empty or whitespace-only inputs are a client
  /// fault, not a panic.
  fn is_supported_workflow(
    &self,
    workflow_type: &str,
    workflow_type_version: &str,
  ) -> Result<bool, WesError> {
    if workflow_type.trim().is_empty() || workflow_type_version.trim().is_empty() {
      return Err(WesError::invalid_request(
        "workflow_type and workflow_type_version must be non-empty",
      ));
    }
    Ok(
      self
        .workflow_type_versions()
        .supports(workflow_type, workflow_type_version),
    )
  }
}
