//! The operation boundary in front of the selected adapter.

use std::sync::Arc;

use tracing::{info, instrument};

use wesbridge_engine::{WesAdapter, WesError};
use wesbridge_model::{RunId, RunListResponse, RunLog, RunStatus, ServiceInfo};

use crate::request::{RunRequestForm, parse_run_request};

/// Wraps the engine adapter selected at startup with request decoding,
/// capability negotiation, and entry/exit logging for every operation.
pub struct WesService {
  adapter: Arc<dyn WesAdapter>,
}

impl WesService {
  pub fn new(adapter: Arc<dyn WesAdapter>) -> Self {
    Self { adapter }
  }

  /// Decode a submission, gate it on the engine's declared capabilities,
  /// and hand it to the adapter.
  #[instrument(name = "wes_run_workflow", skip_all)]
  pub async fn run_workflow(&self, form: RunRequestForm) -> Result<RunId, WesError> {
    let request = parse_run_request(form)?;

    let workflow_type = request.workflow_type.clone().unwrap_or_default();
    let workflow_type_version = request.workflow_type_version.clone().unwrap_or_default();
    if !self
      .adapter
      .is_supported_workflow(&workflow_type, &workflow_type_version)?
    {
      return Err(WesError::invalid_request(format!(
        "unsupported workflow type or version: ({}, {})",
        workflow_type, workflow_type_version
      )));
    }

    let run_id = self.adapter.run_workflow(request).await?;
    info!(run_id = %run_id.run_id, "workflow run accepted");
    Ok(run_id)
  }

  #[instrument(name = "wes_cancel_run", skip(self))]
  pub async fn cancel_run(&self, run_id: &str) -> Result<RunId, WesError> {
    let canceled = self.adapter.cancel_run(run_id).await?;
    info!("run cancellation accepted");
    Ok(canceled)
  }

  #[instrument(name = "wes_get_run_status", skip(self))]
  pub async fn get_run_status(&self, run_id: &str) -> Result<Option<RunStatus>, WesError> {
    let status = self.adapter.get_run_status(run_id).await?;
    info!(found = status.is_some(), "run status resolved");
    Ok(status)
  }

  #[instrument(name = "wes_get_run_log", skip(self))]
  pub async fn get_run_log(&self, run_id: &str) -> Result<Option<RunLog>, WesError> {
    let run_log = self.adapter.get_run_log(run_id).await?;
    info!(found = run_log.is_some(), "run log resolved");
    Ok(run_log)
  }

  #[instrument(name = "wes_list_runs", skip(self))]
  pub async fn list_runs(
    &self,
    page_size: Option<i32>,
    page_token: Option<&str>,
  ) -> Result<RunListResponse, WesError> {
    let response = self.adapter.list_runs(page_size, page_token).await?;
    info!(runs = response.runs.len(), "runs listed");
    Ok(response)
  }

  #[instrument(name = "wes_get_service_info", skip(self))]
  pub async fn get_service_info(&self) -> ServiceInfo {
    self.adapter.get_service_info().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use wesbridge_aws::mock::{
    MemoryObjectStore, MockJobClient, MockLogQueryClient, MockResourceTagIndex,
  };
  use wesbridge_model::RunState;

  use crate::config::{EngineName, ServiceConfig};
  use crate::factory::{BackendClients, create_adapter};

  struct Fixture {
    jobs: Arc<MockJobClient>,
    service: WesService,
  }

  /// A Snakemake service in its minimal wiring, backed by mocks.
  fn snakemake_service() -> Fixture {
    let jobs = Arc::new(MockJobClient::new());
    let clients = BackendClients {
      jobs: jobs.clone(),
      tags: Arc::new(MockResourceTagIndex::new()),
      logs: Arc::new(MockLogQueryClient::new()),
      store: Arc::new(MemoryObjectStore::new()),
    };
    let config = ServiceConfig {
      job_queue: "queue".to_string(),
      job_definition: "definition".to_string(),
      ..ServiceConfig::new(EngineName::Snakemake)
    };
    let adapter = create_adapter(&config, clients).unwrap();
    Fixture {
      jobs,
      service: WesService::new(adapter),
    }
  }

  #[tokio::test]
  async fn run_workflow_submits_supported_workflows() {
    let f = snakemake_service();
    f.jobs.enqueue_submit_id("run-1");

    let form = RunRequestForm::new()
      .field("workflow_url", "s3://bucket/Snakefile")
      .field("workflow_type", "SNAKEMAKE")
      .field("workflow_type_version", "1.0");

    let run_id = f.service.run_workflow(form).await.unwrap();
    assert_eq!(run_id.run_id, "run-1");
    assert_eq!(f.jobs.submitted.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn run_workflow_rejects_unsupported_workflows() {
    let f = snakemake_service();
    let form = RunRequestForm::new()
      .field("workflow_url", "s3://bucket/wf.wdl")
      .field("workflow_type", "WDL")
      .field("workflow_type_version", "1.0");

    let err = f.service.run_workflow(form).await.unwrap_err();
    assert!(err.is_client_fault());
    assert!(f.jobs.submitted.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn run_workflow_rejects_missing_type_as_client_fault() {
    let f = snakemake_service();
    let form = RunRequestForm::new().field("workflow_url", "s3://bucket/Snakefile");
    let err = f.service.run_workflow(form).await.unwrap_err();
    assert!(err.is_client_fault());
  }

  #[tokio::test]
  async fn run_workflow_rejects_malformed_json_fields() {
    let f = snakemake_service();
    let form = RunRequestForm::new()
      .field("workflow_url", "s3://bucket/Snakefile")
      .field("workflow_type", "SNAKEMAKE")
      .field("workflow_type_version", "1.0")
      .field("tags", "{broken");

    let err = f.service.run_workflow(form).await.unwrap_err();
    assert!(err.is_client_fault());
    assert!(err.to_string().contains("tags"));
  }

  #[tokio::test]
  async fn lookups_pass_through_absence() {
    let f = snakemake_service();
    assert!(f.service.get_run_status("missing").await.unwrap().is_none());
    assert!(f.service.get_run_log("missing").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn service_info_reports_the_selected_engine_registry() {
    let f = snakemake_service();
    let info = f.service.get_service_info().await;
    assert_eq!(info.supported_wes_versions, vec!["1.0.0"]);
    assert!(info.workflow_type_versions.supports("SNAKEMAKE", "1.0"));
  }

  #[tokio::test]
  async fn cancel_run_echoes_the_run_id() {
    let f = snakemake_service();
    let canceled = f.service.cancel_run("run-1").await.unwrap();
    assert_eq!(canceled.run_id, "run-1");
  }

  #[tokio::test]
  async fn list_runs_translates_summaries() {
    use wesbridge_aws::{JobSummary, ListJobsPage};

    let f = snakemake_service();
    f.jobs.enqueue_list_page(ListJobsPage {
      job_summaries: vec![JobSummary {
        job_id: "run-1".to_string(),
        status: "RUNNING".to_string(),
        status_reason: None,
      }],
      next_token: Some("token".to_string()),
    });

    let response = f.service.list_runs(None, None).await.unwrap();
    assert_eq!(response.runs[0].state, RunState::Running);
    assert_eq!(response.next_page_token.as_deref(), Some("token"));
  }
}
