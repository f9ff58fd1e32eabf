//! The remote Cromwell adapter.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use wesbridge_aws::ObjectStore;
use wesbridge_engine::{WesAdapter, WesError};
use wesbridge_model::{
  Log, RunId, RunListResponse, RunLog, RunRequest, RunStatus, ServiceInfo,
  WorkflowTypeVersions,
};

use crate::staging::{StagedFile, SubmissionParts, stage_workflow};
use crate::state::remote_run_state;

/// Path of the run API on the engine server.
const API_PATH: &str = "api/workflows/v1";
/// Path of the engine health endpoint.
const ENGINE_STATUS_PATH: &str = "engine/v1/status";
/// Upper bound on indexed workflow inputs parts.
const MAX_WORKFLOW_INPUTS: usize = 5;

/// WES adapter delegating the run lifecycle to a Cromwell server.
///
/// Workflow sources referenced by S3 URL are staged through the object
/// store before submission; everything else is a thin translation over the
/// server's REST endpoints.
pub struct CromwellAdapter {
  http: reqwest::Client,
  api_url: String,
  health_url: String,
  store: Arc<dyn ObjectStore>,
  workflow_params: serde_json::Value,
  workflow_type_versions: WorkflowTypeVersions,
}

impl CromwellAdapter {
  pub fn new(base_url: &str, store: Arc<dyn ObjectStore>) -> Self {
    let base_url = base_url.trim_end_matches('/');
    Self {
      http: reqwest::Client::new(),
      api_url: format!("{}/{}", base_url, API_PATH),
      health_url: format!("{}/{}", base_url, ENGINE_STATUS_PATH),
      store,
      workflow_params: serde_json::json!({}),
      workflow_type_versions: WorkflowTypeVersions::from_entries([(
        "WDL",
        ["1.0", "draft-2"],
      )]),
    }
  }

  /// Carry fixed workflow parameters to echo in run-log requests.
  pub fn with_workflow_params(mut self, workflow_params: serde_json::Value) -> Self {
    self.workflow_params = workflow_params;
    self
  }

  fn run_url(&self, run_id: &str, operation: &str) -> String {
    format!("{}/{}/{}", self.api_url, run_id, operation)
  }

  /// Probe the engine health endpoint; anything but a 200 is a fault.
  async fn check_engine_healthy(&self) -> Result<(), WesError> {
    let response = self
      .http
      .get(&self.health_url)
      .send()
      .await
      .map_err(|e| WesError::internal_with("engine health check failed", e))?;
    if response.status().as_u16() != 200 {
      return Err(WesError::internal(format!(
        "engine is unhealthy: HTTP {}",
        response.status()
      )));
    }
    Ok(())
  }

  async fn get_json(&self, url: &str) -> Result<(u16, serde_json::Value), WesError> {
    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(|e| WesError::internal_with(format!("engine request to '{}' failed", url), e))?;
    let status = response.status().as_u16();
    let body = response
      .json()
      .await
      .unwrap_or(serde_json::Value::Null);
    Ok((status, body))
  }

  /// Assemble the multipart submission form.
  async fn submission_form(&self, request: &RunRequest) -> Result<Form, WesError> {
    let mut form = Form::new()
      .text(
        "workflowType",
        request.workflow_type.clone().unwrap_or_default(),
      )
      .text(
        "workflowTypeVersion",
        request.workflow_type_version.clone().unwrap_or_default(),
      )
      // A non-file field is always present so the request stays
      // multipart even when the workflow source is a remote URL.
      .text(
        "labels",
        serde_json::json!({"submitted_via": "wesbridge"}).to_string(),
      );

    let workflow_url = request
      .workflow_url
      .as_deref()
      .ok_or_else(|| WesError::invalid_request("workflow_url is required"))?;

    let mut parts = if workflow_url.starts_with("s3://") {
      let workflow_type = request.workflow_type.as_deref().unwrap_or_default();
      stage_workflow(self.store.as_ref(), workflow_url, workflow_type).await?
    } else {
      SubmissionParts {
        workflow_url: Some(workflow_url.to_string()),
        ..SubmissionParts::default()
      }
    };

    // Inputs supplied as attachments take highest priority, so they go
    // last in the indexed list.
    let named_inputs = request
      .workflow_params
      .as_ref()
      .and_then(|params| params.get("workflowInputs"))
      .and_then(|v| v.as_str());
    if let Some(named) = named_inputs {
      for attachment in &request.workflow_attachment {
        if attachment.filename == named {
          parts.inputs.push(StagedFile {
            file_name: attachment.filename.clone(),
            data: attachment.data.clone(),
          });
        }
      }
    }

    if let Some(url) = parts.workflow_url {
      form = form.text("workflowUrl", url);
    }
    if let Some(source) = parts.source {
      form = form.part("workflowSource", to_part(source));
    }
    if parts.inputs.len() > MAX_WORKFLOW_INPUTS {
      return Err(WesError::invalid_request(
        "maximum number of workflow inputs files exceeded",
      ));
    }
    for (i, inputs) in parts.inputs.into_iter().enumerate() {
      let field = if i == 0 {
        "workflowInputs".to_string()
      } else {
        format!("workflowInputs_{}", i + 1)
      };
      form = form.part(field, to_part(inputs));
    }
    if let Some(options) = parts.options {
      form = form.part("workflowOptions", to_part(options));
    }
    if let Some(dependencies) = parts.dependencies {
      form = form.part("workflowDependencies", to_part(dependencies));
    }

    Ok(form)
  }
}

fn to_part(file: StagedFile) -> Part {
  Part::bytes(file.data.to_vec()).file_name(file.file_name)
}

#[derive(Debug, Deserialize)]
struct EngineRunId {
  id: String,
}

#[derive(Debug, Deserialize)]
struct EngineRunSummary {
  id: String,
  #[serde(default)]
  status: String,
}

#[derive(Debug, Deserialize)]
struct EngineQueryResponse {
  #[serde(default)]
  results: Vec<EngineRunSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmittedFiles {
  #[serde(default)]
  workflow_type: Option<String>,
  #[serde(default)]
  workflow_type_version: Option<String>,
  #[serde(default)]
  workflow_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallMetadata {
  #[serde(default)]
  job_id: Option<String>,
  #[serde(default)]
  command_line: Option<String>,
  #[serde(default)]
  start: Option<String>,
  #[serde(default)]
  end: Option<String>,
  #[serde(default)]
  stdout: Option<String>,
  #[serde(default)]
  stderr: Option<String>,
  #[serde(default)]
  return_code: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowMetadata {
  #[serde(default)]
  id: Option<String>,
  #[serde(default)]
  status: String,
  #[serde(default)]
  submitted_files: Option<SubmittedFiles>,
  #[serde(default)]
  calls: HashMap<String, Vec<CallMetadata>>,
}

/// One task log per call attempt, named `{call}|{job id}`.
fn call_logs(calls: HashMap<String, Vec<CallMetadata>>) -> Vec<Log> {
  let mut names: Vec<&String> = calls.keys().collect();
  names.sort();

  let mut logs = Vec::new();
  for name in names {
    for call in &calls[name] {
      logs.push(Log {
        name: Log::task_name(name, call.job_id.as_deref().unwrap_or("unknown")),
        cmd: call.command_line.clone().into_iter().collect(),
        start_time: call.start.clone(),
        end_time: call.end.clone(),
        stdout: call.stdout.clone(),
        stderr: call.stderr.clone(),
        exit_code: call.return_code,
      });
    }
  }
  logs
}

#[async_trait]
impl WesAdapter for CromwellAdapter {
  #[instrument(name = "run_workflow", skip_all, fields(engine = "cromwell"))]
  async fn run_workflow(&self, request: RunRequest) -> Result<RunId, WesError> {
    self.check_engine_healthy().await?;

    let form = self.submission_form(&request).await?;
    info!(url = %self.api_url, "submitting workflow to engine");

    let response = self
      .http
      .post(&self.api_url)
      .multipart(form)
      .send()
      .await
      .map_err(|e| WesError::internal_with("workflow submission failed", e))?;

    let status = response.status();
    if status.is_client_error() {
      return Err(WesError::invalid_request(format!("HTTP {}", status)));
    }
    if status.is_server_error() {
      return Err(WesError::internal(format!("HTTP {}", status)));
    }

    let submitted: EngineRunId = response
      .json()
      .await
      .map_err(|e| WesError::internal_with("engine returned an invalid submission response", e))?;
    info!(run_id = %submitted.id, "workflow submitted");
    Ok(RunId::new(submitted.id))
  }

  #[instrument(name = "cancel_run", skip(self), fields(engine = "cromwell"))]
  async fn cancel_run(&self, run_id: &str) -> Result<RunId, WesError> {
    let url = self.run_url(run_id, "abort");
    let response = self
      .http
      .post(&url)
      .send()
      .await
      .map_err(|e| WesError::internal_with(format!("failed to cancel run '{}'", run_id), e))?;
    let aborted: EngineRunId = response.json().await.map_err(|e| {
      WesError::internal_with(format!("failed to cancel run '{}'", run_id), e)
    })?;
    Ok(RunId::new(aborted.id))
  }

  #[instrument(name = "get_run_status", skip(self), fields(engine = "cromwell"))]
  async fn get_run_status(&self, run_id: &str) -> Result<Option<RunStatus>, WesError> {
    let (http_status, body) = self.get_json(&self.run_url(run_id, "status")).await?;
    let engine_status = body["status"].as_str().unwrap_or_default();
    Ok(Some(RunStatus {
      run_id: run_id.to_string(),
      state: remote_run_state(http_status, engine_status),
    }))
  }

  #[instrument(name = "get_run_log", skip(self), fields(engine = "cromwell"))]
  async fn get_run_log(&self, run_id: &str) -> Result<Option<RunLog>, WesError> {
    let (_, metadata) = self.get_json(&self.run_url(run_id, "metadata")).await?;
    let (_, outputs) = self.get_json(&self.run_url(run_id, "outputs")).await?;

    let metadata: WorkflowMetadata = serde_json::from_value(metadata).map_err(|e| {
      WesError::internal_with(format!("invalid metadata for run '{}'", run_id), e)
    })?;

    let state = remote_run_state(200, &metadata.status);

    // A failed lookup carries no submission details; report what is known.
    if metadata.id.is_none() || metadata.status == "fail" {
      warn!("engine returned no metadata for run");
      return Ok(Some(RunLog {
        run_id: run_id.to_string(),
        state,
        request: Some(RunRequest {
          workflow_params: Some(self.workflow_params.clone()),
          ..RunRequest::default()
        }),
        ..RunLog::default()
      }));
    }

    let submitted = metadata.submitted_files.unwrap_or_default();

    Ok(Some(RunLog {
      run_id: metadata.id.unwrap_or_else(|| run_id.to_string()),
      state,
      request: Some(RunRequest {
        workflow_params: Some(self.workflow_params.clone()),
        workflow_type: submitted.workflow_type,
        workflow_type_version: submitted.workflow_type_version,
        workflow_url: submitted.workflow_url,
        ..RunRequest::default()
      }),
      run_log: None,
      task_logs: call_logs(metadata.calls),
      outputs: Some(outputs),
    }))
  }

  #[instrument(name = "list_runs", skip(self), fields(engine = "cromwell"))]
  async fn list_runs(
    &self,
    _page_size: Option<i32>,
    _page_token: Option<&str>,
  ) -> Result<RunListResponse, WesError> {
    // The engine's query endpoint carries no page token to pass through.
    let url = format!("{}/query", self.api_url);
    let (http_status, body) = self.get_json(&url).await?;
    let query: EngineQueryResponse = serde_json::from_value(body)
      .map_err(|e| WesError::internal_with("invalid engine query response", e))?;

    let runs = query
      .results
      .into_iter()
      .map(|run| RunStatus {
        run_id: run.id,
        state: remote_run_state(http_status, &run.status),
      })
      .collect();

    Ok(RunListResponse {
      runs,
      next_page_token: None,
    })
  }

  fn workflow_type_versions(&self) -> &WorkflowTypeVersions {
    &self.workflow_type_versions
  }

  async fn get_service_info(&self) -> ServiceInfo {
    let healthy = self.check_engine_healthy().await.is_ok();
    ServiceInfo {
      supported_wes_versions: self.supported_wes_versions(),
      workflow_type_versions: self.workflow_type_versions.clone(),
      tags: Some(serde_json::json!({
        "name": "remote_cromwell_wes_adapter",
        "description": "WES adapter for a Cromwell workflow engine service.",
        "updated_at": chrono::Utc::now().to_rfc3339(),
        "engine_service_health": healthy.to_string(),
      })),
    }
  }
}
