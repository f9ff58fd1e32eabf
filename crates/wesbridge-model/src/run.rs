use serde::{Deserialize, Serialize};

use crate::registry::WorkflowTypeVersions;
use crate::request::RunRequest;
use crate::state::RunState;

/// Identifier of a workflow run. Runs are keyed by the backend job id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunId {
  pub run_id: String,
}

impl RunId {
  pub fn new(run_id: impl Into<String>) -> Self {
    Self {
      run_id: run_id.into(),
    }
  }
}

/// Abbreviated status of a run: its id and canonical state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatus {
  pub run_id: String,
  pub state: RunState,
}

/// Log record for the head job or one child task.
///
/// The name is a composite of the task label and the backend job id,
/// pipe-delimited. Start and end times are RFC 3339 strings when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
  pub name: String,
  pub cmd: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_time: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end_time: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stdout: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stderr: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exit_code: Option<i32>,
}

impl Log {
  /// Compose the pipe-delimited task name expected by consumers.
  pub fn task_name(label: &str, job_id: &str) -> String {
    format!("{}|{}", label, job_id)
  }
}

/// Detailed information about a run: overall state, the head-job log, one
/// log per child task in discovery order, and engine-specific outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
  pub run_id: String,
  pub state: RunState,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request: Option<RunRequest>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub run_log: Option<Log>,
  pub task_logs: Vec<Log>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub outputs: Option<serde_json::Value>,
}

/// One page of runs plus the backend continuation token, returned verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunListResponse {
  pub runs: Vec<RunStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_page_token: Option<String>,
}

/// Service descriptor: supported WES API versions plus the workflow-type
/// registry of the active engine adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
  pub supported_wes_versions: Vec<String>,
  pub workflow_type_versions: WorkflowTypeVersions,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<serde_json::Value>,
}
