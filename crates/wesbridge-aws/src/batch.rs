use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ClientError;

/// Container-level detail of a batch job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDetail {
  /// Command the container runs (after any submit-time override).
  pub command: Vec<String>,
  /// Name of the log stream the container writes to, once started.
  pub log_stream_name: Option<String>,
  /// Exit code, once the container has exited.
  pub exit_code: Option<i32>,
}

/// Full description of a batch job, as returned by a describe call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDetail {
  pub job_id: String,
  pub job_name: String,
  /// Backend status vocabulary, e.g. SUBMITTED, RUNNABLE, RUNNING, FAILED.
  pub status: String,
  /// Human-readable reason accompanying the status, when the backend set one.
  pub status_reason: Option<String>,
  /// Epoch milliseconds at which the job started, once started.
  pub started_at: Option<i64>,
  /// Epoch milliseconds at which the job stopped, once stopped.
  pub stopped_at: Option<i64>,
  pub container: ContainerDetail,
}

/// Abbreviated description of a batch job, as returned by a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
  pub job_id: String,
  pub status: String,
  pub status_reason: Option<String>,
}

/// A job submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitJobRequest {
  pub job_name: String,
  pub job_queue: String,
  pub job_definition: String,
  /// Command override for the job's container.
  pub command: Vec<String>,
  /// Environment overrides for the job's container.
  pub environment: HashMap<String, String>,
}

/// A paginated list request scoped to one queue and job definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListJobsRequest {
  pub job_queue: String,
  pub job_definition: String,
  pub max_results: i32,
  pub next_token: Option<String>,
}

/// One page of job summaries plus the continuation token, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListJobsPage {
  pub job_summaries: Vec<JobSummary>,
  pub next_token: Option<String>,
}

/// The batch job backend.
///
/// Submit, terminate, batch-describe and list jobs. Implementations wrap
/// the cloud SDK client; wesbridge only depends on this contract.
#[async_trait]
pub trait JobClient: Send + Sync {
  /// Submit a job and return the backend-assigned job id.
  async fn submit_job(&self, request: SubmitJobRequest) -> Result<String, ClientError>;

  /// Terminate a job, recording the given reason.
  async fn terminate_job(&self, job_id: &str, reason: &str) -> Result<(), ClientError>;

  /// Describe up to 100 jobs by id. Unknown ids are silently absent from
  /// the result.
  async fn describe_jobs(&self, job_ids: &[String]) -> Result<Vec<JobDetail>, ClientError>;

  /// List jobs in a queue filtered by job definition, one page at a time.
  async fn list_jobs(&self, request: ListJobsRequest) -> Result<ListJobsPage, ClientError>;
}
