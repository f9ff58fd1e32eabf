//! Generic batch-backed run orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use wesbridge_aws::{JobClient, JobDetail, ListJobsRequest, SubmitJobRequest};
use wesbridge_model::{
  Log, RunId, RunListResponse, RunLog, RunRequest, RunStatus, WorkflowTypeVersions,
};

use crate::adapter::WesAdapter;
use crate::describe::describe_jobs;
use crate::error::WesError;
use crate::state::{USER_CANCELLATION_REASON, batch_run_state};
use crate::time::to_rfc3339;

/// Name given to every submitted head job.
pub const RUN_WORKFLOW_JOB_NAME: &str = "wesbridge-run-workflow";

/// Page size used when a list request does not specify one.
const DEFAULT_PAGE_SIZE: i32 = 50;

/// The engine-specific half of a batch-backed adapter.
///
/// One implementation per workflow engine: command construction, optional
/// environment overrides, child-task discovery and output retrieval. The
/// shared run lifecycle lives in [`BatchAdapter`].
#[async_trait]
pub trait BatchEngine: Send + Sync {
  /// Engine label for logs and diagnostics.
  fn name(&self) -> &'static str;

  /// Build the container command for a submission.
  fn command(&self, request: &RunRequest) -> Vec<String>;

  /// Environment overrides for the head job.
  fn environment(&self) -> HashMap<String, String> {
    HashMap::new()
  }

  /// Workflow types and versions this engine accepts.
  fn workflow_type_versions(&self) -> &WorkflowTypeVersions;

  /// Discover the child task jobs of a head job, in engine-defined order.
  async fn child_tasks(&self, head_job: &JobDetail) -> Result<Vec<JobDetail>, WesError>;

  /// Retrieve engine-specific outputs for a head job, if any.
  async fn task_outputs(&self, head_job: &JobDetail)
  -> Result<Option<serde_json::Value>, WesError>;
}

/// Batch-backed WES adapter, generic over the engine variant.
///
/// Owns the job client plus the queue and job definition every head job is
/// submitted to. Stateless between calls: every lookup reads live backend
/// state.
pub struct BatchAdapter<E> {
  engine: E,
  jobs: Arc<dyn JobClient>,
  job_queue: String,
  job_definition: String,
}

impl<E: BatchEngine> BatchAdapter<E> {
  pub fn new(
    engine: E,
    jobs: Arc<dyn JobClient>,
    job_queue: impl Into<String>,
    job_definition: impl Into<String>,
  ) -> Self {
    Self {
      engine,
      jobs,
      job_queue: job_queue.into(),
      job_definition: job_definition.into(),
    }
  }

  /// Describe a single job. Absent when the backend does not know the id
  /// or the describe call degrades.
  async fn describe_job(&self, job_id: &str) -> Option<JobDetail> {
    describe_jobs(&self.jobs, vec![job_id.to_string()])
      .await
      .into_iter()
      .next()
  }
}

/// Convert a job description into a log record. The name is the composite
/// of the job's label and its backend id.
fn to_log(job: &JobDetail) -> Log {
  Log {
    name: Log::task_name(&job.job_name, &job.job_id),
    cmd: job.container.command.clone(),
    start_time: to_rfc3339(job.started_at),
    end_time: to_rfc3339(job.stopped_at),
    stdout: job.container.log_stream_name.clone(),
    stderr: None,
    exit_code: job.container.exit_code,
  }
}

fn to_run_status(job_id: &str, status: &str, status_reason: Option<&str>) -> RunStatus {
  RunStatus {
    run_id: job_id.to_string(),
    state: batch_run_state(status, status_reason.unwrap_or("")),
  }
}

#[async_trait]
impl<E: BatchEngine> WesAdapter for BatchAdapter<E> {
  #[instrument(name = "run_workflow", skip_all, fields(engine = self.engine.name()))]
  async fn run_workflow(&self, request: RunRequest) -> Result<RunId, WesError> {
    let command = self.engine.command(&request);
    let environment = self.engine.environment();
    info!(?command, "submitting workflow job");

    let job_id = self
      .jobs
      .submit_job(SubmitJobRequest {
        job_name: RUN_WORKFLOW_JOB_NAME.to_string(),
        job_queue: self.job_queue.clone(),
        job_definition: self.job_definition.clone(),
        command,
        environment,
      })
      .await
      .map_err(|e| WesError::internal_with("failed to submit workflow job", e))?;

    info!(run_id = %job_id, "workflow job submitted");
    Ok(RunId::new(job_id))
  }

  #[instrument(name = "cancel_run", skip(self), fields(engine = self.engine.name()))]
  async fn cancel_run(&self, run_id: &str) -> Result<RunId, WesError> {
    self
      .jobs
      .terminate_job(run_id, USER_CANCELLATION_REASON)
      .await
      .map_err(|e| {
        WesError::internal_with(format!("failed to cancel run '{}'", run_id), e)
      })?;

    info!("run canceled");
    Ok(RunId::new(run_id))
  }

  #[instrument(name = "get_run_status", skip(self), fields(engine = self.engine.name()))]
  async fn get_run_status(&self, run_id: &str) -> Result<Option<RunStatus>, WesError> {
    let Some(job) = self.describe_job(run_id).await else {
      return Ok(None);
    };
    Ok(Some(to_run_status(
      &job.job_id,
      &job.status,
      job.status_reason.as_deref(),
    )))
  }

  #[instrument(name = "get_run_log", skip(self), fields(engine = self.engine.name()))]
  async fn get_run_log(&self, run_id: &str) -> Result<Option<RunLog>, WesError> {
    let Some(head_job) = self.describe_job(run_id).await else {
      return Ok(None);
    };

    let child_jobs = self.engine.child_tasks(&head_job).await.map_err(|e| {
      WesError::internal_with(format!("failed to load child tasks for run '{}'", run_id), e)
    })?;
    let task_logs = child_jobs.iter().map(to_log).collect();

    let outputs = self.engine.task_outputs(&head_job).await.map_err(|e| {
      WesError::internal_with(format!("failed to load outputs for run '{}'", run_id), e)
    })?;

    Ok(Some(RunLog {
      run_id: run_id.to_string(),
      state: batch_run_state(
        &head_job.status,
        head_job.status_reason.as_deref().unwrap_or(""),
      ),
      request: None,
      run_log: Some(to_log(&head_job)),
      task_logs,
      outputs,
    }))
  }

  #[instrument(name = "list_runs", skip(self), fields(engine = self.engine.name()))]
  async fn list_runs(
    &self,
    page_size: Option<i32>,
    page_token: Option<&str>,
  ) -> Result<RunListResponse, WesError> {
    let page = self
      .jobs
      .list_jobs(ListJobsRequest {
        job_queue: self.job_queue.clone(),
        job_definition: self.job_definition.clone(),
        max_results: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        next_token: page_token.filter(|t| !t.is_empty()).map(String::from),
      })
      .await
      .map_err(|e| WesError::internal_with("failed to list runs", e))?;

    let runs = page
      .job_summaries
      .iter()
      .map(|s| to_run_status(&s.job_id, &s.status, s.status_reason.as_deref()))
      .collect();

    Ok(RunListResponse {
      runs,
      next_page_token: page.next_token,
    })
  }

  fn workflow_type_versions(&self) -> &WorkflowTypeVersions {
    self.engine.workflow_type_versions()
  }
}
