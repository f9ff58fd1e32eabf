//! Nextflow engine variant.
//!
//! Nextflow runs as a head job whose process log records every child job
//! it submits, so child-task discovery and output retrieval are both log
//! queries over the head job's stream.

use async_trait::async_trait;

use wesbridge_aws::JobDetail;
use wesbridge_model::{RunRequest, WorkflowTypeVersions};

use crate::batch::BatchEngine;
use crate::discover::LogQueryDiscovery;
use crate::error::WesError;

/// Version string that switches the workflow to DSL 2.
const DSL2_VERSION: &str = "dsl2";

pub struct NextflowEngine {
  discovery: LogQueryDiscovery,
  workflow_type_versions: WorkflowTypeVersions,
}

impl NextflowEngine {
  pub fn new(discovery: LogQueryDiscovery) -> Self {
    Self {
      discovery,
      workflow_type_versions: WorkflowTypeVersions::from_entries([(
        "NEXTFLOW",
        ["1.0", DSL2_VERSION],
      )]),
    }
  }
}

/// Query recovering the child job ids the engine logged at submission.
fn child_jobs_query(log_stream: &str) -> String {
  format!(
    "fields @message, @logStream\n\
     | filter @logStream = \"{}\"\n\
     | filter @message like /\\[AWS BATCH\\] submitted/\n\
     | parse 'job=*;' as jobId\n\
     | stats latest(@ingestionTime) by jobId\n\
     | display jobId",
    log_stream
  )
}

/// Query recovering per-task completion records.
fn task_completion_query(log_stream: &str) -> String {
  format!(
    "fields @message, @logStream\n\
     | filter @logStream = \"{}\"\n\
     | filter @message like /TaskPollingMonitor - Task completed/\n\
     | parse 'name: *;' as name\n\
     | parse 'id: *;' as id\n\
     | parse 'status: *;' as status\n\
     | parse 'exit: *;' as exit\n\
     | parse 'error: *;' as error\n\
     | parse 'workDir: *]' as workDir\n\
     | display id, name, status, exit, error, workDir",
    log_stream
  )
}

#[async_trait]
impl BatchEngine for NextflowEngine {
  fn name(&self) -> &'static str {
    "nextflow"
  }

  fn command(&self, request: &RunRequest) -> Vec<String> {
    let mut command = vec![request.workflow_url.clone().unwrap_or_default()];
    if request.workflow_type_version.as_deref() == Some(DSL2_VERSION) {
      command.push("-dsl2".to_string());
    }
    command
  }

  fn workflow_type_versions(&self) -> &WorkflowTypeVersions {
    &self.workflow_type_versions
  }

  async fn child_tasks(&self, head_job: &JobDetail) -> Result<Vec<JobDetail>, WesError> {
    let Some(log_stream) = head_job.container.log_stream_name.as_deref() else {
      return Ok(Vec::new());
    };
    self
      .discovery
      .child_jobs(head_job, child_jobs_query(log_stream))
      .await
  }

  async fn task_outputs(
    &self,
    head_job: &JobDetail,
  ) -> Result<Option<serde_json::Value>, WesError> {
    let records = match head_job.container.log_stream_name.as_deref() {
      Some(log_stream) => {
        self
          .discovery
          .query_job_logs(head_job, task_completion_query(log_stream))
          .await?
      }
      None => Vec::new(),
    };
    Ok(Some(serde_json::json!({
      "id": head_job.job_id,
      "outputs": records,
    })))
  }
}
