//! Snakemake engine variant.
//!
//! The head-job command carries the batch-backend flags Snakemake needs to
//! schedule its own rules as child jobs. Child-task discovery and output
//! retrieval use the tag index and object store when an output location is
//! configured; without one they are explicit placeholders that report no
//! children and no outputs.

use async_trait::async_trait;

use wesbridge_aws::JobDetail;
use wesbridge_model::{RunRequest, WorkflowTypeVersions};

use crate::batch::BatchEngine;
use crate::discover::TaggedJobDiscovery;
use crate::error::WesError;
use crate::outputs::StoredOutputs;

/// Backend settings rendered into every submitted command.
#[derive(Debug, Clone, Default)]
pub struct SnakemakeBatchConfig {
  /// Queue the engine submits its rule jobs to.
  pub task_queue: String,
  /// Role the rule jobs assume.
  pub workflow_role: String,
  /// Shared filesystem access point id.
  pub filesystem_access_point: String,
}

/// Tag-index discovery plus object-store outputs, wired only when the
/// deployment configures an output location.
pub struct SnakemakeBatchWiring {
  pub discovery: TaggedJobDiscovery,
  pub outputs: StoredOutputs,
}

pub struct SnakemakeEngine {
  config: SnakemakeBatchConfig,
  batch: Option<SnakemakeBatchWiring>,
  workflow_type_versions: WorkflowTypeVersions,
}

impl SnakemakeEngine {
  pub fn new(config: SnakemakeBatchConfig, batch: Option<SnakemakeBatchWiring>) -> Self {
    Self {
      config,
      batch,
      workflow_type_versions: WorkflowTypeVersions::from_entries([("SNAKEMAKE", ["1.0"])]),
    }
  }
}

#[async_trait]
impl BatchEngine for SnakemakeEngine {
  fn name(&self) -> &'static str {
    "snakemake"
  }

  /// The workflow URL followed by one joined argument: passthrough engine
  /// parameters first, then the fixed backend flags.
  fn command(&self, request: &RunRequest) -> Vec<String> {
    let mut engine_args: Vec<String> = Vec::new();
    if let Some(params) = &request.workflow_engine_parameters {
      match params {
        serde_json::Value::String(s) => engine_args.push(s.clone()),
        other => engine_args.push(other.to_string()),
      }
    }
    engine_args.extend([
      "--aws-batch".to_string(),
      "--cores all".to_string(),
      format!("--aws-batch-workflow-role {}", self.config.workflow_role),
      format!("--aws-batch-task-queue {}", self.config.task_queue),
      format!("--aws-batch-fsap-id {}", self.config.filesystem_access_point),
    ]);

    vec![
      request.workflow_url.clone().unwrap_or_default(),
      engine_args.join(" "),
    ]
  }

  fn workflow_type_versions(&self) -> &WorkflowTypeVersions {
    &self.workflow_type_versions
  }

  async fn child_tasks(&self, head_job: &JobDetail) -> Result<Vec<JobDetail>, WesError> {
    match &self.batch {
      Some(wiring) => wiring.discovery.child_jobs(&head_job.job_id).await,
      None => Ok(Vec::new()),
    }
  }

  async fn task_outputs(
    &self,
    head_job: &JobDetail,
  ) -> Result<Option<serde_json::Value>, WesError> {
    match &self.batch {
      Some(wiring) => {
        let outputs = wiring.outputs.for_job(&head_job.job_id).await?;
        Ok(Some(serde_json::json!({
          "id": head_job.job_id,
          "outputs": outputs,
        })))
      }
      None => Ok(None),
    }
  }
}
