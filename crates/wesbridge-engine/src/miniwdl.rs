//! MiniWDL engine variant.
//!
//! MiniWDL tags every child job with its parent job id, so discovery goes
//! through the resource tag index; run outputs are a JSON object the
//! engine writes under a per-job prefix in the object store.

use async_trait::async_trait;

use wesbridge_aws::JobDetail;
use wesbridge_model::{RunRequest, WorkflowTypeVersions};

use crate::batch::BatchEngine;
use crate::discover::TaggedJobDiscovery;
use crate::error::WesError;
use crate::outputs::StoredOutputs;

pub struct MiniwdlEngine {
  discovery: TaggedJobDiscovery,
  outputs: StoredOutputs,
  workflow_type_versions: WorkflowTypeVersions,
}

impl MiniwdlEngine {
  pub fn new(discovery: TaggedJobDiscovery, outputs: StoredOutputs) -> Self {
    Self {
      discovery,
      outputs,
      workflow_type_versions: WorkflowTypeVersions::from_entries([(
        "WDL",
        ["1.0", "draft-2"],
      )]),
    }
  }
}

#[async_trait]
impl BatchEngine for MiniwdlEngine {
  fn name(&self) -> &'static str {
    "miniwdl"
  }

  fn command(&self, request: &RunRequest) -> Vec<String> {
    vec![request.workflow_url.clone().unwrap_or_default()]
  }

  fn workflow_type_versions(&self) -> &WorkflowTypeVersions {
    &self.workflow_type_versions
  }

  async fn child_tasks(&self, head_job: &JobDetail) -> Result<Vec<JobDetail>, WesError> {
    self.discovery.child_jobs(&head_job.job_id).await
  }

  async fn task_outputs(
    &self,
    head_job: &JobDetail,
  ) -> Result<Option<serde_json::Value>, WesError> {
    let outputs = self.outputs.for_job(&head_job.job_id).await?;
    Ok(Some(serde_json::json!({
      "id": head_job.job_id,
      "outputs": outputs,
    })))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use serde_json::json;
  use wesbridge_aws::mock::{MemoryObjectStore, MockJobClient, MockResourceTagIndex};
  use wesbridge_aws::ResourcePage;

  use crate::outputs::OutputLocation;

  struct Fixture {
    jobs: Arc<MockJobClient>,
    tags: Arc<MockResourceTagIndex>,
    store: Arc<MemoryObjectStore>,
    engine: MiniwdlEngine,
  }

  fn fixture() -> Fixture {
    let jobs = Arc::new(MockJobClient::new());
    let tags = Arc::new(MockResourceTagIndex::new());
    let store = Arc::new(MemoryObjectStore::new());
    let engine = MiniwdlEngine::new(
      TaggedJobDiscovery::new(jobs.clone(), tags.clone()),
      StoredOutputs::new(
        store.clone(),
        OutputLocation::parse("s3://wf-outputs/runs").unwrap(),
      ),
    );
    Fixture {
      jobs,
      tags,
      store,
      engine,
    }
  }

  fn head_job() -> JobDetail {
    JobDetail {
      job_id: "head-1".to_string(),
      job_name: "wesbridge-run-workflow".to_string(),
      status: "SUCCEEDED".to_string(),
      ..JobDetail::default()
    }
  }

  #[test]
  fn command_is_the_workflow_url() {
    let f = fixture();
    let request = RunRequest::from_url("s3://bucket/wf.wdl");
    assert_eq!(f.engine.command(&request), vec!["s3://bucket/wf.wdl"]);
  }

  #[test]
  fn registry_accepts_wdl_versions() {
    let f = fixture();
    assert!(f.engine.workflow_type_versions().supports("wdl", " 1.0 "));
    assert!(f.engine.workflow_type_versions().supports("WDL", "draft-2"));
    assert!(!f.engine.workflow_type_versions().supports("WDL", "2.0"));
  }

  #[tokio::test]
  async fn child_tasks_come_from_the_tag_index() {
    let f = fixture();
    f.jobs.insert_job(JobDetail {
      job_id: "child-1".to_string(),
      job_name: "child_task".to_string(),
      status: "RUNNING".to_string(),
      ..JobDetail::default()
    });
    f.tags.enqueue_page(ResourcePage {
      resource_arns: vec!["arn:aws:batch:job/child-1".to_string()],
      pagination_token: None,
    });

    let children = f.engine.child_tasks(&head_job()).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].job_id, "child-1");
  }

  #[tokio::test]
  async fn outputs_read_the_per_job_object() {
    let f = fixture();
    f.store.put_object(
      "wf-outputs",
      "runs/head-1/outputs.json",
      br#"{"calls":3}"#.as_slice(),
    );

    let outputs = f.engine.task_outputs(&head_job()).await.unwrap().unwrap();
    assert_eq!(outputs, json!({"id": "head-1", "outputs": {"calls": 3}}));
  }

  #[tokio::test]
  async fn missing_outputs_object_yields_null_outputs() {
    let f = fixture();
    let outputs = f.engine.task_outputs(&head_job()).await.unwrap().unwrap();
    assert_eq!(outputs, json!({"id": "head-1", "outputs": null}));
  }
}
