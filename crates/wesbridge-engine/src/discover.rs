//! Child-task discovery strategies shared by the engine variants.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use wesbridge_aws::{
  JobClient, JobDetail, LogQueryClient, QueryStatus, ResourceTagIndex, ResultField,
  StartQueryRequest, TagFilter,
};

use crate::describe::describe_jobs;
use crate::error::WesError;
use crate::time::now_millis;

/// Tag key engines set on child jobs to link them to their head job.
pub const PARENT_JOB_TAG_KEY: &str = "AWS_BATCH_PARENT_JOB_ID";

/// Resource type the tag index is scoped to.
const BATCH_JOB_RESOURCE_TYPE: &str = "batch:job";

/// Interval between log-query status polls.
const QUERY_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Record limit for one log query.
const QUERY_RESULT_LIMIT: i32 = 100;

/// Discovers child jobs through the resource tag index: every job carrying
/// the parent-job tag equal to the head job's id is a child task.
pub struct TaggedJobDiscovery {
  jobs: Arc<dyn JobClient>,
  tags: Arc<dyn ResourceTagIndex>,
}

impl TaggedJobDiscovery {
  pub fn new(jobs: Arc<dyn JobClient>, tags: Arc<dyn ResourceTagIndex>) -> Self {
    Self { jobs, tags }
  }

  /// Descriptions of all jobs tagged as children of the given job.
  ///
  /// Pages through the tag index until no continuation token is returned,
  /// then batch-describes the collected id set. Zero tagged resources is
  /// an empty list, not an error.
  pub async fn child_jobs(&self, parent_job_id: &str) -> Result<Vec<JobDetail>, WesError> {
    let tag_filters = [TagFilter::new(PARENT_JOB_TAG_KEY, parent_job_id)];
    let resource_types = [BATCH_JOB_RESOURCE_TYPE.to_string()];

    let mut job_ids = Vec::new();
    let mut pagination_token: Option<String> = None;
    loop {
      let page = self
        .tags
        .get_resources(&tag_filters, &resource_types, pagination_token.as_deref())
        .await
        .map_err(|e| {
          WesError::internal_with(
            format!("failed to look up jobs tagged to parent '{}'", parent_job_id),
            e,
          )
        })?;

      job_ids.extend(page.resource_arns.iter().map(|arn| job_id_from_arn(arn)));

      pagination_token = page.pagination_token.filter(|t| !t.is_empty());
      if pagination_token.is_none() {
        break;
      }
    }

    Ok(describe_jobs(&self.jobs, job_ids).await)
  }
}

/// The job id is the trailing path segment of the resource identifier.
fn job_id_from_arn(arn: &str) -> String {
  arn.rsplit('/').next().unwrap_or(arn).to_string()
}

/// Discovers child jobs by querying the engine's own log output.
///
/// The engine process writes one line per spawned child job; a structured
/// query over the head job's log stream recovers the child job ids.
pub struct LogQueryDiscovery {
  jobs: Arc<dyn JobClient>,
  logs: Arc<dyn LogQueryClient>,
  log_group: String,
}

impl LogQueryDiscovery {
  pub fn new(
    jobs: Arc<dyn JobClient>,
    logs: Arc<dyn LogQueryClient>,
    log_group: impl Into<String>,
  ) -> Self {
    Self {
      jobs,
      logs,
      log_group: log_group.into(),
    }
  }

  /// Run a structured query over the head job's lifetime window.
  ///
  /// Returns one field map per matched record with the `@ptr` pseudo-field
  /// dropped. A head job that has not started yields an empty result
  /// without touching the query service. A submission failure propagates
  /// as-is; a query that terminates in any status other than complete is a
  /// server fault.
  pub async fn query_job_logs(
    &self,
    head_job: &JobDetail,
    query_string: String,
  ) -> Result<Vec<HashMap<String, String>>, WesError> {
    let Some(start_time) = head_job.started_at else {
      // Not started: no tasks can have been created yet.
      return Ok(Vec::new());
    };
    let end_time = head_job.stopped_at.unwrap_or_else(now_millis);

    let query_id = self
      .logs
      .start_query(StartQueryRequest {
        log_group: self.log_group.clone(),
        start_time,
        end_time,
        query_string,
        limit: QUERY_RESULT_LIMIT,
      })
      .await
      .map_err(|e| WesError::internal_with("failed to start log query", e))?;

    loop {
      info!(query_id = %query_id, "waiting for log query to complete");
      tokio::time::sleep(QUERY_POLL_INTERVAL).await;

      let results = self
        .logs
        .get_query_results(&query_id)
        .await
        .map_err(|e| {
          WesError::internal_with(format!("failed to poll log query '{}'", query_id), e)
        })?;

      if results.status.is_pending() {
        continue;
      }
      if results.status != QueryStatus::Complete {
        return Err(WesError::internal(format!(
          "log query '{}' was not successful",
          query_id
        )));
      }
      return Ok(results.results.into_iter().map(record_to_map).collect());
    }
  }

  /// Child job descriptions recovered from log records.
  ///
  /// The query is expected to project a `jobId` field; records without one
  /// are skipped and the collected ids are batch-described.
  pub async fn child_jobs(
    &self,
    head_job: &JobDetail,
    query_string: String,
  ) -> Result<Vec<JobDetail>, WesError> {
    if head_job.container.log_stream_name.is_none() {
      return Ok(Vec::new());
    }
    let records = self.query_job_logs(head_job, query_string).await?;
    let job_ids: Vec<String> = records
      .into_iter()
      .filter_map(|mut record| record.remove("jobId"))
      .collect();
    Ok(describe_jobs(&self.jobs, job_ids).await)
  }
}

/// Log query records arrive as field/value lists; fold each into a map,
/// dropping the `@ptr` pseudo-field.
fn record_to_map(fields: Vec<ResultField>) -> HashMap<String, String> {
  fields
    .into_iter()
    .filter(|f| f.field != "@ptr")
    .map(|f| (f.field, f.value))
    .collect()
}
