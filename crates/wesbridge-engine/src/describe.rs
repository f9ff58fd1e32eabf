//! Concurrent multi-id job description.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::error;

use wesbridge_aws::{JobClient, JobDetail};

/// Ids per describe call.
const DESCRIBE_CHUNK_SIZE: usize = 100;
/// Concurrent describe calls in flight.
const DESCRIBE_CONCURRENCY: usize = 10;
/// Per-call deadline.
const DESCRIBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Describe a set of jobs, chunked into groups of 100 issued over a
/// bounded concurrent fan-out.
///
/// Best-effort: a group that fails or times out is logged and omitted
/// from the aggregate, so the result may cover fewer jobs than were
/// requested. Each group owns a disjoint id partition; results are merged
/// at join time in completion order.
pub async fn describe_jobs(client: &Arc<dyn JobClient>, job_ids: Vec<String>) -> Vec<JobDetail> {
  if job_ids.is_empty() {
    return Vec::new();
  }

  let chunks: Vec<Vec<String>> = job_ids
    .chunks(DESCRIBE_CHUNK_SIZE)
    .map(|chunk| chunk.to_vec())
    .collect();

  futures::stream::iter(chunks)
    .map(|chunk| {
      let client = Arc::clone(client);
      async move {
        match tokio::time::timeout(DESCRIBE_TIMEOUT, client.describe_jobs(&chunk)).await {
          Ok(Ok(jobs)) => jobs,
          Ok(Err(e)) => {
            error!(error = %e, jobs = chunk.len(), "error retrieving jobs");
            Vec::new()
          }
          Err(_) => {
            error!(jobs = chunk.len(), "timed out retrieving jobs");
            Vec::new()
          }
        }
      }
    })
    .buffer_unordered(DESCRIBE_CONCURRENCY)
    .concat()
    .await
}
