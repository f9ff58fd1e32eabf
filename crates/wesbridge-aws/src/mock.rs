//! In-memory mock implementations of the backend contracts.
//!
//! Used by the adapter test suites: responses are programmable ahead of a
//! call and every call is recorded for assertions. Mocks tolerate
//! concurrent use; recorded call order follows scheduling order.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::batch::{JobClient, JobDetail, ListJobsPage, ListJobsRequest, SubmitJobRequest};
use crate::error::ClientError;
use crate::logs::{LogQueryClient, QueryResults, StartQueryRequest};
use crate::store::{ByteStream, ObjectStore};
use crate::tags::{ResourcePage, ResourceTagIndex, TagFilter};

/// Mock batch job backend.
///
/// Describe calls look jobs up in a registered map, so results stay
/// deterministic under concurrent fan-out. A describe batch containing the
/// poisoned job id fails instead.
#[derive(Default)]
pub struct MockJobClient {
  jobs: Mutex<HashMap<String, JobDetail>>,
  submit_ids: Mutex<VecDeque<String>>,
  list_pages: Mutex<VecDeque<ListJobsPage>>,
  fail_describe_containing: Mutex<Option<String>>,
  fail_terminate: Mutex<bool>,
  pub submitted: Mutex<Vec<SubmitJobRequest>>,
  pub terminated: Mutex<Vec<(String, String)>>,
  pub describe_batches: Mutex<Vec<Vec<String>>>,
  pub list_requests: Mutex<Vec<ListJobsRequest>>,
}

impl MockJobClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a job for describe lookups.
  pub fn insert_job(&self, job: JobDetail) {
    self.jobs.lock().unwrap().insert(job.job_id.clone(), job);
  }

  /// Queue the id returned by the next submit call.
  pub fn enqueue_submit_id(&self, job_id: impl Into<String>) {
    self.submit_ids.lock().unwrap().push_back(job_id.into());
  }

  /// Queue the page returned by the next list call.
  pub fn enqueue_list_page(&self, page: ListJobsPage) {
    self.list_pages.lock().unwrap().push_back(page);
  }

  /// Make any describe batch containing this id fail.
  pub fn fail_describe_containing(&self, job_id: impl Into<String>) {
    *self.fail_describe_containing.lock().unwrap() = Some(job_id.into());
  }

  /// Make terminate calls fail.
  pub fn fail_terminate(&self) {
    *self.fail_terminate.lock().unwrap() = true;
  }
}

#[async_trait]
impl JobClient for MockJobClient {
  async fn submit_job(&self, request: SubmitJobRequest) -> Result<String, ClientError> {
    self.submitted.lock().unwrap().push(request);
    self
      .submit_ids
      .lock()
      .unwrap()
      .pop_front()
      .ok_or_else(|| ClientError::service("no submit id queued"))
  }

  async fn terminate_job(&self, job_id: &str, reason: &str) -> Result<(), ClientError> {
    if *self.fail_terminate.lock().unwrap() {
      return Err(ClientError::service("terminate failed"));
    }
    self
      .terminated
      .lock()
      .unwrap()
      .push((job_id.to_string(), reason.to_string()));
    Ok(())
  }

  async fn describe_jobs(&self, job_ids: &[String]) -> Result<Vec<JobDetail>, ClientError> {
    self.describe_batches.lock().unwrap().push(job_ids.to_vec());
    if let Some(poison) = self.fail_describe_containing.lock().unwrap().as_deref()
      && job_ids.iter().any(|id| id == poison)
    {
      return Err(ClientError::service("describe failed"));
    }
    let jobs = self.jobs.lock().unwrap();
    Ok(
      job_ids
        .iter()
        .filter_map(|id| jobs.get(id).cloned())
        .collect(),
    )
  }

  async fn list_jobs(&self, request: ListJobsRequest) -> Result<ListJobsPage, ClientError> {
    self.list_requests.lock().unwrap().push(request);
    Ok(self.list_pages.lock().unwrap().pop_front().unwrap_or_default())
  }
}

/// Mock resource tag index returning queued pages in order.
#[derive(Default)]
pub struct MockResourceTagIndex {
  pages: Mutex<VecDeque<ResourcePage>>,
  fail: Mutex<bool>,
  pub requests: Mutex<Vec<(Vec<TagFilter>, Option<String>)>>,
}

impl MockResourceTagIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn enqueue_page(&self, page: ResourcePage) {
    self.pages.lock().unwrap().push_back(page);
  }

  pub fn fail(&self) {
    *self.fail.lock().unwrap() = true;
  }
}

#[async_trait]
impl ResourceTagIndex for MockResourceTagIndex {
  async fn get_resources(
    &self,
    tag_filters: &[TagFilter],
    _resource_type_filters: &[String],
    pagination_token: Option<&str>,
  ) -> Result<ResourcePage, ClientError> {
    self
      .requests
      .lock()
      .unwrap()
      .push((tag_filters.to_vec(), pagination_token.map(String::from)));
    if *self.fail.lock().unwrap() {
      return Err(ClientError::service("get resources failed"));
    }
    Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
  }
}

/// Mock log query service with a scripted poll sequence.
#[derive(Default)]
pub struct MockLogQueryClient {
  results: Mutex<VecDeque<QueryResults>>,
  fail_start: Mutex<bool>,
  pub started: Mutex<Vec<StartQueryRequest>>,
}

impl MockLogQueryClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queue the result returned by the next poll.
  pub fn enqueue_results(&self, results: QueryResults) {
    self.results.lock().unwrap().push_back(results);
  }

  /// Make query submission fail.
  pub fn fail_start(&self) {
    *self.fail_start.lock().unwrap() = true;
  }

  /// Number of queries submitted so far.
  pub fn started_count(&self) -> usize {
    self.started.lock().unwrap().len()
  }
}

#[async_trait]
impl LogQueryClient for MockLogQueryClient {
  async fn start_query(&self, request: StartQueryRequest) -> Result<String, ClientError> {
    if *self.fail_start.lock().unwrap() {
      return Err(ClientError::service("start query failed"));
    }
    self.started.lock().unwrap().push(request);
    Ok(format!("query-{}", self.started.lock().unwrap().len()))
  }

  async fn get_query_results(&self, _query_id: &str) -> Result<QueryResults, ClientError> {
    self
      .results
      .lock()
      .unwrap()
      .pop_front()
      .ok_or_else(|| ClientError::service("no query results queued"))
  }
}

/// In-memory object store keyed by bucket and key.
#[derive(Default)]
pub struct MemoryObjectStore {
  objects: Mutex<HashMap<(String, String), Bytes>>,
}

impl MemoryObjectStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn put_object(&self, bucket: impl Into<String>, key: impl Into<String>, data: impl Into<Bytes>) {
    self
      .objects
      .lock()
      .unwrap()
      .insert((bucket.into(), key.into()), data.into());
  }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
  async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream, ClientError> {
    let objects = self.objects.lock().unwrap();
    match objects.get(&(bucket.to_string(), key.to_string())) {
      Some(data) => {
        let chunk = Ok(data.clone());
        Ok(Box::pin(futures::stream::iter(vec![chunk])))
      }
      None => Err(ClientError::NoSuchKey {
        key: format!("{}/{}", bucket, key),
      }),
    }
  }
}
