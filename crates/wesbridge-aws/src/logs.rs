use async_trait::async_trait;

use crate::error::ClientError;

/// A structured log query over a time window against a named log group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartQueryRequest {
  pub log_group: String,
  /// Epoch milliseconds, inclusive.
  pub start_time: i64,
  /// Epoch milliseconds, inclusive.
  pub end_time: i64,
  pub query_string: String,
  pub limit: i32,
}

/// Lifecycle of an asynchronous log query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
  Scheduled,
  Running,
  Complete,
  Failed,
  Cancelled,
  Timeout,
  /// A status value this contract does not know about.
  Other(String),
}

impl QueryStatus {
  /// Whether the query is still in flight.
  pub fn is_pending(&self) -> bool {
    matches!(self, QueryStatus::Scheduled | QueryStatus::Running)
  }
}

/// One field of a matched log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultField {
  pub field: String,
  pub value: String,
}

/// Current status of a query plus the records matched so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResults {
  pub status: QueryStatus,
  pub results: Vec<Vec<ResultField>>,
}

/// The asynchronous log query service: submit a query, then poll for
/// completion.
#[async_trait]
pub trait LogQueryClient: Send + Sync {
  /// Submit a query; returns the query id to poll with.
  async fn start_query(&self, request: StartQueryRequest) -> Result<String, ClientError>;

  /// Fetch the current status and matched records of a query.
  async fn get_query_results(&self, query_id: &str) -> Result<QueryResults, ClientError>;
}
