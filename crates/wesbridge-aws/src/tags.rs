use async_trait::async_trait;

use crate::error::ClientError;

/// A tag key/value filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
  pub key: String,
  pub values: Vec<String>,
}

impl TagFilter {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      values: vec![value.into()],
    }
  }
}

/// One page of tagged resource identifiers plus the continuation token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePage {
  /// Full resource identifiers (ARNs); the job id is the trailing path
  /// segment.
  pub resource_arns: Vec<String>,
  pub pagination_token: Option<String>,
}

/// The resource tag index: maps a tag key/value to the set of resources
/// carrying it, paginated.
#[async_trait]
pub trait ResourceTagIndex: Send + Sync {
  /// Fetch one page of resources matching the tag and resource-type
  /// filters. Pass the previous page's token to continue.
  async fn get_resources(
    &self,
    tag_filters: &[TagFilter],
    resource_type_filters: &[String],
    pagination_token: Option<&str>,
  ) -> Result<ResourcePage, ClientError>;
}
