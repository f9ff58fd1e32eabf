//! Output retrieval from a per-job object-store prefix.

use std::sync::Arc;

use tracing::warn;

use wesbridge_aws::{ObjectStore, collect_object};

use crate::error::WesError;

/// Name of the outputs object an engine writes under its per-job prefix.
const OUTPUT_FILE_NAME: &str = "outputs.json";

/// A bucket plus key prefix parsed from an `s3://bucket/prefix` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
  pub bucket: String,
  pub prefix: String,
}

impl OutputLocation {
  /// Parse an output-directory URI of the form `s3://bucket/prefix`.
  pub fn parse(uri: &str) -> Result<Self, WesError> {
    let rest = uri
      .strip_prefix("s3://")
      .ok_or_else(|| WesError::internal(format!("invalid output directory uri: '{}'", uri)))?;
    let (bucket, prefix) = rest.split_once('/').ok_or_else(|| {
      WesError::internal(format!("output directory uri has no key prefix: '{}'", uri))
    })?;
    if bucket.is_empty() || prefix.is_empty() {
      return Err(WesError::internal(format!(
        "invalid output directory uri: '{}'",
        uri
      )));
    }
    Ok(Self {
      bucket: bucket.to_string(),
      prefix: prefix.trim_end_matches('/').to_string(),
    })
  }
}

/// Reads the fixed-named JSON outputs object an engine leaves under
/// `{prefix}/{job_id}/` for each run.
pub struct StoredOutputs {
  store: Arc<dyn ObjectStore>,
  location: OutputLocation,
}

impl StoredOutputs {
  pub fn new(store: Arc<dyn ObjectStore>, location: OutputLocation) -> Self {
    Self { store, location }
  }

  /// The outputs object for one job. A missing object is logged and
  /// yields `None`; any other store fault surfaces.
  pub async fn for_job(&self, job_id: &str) -> Result<Option<serde_json::Value>, WesError> {
    let key = format!("{}/{}/{}", self.location.prefix, job_id, OUTPUT_FILE_NAME);

    let stream = match self.store.get_object(&self.location.bucket, &key).await {
      Ok(stream) => stream,
      Err(e) if e.is_no_such_key() => {
        warn!(bucket = %self.location.bucket, key = %key, "no outputs object found");
        return Ok(None);
      }
      Err(e) => {
        return Err(WesError::internal_with(
          format!("failed to read outputs object '{}'", key),
          e,
        ));
      }
    };

    let data = collect_object(stream).await.map_err(|e| {
      WesError::internal_with(format!("failed to read outputs object '{}'", key), e)
    })?;
    let outputs = serde_json::from_slice(&data).map_err(|e| {
      WesError::internal(format!("outputs object '{}' is not valid JSON: {}", key, e))
    })?;
    Ok(Some(outputs))
  }
}
