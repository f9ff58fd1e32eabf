use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file uploaded alongside a run submission.
///
/// Filenames may include subdirectories but must not reference parent
/// directories; the service layer rejects `..` components before an
/// attachment reaches an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
  pub filename: String,
  pub data: Bytes,
}

impl Attachment {
  pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
    Self {
      filename: filename.into(),
      data: data.into(),
    }
  }
}

/// A workflow run submission.
///
/// The JSON-bearing fields (`workflow_params`, `tags`,
/// `workflow_engine_parameters`) arrive as already-parsed values; the
/// service layer owns form decoding and rejects malformed JSON there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub workflow_params: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub workflow_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub workflow_type_version: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub workflow_engine_parameters: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub workflow_url: Option<String>,
  #[serde(skip)]
  pub workflow_attachment: Vec<Attachment>,
}

impl RunRequest {
  /// A request carrying only a workflow URL.
  pub fn from_url(workflow_url: impl Into<String>) -> Self {
    Self {
      workflow_url: Some(workflow_url.into()),
      ..Self::default()
    }
  }
}
