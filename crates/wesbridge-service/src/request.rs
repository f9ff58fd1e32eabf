//! Run-request decoding.
//!
//! A run submission arrives as multipart form content: plain string
//! fields, three JSON-encoded fields, and a list of file attachments. The
//! transport collects those into a [`RunRequestForm`]; decoding into a
//! typed [`RunRequest`] happens here so a malformed value is rejected as a
//! client fault naming the offending field.

use std::collections::HashMap;

use wesbridge_engine::WesError;
use wesbridge_model::{Attachment, RunRequest};

/// Form fields carrying JSON-encoded values.
const JSON_FIELDS: [&str; 3] = ["workflow_params", "tags", "workflow_engine_parameters"];

/// Raw multipart content of a run submission.
#[derive(Debug, Clone, Default)]
pub struct RunRequestForm {
  pub fields: HashMap<String, String>,
  pub attachments: Vec<Attachment>,
}

impl RunRequestForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.fields.insert(name.into(), value.into());
    self
  }

  pub fn attachment(mut self, attachment: Attachment) -> Self {
    self.attachments.push(attachment);
    self
  }
}

/// Decode a submission form into a typed run request.
///
/// Empty values normalize to absent; malformed JSON in any of the
/// JSON-encoded fields is a client fault naming the field; attachment
/// filenames must not reference parent directories.
pub fn parse_run_request(form: RunRequestForm) -> Result<RunRequest, WesError> {
  let text = |name: &str| -> Option<String> {
    form
      .fields
      .get(name)
      .map(|v| v.trim())
      .filter(|v| !v.is_empty())
      .map(String::from)
  };

  let mut json_values = HashMap::new();
  for name in JSON_FIELDS {
    if let Some(raw) = text(name) {
      let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        WesError::invalid_request(format!("error processing '{}': {}", name, e))
      })?;
      json_values.insert(name, value);
    }
  }

  for attachment in &form.attachments {
    if attachment.filename.split('/').any(|segment| segment == "..") {
      return Err(WesError::invalid_request(format!(
        "attachment filename '{}' references a parent directory",
        attachment.filename
      )));
    }
  }

  Ok(RunRequest {
    workflow_params: json_values.remove("workflow_params"),
    workflow_type: text("workflow_type"),
    workflow_type_version: text("workflow_type_version"),
    tags: json_values.remove("tags"),
    workflow_engine_parameters: json_values.remove("workflow_engine_parameters"),
    workflow_url: text("workflow_url"),
    workflow_attachment: form.attachments,
  })
}
