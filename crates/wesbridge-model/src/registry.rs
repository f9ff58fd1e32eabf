use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The ordered set of language versions an engine accepts for one
/// workflow type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTypeVersion {
  pub workflow_type_version: Vec<String>,
}

impl WorkflowTypeVersion {
  pub fn new<I, S>(versions: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      workflow_type_version: versions.into_iter().map(Into::into).collect(),
    }
  }
}

/// Registry of workflow types to the versions the active engine accepts.
///
/// Type lookup is case-insensitive (registry keys are upper-case by
/// convention) and versions are compared after trimming surrounding
/// whitespace. Empty or whitespace-only inputs never match; callers that
/// need to reject them as a client fault do so before consulting the
/// registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowTypeVersions(pub BTreeMap<String, WorkflowTypeVersion>);

impl WorkflowTypeVersions {
  /// Build a registry from `(type, versions)` pairs. Keys are upper-cased.
  pub fn from_entries<K, I, S>(entries: impl IntoIterator<Item = (K, I)>) -> Self
  where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(
      entries
        .into_iter()
        .map(|(k, v)| (k.into().to_uppercase(), WorkflowTypeVersion::new(v)))
        .collect(),
    )
  }

  /// Whether the registry accepts the given workflow type and version.
  pub fn supports(&self, workflow_type: &str, workflow_type_version: &str) -> bool {
    let workflow_type = workflow_type.trim().to_uppercase();
    let workflow_type_version = workflow_type_version.trim();
    if workflow_type.is_empty() || workflow_type_version.is_empty() {
      return false;
    }
    self
      .0
      .get(&workflow_type)
      .is_some_and(|v| {
        v.workflow_type_version
          .iter()
          .any(|known| known == workflow_type_version)
      })
  }
}
