//! Adapter error taxonomy.

/// Errors surfaced by adapter operations.
///
/// Two classes only: client faults (malformed or unsupported input, a
/// 4xx-equivalent) and server faults (backend or engine failure, a
/// 5xx-equivalent). "Run not found" is not an error anywhere — lookups
/// return `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum WesError {
  /// The request was malformed or names an unsupported workflow.
  #[error("invalid request: {message}")]
  InvalidRequest { message: String },

  /// A backend call or engine-side operation failed.
  #[error("{message}")]
  Internal {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
  },
}

impl WesError {
  /// A client fault with the given message.
  pub fn invalid_request(message: impl Into<String>) -> Self {
    WesError::InvalidRequest {
      message: message.into(),
    }
  }

  /// A server fault with the given message.
  pub fn internal(message: impl Into<String>) -> Self {
    WesError::Internal {
      message: message.into(),
      source: None,
    }
  }

  /// A server fault wrapping an underlying error.
  pub fn internal_with(
    message: impl Into<String>,
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    WesError::Internal {
      message: message.into(),
      source: Some(Box::new(source)),
    }
  }

  /// Whether this error should surface as a 4xx-equivalent.
  pub fn is_client_fault(&self) -> bool {
    matches!(self, WesError::InvalidRequest { .. })
  }
}
