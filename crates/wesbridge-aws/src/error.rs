/// Error type for backend client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  /// The requested object does not exist.
  ///
  /// Kept distinct from [`ClientError::Service`] so callers can treat a
  /// missing object as an empty result instead of a failure.
  #[error("no such key: {key}")]
  NoSuchKey { key: String },

  /// The backend reported a failure.
  #[error("{message}")]
  Service { message: String },

  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl ClientError {
  /// A backend service failure with the given message.
  pub fn service(message: impl Into<String>) -> Self {
    ClientError::Service {
      message: message.into(),
    }
  }

  /// Whether this error is the distinguishable "object missing" condition.
  pub fn is_no_such_key(&self) -> bool {
    matches!(self, ClientError::NoSuchKey { .. })
  }
}
