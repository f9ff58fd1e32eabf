use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::error::ClientError;

/// A boxed stream of bytes for object data.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

/// The object store.
///
/// Retrieval signals a distinguishable [`ClientError::NoSuchKey`] so
/// callers can treat a missing object as an empty result rather than a
/// failure.
#[async_trait]
pub trait ObjectStore: Send + Sync {
  /// Retrieve an object as a stream of bytes.
  async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream, ClientError>;
}

/// Collect an object stream into one contiguous buffer.
pub async fn collect_object(mut stream: ByteStream) -> Result<Bytes, ClientError> {
  let mut buf = Vec::new();
  while let Some(chunk) = stream.next().await {
    buf.extend_from_slice(&chunk?);
  }
  Ok(Bytes::from(buf))
}
