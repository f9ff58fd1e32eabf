use std::path::PathBuf;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::ClientError;
use crate::store::{ByteStream, ObjectStore};

/// Filesystem-backed object store for local development and tests.
///
/// Objects live at `{base_path}/{bucket}/{key}`.
pub struct FsObjectStore {
  base_path: PathBuf,
}

impl FsObjectStore {
  /// Create a new filesystem store rooted at the given path.
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
    self.base_path.join(bucket).join(key)
  }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
  async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream, ClientError> {
    let path = self.object_path(bucket, key);
    let file = File::open(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        ClientError::NoSuchKey {
          key: format!("{}/{}", bucket, key),
        }
      } else {
        ClientError::Io(e)
      }
    })?;
    let stream = ReaderStream::new(file).map(|r| r.map_err(ClientError::Io));
    Ok(Box::pin(stream))
  }
}
