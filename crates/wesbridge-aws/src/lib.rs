//! Backend collaborator contracts for wesbridge.
//!
//! The adapter layer talks to four cloud services: a batch job backend, a
//! resource tag index, an asynchronous log query service, and an object
//! store. Each is consumed through a narrow async trait defined here; the
//! SDK-backed implementations are wired in by the embedding process. A
//! filesystem-backed [`ObjectStore`] is provided for local development and
//! tests.

mod batch;
mod error;
mod fs;
mod logs;
pub mod mock;
mod store;
mod tags;

pub use batch::{
  ContainerDetail, JobClient, JobDetail, JobSummary, ListJobsPage, ListJobsRequest,
  SubmitJobRequest,
};
pub use error::ClientError;
pub use fs::FsObjectStore;
pub use logs::{LogQueryClient, QueryResults, QueryStatus, ResultField, StartQueryRequest};
pub use store::{ByteStream, ObjectStore, collect_object};
pub use tags::{ResourcePage, ResourceTagIndex, TagFilter};
