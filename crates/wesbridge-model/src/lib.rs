//! WES data model for wesbridge.
//!
//! Plain serializable types for the run lifecycle: canonical run states,
//! run status and log records, run requests, and the workflow-type-version
//! registry used for capability negotiation. No I/O lives here; every type
//! is reconstructed per request from backend state.

mod registry;
mod request;
mod run;
mod state;

pub use registry::{WorkflowTypeVersion, WorkflowTypeVersions};
pub use request::{Attachment, RunRequest};
pub use run::{Log, RunId, RunListResponse, RunLog, RunStatus, ServiceInfo};
pub use state::RunState;
