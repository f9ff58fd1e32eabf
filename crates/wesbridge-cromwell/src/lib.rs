//! Remote Cromwell engine adapter for wesbridge.
//!
//! Unlike the batch-backed variants, this adapter delegates the whole run
//! lifecycle to a Cromwell server over HTTP: submission is a multipart
//! request assembled from either an inline workflow URL or a staged
//! object-store download, and status/log/list calls read the server's own
//! endpoints, translated through an HTTP-status-aware state mapping.

mod adapter;
mod staging;
mod state;

pub use adapter::CromwellAdapter;
pub use staging::{StagedFile, SubmissionParts, stage_workflow};
pub use state::remote_run_state;
