//! Core run-lifecycle orchestration for wesbridge.
//!
//! This crate holds the adapter layer: the [`WesAdapter`] contract every
//! engine variant implements, the generic batch-backed orchestrator
//! ([`BatchAdapter`]) that maps the backend job vocabulary onto canonical
//! run states, and the per-engine strategies for discovering child tasks
//! and retrieving outputs (Nextflow, MiniWDL, Snakemake). The remote
//! Cromwell variant lives in its own crate.
//!
//! Everything here is stateless between calls: runs are reconstructed from
//! live backend state on every request.

mod adapter;
mod batch;
mod describe;
mod discover;
mod error;
mod miniwdl;
mod nextflow;
mod outputs;
mod snakemake;
mod state;
mod time;

pub use adapter::{SUPPORTED_WES_VERSION, WesAdapter};
pub use batch::{BatchAdapter, BatchEngine, RUN_WORKFLOW_JOB_NAME};
pub use describe::describe_jobs;
pub use discover::{LogQueryDiscovery, PARENT_JOB_TAG_KEY, TaggedJobDiscovery};
pub use error::WesError;
pub use miniwdl::MiniwdlEngine;
pub use nextflow::NextflowEngine;
pub use outputs::{OutputLocation, StoredOutputs};
pub use snakemake::{SnakemakeBatchConfig, SnakemakeBatchWiring, SnakemakeEngine};
pub use state::{USER_CANCELLATION_REASON, batch_run_state};
pub use time::to_rfc3339;
