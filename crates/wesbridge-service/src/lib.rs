//! Startup wiring for wesbridge.
//!
//! Configuration is read once into an explicit [`ServiceConfig`]; the
//! [`create_adapter`] factory selects the engine variant from it, rejecting
//! unknown engine names at startup rather than at first request. The
//! [`WesService`] wraps the selected adapter with request decoding, the
//! capability-negotiation gate, and structured logging at the operation
//! boundary.

mod config;
mod factory;
mod request;
mod service;

pub use config::{ConfigError, EngineName, ServiceConfig};
pub use factory::{BackendClients, create_adapter};
pub use request::{RunRequestForm, parse_run_request};
pub use service::WesService;
