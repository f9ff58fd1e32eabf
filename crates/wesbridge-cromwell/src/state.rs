//! Remote engine status translation.

use wesbridge_model::RunState;

/// Derive the canonical run state from a remote engine response.
///
/// A non-success HTTP status wins over the body: client errors other than
/// not-found mean the engine rejected the request about this run, a 404
/// means the run is unknown, and anything else server-side is a system
/// error. With a 200 the engine's own status vocabulary is mapped.
pub fn remote_run_state(http_status: u16, engine_status: &str) -> RunState {
  if http_status != 200 {
    return match http_status {
      400..=403 => RunState::ExecutorError,
      404 => RunState::Unknown,
      _ => RunState::SystemError,
    };
  }
  match engine_status {
    "Submitted" => RunState::Initializing,
    "Running" => RunState::Running,
    "Succeeded" => RunState::Complete,
    "Aborting" => RunState::Canceling,
    "Aborted" => RunState::Canceled,
    "Failed" => RunState::ExecutorError,
    _ => RunState::Unknown,
  }
}
