use serde::{Deserialize, Serialize};

/// Canonical WES run state.
///
/// Exactly one state holds at any observation instant. The state is derived
/// from the latest backend status snapshot and never stored, so two
/// sequential reads taken during a transition may legitimately disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
  Queued,
  Initializing,
  Running,
  Complete,
  ExecutorError,
  SystemError,
  Canceling,
  Canceled,
  Unknown,
}

impl Default for RunState {
  fn default() -> Self {
    RunState::Unknown
  }
}

impl RunState {
  /// Whether the run can still change state.
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      RunState::Complete
        | RunState::ExecutorError
        | RunState::SystemError
        | RunState::Canceled
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn serializes_screaming_snake_case() {
    let json = serde_json::to_string(&RunState::ExecutorError).unwrap();
    assert_eq!(json, "\"EXECUTOR_ERROR\"");
    let json = serde_json::to_string(&RunState::Queued).unwrap();
    assert_eq!(json, "\"QUEUED\"");
  }

  #[test]
  fn terminal_states() {
    assert!(RunState::Complete.is_terminal());
    assert!(RunState::Canceled.is_terminal());
    assert!(!RunState::Running.is_terminal());
    assert!(!RunState::Canceling.is_terminal());
  }
}
