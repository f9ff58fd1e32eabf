//! Backend job status to canonical run state translation.

use wesbridge_model::RunState;

/// Reason recorded on jobs terminated through [`cancel_run`], and the
/// marker that distinguishes a canceled run from a failed one.
///
/// [`cancel_run`]: crate::WesAdapter::cancel_run
pub const USER_CANCELLATION_REASON: &str = "User Canceled";

/// Derive the canonical run state from a backend job status and its
/// status reason.
///
/// Pure and total over the backend vocabulary; anything unrecognized maps
/// to [`RunState::Unknown`]. The backend never reports enough to separate
/// a system error from an executor error, so FAILED jobs that were not
/// user-canceled are all [`RunState::ExecutorError`].
pub fn batch_run_state(job_status: &str, job_status_reason: &str) -> RunState {
  match job_status {
    "SUBMITTED" | "PENDING" | "RUNNABLE" => RunState::Queued,
    "STARTING" => RunState::Initializing,
    "RUNNING" => RunState::Running,
    "SUCCEEDED" => RunState::Complete,
    "FAILED" => {
      if job_status_reason == USER_CANCELLATION_REASON {
        RunState::Canceled
      } else {
        RunState::ExecutorError
      }
    }
    _ => RunState::Unknown,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn queued_statuses() {
    for status in ["SUBMITTED", "PENDING", "RUNNABLE"] {
      assert_eq!(batch_run_state(status, ""), RunState::Queued);
    }
  }

  #[test]
  fn lifecycle_statuses() {
    assert_eq!(batch_run_state("STARTING", ""), RunState::Initializing);
    assert_eq!(batch_run_state("RUNNING", ""), RunState::Running);
    assert_eq!(batch_run_state("SUCCEEDED", ""), RunState::Complete);
  }

  #[test]
  fn failed_user_canceled() {
    assert_eq!(
      batch_run_state("FAILED", USER_CANCELLATION_REASON),
      RunState::Canceled
    );
  }

  #[test]
  fn failed_otherwise_is_executor_error() {
    assert_eq!(
      batch_run_state("FAILED", "Essential container in task exited"),
      RunState::ExecutorError
    );
    assert_eq!(batch_run_state("FAILED", ""), RunState::ExecutorError);
  }

  #[test]
  fn unrecognized_status_is_unknown() {
    assert_eq!(batch_run_state("ARCHIVED", ""), RunState::Unknown);
    assert_eq!(batch_run_state("", ""), RunState::Unknown);
  }
}
