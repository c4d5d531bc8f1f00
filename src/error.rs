//! Error kinds spanning the whole engine (`spec.md` §7).
//!
//! Mirrors the teacher's per-concern split (`PlayHandError`, `GameError`)
//! with one flat enum per failure family instead of one giant enum, since
//! the recovery policy differs by kind: `SolverError` is recovered locally
//! (skip the offending root combo and continue), every other kind escalates
//! and aborts the run.

use thiserror::Error;

use crate::domain::combo::ComboId;

/// Raised by the job driver (component H) when a job is already running for
/// the same name. Soft: surfaced to the caller, not treated as an engine
/// failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("a job named '{0}' is already running")]
pub struct JobAlreadyRunning(pub String);

/// Failures raised while solving a single target combo's model (component
/// E). Recoverable: the engine logs and skips the combo, continuing with
/// the rest of the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("solver reported infeasible on a model expected to be feasible for combo {0}")]
    UnexpectedInfeasible(ComboId),
    #[error("solver reported unbounded for combo {0}")]
    Unbounded(ComboId),
    #[error("solver timed out for combo {0}")]
    Timeout(ComboId),
    #[error("solver backend error for combo {0}: {1}")]
    Backend(ComboId, String),
}

/// Top-level engine error. Every variant other than `Solver` is terminal:
/// the run is aborted and the job is marked `FAILURE` with the message
/// attached.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    JobAlreadyRunning(#[from] JobAlreadyRunning),

    #[error("snapshot read was not internally consistent: {0}")]
    SnapshotInconsistent(String),

    #[error("graph invariant violated: {0}")]
    GraphInvariantViolated(String),

    /// A `SolverError` that escalated past the per-combo recovery policy
    /// (e.g. it happened while assembling the shared base model, not while
    /// solving a single target).
    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("persistence error, transaction rolled back: {0}")]
    Persistence(String),

    /// The job driver observed a cooperative-cancellation request between
    /// components (`spec.md` §5 "the driver polls a flag ... and aborts
    /// cleanly, marking status=FAILURE").
    #[error("generation run was cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_already_running_message_includes_name() {
        let err = JobAlreadyRunning("generate-variants".to_string());
        assert_eq!(
            err.to_string(),
            "a job named 'generate-variants' is already running"
        );
    }
}
