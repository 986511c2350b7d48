//! Fire-and-forget background work with graceful-shutdown tracking.
//!
//! ## Design
//!
//! - Every submission gets its own Tokio task (no pool, no backpressure)
//! - Errors and panics are caught at the task boundary and logged
//! - An outstanding-task counter lets shutdown wait for in-flight work
//! - No result channel and no cancellation: callers that need a result must
//!   record it themselves from inside the task

pub mod outcome;
pub mod supervisor;

pub use outcome::TaskOutcome;
pub use supervisor::TaskSupervisor;

use serde::Serialize;
use uuid::Uuid;

/// Identifier attached to a submitted task for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
