//! Classification of finished background tasks.

use std::any::Any;

use tracing::{debug, error};

use super::TaskId;

/// How a supervised task ended.
///
/// Submitters never see this value; it only drives logging at the
/// supervisor boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Returned `Ok(())`.
    Completed,
    /// Returned an error.
    Failed(String),
    /// Panicked; the panic was caught.
    Panicked(String),
}

impl TaskOutcome {
    pub(crate) fn from_result(result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => TaskOutcome::Completed,
            Err(e) => TaskOutcome::Failed(format!("{e:#}")),
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        TaskOutcome::Panicked(panic_message(payload.as_ref()))
    }

    pub(crate) fn log(&self, task_id: TaskId, name: &str) {
        match self {
            TaskOutcome::Completed => debug!(%task_id, task = %name, "background task completed"),
            TaskOutcome::Failed(e) => {
                error!(%task_id, task = %name, error = %e, "background task failed")
            }
            TaskOutcome::Panicked(msg) => {
                error!(%task_id, task = %name, panic = %msg, "background task panicked")
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
