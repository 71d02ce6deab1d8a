//! Task handle carried through provisioning operations.

use uuid::Uuid;

/// Identifies the unit of work an operation runs in.
///
/// The task is only used for correlation in logs and is passed down unchanged
/// to everything an operation calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub task_id: String,
    pub name: Option<String>,
    pub channel: Option<String>,
}

impl Task {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            name: None,
            channel: None,
        }
    }

    pub fn with_generated_id() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Channel the operation was initiated from (e.g. `reconciliation`).
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::with_generated_id()
    }
}
