//! Task model, form payloads, and the local list synchronizer.

pub mod board;
pub mod ops;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use board::{Editor, OpId, OpKind, OpTicket, SaveOp, SyncEvent, SyncOutcome, TaskBoard};

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    /// Returns the short display name for this priority.
    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!(
                "Unknown priority: {value} (expected low, medium, or high)"
            )),
        }
    }
}

/// A task as the server owns it.
///
/// `id` is server-assigned and immutable; the client never invents one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
}

/// Form payload for create and update.
///
/// Mirrors the editable fields of [`Task`]; the server fills in the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
}

impl TaskDraft {
    /// Builds a draft prefilled from an existing task (edit flow).
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.completed,
            priority: task.priority,
        }
    }

    /// True when there is nothing worth saving: both title and description
    /// are empty or whitespace-only. Such a draft is never dispatched.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }
}
