pub mod timer;

pub use timer::SessionTimer;

use chrono::{DateTime, Duration, Utc};

/// What a session is being spent on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTarget {
    Subtask { task_id: String, subtask_id: String },
    /// Unscheduled session with a free-text label
    Focus { label: String },
}

/// The one in-progress session. Never persisted.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub target: SessionTarget,
    pub timer: SessionTimer,
}

impl ActiveSession {
    /// Create an armed session of the given length
    pub fn armed(target: SessionTarget, length: Duration) -> Self {
        let mut timer = SessionTimer::new();
        timer.arm(length);
        Self { target, timer }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.timer.is_due(now)
    }

    pub fn task_id(&self) -> Option<&str> {
        match &self.target {
            SessionTarget::Subtask { task_id, .. } => Some(task_id),
            SessionTarget::Focus { .. } => None,
        }
    }
}
