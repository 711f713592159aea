use serde::{Deserialize, Serialize};

/// Part of the day the user reports being most productive in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductiveTime {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl ProductiveTime {
    /// Hour of day the productive window starts at
    pub fn start_hour(&self) -> u32 {
        match self {
            Self::Morning => 8,
            Self::Afternoon => 12,
            Self::Evening => 17,
            Self::Night => 21,
        }
    }

    /// Display label used in onboarding
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Утро (8-12)",
            Self::Afternoon => "День (12-17)",
            Self::Evening => "Вечер (17-22)",
            Self::Night => "Ночная сова",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Morning => "🌅",
            Self::Afternoon => "☀️",
            Self::Evening => "🌆",
            Self::Night => "🌙",
        }
    }

    /// Get all options in onboarding order
    pub fn all() -> &'static [ProductiveTime] {
        &[Self::Morning, Self::Afternoon, Self::Evening, Self::Night]
    }
}

/// Screen currently projected by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Onboarding,
    Home,
    CreateTask,
    TaskDetails,
    Pomodoro,
    Statistics,
}

/// Overlay mode on top of the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    /// Completion acknowledgment is shown
    Modal,
    /// A text form is capturing keystrokes
    EditingForm,
    ConfirmDeleteTask,
    ConfirmCancelSession,
}

/// Lifecycle of the single countdown timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    /// Configured, waiting for an explicit start
    Armed,
    Running,
    Paused,
    Completed,
}

impl TimerState {
    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Armed => "READY",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Completed => "DONE",
        }
    }

    /// Check if the timer holds a session that has not finished yet
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Armed | Self::Running | Self::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_productive_time_start_hours() {
        assert_eq!(ProductiveTime::Morning.start_hour(), 8);
        assert_eq!(ProductiveTime::Afternoon.start_hour(), 12);
        assert_eq!(ProductiveTime::Evening.start_hour(), 17);
        assert_eq!(ProductiveTime::Night.start_hour(), 21);
    }

    #[test]
    fn test_productive_time_serde() {
        let json = serde_json::to_string(&ProductiveTime::Evening).unwrap();
        assert_eq!(json, "\"evening\"");
        let parsed: ProductiveTime = serde_json::from_str("\"night\"").unwrap();
        assert_eq!(parsed, ProductiveTime::Night);
    }

    #[test]
    fn test_timer_state_is_active() {
        assert!(!TimerState::Idle.is_active());
        assert!(TimerState::Armed.is_active());
        assert!(TimerState::Running.is_active());
        assert!(TimerState::Paused.is_active());
        assert!(!TimerState::Completed.is_active());
    }
}
