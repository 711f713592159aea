use super::enums::ProductiveTime;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Hour window (start inclusive, end exclusive) in which reminders may be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveHours {
    pub start: u32,
    pub end: u32,
}

impl ActiveHours {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Check whether an hour of day falls inside the window
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour < self.end
    }
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self { start: 9, end: 22 }
    }
}

/// User preferences, stored under `focus_settings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub daily_hours: u32,
    pub productive_time: ProductiveTime,
    /// Minutes per focus session
    pub pomodoro_length: f64,
    /// Minutes per break
    pub break_length: f64,
    pub is_onboarded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_hours: Option<ActiveHours>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_hours: 4,
            productive_time: ProductiveTime::Morning,
            pomodoro_length: 25.0,
            break_length: 5.0,
            is_onboarded: false,
            active_hours: None,
        }
    }
}

impl Settings {
    /// Configured session length as a duration
    pub fn pomodoro_duration(&self) -> Duration {
        Duration::seconds((self.pomodoro_length * 60.0).round() as i64)
    }

    /// Reminder window: explicit active hours win, otherwise derived from the
    /// productive time of day plus the daily hour budget
    pub fn reminder_window(&self) -> ActiveHours {
        if let Some(hours) = self.active_hours {
            return hours;
        }
        let start = self.productive_time.start_hour();
        ActiveHours::new(start, start.saturating_add(self.daily_hours).min(24))
    }
}

/// Session/break presets offered in onboarding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PomodoroPreset {
    pub label: &'static str,
    pub work: f64,
    pub rest: f64,
}

pub const POMODORO_PRESETS: [PomodoroPreset; 3] = [
    PomodoroPreset { label: "🍅 Классика", work: 25.0, rest: 5.0 },
    PomodoroPreset { label: "🔥 Интенсив", work: 50.0, rest: 10.0 },
    PomodoroPreset { label: "⚡ Глубокая работа", work: 90.0, rest: 15.0 },
];

/// Daily-hours options offered in onboarding
pub const DAILY_HOUR_OPTIONS: [(u32, &str); 3] = [(2, "2-3 часа"), (4, "4-5 часов"), (6, "6+ часов")];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.daily_hours, 4);
        assert_eq!(settings.productive_time, ProductiveTime::Morning);
        assert_eq!(settings.pomodoro_duration(), Duration::minutes(25));
        assert!(!settings.is_onboarded);
    }

    #[test]
    fn test_settings_json_uses_camel_case() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["pomodoroLength"], 25.0);
        assert_eq!(json["isOnboarded"], false);
        assert!(json.get("activeHours").is_none());
    }

    #[test]
    fn test_reminder_window_derived_from_productive_time() {
        let mut settings = Settings::default();
        settings.productive_time = ProductiveTime::Evening;
        settings.daily_hours = 4;
        assert_eq!(settings.reminder_window(), ActiveHours::new(17, 21));

        settings.productive_time = ProductiveTime::Night;
        settings.daily_hours = 6;
        assert_eq!(settings.reminder_window(), ActiveHours::new(21, 24));
    }

    #[test]
    fn test_reminder_window_clamps_huge_daily_hours() {
        let mut settings = Settings::default();
        settings.productive_time = ProductiveTime::Morning;
        settings.daily_hours = u32::MAX;
        let window = settings.reminder_window();
        assert_eq!(window.end, 24);
        assert!(window.contains(23));
    }

    #[test]
    fn test_explicit_active_hours_win() {
        let mut settings = Settings::default();
        settings.active_hours = Some(ActiveHours::new(9, 18));
        assert_eq!(settings.reminder_window(), ActiveHours::new(9, 18));
        assert!(settings.reminder_window().contains(9));
        assert!(!settings.reminder_window().contains(18));
    }

    #[test]
    fn test_fractional_pomodoro_length() {
        let mut settings = Settings::default();
        settings.pomodoro_length = 0.5;
        assert_eq!(settings.pomodoro_duration(), Duration::seconds(30));
    }
}
