use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// XP granted per completed session
pub const SESSION_XP: u32 = 10;

/// XP needed per level
pub const XP_PER_LEVEL: u32 = 100;

/// An unlocked achievement entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    pub id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Gamification counters, stored under `focus_stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_sessions: u32,
    /// Minutes
    pub total_focus_time: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub level: u32,
    pub xp: u32,
    #[serde(default)]
    pub achievements: Vec<UnlockedAchievement>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_sessions: 0,
            total_focus_time: 0.0,
            current_streak: 0,
            longest_streak: 0,
            level: 1,
            xp: 0,
            achievements: Vec::new(),
        }
    }
}

impl Stats {
    /// Count one completed session of `minutes` length finished on `today`.
    /// The streak is evaluated here and nowhere else.
    pub fn apply_session(&mut self, minutes: f64, today: NaiveDate, last_session: Option<NaiveDate>) {
        self.total_sessions += 1;
        self.total_focus_time += minutes;
        self.add_xp(SESSION_XP);

        let (current, longest) = evaluate_streak(today, last_session, self.current_streak, self.longest_streak);
        self.current_streak = current;
        self.longest_streak = longest;
    }

    pub fn add_xp(&mut self, amount: u32) {
        self.xp += amount;
        self.level = level_for_xp(self.xp);
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == id)
    }

    /// Progress towards the next level in percent
    pub fn level_progress(&self) -> u32 {
        (self.xp % XP_PER_LEVEL) * 100 / XP_PER_LEVEL
    }

    /// Repair counters that disagree with their invariants
    pub fn normalize(&mut self) {
        self.level = level_for_xp(self.xp);
        self.longest_streak = self.longest_streak.max(self.current_streak);
        let mut seen = Vec::new();
        self.achievements.retain(|a| {
            if seen.contains(&a.id) {
                false
            } else {
                seen.push(a.id.clone());
                true
            }
        });
    }
}

/// Level for an XP total: floor(xp / 100) + 1
pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// Rank title shown next to the numeric level
pub fn level_title(xp: u32) -> &'static str {
    if xp >= 100 {
        "Ученик"
    } else if xp >= 50 {
        "Новичок+"
    } else {
        "Новичок"
    }
}

/// Compute (current, longest) streak after a session completed on `today`
pub fn evaluate_streak(today: NaiveDate, last: Option<NaiveDate>, current: u32, longest: u32) -> (u32, u32) {
    let next = match last {
        None => 1,
        Some(last) if last == today => current,
        Some(last) if last.succ_opt() == Some(today) => current + 1,
        Some(_) => 1,
    };
    (next, longest.max(next))
}
