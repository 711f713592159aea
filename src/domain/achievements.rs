use super::stats::{Stats, UnlockedAchievement};
use chrono::{DateTime, Utc};

/// A static achievement rule
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rule: fn(&Stats) -> bool,
}

/// Rule table, evaluated in order
pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_steps",
        title: "Первые шаги",
        description: "Завершите первую сессию",
        icon: "🎯",
        rule: |s| s.total_sessions >= 1,
    },
    Achievement {
        id: "weekly_warrior",
        title: "Недельный воин",
        description: "Завершите 7 сессий",
        icon: "🎓",
        rule: |s| s.total_sessions >= 7,
    },
    Achievement {
        id: "focus_master",
        title: "Мастер фокуса",
        description: "Серия из 10 дней подряд",
        icon: "🏆",
        rule: |s| s.current_streak >= 10,
    },
    Achievement {
        id: "century_club",
        title: "Клуб сотни",
        description: "Завершите 100 сессий",
        icon: "💯",
        rule: |s| s.total_sessions >= 100,
    },
    Achievement {
        id: "deep_diver",
        title: "Глубокое погружение",
        description: "10 часов фокуса в сумме",
        icon: "🌊",
        rule: |s| s.total_focus_time >= 600.0,
    },
    Achievement {
        id: "rising_star",
        title: "Восходящая звезда",
        description: "Достигните 5 уровня",
        icon: "⭐",
        rule: |s| s.level >= 5,
    },
];

/// Unlock every satisfied achievement not yet held and return the newly unlocked ones.
/// Running it again with the same stats unlocks nothing.
pub fn evaluate(stats: &mut Stats, now: DateTime<Utc>) -> Vec<&'static Achievement> {
    let mut unlocked = Vec::new();
    for achievement in ACHIEVEMENTS {
        if stats.has_achievement(achievement.id) || !(achievement.rule)(stats) {
            continue;
        }
        stats.achievements.push(UnlockedAchievement {
            id: achievement.id.to_string(),
            unlocked_at: now,
        });
        unlocked.push(achievement);
    }
    unlocked
}
