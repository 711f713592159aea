use crate::domain::{Stats, Task};

/// Task progress totals across the task list
#[derive(Debug, PartialEq)]
pub struct TaskSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub total_pomodoros: u32,
    pub completed_pomodoros: u32,
    pub total_steps: usize,
    pub completed_steps: usize,
}

/// Focus habits derived from the stats blob
#[derive(Debug, PartialEq)]
pub struct FocusSummary {
    pub avg_session_minutes: f64,
    pub focus_hours: f64,
    pub xp_to_next_level: u32,
}

pub fn calculate_task_summary(tasks: &[Task]) -> TaskSummary {
    TaskSummary {
        total_tasks: tasks.len(),
        completed_tasks: tasks.iter().filter(|t| t.is_complete()).count(),
        total_pomodoros: tasks.iter().map(|t| t.total_pomodoros).sum(),
        completed_pomodoros: tasks.iter().map(|t| t.completed_pomodoros).sum(),
        total_steps: tasks.iter().map(|t| t.sub_tasks.len()).sum(),
        completed_steps: tasks.iter().map(|t| t.completed_subtasks()).sum(),
    }
}

pub fn calculate_focus_summary(stats: &Stats) -> FocusSummary {
    let avg_session_minutes = if stats.total_sessions > 0 {
        stats.total_focus_time / stats.total_sessions as f64
    } else {
        0.0
    };
    FocusSummary {
        avg_session_minutes,
        focus_hours: stats.total_focus_time / 60.0,
        xp_to_next_level: crate::domain::stats::XP_PER_LEVEL - stats.xp % crate::domain::stats::XP_PER_LEVEL,
    }
}
