use super::task::{SubTask, Task};
use chrono::Duration;

/// Display state of a subtask row in the task details view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Done,
    /// The next step to work on
    Current,
    Locked,
}

/// A row of the task details view
#[derive(Debug, Clone)]
pub struct StepRow {
    pub index: usize,
    pub state: StepState,
    pub is_last: bool,
}

/// Project a task's subtasks into display rows
pub fn step_rows(task: &Task) -> Vec<StepRow> {
    let count = task.sub_tasks.len();
    task.sub_tasks
        .iter()
        .enumerate()
        .map(|(index, subtask)| {
            let state = if subtask.completed {
                StepState::Done
            } else if task.is_locked(index) {
                StepState::Locked
            } else {
                StepState::Current
            };
            StepRow {
                index,
                state,
                is_last: index + 1 == count,
            }
        })
        .collect()
}

pub fn step_badge(state: StepState) -> &'static str {
    match state {
        StepState::Done => "✓",
        StepState::Current => "▶",
        StepState::Locked => "🔒",
    }
}

/// Sum of remaining pomodoros across all tasks
pub fn remaining_pomodoros(tasks: &[Task]) -> u32 {
    tasks.iter().map(|t| t.total_pomodoros.saturating_sub(t.completed_pomodoros)).sum()
}

/// Tasks that still have unfinished steps
pub fn active_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| !t.is_complete()).collect()
}

/// "🍅 2/5" style counter for a subtask
pub fn pomodoro_counter(subtask: &SubTask) -> String {
    format!("🍅 {}/{}", subtask.completed_pomodoros, subtask.estimated_pomodoros)
}

/// Text progress bar of `width` cells for a percentage
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = ((percent.min(100) as usize) * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format a countdown as MM:SS
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format minutes of focus as "Xh Ym" (omits 0 values)
pub fn format_focus_time(minutes: f64) -> String {
    let total_minutes = minutes.max(0.0).round() as i64;
    let hours = total_minutes / 60;
    let mins = total_minutes % 60;

    if hours > 0 && mins > 0 {
        format!("{}h {}m", hours, mins)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", mins)
    }
}

/// Get tree connector for subtasks
pub fn tree_connector(is_last: bool) -> &'static str {
    if is_last {
        "└─"
    } else {
        "├─"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::PlannedStep;
    use chrono::Utc;

    fn create_test_task() -> Task {
        Task::new(
            "task-1".to_string(),
            "Test".to_string(),
            None,
            &[PlannedStep::new("A", 1), PlannedStep::new("B", 2), PlannedStep::new("C", 1)],
            Utc::now(),
        )
    }

    #[test]
    fn test_step_rows_mark_current_and_locked() {
        let mut task = create_test_task();
        let first = task.sub_tasks[0].id.clone();
        task.record_pomodoro(&first).unwrap();

        let rows = step_rows(&task);
        let states: Vec<StepState> = rows.iter().map(|r| r.state).collect();
        assert_eq!(states, vec![StepState::Done, StepState::Current, StepState::Locked]);
        assert!(rows[2].is_last);
        assert!(!rows[1].is_last);
    }

    #[test]
    fn test_remaining_and_active() {
        let mut done = create_test_task();
        let ids: Vec<String> = done.sub_tasks.iter().map(|s| s.id.clone()).collect();
        for id in &ids {
            done.check_subtask(id).unwrap();
        }
        let open = create_test_task();
        let tasks = vec![done, open];

        assert_eq!(remaining_pomodoros(&tasks), 4);
        assert_eq!(active_tasks(&tasks).len(), 1);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(progress_bar(50, 4), "██░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(250, 4), "████");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::seconds(25 * 60)), "25:00");
        assert_eq!(format_countdown(Duration::seconds(61)), "01:01");
        assert_eq!(format_countdown(Duration::seconds(-3)), "00:00");
    }

    #[test]
    fn test_format_focus_time() {
        assert_eq!(format_focus_time(45.0), "45m");
        assert_eq!(format_focus_time(120.0), "2h");
        assert_eq!(format_focus_time(150.0), "2h 30m");
    }

    #[test]
    fn test_tree_connector() {
        assert_eq!(tree_connector(false), "├─");
        assert_eq!(tree_connector(true), "└─");
    }
}
