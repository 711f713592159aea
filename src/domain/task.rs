use super::error::FocusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of a task, worked through in pomodoro sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub estimated_pomodoros: u32,
    pub completed_pomodoros: u32,
}

impl SubTask {
    pub fn new(id: String, title: String, estimated_pomodoros: u32) -> Self {
        Self {
            id,
            title,
            completed: false,
            estimated_pomodoros: estimated_pomodoros.max(1),
            completed_pomodoros: 0,
        }
    }

    /// Count one finished session. Returns true if this session completed the subtask.
    pub fn record_pomodoro(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed_pomodoros = (self.completed_pomodoros + 1).min(self.estimated_pomodoros);
        self.sync_completed();
        self.completed
    }

    pub fn remaining_pomodoros(&self) -> u32 {
        self.estimated_pomodoros.saturating_sub(self.completed_pomodoros)
    }

    /// Progress in percent (0-100)
    pub fn progress_percent(&self) -> u32 {
        percent(self.completed_pomodoros, self.estimated_pomodoros)
    }

    fn sync_completed(&mut self) {
        self.completed = self.completed_pomodoros >= self.estimated_pomodoros;
    }
}

/// A planned step before it becomes a subtask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub title: String,
    pub estimated_pomodoros: u32,
}

impl PlannedStep {
    pub fn new(title: impl Into<String>, estimated_pomodoros: u32) -> Self {
        Self {
            title: title.into(),
            estimated_pomodoros,
        }
    }
}

/// A task made of ordered subtasks, stored in the `focus_tasks` blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
    #[serde(default)]
    pub total_pomodoros: u32,
    #[serde(default)]
    pub completed_pomodoros: u32,
}

impl Task {
    /// Build a task from a plan. Subtask ids derive from the task's creation time.
    pub fn new(id: String, title: String, deadline: Option<String>, plan: &[PlannedStep], created_at: DateTime<Utc>) -> Self {
        let millis = created_at.timestamp_millis();
        let sub_tasks: Vec<SubTask> = plan
            .iter()
            .enumerate()
            .map(|(i, step)| SubTask::new(format!("subtask-{}-{}", millis, i), step.title.clone(), step.estimated_pomodoros))
            .collect();

        let mut task = Self {
            id,
            title,
            deadline,
            created_at,
            sub_tasks,
            total_pomodoros: 0,
            completed_pomodoros: 0,
        };
        task.normalize();
        task
    }

    pub fn subtask(&self, subtask_id: &str) -> Option<&SubTask> {
        self.sub_tasks.iter().find(|s| s.id == subtask_id)
    }

    fn subtask_index(&self, subtask_id: &str) -> Result<usize, FocusError> {
        self.sub_tasks
            .iter()
            .position(|s| s.id == subtask_id)
            .ok_or_else(|| FocusError::SubTaskNotFound {
                task_id: self.id.clone(),
                subtask_id: subtask_id.to_string(),
            })
    }

    /// Check that a session may be started on the given subtask.
    /// Every earlier subtask must be completed and the subtask itself must not be.
    pub fn ensure_startable(&self, subtask_id: &str) -> Result<(), FocusError> {
        let index = self.subtask_index(subtask_id)?;
        let subtask = &self.sub_tasks[index];
        if subtask.completed {
            return Err(FocusError::SubTaskAlreadyDone(subtask.id.clone()));
        }
        if self.sub_tasks[..index].iter().any(|s| !s.completed) {
            return Err(FocusError::SubTaskLocked(subtask.id.clone()));
        }
        Ok(())
    }

    /// Whether the subtask is behind an unfinished earlier step
    pub fn is_locked(&self, index: usize) -> bool {
        self.sub_tasks[..index.min(self.sub_tasks.len())].iter().any(|s| !s.completed)
    }

    /// Count a finished session against a subtask, keeping the task aggregate in step.
    /// Returns true if the subtask became completed.
    pub fn record_pomodoro(&mut self, subtask_id: &str) -> Result<bool, FocusError> {
        let index = self.subtask_index(subtask_id)?;
        let subtask = &mut self.sub_tasks[index];
        let before = subtask.completed_pomodoros;
        let flipped = subtask.record_pomodoro();
        let gained = subtask.completed_pomodoros - before;
        self.completed_pomodoros += gained;
        Ok(flipped)
    }

    /// Mark a subtask fully done in one step (checkbox)
    pub fn check_subtask(&mut self, subtask_id: &str) -> Result<(), FocusError> {
        let index = self.subtask_index(subtask_id)?;
        let subtask = &mut self.sub_tasks[index];
        if subtask.completed {
            return Err(FocusError::SubTaskAlreadyDone(subtask.id.clone()));
        }
        let gained = subtask.estimated_pomodoros - subtask.completed_pomodoros;
        subtask.completed_pomodoros = subtask.estimated_pomodoros;
        subtask.completed = true;
        self.completed_pomodoros += gained;
        Ok(())
    }

    pub fn rename_subtask(&mut self, subtask_id: &str, title: &str) -> Result<(), FocusError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(FocusError::EmptyDescription);
        }
        let index = self.subtask_index(subtask_id)?;
        self.sub_tasks[index].title = title.to_string();
        Ok(())
    }

    /// Change a subtask's estimate. Aggregates are adjusted by delta and the
    /// completed count is clamped to the new estimate.
    pub fn resize_subtask(&mut self, subtask_id: &str, estimate: u32) -> Result<(), FocusError> {
        if estimate < 1 {
            return Err(FocusError::InvalidEstimate(estimate));
        }
        let index = self.subtask_index(subtask_id)?;
        let subtask = &mut self.sub_tasks[index];
        if subtask.completed {
            return Err(FocusError::SubTaskAlreadyDone(subtask.id.clone()));
        }

        let old_estimate = subtask.estimated_pomodoros;
        let old_completed = subtask.completed_pomodoros;
        subtask.estimated_pomodoros = estimate;
        subtask.completed_pomodoros = old_completed.min(estimate);
        subtask.sync_completed();
        let new_completed = subtask.completed_pomodoros;

        self.total_pomodoros = (self.total_pomodoros + estimate).saturating_sub(old_estimate);
        self.completed_pomodoros = (self.completed_pomodoros + new_completed).saturating_sub(old_completed);
        Ok(())
    }

    /// Remove a subtask, subtracting its contributions from the aggregates
    pub fn delete_subtask(&mut self, subtask_id: &str) -> Result<SubTask, FocusError> {
        let index = self.subtask_index(subtask_id)?;
        let removed = self.sub_tasks.remove(index);
        self.total_pomodoros = self.total_pomodoros.saturating_sub(removed.estimated_pomodoros);
        self.completed_pomodoros = self.completed_pomodoros.saturating_sub(removed.completed_pomodoros);
        Ok(removed)
    }

    /// Re-derive every aggregate from the subtasks (used on load)
    pub fn normalize(&mut self) {
        for subtask in &mut self.sub_tasks {
            subtask.estimated_pomodoros = subtask.estimated_pomodoros.max(1);
            subtask.completed_pomodoros = subtask.completed_pomodoros.min(subtask.estimated_pomodoros);
            subtask.sync_completed();
        }
        self.total_pomodoros = self.sub_tasks.iter().map(|s| s.estimated_pomodoros).sum();
        self.completed_pomodoros = self.sub_tasks.iter().map(|s| s.completed_pomodoros).sum();
    }

    pub fn is_complete(&self) -> bool {
        !self.sub_tasks.is_empty() && self.sub_tasks.iter().all(|s| s.completed)
    }

    pub fn completed_subtasks(&self) -> usize {
        self.sub_tasks.iter().filter(|s| s.completed).count()
    }

    /// Progress in percent (0-100)
    pub fn progress_percent(&self) -> u32 {
        percent(self.completed_pomodoros, self.total_pomodoros)
    }
}

/// Generate a time-derived task id, bumping the millisecond stamp past any existing id
pub fn next_task_id(tasks: &[Task], now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = format!("task-{}", millis);
        if !tasks.iter().any(|t| t.id == candidate) {
            return candidate;
        }
        millis += 1;
    }
}

fn percent(done: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Task::new(
            "task-1".to_string(),
            "Write report".to_string(),
            None,
            &[PlannedStep::new("Outline", 1), PlannedStep::new("Draft", 3), PlannedStep::new("Polish", 2)],
            created,
        )
    }

    fn assert_aggregates(task: &Task) {
        let total: u32 = task.sub_tasks.iter().map(|s| s.estimated_pomodoros).sum();
        let done: u32 = task.sub_tasks.iter().map(|s| s.completed_pomodoros).sum();
        assert_eq!(task.total_pomodoros, total);
        assert_eq!(task.completed_pomodoros, done);
        for s in &task.sub_tasks {
            assert!(s.completed_pomodoros <= s.estimated_pomodoros);
            assert_eq!(s.completed, s.completed_pomodoros >= s.estimated_pomodoros);
        }
    }

    #[test]
    fn test_task_new_derives_aggregates_and_ids() {
        let task = sample_task();
        assert_eq!(task.total_pomodoros, 6);
        assert_eq!(task.completed_pomodoros, 0);
        let millis = task.created_at.timestamp_millis();
        assert_eq!(task.sub_tasks[0].id, format!("subtask-{}-0", millis));
        assert_eq!(task.sub_tasks[2].id, format!("subtask-{}-2", millis));
        assert_aggregates(&task);
    }

    #[test]
    fn test_record_pomodoro_flips_on_estimate() {
        let mut task = sample_task();
        let draft = task.sub_tasks[1].id.clone();

        assert!(!task.record_pomodoro(&draft).unwrap());
        assert!(!task.record_pomodoro(&draft).unwrap());
        assert!(task.record_pomodoro(&draft).unwrap());
        assert!(task.sub_tasks[1].completed);

        // Further sessions are capped
        assert!(!task.record_pomodoro(&draft).unwrap());
        assert_eq!(task.sub_tasks[1].completed_pomodoros, 3);
        assert_eq!(task.completed_pomodoros, 3);
        assert_aggregates(&task);
    }

    #[test]
    fn test_gating_requires_prior_steps() {
        let mut task = sample_task();
        let outline = task.sub_tasks[0].id.clone();
        let draft = task.sub_tasks[1].id.clone();

        assert!(task.ensure_startable(&outline).is_ok());
        assert_eq!(task.ensure_startable(&draft), Err(FocusError::SubTaskLocked(draft.clone())));
        assert!(task.is_locked(1));

        task.record_pomodoro(&outline).unwrap();
        assert_eq!(task.ensure_startable(&outline), Err(FocusError::SubTaskAlreadyDone(outline.clone())));
        assert!(task.ensure_startable(&draft).is_ok());
        assert!(!task.is_locked(1));
    }

    #[test]
    fn test_unknown_subtask() {
        let task = sample_task();
        let err = task.ensure_startable("nope").unwrap_err();
        assert_eq!(
            err,
            FocusError::SubTaskNotFound {
                task_id: "task-1".to_string(),
                subtask_id: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_resize_adjusts_by_delta_and_clamps() {
        let mut task = sample_task();
        let draft = task.sub_tasks[1].id.clone();
        task.record_pomodoro(&draft).unwrap();
        task.record_pomodoro(&draft).unwrap();

        task.resize_subtask(&draft, 5).unwrap();
        assert_eq!(task.total_pomodoros, 8);
        assert_aggregates(&task);

        task.resize_subtask(&draft, 1).unwrap();
        assert_eq!(task.sub_tasks[1].completed_pomodoros, 1);
        assert!(task.sub_tasks[1].completed);
        assert_eq!(task.total_pomodoros, 4);
        assert_eq!(task.completed_pomodoros, 1);
        assert_aggregates(&task);
    }

    #[test]
    fn test_resize_rejects_zero_and_done() {
        let mut task = sample_task();
        let outline = task.sub_tasks[0].id.clone();
        assert_eq!(task.resize_subtask(&outline, 0), Err(FocusError::InvalidEstimate(0)));

        task.record_pomodoro(&outline).unwrap();
        assert!(matches!(task.resize_subtask(&outline, 4), Err(FocusError::SubTaskAlreadyDone(_))));
    }

    #[test]
    fn test_delete_subtask_decrements_aggregates() {
        let mut task = sample_task();
        let outline = task.sub_tasks[0].id.clone();
        task.record_pomodoro(&outline).unwrap();

        let removed = task.delete_subtask(&outline).unwrap();
        assert_eq!(removed.title, "Outline");
        assert_eq!(task.total_pomodoros, 5);
        assert_eq!(task.completed_pomodoros, 0);
        assert_aggregates(&task);
    }

    #[test]
    fn test_delete_subtask_clamps_at_zero() {
        let mut task = sample_task();
        task.total_pomodoros = 1;
        task.completed_pomodoros = 0;
        let draft = task.sub_tasks[1].id.clone();
        task.delete_subtask(&draft).unwrap();
        assert_eq!(task.total_pomodoros, 0);
        assert_eq!(task.completed_pomodoros, 0);
    }

    #[test]
    fn test_check_subtask_fills_estimate() {
        let mut task = sample_task();
        let polish = task.sub_tasks[2].id.clone();
        task.check_subtask(&polish).unwrap();
        assert!(task.sub_tasks[2].completed);
        assert_eq!(task.completed_pomodoros, 2);
        assert!(task.check_subtask(&polish).is_err());
        assert_aggregates(&task);
    }

    #[test]
    fn test_rename_subtask() {
        let mut task = sample_task();
        let outline = task.sub_tasks[0].id.clone();
        task.rename_subtask(&outline, "  Skeleton ").unwrap();
        assert_eq!(task.sub_tasks[0].title, "Skeleton");
        assert_eq!(task.rename_subtask(&outline, "   "), Err(FocusError::EmptyDescription));
    }

    #[test]
    fn test_normalize_repairs_stale_blob() {
        let mut task = sample_task();
        task.total_pomodoros = 99;
        task.sub_tasks[0].completed_pomodoros = 7;
        task.normalize();
        assert_eq!(task.sub_tasks[0].completed_pomodoros, 1);
        assert!(task.sub_tasks[0].completed);
        assert_aggregates(&task);
    }

    #[test]
    fn test_next_task_id_bumps_on_collision() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let mut existing = sample_task();
        existing.id = "task-1700000000000".to_string();
        assert_eq!(next_task_id(&[existing], now), "task-1700000000001");
        assert_eq!(next_task_id(&[], now), "task-1700000000000");
    }

    #[test]
    fn test_task_json_shape() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["totalPomodoros"], 6);
        assert_eq!(json["subTasks"][0]["estimatedPomodoros"], 1);
        assert!(json.get("deadline").is_none());

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }
}
