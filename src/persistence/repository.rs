use super::metadata::BridgeInfo;
use super::store::{KeyValueStore, StoreError};
use crate::domain::{Settings, Stats, Task};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub const SETTINGS_KEY: &str = "focus_settings";
pub const TASKS_KEY: &str = "focus_tasks";
pub const STATS_KEY: &str = "focus_stats";
pub const LAST_LABEL_KEY: &str = "focus_last_label";
pub const LAST_SESSION_DATE_KEY: &str = "focus_last_session_date";
pub const BRIDGE_KEY: &str = "max_bridge";

/// Typed access to the persisted blobs.
///
/// Reads never fail: a missing or corrupt blob yields the default value and a
/// warning. Writes report their error so callers can log and continue.
pub struct FocusRepository {
    store: Box<dyn KeyValueStore>,
}

impl FocusRepository {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(source) => {
                let err = StoreError::Json {
                    key: key.to_string(),
                    source,
                };
                warn!("Ignoring corrupt blob: {}", err);
                None
            }
        }
    }

    fn save_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &json)?;
        debug!("Saved {} ({} bytes)", key, json.len());
        Ok(())
    }

    pub fn load_settings(&self) -> Settings {
        self.load_json(SETTINGS_KEY).unwrap_or_default()
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.save_json(SETTINGS_KEY, settings)
    }

    /// Load tasks with their aggregates re-derived from the subtasks
    pub fn load_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.load_json(TASKS_KEY).unwrap_or_default();
        for task in &mut tasks {
            task.normalize();
        }
        tasks
    }

    pub fn save_tasks(&mut self, tasks: &[Task]) -> Result<(), StoreError> {
        self.save_json(TASKS_KEY, &tasks)
    }

    pub fn load_stats(&self) -> Stats {
        let mut stats: Stats = self.load_json(STATS_KEY).unwrap_or_default();
        stats.normalize();
        stats
    }

    /// Save stats. If storage is full, the task cache is dropped to make room
    /// and the write is retried once.
    pub fn save_stats(&mut self, stats: &Stats) -> Result<(), StoreError> {
        match self.save_json(STATS_KEY, stats) {
            Err(StoreError::QuotaExceeded { .. }) => {
                warn!("Storage quota exceeded saving stats, clearing {} and retrying", TASKS_KEY);
                self.store.remove(TASKS_KEY)?;
                self.save_json(STATS_KEY, stats)
            }
            other => other,
        }
    }

    pub fn load_last_label(&self) -> Option<String> {
        self.load_json(LAST_LABEL_KEY)
    }

    pub fn save_last_label(&mut self, label: &str) -> Result<(), StoreError> {
        self.save_json(LAST_LABEL_KEY, &label)
    }

    pub fn load_last_session_date(&self) -> Option<NaiveDate> {
        self.load_json(LAST_SESSION_DATE_KEY)
    }

    pub fn save_last_session_date(&mut self, date: NaiveDate) -> Result<(), StoreError> {
        self.save_json(LAST_SESSION_DATE_KEY, &date)
    }

    pub fn load_bridge(&self) -> BridgeInfo {
        self.load_json(BRIDGE_KEY).unwrap_or_default()
    }

    pub fn save_bridge(&mut self, bridge: &BridgeInfo) -> Result<(), StoreError> {
        self.save_json(BRIDGE_KEY, bridge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlannedStep, ProductiveTime};
    use crate::persistence::store::{FileStore, MemoryStore};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_task(id: &str) -> Task {
        Task::new(
            id.to_string(),
            "Sample".to_string(),
            Some("2026-06-01".to_string()),
            &[PlannedStep::new("One", 2), PlannedStep::new("Two", 1)],
            Utc::now(),
        )
    }

    #[test]
    fn test_missing_blobs_load_defaults() {
        let repo = FocusRepository::new(Box::new(MemoryStore::default()));
        assert_eq!(repo.load_settings(), Settings::default());
        assert!(repo.load_tasks().is_empty());
        assert_eq!(repo.load_stats(), Stats::default());
        assert_eq!(repo.load_last_label(), None);
        assert_eq!(repo.load_last_session_date(), None);
    }

    #[test]
    fn test_corrupt_blob_loads_default() {
        let mut store = MemoryStore::default();
        store.values.insert(SETTINGS_KEY.to_string(), "{not json".to_string());
        let repo = FocusRepository::new(Box::new(store));
        assert_eq!(repo.load_settings(), Settings::default());
    }

    #[test]
    fn test_file_backed_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let mut repo = FocusRepository::new(Box::new(FileStore::new(temp_dir.path())));

        let mut settings = Settings::default();
        settings.productive_time = ProductiveTime::Night;
        settings.is_onboarded = true;
        repo.save_settings(&settings).unwrap();
        repo.save_tasks(&[sample_task("task-1")]).unwrap();
        repo.save_last_label("Reading").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        repo.save_last_session_date(date).unwrap();

        let reopened = FocusRepository::new(Box::new(FileStore::new(temp_dir.path())));
        assert_eq!(reopened.load_settings(), settings);
        assert_eq!(reopened.load_tasks()[0].total_pomodoros, 3);
        assert_eq!(reopened.load_last_label().as_deref(), Some("Reading"));
        assert_eq!(reopened.load_last_session_date(), Some(date));
    }

    #[test]
    fn test_load_tasks_rederives_aggregates() {
        let mut task = sample_task("task-1");
        task.total_pomodoros = 40;
        task.completed_pomodoros = 7;
        let mut store = MemoryStore::default();
        store
            .values
            .insert(TASKS_KEY.to_string(), serde_json::to_string(&vec![task]).unwrap());

        let repo = FocusRepository::new(Box::new(store));
        let tasks = repo.load_tasks();
        assert_eq!(tasks[0].total_pomodoros, 3);
        assert_eq!(tasks[0].completed_pomodoros, 0);
    }

    #[test]
    fn test_stats_quota_drops_tasks_and_retries() {
        let tasks_json = serde_json::to_string(&vec![sample_task("task-1"), sample_task("task-2")]).unwrap();
        let stats_len = serde_json::to_string(&Stats::default()).unwrap().len() as u64;

        let mut store = MemoryStore::default();
        store.values.insert(TASKS_KEY.to_string(), tasks_json);
        store.quota = Some(stats_len + 10);

        let mut repo = FocusRepository::new(Box::new(store));
        repo.save_stats(&Stats::default()).unwrap();

        assert!(repo.load_tasks().is_empty());
        assert_eq!(repo.load_stats(), Stats::default());
    }

    #[test]
    fn test_stats_quota_still_failing_after_retry() {
        let mut store = MemoryStore::default();
        store.quota = Some(4);
        let mut repo = FocusRepository::new(Box::new(store));
        let err = repo.save_stats(&Stats::default()).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
    }
}
