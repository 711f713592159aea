use super::RelayError;
use crate::domain::{ActiveHours, Settings, Task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

/// Unfinished task as the reminder sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default)]
    pub id: Value,
    pub title: String,
    #[serde(default)]
    pub progress: u32,
}

/// Everything the relay keeps about one user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRecord {
    pub chat_id: Option<String>,
    pub tasks: Vec<TaskSnapshot>,
    pub active_hours: ActiveHours,
    pub incomplete_tasks: u32,
    pub last_reminder: Option<DateTime<Utc>>,
    /// Raw blobs pushed by the client, echoed back on sync
    pub settings: Option<Value>,
    pub task_blob: Option<Value>,
    pub stats: Option<Value>,
}

impl UserRecord {
    /// Rebuild the reminder snapshot from synced client blobs.
    /// Blobs that don't parse leave the previous snapshot in place.
    pub fn derive_snapshot(&mut self) {
        if let Some(raw) = &self.settings {
            match serde_json::from_value::<Settings>(raw.clone()) {
                Ok(settings) => self.active_hours = settings.reminder_window(),
                Err(e) => warn!("Ignoring unreadable settings blob: {}", e),
            }
        }

        if let Some(raw) = &self.task_blob {
            match serde_json::from_value::<Vec<Task>>(raw.clone()) {
                Ok(tasks) => {
                    self.tasks = tasks
                        .iter()
                        .filter(|t| !t.is_complete())
                        .map(|t| TaskSnapshot {
                            id: Value::String(t.id.clone()),
                            title: t.title.clone(),
                            progress: t.progress_percent(),
                        })
                        .collect();
                    self.incomplete_tasks = self.tasks.len() as u32;
                }
                Err(e) => warn!("Ignoring unreadable task blob: {}", e),
            }
        }
    }
}

/// Per-user record storage
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, RelayError>;

    async fn put(&self, user_id: &str, record: UserRecord) -> Result<(), RelayError>;

    /// Snapshot of all users
    async fn all(&self) -> Result<Vec<(String, UserRecord)>, RelayError>;

    /// Stamp the last reminder time, leaving the rest of the stored record as is
    async fn record_reminder(&self, user_id: &str, at: DateTime<Utc>) -> Result<(), RelayError>;
}

/// Process-local store, lost on restart
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, RelayError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, record: UserRecord) -> Result<(), RelayError> {
        self.users.write().await.insert(user_id.to_string(), record);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<(String, UserRecord)>, RelayError> {
        let users = self.users.read().await;
        let mut records: Vec<(String, UserRecord)> = users.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    async fn record_reminder(&self, user_id: &str, at: DateTime<Utc>) -> Result<(), RelayError> {
        match self.users.write().await.get_mut(user_id) {
            Some(record) => {
                record.last_reminder = Some(at);
                Ok(())
            }
            None => Err(RelayError::Store(format!("user {} not found", user_id))),
        }
    }
}
