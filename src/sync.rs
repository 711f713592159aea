use crate::domain::{Settings, Stats, Task};
use crate::persistence::BridgeInfo;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header carrying the launch auth token
pub const AUTH_HEADER: &str = "X-Max-Auth";

/// Body of a push to the relay's sync endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    pub settings: Settings,
    pub tasks: Vec<Task>,
    pub stats: Stats,
}

/// What the relay echoes back. Blobs stay untyped; the client only logs them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Pushes local blobs to the relay so it can schedule reminders
#[derive(Debug, Clone)]
pub struct SyncClient {
    url: String,
    user_id: String,
    chat_id: Option<String>,
    auth_token: Option<String>,
}

impl SyncClient {
    /// Build a client when the bridge knows both the user and the endpoint
    pub fn from_bridge(bridge: &BridgeInfo) -> Option<Self> {
        if !bridge.can_sync() {
            return None;
        }
        Some(Self {
            url: bridge.sync_url.clone()?,
            user_id: bridge.user_id.clone()?,
            chat_id: bridge.chat_id.clone(),
            auth_token: bridge.auth_token.clone(),
        })
    }

    pub fn payload(&self, settings: &Settings, tasks: &[Task], stats: &Stats) -> SyncPayload {
        SyncPayload {
            user_id: self.user_id.clone(),
            chat_id: self.chat_id.clone(),
            settings: settings.clone(),
            tasks: tasks.to_vec(),
            stats: stats.clone(),
        }
    }

    /// Blocking push
    pub fn push(&self, payload: &SyncPayload) -> Result<SyncResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        let mut request = client.post(&self.url).json(payload);
        if let Some(token) = &self.auth_token {
            request = request.header(AUTH_HEADER, token);
        }

        let response = request
            .send()
            .with_context(|| format!("Failed to reach sync endpoint {}", self.url))?
            .error_for_status()
            .context("Sync endpoint rejected the push")?;

        response.json().context("Failed to decode sync response")
    }

    /// Push on a detached thread; failures are logged and otherwise ignored
    pub fn push_in_background(&self, payload: SyncPayload) {
        let client = self.clone();
        thread::spawn(move || match client.push(&payload) {
            Ok(response) => {
                info!("Synced {} tasks for user {}", payload.tasks.len(), payload.user_id);
                debug!("Relay holds blobs: {:?}", response.data.keys().collect::<Vec<_>>());
            }
            Err(e) => warn!("Sync failed, continuing local-only: {:#}", e),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_needs_user_and_url() {
        let mut bridge = BridgeInfo {
            user_id: Some("7".to_string()),
            ..BridgeInfo::default()
        };
        assert!(SyncClient::from_bridge(&bridge).is_none());

        bridge.sync_url = Some("http://127.0.0.1:3000/api/sync".to_string());
        assert!(SyncClient::from_bridge(&bridge).is_some());
    }

    #[test]
    fn test_payload_shape() {
        let bridge = BridgeInfo {
            user_id: Some("7".to_string()),
            chat_id: Some("99".to_string()),
            sync_url: Some("http://127.0.0.1:3000/api/sync".to_string()),
            auth_token: None,
        };
        let client = SyncClient::from_bridge(&bridge).unwrap();
        let payload = client.payload(&Settings::default(), &[], &Stats::default());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["userId"], "7");
        assert_eq!(json["chatId"], "99");
        assert_eq!(json["settings"]["pomodoroLength"], 25.0);
        assert!(json["tasks"].as_array().unwrap().is_empty());
    }
}
