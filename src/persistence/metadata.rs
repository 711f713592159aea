use serde::{Deserialize, Serialize};

/// Binding of this client to a chat session, stored under `max_bridge`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// Launch auth token forwarded as `X-Max-Auth`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_url: Option<String>,
}

impl BridgeInfo {
    /// Overlay values given on the command line. Returns true if anything changed.
    pub fn merge(&mut self, other: BridgeInfo) -> bool {
        let before = self.clone();
        if other.user_id.is_some() {
            self.user_id = other.user_id;
        }
        if other.chat_id.is_some() {
            self.chat_id = other.chat_id;
        }
        if other.auth_token.is_some() {
            self.auth_token = other.auth_token;
        }
        if other.sync_url.is_some() {
            self.sync_url = other.sync_url;
        }
        *self != before
    }

    /// A bridge can sync once it knows the user and the endpoint
    pub fn can_sync(&self) -> bool {
        self.user_id.is_some() && self.sync_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlays_present_values() {
        let mut bridge = BridgeInfo {
            user_id: Some("u1".to_string()),
            chat_id: Some("c1".to_string()),
            ..BridgeInfo::default()
        };

        let changed = bridge.merge(BridgeInfo {
            chat_id: Some("c2".to_string()),
            sync_url: Some("http://localhost:3000/api/sync".to_string()),
            ..BridgeInfo::default()
        });

        assert!(changed);
        assert_eq!(bridge.user_id.as_deref(), Some("u1"));
        assert_eq!(bridge.chat_id.as_deref(), Some("c2"));
        assert!(bridge.can_sync());

        assert!(!bridge.merge(BridgeInfo::default()));
    }

    #[test]
    fn test_bridge_json_skips_missing_fields() {
        let bridge = BridgeInfo {
            user_id: Some("42".to_string()),
            ..BridgeInfo::default()
        };
        let json = serde_json::to_string(&bridge).unwrap();
        assert_eq!(json, "{\"userId\":\"42\"}");
    }
}
