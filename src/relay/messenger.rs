use super::RelayError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Message body accepted by the bot API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payload: Keyboard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyboard {
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    pub text: String,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: String,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    /// Attach an inline keyboard with a single open-app button
    pub fn with_open_app_button(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.attachments.push(Attachment {
            kind: "inline_keyboard",
            payload: Keyboard {
                buttons: vec![Button {
                    text: label.into(),
                    action: ButtonAction {
                        kind: "open_app",
                        url: url.into(),
                    },
                }],
            },
        });
        self
    }
}

/// Outgoing side of the bot
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: &str, message: &OutboundMessage) -> Result<(), RelayError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    chat_id: Value,
    #[serde(flatten)]
    message: &'a OutboundMessage,
}

/// Numeric chat ids go out as numbers, anything else as a string
fn chat_id_value(chat_id: &str) -> Value {
    match chat_id.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(chat_id),
    }
}

/// Messenger backed by the MAX bot HTTP API
pub struct MaxMessenger {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl MaxMessenger {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait]
impl Messenger for MaxMessenger {
    async fn send(&self, chat_id: &str, message: &OutboundMessage) -> Result<(), RelayError> {
        let Some(token) = &self.token else {
            warn!("MAX_BOT_TOKEN not set, skipping message to chat {}", chat_id);
            return Err(RelayError::MissingToken);
        };

        let body = SendRequest {
            chat_id: chat_id_value(chat_id),
            message,
        };
        self.client
            .post(format!("{}/messages/send", self.api_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        debug!("Sent message to chat {}", chat_id);
        Ok(())
    }
}
