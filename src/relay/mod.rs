//! Chat-bot relay: receives bot webhooks and client syncs, and sends
//! periodic reminders about unfinished tasks.

pub mod config;
pub mod handlers;
pub mod messages;
pub mod messenger;
pub mod reminder;
pub mod server;
pub mod store;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("user store failure: {0}")]
    Store(String),

    #[error("messenger request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("MAX_BOT_TOKEN is not configured")]
    MissingToken,

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub use config::RelayArgs;
pub use server::serve;
