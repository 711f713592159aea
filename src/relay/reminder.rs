use super::messages;
use super::messenger::Messenger;
use super::store::{UserRecord, UserStore};
use super::RelayError;
use chrono::{DateTime, Duration, Local, Timelike, Utc};
use tracing::{debug, info, warn};

/// Whether a user should get a reminder at `now`
pub fn is_due(record: &UserRecord, now: DateTime<Local>, cooldown: Duration) -> bool {
    if record.chat_id.is_none() || record.incomplete_tasks == 0 {
        return false;
    }
    if !record.active_hours.contains(now.hour()) {
        return false;
    }
    match record.last_reminder {
        Some(last) => now.with_timezone(&Utc) - last >= cooldown,
        None => true,
    }
}

/// Send reminders to every due user. Returns how many were sent.
/// A failure for one user is logged and the sweep moves on.
pub async fn run_sweep(
    store: &dyn UserStore,
    messenger: &dyn Messenger,
    webapp_url: &str,
    now: DateTime<Local>,
    cooldown: Duration,
) -> Result<usize, RelayError> {
    let users = store.all().await?;
    let mut sent = 0;

    for (user_id, record) in users {
        if !is_due(&record, now, cooldown) {
            debug!("No reminder due for user {}", user_id);
            continue;
        }
        let Some(chat_id) = record.chat_id.clone() else {
            continue;
        };

        let message = messages::reminder(webapp_url, record.incomplete_tasks, &record.tasks);
        if let Err(e) = messenger.send(&chat_id, &message).await {
            warn!("Failed to send reminder to user {}: {}", user_id, e);
            continue;
        }

        // Records may have been rewritten by a sync while the send was in flight
        if let Err(e) = store.record_reminder(&user_id, now.with_timezone(&Utc)).await {
            warn!("Failed to record reminder for user {}: {}", user_id, e);
            continue;
        }
        info!("Sent reminder to user {}", user_id);
        sent += 1;
    }

    Ok(sent)
}
