/// Desktop notifications
/// Currently only implements macOS notifications

#[cfg(target_os = "macos")]
use std::process::Command;

/// Build the AppleScript for a notification, escaping quotes
fn notification_script(title: &str, body: &str) -> String {
    format!(
        r#"display notification "{}" with title "{}""#,
        body.replace('"', "\\\""),
        title.replace('"', "\\\"")
    )
}

fn send(title: &str, body: &str) {
    let script = notification_script(title, body);

    #[cfg(target_os = "macos")]
    {
        let _ = Command::new("osascript").arg("-e").arg(&script).output();
    }

    #[cfg(not(target_os = "macos"))]
    {
        tracing::debug!("Notification skipped on this platform: {}", script);
    }
}

/// Send a notification when a focus session ends
pub fn notify_session_complete(label: &str, break_minutes: f64) {
    send(
        "Focus - Session Complete",
        &format!("🎉 {}: отдохни {} минут!", label, break_minutes),
    );
}

/// Send a notification for a newly unlocked achievement
pub fn notify_achievement(icon: &str, title: &str) {
    send("Focus - Achievement", &format!("{} {}", icon, title));
}
