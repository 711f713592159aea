use super::messenger::OutboundMessage;
use super::store::TaskSnapshot;

/// Tasks listed in a reminder before the "and N more" line
const REMINDER_TASK_LIMIT: usize = 3;

/// Mini-app link carrying the user and chat binding
pub fn open_app_url(webapp_url: &str, user_id: &str, chat_id: &str) -> String {
    format!("{}?user_id={}&chat_id={}", webapp_url, user_id, chat_id)
}

pub fn welcome(app_url: &str) -> OutboundMessage {
    OutboundMessage::text(
        "🎯 Добро пожаловать в Фокус Помощник!\n\n\
         Я помогу вам организовать задачи и повысить продуктивность с помощью техники Pomodoro.\n\n\
         Откройте мини-приложение, чтобы начать работу:",
    )
    .with_open_app_button("📱 Открыть мини-приложение", app_url)
}

pub fn open_app(app_url: &str) -> OutboundMessage {
    OutboundMessage::text("Открыть мини-приложение:").with_open_app_button("📱 Открыть", app_url)
}

pub fn help() -> OutboundMessage {
    OutboundMessage::text(
        "🤖 Команды бота:\n\n\
         /start - Начать работу\n\
         /app - Открыть мини-приложение\n\
         /help - Показать помощь\n\n\
         Бот будет напоминать вам о незавершенных задачах в активные часы.",
    )
}

pub fn start_hint() -> OutboundMessage {
    OutboundMessage::text("Напишите /start, чтобы открыть мини-приложение.")
}

fn task_word(count: u32) -> &'static str {
    if count == 1 {
        "задача"
    } else {
        "задач"
    }
}

/// Reminder about unfinished tasks
pub fn reminder(webapp_url: &str, incomplete: u32, tasks: &[TaskSnapshot]) -> OutboundMessage {
    let mut text = format!(
        "⏰ Напоминание о незавершенных задачах\n\nУ вас {} незавершенных {}:\n\n",
        incomplete,
        task_word(incomplete)
    );

    let lines: Vec<String> = tasks
        .iter()
        .take(REMINDER_TASK_LIMIT)
        .enumerate()
        .map(|(i, task)| format!("{}. {} ({}% завершено)", i + 1, task.title, task.progress))
        .collect();
    text.push_str(&lines.join("\n"));

    if tasks.len() > REMINDER_TASK_LIMIT {
        text.push_str(&format!("\n\n...и еще {} задач", tasks.len() - REMINDER_TASK_LIMIT));
    }
    text.push_str("\n\nПродолжите работу над задачами! 💪");

    OutboundMessage::text(text).with_open_app_button("📱 Открыть мини-приложение", webapp_url)
}
