use crate::app::AppState;
use crate::domain::{format_countdown, UiMode, View};
use crate::ui::styles::{error_style, hint_style, running_style};
use chrono::Utc;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Key hints for the current view and overlay
pub fn hints(app: &AppState) -> &'static str {
    match app.ui_mode {
        UiMode::Modal => " Enter ok",
        UiMode::EditingForm => " Tab next field   Enter submit   Esc cancel",
        UiMode::ConfirmDeleteTask | UiMode::ConfirmCancelSession => " y yes   n no",
        UiMode::Normal => match app.view {
            View::Onboarding => " ↑/↓ choose   Enter next   ← back   q quit",
            View::Home => " ↑/↓ select   Enter open   a add   f focus   p timer   s stats   x delete   o settings   r quote   q quit",
            View::CreateTask => " ↑/↓ select   + / - est   e rename   x remove   Enter save   Esc cancel",
            View::TaskDetails => " ↑/↓ select   Enter start   c check   + / - est   e rename   x remove   D delete task   Esc back",
            View::Pomodoro => " Space start/pause   c cancel   Esc back",
            View::Statistics => " Esc back   q quit",
        },
    }
}

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, app: &AppState, area: Rect) {
    let paragraph = Paragraph::new(Line::raw(hints(app))).style(hint_style());
    f.render_widget(paragraph, area);
}

/// Render the bottom status line: last error, else the running session
pub fn render_status(f: &mut Frame, app: &AppState, area: Rect) {
    let line = if let Some(status) = &app.status {
        Line::from(Span::styled(format!(" {}", status), error_style()))
    } else if let Some(session) = &app.session {
        let remaining = session.timer.remaining(Utc::now());
        Line::from(vec![
            Span::raw(" 🍅 "),
            Span::styled(format_countdown(remaining), running_style()),
            Span::raw(format!(" {}", session.timer.state().to_tag())),
        ])
    } else {
        Line::from(Span::styled(
            format!(" Уровень {} · {} XP · серия {} дн.", app.stats.level, app.stats.xp, app.stats.current_streak),
            hint_style(),
        ))
    };

    f.render_widget(Paragraph::new(line), area);
}
