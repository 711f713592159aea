use crate::app::AppState;
use crate::domain::{format_countdown, TimerState};
use crate::session::SessionTarget;
use crate::ui::styles::{border_style, gauge_style, hint_style, paused_style, running_style, title_style};
use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Title of the thing being worked on
fn session_label(app: &AppState) -> String {
    match app.session.as_ref().map(|s| &s.target) {
        Some(SessionTarget::Subtask { task_id, subtask_id }) => app
            .find_task(task_id)
            .and_then(|t| t.subtask(subtask_id).map(|s| format!("{} · {}", t.title, s.title)))
            .unwrap_or_default(),
        Some(SessionTarget::Focus { label }) => label.clone(),
        None => String::new(),
    }
}

/// Render the countdown screen
pub fn render_pomodoro_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" 🍅 Помодоро ", title_style()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Label
            Constraint::Length(3), // Countdown
            Constraint::Length(3), // Gauge
            Constraint::Min(0),    // Hint
        ])
        .split(inner);

    let Some(session) = &app.session else {
        let idle = Paragraph::new("Нет активной сессии").alignment(Alignment::Center).style(hint_style());
        f.render_widget(idle, chunks[1]);
        return;
    };

    let now = Utc::now();
    let state = session.timer.state();
    let remaining = session.timer.remaining(now);

    let label = Paragraph::new(Line::from(Span::styled(session_label(app), title_style()))).alignment(Alignment::Center);
    f.render_widget(label, chunks[0]);

    let countdown_style = match state {
        TimerState::Paused => paused_style(),
        _ => running_style(),
    };
    let countdown = Paragraph::new(vec![
        Line::from(Span::styled(format_countdown(remaining), countdown_style)),
        Line::from(Span::styled(state.to_tag(), hint_style())),
    ])
    .alignment(Alignment::Center);
    f.render_widget(countdown, chunks[1]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(gauge_style())
        .ratio(session.timer.progress(now).clamp(0.0, 1.0))
        .label(format!("{:.0}%", session.timer.progress(now) * 100.0));
    f.render_widget(gauge, chunks[2]);

    let hint = match state {
        TimerState::Armed => "Нажмите Space, чтобы начать",
        TimerState::Running => "Сфокусируйтесь. Space - пауза",
        TimerState::Paused => "Пауза. Space - продолжить",
        _ => "",
    };
    f.render_widget(Paragraph::new(hint).alignment(Alignment::Center).style(hint_style()), chunks[3]);
}
