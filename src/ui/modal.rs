use crate::app::AppState;
use crate::domain::UiMode;
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn render_box(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let height = (lines.len() as u16).saturating_add(2);
    let modal_area = create_modal_area(area, height);

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title.to_string(), modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

/// Render the session completion acknowledgment
pub fn render_completion_modal(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(modal) = &app.modal else {
        return;
    };

    let mut lines = vec![
        Line::raw(""),
        Line::raw(format!("  Сессия завершена: {}", modal.label)),
        Line::raw(format!("  +{} XP", modal.xp_gained)),
    ];
    if modal.subtask_finished {
        lines.push(Line::raw("  ✓ Шаг выполнен!"));
    }
    lines.push(Line::raw(""));
    lines.push(Line::raw(format!("  Время отдохнуть {} минут.", modal.break_minutes)));
    lines.push(Line::raw(format!("  💡 {}", modal.micro_break)));

    if !modal.unlocked.is_empty() {
        lines.push(Line::raw(""));
        for achievement in &modal.unlocked {
            lines.push(Line::from(vec![
                Span::raw(format!("  {} ", achievement.icon)),
                Span::styled(format!("Достижение: {}", achievement.title), modal_title_style()),
            ]));
        }
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![Span::styled("  [Enter]", modal_title_style()), Span::raw(" Отлично")]));

    render_box(f, area, " 🎉 Отличная работа! ", lines);
}

/// Render a yes/no confirmation for destructive actions
pub fn render_confirm_modal(f: &mut Frame, app: &AppState, area: Rect) {
    let (title, question) = match app.ui_mode {
        UiMode::ConfirmDeleteTask => (" Удалить задачу ", "Удалить задачу вместе со всеми шагами?"),
        UiMode::ConfirmCancelSession => (" Отменить сессию ", "Отменить сессию? Прогресс не будет засчитан."),
        _ => return,
    };

    let lines = vec![
        Line::raw(""),
        Line::raw(format!("  {}", question)),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  [y]", modal_title_style()),
            Span::raw(" Да  "),
            Span::styled("[n]", modal_title_style()),
            Span::raw(" Нет"),
        ]),
    ];

    render_box(f, area, title, lines);
}
