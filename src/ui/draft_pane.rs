use crate::app::AppState;
use crate::ui::styles::{border_style, deadline_style, default_style, hint_style, selected_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the plan preview of a task being created
pub fn render_draft_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Новая задача ", title_style()));

    let Some(draft) = &app.draft else {
        let hint = Paragraph::new(Line::from(Span::styled("  Опишите задачу, и я разобью её на шаги.", hint_style())))
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let mut lines = vec![
        Line::from(vec![Span::styled("Задача: ", title_style()), Span::raw(draft.title.clone())]),
    ];
    if let Some(deadline) = &draft.deadline {
        lines.push(Line::from(vec![
            Span::styled("Дедлайн: ", title_style()),
            Span::styled(deadline.clone(), deadline_style()),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("План:", title_style())));

    for (i, step) in draft.steps.iter().enumerate() {
        let style = if i == draft.selected {
            selected_style()
        } else {
            default_style()
        };
        lines.push(Line::from(Span::styled(
            format!("  {}. {}  🍅 x{}", i + 1, step.title, step.estimated_pomodoros),
            style,
        )));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("Всего: ", title_style()),
        Span::raw(format!("{} 🍅", draft.total_pomodoros())),
    ]));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
