use crate::app::AppState;
use crate::domain::views::{pomodoro_counter, step_badge, tree_connector};
use crate::domain::{progress_bar, step_rows, StepState};
use crate::ui::styles::{
    border_style, deadline_style, default_style, done_style, locked_style, running_style, selected_style,
    title_style, tree_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the task details view: header, progress and the gated step list
pub fn render_details_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(task) = app.current_task() else {
        let empty = Paragraph::new("Задача не найдена").block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" Задача ", title_style())),
        );
        f.render_widget(empty, area);
        return;
    };

    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Прогресс: ", title_style()),
        Span::raw(format!(
            "{} {}% ({}/{} 🍅)",
            progress_bar(task.progress_percent(), 20),
            task.progress_percent(),
            task.completed_pomodoros,
            task.total_pomodoros
        )),
    ]));
    if let Some(deadline) = &task.deadline {
        lines.push(Line::from(vec![
            Span::styled("Дедлайн: ", title_style()),
            Span::styled(deadline.clone(), deadline_style()),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Шаги: ", title_style()),
        Span::raw(format!("{}/{}", task.completed_subtasks(), task.sub_tasks.len())),
    ]));
    lines.push(Line::raw(""));

    for row in step_rows(task) {
        let subtask = &task.sub_tasks[row.index];
        let state_style = match row.state {
            StepState::Done => done_style(),
            StepState::Current => running_style(),
            StepState::Locked => locked_style(),
        };
        let style = if row.index == app.selected_subtask {
            selected_style()
        } else {
            default_style()
        };

        let mut line = Line::from(vec![
            Span::styled(format!("{} ", tree_connector(row.is_last)), tree_style()),
            Span::styled(format!("{} ", step_badge(row.state)), state_style),
            Span::raw(format!("{}. {}", row.index + 1, subtask.title)),
            Span::raw(format!("  {}", pomodoro_counter(subtask))),
        ]);
        line.style = style;
        lines.push(line);
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(format!(" {} ", task.title), title_style())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}
