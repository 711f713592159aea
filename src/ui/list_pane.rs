use crate::app::AppState;
use crate::domain::views::{active_tasks, remaining_pomodoros};
use crate::domain::{level_title, progress_bar, Task};
use crate::ui::styles::{
    border_style, deadline_style, default_style, done_style, hint_style, quote_style, selected_style, title_style,
};
use chrono::Local;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Render the task list of the home view
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let items: Vec<ListItem> = if app.tasks.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "  Задач пока нет. Нажмите a, чтобы добавить первую.",
            hint_style(),
        )))]
    } else {
        app.tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                let style = if idx == app.selected_index {
                    selected_style()
                } else {
                    default_style()
                };
                ListItem::new(create_task_line(task)).style(style)
            })
            .collect()
    };

    let date = Local::now().format("%a %b %d");
    let title = format!(" Мои задачи ({}) ", date);

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}

/// Format: ✓ Thesis  ██████░░░░ 6/10 🍅  [до 20 мая]
fn create_task_line(task: &Task) -> Line<'static> {
    let mut spans = Vec::new();

    if task.is_complete() {
        spans.push(Span::styled("✓ ".to_string(), done_style()));
    } else {
        spans.push(Span::raw("  ".to_string()));
    }

    spans.push(Span::raw(task.title.clone()));
    spans.push(Span::raw("  ".to_string()));
    spans.push(Span::raw(format!(
        "{} {}/{} 🍅",
        progress_bar(task.progress_percent(), 10),
        task.completed_pomodoros,
        task.total_pomodoros
    )));

    if let Some(deadline) = &task.deadline {
        spans.push(Span::styled(format!("  [до {}]", deadline), deadline_style()));
    }

    Line::from(spans)
}

/// Render the home side pane: quote of the moment and a progress summary
pub fn render_home_sidebar(f: &mut Frame, app: &AppState, area: Rect) {
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(format!("«{}»", app.quote.text), quote_style())),
        Line::from(Span::styled(format!("  — {}", app.quote.author), hint_style())),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Уровень: ", title_style()),
            Span::raw(format!("{} ({})", app.stats.level, level_title(app.stats.xp))),
        ]),
        Line::from(vec![
            Span::styled("Серия: ", title_style()),
            Span::raw(format!("{} дн.", app.stats.current_streak)),
        ]),
        Line::from(vec![
            Span::styled("Активных задач: ", title_style()),
            Span::raw(active_tasks(&app.tasks).len().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Осталось: ", title_style()),
            Span::raw(format!("{} 🍅", remaining_pomodoros(&app.tasks))),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" Сегодня ", title_style())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}
