use crate::app::AppState;
use crate::domain::achievements::ACHIEVEMENTS;
use crate::domain::stats::XP_PER_LEVEL;
use crate::domain::{format_focus_time, level_title};
use crate::report::share_text;
use crate::ui::styles::{border_style, done_style, hint_style, locked_style, quote_style, title_style, xp_gauge_style};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

/// Render the statistics view: counters, level gauge, achievements and share text
pub fn render_stats_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let stats = &app.stats;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Counters
            Constraint::Length(3), // Level gauge
            Constraint::Min(0),    // Achievements
        ])
        .split(area);

    let counters = vec![
        Line::from(vec![
            Span::styled("Сессий: ", title_style()),
            Span::raw(stats.total_sessions.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Время фокуса: ", title_style()),
            Span::raw(format_focus_time(stats.total_focus_time)),
        ]),
        Line::from(vec![
            Span::styled("Серия: ", title_style()),
            Span::raw(format!("{} дн. (рекорд {})", stats.current_streak, stats.longest_streak)),
        ]),
        Line::from(vec![
            Span::styled("Уровень: ", title_style()),
            Span::raw(format!("{} - {} · {} XP", stats.level, level_title(stats.xp), stats.xp)),
        ]),
    ];
    let counters = Paragraph::new(counters).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" 📊 Статистика ", title_style())),
    );
    f.render_widget(counters, chunks[0]);

    let progress = stats.level_progress();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_style(border_style()))
        .gauge_style(xp_gauge_style())
        .percent(progress.min(100) as u16)
        .label(format!("{}/{} XP до уровня {}", stats.xp % XP_PER_LEVEL, XP_PER_LEVEL, stats.level + 1));
    f.render_widget(gauge, chunks[1]);

    let mut lines = Vec::new();
    for achievement in ACHIEVEMENTS {
        if stats.has_achievement(achievement.id) {
            lines.push(Line::from(vec![
                Span::raw(format!("{} ", achievement.icon)),
                Span::styled(achievement.title, done_style()),
                Span::styled(format!("  {}", achievement.description), hint_style()),
            ]));
        } else {
            lines.push(Line::from(Span::styled(
                format!("🔒 {}  {}", achievement.title, achievement.description),
                locked_style(),
            )));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(share_text(stats), quote_style())));

    let achievements = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" 🏆 Достижения ", title_style())),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(achievements, chunks[2]);
}
