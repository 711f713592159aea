use crate::app::{AppState, OnboardingState};
use crate::domain::settings::{DAILY_HOUR_OPTIONS, POMODORO_PRESETS};
use crate::domain::ProductiveTime;
use crate::ui::styles::{border_style, default_style, hint_style, selected_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Question and option labels of an onboarding step
fn step_options(step: usize) -> (&'static str, Vec<String>) {
    match step {
        0 => (
            "Сколько часов в день вы готовы уделять задачам?",
            DAILY_HOUR_OPTIONS.iter().map(|(_, label)| label.to_string()).collect(),
        ),
        1 => (
            "Когда вы наиболее продуктивны?",
            ProductiveTime::all()
                .iter()
                .map(|t| format!("{} {}", t.symbol(), t.label()))
                .collect(),
        ),
        _ => (
            "Выберите длительность сессий",
            POMODORO_PRESETS
                .iter()
                .map(|p| format!("{} ({} мин работы / {} мин отдыха)", p.label, p.work, p.rest))
                .collect(),
        ),
    }
}

pub fn render_onboarding_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let state = &app.onboarding;
    let choice = match state.step {
        0 => state.hours_choice,
        1 => state.time_choice,
        _ => state.preset_choice,
    };
    let (question, options) = step_options(state.step);

    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            format!("  Шаг {} из {}", state.step + 1, OnboardingState::STEPS),
            hint_style(),
        )),
        Line::raw(""),
        Line::from(Span::styled(format!("  {}", question), title_style())),
        Line::raw(""),
    ];

    for (i, option) in options.iter().enumerate() {
        let (marker, style) = if i == choice {
            ("›", selected_style())
        } else {
            (" ", default_style())
        };
        lines.push(Line::from(Span::styled(format!("  {} {}", marker, option), style)));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" 🎯 Добро пожаловать в Фокус Помощник ", title_style())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}
