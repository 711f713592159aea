use ratatui::style::{Color, Modifier, Style};

/// Default text style
pub fn default_style() -> Style {
    Style::default().fg(Color::White)
}

/// Selected row highlight style
pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightCyan)
        .add_modifier(Modifier::BOLD)
}

/// Running timer / current step style
pub fn running_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

/// Paused timer style
pub fn paused_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Locked step style
pub fn locked_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Tree connector style (for subtasks)
pub fn tree_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Title style for panes
pub fn title_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Border style
pub fn border_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Modal background style
pub fn modal_bg_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

/// Modal title style
pub fn modal_title_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Keybinding hint style
pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Countdown gauge style
pub fn gauge_style() -> Style {
    Style::default().fg(Color::Red).bg(Color::DarkGray)
}

/// XP / level gauge style
pub fn xp_gauge_style() -> Style {
    Style::default().fg(Color::Green).bg(Color::DarkGray)
}

/// Error message style
pub fn error_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

/// Done/completed style
pub fn done_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Deadline badge style
pub fn deadline_style() -> Style {
    Style::default().fg(Color::Blue)
}

/// Quote text style
pub fn quote_style() -> Style {
    Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC)
}
