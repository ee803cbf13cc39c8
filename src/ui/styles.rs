use ratatui::style::{Color, Modifier, Style};

const ACCENT: Color = Color::LightBlue;
const MUTED: Color = Color::DarkGray;
const ALERT: Color = Color::LightRed;

pub fn default_style() -> Style {
    Style::default().fg(Color::Reset)
}

/// Highlighted row in the task list
pub fn selected_style() -> Style {
    Style::new()
        .fg(Color::Black)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// The task currently accruing time
pub fn active_style() -> Style {
    Style::new().fg(Color::LightGreen).add_modifier(Modifier::BOLD)
}

pub fn idle_style() -> Style {
    Style::new().fg(Color::Gray)
}

/// Elapsed time past estimate plus tolerance
pub fn over_estimate_style() -> Style {
    Style::new().fg(ALERT).add_modifier(Modifier::BOLD)
}

pub fn title_style() -> Style {
    Style::new().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn border_style() -> Style {
    Style::new().fg(MUTED)
}

pub fn modal_bg_style() -> Style {
    Style::new().bg(Color::Black).fg(Color::White)
}

pub fn modal_title_style() -> Style {
    Style::new().fg(Color::LightYellow).add_modifier(Modifier::BOLD)
}

/// Key hints and secondary text
pub fn hint_style() -> Style {
    Style::new().fg(MUTED).add_modifier(Modifier::ITALIC)
}

pub fn gauge_style() -> Style {
    Style::new().fg(Color::LightGreen).bg(MUTED)
}

/// Form validation errors and the unsaved-state notice
pub fn error_style() -> Style {
    Style::new().fg(ALERT)
}

pub fn done_style() -> Style {
    Style::new().fg(Color::Green).add_modifier(Modifier::DIM)
}
