use crate::domain::UiMode;
use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};

/// Hints for the keys that work on the current screen
pub fn hints(mode: UiMode) -> &'static str {
    match mode {
        UiMode::StartScreen => " s start day   q quit",
        UiMode::Normal => {
            " ↑/↓ select   Enter start/stop   d done   x delete   a add   f focus   e end day   q quit"
        }
        UiMode::AddingTask => " Tab switch field   Enter add   Esc cancel",
        UiMode::PauseReminder => " Enter take break   z snooze   q quit",
        UiMode::ExceededAlert => " Enter keep going   p pause   d done",
        UiMode::ConfirmEndDay => " y end day   n cancel",
        UiMode::Focus => " Space timer   r reset   Enter stop task   d done   f/Esc leave focus   q quit",
    }
}

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, mode: UiMode, area: Rect) {
    let paragraph = Paragraph::new(Line::raw(hints(mode))).style(hint_style());
    f.render_widget(paragraph, area);
}
