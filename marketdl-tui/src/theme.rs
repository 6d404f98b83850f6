//! Neon-on-dark style tokens shared by every screen.
//!
//! Palette: electric cyan for focus and highlights, neon green for success,
//! hot pink for failures, orange for warnings, purple for secondary info,
//! steel blue for muted and disabled rows.

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn secondary() -> Style {
    Style::default().fg(TEXT_SECONDARY)
}

/// Cursor row: reversed accent.
pub fn cursor() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

/// Rows excluded at the chosen timeframe.
pub fn unavailable() -> Style {
    muted().add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
}

pub fn panel_border() -> Style {
    Style::default().fg(ACCENT)
}

pub fn panel_title() -> Style {
    accent().add_modifier(Modifier::BOLD)
}
