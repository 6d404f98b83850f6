//! Top-level UI layout — one screen at a time plus a status bar.

pub mod browse;
pub mod configure;
pub mod progress;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use marketdl_core::workflow::Screen;

use crate::app::AppState;
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    draw_screen(f, chunks[0], app);
    status_bar::render(f, chunks[1], app);
}

fn draw_screen(f: &mut Frame, area: Rect, app: &AppState) {
    let title = match app.screen() {
        Screen::Browsing => " Browse [1/3] ",
        Screen::Configuring => " Configure [2/3] ",
        Screen::InProgress => " Download [3/3] ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border())
        .title(title)
        .title_style(theme::panel_title());

    let inner = block.inner(area);
    f.render_widget(block, area);

    match app.screen() {
        Screen::Browsing => browse::render(f, inner, app),
        Screen::Configuring => configure::render(f, inner, app),
        Screen::InProgress => progress::render(f, inner, app),
    }
}
