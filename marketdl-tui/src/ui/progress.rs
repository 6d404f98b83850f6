//! Screen 3 — Progress: gauge, job id, terminal phase banner.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::Frame;

use marketdl_core::domain::JobPhase;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let wf = &app.workflow;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    // Job header.
    let job = wf
        .job_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".into());
    let header = Line::from(vec![
        Span::styled("job ", theme::secondary()),
        Span::styled(job, theme::neutral()),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    // Progress gauge.
    let progress = wf.job_progress().clamp(0.0, 100.0);
    let gauge_style = match wf.job_phase() {
        JobPhase::Completed => theme::positive(),
        JobPhase::Failed => theme::negative(),
        _ => theme::accent(),
    };
    let gauge = Gauge::default()
        .gauge_style(gauge_style)
        .percent(progress as u16)
        .label(format!("{progress:.0}%"));
    f.render_widget(gauge, chunks[1]);

    // Phase banner + hints.
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));
    match wf.job_phase() {
        JobPhase::Completed => {
            lines.push(Line::from(Span::styled("download complete", theme::positive())));
        }
        JobPhase::Failed => {
            lines.push(Line::from(Span::styled("download failed", theme::negative())));
        }
        _ => {
            lines.push(Line::from(Span::styled("downloading…", theme::warning())));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("[c/Esc] close  [q] quit", theme::muted())));
    f.render_widget(Paragraph::new(lines), chunks[2]);
}
