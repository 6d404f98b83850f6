//! Screen 2 — Configure: selection list with availability split on the
//! left, the download form on the right.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, FormRow};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_selection(f, chunks[0], app);
    render_form(f, chunks[1], app);
}

fn render_selection(f: &mut Frame, area: Rect, app: &AppState) {
    let wf = &app.workflow;
    let available = wf.available_selection();
    let unavailable = wf.unavailable_selection();

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("Selection: ", theme::secondary()),
        Span::styled(format!("{}", wf.selection().len()), theme::accent()),
        Span::styled(
            format!(" ({} downloadable at {})", available.len(), wf.form().timeframe),
            theme::muted(),
        ),
    ]));
    lines.push(Line::from(""));

    for instrument in &available {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", instrument.symbol), theme::accent()),
            Span::styled(instrument.source_name.as_str(), theme::secondary()),
        ]));
    }

    // Excluded rows stay visible so the user sees what the request drops.
    for instrument in &unavailable {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", instrument.symbol), theme::unavailable()),
            Span::styled(instrument.source_name.as_str(), theme::unavailable()),
            Span::styled("  unavailable", theme::warning()),
        ]));
    }

    if available.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "no selected instrument supports this timeframe",
            theme::warning(),
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn render_form(f: &mut Frame, area: Rect, app: &AppState) {
    let wf = &app.workflow;
    let form = wf.form();
    let mut lines: Vec<Line> = Vec::new();

    for (at, row) in app.form_rows().iter().enumerate() {
        let is_cursor = at == app.form_cursor;
        let text = match row {
            FormRow::DataType(data_type) => {
                let mark = if form.has_data_type(*data_type) { "[x]" } else { "[ ]" };
                format!("{mark} {}", data_type.label())
            }
            FormRow::Timeframe => format!("timeframe  ‹ {} ›", form.timeframe),
            FormRow::StartDate => format!("start date ‹ {} ›", form.start_date),
            FormRow::EndDate => format!("end date   ‹ {} ›", form.end_date),
        };

        let style = if is_cursor {
            theme::cursor()
        } else {
            match row {
                FormRow::DataType(d) if form.has_data_type(*d) => theme::accent(),
                _ => theme::secondary(),
            }
        };
        lines.push(Line::from(Span::styled(text, style)));

        // Show the availability union under the timeframe picker.
        if matches!(row, FormRow::Timeframe) {
            let union = wf.availability().timeframes().join(" ");
            lines.push(Line::from(Span::styled(format!("  ({union})"), theme::muted())));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[j/k] field  [space] toggle  [h/l] adjust  [H/L] month",
        theme::muted(),
    )));
    lines.push(Line::from(Span::styled(
        "[Enter] submit  [b] back  [Esc] reset",
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines), area);
}
