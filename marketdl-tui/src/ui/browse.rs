//! Screen 1 — Browse: market tabs, search box, paged instrument table.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use marketdl_core::catalog::row_number;
use marketdl_core::domain::MarketType;
use marketdl_core::workflow::CatalogState;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let wf = &app.workflow;
    let mut lines: Vec<Line> = Vec::new();

    // Market tabs.
    let mut tab_spans: Vec<Span> = Vec::new();
    for (i, market) in MarketType::ALL.iter().enumerate() {
        let style = if *market == wf.market_type() {
            theme::cursor()
        } else {
            theme::muted()
        };
        tab_spans.push(Span::styled(format!(" {} {} ", i + 1, market.label()), style));
        tab_spans.push(Span::raw(" "));
    }
    tab_spans.push(Span::styled("[1-3/Tab] switch", theme::muted()));
    lines.push(Line::from(tab_spans));

    // Search box.
    let mut search_spans = vec![Span::styled("search: ", theme::secondary())];
    if app.query_editing {
        search_spans.push(Span::styled(app.query_input.as_str(), theme::accent()));
        search_spans.push(Span::styled("▏", theme::accent()));
        search_spans.push(Span::styled("  [Enter/Esc] done", theme::muted()));
    } else if wf.query().is_empty() {
        search_spans.push(Span::styled("(none)  [/] search", theme::muted()));
    } else {
        search_spans.push(Span::styled(wf.query(), theme::accent()));
        search_spans.push(Span::styled("  [/] edit", theme::muted()));
    }
    lines.push(Line::from(search_spans));
    lines.push(Line::from(""));

    // Catalog state banner.
    match wf.catalog_state() {
        CatalogState::Loading => {
            lines.push(Line::from(Span::styled("loading catalog…", theme::warning())));
        }
        CatalogState::NotLoaded => {
            lines.push(Line::from(Span::styled(
                "catalog not loaded  [r] load",
                theme::warning(),
            )));
        }
        CatalogState::Failed(message) => {
            lines.push(Line::from(vec![
                Span::styled("catalog unavailable: ", theme::negative()),
                Span::styled(message.as_str(), theme::negative()),
                Span::styled("  [r] retry", theme::muted()),
            ]));
        }
        CatalogState::Ready => {
            render_table(&mut lines, app);
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[j/k] row  [h/l] page  [space] select  [d/Enter] download  [Esc] reset  [q] quit",
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines), area);
}

fn render_table(lines: &mut Vec<Line>, app: &AppState) {
    let wf = &app.workflow;
    let page = wf.page();

    if wf.page_items().is_empty() {
        lines.push(Line::from(Span::styled("no instruments match", theme::muted())));
    }

    for (offset, instrument) in wf.page_items().iter().enumerate() {
        let is_cursor = offset == app.browse_cursor;
        let is_selected = wf.is_selected(instrument);

        let mark = if is_selected { "[x]" } else { "[ ]" };
        let row = format!(
            "{mark} {:>3}  {:<12} {:<30} {}",
            row_number(page, offset),
            instrument.symbol,
            instrument.name,
            instrument.source_name,
        );

        let style = if is_cursor {
            theme::cursor()
        } else if is_selected {
            theme::accent()
        } else {
            theme::secondary()
        };
        lines.push(Line::from(Span::styled(row, style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            format!("page {}/{}", page, wf.page_count()),
            theme::neutral(),
        ),
        Span::styled(
            format!(" · {} instruments", wf.displayed().len()),
            theme::secondary(),
        ),
        Span::styled(
            format!(" · {} selected", wf.selection().len()),
            theme::accent(),
        ),
        Span::styled(format!(" · row {}", app.cursor_row_number()), theme::muted()),
    ]));
}
