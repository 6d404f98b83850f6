//! Keyboard input dispatch — global keys first, then per-screen handlers.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use marketdl_core::domain::MarketType;
use marketdl_core::workflow::Screen;

use crate::app::{AppState, FormRow};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // The search box consumes everything while editing.
    if app.screen() == Screen::Browsing && app.query_editing {
        handle_query_edit(app, key);
        return;
    }

    // Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Esc => {
            app.close_dialog();
            return;
        }
        _ => {}
    }

    match app.screen() {
        Screen::Browsing => handle_browse_key(app, key),
        Screen::Configuring => handle_configure_key(app, key),
        Screen::InProgress => handle_progress_key(app, key),
    }
}

fn handle_query_edit(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.query_editing = false;
        }
        KeyCode::Backspace => {
            app.query_input.pop();
            app.edit_query(Instant::now());
        }
        KeyCode::Char(c) => {
            app.query_input.push(c);
            app.edit_query(Instant::now());
        }
        _ => {}
    }
}

fn handle_browse_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('/') => {
            app.query_editing = true;
            app.query_input = app.workflow.query().to_string();
        }
        KeyCode::Char(c @ '1'..='3') => {
            let market = MarketType::from_index(c as usize - '1' as usize).unwrap();
            app.workflow.set_market_type(market);
            app.query_input.clear();
            app.browse_cursor = 0;
        }
        KeyCode::Tab => {
            let market = app.workflow.market_type().next();
            app.workflow.set_market_type(market);
            app.query_input.clear();
            app.browse_cursor = 0;
        }
        KeyCode::BackTab => {
            let market = app.workflow.market_type().prev();
            app.workflow.set_market_type(market);
            app.query_input.clear();
            app.browse_cursor = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let rows = app.workflow.page_items().len();
            if rows > 0 && app.browse_cursor + 1 < rows {
                app.browse_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.browse_cursor = app.browse_cursor.saturating_sub(1);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.workflow.prev_page();
            app.clamp_browse_cursor();
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.workflow.next_page();
            app.clamp_browse_cursor();
        }
        KeyCode::Char(' ') => {
            if let Some(instrument) = app.cursor_instrument().cloned() {
                let selected = app.workflow.toggle(&instrument);
                let verb = if selected { "selected" } else { "deselected" };
                app.set_status(format!("{verb} {}", instrument.symbol));
            }
        }
        KeyCode::Char('d') | KeyCode::Enter => {
            app.try_configure();
        }
        KeyCode::Char('r') => {
            app.request_catalog_load();
        }
        _ => {}
    }
}

fn handle_configure_key(app: &mut AppState, key: KeyEvent) {
    let rows = app.form_rows();

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.form_cursor + 1 < rows.len() {
                app.form_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.form_cursor = app.form_cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') => match rows[app.form_cursor] {
            FormRow::DataType(data_type) => app.workflow.toggle_data_type(data_type),
            FormRow::Timeframe => app.workflow.cycle_timeframe(1),
            FormRow::StartDate | FormRow::EndDate => {}
        },
        KeyCode::Char('h') | KeyCode::Left => match rows[app.form_cursor] {
            FormRow::Timeframe => app.workflow.cycle_timeframe(-1),
            FormRow::StartDate => app.workflow.adjust_start_date(-1),
            FormRow::EndDate => app.workflow.adjust_end_date(-1),
            FormRow::DataType(_) => {}
        },
        KeyCode::Char('l') | KeyCode::Right => match rows[app.form_cursor] {
            FormRow::Timeframe => app.workflow.cycle_timeframe(1),
            FormRow::StartDate => app.workflow.adjust_start_date(1),
            FormRow::EndDate => app.workflow.adjust_end_date(1),
            FormRow::DataType(_) => {}
        },
        KeyCode::Char('H') => match rows[app.form_cursor] {
            FormRow::StartDate => app.workflow.adjust_start_date(-30),
            FormRow::EndDate => app.workflow.adjust_end_date(-30),
            _ => {}
        },
        KeyCode::Char('L') => match rows[app.form_cursor] {
            FormRow::StartDate => app.workflow.adjust_start_date(30),
            FormRow::EndDate => app.workflow.adjust_end_date(30),
            _ => {}
        },
        KeyCode::Char('b') | KeyCode::Backspace => {
            if app.workflow.back_to_browse().is_ok() {
                app.set_status("back to browse");
            }
        }
        KeyCode::Enter => {
            app.try_submit();
        }
        _ => {}
    }
}

fn handle_progress_key(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('c') = key.code {
        app.close_dialog();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{loaded_app, sources};
    use marketdl_core::backend::LocalJobEngine;
    use marketdl_core::domain::{JobPhase, MarketDataType};
    use marketdl_core::search::SEARCH_DEBOUNCE;
    use std::sync::Arc;
    use std::time::Duration;

    fn press(app: &mut AppState, code: KeyCode) {
        handle_key(app, KeyEvent::from(code));
    }

    fn type_str(app: &mut AppState, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut app = loaded_app(3);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn tab_cycles_market_and_resets_cursor() {
        let mut app = loaded_app(3);
        app.browse_cursor = 2;
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.workflow.market_type(), marketdl_core::domain::MarketType::Stock);
        assert_eq!(app.browse_cursor, 0);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.workflow.market_type(), marketdl_core::domain::MarketType::Crypto);
    }

    #[test]
    fn cursor_stays_inside_the_page() {
        let mut app = loaded_app(2);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.browse_cursor, 1); // two crypto rows
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.browse_cursor, 0);
    }

    #[test]
    fn paging_keys_clamp() {
        let mut app = loaded_app(15);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.workflow.page(), 2);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.workflow.page(), 2); // last page
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.workflow.page(), 1);
    }

    #[test]
    fn typed_query_executes_after_quiet_window() {
        let mut app = loaded_app(3);
        press(&mut app, KeyCode::Char('/'));
        assert!(app.query_editing);
        type_str(&mut app, "aapl");
        press(&mut app, KeyCode::Enter);
        assert!(!app.query_editing);

        let events = app
            .workflow
            .tick(Instant::now() + SEARCH_DEBOUNCE + Duration::from_millis(10));
        assert_eq!(events.len(), 1);
        assert_eq!(app.workflow.displayed().len(), 1);
        assert_eq!(app.workflow.displayed()[0].symbol, "AAPL");
    }

    #[test]
    fn full_dialog_flow_via_keys() {
        let mut app = loaded_app(3);
        app.engine = Some(Arc::new(
            LocalJobEngine::new(sources()).with_item_delay(Duration::ZERO),
        ));

        // Select the first two rows and open the configure screen.
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.screen(), Screen::Configuring);
        assert_eq!(app.workflow.selection().len(), 2);

        // Toggle News on via its checkbox row.
        app.form_cursor = 4; // News is the last selectable type
        press(&mut app, KeyCode::Char(' '));
        assert!(app.workflow.form().has_data_type(MarketDataType::News));

        // Submit and land on the progress screen.
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::InProgress);
        assert_eq!(app.workflow.job_phase(), JobPhase::Streaming);

        // Close tears everything down.
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::Browsing);
        assert!(app.workflow.selection().is_empty());
        assert_eq!(app.workflow.job_phase(), JobPhase::Idle);
    }

    #[test]
    fn back_keeps_the_selection() {
        let mut app = loaded_app(3);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.screen(), Screen::Configuring);
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.screen(), Screen::Browsing);
        assert_eq!(app.workflow.selection().len(), 1);
    }

    #[test]
    fn timeframe_row_cycles_with_h_l() {
        let mut app = loaded_app(3);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('d'));
        app.form_cursor = 5; // timeframe row
        assert_eq!(app.workflow.form().timeframe, "1h");
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.workflow.form().timeframe, "1d");
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.workflow.form().timeframe, "1h");
    }

    #[test]
    fn date_rows_step_by_day_and_month() {
        let mut app = loaded_app(3);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('d'));
        let start = app.workflow.form().start_date;
        app.form_cursor = 6; // start date row
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.workflow.form().start_date, start - chrono::Duration::days(1));
        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.workflow.form().start_date, start + chrono::Duration::days(29));
    }
}
