//! Interactive ranking editor.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use tokio::task::JoinHandle;

use crate::ranking::Direction;
use crate::store::{load_with_retry, DocumentStore, Loaded, Revision, StoreError};

/// A save or reload that outlives this is reported as a timeout.
const STORE_TIMEOUT: Duration = Duration::from_secs(20);

type Pending<T> = Option<JoinHandle<Result<T, StoreError>>>;

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Log lines would tear the display; hold them until restore
    crate::stderr_buffer::activate();

    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let mut pending_save: Pending<Revision> = None;
    let mut pending_load: Pending<Loaded> = None;

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(anyhow::Error::from(e));
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        if pending_save.is_none() {
            if let Some(staged) = app.take_save_request() {
                let store = app.session.store().clone();
                let previous = app.session.revision().clone();
                log::debug!("saving: {}", staged.change.message);
                pending_save = Some(tokio::spawn(async move {
                    with_timeout(store.save(&staged.document, &previous, &staged.change.message))
                        .await
                }));
            }
        }

        if pending_save.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = pending_save.take() {
                app.finish_save(joined(handle.await));
            }
        }

        if app.needs_reload && pending_load.is_none() && pending_save.is_none() {
            app.needs_reload = false;
            app.is_loading = true;
            let store = app.session.store().clone();
            pending_load = Some(tokio::spawn(async move {
                with_timeout(load_with_retry(&store)).await
            }));
        }

        if pending_load.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = pending_load.take() {
                app.finish_reload(joined(handle.await));
            }
        }

        if app.should_quit {
            if pending_save.is_none() {
                break Ok(());
            }
            // Let the in-flight save land before leaving
            app.should_quit = false;
            app.show_flash("Waiting for save to finish...".to_string());
        }
    };

    ratatui::restore();

    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

async fn with_timeout<T>(
    future: impl std::future::Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(STORE_TIMEOUT, future).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::transport(
            None,
            format!("timed out after {}s", STORE_TIMEOUT.as_secs()),
        )),
    }
}

fn joined<T>(
    result: Result<Result<T, StoreError>, tokio::task::JoinError>,
) -> Result<T, StoreError> {
    result.unwrap_or_else(|e| Err(StoreError::transport(None, format!("task failed: {}", e))))
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true
            }

            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

            KeyCode::Char('J') => app.nudge_selected(Direction::Down),
            KeyCode::Char('K') => app.nudge_selected(Direction::Up),

            KeyCode::Char(' ') | KeyCode::Char('m') => app.start_move(),
            KeyCode::Char('a') => app.open_picker(),
            KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
            KeyCode::Char('b') => app.show_breakdown(),
            KeyCode::Char('r') => app.request_reload(),

            KeyCode::Char('o') => match app.open_data_file() {
                Ok(true) => app.show_flash("Opened data file in browser".to_string()),
                Ok(false) => app.show_flash("In-memory store has no web page".to_string()),
                Err(e) => app.show_flash(format!("Failed to open browser: {}", e)),
            },

            KeyCode::Char('?') => app.show_help(),
            _ => {}
        },
        app::InputMode::Moving { .. } => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Char(' ') | KeyCode::Char('m') | KeyCode::Enter => app.drop_move(),
            KeyCode::Esc => app.cancel_move(),
            _ => {}
        },
        app::InputMode::AddPicker => match key.code {
            KeyCode::Enter => app.confirm_picker(),
            KeyCode::Esc => app.cancel_picker(),
            KeyCode::Down => app.picker_next(),
            KeyCode::Up => app.picker_previous(),
            KeyCode::Backspace => app.picker_backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.picker_input(c)
            }
            _ => {}
        },
        app::InputMode::Breakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') => app.dismiss_breakdown(),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            _ => {}
        },
        // Any key exits help
        app::InputMode::Help => app.dismiss_help(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coaster, DataFile, MAIN_LIST};
    use crate::scoring::ScoringConfig;
    use crate::session::Session;
    use crate::store::{Gateway, MemoryStore};
    use chrono::Utc;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    async fn editor() -> App {
        let mut doc = DataFile::default();
        for id in ["a", "b"] {
            doc.coasters.push(Coaster {
                id: id.into(),
                name: id.to_uppercase(),
                park_id: "p".into(),
                manufacturer_id: None,
                notes: None,
            });
            crate::ranking::add_to_list(&mut doc, MAIN_LIST, id, Utc::now()).unwrap();
        }
        let session = Session::open(Gateway::Memory(MemoryStore::new(doc)))
            .await
            .unwrap();
        App::new(
            session,
            ScoringConfig::default(),
            MAIN_LIST,
            ThemeColors::dark(),
        )
    }

    #[tokio::test]
    async fn test_grab_and_cancel_keys() {
        let mut app = editor().await;
        press(&mut app, KeyCode::Char(' '));
        assert!(matches!(app.input_mode, app::InputMode::Moving { from: 0, .. }));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(app.save_request.is_none());
    }

    #[tokio::test]
    async fn test_picker_swallows_letters() {
        let mut app = editor().await;
        app.input_mode = app::InputMode::AddPicker;
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.picker_filter, "q");
    }

    #[tokio::test]
    async fn test_help_closes_on_any_key() {
        let mut app = editor().await;
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.input_mode, app::InputMode::Help);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.input_mode, app::InputMode::Normal);
    }
}
