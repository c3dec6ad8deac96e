use std::time::Instant;

use chrono::Utc;
use ratatui::widgets::{ListState, TableState};

use super::theme::ThemeColors;
use crate::aggregate::unranked;
use crate::catalog::Change;
use crate::error::ValidationError;
use crate::model::{Coaster, DataFile};
use crate::ranking::{self, Direction};
use crate::scoring::{breakdown, PointsBreakdown, ScoringConfig};
use crate::session::{stage, Session, Staged};
use crate::store::{Gateway, Loaded, Revision, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Carrying the entry that started at `from`; `to` is where it lands
    Moving { from: usize, to: usize },
    AddPicker,
    Help,
    Breakdown,
}

pub struct App {
    pub session: Session<Gateway>,
    pub scoring: ScoringConfig,
    pub list_id: String,
    pub colors: ThemeColors,
    pub table_state: TableState,
    pub picker_state: ListState,
    pub picker_filter: String,
    pub input_mode: InputMode,
    /// Live reorder shown while an entry is being moved
    pub preview: Option<DataFile>,
    /// Save asked for by a key handler, picked up by the event loop
    pub save_request: Option<Staged>,
    /// Save in flight. Its document is shown until the store answers.
    pub saving: Option<Staged>,
    pub flash_message: Option<(String, Instant)>,
    pub needs_reload: bool,
    pub is_loading: bool,
    pub should_quit: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(
        session: Session<Gateway>,
        scoring: ScoringConfig,
        list_id: &str,
        colors: ThemeColors,
    ) -> Self {
        let mut app = Self {
            session,
            scoring,
            list_id: list_id.to_string(),
            colors,
            table_state: TableState::default(),
            picker_state: ListState::default(),
            picker_filter: String::new(),
            input_mode: InputMode::Normal,
            preview: None,
            save_request: None,
            saving: None,
            flash_message: None,
            needs_reload: false,
            is_loading: false,
            should_quit: false,
            spinner_frame: 0,
        };
        if app.row_count() > 0 {
            app.table_state.select(Some(0));
        }
        app
    }

    /// Document to display: the move preview, else a pending or in-flight
    /// save, else the last saved state.
    pub fn document(&self) -> &DataFile {
        if let Some(preview) = &self.preview {
            return preview;
        }
        match self.save_request.as_ref().or(self.saving.as_ref()) {
            Some(staged) => &staged.document,
            None => self.session.document(),
        }
    }

    pub fn row_count(&self) -> usize {
        ranking::ordered_list(self.document(), &self.list_id).len()
    }

    pub fn is_busy(&self) -> bool {
        self.saving.is_some() || self.save_request.is_some() || self.is_loading
    }

    pub fn selected_coaster_id(&self) -> Option<String> {
        let index = self.table_state.selected()?;
        ranking::ordered_list(self.document(), &self.list_id)
            .get(index)
            .map(|r| r.coaster_id.clone())
    }

    pub fn next_row(&mut self) {
        if let InputMode::Moving { .. } = self.input_mode {
            self.move_target(1);
            return;
        }
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        if let InputMode::Moving { .. } = self.input_mode {
            self.move_target(-1);
            return;
        }
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    /// Stage a mutation and queue it for saving.
    fn mutate<F>(&mut self, mutator: F) -> bool
    where
        F: FnOnce(&mut DataFile) -> Result<Change, ValidationError>,
    {
        if self.is_busy() {
            self.show_flash("Save in progress, try again in a moment".to_string());
            return false;
        }
        match stage(self.session.document(), mutator) {
            Ok(Some(staged)) => {
                self.save_request = Some(staged);
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.show_flash(format!("Error: {}", e));
                false
            }
        }
    }

    fn follow(&mut self, coaster_id: &str) {
        if let Some(i) = ranking::position_of(self.document(), &self.list_id, coaster_id) {
            self.table_state.select(Some(i));
        }
    }

    pub fn nudge_selected(&mut self, direction: Direction) {
        let Some(id) = self.selected_coaster_id() else {
            return;
        };
        let list_id = self.list_id.clone();
        if self.mutate(|d| ranking::step(d, &list_id, &id, direction, Utc::now())) {
            self.follow(&id);
        }
    }

    pub fn remove_selected(&mut self) {
        let Some(id) = self.selected_coaster_id() else {
            return;
        };
        let name = self
            .document()
            .coaster(&id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let list_id = self.list_id.clone();
        if self.mutate(|d| ranking::unrank_coaster(d, &list_id, &id)) {
            self.show_flash(format!("Removing: {}", name));
        }
    }

    pub fn start_move(&mut self) {
        if self.is_busy() {
            self.show_flash("Save in progress, try again in a moment".to_string());
            return;
        }
        if let Some(from) = self.table_state.selected().filter(|&i| i < self.row_count()) {
            self.preview = Some(self.session.document().clone());
            self.input_mode = InputMode::Moving { from, to: from };
        }
    }

    fn move_target(&mut self, delta: isize) {
        let InputMode::Moving { from, to } = self.input_mode else {
            return;
        };
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let target = to.saturating_add_signed(delta).min(len - 1);

        let mut preview = self.session.document().clone();
        match ranking::move_entry(&mut preview, &self.list_id, from, target, Utc::now()) {
            Ok(()) => {
                self.preview = Some(preview);
                self.input_mode = InputMode::Moving { from, to: target };
                self.table_state.select(Some(target));
            }
            Err(e) => log::warn!("move preview failed: {}", e),
        }
    }

    pub fn drop_move(&mut self) {
        let InputMode::Moving { from, to } = self.input_mode else {
            return;
        };
        self.preview = None;
        self.input_mode = InputMode::Normal;
        let list_id = self.list_id.clone();
        if self.mutate(|d| ranking::reorder(d, &list_id, from, to, Utc::now())) {
            self.table_state.select(Some(to));
        }
    }

    pub fn cancel_move(&mut self) {
        if let InputMode::Moving { from, .. } = self.input_mode {
            self.table_state.select(Some(from));
        }
        self.preview = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn open_picker(&mut self) {
        if self.is_busy() {
            self.show_flash("Save in progress, try again in a moment".to_string());
            return;
        }
        if unranked(self.document(), &self.list_id).is_empty() {
            self.show_flash("Every coaster is already ranked".to_string());
            return;
        }
        self.picker_filter.clear();
        self.picker_state.select(Some(0));
        self.input_mode = InputMode::AddPicker;
    }

    /// Unranked coasters matching the picker filter by coaster or park name.
    pub fn picker_items(&self) -> Vec<&Coaster> {
        let doc = self.document();
        let needle = self.picker_filter.trim().to_lowercase();
        unranked(doc, &self.list_id)
            .into_iter()
            .filter(|c| {
                needle.is_empty()
                    || c.name.to_lowercase().contains(&needle)
                    || doc
                        .park_of(c)
                        .is_some_and(|p| p.name.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn picker_input(&mut self, c: char) {
        self.picker_filter.push(c);
        self.picker_state.select(Some(0));
    }

    pub fn picker_backspace(&mut self) {
        self.picker_filter.pop();
        self.picker_state.select(Some(0));
    }

    pub fn picker_next(&mut self) {
        let len = self.picker_items().len();
        if len == 0 {
            return;
        }
        let i = self.picker_state.selected().map_or(0, |i| (i + 1) % len);
        self.picker_state.select(Some(i));
    }

    pub fn picker_previous(&mut self) {
        let len = self.picker_items().len();
        if len == 0 {
            return;
        }
        let i = match self.picker_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.picker_state.select(Some(i));
    }

    pub fn confirm_picker(&mut self) {
        let picked = self
            .picker_state
            .selected()
            .and_then(|i| self.picker_items().get(i).map(|c| (c.id.clone(), c.name.clone())));
        self.input_mode = InputMode::Normal;

        let Some((id, name)) = picked else {
            return;
        };
        let list_id = self.list_id.clone();
        if self.mutate(|d| ranking::rank_coaster(d, &list_id, &id, Utc::now())) {
            self.follow(&id);
            self.show_flash(format!("Adding: {}", name));
        }
    }

    pub fn cancel_picker(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_breakdown(&mut self) {
        if self.selected_breakdown().is_some() {
            self.input_mode = InputMode::Breakdown;
        }
    }

    pub fn dismiss_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// How the selected row's points were computed.
    pub fn selected_breakdown(&self) -> Option<PointsBreakdown> {
        let index = self.table_state.selected()?;
        let total = self.row_count();
        if index >= total {
            return None;
        }
        breakdown(index as i64 + 1, total as i64, &self.scoring)
    }

    pub fn request_reload(&mut self) {
        if self.saving.is_some() || self.save_request.is_some() {
            self.show_flash("Save in progress, try again in a moment".to_string());
            return;
        }
        self.needs_reload = true;
        self.show_flash("Reloading...".to_string());
    }

    /// Hand the queued save to the event loop, keeping it on screen.
    pub fn take_save_request(&mut self) -> Option<Staged> {
        let staged = self.save_request.take()?;
        self.saving = Some(staged.clone());
        Some(staged)
    }

    pub fn finish_save(&mut self, result: Result<Revision, StoreError>) {
        let staged = self.saving.take();
        match (result, staged) {
            (Ok(revision), Some(staged)) => {
                self.show_flash(format!("Saved: {}", staged.change.message));
                self.session.accept(staged.document, revision);
            }
            (Ok(_), None) => {}
            (Err(e), _) if e.is_conflict() => {
                self.show_flash(
                    "Conflict: the data file changed elsewhere. Press r to reload.".to_string(),
                );
            }
            (Err(e), _) => self.show_flash(format!("Save failed: {}", e)),
        }
        self.clamp_selection();
    }

    pub fn finish_reload(&mut self, result: Result<Loaded, StoreError>) {
        self.is_loading = false;
        match result {
            Ok(loaded) => {
                self.show_flash(format!("Reloaded at {}", loaded.revision));
                self.session.accept(loaded.document, loaded.revision);
            }
            Err(e) => self.show_flash(format!("Reload failed: {}", e)),
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.row_count();
        if len == 0 {
            self.table_state.select(None);
        } else {
            let i = self.table_state.selected().unwrap_or(0).min(len - 1);
            self.table_state.select(Some(i));
        }
    }

    /// Open the data file on GitHub. Returns false for stores without a
    /// web page.
    pub fn open_data_file(&self) -> anyhow::Result<bool> {
        match self.session.store().location() {
            Some(location) => {
                crate::browser::open_url(&crate::browser::data_file_url(location))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
