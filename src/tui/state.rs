use crate::manager::{EditorState, Notice};
use crate::model::Event;
use ratatui::widgets::ListState;
use std::time::Instant;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Focus {
    List,
    Form,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FormField {
    Name,
    Description,
}

pub struct AppState {
    // Data
    pub editor: EditorState,

    // UI State
    pub list_state: ListState,
    pub focus: Focus,
    pub field: FormField,
    pub cursor_position: usize,
    pub message: String,
    pub loading: bool,
    pub server: String,

    notice: Option<(Notice, Instant)>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            editor: EditorState::new(),
            list_state: ListState::default(),
            focus: Focus::List,
            field: FormField::Name,
            cursor_position: 0,
            message: "Loading...".to_string(),
            loading: true,
            server: String::new(),
            notice: None,
        }
    }

    pub fn get_selected_event(&self) -> Option<&Event> {
        self.list_state
            .selected()
            .and_then(|idx| self.editor.store.get_index(idx))
    }

    /// Keeps the list selection inside the current bounds.
    pub fn clamp_selection(&mut self) {
        let len = self.editor.store.len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            let current = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(current.min(len - 1)));
        }
    }

    // --- NOTICES ---

    /// Moves freshly posted notices from the editor to the status bar.
    pub fn pump_notices(&mut self, now: Instant) {
        if let Some(latest) = self.editor.take_notices().pop() {
            self.notice = Some((latest, now));
        }
    }

    pub fn active_notice(&self, now: Instant) -> Option<&Notice> {
        match &self.notice {
            Some((notice, shown_at)) if now.duration_since(*shown_at) < notice.duration => {
                Some(notice)
            }
            _ => None,
        }
    }

    // --- FORM ---

    pub fn focus_form(&mut self, field: FormField) {
        self.focus = Focus::Form;
        self.field = field;
        self.cursor_position = self.field_value().chars().count();
    }

    pub fn focus_list(&mut self) {
        self.focus = Focus::List;
    }

    pub fn toggle_field(&mut self) {
        let next = match self.field {
            FormField::Name => FormField::Description,
            FormField::Description => FormField::Name,
        };
        self.focus_form(next);
    }

    pub fn field_value(&self) -> &str {
        match self.field {
            FormField::Name => &self.editor.draft.name,
            FormField::Description => &self.editor.draft.description,
        }
    }

    fn field_value_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Name => &mut self.editor.draft.name,
            FormField::Description => &mut self.editor.draft.description,
        }
    }

    fn byte_index(&self) -> usize {
        let value = self.field_value();
        value
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(value.len())
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }
    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }
    pub fn enter_char(&mut self, new_char: char) {
        let idx = self.byte_index();
        self.field_value_mut().insert(idx, new_char);
        self.move_cursor_right();
    }
    pub fn delete_char(&mut self) {
        if self.cursor_position != 0 {
            let current_index = self.cursor_position;
            let value = self.field_value();
            let before = value.chars().take(current_index - 1);
            let after = value.chars().skip(current_index);
            let updated: String = before.chain(after).collect();
            *self.field_value_mut() = updated;
            self.move_cursor_left();
        }
    }
    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.field_value().chars().count())
    }

    // --- NAVIGATION ---
    pub fn next(&mut self) {
        let len = self.editor.store.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }
    pub fn previous(&mut self) {
        let len = self.editor.store.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }
    pub fn jump_forward(&mut self, step: usize) {
        let len = self.editor.store.len();
        if len > 0 {
            let current = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some((current + step).min(len - 1)));
        }
    }
    pub fn jump_backward(&mut self, step: usize) {
        if !self.editor.store.is_empty() {
            let current = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(current.saturating_sub(step)));
        }
    }
}
