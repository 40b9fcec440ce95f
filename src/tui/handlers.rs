// File: src/tui/handlers.rs
use crate::client::ApiError;
use crate::manager::{Outcome, Request};
use crate::tui::action::{Action, AppEvent};
use crate::tui::state::{AppState, Focus, FormField};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

pub fn handle_app_event(state: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::Status(s) => state.message = s,
        AppEvent::Done(outcome) => {
            let loaded = match &outcome {
                Outcome::Listed(events) => Some(events.len()),
                _ => None,
            };
            let updated = matches!(outcome, Outcome::Updated { .. });

            match state.editor.apply(outcome) {
                Ok(()) => {
                    if let Some(count) = loaded {
                        state.message = format!("{} events loaded.", count);
                    }
                }
                // Server-side failures are only logged
                Err(e @ ApiError::Unavailable(_)) => state.message = format!("Error: {}", e),
                Err(_) => {}
            }

            state.loading = false;
            state.clamp_selection();
            if updated && state.focus == Focus::Form {
                state.focus_form(state.field);
            }
        }
    }
    state.pump_notices(Instant::now());
}

/// Called when an action could not be handed to the network task, so any
/// in-flight marker it set is released.
pub fn handle_undelivered(state: &mut AppState, action: Action) {
    if let Action::Send(request) = action {
        log::error!("Network task is gone, dropping {:?}", request);
        let failed = Outcome::Failed {
            id: request.target().cloned(),
            error: ApiError::Unavailable("network task stopped".to_string()),
        };
        handle_app_event(state, AppEvent::Done(failed));
    }
}

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    match state.focus {
        Focus::Form => handle_form_key(key, state),
        Focus::List => handle_list_key(key, state),
    }
}

fn handle_form_key(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    match key.code {
        KeyCode::Enter
            if state.field == FormField::Description
                && key
                    .modifiers
                    .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
        {
            state.enter_char('\n');
        }
        KeyCode::Enter => return submit(state),
        KeyCode::Esc => {
            if state.editor.mode.editing_id().is_some() {
                state.editor.cancel_editing();
                state.cursor_position = 0;
            }
            state.focus_list();
        }
        KeyCode::Tab | KeyCode::BackTab => state.toggle_field(),
        KeyCode::Char(c) => state.enter_char(c),
        KeyCode::Backspace => state.delete_char(),
        KeyCode::Left => state.move_cursor_left(),
        KeyCode::Right => state.move_cursor_right(),
        _ => {}
    }
    None
}

/// Turns the form into a request. The draft itself is only cleared once the
/// server confirms, so a failed request leaves it in place.
fn submit(state: &mut AppState) -> Option<Action> {
    let request = Request::from(state.editor.submission());
    if let Some(id) = request.target() {
        if !state.editor.begin_request(id) {
            state.message = "Still saving this event...".to_string();
            return None;
        }
    }
    Some(Action::Send(request))
}

fn handle_list_key(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => state.next(),
        KeyCode::Char('k') | KeyCode::Up => state.previous(),
        KeyCode::PageDown => state.jump_forward(10),
        KeyCode::PageUp => state.jump_backward(10),
        KeyCode::Char('a') | KeyCode::Tab => state.focus_form(FormField::Name),
        KeyCode::Char('e') => {
            if let Some(event) = state.get_selected_event().cloned() {
                state.editor.start_editing(&event);
                state.focus_form(FormField::Name);
            }
        }
        KeyCode::Char('d') => {
            let id = state.get_selected_event().map(|e| e.id.clone())?;
            if !state.editor.begin_request(&id) {
                state.message = "Still waiting on the server for this event...".to_string();
                return None;
            }
            return Some(Action::Send(Request::Delete(id)));
        }
        KeyCode::Char('r') => {
            state.loading = true;
            state.message = "Reloading...".to_string();
            return Some(Action::Send(Request::List));
        }
        _ => {}
    }
    None
}
