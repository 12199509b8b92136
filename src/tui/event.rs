//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes. Key behavior
//! depends on which panel has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Focus};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
    /// Run the submitted input line (question or `/add` command)
    Submit(String),
}

/// Handles a keyboard event and updates the app state accordingly.
///
/// # Event Handling
///
/// - `Ctrl+C`: quit from anywhere
/// - `q`: quit unless the question input is focused
/// - `Tab` / `Shift+Tab`: cycle focus between panels
/// - `Esc`: return to the question input
/// - Question input: characters edit the buffer, `Enter` submits it
/// - History: `j`/`k` navigate, `c` toggles citations
/// - Detail view: `j`/`k` scroll, `c` toggles citations
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }

    match key.code {
        KeyCode::Tab => {
            app.next_focus();
            return KeyAction::Continue;
        }
        KeyCode::BackTab => {
            app.prev_focus();
            return KeyAction::Continue;
        }
        KeyCode::Esc => {
            app.reset_focus();
            return KeyAction::Continue;
        }
        _ => {}
    }

    if app.focus() != Focus::QuestionInput
        && key.code == KeyCode::Char('q')
        && key.modifiers.is_empty()
    {
        return KeyAction::Quit;
    }

    match app.focus() {
        Focus::QuestionInput => handle_question_input(app, key),
        Focus::History => {
            handle_history(app, key);
            KeyAction::Continue
        }
        Focus::DetailView => {
            handle_detail_view(app, key);
            KeyAction::Continue
        }
    }
}

fn handle_question_input(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_input_char(c);
        }
        KeyCode::Backspace => {
            app.pop_input_char();
        }
        KeyCode::Enter => {
            let input = app.take_input();
            if !input.trim().is_empty() {
                return KeyAction::Submit(input);
            }
        }
        _ => {}
    }
    KeyAction::Continue
}

fn handle_history(app: &mut App, key: KeyEvent) {
    if !key.modifiers.is_empty() {
        return;
    }
    match key.code {
        KeyCode::Char('j') => app.select_next(),
        KeyCode::Char('k') => app.select_previous(),
        KeyCode::Char('c') => app.toggle_selected_citations(),
        _ => {}
    }
}

fn handle_detail_view(app: &mut App, key: KeyEvent) {
    if !key.modifiers.is_empty() {
        return;
    }
    match key.code {
        KeyCode::Char('j') => app.scroll_detail_down(1),
        KeyCode::Char('k') => app.scroll_detail_up(1),
        KeyCode::Char('c') => app.toggle_selected_citations(),
        _ => {}
    }
}
