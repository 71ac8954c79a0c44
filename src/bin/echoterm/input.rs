//! Keyboard handling for the console.

use crate::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Interpret one keystroke. Returns `true` when the app should exit.
pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return true,
            KeyCode::Char('r') => app.press_mic(),
            KeyCode::Char('t') => app.toggle_mode(),
            KeyCode::Char('v') => app.toggle_speak(),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::F(1) => app.switch_view(View::Chat),
        KeyCode::F(2) => app.switch_view(View::Dashboard),
        KeyCode::F(3) => app.switch_view(View::Logs),
        KeyCode::F(4) => app.switch_view(View::Settings),
        KeyCode::Tab => {
            let next = app.view.next();
            app.switch_view(next);
        }
        KeyCode::Enter => match app.view {
            View::Settings => app.confirm_model(),
            _ => app.send_current_input(),
        },
        KeyCode::Backspace => app.backspace_input(),
        KeyCode::Esc => app.clear_input(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Char(c) => {
            if app.view == View::Chat {
                app.push_input_char(c);
            }
        }
        _ => {}
    }

    false
}
