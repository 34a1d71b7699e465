//! Mapping from terminal events to UI commands.

use crate::types::Difficulty;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    NewGame,
    SetDifficulty(Difficulty),
    Undo,
    Hint,
    /// Primary click at a terminal cell.
    Click { column: u16, row: u16 },
    Quit,
}

/// Map any terminal event. Resize and focus events are left to the caller.
pub fn handle_event(event: &Event) -> Option<UiCommand> {
    match event {
        Event::Key(key) => handle_key_event(*key),
        Event::Mouse(mouse) => handle_mouse_event(*mouse),
        _ => None,
    }
}

/// Map keyboard input. Only presses count; repeats and releases are ignored.
pub fn handle_key_event(key: KeyEvent) -> Option<UiCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if should_quit(key) {
        return Some(UiCommand::Quit);
    }
    match key.code {
        KeyCode::Char('n') | KeyCode::Char('N') => Some(UiCommand::NewGame),
        KeyCode::Char('1') => Some(UiCommand::SetDifficulty(Difficulty::Easy)),
        KeyCode::Char('2') => Some(UiCommand::SetDifficulty(Difficulty::Medium)),
        KeyCode::Char('3') => Some(UiCommand::SetDifficulty(Difficulty::Hard)),
        KeyCode::Char('u') | KeyCode::Char('U') => Some(UiCommand::Undo),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(UiCommand::Hint),
        _ => None,
    }
}

/// Map mouse input: a left-button press is a click.
pub fn handle_mouse_event(mouse: MouseEvent) -> Option<UiCommand> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(UiCommand::Click {
            column: mouse.column,
            row: mouse.row,
        }),
        _ => None,
    }
}

/// Check if key should quit.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
