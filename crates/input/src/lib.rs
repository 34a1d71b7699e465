//! Terminal input mapping.
//!
//! Independent of any UI framework: turns `crossterm` key and mouse events
//! into [`UiCommand`]s. Clicks carry raw terminal cells; the renderer decides
//! which intersection (if any) they hit.

pub mod map;

pub use gomoku_types as types;

pub use map::{handle_event, handle_key_event, handle_mouse_event, should_quit, UiCommand};
