//! Terminal board renderer.
//!
//! Renders into a plain framebuffer that is diff-flushed to the terminal,
//! without any widget toolkit. The board area behaves like a canvas: the
//! session's effects paint stones, hints and the winning line into it
//! incrementally, and hint expiry restores just the cells the hint covered.
//!
//! - [`BoardView`]: geometry, hit-testing and board painting
//! - [`panel`]: side panel with status, counters and history summary
//! - [`TerminalRenderer`]: raw-mode terminal plus diff flushing

pub mod board_view;
pub mod fb;
pub mod panel;
pub mod renderer;

pub use gomoku_core as core;
pub use gomoku_types as types;

pub use board_view::{BoardView, Point, Rect, Viewport, PANEL_WIDTH};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb, WIDE_TAIL};
pub use panel::{paint_panel, PanelModel};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
