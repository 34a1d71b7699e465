//! Gomoku session client (workspace facade crate).
//!
//! Re-exports the member crates under `crates/` so binaries and integration
//! tests can use one `gomoku_session::{core,gateway,input,term,types}` path,
//! and hosts the terminal [`app::App`] that wires them together.

pub mod app;
pub mod logging;

pub use gomoku_core as core;
pub use gomoku_gateway as gateway;
pub use gomoku_input as input;
pub use gomoku_term as term;
pub use gomoku_types as types;

pub use app::App;
