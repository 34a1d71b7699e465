//! Gateway - everything between the session and the move-computation backend
//!
//! The session never talks to a socket. It emits requests; this crate runs
//! them against a [`Backend`] on a private tokio runtime and hands results
//! back to the sync loop.
//!
//! # Backends
//!
//! - [`LocalBackend`]: in-process reference backend (rules, AI, history)
//! - [`TcpBackend`]: remote backend over line-delimited JSON
//! - [`AnyBackend`]: whichever of the two the environment selects
//!
//! # Protocol Overview
//!
//! One JSON object per line. Requests carry `op`, `seq` and `ts`; responses
//! echo `seq` and carry `status` (`success` or `error`) plus the
//! operation's fields. See [`protocol`] for the records.
//!
//! | op | request fields | success fields |
//! |---|---|---|
//! | `new_game` | `difficulty` | `session_id`, `board` |
//! | `move` | `session_id`, `row`, `col` | `board`, `game_status`, `ai_move`, `winner_line` |
//! | `undo` | `session_id`, `steps` | `board`, `undo_count` |
//! | `hint` | `session_id` | `row`, `col`, `hint_count` |
//! | `history` | | `metadata`, `games` |
//!
//! # Environment Variables
//!
//! - `GOMOKU_BACKEND_ADDR`: remote backend `host:port`; unset runs in-process
//! - `GOMOKU_REQUEST_TIMEOUT_MS`: per-request timeout (default: 5000)
//! - `GOMOKU_SERVER_HOST` / `GOMOKU_SERVER_PORT`: server bind (default: 127.0.0.1:7878)
//! - `GOMOKU_SEED`: seed for the reference backend's AI
//!
//! # Testing
//!
//! Run `gomoku-server` and talk to it with netcat:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"seq":1,"op":"new_game","difficulty":"easy"}
//! ```

pub mod ai;
pub mod backend;
pub mod client;
pub mod error;
pub mod local;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use gomoku_core as core;
pub use gomoku_types as types;

pub use backend::{dispatch, AnyBackend, Backend, Completion};
pub use client::{ClientConfig, TcpBackend};
pub use error::GatewayError;
pub use local::LocalBackend;
pub use runtime::{Completed, GatewayRuntime};
pub use server::{respond, run_server, ServerConfig};
