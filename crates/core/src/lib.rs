//! Core session logic - pure, deterministic, and testable
//!
//! This crate holds the board model and the client-side session state machine.
//! It has **no dependencies** on terminals, sockets or async runtimes:
//!
//! - **Deterministic**: the same inputs always produce the same effects
//! - **Testable**: every transition is a plain method call
//! - **Portable**: the loop driving it can be a terminal, a test, or a GUI
//!
//! # Module Structure
//!
//! - [`board`]: immutable 15x15 snapshot, five-in-a-row detection, wire rows
//! - [`session`]: phase machine mediating between renderer and backend
//! - [`stats`]: read-only projection of the backend's history summary
//! - [`timers`]: cooperative timers for AI pacing and hint expiry
//! - [`rng`]: small seeded generator for the reference backend
//!
//! # Example
//!
//! ```
//! use gomoku_core::{Board, Effect, Phase, Reply, Session};
//! use gomoku_types::{Coord, Difficulty};
//!
//! let mut session = Session::new();
//! let fx = session.new_game(Difficulty::Easy);
//! let Effect::Submit(create) = &fx[0] else { unreachable!() };
//!
//! session.complete(
//!     create.tag,
//!     Ok(Reply::Created { session_id: "abc".into(), board: Board::new() }),
//! );
//! assert_eq!(session.phase(), Phase::PlayerTurn);
//!
//! // One click submits exactly one move; a second click is dropped.
//! assert_eq!(session.click(Coord::new(7, 7)).len(), 1);
//! assert!(session.click(Coord::new(7, 7)).is_empty());
//! ```

pub mod board;
pub mod rng;
pub mod session;
pub mod stats;
pub mod timers;

pub use gomoku_types as types;

pub use board::{Board, BoardError, WinLine, DIRECTIONS, MAX_LINE_LEN};
pub use rng::SimpleRng;
pub use session::{Dispatch, Effect, Effects, Game, MoveReply, Phase, Reply, Request, Session, Tag};
pub use stats::{HistorySummary, StatsView};
pub use timers::{TimerEvent, TimerQueue};
