//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (session logic, rendering, wire protocol).
//!
//! # Board Dimensions
//!
//! Standard five-in-a-row board:
//!
//! - **Size**: 15x15 intersections (rows and columns indexed 0-14)
//! - **Center**: (7, 7)
//! - **Win length**: 5 stones in a row, horizontally, vertically or diagonally
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Input poll / timer resolution of the client loop |
//! | `AI_REPLY_DELAY_MS` | 300 | Pause before the AI's reply stone is painted |
//! | `HINT_TTL_MS` | 3000 | Lifetime of a hint marker |
//!
//! # Examples
//!
//! ```
//! use gomoku_types::{CellState, Coord, Difficulty, GameStatus, Side, BOARD_SIZE};
//!
//! assert_eq!(BOARD_SIZE, 15);
//!
//! let center = Coord::new(7, 7);
//! assert_eq!(Coord::checked(7, 7), Some(center));
//! assert_eq!(Coord::checked(15, 0), None);
//!
//! assert_eq!(Difficulty::from_str("EASY"), Some(Difficulty::Easy));
//! assert_eq!(GameStatus::from_str("ai_win"), Some(GameStatus::AiWin));
//! assert_eq!(CellState::from(Side::Player), CellState::Black);
//! ```

/// Board size in intersections per side (15x15)
pub const BOARD_SIZE: u8 = 15;

/// Number of cells on the board
pub const CELL_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Stones in a row needed to win
pub const WIN_LENGTH: u8 = 5;

/// Client loop tick / input poll interval in milliseconds
pub const TICK_MS: u32 = 16;

/// Delay before the AI's reply stone is painted (visual pacing only)
pub const AI_REPLY_DELAY_MS: u32 = 300;

/// How long a hint marker stays on the board
pub const HINT_TTL_MS: u32 = 3000;

/// Default undo step count: one player move and one AI reply
pub const DEFAULT_UNDO_STEPS: u8 = 2;

/// Undo limit per game enforced by the reference backend
pub const MAX_UNDOS_PER_GAME: u32 = 3;

/// Hint limit per game enforced by the reference backend
pub const MAX_HINTS_PER_GAME: u32 = 5;

/// Star points painted on the board (center and the four 3-3 points)
pub const STAR_POINTS: [Coord; 5] = [
    Coord::new(7, 7),
    Coord::new(3, 3),
    Coord::new(3, 11),
    Coord::new(11, 3),
    Coord::new(11, 11),
];


/// Which side acts: the human player (black) or the computer (white)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn opponent(&self) -> Self {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Ai => "ai",
        }
    }
}

/// State of a single board intersection
///
/// Wire codes follow the backend's grid encoding:
/// - `0`: empty
/// - `1`: black (player)
/// - `2`: white (AI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Empty,
    Black,
    White,
}

impl CellState {
    /// Parse a wire cell code
    ///
    /// # Examples
    ///
    /// ```
    /// use gomoku_types::CellState;
    ///
    /// assert_eq!(CellState::from_code(0), Some(CellState::Empty));
    /// assert_eq!(CellState::from_code(2), Some(CellState::White));
    /// assert_eq!(CellState::from_code(3), None);
    /// ```
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellState::Empty),
            1 => Some(CellState::Black),
            2 => Some(CellState::White),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Black => 1,
            CellState::White => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellState::Empty)
    }

    /// The side owning this stone, if any
    pub fn side(&self) -> Option<Side> {
        match self {
            CellState::Empty => None,
            CellState::Black => Some(Side::Player),
            CellState::White => Some(Side::Ai),
        }
    }
}

impl From<Side> for CellState {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => CellState::Black,
            Side::Ai => CellState::White,
        }
    }
}

/// Zero-based board coordinate (row, col), both in `[0, BOARD_SIZE)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Build a coordinate from signed values, rejecting anything off the board
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        let n = BOARD_SIZE as i32;
        if row < 0 || row >= n || col < 0 || col >= n {
            return None;
        }
        Some(Self::new(row as u8, col as u8))
    }

    /// Step `k` times along `(dr, dc)`, returning None when leaving the board
    pub fn offset(&self, dr: i32, dc: i32, k: i32) -> Option<Self> {
        Self::checked(self.row as i32 + dr * k, self.col as i32 + dc * k)
    }

    /// Flat row-major index
    #[inline(always)]
    pub fn index(&self) -> usize {
        (self.row as usize) * (BOARD_SIZE as usize) + (self.col as usize)
    }
}

/// AI strength requested at session creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse difficulty from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Game status reported by the backend after a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Ongoing,
    PlayerWin,
    AiWin,
    Draw,
}

impl GameStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ongoing" => Some(GameStatus::Ongoing),
            "player_win" => Some(GameStatus::PlayerWin),
            "ai_win" => Some(GameStatus::AiWin),
            "draw" => Some(GameStatus::Draw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::PlayerWin => "player_win",
            GameStatus::AiWin => "ai_win",
            GameStatus::Draw => "draw",
        }
    }

    /// Terminal outcome, or None while the game continues
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            GameStatus::Ongoing => None,
            GameStatus::PlayerWin => Some(Outcome::PlayerWin),
            GameStatus::AiWin => Some(Outcome::AiWin),
            GameStatus::Draw => Some(Outcome::Draw),
        }
    }
}

/// Terminal outcome of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    PlayerWin,
    AiWin,
    Draw,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::PlayerWin => "player_win",
            Outcome::AiWin => "ai_win",
            Outcome::Draw => "draw",
        }
    }
}

/// Backend operations, used to pick fallback failure messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    NewGame,
    Move,
    Undo,
    Hint,
    History,
}

impl Operation {
    /// Message shown when a failure carries no message of its own
    pub fn default_failure_message(&self) -> &'static str {
        match self {
            Operation::NewGame => "Failed to create game",
            Operation::Move => "Move failed",
            Operation::Undo => "Undo failed",
            Operation::Hint => "Failed to get hint",
            Operation::History => "Failed to load history",
        }
    }
}
