//! Protocol module - JSON records exchanged with the move-computation backend
//!
//! Line-delimited JSON over TCP. Every request carries an `op`, a sequence
//! number and a timestamp; every response echoes the sequence number and a
//! `status` of `success` or `error`. Error responses may carry a `message`.
//!
//! ```text
//! -> {"seq":1,"ts":1700000000000,"op":"new_game","difficulty":"easy"}
//! <- {"seq":1,"ts":1700000000001,"status":"success","session_id":"g0001-1a2b3c4d","board":[[0,...],...]}
//! -> {"seq":2,"ts":1700000000100,"op":"move","session_id":"g0001-1a2b3c4d","row":7,"col":7}
//! <- {"seq":2,"ts":1700000000102,"status":"success","board":[...],"game_status":"ongoing","ai_move":{"row":7,"col":8}}
//! -> {"seq":3,"ts":1700000000200,"op":"undo","session_id":"g0001-1a2b3c4d","steps":2}
//! <- {"seq":3,"ts":1700000000201,"status":"error","message":"Not enough moves to undo 2 steps"}
//! ```
//!
//! `game_id` is accepted wherever `session_id` is expected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Board, HistorySummary, MoveReply, Request, WinLine};
use crate::error::GatewayError;
use crate::types::{Coord, Difficulty, GameStatus, Operation, DEFAULT_UNDO_STEPS};

// ============== Client -> Backend ==============

/// Request payload, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum WireRequest {
    #[serde(rename = "new_game")]
    NewGame {
        #[serde(default, with = "difficulty_str")]
        difficulty: Difficulty,
    },
    #[serde(rename = "move")]
    Move {
        #[serde(alias = "game_id")]
        session_id: String,
        row: i32,
        col: i32,
    },
    #[serde(rename = "undo")]
    Undo {
        #[serde(alias = "game_id")]
        session_id: String,
        #[serde(default = "default_undo_steps")]
        steps: u8,
    },
    #[serde(rename = "hint")]
    Hint {
        #[serde(alias = "game_id")]
        session_id: String,
    },
    #[serde(rename = "history")]
    History,
}

fn default_undo_steps() -> u8 {
    DEFAULT_UNDO_STEPS
}

impl WireRequest {
    pub fn operation(&self) -> Operation {
        match self {
            WireRequest::NewGame { .. } => Operation::NewGame,
            WireRequest::Move { .. } => Operation::Move,
            WireRequest::Undo { .. } => Operation::Undo,
            WireRequest::Hint { .. } => Operation::Hint,
            WireRequest::History => Operation::History,
        }
    }
}

impl From<&Request> for WireRequest {
    fn from(value: &Request) -> Self {
        match value {
            Request::NewGame { difficulty } => WireRequest::NewGame {
                difficulty: *difficulty,
            },
            Request::Move { session_id, coord } => WireRequest::Move {
                session_id: session_id.clone(),
                row: coord.row as i32,
                col: coord.col as i32,
            },
            Request::Undo { session_id, steps } => WireRequest::Undo {
                session_id: session_id.clone(),
                steps: *steps,
            },
            Request::Hint { session_id } => WireRequest::Hint {
                session_id: session_id.clone(),
            },
            Request::History => WireRequest::History,
        }
    }
}

/// A request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    #[serde(flatten)]
    pub body: WireRequest,
}

// ============== Backend -> Client ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "error")]
    Error,
}

/// Fields common to every response line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseHead {
    #[serde(default)]
    pub seq: Option<u64>,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct SuccessEnvelope<'a, T> {
    seq: u64,
    ts: u64,
    status: ResponseStatus,
    #[serde(flatten)]
    body: &'a T,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    seq: u64,
    ts: u64,
    status: ResponseStatus,
    message: &'a str,
}

/// Reply to `new_game`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameBody {
    #[serde(alias = "game_id")]
    pub session_id: String,
    #[serde(with = "board_rows")]
    pub board: Board,
}

/// Reply to `move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveBody {
    #[serde(with = "board_rows")]
    pub board: Board,
    #[serde(with = "status_str")]
    pub game_status: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_move: Option<WireCoord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_line: Option<WireLine>,
}

impl MoveBody {
    /// Validate into the session's reply type.
    pub fn into_reply(self) -> Result<MoveReply, GatewayError> {
        let ai_move = self.ai_move.map(|c| c.coord()).transpose()?;
        Ok(MoveReply {
            board: self.board,
            status: self.game_status,
            ai_move,
            winner_line: self.winner_line.map(|l| l.0),
        })
    }
}

/// Reply to `undo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoBody {
    #[serde(with = "board_rows")]
    pub board: Board,
    pub undo_count: u32,
}

/// Reply to `hint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintBody {
    pub row: i32,
    pub col: i32,
    pub hint_count: u32,
}

impl HintBody {
    pub fn coord(&self) -> Result<Coord, GatewayError> {
        WireCoord {
            row: self.row,
            col: self.col,
        }
        .coord()
    }
}

/// Reply to `history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryBody {
    pub metadata: HistoryMetadata,
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryMetadata {
    pub total_games: u32,
    pub player_wins: u32,
    pub ai_wins: u32,
    pub draws: u32,
}

impl From<HistoryMetadata> for HistorySummary {
    fn from(m: HistoryMetadata) -> Self {
        HistorySummary {
            total_games: m.total_games,
            player_wins: m.player_wins,
            ai_wins: m.ai_wins,
            draws: m.draws,
        }
    }
}

/// One finished game in the backend's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(alias = "game_id")]
    pub session_id: String,
    pub difficulty: String,
    pub result: String,
    #[serde(default)]
    pub total_moves: u32,
}

/// `{"row": r, "col": c}` as sent for `ai_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCoord {
    pub row: i32,
    pub col: i32,
}

impl WireCoord {
    pub fn coord(&self) -> Result<Coord, GatewayError> {
        Coord::checked(self.row, self.col).ok_or_else(|| {
            GatewayError::Malformed(format!("coordinate ({}, {}) is off the board", self.row, self.col))
        })
    }
}

impl From<Coord> for WireCoord {
    fn from(c: Coord) -> Self {
        Self {
            row: c.row as i32,
            col: c.col as i32,
        }
    }
}

/// Winning line: an array of `[row, col]` pairs (objects are accepted too).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireLine(pub WinLine);

impl Serialize for WireLine {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for c in self.0.iter() {
            seq.serialize_element(&[c.row, c.col])?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for WireLine {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum LinePoint {
            Pair([i32; 2]),
            Object { row: i32, col: i32 },
        }

        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = WireLine;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of [row, col] pairs")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = WinLine::new();
                while let Some(p) = seq.next_element::<LinePoint>()? {
                    let (row, col) = match p {
                        LinePoint::Pair([r, c]) => (r, c),
                        LinePoint::Object { row, col } => (row, col),
                    };
                    let coord = Coord::checked(row, col)
                        .ok_or_else(|| serde::de::Error::custom("winner line point off the board"))?;
                    out.try_push(coord)
                        .map_err(|_| serde::de::Error::custom("winner line too long"))?;
                }
                Ok(WireLine(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

mod board_rows {
    use super::*;

    pub fn serialize<S: Serializer>(board: &Board, serializer: S) -> Result<S::Ok, S::Error> {
        board.to_rows().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Board, D::Error> {
        let rows = Vec::<Vec<u8>>::deserialize(deserializer)?;
        Board::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

mod status_str {
    use super::*;

    pub fn serialize<S: Serializer>(status: &GameStatus, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(status.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GameStatus, D::Error> {
        let s = String::deserialize(deserializer)?;
        GameStatus::from_str(&s).ok_or_else(|| serde::de::Error::custom("invalid game status"))
    }
}

mod difficulty_str {
    use super::*;

    pub fn serialize<S: Serializer>(d: &Difficulty, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(d.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Difficulty, D::Error> {
        let s = String::deserialize(deserializer)?;
        Difficulty::from_str(&s).ok_or_else(|| serde::de::Error::custom("invalid difficulty"))
    }
}

// ============== Encoding / Parsing ==============

/// Build a request line for `body`.
pub fn create_request(seq: u64, body: WireRequest) -> RequestEnvelope {
    RequestEnvelope {
        seq,
        ts: current_timestamp_ms(),
        body,
    }
}

/// Parse a request line (server side).
pub fn parse_request(line: &str) -> Result<RequestEnvelope, serde_json::Error> {
    serde_json::from_str(line)
}

/// Encode a success response carrying `body`.
pub fn encode_success<T: Serialize>(seq: u64, body: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SuccessEnvelope {
        seq,
        ts: current_timestamp_ms(),
        status: ResponseStatus::Success,
        body,
    })
}

/// Encode an error response.
pub fn encode_error(seq: u64, message: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ErrorEnvelope {
        seq,
        ts: current_timestamp_ms(),
        status: ResponseStatus::Error,
        message,
    })
}

/// Parse a response line for the request numbered `expected_seq`.
///
/// Error responses become [`GatewayError::Rejected`]; a reply for another
/// request is malformed.
pub fn parse_response<T: DeserializeOwned>(line: &str, expected_seq: u64) -> Result<T, GatewayError> {
    let head: ResponseHead = serde_json::from_str(line)?;
    if let Some(seq) = head.seq {
        if seq != expected_seq {
            return Err(GatewayError::Malformed(format!(
                "reply seq {} does not match request seq {}",
                seq, expected_seq
            )));
        }
    }
    match head.status {
        ResponseStatus::Error => Err(GatewayError::Rejected {
            message: head.message,
        }),
        ResponseStatus::Success => Ok(serde_json::from_str(line)?),
    }
}

/// Pull `seq` out of a line that failed to parse, so the error can still be correlated.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
