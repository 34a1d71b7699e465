//! Session module - turn/lifecycle state machine for one human-vs-AI game
//!
//! The session never talks to the backend or the screen directly. Every input
//! (a click, a button, a backend completion, a timer) returns a small list of
//! [`Effect`]s that the loop carries out: submit a request, paint something,
//! schedule a timer, refresh the stats view.
//!
//! # Phases
//!
//! ```text
//! Idle -> AwaitingCreate -> PlayerTurn -> AwaitingMoveResult -> AiTurnDisplay -> PlayerTurn
//!                                |                 |                  |
//!                                |                 +------------------+--> Terminal(outcome)
//!                                +--> AwaitingUndo / AwaitingHint --> PlayerTurn
//! ```
//!
//! Only `PlayerTurn` accepts moves, undo and hints, so at most one request is
//! ever outstanding for a session. Input in any other phase is dropped.
//!
//! # Generations
//!
//! Each new game bumps a generation counter and every request is tagged with
//! it. Completions and timers carrying an older generation belong to a
//! discarded session and are ignored.

use arrayvec::ArrayVec;

use crate::board::{Board, WinLine};
use crate::timers::TimerEvent;
use crate::types::{
    Coord, Difficulty, GameStatus, Operation, Outcome, Side, AI_REPLY_DELAY_MS,
    DEFAULT_UNDO_STEPS, HINT_TTL_MS,
};

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No active session.
    Idle,
    AwaitingCreate,
    PlayerTurn,
    AwaitingMoveResult,
    AwaitingUndo,
    AwaitingHint,
    /// Backend replied; the AI stone is painted after a short pause.
    AiTurnDisplay,
    /// Absorbing until a new game is created.
    Terminal(Outcome),
}

impl Phase {
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            Phase::AwaitingCreate
                | Phase::AwaitingMoveResult
                | Phase::AwaitingUndo
                | Phase::AwaitingHint
        )
    }

    /// Short status line for the side panel.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Press N for a new game",
            Phase::AwaitingCreate => "Starting...",
            Phase::PlayerTurn => "Your turn (black)",
            Phase::AwaitingMoveResult | Phase::AiTurnDisplay => "AI is thinking...",
            Phase::AwaitingUndo => "Undoing...",
            Phase::AwaitingHint => "Asking for a hint...",
            Phase::Terminal(Outcome::PlayerWin) => "You win!",
            Phase::Terminal(Outcome::AiWin) => "AI wins!",
            Phase::Terminal(Outcome::Draw) => "Draw!",
        }
    }
}

/// Backend request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    NewGame { difficulty: Difficulty },
    Move { session_id: String, coord: Coord },
    Undo { session_id: String, steps: u8 },
    Hint { session_id: String },
    History,
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::NewGame { .. } => Operation::NewGame,
            Request::Move { .. } => Operation::Move,
            Request::Undo { .. } => Operation::Undo,
            Request::Hint { .. } => Operation::Hint,
            Request::History => Operation::History,
        }
    }
}

/// Identifies which session and operation a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub generation: u64,
    pub op: Operation,
}

/// A request ready to hand to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub tag: Tag,
    pub request: Request,
}

/// Successful backend reply to a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReply {
    pub board: Board,
    pub status: GameStatus,
    pub ai_move: Option<Coord>,
    pub winner_line: Option<WinLine>,
}

/// Successful backend reply for a session-bound operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Created { session_id: String, board: Board },
    Moved(MoveReply),
    Undone { board: Board, undo_count: u32 },
    Hinted { coord: Coord, hint_count: u32 },
}

/// Work the loop must carry out after a session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit(Dispatch),
    /// Repaint the board and every stone from [`Session::visible_board`].
    RepaintAll,
    PaintStone { coord: Coord, side: Side },
    PaintWinningLine,
    PaintHint { coord: Coord },
    Schedule { delay_ms: u32, event: TimerEvent },
    RefreshHistory,
}

pub type Effects = ArrayVec<Effect, 6>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingReveal {
    coord: Coord,
    status: GameStatus,
    winner_line: Option<WinLine>,
}

/// Data of the active game. Replaced wholesale by every new game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    id: String,
    difficulty: Difficulty,
    board: Board,
    undo_count: u32,
    hint_count: u32,
    outcome: Option<Outcome>,
    winning_line: Option<WinLine>,
    pending_reveal: Option<PendingReveal>,
}

impl Game {
    fn new(id: String, difficulty: Difficulty, board: Board) -> Self {
        Self {
            id,
            difficulty,
            board,
            undo_count: 0,
            hint_count: 0,
            outcome: None,
            winning_line: None,
            pending_reveal: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Authoritative board as last reported by the backend.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn undo_count(&self) -> u32 {
        self.undo_count
    }

    pub fn hint_count(&self) -> u32 {
        self.hint_count
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn winning_line(&self) -> Option<&WinLine> {
        self.winning_line.as_ref()
    }
}

/// The client-side session state machine.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    generation: u64,
    difficulty: Difficulty,
    game: Option<Game>,
    pending_move: Option<Coord>,
    notice: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            difficulty: Difficulty::default(),
            game: None,
            pending_move: None,
            notice: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    /// Difficulty of the active game, or of the one being created.
    pub fn difficulty(&self) -> Difficulty {
        self.game
            .as_ref()
            .map(|g| g.difficulty)
            .unwrap_or(self.difficulty)
    }

    /// Last failure message to show the user.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether pointer input is currently accepted.
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::PlayerTurn
    }

    /// The board as it should currently appear on screen.
    ///
    /// While the AI reply is being paced, its stone is withheld so a full
    /// repaint does not reveal it early.
    pub fn visible_board(&self) -> Board {
        match &self.game {
            None => Board::new(),
            Some(game) => match (&game.pending_reveal, self.phase) {
                (Some(p), Phase::AiTurnDisplay) => {
                    game.board.with_cell(p.coord, crate::types::CellState::Empty)
                }
                _ => game.board.clone(),
            },
        }
    }

    /// Winning line to highlight, only once the game is over.
    pub fn winning_line(&self) -> Option<&WinLine> {
        match self.phase {
            Phase::Terminal(_) => self.game.as_ref().and_then(|g| g.winning_line.as_ref()),
            _ => None,
        }
    }

    fn dispatch(&self, op: Operation, request: Request) -> Effect {
        Effect::Submit(Dispatch {
            tag: Tag {
                generation: self.generation,
                op,
            },
            request,
        })
    }

    /// Start a new game, discarding the current one.
    ///
    /// Ignored while a create request is already in flight.
    pub fn new_game(&mut self, difficulty: Difficulty) -> Effects {
        let mut fx = Effects::new();
        if self.phase == Phase::AwaitingCreate {
            return fx;
        }
        self.generation += 1;
        self.difficulty = difficulty;
        self.game = None;
        self.pending_move = None;
        self.notice = None;
        self.phase = Phase::AwaitingCreate;
        tracing::info!(generation = self.generation, difficulty = difficulty.as_str(), "creating session");
        fx.push(self.dispatch(Operation::NewGame, Request::NewGame { difficulty }));
        fx
    }

    /// Player clicked an intersection.
    ///
    /// Accepted only on the player's turn and on a locally empty cell; anything
    /// else is a silent no-op.
    pub fn click(&mut self, coord: Coord) -> Effects {
        let mut fx = Effects::new();
        if self.phase != Phase::PlayerTurn {
            return fx;
        }
        let Some(game) = &self.game else {
            return fx;
        };
        if !game.board.is_empty(coord) {
            return fx;
        }
        let session_id = game.id.clone();
        self.pending_move = Some(coord);
        self.notice = None;
        self.phase = Phase::AwaitingMoveResult;
        tracing::debug!(row = coord.row, col = coord.col, "submitting move");
        fx.push(self.dispatch(Operation::Move, Request::Move { session_id, coord }));
        fx
    }

    /// Undo the last player move and AI reply.
    pub fn undo(&mut self) -> Effects {
        let mut fx = Effects::new();
        if self.phase != Phase::PlayerTurn {
            return fx;
        }
        let Some(game) = &self.game else {
            return fx;
        };
        let session_id = game.id.clone();
        self.notice = None;
        self.phase = Phase::AwaitingUndo;
        fx.push(self.dispatch(
            Operation::Undo,
            Request::Undo {
                session_id,
                steps: DEFAULT_UNDO_STEPS,
            },
        ));
        fx
    }

    /// Ask the backend for a suggested move.
    pub fn hint(&mut self) -> Effects {
        let mut fx = Effects::new();
        if self.phase != Phase::PlayerTurn {
            return fx;
        }
        let Some(game) = &self.game else {
            return fx;
        };
        let session_id = game.id.clone();
        self.notice = None;
        self.phase = Phase::AwaitingHint;
        fx.push(self.dispatch(Operation::Hint, Request::Hint { session_id }));
        fx
    }

    /// Apply a backend completion.
    ///
    /// `result` carries either the typed reply or the message to surface.
    /// Completions for an older generation, or for an operation the session is
    /// not waiting on, are dropped.
    pub fn complete(&mut self, tag: Tag, result: Result<Reply, String>) -> Effects {
        let mut fx = Effects::new();
        if tag.generation != self.generation {
            tracing::debug!(stale = tag.generation, current = self.generation, "dropping stale completion");
            return fx;
        }
        let expected = match self.phase {
            Phase::AwaitingCreate => Operation::NewGame,
            Phase::AwaitingMoveResult => Operation::Move,
            Phase::AwaitingUndo => Operation::Undo,
            Phase::AwaitingHint => Operation::Hint,
            _ => {
                tracing::warn!(op = ?tag.op, phase = ?self.phase, "unexpected completion");
                return fx;
            }
        };
        if tag.op != expected {
            tracing::warn!(op = ?tag.op, phase = ?self.phase, "completion for wrong operation");
            return fx;
        }

        let reply = match result {
            Ok(reply) => reply,
            Err(message) => {
                tracing::info!(op = ?tag.op, %message, "request rejected");
                self.fail(tag.op, message, &mut fx);
                return fx;
            }
        };

        match (tag.op, reply) {
            (Operation::NewGame, Reply::Created { session_id, board }) => {
                tracing::info!(%session_id, "session created");
                self.game = Some(Game::new(session_id, self.difficulty, board));
                self.phase = Phase::PlayerTurn;
                fx.push(Effect::RepaintAll);
                fx.push(Effect::RefreshHistory);
            }
            (Operation::Move, Reply::Moved(reply)) => self.apply_move(reply, &mut fx),
            (Operation::Undo, Reply::Undone { board, undo_count }) => {
                if let Some(game) = &mut self.game {
                    game.board = board;
                    game.undo_count = undo_count;
                    game.winning_line = None;
                }
                self.phase = Phase::PlayerTurn;
                fx.push(Effect::RepaintAll);
            }
            (Operation::Hint, Reply::Hinted { coord, hint_count }) => {
                if let Some(game) = &mut self.game {
                    game.hint_count = hint_count;
                }
                self.phase = Phase::PlayerTurn;
                fx.push(Effect::PaintHint { coord });
                fx.push(Effect::Schedule {
                    delay_ms: HINT_TTL_MS,
                    event: TimerEvent::ClearHint { coord },
                });
            }
            (op, _) => {
                tracing::warn!(?op, "reply does not match operation");
                self.fail(op, op.default_failure_message().to_string(), &mut fx);
            }
        }
        fx
    }

    /// A failed create leaves no game, so the discarded board is wiped.
    fn fail(&mut self, op: Operation, message: String, fx: &mut Effects) {
        self.pending_move = None;
        self.notice = Some(message);
        if op == Operation::NewGame {
            self.phase = Phase::Idle;
            fx.push(Effect::RepaintAll);
        } else {
            self.phase = Phase::PlayerTurn;
        }
    }

    fn apply_move(&mut self, reply: MoveReply, fx: &mut Effects) {
        let Some(game) = &mut self.game else {
            self.phase = Phase::Idle;
            return;
        };
        game.board = reply.board;
        if let Some(coord) = self.pending_move.take() {
            fx.push(Effect::PaintStone {
                coord,
                side: Side::Player,
            });
        }

        if reply.status == GameStatus::PlayerWin {
            Self::finish(game, &mut self.phase, Outcome::PlayerWin, reply.winner_line, fx);
            return;
        }

        match reply.ai_move {
            Some(coord) => {
                game.pending_reveal = Some(PendingReveal {
                    coord,
                    status: reply.status,
                    winner_line: reply.winner_line,
                });
                self.phase = Phase::AiTurnDisplay;
                fx.push(Effect::Schedule {
                    delay_ms: AI_REPLY_DELAY_MS,
                    event: TimerEvent::RevealAiMove {
                        generation: self.generation,
                    },
                });
            }
            None => match reply.status.outcome() {
                Some(outcome) => {
                    Self::finish(game, &mut self.phase, outcome, reply.winner_line, fx)
                }
                None => self.phase = Phase::PlayerTurn,
            },
        }
    }

    fn finish(
        game: &mut Game,
        phase: &mut Phase,
        outcome: Outcome,
        line: Option<WinLine>,
        fx: &mut Effects,
    ) {
        tracing::info!(outcome = outcome.as_str(), session_id = %game.id, "game over");
        game.outcome = Some(outcome);
        game.winning_line = line;
        *phase = Phase::Terminal(outcome);
        if game.winning_line.is_some() {
            fx.push(Effect::PaintWinningLine);
        }
        fx.push(Effect::RefreshHistory);
    }

    /// The AI pacing timer fired.
    pub fn reveal_ai_move(&mut self, generation: u64) -> Effects {
        let mut fx = Effects::new();
        if generation != self.generation || self.phase != Phase::AiTurnDisplay {
            return fx;
        }
        let Some(game) = &mut self.game else {
            return fx;
        };
        let Some(reveal) = game.pending_reveal.take() else {
            self.phase = Phase::PlayerTurn;
            return fx;
        };
        fx.push(Effect::PaintStone {
            coord: reveal.coord,
            side: Side::Ai,
        });
        match reveal.status.outcome() {
            Some(outcome) => {
                Self::finish(game, &mut self.phase, outcome, reveal.winner_line, &mut fx)
            }
            None => self.phase = Phase::PlayerTurn,
        }
        fx
    }

    /// Route a fired timer. Hint clears are handled by the renderer, not here.
    pub fn on_timer(&mut self, event: TimerEvent) -> Effects {
        match event {
            TimerEvent::RevealAiMove { generation } => self.reveal_ai_move(generation),
            TimerEvent::ClearHint { .. } => Effects::new(),
        }
    }
}
