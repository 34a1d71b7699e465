//! In-process reference backend.
//!
//! Owns every game, applies the rules, answers for the AI and keeps a bounded
//! history of finished games. Serves the terminal client directly when no
//! remote backend is configured, and sits behind the TCP server otherwise.

use std::collections::{HashMap, VecDeque};

use tokio::sync::Mutex;

use crate::ai;
use crate::backend::Backend;
use crate::core::{Board, SimpleRng, WinLine};
use crate::error::GatewayError;
use crate::protocol::{
    GameRecord, HintBody, HistoryBody, HistoryMetadata, MoveBody, NewGameBody, UndoBody, WireCoord, WireLine,
};
use crate::types::{CellState, Coord, Difficulty, GameStatus, Outcome, Side, MAX_HINTS_PER_GAME, MAX_UNDOS_PER_GAME};

/// Finished games kept in memory.
pub const HISTORY_CAPACITY: usize = 100;
/// Finished games returned by `history`.
pub const HISTORY_RECENT: usize = 20;
/// Sessions kept addressable; finished games are evicted first, then the oldest.
pub const MAX_LIVE_GAMES: usize = 256;

#[derive(Debug, Clone)]
struct LocalGame {
    difficulty: Difficulty,
    board: Board,
    moves: Vec<Coord>,
    status: GameStatus,
    undo_count: u32,
    hint_count: u32,
}

impl LocalGame {
    fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            board: Board::new(),
            moves: Vec::new(),
            status: GameStatus::Ongoing,
            undo_count: 0,
            hint_count: 0,
        }
    }

    fn place(&mut self, coord: Coord, side: Side) {
        self.board = self.board.with_stone(coord, side);
        self.moves.push(coord);
    }
}

#[derive(Debug)]
struct LocalState {
    games: HashMap<String, LocalGame>,
    /// Session ids in creation order.
    order: VecDeque<String>,
    history: VecDeque<GameRecord>,
    metadata: HistoryMetadata,
    rng: SimpleRng,
    next_id: u64,
}

impl LocalState {
    fn game_mut(&mut self, session_id: &str) -> Result<&mut LocalGame, GatewayError> {
        self.games
            .get_mut(session_id)
            .ok_or_else(|| GatewayError::rejected("Game not found"))
    }

    fn record(&mut self, session_id: &str, outcome: Outcome) {
        let Some(game) = self.games.get(session_id) else {
            return;
        };
        self.metadata.total_games += 1;
        match outcome {
            Outcome::PlayerWin => self.metadata.player_wins += 1,
            Outcome::AiWin => self.metadata.ai_wins += 1,
            Outcome::Draw => self.metadata.draws += 1,
        }
        self.history.push_back(GameRecord {
            session_id: session_id.to_string(),
            difficulty: game.difficulty.as_str().to_string(),
            result: outcome.as_str().to_string(),
            total_moves: game.moves.len() as u32,
        });
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
        tracing::info!(session_id, result = outcome.as_str(), "game finished");
    }

    fn new_game(&mut self, difficulty: Difficulty) -> NewGameBody {
        self.next_id += 1;
        let session_id = format!("g{:04}-{:08x}", self.next_id, self.rng.next_u32());
        self.games.insert(session_id.clone(), LocalGame::new(difficulty));
        self.order.push_back(session_id.clone());
        self.evict_excess();
        tracing::debug!(%session_id, difficulty = difficulty.as_str(), "game created");
        NewGameBody {
            session_id,
            board: Board::new(),
        }
    }

    fn evict_excess(&mut self) {
        while self.games.len() > MAX_LIVE_GAMES {
            let games = &self.games;
            let pos = self
                .order
                .iter()
                .position(|id| games.get(id).is_some_and(|g| g.status != GameStatus::Ongoing))
                .unwrap_or(0);
            let Some(id) = self.order.remove(pos) else {
                break;
            };
            self.games.remove(&id);
            tracing::debug!(session_id = %id, "evicted game");
        }
    }

    fn make_move(&mut self, session_id: &str, row: i32, col: i32) -> Result<MoveBody, GatewayError> {
        let mut rng = self.rng.clone();
        let game = self.game_mut(session_id)?;
        if game.status != GameStatus::Ongoing {
            return Err(GatewayError::rejected("Game is already over"));
        }
        let coord = Coord::checked(row, col).ok_or_else(|| GatewayError::rejected("Position out of range"))?;
        if game.board.cell_at(coord) != CellState::Empty {
            return Err(GatewayError::rejected("Position already occupied"));
        }

        game.place(coord, Side::Player);
        let mut ai_move = None;
        let mut winner_line: Option<WinLine> = game.board.five_in_a_row(coord, Side::Player);

        if winner_line.is_some() {
            game.status = GameStatus::PlayerWin;
        } else if game.board.is_full() {
            game.status = GameStatus::Draw;
        } else {
            let reply = ai::choose_move(&game.board, game.difficulty, Side::Ai, &mut rng)
                .ok_or_else(|| GatewayError::rejected("AI could not find a move"))?;
            game.place(reply, Side::Ai);
            ai_move = Some(WireCoord::from(reply));
            winner_line = game.board.five_in_a_row(reply, Side::Ai);
            if winner_line.is_some() {
                game.status = GameStatus::AiWin;
            } else if game.board.is_full() {
                game.status = GameStatus::Draw;
            }
        }

        let body = MoveBody {
            board: game.board.clone(),
            game_status: game.status,
            ai_move,
            winner_line: winner_line.map(WireLine),
        };
        self.rng = rng;
        if let Some(outcome) = body.game_status.outcome() {
            self.record(session_id, outcome);
        }
        Ok(body)
    }

    fn undo(&mut self, session_id: &str, steps: u8) -> Result<UndoBody, GatewayError> {
        let game = self.game_mut(session_id)?;
        if game.status != GameStatus::Ongoing {
            return Err(GatewayError::rejected("Cannot undo after the game is over"));
        }
        if game.undo_count >= MAX_UNDOS_PER_GAME {
            return Err(GatewayError::rejected(format!(
                "Maximum undos reached ({})",
                MAX_UNDOS_PER_GAME
            )));
        }
        if steps == 0 {
            return Err(GatewayError::rejected("Undo steps must be at least 1"));
        }
        if game.moves.len() < steps as usize {
            return Err(GatewayError::rejected(format!("Not enough moves to undo {} steps", steps)));
        }
        for _ in 0..steps {
            if let Some(coord) = game.moves.pop() {
                game.board = game.board.with_cell(coord, CellState::Empty);
            }
        }
        game.undo_count += 1;
        Ok(UndoBody {
            board: game.board.clone(),
            undo_count: game.undo_count,
        })
    }

    fn hint(&mut self, session_id: &str) -> Result<HintBody, GatewayError> {
        let mut rng = self.rng.clone();
        let game = self.game_mut(session_id)?;
        if game.status != GameStatus::Ongoing {
            return Err(GatewayError::rejected("Game is already over"));
        }
        if game.hint_count >= MAX_HINTS_PER_GAME {
            return Err(GatewayError::rejected(format!(
                "Maximum hints reached ({})",
                MAX_HINTS_PER_GAME
            )));
        }
        let coord = ai::choose_move(&game.board, Difficulty::Medium, Side::Player, &mut rng)
            .ok_or_else(|| GatewayError::rejected("No hint available"))?;
        game.hint_count += 1;
        let body = HintBody {
            row: coord.row as i32,
            col: coord.col as i32,
            hint_count: game.hint_count,
        };
        self.rng = rng;
        Ok(body)
    }

    fn history(&self) -> HistoryBody {
        let skip = self.history.len().saturating_sub(HISTORY_RECENT);
        HistoryBody {
            metadata: self.metadata,
            games: self.history.iter().skip(skip).cloned().collect(),
        }
    }
}

/// Reference backend holding all state in memory.
#[derive(Debug)]
pub struct LocalBackend {
    state: Mutex<LocalState>,
}

impl LocalBackend {
    pub fn new(seed: u32) -> Self {
        Self {
            state: Mutex::new(LocalState {
                games: HashMap::new(),
                order: VecDeque::new(),
                history: VecDeque::new(),
                metadata: HistoryMetadata::default(),
                rng: SimpleRng::new(seed),
                next_id: 0,
            }),
        }
    }

    /// Seed from `GOMOKU_SEED`, or the clock when unset.
    pub fn from_env() -> Self {
        let seed = std::env::var("GOMOKU_SEED")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or_else(|| SimpleRng::from_time().next_u32());
        Self::new(seed)
    }
}

impl Backend for LocalBackend {
    async fn new_game(&self, difficulty: Difficulty) -> Result<NewGameBody, GatewayError> {
        Ok(self.state.lock().await.new_game(difficulty))
    }

    async fn make_move(&self, session_id: String, row: i32, col: i32) -> Result<MoveBody, GatewayError> {
        self.state.lock().await.make_move(&session_id, row, col)
    }

    async fn undo(&self, session_id: String, steps: u8) -> Result<UndoBody, GatewayError> {
        self.state.lock().await.undo(&session_id, steps)
    }

    async fn hint(&self, session_id: String) -> Result<HintBody, GatewayError> {
        self.state.lock().await.hint(&session_id)
    }

    async fn history(&self) -> Result<HistoryBody, GatewayError> {
        Ok(self.state.lock().await.history())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: GatewayError) -> String {
        match err {
            GatewayError::Rejected { message } => message.unwrap_or_default(),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_session_is_rejected() {
        let backend = LocalBackend::new(1);
        let err = backend.make_move("nope".into(), 7, 7).await.unwrap_err();
        assert_eq!(message(err), "Game not found");
    }

    #[tokio::test]
    async fn move_places_both_stones() {
        let backend = LocalBackend::new(1);
        let game = backend.new_game(Difficulty::Medium).await.unwrap();
        let body = backend.make_move(game.session_id.clone(), 7, 7).await.unwrap();
        assert_eq!(body.game_status, GameStatus::Ongoing);
        assert_eq!(body.board.cell_at(Coord::new(7, 7)), CellState::Black);
        let ai = body.ai_move.unwrap().coord().unwrap();
        assert_eq!(body.board.cell_at(ai), CellState::White);
        assert_eq!(body.board.stone_count(), 2);

        let err = backend.make_move(game.session_id, 7, 7).await.unwrap_err();
        assert_eq!(message(err), "Position already occupied");
    }

    #[tokio::test]
    async fn live_games_are_capped_oldest_first() {
        let backend = LocalBackend::new(5);
        let first = backend.new_game(Difficulty::Easy).await.unwrap().session_id;
        let second = backend.new_game(Difficulty::Easy).await.unwrap().session_id;
        for _ in 0..MAX_LIVE_GAMES - 1 {
            backend.new_game(Difficulty::Easy).await.unwrap();
        }
        assert_eq!(backend.state.lock().await.games.len(), MAX_LIVE_GAMES);

        let err = backend.hint(first).await.unwrap_err();
        assert_eq!(message(err), "Game not found");
        assert!(backend.hint(second).await.is_ok());
    }

    #[tokio::test]
    async fn finished_games_are_evicted_before_live_ones() {
        let backend = LocalBackend::new(5);
        let live = backend.new_game(Difficulty::Easy).await.unwrap().session_id;
        let done = backend.new_game(Difficulty::Easy).await.unwrap().session_id;
        backend.state.lock().await.games.get_mut(&done).unwrap().status = GameStatus::AiWin;
        for _ in 0..MAX_LIVE_GAMES - 1 {
            backend.new_game(Difficulty::Easy).await.unwrap();
        }

        let err = backend.undo(done, 2).await.unwrap_err();
        assert_eq!(message(err), "Game not found");
        assert!(backend.hint(live).await.is_ok());
    }

    #[tokio::test]
    async fn out_of_range_is_rejected() {
        let backend = LocalBackend::new(1);
        let game = backend.new_game(Difficulty::Easy).await.unwrap();
        let err = backend.make_move(game.session_id, 15, 0).await.unwrap_err();
        assert_eq!(message(err), "Position out of range");
    }

    #[tokio::test]
    async fn undo_limits() {
        let backend = LocalBackend::new(4);
        let id = backend.new_game(Difficulty::Easy).await.unwrap().session_id;

        let err = backend.undo(id.clone(), 2).await.unwrap_err();
        assert_eq!(message(err), "Not enough moves to undo 2 steps");

        for _ in 0..3 {
            backend.make_move(id.clone(), 7, 7).await.unwrap();
            let undone = backend.undo(id.clone(), 2).await.unwrap();
            assert!(undone.board.is_blank());
        }
        backend.make_move(id.clone(), 7, 7).await.unwrap();
        let err = backend.undo(id, 2).await.unwrap_err();
        assert_eq!(message(err), "Maximum undos reached (3)");
    }

    #[tokio::test]
    async fn hint_limit_is_five() {
        let backend = LocalBackend::new(8);
        let id = backend.new_game(Difficulty::Medium).await.unwrap().session_id;
        for n in 1..=5 {
            let hint = backend.hint(id.clone()).await.unwrap();
            assert_eq!(hint.hint_count, n);
            assert_eq!((hint.row, hint.col), (7, 7));
        }
        let err = backend.hint(id).await.unwrap_err();
        assert_eq!(message(err), "Maximum hints reached (5)");
    }

    #[tokio::test]
    async fn player_win_is_recorded() {
        let backend = LocalBackend::new(2);
        let id = backend.new_game(Difficulty::Easy).await.unwrap().session_id;
        {
            let mut state = backend.state.lock().await;
            let game = state.game_mut(&id).unwrap();
            for col in 0..4 {
                game.place(Coord::new(14, col), Side::Player);
            }
        }
        let body = backend.make_move(id.clone(), 14, 4).await.unwrap();
        assert_eq!(body.game_status, GameStatus::PlayerWin);
        assert!(body.ai_move.is_none());
        assert_eq!(body.winner_line.unwrap().0.len(), 5);

        let err = backend.make_move(id.clone(), 0, 0).await.unwrap_err();
        assert_eq!(message(err), "Game is already over");
        let err = backend.undo(id, 2).await.unwrap_err();
        assert_eq!(message(err), "Cannot undo after the game is over");

        let history = backend.history().await.unwrap();
        assert_eq!(history.metadata.total_games, 1);
        assert_eq!(history.metadata.player_wins, 1);
        assert_eq!(history.games[0].result, "player_win");
        assert_eq!(history.games[0].total_moves, 5);
    }

    #[test]
    fn history_returns_most_recent_twenty() {
        tokio_test::block_on(async {
            let backend = LocalBackend::new(6);
            for _ in 0..25 {
                let id = backend.new_game(Difficulty::Hard).await.unwrap().session_id;
                backend.state.lock().await.record(&id, Outcome::Draw);
            }
            let history = backend.history().await.unwrap();
            assert_eq!(history.metadata.total_games, 25);
            assert_eq!(history.metadata.draws, 25);
            assert_eq!(history.games.len(), HISTORY_RECENT);
            assert!(history.games.iter().all(|g| g.difficulty == "hard"));
        });
    }
}
