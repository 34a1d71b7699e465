//! Session state machine driven against the in-process backend.

use gomoku_session::core::{Board, Dispatch, Effect, Effects, MoveReply, Phase, Reply, Session, TimerEvent};
use gomoku_session::gateway::{dispatch, Completion, LocalBackend};
use gomoku_session::types::{CellState, Coord, Difficulty, GameStatus, Outcome, Side};

fn submitted(fx: &Effects) -> Option<Dispatch> {
    fx.iter().find_map(|e| match e {
        Effect::Submit(d) => Some(d.clone()),
        _ => None,
    })
}

/// Run the submit in `fx` (if any) against `backend` and feed the result back.
fn settle(backend: &LocalBackend, session: &mut Session, fx: Effects) -> Effects {
    let Some(d) = submitted(&fx) else {
        return Effects::new();
    };
    let op = d.tag.op;
    let result = tokio_test::block_on(dispatch(backend, d.request))
        .map_err(|e| e.display_message(op))
        .map(|c| match c {
            Completion::Session(reply) => reply,
            Completion::History(_) => panic!("unexpected history completion"),
        });
    session.complete(d.tag, result)
}

/// Fire the reveal timer scheduled in `fx`, if any.
fn reveal(session: &mut Session, fx: &Effects) -> Effects {
    let event = fx.iter().find_map(|e| match e {
        Effect::Schedule {
            event: event @ TimerEvent::RevealAiMove { .. },
            ..
        } => Some(*event),
        _ => None,
    });
    match event {
        Some(event) => session.on_timer(event),
        None => Effects::new(),
    }
}

fn started(difficulty: Difficulty) -> (LocalBackend, Session) {
    let backend = LocalBackend::new(7);
    let mut session = Session::new();
    let fx = session.new_game(difficulty);
    settle(&backend, &mut session, fx);
    (backend, session)
}

fn play(backend: &LocalBackend, session: &mut Session, coord: Coord) {
    let fx = session.click(coord);
    let fx = settle(backend, session, fx);
    reveal(session, &fx);
}

#[test]
fn easy_game_scenario() {
    let (backend, mut session) = started(Difficulty::Easy);
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert!(session.visible_board().is_blank());

    let center = Coord::new(7, 7);
    let fx = session.click(center);
    assert_eq!(session.phase(), Phase::AwaitingMoveResult);
    assert!(session.click(center).is_empty());

    let fx = settle(&backend, &mut session, fx);
    assert!(fx.contains(&Effect::PaintStone {
        coord: center,
        side: Side::Player
    }));
    assert_eq!(session.phase(), Phase::AiTurnDisplay);
    // AI stone is held back until the pacing timer fires.
    assert_eq!(session.visible_board().stone_count(), 1);

    let fx = reveal(&mut session, &fx);
    assert!(fx
        .iter()
        .any(|e| matches!(e, Effect::PaintStone { side: Side::Ai, .. })));
    assert_eq!(session.phase(), Phase::PlayerTurn);
    let board = session.visible_board();
    assert_eq!(board.stone_count(), 2);
    assert_eq!(board.cell_at(center), CellState::Black);

    // Occupied intersection: nothing is submitted.
    assert!(session.click(center).is_empty());
    assert_eq!(session.phase(), Phase::PlayerTurn);

    let fx = session.undo();
    settle(&backend, &mut session, fx);
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert!(session.visible_board().is_blank());
    assert_eq!(session.game().unwrap().undo_count(), 1);
}

#[test]
fn undo_with_too_few_stones_is_rejected() {
    let (backend, mut session) = started(Difficulty::Medium);
    let fx = session.undo();
    settle(&backend, &mut session, fx);

    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert!(session.notice().is_some());
    let game = session.game().unwrap();
    assert_eq!(game.undo_count(), 0);
    assert!(game.board().is_blank());
}

#[test]
fn hint_does_not_touch_the_board() {
    let (backend, mut session) = started(Difficulty::Medium);
    play(&backend, &mut session, Coord::new(7, 7));
    let before: Board = session.visible_board();

    let fx = session.hint();
    assert_eq!(session.phase(), Phase::AwaitingHint);
    let fx = settle(&backend, &mut session, fx);

    let hinted = fx.iter().find_map(|e| match e {
        Effect::PaintHint { coord } => Some(*coord),
        _ => None,
    });
    let coord = hinted.expect("hint painted");
    assert!(before.is_empty(coord));
    assert_eq!(session.visible_board(), before);
    assert_eq!(session.game().unwrap().hint_count(), 1);
    assert_eq!(session.phase(), Phase::PlayerTurn);
}

#[test]
fn undo_limit_is_reported_and_counter_stays() {
    let (backend, mut session) = started(Difficulty::Easy);
    for _ in 0..3 {
        play(&backend, &mut session, Coord::new(7, 7));
        let fx = session.undo();
        settle(&backend, &mut session, fx);
        assert!(session.notice().is_none());
    }
    assert_eq!(session.game().unwrap().undo_count(), 3);

    play(&backend, &mut session, Coord::new(7, 7));
    let fx = session.undo();
    settle(&backend, &mut session, fx);
    assert_eq!(session.notice(), Some("Maximum undos reached (3)"));
    assert_eq!(session.game().unwrap().undo_count(), 3);
    assert_eq!(session.visible_board().stone_count(), 2);
}

#[test]
fn one_request_in_flight_at_a_time() {
    let (_backend, mut session) = started(Difficulty::Easy);
    let fx = session.click(Coord::new(3, 3));
    assert!(submitted(&fx).is_some());

    assert!(session.click(Coord::new(4, 4)).is_empty());
    assert!(session.undo().is_empty());
    assert!(session.hint().is_empty());
    assert_eq!(session.phase(), Phase::AwaitingMoveResult);
}

#[test]
fn terminal_phase_is_absorbing() {
    let mut session = Session::new();
    let create = submitted(&session.new_game(Difficulty::Hard)).unwrap();
    session.complete(
        create.tag,
        Ok(Reply::Created {
            session_id: "done".into(),
            board: Board::new(),
        }),
    );

    let mv = submitted(&session.click(Coord::new(0, 4))).unwrap();
    let mut rows = vec![vec![0u8; 15]; 15];
    rows[0][..5].fill(1);
    let board = Board::from_rows(&rows).unwrap();
    let line = board.five_in_a_row(Coord::new(0, 0), Side::Player);
    session.complete(
        mv.tag,
        Ok(Reply::Moved(MoveReply {
            board,
            status: GameStatus::PlayerWin,
            ai_move: None,
            winner_line: line,
        })),
    );
    assert!(matches!(session.phase(), Phase::Terminal(_)));
    assert!(session.winning_line().is_some());

    assert!(session.click(Coord::new(9, 9)).is_empty());
    assert!(session.undo().is_empty());
    assert!(session.hint().is_empty());
    assert!(matches!(session.phase(), Phase::Terminal(_)));

    // Only a new game leaves a finished game.
    assert!(submitted(&session.new_game(Difficulty::Hard)).is_some());
    assert_eq!(session.phase(), Phase::AwaitingCreate);
}

#[test]
fn reply_for_a_replaced_game_is_dropped() {
    let (backend, mut session) = started(Difficulty::Easy);
    let stale = session.click(Coord::new(7, 7));
    let fx = session.new_game(Difficulty::Easy);
    settle(&backend, &mut session, fx);
    let fresh_id = session.game().unwrap().id().to_string();

    settle(&backend, &mut session, stale);
    assert_eq!(session.game().unwrap().id(), fresh_id);
    assert!(session.visible_board().is_blank());
    assert_eq!(session.phase(), Phase::PlayerTurn);
}

/// Session with a created game and no stones, without a backend.
fn created() -> Session {
    let mut session = Session::new();
    let create = submitted(&session.new_game(Difficulty::Hard)).unwrap();
    session.complete(
        create.tag,
        Ok(Reply::Created {
            session_id: "scripted".into(),
            board: Board::new(),
        }),
    );
    session
}

fn assert_input_ignored(session: &mut Session) {
    let phase = session.phase();
    assert!(session.click(Coord::new(12, 12)).is_empty());
    assert!(session.undo().is_empty());
    assert!(session.hint().is_empty());
    assert_eq!(session.phase(), phase);
}

#[test]
fn ai_win_is_revealed_before_the_game_ends() {
    let mut session = created();
    let player = Coord::new(9, 9);
    let mv = submitted(&session.click(player)).unwrap();

    let ai = Coord::new(0, 4);
    let mut board = Board::new().with_stone(player, Side::Player);
    for col in 0..5 {
        board = board.with_stone(Coord::new(0, col), Side::Ai);
    }
    let line = board.five_in_a_row(ai, Side::Ai);
    assert!(line.is_some());

    let fx = session.complete(
        mv.tag,
        Ok(Reply::Moved(MoveReply {
            board,
            status: GameStatus::AiWin,
            ai_move: Some(ai),
            winner_line: line,
        })),
    );
    assert!(fx.contains(&Effect::PaintStone {
        coord: player,
        side: Side::Player
    }));
    assert!(!fx.contains(&Effect::PaintWinningLine));
    assert_eq!(session.phase(), Phase::AiTurnDisplay);
    assert!(session.winning_line().is_none());
    assert!(session.visible_board().is_empty(ai));

    let fx = reveal(&mut session, &fx);
    assert_eq!(
        fx.as_slice(),
        &[
            Effect::PaintStone { coord: ai, side: Side::Ai },
            Effect::PaintWinningLine,
            Effect::RefreshHistory,
        ]
    );
    assert_eq!(session.phase(), Phase::Terminal(Outcome::AiWin));
    assert_eq!(session.winning_line().map(|l| l.len()), Some(5));
    assert_eq!(session.visible_board().cell_at(ai), CellState::White);
    assert_input_ignored(&mut session);
}

#[test]
fn draw_after_ai_reply_ends_on_reveal() {
    let mut session = created();
    let player = Coord::new(7, 7);
    let ai = Coord::new(7, 8);
    let mv = submitted(&session.click(player)).unwrap();
    let board = Board::new().with_stone(player, Side::Player).with_stone(ai, Side::Ai);

    let fx = session.complete(
        mv.tag,
        Ok(Reply::Moved(MoveReply {
            board,
            status: GameStatus::Draw,
            ai_move: Some(ai),
            winner_line: None,
        })),
    );
    assert_eq!(session.phase(), Phase::AiTurnDisplay);
    assert!(!fx.contains(&Effect::RefreshHistory));

    let fx = reveal(&mut session, &fx);
    assert_eq!(
        fx.as_slice(),
        &[Effect::PaintStone { coord: ai, side: Side::Ai }, Effect::RefreshHistory]
    );
    assert_eq!(session.phase(), Phase::Terminal(Outcome::Draw));
    assert!(session.winning_line().is_none());
    assert_input_ignored(&mut session);
}

#[test]
fn draw_on_player_move_ends_immediately() {
    let mut session = created();
    let player = Coord::new(14, 14);
    let mv = submitted(&session.click(player)).unwrap();

    let fx = session.complete(
        mv.tag,
        Ok(Reply::Moved(MoveReply {
            board: Board::new().with_stone(player, Side::Player),
            status: GameStatus::Draw,
            ai_move: None,
            winner_line: None,
        })),
    );
    assert_eq!(
        fx.as_slice(),
        &[
            Effect::PaintStone {
                coord: player,
                side: Side::Player
            },
            Effect::RefreshHistory,
        ]
    );
    assert_eq!(session.phase(), Phase::Terminal(Outcome::Draw));
    assert_input_ignored(&mut session);
}

#[test]
fn rejected_hint_keeps_turn_and_counter() {
    let (backend, mut session) = started(Difficulty::Easy);
    play(&backend, &mut session, Coord::new(7, 7));
    for _ in 0..5 {
        let fx = session.hint();
        settle(&backend, &mut session, fx);
    }
    assert_eq!(session.game().unwrap().hint_count(), 5);
    let board = session.visible_board();

    let fx = session.hint();
    assert_eq!(session.phase(), Phase::AwaitingHint);
    let fx = settle(&backend, &mut session, fx);

    assert!(!fx.iter().any(|e| matches!(e, Effect::PaintHint { .. })));
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert_eq!(session.notice(), Some("Maximum hints reached (5)"));
    assert_eq!(session.game().unwrap().hint_count(), 5);
    assert_eq!(session.visible_board(), board);
}
