//! App loop against the in-process backend, checked through the framebuffer.

use gomoku_session::core::Phase;
use gomoku_session::gateway::{dispatch, Completed, LocalBackend};
use gomoku_session::input::UiCommand;
use gomoku_session::term::{FrameBuffer, Viewport};
use gomoku_session::types::{Coord, Difficulty, Side, AI_REPLY_DELAY_MS, HINT_TTL_MS};
use gomoku_session::App;

/// Serve everything in the outbox, including follow-up requests.
fn pump(app: &mut App, backend: &LocalBackend, now_ms: u64) {
    loop {
        let out = app.take_outbox();
        if out.is_empty() {
            return;
        }
        for d in out {
            let op = d.tag.op;
            let result = tokio_test::block_on(dispatch(backend, d.request)).map_err(|e| e.display_message(op));
            app.complete(Completed { tag: d.tag, result }, now_ms);
        }
    }
}

fn glyph_at(app: &mut App, coord: Coord) -> char {
    let p = app.view().coordinate_for(coord);
    app.frame().get(p.x, p.y).unwrap().ch
}

fn rows(fb: &FrameBuffer) -> Vec<String> {
    (0..fb.height())
        .map(|y| (0..fb.width()).filter_map(|x| fb.get(x, y)).map(|c| c.ch).collect())
        .collect()
}

fn click(app: &mut App, coord: Coord, now_ms: u64) {
    let p = app.view().coordinate_for(coord);
    app.command(
        UiCommand::Click {
            column: p.x,
            row: p.y,
        },
        now_ms,
    );
}

fn ai_stone(app: &App) -> Coord {
    app.session()
        .game()
        .unwrap()
        .board()
        .stones()
        .find_map(|(c, side)| (side == Side::Ai).then_some(c))
        .expect("ai replied")
}

fn started() -> (App, LocalBackend) {
    let backend = LocalBackend::new(11);
    let mut app = App::new(Viewport::new(100, 40), Difficulty::Easy, "local");
    app.start(0);
    pump(&mut app, &backend, 0);
    (app, backend)
}

#[test]
fn startup_shows_empty_board_and_history() {
    let (mut app, _backend) = started();
    assert_eq!(app.session().phase(), Phase::PlayerTurn);
    assert_eq!(app.stats().summary().unwrap().total_games, 0);

    let text = rows(app.frame());
    assert!(text.iter().any(|l| l.contains("Your turn (black)")));
    assert!(text.iter().any(|l| l.contains("Games  0")));
    assert!(text.iter().any(|l| l.contains("backend: local")));
    assert!(!text.iter().any(|l| l.contains('●')));
}

#[test]
fn ai_reply_is_paced() {
    let (mut app, backend) = started();
    let center = Coord::new(7, 7);
    click(&mut app, center, 1_000);
    pump(&mut app, &backend, 1_000);

    assert_eq!(app.session().phase(), Phase::AiTurnDisplay);
    let ai = ai_stone(&app);
    assert_eq!(glyph_at(&mut app, center), '●');
    assert_ne!(glyph_at(&mut app, ai), '●');
    assert_eq!(app.next_wakeup(1_000), Some(AI_REPLY_DELAY_MS as u64));

    // Clicks during the pause are ignored.
    click(&mut app, Coord::new(0, 0), 1_100);
    assert!(app.take_outbox().is_empty());

    app.tick(1_000 + AI_REPLY_DELAY_MS as u64 - 1);
    assert_ne!(glyph_at(&mut app, ai), '●');

    app.tick(1_000 + AI_REPLY_DELAY_MS as u64);
    assert_eq!(glyph_at(&mut app, ai), '●');
    assert_eq!(app.session().phase(), Phase::PlayerTurn);
}

#[test]
fn hint_marker_expires() {
    let (mut app, backend) = started();
    click(&mut app, Coord::new(7, 7), 0);
    pump(&mut app, &backend, 0);
    app.tick(AI_REPLY_DELAY_MS as u64);
    let before = app.frame().clone();

    let t = 5_000;
    app.command(UiCommand::Hint, t);
    pump(&mut app, &backend, t);
    assert_eq!(app.session().game().unwrap().hint_count(), 1);
    assert!(rows(app.frame()).iter().any(|l| l.contains('[')));
    assert!(rows(app.frame()).iter().any(|l| l.contains("Hints 1/5")));

    app.tick(t + HINT_TTL_MS as u64 - 1);
    assert!(rows(app.frame()).iter().any(|l| l.contains('[')));

    app.tick(t + HINT_TTL_MS as u64);
    let after = app.frame().clone();
    assert!(!rows(&after).iter().any(|l| l.contains('[')));
    // Only the hint counter changed on screen.
    let changed: Vec<String> = rows(&before)
        .into_iter()
        .zip(rows(&after))
        .filter(|(a, b)| a != b)
        .map(|(_, b)| b)
        .collect();
    assert_eq!(changed.len(), 1);
    assert!(changed[0].contains("Hints 1/5"));
}

#[test]
fn rejected_undo_is_reported_in_panel() {
    let (mut app, backend) = started();
    app.command(UiCommand::Undo, 0);
    pump(&mut app, &backend, 0);

    assert_eq!(app.session().phase(), Phase::PlayerTurn);
    let text = rows(app.frame());
    assert!(text.iter().any(|l| l.contains("Not enough moves")));

    // The next accepted action clears the message.
    click(&mut app, Coord::new(7, 7), 10);
    let text = rows(app.frame());
    assert!(!text.iter().any(|l| l.contains("Not enough moves")));
}

#[test]
fn new_game_resets_board_and_uses_selected_difficulty() {
    let (mut app, backend) = started();
    click(&mut app, Coord::new(7, 7), 0);
    pump(&mut app, &backend, 0);
    app.tick(AI_REPLY_DELAY_MS as u64);

    app.command(UiCommand::SetDifficulty(Difficulty::Hard), 400);
    assert!(rows(app.frame()).iter().any(|l| l.contains("Difficulty easy (next: hard)")));

    app.command(UiCommand::NewGame, 500);
    pump(&mut app, &backend, 500);
    assert_eq!(app.session().difficulty(), Difficulty::Hard);
    assert_eq!(app.session().phase(), Phase::PlayerTurn);
    let text = rows(app.frame());
    assert!(!text.iter().any(|l| l.contains('●')));
    assert!(text.iter().any(|l| l.contains("Difficulty hard")));
}

#[test]
fn resize_repaints_stones_in_new_layout() {
    let (mut app, backend) = started();
    let center = Coord::new(7, 7);
    click(&mut app, center, 0);
    pump(&mut app, &backend, 0);
    app.tick(AI_REPLY_DELAY_MS as u64);

    app.resize(Viewport::new(70, 20));
    assert_eq!(app.view().cell_w(), 2);
    let ai = ai_stone(&app);
    assert_eq!(glyph_at(&mut app, center), '●');
    assert_eq!(glyph_at(&mut app, ai), '●');
}

#[test]
fn failed_new_game_clears_previous_board() {
    let (mut app, backend) = started();
    let center = Coord::new(7, 7);
    click(&mut app, center, 0);
    pump(&mut app, &backend, 0);
    app.tick(AI_REPLY_DELAY_MS as u64);
    let ai = ai_stone(&app);
    assert_eq!(glyph_at(&mut app, center), '●');

    app.command(UiCommand::NewGame, 500);
    let create = app.take_outbox().remove(0);
    app.complete(
        Completed {
            tag: create.tag,
            result: Err("Failed to create game".to_string()),
        },
        500,
    );

    assert_eq!(app.session().phase(), Phase::Idle);
    assert!(app.session().game().is_none());
    assert_ne!(glyph_at(&mut app, center), '●');
    assert_ne!(glyph_at(&mut app, ai), '●');
    let text = rows(app.frame());
    assert!(!text.iter().any(|l| l.contains('●')));
    assert!(text.iter().any(|l| l.contains("Failed to create game")));
}
