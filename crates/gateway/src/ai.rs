//! Move selection for the reference backend.
//!
//! `easy` plays a random cell near the action. `medium` and `hard` score every
//! nearby empty cell by the runs it would extend for itself and the runs it
//! would cut for the opponent; `hard` weighs blocking higher and rewards open
//! ends.

use crate::core::{Board, SimpleRng, DIRECTIONS};
use crate::types::{CellState, Coord, Difficulty, Side, BOARD_SIZE};

/// Radius (Chebyshev) around existing stones that candidate moves are drawn from.
pub const CANDIDATE_RADIUS: i32 = 2;

const CENTER: Coord = Coord::new(BOARD_SIZE / 2, BOARD_SIZE / 2);

struct Weights {
    /// Score for a run of 2, 3, 4 and 5+ made by the mover.
    attack: [i64; 4],
    /// Score for a run of 2, 3, 4 and 5+ the move denies the opponent.
    defend: [i64; 4],
    open_ends: bool,
}

const MEDIUM: Weights = Weights {
    attack: [100, 1_000, 10_000, 100_000],
    defend: [80, 800, 9_000, 90_000],
    open_ends: false,
};

const HARD: Weights = Weights {
    attack: [100, 1_000, 10_000, 100_000],
    defend: [120, 1_200, 12_000, 95_000],
    open_ends: true,
};

/// Pick a move for `side`, or None when the board is full.
pub fn choose_move(board: &Board, difficulty: Difficulty, side: Side, rng: &mut SimpleRng) -> Option<Coord> {
    if board.is_blank() {
        return Some(CENTER);
    }
    let candidates = candidates(board);
    match difficulty {
        Difficulty::Easy => rng.choose(&candidates).copied(),
        Difficulty::Medium => best_by_score(board, &candidates, side, &MEDIUM),
        Difficulty::Hard => best_by_score(board, &candidates, side, &HARD),
    }
}

/// Empty cells within [`CANDIDATE_RADIUS`] of any stone, row-major.
///
/// Falls back to every empty cell if none qualify.
pub fn candidates(board: &Board) -> Vec<Coord> {
    let n = BOARD_SIZE as i32;
    let mut out = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let Some(coord) = Coord::checked(row, col) else {
                continue;
            };
            if !board.is_empty(coord) {
                continue;
            }
            if has_neighbor(board, row, col) {
                out.push(coord);
            }
        }
    }
    if out.is_empty() {
        out.extend(
            (0..n)
                .flat_map(|r| (0..n).filter_map(move |c| Coord::checked(r, c)))
                .filter(|c| board.is_empty(*c)),
        );
    }
    out
}

fn has_neighbor(board: &Board, row: i32, col: i32) -> bool {
    for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
        for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
            if dr == 0 && dc == 0 {
                continue;
            }
            if matches!(board.get(row + dr, col + dc), Some(s) if !s.is_empty()) {
                return true;
            }
        }
    }
    false
}

fn best_by_score(board: &Board, candidates: &[Coord], side: Side, weights: &Weights) -> Option<Coord> {
    let mut best: Option<(i64, Coord)> = None;
    for &coord in candidates {
        let score = score_cell(board, coord, side, weights);
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, coord));
        }
    }
    best.map(|(_, c)| c)
}

fn score_cell(board: &Board, coord: Coord, side: Side, weights: &Weights) -> i64 {
    let mut score = 0;
    for &(dr, dc) in DIRECTIONS.iter() {
        score += line_score(board, coord, dr, dc, side, &weights.attack, weights.open_ends);
        score += line_score(board, coord, dr, dc, side.opponent(), &weights.defend, weights.open_ends);
    }
    let distance = (coord.row as i64 - CENTER.row as i64).abs() + (coord.col as i64 - CENTER.col as i64).abs();
    score + (14 - distance) * 5
}

fn line_score(board: &Board, coord: Coord, dr: i32, dc: i32, side: Side, table: &[i64; 4], open_ends: bool) -> i64 {
    let back = board.run_length(coord, -dr, -dc, side) as i32;
    let fwd = board.run_length(coord, dr, dc, side) as i32;
    let count = back + fwd + 1;
    let base = match count {
        0 | 1 => return 0,
        2 => table[0],
        3 => table[1],
        4 => table[2],
        _ => return table[3],
    };
    if !open_ends {
        return base;
    }
    let open = [coord.offset(-dr, -dc, back + 1), coord.offset(dr, dc, fwd + 1)]
        .iter()
        .filter(|end| matches!(end, Some(c) if board.cell_at(*c) == CellState::Empty))
        .count() as i64;
    match open {
        2 => base * 2,
        1 => base,
        _ => base / 4,
    }
}
