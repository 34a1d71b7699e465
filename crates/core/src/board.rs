//! Board module - immutable 15x15 snapshot of intersection states
//!
//! Every mutation produces a new `Board`; nothing is changed in place, so a
//! snapshot handed to the renderer can never alias the session's copy.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (row, col), both 0..14, row-major.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::types::{CellState, Coord, Side, BOARD_SIZE, CELL_COUNT, WIN_LENGTH};

/// Longest possible line through one stone: the stone plus 4 on each side.
pub const MAX_LINE_LEN: usize = 2 * (WIN_LENGTH as usize - 1) + 1;

/// Ordered run of coordinates forming five (or more) in a row.
pub type WinLine = ArrayVec<Coord, MAX_LINE_LEN>;

/// Line directions: horizontal, vertical, diagonal, anti-diagonal.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Rejected wire board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board must have {expected} rows, got {got}")]
    RowCount { expected: usize, got: usize },
    #[error("board row {row} must have {expected} cells, got {got}")]
    RowLength {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("unknown cell code {code} at ({row}, {col})")]
    CellCode { row: usize, col: usize, code: u8 },
}

/// The game board - 15x15 intersections using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [CellState; CELL_COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [CellState::Empty; CELL_COUNT],
        }
    }

    #[inline(always)]
    fn index(row: i32, col: i32) -> Option<usize> {
        Coord::checked(row, col).map(|c| c.index())
    }

    pub fn size(&self) -> u8 {
        BOARD_SIZE
    }

    /// Get the cell at (row, col), None when out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<CellState> {
        Self::index(row, col).map(|i| self.cells[i])
    }

    /// State of the intersection at `coord`; off-board reads as empty
    pub fn cell_at(&self, coord: Coord) -> CellState {
        self.get(coord.row as i32, coord.col as i32)
            .unwrap_or_default()
    }

    /// True only for on-board, unoccupied intersections
    pub fn is_empty(&self, coord: Coord) -> bool {
        matches!(
            self.get(coord.row as i32, coord.col as i32),
            Some(CellState::Empty)
        )
    }

    /// New snapshot with `side`'s stone at `coord`
    pub fn with_stone(&self, coord: Coord, side: Side) -> Board {
        self.with_cell(coord, CellState::from(side))
    }

    /// New snapshot with `coord` set to `state`; off-board coordinates return an unchanged copy
    pub fn with_cell(&self, coord: Coord, state: CellState) -> Board {
        let mut next = self.clone();
        if let Some(i) = Self::index(coord.row as i32, coord.col as i32) {
            next.cells[i] = state;
        }
        next
    }

    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// Iterate occupied intersections in row-major order
    pub fn stones(&self) -> impl Iterator<Item = (Coord, Side)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, c)| {
            let n = BOARD_SIZE as usize;
            c.side()
                .map(|side| (Coord::new((i / n) as u8, (i % n) as u8), side))
        })
    }

    /// Count consecutive `side` stones from `coord` (exclusive) along a direction
    pub fn run_length(&self, coord: Coord, dr: i32, dc: i32, side: Side) -> u8 {
        let want = CellState::from(side);
        let mut k = 1;
        while let Some(next) = coord.offset(dr, dc, k) {
            if self.cell_at(next) != want {
                break;
            }
            k += 1;
        }
        (k - 1) as u8
    }

    /// Ordered five-in-a-row through `coord` for `side`, if any
    ///
    /// The line runs from one end to the other so it can be drawn as a single
    /// stroke. Lines longer than five are returned whole.
    pub fn five_in_a_row(&self, coord: Coord, side: Side) -> Option<WinLine> {
        if self.cell_at(coord) != CellState::from(side) {
            return None;
        }
        for &(dr, dc) in DIRECTIONS.iter() {
            let back = self.run_length(coord, -dr, -dc, side).min(WIN_LENGTH - 1);
            let fwd = self.run_length(coord, dr, dc, side).min(WIN_LENGTH - 1);
            if back + fwd + 1 < WIN_LENGTH {
                continue;
            }
            let mut line = WinLine::new();
            for k in (-(back as i32))..=(fwd as i32) {
                if let Some(c) = coord.offset(dr, dc, k) {
                    line.push(c);
                }
            }
            return Some(line);
        }
        None
    }

    /// Build a board from wire rows (`0` empty, `1` black, `2` white)
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Board, BoardError> {
        let n = BOARD_SIZE as usize;
        if rows.len() != n {
            return Err(BoardError::RowCount {
                expected: n,
                got: rows.len(),
            });
        }
        let mut board = Board::new();
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n {
                return Err(BoardError::RowLength {
                    row: r,
                    expected: n,
                    got: row.len(),
                });
            }
            for (c, &code) in row.iter().enumerate() {
                let cell = CellState::from_code(code).ok_or(BoardError::CellCode {
                    row: r,
                    col: c,
                    code,
                })?;
                board.cells[r * n + c] = cell;
            }
        }
        Ok(board)
    }

    /// Wire rows (`0` empty, `1` black, `2` white)
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(BOARD_SIZE as usize)
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }
}
