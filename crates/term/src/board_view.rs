//! BoardView: paints the go board into a framebuffer and maps clicks back to intersections.
//!
//! Pure (no I/O). Painting is incremental: each call touches only the cells
//! it owns, so a stone placed on top of the board stays until the board is
//! repainted or something paints over it.

use crate::core::{Board, WinLine};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{CellState, Coord, Side, BOARD_SIZE, STAR_POINTS};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Terminal cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.x + self.w && p.y < self.y + self.h
    }
}

/// Columns reserved to the right of the board for the side panel.
pub const PANEL_WIDTH: u16 = 30;
const PANEL_GAP: u16 = 3;

pub const BOARD_BG: Rgb = Rgb::new(204, 160, 92);
const GRID_FG: Rgb = Rgb::new(92, 62, 28);
const BLACK_FG: Rgb = Rgb::new(16, 16, 16);
const WHITE_FG: Rgb = Rgb::new(250, 250, 245);
const WIN_FG: Rgb = Rgb::new(214, 36, 36);
const HINT_FG: Rgb = Rgb::new(24, 150, 56);

const GRID: CellStyle = CellStyle::new(GRID_FG, BOARD_BG);
const STAR: CellStyle = GRID.bold();
const HINT: CellStyle = CellStyle::new(HINT_FG, BOARD_BG).bold();
const WIN_LINK: CellStyle = CellStyle::new(WIN_FG, BOARD_BG).bold();

/// Terminal geometry of the board.
///
/// One intersection every `cell_w` columns and `cell_h` rows, with half a cell
/// of margin on each side so stones and hint brackets on the edge lines fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardView {
    cell_w: u16,
    cell_h: u16,
    /// Terminal position of intersection (0, 0).
    origin: Point,
}

impl Default for BoardView {
    fn default() -> Self {
        Self::new(4, 2, Point::new(2, 1))
    }
}

impl BoardView {
    pub fn new(cell_w: u16, cell_h: u16, origin: Point) -> Self {
        Self {
            cell_w: cell_w.max(2),
            cell_h: cell_h.max(1),
            origin,
        }
    }

    /// Largest layout (4x2, then 2x1) that fits the viewport next to the side panel,
    /// centered. Falls back to the compact layout at the top-left.
    pub fn fit(viewport: Viewport) -> Self {
        for (cw, ch) in [(4u16, 2u16), (2, 1)] {
            let trial = Self::new(cw, ch, Point::new(0, 0));
            let (w, h) = trial.extent();
            let total_w = w + PANEL_GAP + PANEL_WIDTH;
            if total_w <= viewport.width && h <= viewport.height {
                let left = (viewport.width - total_w) / 2;
                let top = (viewport.height - h) / 2;
                return Self::new(cw, ch, Point::new(left + trial.pad_x(), top + trial.pad_y()));
            }
        }
        let compact = Self::new(2, 1, Point::new(0, 0));
        Self::new(2, 1, Point::new(compact.pad_x(), compact.pad_y()))
    }

    pub fn cell_w(&self) -> u16 {
        self.cell_w
    }

    pub fn cell_h(&self) -> u16 {
        self.cell_h
    }

    fn pad_x(&self) -> u16 {
        self.cell_w / 2
    }

    fn pad_y(&self) -> u16 {
        self.cell_h / 2
    }

    fn span(&self) -> (u16, u16) {
        let n = BOARD_SIZE as u16 - 1;
        (n * self.cell_w, n * self.cell_h)
    }

    fn extent(&self) -> (u16, u16) {
        let (sw, sh) = self.span();
        (sw + 1 + 2 * self.pad_x(), sh + 1 + 2 * self.pad_y())
    }

    /// Area owned by the board, margins included.
    pub fn board_rect(&self) -> Rect {
        let (w, h) = self.extent();
        Rect {
            x: self.origin.x.saturating_sub(self.pad_x()),
            y: self.origin.y.saturating_sub(self.pad_y()),
            w,
            h,
        }
    }

    /// Top-left corner of the side panel.
    pub fn panel_origin(&self) -> Point {
        let rect = self.board_rect();
        Point::new(rect.x + rect.w + PANEL_GAP, rect.y)
    }

    /// Terminal position of an intersection.
    pub fn coordinate_for(&self, coord: Coord) -> Point {
        Point::new(
            self.origin.x + coord.col as u16 * self.cell_w,
            self.origin.y + coord.row as u16 * self.cell_h,
        )
    }

    /// Nearest intersection to a terminal position, or None off the board.
    pub fn hit_test(&self, p: Point) -> Option<Coord> {
        let dx = p.x as i32 - self.origin.x as i32;
        let dy = p.y as i32 - self.origin.y as i32;
        let cw = self.cell_w as i32;
        let ch = self.cell_h as i32;
        let col = (dx + cw / 2).div_euclid(cw);
        let row = (dy + ch / 2).div_euclid(ch);
        Coord::checked(row, col)
    }

    // ============== Painting ==============

    /// Repaint the whole board area: background, grid, stones, winning line.
    pub fn paint_board(&self, fb: &mut FrameBuffer, board: &Board, winning_line: Option<&WinLine>) {
        let rect = self.board_rect();
        for y in rect.y..rect.y + rect.h {
            for x in rect.x..rect.x + rect.w {
                fb.set(x, y, self.grid_cell(x, y));
            }
        }
        for (coord, side) in board.stones() {
            self.paint_stone(fb, coord, side);
        }
        if let Some(line) = winning_line {
            self.paint_winning_line(fb, line);
        }
    }

    pub fn paint_stone(&self, fb: &mut FrameBuffer, coord: Coord, side: Side) {
        let p = self.coordinate_for(coord);
        fb.put_char(p.x, p.y, '●', stone_style(side));
    }

    /// Connect the winning stones with a red stroke and recolor them.
    pub fn paint_winning_line(&self, fb: &mut FrameBuffer, line: &WinLine) {
        for pair in line.windows(2) {
            self.paint_link(fb, pair[0], pair[1]);
        }
        for &coord in line.iter() {
            let p = self.coordinate_for(coord);
            let glyph = fb.get(p.x, p.y).map(|c| c.ch).unwrap_or('●');
            fb.put_char(p.x, p.y, glyph, CellStyle::new(WIN_FG, BOARD_BG).bold());
        }
    }

    fn paint_link(&self, fb: &mut FrameBuffer, a: Coord, b: Coord) {
        let pa = self.coordinate_for(a);
        let pb = self.coordinate_for(b);
        let dx = pb.x as i32 - pa.x as i32;
        let dy = pb.y as i32 - pa.y as i32;
        match (dx, dy) {
            (0, 0) => {}
            (_, 0) => {
                for k in 1..dx.abs() {
                    let x = (pa.x as i32 + k * dx.signum()) as u16;
                    fb.put_char(x, pa.y, '━', WIN_LINK);
                }
            }
            (0, _) => {
                for k in 1..dy.abs() {
                    let y = (pa.y as i32 + k * dy.signum()) as u16;
                    fb.put_char(pa.x, y, '┃', WIN_LINK);
                }
            }
            _ => {
                // Diagonals only have a cell to draw on when the midpoint is whole.
                if dx % 2 == 0 && dy % 2 == 0 {
                    let glyph = if (dx > 0) == (dy > 0) { '╲' } else { '╱' };
                    let x = (pa.x as i32 + dx / 2) as u16;
                    let y = (pa.y as i32 + dy / 2) as u16;
                    fb.put_char(x, y, glyph, WIN_LINK);
                }
            }
        }
    }

    /// Bracket an intersection as a suggestion.
    pub fn paint_hint(&self, fb: &mut FrameBuffer, coord: Coord) {
        let p = self.coordinate_for(coord);
        fb.put_char(p.x.saturating_sub(1), p.y, '[', HINT);
        fb.put_char(p.x + 1, p.y, ']', HINT);
    }

    /// Remove a hint marker by restoring one cell-sized rectangle around `coord`.
    ///
    /// Grid first, then whatever currently sits on the intersection and the
    /// winning line, so the result matches a full repaint of `board`.
    pub fn clear_hint(&self, fb: &mut FrameBuffer, coord: Coord, board: &Board, winning_line: Option<&WinLine>) {
        let p = self.coordinate_for(coord);
        let x0 = p.x.saturating_sub(self.pad_x());
        let y0 = p.y.saturating_sub(self.pad_y());
        let x1 = p.x + self.pad_x();
        let y1 = p.y + self.pad_y();

        for y in y0..=y1 {
            for x in x0..=x1 {
                fb.set(x, y, self.grid_cell(x, y));
            }
        }
        if let Some(side) = board.cell_at(coord).side() {
            self.paint_stone(fb, coord, side);
        }
        if let Some(line) = winning_line {
            self.paint_winning_line(fb, line);
        }
    }

    /// Grid glyph owned by a terminal position inside the board area.
    fn grid_cell(&self, x: u16, y: u16) -> crate::fb::Cell {
        let lx = x as i32 - self.origin.x as i32;
        let ly = y as i32 - self.origin.y as i32;
        let (sw, sh) = self.span();
        if lx < 0 || ly < 0 || lx > sw as i32 || ly > sh as i32 {
            return GRID.cell(' ');
        }
        let cw = self.cell_w as i32;
        let ch = self.cell_h as i32;
        let on_col = lx % cw == 0;
        let on_row = ly % ch == 0;
        match (on_row, on_col) {
            (true, true) => {
                let last = BOARD_SIZE as i32 - 1;
                let (row, col) = (ly / ch, lx / cw);
                if let Some(coord) = Coord::checked(row, col) {
                    if STAR_POINTS.contains(&coord) {
                        return STAR.cell('╋');
                    }
                }
                let glyph = match (row == 0, row == last, col == 0, col == last) {
                    (true, _, true, _) => '┌',
                    (true, _, _, true) => '┐',
                    (_, true, true, _) => '└',
                    (_, true, _, true) => '┘',
                    (true, _, _, _) => '┬',
                    (_, true, _, _) => '┴',
                    (_, _, true, _) => '├',
                    (_, _, _, true) => '┤',
                    _ => '┼',
                };
                GRID.cell(glyph)
            }
            (true, false) => GRID.cell('─'),
            (false, true) => GRID.cell('│'),
            (false, false) => GRID.cell(' '),
        }
    }
}

fn stone_style(side: Side) -> CellStyle {
    let fg = match CellState::from(side) {
        CellState::White => WHITE_FG,
        _ => BLACK_FG,
    };
    CellStyle::new(fg, BOARD_BG).bold()
}
