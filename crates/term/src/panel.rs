//! Side panel: status line, counters, history summary, last error, key help.
//!
//! Text is measured in terminal columns, so double-width backend messages
//! stay inside the panel.

use crate::board_view::{Point, PANEL_WIDTH};
use crate::core::{HistorySummary, Phase, Session, StatsView};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Difficulty, MAX_HINTS_PER_GAME, MAX_UNDOS_PER_GAME};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const BG: Rgb = Rgb::new(0, 0, 0);
const LABEL: CellStyle = CellStyle::new(Rgb::new(230, 230, 230), BG).bold();
const VALUE: CellStyle = CellStyle::new(Rgb::new(200, 200, 200), BG);
const MUTED: CellStyle = VALUE.dim();
const ERROR: CellStyle = CellStyle::new(Rgb::new(240, 90, 80), BG).bold();
const WIN: CellStyle = CellStyle::new(Rgb::new(120, 220, 120), BG).bold();
const LOSS: CellStyle = CellStyle::new(Rgb::new(240, 120, 100), BG).bold();

const KEY_HELP: [&str; 5] = [
    "click  place stone",
    "n      new game",
    "1/2/3  easy/medium/hard",
    "u      undo    h  hint",
    "q      quit",
];

/// Everything the panel shows, detached from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelModel<'a> {
    pub phase: Phase,
    pub difficulty: Difficulty,
    /// Difficulty the next new game will use.
    pub selected: Difficulty,
    pub undo_count: Option<u32>,
    pub hint_count: Option<u32>,
    pub stats: Option<HistorySummary>,
    pub stats_loading: bool,
    pub notice: Option<&'a str>,
    pub backend: &'a str,
}

impl<'a> PanelModel<'a> {
    pub fn new(session: &'a Session, stats: &StatsView, selected: Difficulty, backend: &'a str) -> Self {
        Self {
            phase: session.phase(),
            difficulty: session.difficulty(),
            selected,
            undo_count: session.game().map(|g| g.undo_count()),
            hint_count: session.game().map(|g| g.hint_count()),
            stats: stats.summary(),
            stats_loading: stats.is_loading(),
            notice: session.notice(),
            backend,
        }
    }
}

/// Paint the panel at `origin`, owning a `PANEL_WIDTH` x `height` region.
pub fn paint_panel(fb: &mut FrameBuffer, origin: Point, height: u16, model: &PanelModel<'_>) {
    fb.fill_rect(origin.x, origin.y, PANEL_WIDTH, height, ' ', VALUE);
    let bottom = origin.y.saturating_add(height);
    let x = origin.x;
    let mut y = origin.y;
    let line = |fb: &mut FrameBuffer, y: &mut u16, text: &str, style: CellStyle| {
        if *y < bottom {
            fb.put_str(x, *y, clip(text), style);
        }
        *y = y.saturating_add(1);
    };

    line(fb, &mut y, "GOMOKU", LABEL);
    let status_style = match model.phase {
        Phase::Terminal(crate::types::Outcome::PlayerWin) => WIN,
        Phase::Terminal(crate::types::Outcome::AiWin) => LOSS,
        p if p.is_awaiting() => MUTED,
        _ => VALUE,
    };
    line(fb, &mut y, model.phase.label(), status_style);
    y = y.saturating_add(1);

    if y < bottom {
        let cx = fb.put_str(x, y, "Difficulty ", LABEL);
        let cx = fb.put_str(cx, y, model.difficulty.as_str(), VALUE);
        if model.selected != model.difficulty {
            let cx = fb.put_str(cx, y, " (next: ", MUTED);
            let cx = fb.put_str(cx, y, model.selected.as_str(), VALUE);
            fb.put_str(cx, y, ")", MUTED);
        }
    }
    y = y.saturating_add(1);
    if y < bottom {
        counter(fb, x, y, "Undos ", model.undo_count, MAX_UNDOS_PER_GAME);
        counter(fb, x + 14, y, "Hints ", model.hint_count, MAX_HINTS_PER_GAME);
    }
    y = y.saturating_add(2);

    line(fb, &mut y, "HISTORY", LABEL);
    match model.stats {
        Some(s) => {
            for (label, value) in [
                ("Games  ", s.total_games),
                ("Wins   ", s.player_wins),
                ("Losses ", s.ai_wins),
                ("Draws  ", s.draws),
            ] {
                if y < bottom {
                    let cx = fb.put_str(x, y, label, VALUE);
                    fb.put_u32(cx, y, value, VALUE);
                }
                y = y.saturating_add(1);
            }
        }
        None if model.stats_loading => line(fb, &mut y, "loading...", MUTED),
        None => line(fb, &mut y, "-", MUTED),
    }
    y = y.saturating_add(1);

    if let Some(notice) = model.notice {
        for chunk in wrap(notice, PANEL_WIDTH as usize) {
            line(fb, &mut y, &chunk, ERROR);
        }
        y = y.saturating_add(1);
    }

    for help in KEY_HELP {
        line(fb, &mut y, help, MUTED);
    }
    line(fb, &mut y, &format!("backend: {}", model.backend), MUTED);
}

fn counter(fb: &mut FrameBuffer, x: u16, y: u16, label: &str, used: Option<u32>, max: u32) {
    let cx = fb.put_str(x, y, label, LABEL);
    let cx = match used {
        Some(n) => fb.put_u32(cx, y, n, VALUE),
        None => fb.put_str(cx, y, "-", MUTED),
    };
    let cx = fb.put_str(cx, y, "/", MUTED);
    fb.put_u32(cx, y, max, MUTED);
}

fn clip(text: &str) -> &str {
    let mut used = 0;
    for (i, ch) in text.char_indices() {
        used += ch.width().unwrap_or(0);
        if used > PANEL_WIDTH as usize {
            return &text[..i];
        }
    }
    text
}

/// Greedy word wrap to `width` columns; words wider than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_w = 0;
    for word in text.split_whitespace() {
        if current_w > 0 {
            if current_w + 1 + word.width() <= width {
                current.push(' ');
                current_w += 1;
            } else {
                out.push(std::mem::take(&mut current));
                current_w = 0;
            }
        }
        for ch in word.chars() {
            let w = ch.width().unwrap_or(0);
            if current_w > 0 && current_w + w > width {
                out.push(std::mem::take(&mut current));
                current_w = 0;
            }
            current.push(ch);
            current_w += w;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
