//! Terminal client state: session, stats and timers wired to the framebuffer.
//!
//! `App` has no I/O. The binary feeds it input commands, gateway completions
//! and the clock, sends whatever lands in the outbox, and flushes
//! [`App::frame`] to the terminal.

use crate::core::{Dispatch, Effect, Effects, Reply, Session, StatsView, TimerEvent, TimerQueue};
use crate::gateway::{Completed, Completion};
use crate::input::UiCommand;
use crate::term::{paint_panel, BoardView, FrameBuffer, PanelModel, Point, Viewport};
use crate::types::{Difficulty, Operation};

pub struct App {
    session: Session,
    stats: StatsView,
    timers: TimerQueue,
    view: BoardView,
    fb: FrameBuffer,
    viewport: Viewport,
    selected: Difficulty,
    backend_label: String,
    outbox: Vec<Dispatch>,
    quit: bool,
}

impl App {
    pub fn new(viewport: Viewport, difficulty: Difficulty, backend_label: impl Into<String>) -> Self {
        let mut app = Self {
            session: Session::new(),
            stats: StatsView::new(),
            timers: TimerQueue::new(),
            view: BoardView::fit(viewport),
            fb: FrameBuffer::new(viewport.width, viewport.height),
            viewport,
            selected: difficulty,
            backend_label: backend_label.into(),
            outbox: Vec::new(),
            quit: false,
        };
        app.repaint_board();
        app
    }

    /// Create the first game and load the history summary.
    pub fn start(&mut self, now_ms: u64) {
        self.command(UiCommand::NewGame, now_ms);
        self.refresh_history();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats(&self) -> &StatsView {
        &self.stats
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn selected_difficulty(&self) -> Difficulty {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Requests produced since the last call.
    pub fn take_outbox(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.outbox)
    }

    /// Milliseconds until the next timer fires, if any.
    pub fn next_wakeup(&self, now_ms: u64) -> Option<u64> {
        self.timers.until_next(now_ms)
    }

    pub fn command(&mut self, cmd: UiCommand, now_ms: u64) {
        let fx = match cmd {
            UiCommand::NewGame => {
                self.timers.cancel_reveals();
                self.session.new_game(self.selected)
            }
            UiCommand::SetDifficulty(d) => {
                self.selected = d;
                Effects::new()
            }
            UiCommand::Undo => self.session.undo(),
            UiCommand::Hint => self.session.hint(),
            UiCommand::Click { column, row } if self.session.accepts_input() => {
                match self.view.hit_test(Point::new(column, row)) {
                    Some(coord) => self.session.click(coord),
                    None => Effects::new(),
                }
            }
            UiCommand::Click { .. } => Effects::new(),
            UiCommand::Quit => {
                self.quit = true;
                Effects::new()
            }
        };
        self.apply(fx, now_ms);
    }

    /// Route a finished request to the session or the stats view.
    pub fn complete(&mut self, done: Completed, now_ms: u64) {
        let Completed { tag, result } = done;
        if tag.op == Operation::History {
            let summary = match result {
                Ok(Completion::History(summary)) => Ok(summary),
                Ok(Completion::Session(_)) => Err(Operation::History.default_failure_message().to_string()),
                Err(message) => Err(message),
            };
            if let Some(next) = self.stats.complete(summary) {
                self.outbox.push(next);
            }
            return;
        }
        let reply: Result<Reply, String> = match result {
            Ok(Completion::Session(reply)) => Ok(reply),
            Ok(Completion::History(_)) => Err(tag.op.default_failure_message().to_string()),
            Err(message) => Err(message),
        };
        let fx = self.session.complete(tag, reply);
        self.apply(fx, now_ms);
    }

    /// Fire every timer that is due.
    pub fn tick(&mut self, now_ms: u64) {
        while let Some(event) = self.timers.pop_due(now_ms) {
            self.fire(event, now_ms);
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.fb.resize(viewport.width, viewport.height);
        self.view = BoardView::fit(viewport);
        self.repaint_board();
    }

    /// The framebuffer with the side panel brought up to date.
    pub fn frame(&mut self) -> &FrameBuffer {
        let origin = self.view.panel_origin();
        let height = self.viewport.height.saturating_sub(origin.y);
        let model = PanelModel::new(&self.session, &self.stats, self.selected, &self.backend_label);
        paint_panel(&mut self.fb, origin, height, &model);
        &self.fb
    }

    fn refresh_history(&mut self) {
        if let Some(d) = self.stats.request_refresh() {
            self.outbox.push(d);
        }
    }

    fn repaint_board(&mut self) {
        let board = self.session.visible_board();
        self.view.paint_board(&mut self.fb, &board, self.session.winning_line());
    }

    fn fire(&mut self, event: TimerEvent, now_ms: u64) {
        match event {
            TimerEvent::ClearHint { coord } => {
                let board = self.session.visible_board();
                self.view
                    .clear_hint(&mut self.fb, coord, &board, self.session.winning_line());
            }
            TimerEvent::RevealAiMove { .. } => {
                let fx = self.session.on_timer(event);
                self.apply(fx, now_ms);
            }
        }
    }

    fn apply(&mut self, fx: Effects, now_ms: u64) {
        for effect in fx {
            match effect {
                Effect::Submit(d) => self.outbox.push(d),
                Effect::RepaintAll => self.repaint_board(),
                Effect::PaintStone { coord, side } => self.view.paint_stone(&mut self.fb, coord, side),
                Effect::PaintWinningLine => {
                    if let Some(line) = self.session.winning_line() {
                        self.view.paint_winning_line(&mut self.fb, line);
                    }
                }
                Effect::PaintHint { coord } => self.view.paint_hint(&mut self.fb, coord),
                Effect::Schedule { delay_ms, event } => {
                    if let Some(evicted) = self.timers.schedule(now_ms, delay_ms, event) {
                        tracing::debug!(?evicted, "timer queue full, firing early");
                        self.fire(evicted, now_ms);
                    }
                }
                Effect::RefreshHistory => self.refresh_history(),
            }
        }
    }
}
