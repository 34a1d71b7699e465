//! Terminal Gomoku client (default binary).
//!
//! Single-threaded loop: crossterm input, gateway completions and timers all
//! feed the [`App`]; the framebuffer is diff-flushed every iteration.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};

use gomoku_session::gateway::{AnyBackend, GatewayRuntime};
use gomoku_session::input::handle_event;
use gomoku_session::term::{TerminalRenderer, Viewport};
use gomoku_session::types::{Difficulty, TICK_MS};
use gomoku_session::{logging, App};

fn main() -> Result<()> {
    logging::init_from_env()?;

    let difficulty = std::env::var("GOMOKU_DIFFICULTY")
        .ok()
        .and_then(|s| Difficulty::from_str(&s))
        .unwrap_or_default();
    let backend = AnyBackend::from_env();
    let label = backend.describe();
    let mut gateway = GatewayRuntime::start(backend)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut gateway, difficulty, label);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = &result {
        tracing::error!(error = %e, "client exited with error");
    }
    result
}

fn run(term: &mut TerminalRenderer, gateway: &mut GatewayRuntime, difficulty: Difficulty, label: String) -> Result<()> {
    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_millis() as u64;
    let tick = Duration::from_millis(TICK_MS as u64);

    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut app = App::new(Viewport::new(w, h), difficulty, label);
    app.start(now_ms());

    loop {
        for job in app.take_outbox() {
            gateway.submit(job);
        }
        term.draw(app.frame())?;

        // Wake for input, the next timer, or the next tick (to drain completions).
        let timeout = app
            .next_wakeup(now_ms())
            .map(Duration::from_millis)
            .map_or(tick, |d| d.min(tick));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    app.resize(Viewport::new(w, h));
                    term.invalidate();
                }
                ev => {
                    if let Some(cmd) = handle_event(&ev) {
                        app.command(cmd, now_ms());
                    }
                }
            }
        }

        while let Some(done) = gateway.try_recv() {
            app.complete(done, now_ms());
        }
        app.tick(now_ms());

        if app.should_quit() {
            tracing::info!("quit requested");
            return Ok(());
        }
    }
}
