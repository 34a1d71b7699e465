//! History/stats projection.
//!
//! Holds only the last summary the backend reported. Nothing is aggregated
//! locally; every refresh replaces the previous copy wholesale.

use crate::session::{Dispatch, Request, Tag};
use crate::types::Operation;

/// Aggregate outcome counters owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub total_games: u32,
    pub player_wins: u32,
    pub ai_wins: u32,
    pub draws: u32,
}

/// Read-only view of the last fetched [`HistorySummary`].
#[derive(Debug, Clone, Default)]
pub struct StatsView {
    summary: Option<HistorySummary>,
    in_flight: bool,
    /// A refresh was asked for while another was outstanding.
    dirty: bool,
}

impl StatsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> Option<HistorySummary> {
        self.summary
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Ask for a refresh. Returns the request to issue, or None when one is
    /// already outstanding (the newer refresh is issued once it completes).
    pub fn request_refresh(&mut self) -> Option<Dispatch> {
        if self.in_flight {
            self.dirty = true;
            return None;
        }
        self.in_flight = true;
        self.dirty = false;
        Some(Dispatch {
            tag: Tag {
                generation: 0,
                op: Operation::History,
            },
            request: Request::History,
        })
    }

    /// Apply a completed history fetch. On failure the last summary is kept.
    ///
    /// Returns a follow-up request when a refresh was queued meanwhile.
    pub fn complete(&mut self, result: Result<HistorySummary, String>) -> Option<Dispatch> {
        self.in_flight = false;
        match result {
            Ok(summary) => self.summary = Some(summary),
            Err(message) => tracing::warn!(%message, "history refresh failed"),
        }
        if self.dirty {
            self.request_refresh()
        } else {
            None
        }
    }
}
