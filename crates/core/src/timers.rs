//! Cooperative timers for the single-threaded session loop.
//!
//! Nothing here sleeps: callers pass a monotonic millisecond clock and poll
//! for due events, the same way the game loop feeds elapsed time into ticks.

use arrayvec::ArrayVec;

use crate::types::Coord;

/// Maximum number of outstanding timers.
pub const TIMER_CAPACITY: usize = 8;

/// Event posted back into the loop when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Paint the AI's reply for the session with this generation.
    RevealAiMove { generation: u64 },
    /// Remove the hint marker at `coord`.
    ClearHint { coord: Coord },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    due_ms: u64,
    event: TimerEvent,
}

/// Fixed-capacity timer queue ordered by due time (FIFO among equal deadlines).
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    entries: ArrayVec<Entry, TIMER_CAPACITY>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule `event` at `now_ms + delay_ms`.
    ///
    /// When the queue is full the earliest entry is evicted and returned so the
    /// caller can run it immediately.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u32, event: TimerEvent) -> Option<TimerEvent> {
        let evicted = if self.entries.is_full() {
            Some(self.entries.remove(0).event)
        } else {
            None
        };
        let due_ms = now_ms.saturating_add(delay_ms as u64);
        let at = self
            .entries
            .iter()
            .position(|e| e.due_ms > due_ms)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, Entry { due_ms, event });
        evicted
    }

    /// Pop the next event whose deadline has passed.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TimerEvent> {
        match self.entries.first() {
            Some(e) if e.due_ms <= now_ms => Some(self.entries.remove(0).event),
            _ => None,
        }
    }

    /// Milliseconds until the next deadline (0 if already due).
    pub fn until_next(&self, now_ms: u64) -> Option<u64> {
        self.entries
            .first()
            .map(|e| e.due_ms.saturating_sub(now_ms))
    }

    /// Drop every pending AI reveal (used when a session is discarded).
    pub fn cancel_reveals(&mut self) {
        self.entries
            .retain(|e| !matches!(e.event, TimerEvent::RevealAiMove { .. }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fire_in_deadline_order() {
        let mut q = TimerQueue::new();
        let hint = TimerEvent::ClearHint {
            coord: Coord::new(1, 1),
        };
        let reveal = TimerEvent::RevealAiMove { generation: 1 };
        q.schedule(0, 3000, hint);
        q.schedule(0, 300, reveal);

        assert_eq!(q.pop_due(299), None);
        assert_eq!(q.pop_due(300), Some(reveal));
        assert_eq!(q.until_next(300), Some(2700));
        assert_eq!(q.pop_due(2999), None);
        assert_eq!(q.pop_due(5000), Some(hint));
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_keep_insertion_order() {
        let mut q = TimerQueue::new();
        let a = TimerEvent::ClearHint {
            coord: Coord::new(0, 0),
        };
        let b = TimerEvent::ClearHint {
            coord: Coord::new(0, 1),
        };
        q.schedule(10, 5, a);
        q.schedule(10, 5, b);
        assert_eq!(q.pop_due(15), Some(a));
        assert_eq!(q.pop_due(15), Some(b));
    }

    #[test]
    fn full_queue_evicts_earliest() {
        let mut q = TimerQueue::new();
        for i in 0..TIMER_CAPACITY as u8 {
            let ev = TimerEvent::ClearHint {
                coord: Coord::new(0, i),
            };
            assert_eq!(q.schedule(0, 100 + i as u32, ev), None);
        }
        let evicted = q.schedule(0, 1, TimerEvent::RevealAiMove { generation: 2 });
        assert_eq!(
            evicted,
            Some(TimerEvent::ClearHint {
                coord: Coord::new(0, 0)
            })
        );
        assert_eq!(q.len(), TIMER_CAPACITY);
        assert_eq!(q.pop_due(1), Some(TimerEvent::RevealAiMove { generation: 2 }));
    }

    #[test]
    fn cancel_reveals_keeps_hint_clears() {
        let mut q = TimerQueue::new();
        q.schedule(0, 300, TimerEvent::RevealAiMove { generation: 4 });
        q.schedule(0, 3000, TimerEvent::ClearHint { coord: Coord::new(5, 5) });
        q.cancel_reveals();
        assert_eq!(q.len(), 1);
        assert_eq!(
            q.pop_due(3000),
            Some(TimerEvent::ClearHint { coord: Coord::new(5, 5) })
        );
    }
}
