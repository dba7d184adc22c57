//! Time-sliced room checks
//!
//! Spreads per-room visibility checks over several ticks with a wrapping
//! cursor. A full sweep forces one tick to visit every room.

/// Wrapping cursor over the room list
#[derive(Debug, Clone, Default)]
pub struct TimeSliceScheduler {
    head: usize,
    full_sweep: bool,
}

impl TimeSliceScheduler {
    /// Create a scheduler at the start of the list
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms to check this tick
    pub fn iterations(&self, total: usize, checks_per_frame: usize) -> usize {
        if total == 0 {
            return 0;
        }
        if self.full_sweep {
            return total;
        }
        checks_per_frame.max(1).min(total)
    }

    /// Index of the next room, advancing the cursor
    pub fn next(&mut self, total: usize) -> usize {
        if self.head >= total {
            self.head = 0;
        }
        let index = self.head;
        self.head += 1;
        index
    }

    /// Visit every room on the next tick, starting from the first
    pub fn start_full_sweep(&mut self) {
        self.full_sweep = true;
        self.head = 0;
    }

    /// Finish the current tick; a pending full sweep only lasts one pass
    pub fn end_tick(&mut self) {
        self.full_sweep = false;
    }

    /// Whether the next tick is a full sweep
    pub fn is_full_sweep(&self) -> bool {
        self.full_sweep
    }
}
