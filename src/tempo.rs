//! Tempo bounds and debouncing.

use crate::config::{MAX_BPM, MIN_BPM};
use log::trace;
use std::time::{Duration, Instant};

/// Clamps any requested tempo into `MIN_BPM..=MAX_BPM`.
pub fn clamp_bpm(requested: i64) -> u32 {
    requested.clamp(i64::from(MIN_BPM), i64::from(MAX_BPM)) as u32
}

/// Coalesces bursts of tempo requests into one effective change.
///
/// Every request replaces the pending value and pushes the deadline out by
/// the quiet window, so only the last value of a burst is ever released.
#[derive(Debug, Clone)]
pub struct TempoDebouncer {
    window: Duration,
    pending: Option<u32>,
    deadline: Option<Instant>,
}

impl TempoDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn request(&mut self, bpm: i64, now: Instant) {
        let bpm = clamp_bpm(bpm);
        if let Some(superseded) = self.pending.replace(bpm) {
            trace!("Tempo {} superseded by {}", superseded, bpm);
        }
        self.deadline = Some(now + self.window);
    }

    /// Releases the pending tempo once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<u32> {
        self.pending
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
