//! Transport clock
//!
//! The transport is the single authority for musical time: it owns the
//! playhead, the tempo, the callbacks scheduled against the timeline and the
//! loop region that makes playback repeat.
//!
//! - [`TransportClock`] is the interface the timeline scheduler drives
//! - [`VirtualTransport`] advances a playhead by elapsed wall-clock time
//! - [`TickGenerator`] wakes the event loop at a steady rate
//!
mod generator;
mod transport;

use crate::time::Time;

pub use generator::TickGenerator;
pub use transport::VirtualTransport;

/// Invoked with the timeline time it was scheduled at.
pub type ClockCallback = Box<dyn FnMut(Time) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(pub u64);

pub trait TransportClock {
    /// Current playhead position.
    fn now(&self) -> Time;

    /// Drops every pending callback. Safe to call with nothing scheduled.
    fn cancel_all_scheduled(&mut self);

    /// Registers `callback` to run whenever playback reaches `at`.
    fn schedule(&mut self, callback: ClockCallback, at: Time) -> CallbackId;

    fn set_tempo(&mut self, bpm: u32);

    fn tempo(&self) -> u32;

    /// Playback wraps to zero at `end` while `enabled`.
    fn set_loop_region(&mut self, end: Time, enabled: bool);

    fn start(&mut self);

    /// Halts playback and rewinds to zero.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
