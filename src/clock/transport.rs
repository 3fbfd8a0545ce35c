use super::{CallbackId, ClockCallback, TransportClock};
use crate::config::DEFAULT_BPM;
use crate::time::{self, Time};
use log::{debug, info, trace};

struct Scheduled {
    id: CallbackId,
    at: Time,
    callback: ClockCallback,
}

/// Deterministic transport whose playhead moves only when it is advanced.
///
/// Scheduled callbacks are not one-shot: they fire every time the playhead
/// crosses their time, once per pass of the loop region, until they are
/// cancelled.
pub struct VirtualTransport {
    position: Time,
    running: bool,
    bpm: u32,
    loop_end: Time,
    looping: bool,
    callbacks: Vec<Scheduled>,
    next_id: u64,
}

impl Default for VirtualTransport {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl VirtualTransport {
    pub fn new(bpm: u32) -> Self {
        Self {
            position: time::zero(),
            running: false,
            bpm,
            loop_end: time::zero(),
            looping: false,
            callbacks: Vec::new(),
            next_id: 0,
        }
    }

    pub fn loop_end(&self) -> Time {
        self.loop_end
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn scheduled_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Times of every pending callback, in firing order.
    pub fn scheduled_times(&self) -> Vec<Time> {
        let mut times: Vec<Time> = self.callbacks.iter().map(|s| s.at).collect();
        times.sort();
        times
    }

    /// Moves the playhead forward by `seconds` of wall-clock time at the
    /// current tempo.
    pub fn advance_seconds(&mut self, seconds: f64) -> Vec<(Time, Time)> {
        self.advance(time::from_seconds(seconds, self.bpm))
    }

    /// Moves the playhead forward by `delta` beats, firing callbacks on the
    /// way. Returns the half-open spans that were played, split at loop wraps.
    pub fn advance(&mut self, delta: Time) -> Vec<(Time, Time)> {
        let mut spans = Vec::new();
        if !self.running || delta <= time::zero() {
            return spans;
        }

        let mut remaining = delta;
        while remaining > time::zero() {
            let wraps = self.looping && self.loop_end > time::zero();
            // A shrunken loop region can leave the playhead past its end
            if wraps && self.position >= self.loop_end {
                self.position = time::zero();
            }

            let from = self.position;
            let mut to = from + remaining;
            let wrapped = wraps && to >= self.loop_end;
            if wrapped {
                to = self.loop_end;
            }

            self.fire_between(from, to);
            spans.push((from, to));
            remaining -= to - from;

            if wrapped {
                trace!("Transport wrapped at {}", to);
                self.position = time::zero();
            } else {
                self.position = to;
            }
        }
        spans
    }

    fn fire_between(&mut self, from: Time, to: Time) {
        let mut due: Vec<(Time, CallbackId, usize)> = self
            .callbacks
            .iter()
            .enumerate()
            .filter(|(_, s)| s.at >= from && s.at < to)
            .map(|(i, s)| (s.at, s.id, i))
            .collect();
        due.sort();

        for (at, id, index) in due {
            trace!("Firing callback {:?} at {}", id, at);
            let scheduled = &mut self.callbacks[index];
            (scheduled.callback)(at);
        }
    }
}

impl TransportClock for VirtualTransport {
    fn now(&self) -> Time {
        self.position
    }

    fn cancel_all_scheduled(&mut self) {
        if !self.callbacks.is_empty() {
            debug!("Cancelling {} scheduled callbacks", self.callbacks.len());
        }
        self.callbacks.clear();
    }

    fn schedule(&mut self, callback: ClockCallback, at: Time) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.push(Scheduled { id, at, callback });
        id
    }

    fn set_tempo(&mut self, bpm: u32) {
        self.bpm = bpm;
        info!("Transport tempo set to {} BPM", bpm);
    }

    fn tempo(&self) -> u32 {
        self.bpm
    }

    fn set_loop_region(&mut self, end: Time, enabled: bool) {
        self.loop_end = end;
        self.looping = enabled;
        debug!("Loop region end={} enabled={}", end, enabled);
    }

    fn start(&mut self) {
        self.running = true;
        info!("Transport started at {}", self.position);
    }

    fn stop(&mut self) {
        self.running = false;
        self.position = time::zero();
        info!("Transport stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::beats;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<Time>>>) -> ClockCallback {
        let log = log.clone();
        Box::new(move |at| log.lock().unwrap().push(at))
    }

    #[test]
    fn test_stopped_transport_does_not_move() {
        let mut transport = VirtualTransport::new(120);
        assert!(transport.advance(beats(4)).is_empty());
        assert_eq!(transport.now(), beats(0));
    }

    #[test]
    fn test_callbacks_fire_in_time_order() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut transport = VirtualTransport::new(120);
        transport.schedule(recorder(&fired), beats(2));
        transport.schedule(recorder(&fired), beats(0));
        transport.schedule(recorder(&fired), beats(5));
        transport.start();

        transport.advance(beats(3));
        assert_eq!(*fired.lock().unwrap(), vec![beats(0), beats(2)]);
        assert_eq!(transport.now(), beats(3));
    }

    #[test]
    fn test_loop_wraps_and_refires() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut transport = VirtualTransport::new(120);
        transport.schedule(recorder(&fired), beats(0));
        transport.schedule(recorder(&fired), beats(2));
        transport.set_loop_region(beats(4), true);
        transport.start();

        let spans = transport.advance(beats(9));
        assert_eq!(
            spans,
            vec![
                (beats(0), beats(4)),
                (beats(0), beats(4)),
                (beats(0), beats(1))
            ]
        );
        assert_eq!(transport.now(), beats(1));
        assert_eq!(fired.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_cancel_all_scheduled() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut transport = VirtualTransport::new(120);
        transport.cancel_all_scheduled();
        transport.schedule(recorder(&fired), beats(1));
        transport.cancel_all_scheduled();
        assert_eq!(transport.scheduled_count(), 0);

        transport.start();
        transport.advance(beats(2));
        assert!(fired.lock().unwrap().is_empty());
    }

    #[test]
    fn test_playhead_past_shrunken_loop_restarts() {
        let mut transport = VirtualTransport::new(120);
        transport.start();
        transport.advance(beats(6));
        transport.set_loop_region(beats(4), true);

        let spans = transport.advance(beats(1));
        assert_eq!(spans, vec![(beats(0), beats(1))]);
    }

    #[test]
    fn test_stop_rewinds_and_seconds_follow_tempo() {
        let mut transport = VirtualTransport::new(60);
        transport.start();
        transport.advance_seconds(2.0);
        assert_eq!(transport.now(), beats(2));

        transport.set_tempo(120);
        transport.advance_seconds(1.0);
        assert_eq!(transport.now(), beats(4));

        transport.stop();
        assert!(!transport.is_running());
        assert_eq!(transport.now(), beats(0));
    }
}
