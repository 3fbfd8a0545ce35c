#![allow(dead_code)]

use chordloops::chord::Pitch;
use chordloops::clock::{CallbackId, ClockCallback, TransportClock};
use chordloops::loops::{LoopHandle, NoteEvent, PatternKind, SegmentLoopAdapter};
use chordloops::midi_output::NoteSink;
use chordloops::time::{self, Time};
use chordloops::timeline::Subdivision;
use chordloops::SegmentDescriptor;
use std::sync::{Arc, Mutex};

pub fn seg(amount: &str, single: &str, chord: &str) -> SegmentDescriptor {
    SegmentDescriptor::new(amount, single, chord, PatternKind::Scale)
}

/// Clock fake that records every call the scheduler makes.
pub struct RecordingClock {
    pub now: Time,
    pub bpm: u32,
    pub running: bool,
    pub loop_end: Time,
    pub looping: bool,
    pub cancel_count: usize,
    pub start_count: usize,
    pub stop_count: usize,
    pub callbacks: Vec<(Time, ClockCallback)>,
    next_id: u64,
}

impl RecordingClock {
    pub fn new(bpm: u32) -> Self {
        Self {
            now: time::zero(),
            bpm,
            running: false,
            loop_end: time::zero(),
            looping: false,
            cancel_count: 0,
            start_count: 0,
            stop_count: 0,
            callbacks: Vec::new(),
            next_id: 0,
        }
    }

    pub fn scheduled_times(&self) -> Vec<Time> {
        self.callbacks.iter().map(|(at, _)| *at).collect()
    }

    /// Runs every callback registered at exactly `at`.
    pub fn fire_at(&mut self, at: Time) {
        for (when, callback) in self.callbacks.iter_mut() {
            if *when == at {
                callback(at);
            }
        }
    }
}

impl TransportClock for RecordingClock {
    fn now(&self) -> Time {
        self.now
    }

    fn cancel_all_scheduled(&mut self) {
        self.cancel_count += 1;
        self.callbacks.clear();
    }

    fn schedule(&mut self, callback: ClockCallback, at: Time) -> CallbackId {
        self.callbacks.push((at, callback));
        self.next_id += 1;
        CallbackId(self.next_id)
    }

    fn set_tempo(&mut self, bpm: u32) {
        self.bpm = bpm;
    }

    fn tempo(&self) -> u32 {
        self.bpm
    }

    fn set_loop_region(&mut self, end: Time, enabled: bool) {
        self.loop_end = end;
        self.looping = enabled;
    }

    fn start(&mut self) {
        self.running = true;
        self.start_count += 1;
    }

    fn stop(&mut self) {
        self.running = false;
        self.now = time::zero();
        self.stop_count += 1;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopCall {
    Cancel(Vec<Pitch>),
    Start(Vec<Pitch>, Time),
    RepeatCount(Vec<Pitch>, u32),
    LoopLength(Vec<Pitch>, Time),
}

pub type LoopLog = Arc<Mutex<Vec<LoopCall>>>;

pub struct RecordingLoop {
    pitches: Vec<Pitch>,
    log: LoopLog,
}

impl LoopHandle for RecordingLoop {
    fn cancel(&mut self) {
        self.log
            .lock()
            .unwrap()
            .push(LoopCall::Cancel(self.pitches.clone()));
    }

    fn start(&mut self, at: Time) {
        self.log
            .lock()
            .unwrap()
            .push(LoopCall::Start(self.pitches.clone(), at));
    }

    fn set_repeat_count(&mut self, count: u32) {
        self.log
            .lock()
            .unwrap()
            .push(LoopCall::RepeatCount(self.pitches.clone(), count));
    }

    fn set_loop_length(&mut self, length: Time) {
        self.log
            .lock()
            .unwrap()
            .push(LoopCall::LoopLength(self.pitches.clone(), length));
    }
}

#[derive(Default)]
pub struct RecordingLoopAdapter {
    pub log: LoopLog,
}

impl SegmentLoopAdapter for RecordingLoopAdapter {
    type Handle = RecordingLoop;

    fn build(&self, _kind: PatternKind, pitches: &[Pitch], _subdivision: Subdivision) -> RecordingLoop {
        RecordingLoop {
            pitches: pitches.to_vec(),
            log: self.log.clone(),
        }
    }
}

/// Note sink that keeps everything it is handed.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub played: Arc<Mutex<Vec<NoteEvent>>>,
    pub silenced: Arc<Mutex<usize>>,
}

impl NoteSink for RecordingSink {
    fn play(&mut self, event: &NoteEvent, _bpm: u32) {
        self.played.lock().unwrap().push(event.clone());
    }

    fn silence(&mut self) {
        *self.silenced.lock().unwrap() += 1;
    }
}
