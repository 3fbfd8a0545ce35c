use crate::config::DEFAULT_BPM;
use std::sync::{Arc, Mutex};

/// Playback state shared with clock callbacks and the state inspector.
pub type SharedState = Arc<Mutex<PlaybackState>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Idle,
    Playing,
}

#[derive(Debug, Clone)]
pub struct PlaybackState {
    active: Option<usize>,
    transport: TransportState,
    bpm: u32,
    pulse_period_secs: u64,
    labels: Vec<String>,
    loop_end_beats: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl PlaybackState {
    pub fn new(bpm: u32) -> Self {
        let mut state = Self {
            active: None,
            transport: TransportState::Idle,
            bpm,
            pulse_period_secs: 0,
            labels: Vec::new(),
            loop_end_beats: 0.0,
        };
        state.set_tempo(bpm);
        state
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn set_active(&mut self, index: Option<usize>) {
        self.active = index;
    }

    /// Index of the segment currently or most recently sounding.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_label(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Publishes the chord labels and loop length of the latest layout.
    pub fn set_layout(&mut self, labels: Vec<String>, loop_end_beats: f64) {
        self.labels = labels;
        self.loop_end_beats = loop_end_beats;
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn segment_count(&self) -> usize {
        self.labels.len()
    }

    pub fn loop_end_beats(&self) -> f64 {
        self.loop_end_beats
    }

    /// Also refreshes the pulse period, one full pulse per `360 / bpm` seconds.
    pub fn set_tempo(&mut self, bpm: u32) {
        self.bpm = bpm;
        self.pulse_period_secs = if bpm == 0 {
            0
        } else {
            u64::from(360u32.div_ceil(bpm))
        };
    }

    pub fn tempo(&self) -> u32 {
        self.bpm
    }

    pub fn pulse_period_secs(&self) -> u64 {
        self.pulse_period_secs
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.transport = if playing {
            TransportState::Playing
        } else {
            TransportState::Idle
        };
    }

    pub fn is_playing(&self) -> bool {
        self.transport == TransportState::Playing
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport
    }
}
