use super::{LoopHandle, PatternKind, SegmentLoopAdapter};
use crate::chord::Pitch;
use crate::time::Time;
use crate::timeline::Subdivision;
use log::trace;

/// Pitches to sound at a point on the timeline, held for `length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEvent {
    pub at: Time,
    pub length: Time,
    pub pitches: Vec<Pitch>,
}

#[derive(Debug, Clone)]
pub struct PatternLoop {
    kind: PatternKind,
    pitches: Vec<Pitch>,
    start: Option<Time>,
    repeat_count: u32,
    loop_length: Time,
}

impl PatternLoop {
    pub fn new(kind: PatternKind, pitches: Vec<Pitch>, subdivision: Subdivision) -> Self {
        Self {
            kind,
            pitches,
            start: None,
            repeat_count: 1,
            loop_length: subdivision.unit(),
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn start_time(&self) -> Option<Time> {
        self.start
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn loop_length(&self) -> Time {
        self.loop_length
    }

    pub fn is_armed(&self) -> bool {
        self.start.is_some()
    }

    /// Events whose onset falls in `[from, to)`.
    pub fn events_between(&self, from: Time, to: Time) -> Vec<NoteEvent> {
        let Some(start) = self.start else {
            return Vec::new();
        };
        if self.pitches.is_empty() {
            return Vec::new();
        }

        (0..self.repeat_count)
            .filter_map(|k| {
                let at = start + self.loop_length * Time::from_integer(i64::from(k));
                if at < from || at >= to {
                    return None;
                }
                let pitches = match self.kind {
                    PatternKind::Scale => vec![self.pitches[k as usize % self.pitches.len()]],
                    PatternKind::Quick => self.pitches.clone(),
                };
                Some(NoteEvent {
                    at,
                    length: self.loop_length,
                    pitches,
                })
            })
            .collect()
    }
}

impl LoopHandle for PatternLoop {
    fn cancel(&mut self) {
        if self.start.take().is_some() {
            trace!("Cancelled {} loop over {:?}", self.kind, self.pitches);
        }
    }

    fn start(&mut self, at: Time) {
        self.start = Some(at);
    }

    fn set_repeat_count(&mut self, count: u32) {
        self.repeat_count = count;
    }

    fn set_loop_length(&mut self, length: Time) {
        self.loop_length = length;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternLoopAdapter;

impl SegmentLoopAdapter for PatternLoopAdapter {
    type Handle = PatternLoop;

    fn build(&self, kind: PatternKind, pitches: &[Pitch], subdivision: Subdivision) -> PatternLoop {
        PatternLoop::new(kind, pitches.to_vec(), subdivision)
    }
}
