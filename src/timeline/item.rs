use super::{RepeatCount, SegmentDescriptor, Subdivision};
use crate::chord::Pitch;
use crate::loops::{LoopHandle, PatternKind};
use crate::time::{self, Time};

/// One playable segment of the timeline.
///
/// `start`, `stop` and `position` belong to the scheduler and are rewritten
/// on every recompute; everything else is fixed at creation.
#[derive(Debug)]
pub struct TimelineItem<H> {
    chord: String,
    subdivision: Subdivision,
    repeat_count: RepeatCount,
    pattern: PatternKind,
    pitches: Vec<Pitch>,
    start: Time,
    stop: Time,
    position: usize,
    loop_handle: H,
}

impl<H: LoopHandle> TimelineItem<H> {
    pub(crate) fn new(
        chord: String,
        repeat_count: RepeatCount,
        subdivision: Subdivision,
        pattern: PatternKind,
        pitches: Vec<Pitch>,
        loop_handle: H,
    ) -> Self {
        Self {
            chord,
            subdivision,
            repeat_count,
            pattern,
            pitches,
            start: time::zero(),
            stop: time::zero(),
            position: 0,
            loop_handle,
        }
    }

    pub fn chord(&self) -> &str {
        &self.chord
    }

    pub fn subdivision(&self) -> Subdivision {
        self.subdivision
    }

    pub fn repeat_count(&self) -> RepeatCount {
        self.repeat_count
    }

    pub fn pattern(&self) -> PatternKind {
        self.pattern
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn stop(&self) -> Time {
        self.stop
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn loop_handle(&self) -> &H {
        &self.loop_handle
    }

    pub fn duration(&self) -> Time {
        self.subdivision.unit() * Time::from_integer(i64::from(self.repeat_count.value()))
    }

    pub fn descriptor(&self) -> SegmentDescriptor {
        SegmentDescriptor::new(
            self.repeat_count.to_string(),
            self.subdivision.to_string(),
            self.chord.clone(),
            self.pattern,
        )
    }

    /// Lays the item out at `start` and returns where it stops.
    pub(crate) fn place(&mut self, start: Time, position: usize) -> Time {
        self.start = start;
        self.stop = start + self.duration();
        self.position = position;
        self.stop
    }

    /// Cancels the loop and arms it again for the current placement.
    pub(crate) fn rearm(&mut self) {
        self.loop_handle.cancel();
        self.loop_handle.start(self.start);
        self.loop_handle
            .set_repeat_count(u32::from(self.repeat_count.value()));
        self.loop_handle.set_loop_length(self.subdivision.unit());
    }

    pub(crate) fn cancel(&mut self) {
        self.loop_handle.cancel();
    }
}
