use super::{
    ExportError, ImportError, ImportReport, SegmentDescriptor, SkippedSegment, TimelineError,
    TimelineItem,
};
use crate::chord::ChordResolver;
use crate::clock::{ClockCallback, TransportClock};
use crate::config::{DEFAULT_DEBOUNCE_MS, DEFAULT_OCTAVE};
use crate::loops::SegmentLoopAdapter;
use crate::state::{PlaybackState, SharedState, TransportState};
use crate::tempo::{clamp_bpm, TempoDebouncer};
use crate::time::{self, Time};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerOptions {
    /// Octave chord roots are voiced in
    pub octave: i8,
    /// Quiet window before a tempo change takes effect
    pub debounce: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            octave: DEFAULT_OCTAVE,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// Owns the ordered segments and keeps the transport, the loop handles and
/// the active-segment pointer consistent with them.
///
/// Every mutation ends in exactly one [`TimelineScheduler::recompute`].
pub struct TimelineScheduler<C, A, R>
where
    C: TransportClock,
    A: SegmentLoopAdapter,
    R: ChordResolver,
{
    clock: C,
    adapter: A,
    resolver: R,
    octave: i8,
    items: Vec<TimelineItem<A::Handle>>,
    state: SharedState,
    transport: TransportState,
    debouncer: TempoDebouncer,
}

impl<C, A, R> TimelineScheduler<C, A, R>
where
    C: TransportClock,
    A: SegmentLoopAdapter,
    R: ChordResolver,
{
    pub fn new(clock: C, adapter: A, resolver: R, options: SchedulerOptions) -> Self {
        let bpm = clamp_bpm(i64::from(clock.tempo()));
        let mut scheduler = Self {
            clock,
            adapter,
            resolver,
            octave: options.octave,
            items: Vec::new(),
            state: PlaybackState::new(bpm).into_shared(),
            transport: TransportState::Idle,
            debouncer: TempoDebouncer::new(options.debounce),
        };
        scheduler.clock.set_tempo(bpm);
        scheduler.recompute();
        scheduler
    }

    /// Re-derives the whole layout: timestamps, loop handles, activation
    /// callbacks and the loop region.
    pub fn recompute(&mut self) {
        // Nothing registered under the previous layout may survive
        self.clock.cancel_all_scheduled();

        let mut cursor = time::zero();
        for (position, item) in self.items.iter_mut().enumerate() {
            cursor = item.place(cursor, position);
            item.rearm();

            let state = self.state.clone();
            let activate: ClockCallback = Box::new(move |_| {
                if let Ok(mut state) = state.lock() {
                    state.set_active(Some(position));
                }
            });
            self.clock.schedule(activate, item.start());
        }

        match self.items.last() {
            Some(last) => self.clock.set_loop_region(last.stop(), true),
            None => self.clock.set_loop_region(time::zero(), false),
        }

        let labels = self.items.iter().map(|i| i.chord().to_string()).collect();
        let count = self.items.len();
        if let Ok(mut state) = self.state.lock() {
            let active = match (state.active(), count) {
                (_, 0) => None,
                (Some(k), n) => Some(k.min(n - 1)),
                (None, _) => Some(0),
            };
            state.set_active(active);
            state.set_layout(labels, time::to_f64(cursor));
        }
        debug!("Recomputed {} segments, loop end {}", count, cursor);
    }

    /// Inserts a segment right after the active one and makes it active.
    /// Returns its position.
    ///
    /// Nothing changes when the digits are invalid or the chord does not resolve.
    pub fn insert_segment(&mut self, descriptor: &SegmentDescriptor) -> Result<usize, TimelineError> {
        let item = self.build_item(descriptor)?;
        let position = self.active_index().map_or(self.items.len(), |k| k + 1);
        self.items.insert(position, item);
        self.recompute();
        self.set_active(Some(position));
        info!(
            "Inserted {} at position {} ({} segments)",
            descriptor.chord,
            position,
            self.items.len()
        );
        Ok(position)
    }

    /// Removes the segment at `position` and returns its descriptor.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    pub fn remove_segment(&mut self, position: usize) -> SegmentDescriptor {
        assert!(
            position < self.items.len(),
            "remove_segment: position {} out of range for {} segments",
            position,
            self.items.len()
        );
        let mut item = self.items.remove(position);
        item.cancel();
        self.recompute();
        info!("Removed {} from position {}", item.chord(), position);
        item.descriptor()
    }

    /// Appends every descriptor in order, then recomputes once.
    ///
    /// All descriptors are validated before anything is appended; chords
    /// that fail to resolve are skipped and reported.
    pub fn import_sequence(
        &mut self,
        descriptors: &[SegmentDescriptor],
    ) -> Result<ImportReport, ImportError> {
        for (index, descriptor) in descriptors.iter().enumerate() {
            descriptor
                .validate()
                .map_err(|source| ImportError::Validation { index, source })?;
        }

        let mut report = ImportReport::default();
        for (index, descriptor) in descriptors.iter().enumerate() {
            match self.build_item(descriptor) {
                Ok(item) => {
                    self.items.push(item);
                    report.imported += 1;
                }
                Err(TimelineError::Chord(error)) => {
                    warn!("Skipping segment {} on import: {}", index, error);
                    report.skipped.push(SkippedSegment { index, error });
                }
                Err(TimelineError::Validation(source)) => {
                    // Already checked above
                    return Err(ImportError::Validation { index, source });
                }
            }
        }

        self.recompute();
        info!(
            "Imported {} segments, skipped {}",
            report.imported,
            report.skipped.len()
        );
        Ok(report)
    }

    pub fn import_json(&mut self, json: &str) -> Result<ImportReport, ImportError> {
        let descriptors: Vec<SegmentDescriptor> = serde_json::from_str(json)?;
        self.import_sequence(&descriptors)
    }

    pub fn import_file(&mut self, path: &Path) -> Result<ImportReport, ImportError> {
        let json = fs::read_to_string(path)?;
        debug!("Importing progression from {}", path.display());
        self.import_json(&json)
    }

    pub fn export_sequence(&self) -> Vec<SegmentDescriptor> {
        self.items.iter().map(TimelineItem::descriptor).collect()
    }

    /// The exported sequence as JSON indented by four spaces.
    pub fn export_json(&self) -> Result<String, ExportError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.export_sequence().serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn export_file(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, self.export_json()?)?;
        info!("Exported {} segments to {}", self.items.len(), path.display());
        Ok(())
    }

    /// Queues a tempo change; it takes effect once requests stop for the
    /// debounce window. Out-of-range values are clamped.
    pub fn request_tempo(&mut self, bpm: i64, now: Instant) {
        self.debouncer.request(bpm, now);
    }

    /// Applies a pending tempo change whose quiet window has elapsed.
    pub fn poll_tempo(&mut self, now: Instant) -> Option<u32> {
        let bpm = self.debouncer.poll(now)?;
        self.apply_tempo(bpm);
        Some(bpm)
    }

    /// Sets the tempo immediately, bypassing the debouncer.
    pub fn apply_tempo(&mut self, bpm: u32) {
        let bpm = clamp_bpm(i64::from(bpm));
        self.clock.set_tempo(bpm);
        if let Ok(mut state) = self.state.lock() {
            state.set_tempo(bpm);
        }
        // Layout is in beats and stays put; this refreshes the clock wiring
        self.recompute();
        info!("Tempo changed to {} BPM", bpm);
    }

    pub fn tempo(&self) -> u32 {
        self.clock.tempo()
    }

    pub fn pending_tempo(&self) -> Option<u32> {
        self.debouncer.pending()
    }

    /// Restarts the transport from the top of the timeline.
    pub fn start(&mut self) {
        self.clock.stop();
        self.clock.start();
        self.transport = TransportState::Playing;
        if let Ok(mut state) = self.state.lock() {
            state.set_playing(true);
        }
        info!("Playback started");
    }

    /// Stops the transport and parks the active pointer on the last segment.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.transport = TransportState::Idle;
        if let Ok(mut state) = self.state.lock() {
            state.set_playing(false);
        }
        self.set_active(self.items.len().checked_sub(1));
        info!("Playback stopped");
    }

    pub fn toggle(&mut self) {
        match self.transport {
            TransportState::Playing => self.stop(),
            TransportState::Idle => self.start(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.transport == TransportState::Playing
    }

    pub fn active_index(&self) -> Option<usize> {
        self.state.lock().ok().and_then(|state| state.active())
    }

    pub fn items(&self) -> &[TimelineItem<A::Handle>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// End of the loop region, or `None` when looping is off.
    pub fn loop_end(&self) -> Option<Time> {
        self.items.last().map(TimelineItem::stop)
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn shared_state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn set_active(&self, index: Option<usize>) {
        if let Ok(mut state) = self.state.lock() {
            state.set_active(index);
        }
    }

    fn build_item(
        &self,
        descriptor: &SegmentDescriptor,
    ) -> Result<TimelineItem<A::Handle>, TimelineError> {
        let (repeat_count, subdivision) = descriptor.validate()?;
        let pitches = self.resolver.resolve(&descriptor.chord, self.octave)?;
        let handle = self
            .adapter
            .build(descriptor.pattern, &pitches, subdivision);
        Ok(TimelineItem::new(
            descriptor.chord.clone(),
            repeat_count,
            subdivision,
            descriptor.pattern,
            pitches,
            handle,
        ))
    }
}

impl<C, A, R> Drop for TimelineScheduler<C, A, R>
where
    C: TransportClock,
    A: SegmentLoopAdapter,
    R: ChordResolver,
{
    fn drop(&mut self) {
        self.clock.cancel_all_scheduled();
        for item in &mut self.items {
            item.cancel();
        }
    }
}
