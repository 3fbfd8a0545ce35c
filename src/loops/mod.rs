//! Per-segment loop playback
//!
//! A loop handle repeats one chord for a segment's span of the timeline. The
//! timeline scheduler does not own what a handle plays, only its lifecycle:
//! - [`LoopHandle`] is re-armed on every recompute and cancelled before discard
//! - [`SegmentLoopAdapter`] builds handles from a pattern kind and a pitch set
//! - [`PatternLoop`] is the built-in handle producing [`NoteEvent`]s
//!
mod pattern_loop;

use crate::chord::Pitch;
use crate::time::Time;
use crate::timeline::Subdivision;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use pattern_loop::{NoteEvent, PatternLoop, PatternLoopAdapter};

/// Playback shape of a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// One chord tone per subdivision unit, walking up the chord
    #[default]
    Scale,
    /// The whole chord on every subdivision unit
    Quick,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Scale => write!(f, "scale"),
            PatternKind::Quick => write!(f, "quick"),
        }
    }
}

impl FromStr for PatternKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scale" => Ok(PatternKind::Scale),
            "quick" => Ok(PatternKind::Quick),
            other => Err(format!("unknown pattern kind `{}`", other)),
        }
    }
}

/// A controllable loop for one segment.
pub trait LoopHandle: Send {
    /// Silences the loop and forgets its start time.
    fn cancel(&mut self);

    /// Arms the loop to begin at `at` on the timeline.
    fn start(&mut self, at: Time);

    fn set_repeat_count(&mut self, count: u32);

    fn set_loop_length(&mut self, length: Time);
}

pub trait SegmentLoopAdapter {
    type Handle: LoopHandle;

    fn build(&self, kind: PatternKind, pitches: &[Pitch], subdivision: Subdivision)
        -> Self::Handle;
}
