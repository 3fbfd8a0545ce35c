//! Timeline layout and scheduling
//!
//! The timeline is an ordered list of chord-loop segments laid end to end.
//! [`TimelineScheduler`] assigns every segment its start and stop, arms its
//! loop handle and keeps the transport's loop region and activation callbacks
//! in step with the layout. [`SegmentDescriptor`] is the serialized form used
//! by import and export.
//!
mod descriptor;
mod error;
mod item;
mod scheduler;

pub use descriptor::{RepeatCount, SegmentDescriptor, Subdivision, ValidationError};
pub use error::{ExportError, ImportError, ImportReport, SkippedSegment, TimelineError};
pub use item::TimelineItem;
pub use scheduler::{SchedulerOptions, TimelineScheduler};
