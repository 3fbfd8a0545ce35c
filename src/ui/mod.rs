//! User interface components
//!
//! Terminal-based state inspection for chordloops:
//! - Segment progress through the timeline
//! - Transport state, tempo and pulse display
//!
//! The UI is built using the indicatif library for progress bars and spinners.

mod inspector;
mod progress;

pub use inspector::{inspector_message, run_state_inspector};
pub use progress::{create_segment_progress, create_transport_spinner};
