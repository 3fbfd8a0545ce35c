pub mod chord;
pub mod cli;
pub mod clock;
pub mod config;
pub mod event_loop;
pub mod logging;
pub mod loops;
pub mod midi_output;
pub mod state;
pub mod tempo;
pub mod time;
pub mod timeline;
pub mod ui;

pub use chord::{ChordResolver, SymbolChordResolver};
pub use clock::{TransportClock, VirtualTransport};
pub use event_loop::{Command, Engine, EngineMessage, EventLoop};
pub use loops::{PatternKind, PatternLoopAdapter};
pub use state::SharedState;
pub use timeline::{SchedulerOptions, SegmentDescriptor, TimelineScheduler};

use crate::config::Config;

/// Progression loaded when nothing is imported at startup.
pub fn default_progression() -> Vec<SegmentDescriptor> {
    ["FM7", "Em7", "Dm7", "CM7"]
        .into_iter()
        .map(|chord| SegmentDescriptor::new("4", "4", chord, PatternKind::Scale))
        .collect()
}

/// Builds an engine with an empty timeline from the loaded configuration.
pub fn create_engine(config: &Config) -> Engine {
    TimelineScheduler::new(
        VirtualTransport::new(config.bpm),
        PatternLoopAdapter,
        SymbolChordResolver::new(),
        SchedulerOptions {
            octave: config.octave,
            debounce: config.debounce,
        },
    )
}
