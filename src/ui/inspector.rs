use super::progress::{create_segment_progress, create_transport_spinner};
use crate::state::{PlaybackState, SharedState};
use indicatif::{MultiProgress, ProgressDrawTarget};
use log::info;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const REFRESH: Duration = Duration::from_millis(100);

pub fn inspector_message(state: &PlaybackState) -> String {
    format!(
        "BPM: {}, Pulse: {}s, Loop: {:.2} beats, Transport: {:?}",
        state.tempo(),
        state.pulse_period_secs(),
        state.loop_end_beats(),
        state.transport_state()
    )
}

/// Redraws the inspector until every other owner of `state` has dropped it.
pub fn run_state_inspector(state: SharedState) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("State inspector started");
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());
        let segment_pb = multi_progress.add(create_segment_progress(0));
        let transport_pb = multi_progress.add(create_transport_spinner());

        while Arc::strong_count(&state) > 1 {
            thread::sleep(REFRESH);
            let Ok(state) = state.lock() else {
                break;
            };

            segment_pb.set_length(state.segment_count() as u64);
            segment_pb.set_position(state.active().map_or(0, |i| i as u64 + 1));
            segment_pb.set_message(state.active_label().unwrap_or("-").to_string());

            transport_pb.set_message(inspector_message(&state));
            transport_pb.tick();
        }

        segment_pb.finish_and_clear();
        transport_pb.finish_and_clear();
        info!("State inspector stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlaybackState;

    #[test]
    fn test_inspector_message() {
        let mut state = PlaybackState::new(120);
        state.set_layout(vec!["CM7".into()], 4.0);
        state.set_playing(true);
        assert_eq!(
            inspector_message(&state),
            "BPM: 120, Pulse: 3s, Loop: 4.00 beats, Transport: Playing"
        );
    }

    #[test]
    fn test_inspector_exits_with_last_owner() {
        let state = PlaybackState::new(120).into_shared();
        let handle = run_state_inspector(state.clone());
        drop(state);
        handle.join().unwrap();
    }
}
