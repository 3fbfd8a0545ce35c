//! Exact musical time.
//!
//! Timeline offsets are rationals measured in beats (quarter notes), so a
//! layout never drifts and never depends on the current tempo. Tempo only
//! enters when beats are mapped onto wall-clock seconds.

use crate::config::BEATS_PER_WHOLE;
use num_rational::Ratio;
use num_traits::{ToPrimitive, Zero};

/// A point or span on the timeline, in beats.
pub type Time = Ratio<i64>;

// Fine enough for every digit subdivision and for tick-sized steps.
const SECONDS_DENOMINATOR: i64 = 9600;

/// Whole beats as [`Time`].
#[inline]
pub fn beats(n: i64) -> Time {
    Ratio::from_integer(n)
}

/// The length of one `1/denominator` note, e.g. `4` is a quarter note (one beat).
#[inline]
pub fn note_value(denominator: u8) -> Time {
    Ratio::new(BEATS_PER_WHOLE, i64::from(denominator))
}

#[inline]
pub fn zero() -> Time {
    Time::zero()
}

pub fn to_f64(t: Time) -> f64 {
    t.to_f64().unwrap_or(0.0)
}

/// Wall-clock length of `t` at `bpm`.
pub fn to_seconds(t: Time, bpm: u32) -> f64 {
    if bpm == 0 {
        return 0.0;
    }
    to_f64(t) * 60.0 / f64::from(bpm)
}

/// Beats covered by `seconds` of wall-clock time at `bpm`, rounded to the
/// nearest 1/9600 beat.
pub fn from_seconds(seconds: f64, bpm: u32) -> Time {
    let beats = seconds * f64::from(bpm) / 60.0;
    let numer = (beats * SECONDS_DENOMINATOR as f64).round() as i64;
    Ratio::new(numer, SECONDS_DENOMINATOR)
}
