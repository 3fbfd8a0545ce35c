//! Chord symbol resolution.
//!
//! Turns a symbol such as `FM7` or `C#m7b5` into the MIDI pitches of the chord,
//! voiced upwards from the root in the requested octave.

use thiserror::Error;

/// MIDI note number.
pub type Pitch = u8;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot resolve chord `{symbol}`: {reason}")]
pub struct ChordResolutionError {
    pub symbol: String,
    pub reason: String,
}

impl ChordResolutionError {
    fn new(symbol: &str, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

pub trait ChordResolver {
    fn resolve(&self, symbol: &str, octave: i8) -> Result<Vec<Pitch>, ChordResolutionError>;
}

/// Resolves root + quality symbols from a fixed quality table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolChordResolver;

impl SymbolChordResolver {
    pub fn new() -> Self {
        SymbolChordResolver
    }
}

impl ChordResolver for SymbolChordResolver {
    fn resolve(&self, symbol: &str, octave: i8) -> Result<Vec<Pitch>, ChordResolutionError> {
        let (root, quality) = split_root(symbol)?;
        let intervals = quality_intervals(quality).ok_or_else(|| {
            ChordResolutionError::new(symbol, format!("unknown quality `{}`", quality))
        })?;

        let base = (i16::from(octave) + 1) * 12 + i16::from(root);
        intervals
            .iter()
            .map(|&interval| {
                let pitch = base + i16::from(interval);
                Pitch::try_from(pitch)
                    .ok()
                    .filter(|p| *p <= 127)
                    .ok_or_else(|| {
                        ChordResolutionError::new(
                            symbol,
                            format!("octave {} is outside the MIDI range", octave),
                        )
                    })
            })
            .collect()
    }
}

/// Splits a symbol into its root pitch class (0 = C) and the quality suffix.
fn split_root(symbol: &str) -> Result<(u8, &str), ChordResolutionError> {
    let mut chars = symbol.chars();
    let natural = match chars.next() {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        Some(other) => {
            return Err(ChordResolutionError::new(
                symbol,
                format!("`{}` is not a note name", other),
            ))
        }
        None => return Err(ChordResolutionError::new(symbol, "empty symbol")),
    };

    let rest = &symbol[1..];
    let (root, quality) = match rest.as_bytes().first() {
        Some(b'#') => ((natural + 1) % 12, &rest[1..]),
        // `b` directly after the root is a flat, never a quality
        Some(b'b') => ((natural + 11) % 12, &rest[1..]),
        _ => (natural, rest),
    };
    Ok((root, quality))
}

fn quality_intervals(quality: &str) -> Option<&'static [u8]> {
    let intervals: &'static [u8] = match quality {
        "" | "M" | "maj" => &[0, 4, 7],
        "m" | "min" => &[0, 3, 7],
        "7" => &[0, 4, 7, 10],
        "M7" | "maj7" => &[0, 4, 7, 11],
        "m7" | "min7" => &[0, 3, 7, 10],
        "mM7" => &[0, 3, 7, 11],
        "dim" => &[0, 3, 6],
        "dim7" => &[0, 3, 6, 9],
        "m7b5" => &[0, 3, 6, 10],
        "aug" | "+" => &[0, 4, 8],
        "sus2" => &[0, 2, 7],
        "sus4" | "sus" => &[0, 5, 7],
        "6" => &[0, 4, 7, 9],
        "m6" => &[0, 3, 7, 9],
        "9" => &[0, 4, 7, 10, 14],
        "M9" | "maj9" => &[0, 4, 7, 11, 14],
        "m9" => &[0, 3, 7, 10, 14],
        "add9" => &[0, 4, 7, 14],
        _ => return None,
    };
    Some(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(symbol: &str) -> Result<Vec<Pitch>, ChordResolutionError> {
        SymbolChordResolver::new().resolve(symbol, 4)
    }

    #[test]
    fn test_sevenths() {
        assert_eq!(resolve("CM7").unwrap(), vec![60, 64, 67, 71]);
        assert_eq!(resolve("FM7").unwrap(), vec![65, 69, 72, 76]);
        assert_eq!(resolve("Em7").unwrap(), vec![64, 67, 71, 74]);
        assert_eq!(resolve("Dm7").unwrap(), vec![62, 65, 69, 72]);
        assert_eq!(resolve("G7").unwrap(), vec![67, 71, 74, 77]);
    }

    #[test]
    fn test_accidentals() {
        assert_eq!(resolve("C#m").unwrap(), vec![61, 64, 68]);
        assert_eq!(resolve("Bb").unwrap(), vec![70, 74, 77]);
        assert_eq!(resolve("Cb").unwrap(), vec![71, 75, 78]);
        assert_eq!(resolve("Bbm7b5").unwrap(), vec![70, 73, 76, 80]);
    }

    #[test]
    fn test_octave_shift() {
        let resolver = SymbolChordResolver::new();
        assert_eq!(resolver.resolve("C", 3).unwrap(), vec![48, 52, 55]);
        assert_eq!(resolver.resolve("C", -1).unwrap(), vec![0, 4, 7]);
    }

    #[test]
    fn test_malformed_symbols() {
        assert!(resolve("").is_err());
        assert!(resolve("H7").is_err());
        assert!(resolve("Cxyz").is_err());
        assert!(resolve("cm7").is_err());

        let err = resolve("Qm").unwrap_err();
        assert_eq!(err.symbol, "Qm");
    }

    #[test]
    fn test_out_of_midi_range() {
        let resolver = SymbolChordResolver::new();
        assert!(resolver.resolve("B9", 9).is_err());
    }
}
