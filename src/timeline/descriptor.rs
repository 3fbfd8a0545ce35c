use crate::loops::PatternKind;
use crate::time::{self, Time};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the parameter {field} `{value}` is not valid: expected a single digit from 1 to 9")]
    NotADigit { field: &'static str, value: String },
}

fn parse_digit(field: &'static str, text: &str) -> Result<u8, ValidationError> {
    match text.as_bytes() {
        [digit @ b'1'..=b'9'] => Ok(digit - b'0'),
        _ => Err(ValidationError::NotADigit {
            field,
            value: text.to_string(),
        }),
    }
}

/// Note-value denominator of a segment's loop unit: 4 is a quarter note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subdivision(u8);

impl Subdivision {
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        parse_digit("single", text).map(Subdivision)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Length of one loop unit in beats.
    pub fn unit(self) -> Time {
        time::note_value(self.0)
    }
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many subdivision units a segment spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepeatCount(u8);

impl RepeatCount {
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        parse_digit("amount", text).map(RepeatCount)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RepeatCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The serialized form of one segment, as read by import and written by export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    #[serde(rename = "amount")]
    pub repeat_count: String,
    #[serde(rename = "single")]
    pub subdivision: String,
    pub chord: String,
    #[serde(rename = "type")]
    pub pattern: PatternKind,
}

impl SegmentDescriptor {
    pub fn new(
        repeat_count: impl Into<String>,
        subdivision: impl Into<String>,
        chord: impl Into<String>,
        pattern: PatternKind,
    ) -> Self {
        Self {
            repeat_count: repeat_count.into(),
            subdivision: subdivision.into(),
            chord: chord.into(),
            pattern,
        }
    }

    pub fn validate(&self) -> Result<(RepeatCount, Subdivision), ValidationError> {
        Ok((
            RepeatCount::parse(&self.repeat_count)?,
            Subdivision::parse(&self.subdivision)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::beats;
    use num_rational::Ratio;

    #[test]
    fn test_single_digits_only() {
        assert_eq!(Subdivision::parse("8").unwrap().value(), 8);
        assert_eq!(RepeatCount::parse("1").unwrap().value(), 1);
        for bad in ["0", "10", "", " 4", "x", "-1", "٣"] {
            assert!(Subdivision::parse(bad).is_err(), "{:?} accepted", bad);
            assert!(RepeatCount::parse(bad).is_err(), "{:?} accepted", bad);
        }
    }

    #[test]
    fn test_subdivision_units() {
        assert_eq!(Subdivision::parse("4").unwrap().unit(), beats(1));
        assert_eq!(Subdivision::parse("2").unwrap().unit(), beats(2));
        assert_eq!(Subdivision::parse("6").unwrap().unit(), Ratio::new(2, 3));
    }

    #[test]
    fn test_validation_names_the_field() {
        let descriptor = SegmentDescriptor::new("4", "x", "CM7", PatternKind::Scale);
        assert_eq!(
            descriptor.validate().unwrap_err(),
            ValidationError::NotADigit {
                field: "single",
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn test_wire_field_names() {
        let descriptor = SegmentDescriptor::new("4", "8", "Em7", PatternKind::Quick);
        let json = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(
            json,
            r#"{"amount":"4","single":"8","chord":"Em7","type":"quick"}"#
        );
    }
}
