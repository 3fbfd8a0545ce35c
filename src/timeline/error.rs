use super::ValidationError;
use crate::chord::ChordResolutionError;
use std::io;
use thiserror::Error;

/// Why a single segment could not be inserted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Chord(#[from] ChordResolutionError),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read progression: {0}")]
    Io(#[from] io::Error),
    #[error("malformed progression: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("segment {index}: {source}")]
    Validation {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write progression: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize progression: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A segment left out of an import because its chord did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSegment {
    pub index: usize,
    pub error: ChordResolutionError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedSegment>,
}
