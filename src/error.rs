//! Error taxonomy
//!
//! Data and configuration errors are fatal and surface before the first
//! tick. The engine itself has no error path.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::output::{SECTION_END_MARKER, SECTION_START_MARKER};

/// Contribution data failed schema validation
#[derive(Debug, Error)]
pub enum MalformedDataError {
    #[error("failed to read contribution data from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid contribution JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("contribution data has no `weeks` array")]
    MissingWeeks,
    #[error("week {week} has no `days` array")]
    MissingDays { week: usize },
    #[error("week {week} has {len} days (at most 7 allowed)")]
    TooManyDays { week: usize, len: usize },
    #[error("week {week}, day {day}: missing required field `{field}`")]
    MissingField {
        week: usize,
        day: usize,
        field: &'static str,
    },
    #[error("week {week}, day {day}: invalid date `{value}` (expected YYYY-MM-DD)")]
    InvalidDate {
        week: usize,
        day: usize,
        value: String,
    },
    #[error("week {week}, day {day}: negative contribution count {count}")]
    NegativeCount { week: usize, day: usize, count: i64 },
    #[error("week {week}, day {day}: contribution count `{value}` is not a whole number")]
    InvalidCount {
        week: usize,
        day: usize,
        value: String,
    },
    #[error("week {week}, day {day}: level {level} outside 0..=4")]
    InvalidLevel { week: usize, day: usize, level: i64 },
    #[error("week {week}: two days share weekday {weekday}")]
    DuplicateWeekday { week: usize, weekday: usize },
    #[error("negative total_contributions {total}")]
    NegativeTotal { total: i64 },
    #[error("total_contributions `{value}` is not a whole number")]
    InvalidTotal { value: String },
}

/// Invalid pipeline configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown strategy '{0}'. Available: column, row, random")]
    UnknownStrategy(String),
    #[error("unsupported output format '{0}'. Supported: gif, webp")]
    UnknownFormat(String),
    #[error("fps must be a positive integer")]
    NonPositiveFps,
    #[error("max_frame must be a positive integer")]
    NonPositiveMaxFrame,
}

/// Encoding or writing the animation failed
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("GIF encoding failed: {0}")]
    Gif(#[from] image::ImageError),
    #[error("WebP encoding failed: {0}")]
    Webp(String),
    #[error("frame {index} has size {actual:?}, expected {expected:?}")]
    FrameSize {
        index: u64,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Start marker '{}' not found", SECTION_START_MARKER)]
    StartMarkerMissing,
    #[error("End marker '{}' not found", SECTION_END_MARKER)]
    EndMarkerMissing,
    #[error("Start marker '{}' must appear before end marker '{}'", SECTION_START_MARKER, SECTION_END_MARKER)]
    MarkersOutOfOrder,
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Malformed(#[from] MalformedDataError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
