//! Precomputed character alignment and per-word timings.
//!
//! Remote narration providers return, alongside the audio, a table of
//! per-character start/end times in seconds.  [`AlignmentTable::word_timings`]
//! reduces that table to one [`WordTiming`] per whitespace-delimited word;
//! [`timing_index_at`] then answers "which word is being spoken at time t".

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// AlignmentError
// ---------------------------------------------------------------------------

/// A malformed alignment table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    /// The three parallel arrays disagree in length.
    #[error(
        "alignment arrays differ in length (characters={characters}, starts={starts}, ends={ends})"
    )]
    LengthMismatch {
        characters: usize,
        starts: usize,
        ends: usize,
    },
}

// ---------------------------------------------------------------------------
// WordTiming
// ---------------------------------------------------------------------------

/// Start and end of one spoken word, in milliseconds from audio start.
///
/// Invariant: `end >= start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: u64,
    pub end: u64,
}

// ---------------------------------------------------------------------------
// AlignmentTable
// ---------------------------------------------------------------------------

/// Character-level alignment as delivered by a narration provider.
///
/// Accepts both snake_case (`character_start_times_seconds`) and camelCase
/// (`startTimesSeconds`) field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentTable {
    pub characters: Vec<String>,
    #[serde(alias = "startTimesSeconds", alias = "characterStartTimesSeconds")]
    pub character_start_times_seconds: Vec<f64>,
    #[serde(alias = "endTimesSeconds", alias = "characterEndTimesSeconds")]
    pub character_end_times_seconds: Vec<f64>,
}

impl AlignmentTable {
    /// Parse a provider JSON payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Group consecutive non-whitespace characters into words.
    ///
    /// Space, tab and newline close the current group; a trailing group is
    /// closed at the end of the table.  Each word starts at its first
    /// character's start and ends at its last character's end, converted to
    /// milliseconds with rounding.
    ///
    /// ```
    /// use reel_reader::playback::AlignmentTable;
    ///
    /// let table = AlignmentTable {
    ///     characters: ["H", "i", " ", "y", "o"].iter().map(|s| s.to_string()).collect(),
    ///     character_start_times_seconds: vec![0.0, 0.1, 0.2, 0.3, 0.4],
    ///     character_end_times_seconds: vec![0.1, 0.2, 0.3, 0.4, 0.5],
    /// };
    /// let timings = table.word_timings().unwrap();
    /// assert_eq!(timings.len(), 2);
    /// assert_eq!((timings[1].start, timings[1].end), (300, 500));
    /// ```
    pub fn word_timings(&self) -> Result<Vec<WordTiming>, AlignmentError> {
        let characters = self.characters.len();
        let starts = self.character_start_times_seconds.len();
        let ends = self.character_end_times_seconds.len();
        if characters != starts || characters != ends {
            return Err(AlignmentError::LengthMismatch {
                characters,
                starts,
                ends,
            });
        }

        let mut timings = Vec::new();
        let mut current: Option<(String, f64, f64)> = None;

        for ((ch, &start), &end) in self
            .characters
            .iter()
            .zip(&self.character_start_times_seconds)
            .zip(&self.character_end_times_seconds)
        {
            if is_separator(ch) {
                if let Some(group) = current.take() {
                    timings.push(finish(group));
                }
                continue;
            }
            match current.as_mut() {
                Some((word, _, last_end)) => {
                    word.push_str(ch);
                    *last_end = end;
                }
                None => current = Some((ch.clone(), start, end)),
            }
        }

        if let Some(group) = current {
            timings.push(finish(group));
        }
        Ok(timings)
    }
}

fn is_separator(ch: &str) -> bool {
    matches!(ch, " " | "\n" | "\t" | "\r")
}

fn finish((word, start, end): (String, f64, f64)) -> WordTiming {
    let start = seconds_to_ms(start);
    let end = seconds_to_ms(end).max(start);
    WordTiming { word, start, end }
}

/// Seconds to whole milliseconds, rounded.  Negative input saturates to 0.
pub fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0).round() as u64
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Index of the word being spoken at `time_ms`.
///
/// The word whose `[start, end)` contains `time_ms` wins.  In a silent gap
/// between two words the *next* word is returned, before the first word the
/// first, after the last word the last.  `None` only for an empty table.
pub fn timing_index_at(timings: &[WordTiming], time_ms: u64) -> Option<usize> {
    let last = timings.len().checked_sub(1)?;
    let finished = timings.partition_point(|t| t.end <= time_ms);
    Some(finished.min(last))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
