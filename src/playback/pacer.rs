//! Fixed-interval word pacing.
//!
//! [`WordPacer`] is the arithmetic behind both the heuristic strategy
//! (interval derived from words-per-minute) and the duration-based strategy
//! (interval derived from audio length).  It advances one word per interval
//! from an *anchor* `(index, time)`, so pausing and resuming can re-anchor at
//! the frozen word instead of restarting from word 0.

use std::time::Duration;

/// Baseline reading pace used when none is configured.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 180;

/// Time allotted to one word at `words_per_minute` scaled by `speed`.
///
/// Non-positive or non-finite inputs are treated as 1 so the interval stays
/// finite.
///
/// ```
/// use std::time::Duration;
/// use reel_reader::playback::word_interval;
///
/// assert_eq!(word_interval(120, 1.0), Duration::from_millis(500));
/// assert_eq!(word_interval(120, 2.0), Duration::from_millis(250));
/// ```
pub fn word_interval(words_per_minute: u32, speed: f32) -> Duration {
    let speed = if speed.is_finite() && speed > 0.0 {
        f64::from(speed)
    } else {
        1.0
    };
    let per_minute = (f64::from(words_per_minute) * speed).max(1.0);
    Duration::from_secs_f64(60.0 / per_minute)
}

// ---------------------------------------------------------------------------
// WordPacer
// ---------------------------------------------------------------------------

/// Advances a word index one step per `interval` from an anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct WordPacer {
    word_count: usize,
    interval: Duration,
    anchor_index: usize,
    anchor_at: Duration,
}

impl WordPacer {
    /// Pacer anchored at word 0, time 0.
    pub fn new(word_count: usize, interval: Duration) -> Self {
        Self {
            word_count,
            interval,
            anchor_index: 0,
            anchor_at: Duration::ZERO,
        }
    }

    /// Pacer for `words_per_minute` × `speed`.
    pub fn from_rate(word_count: usize, words_per_minute: u32, speed: f32) -> Self {
        Self::new(word_count, word_interval(words_per_minute, speed))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Time needed to pace through every word from time 0.
    pub fn total(&self) -> Duration {
        self.interval
            .saturating_mul(u32::try_from(self.word_count).unwrap_or(u32::MAX))
    }

    /// Continue from `index` at playback time `at`, with a new interval.
    pub fn reanchor(&mut self, index: usize, at: Duration, interval: Duration) {
        self.anchor_index = index;
        self.anchor_at = at;
        self.interval = interval;
    }

    /// Word index at playback time `at`, clamped to the last word.
    ///
    /// `None` only when there are no words.  Times before the anchor resolve
    /// to the anchor index.
    pub fn resolve(&self, at: Duration) -> Option<usize> {
        let last = self.word_count.checked_sub(1)?;
        if self.interval.is_zero() {
            return Some(last);
        }
        let since = at.saturating_sub(self.anchor_at).as_nanos();
        let steps = since / self.interval.as_nanos();
        let steps = usize::try_from(steps).unwrap_or(usize::MAX);
        Some(self.anchor_index.saturating_add(steps).min(last))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
