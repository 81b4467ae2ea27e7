//! Word-index resolution over the three timing sources.
//!
//! [`WordIndexResolver`] turns "where is playback now" into "which word is
//! active" for one narration.  The variants share one contract:
//!
//! * results are bounded to `0..word_count` (`None` only without words, or
//!   before a boundary-driven narration reports anything);
//! * pausing freezes the origin and resuming continues from the frozen word.
//!
//! Monotonicity across a whole run is enforced separately by
//! [`MonotonicIndex`], which the sync controller applies to every resolved
//! value before emitting it.
//!
//! ```text
//!             position (+ duration)
//!                    │
//!   ┌────────────────┼─────────────────┬──────────────────┐
//!   ▼                ▼                 ▼                  ▼
//! Heuristic      Boundary           Aligned            Duration
//! WordPacer   events → offset    WordTiming[] →     duration / words,
//!             → word, stall →    [start,end) or     re-derived on resume
//!             heuristic pacing   next word in gap
//! ```

use std::time::Duration;

use tokio::sync::mpsc;

use crate::playback::alignment::{timing_index_at, WordTiming};
use crate::playback::boundary::{word_index_at_offset, BoundaryEvent};
use crate::playback::pacer::WordPacer;

// ---------------------------------------------------------------------------
// WordIndexResolver
// ---------------------------------------------------------------------------

/// Resolves the active word for one narration.
#[derive(Debug)]
pub enum WordIndexResolver {
    /// Fixed pacing from a words-per-minute baseline.
    Heuristic(WordPacer),
    /// Character-offset events from a speech engine, heuristic on stall.
    Boundary(BoundaryTracker),
    /// Precomputed per-word timings.
    Aligned(AlignedTimings),
    /// Even pacing over the audio duration once it is known.
    Duration(DurationPacing),
}

impl WordIndexResolver {
    /// Word index at playback `position`.  `duration` is the total audio
    /// length when the player knows it.
    pub fn resolve(&mut self, position: Duration, duration: Option<Duration>) -> Option<usize> {
        match self {
            Self::Heuristic(pacer) => pacer.resolve(position),
            Self::Boundary(tracker) => tracker.resolve(position),
            Self::Aligned(aligned) => aligned.resolve(position),
            Self::Duration(pacing) => pacing.resolve(position, duration),
        }
    }

    /// Continue after a pause at `position`, with `current` the last index
    /// emitted before pausing.
    pub fn resume(&mut self, position: Duration, current: Option<usize>, duration: Option<Duration>) {
        match self {
            Self::Duration(pacing) => pacing.resume(position, current, duration),
            // Player position is frozen while paused, so these continue as-is.
            Self::Heuristic(_) | Self::Boundary(_) | Self::Aligned(_) => {}
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Heuristic(_) => "heuristic",
            Self::Boundary(_) => "boundary",
            Self::Aligned(_) => "aligned",
            Self::Duration(_) => "duration",
        }
    }
}

// ---------------------------------------------------------------------------
// BoundaryTracker
// ---------------------------------------------------------------------------

/// Follows boundary events; falls back to heuristic pacing when they stop.
///
/// Events are drained from the channel each time the index is resolved.
/// If no event has arrived for `stall_after` of playback time, pacing
/// continues from the last reported word at the heuristic interval.  A later
/// event takes control back.
#[derive(Debug)]
pub struct BoundaryTracker {
    words: Vec<String>,
    events: mpsc::UnboundedReceiver<BoundaryEvent>,
    last_index: Option<usize>,
    last_event_at: Duration,
    stall_after: Duration,
    interval: Duration,
    fallback: Option<WordPacer>,
}

impl BoundaryTracker {
    pub fn new(
        words: Vec<String>,
        events: mpsc::UnboundedReceiver<BoundaryEvent>,
        interval: Duration,
        stall_after: Duration,
    ) -> Self {
        Self {
            words,
            events,
            last_index: None,
            last_event_at: Duration::ZERO,
            stall_after,
            interval,
            fallback: None,
        }
    }

    /// Whether pacing is currently heuristic.
    pub fn is_stalled(&self) -> bool {
        self.fallback.is_some()
    }

    fn resolve(&mut self, position: Duration) -> Option<usize> {
        while let Ok(event) = self.events.try_recv() {
            if let Some(index) = word_index_at_offset(&self.words, event.char_index) {
                self.last_index = Some(self.last_index.map_or(index, |last| last.max(index)));
            }
            self.last_event_at = position;
            if self.fallback.take().is_some() {
                log::debug!("boundary: events resumed at {position:?}");
            }
        }

        if self.fallback.is_none() && position.saturating_sub(self.last_event_at) >= self.stall_after {
            log::warn!(
                "boundary: no event for {:?}, pacing heuristically from word {:?}",
                self.stall_after,
                self.last_index
            );
            let mut pacer = WordPacer::new(self.words.len(), self.interval);
            pacer.reanchor(self.last_index.unwrap_or(0), self.last_event_at, self.interval);
            self.fallback = Some(pacer);
        }

        match &self.fallback {
            Some(pacer) => {
                let paced = pacer.resolve(position);
                match (paced, self.last_index) {
                    (Some(p), Some(last)) => Some(p.max(last)),
                    (p, last) => p.or(last),
                }
            }
            None => self.last_index,
        }
    }
}

// ---------------------------------------------------------------------------
// AlignedTimings
// ---------------------------------------------------------------------------

/// Lookup into precomputed [`WordTiming`]s.
#[derive(Debug, Clone)]
pub struct AlignedTimings {
    timings: Vec<WordTiming>,
    word_count: usize,
}

impl AlignedTimings {
    /// `word_count` is the number of words being highlighted; provider words
    /// beyond it clamp to the last word.
    pub fn new(timings: Vec<WordTiming>, word_count: usize) -> Self {
        Self {
            timings,
            word_count,
        }
    }

    pub fn timings(&self) -> &[WordTiming] {
        &self.timings
    }

    fn resolve(&self, position: Duration) -> Option<usize> {
        let last = self.word_count.checked_sub(1)?;
        let ms = u64::try_from(position.as_millis()).unwrap_or(u64::MAX);
        timing_index_at(&self.timings, ms).map(|i| i.min(last))
    }
}

// ---------------------------------------------------------------------------
// DurationPacing
// ---------------------------------------------------------------------------

/// Even pacing across the audio duration.
///
/// Until the player reports a duration the heuristic interval is used.  When
/// the duration becomes known, and again on every resume, the interval is
/// re-derived as remaining time / remaining words from the current word.
#[derive(Debug, Clone)]
pub struct DurationPacing {
    pacer: WordPacer,
    duration: Option<Duration>,
}

impl DurationPacing {
    pub fn new(word_count: usize, fallback_interval: Duration) -> Self {
        Self {
            pacer: WordPacer::new(word_count, fallback_interval),
            duration: None,
        }
    }

    /// Interval currently in use.
    pub fn interval(&self) -> Duration {
        self.pacer.interval()
    }

    fn resolve(&mut self, position: Duration, duration: Option<Duration>) -> Option<usize> {
        if self.duration.is_none() {
            if let Some(total) = duration {
                let current = self.pacer.resolve(position);
                self.duration = Some(total);
                self.reanchor(position, current, total);
            }
        }
        self.pacer.resolve(position)
    }

    fn resume(&mut self, position: Duration, current: Option<usize>, duration: Option<Duration>) {
        if let Some(total) = self.duration.or(duration) {
            self.duration = Some(total);
            self.reanchor(position, current, total);
        }
    }

    fn reanchor(&mut self, position: Duration, current: Option<usize>, total: Duration) {
        let index = current.unwrap_or(0);
        let remaining_words = self.pacer.word_count().saturating_sub(index).max(1);
        let remaining_time = total.saturating_sub(position);
        let interval = remaining_time / u32::try_from(remaining_words).unwrap_or(u32::MAX);
        log::debug!(
            "duration: {remaining_words} word(s) over {remaining_time:?}, {interval:?} each"
        );
        self.pacer.reanchor(index, position, interval);
    }
}

// ---------------------------------------------------------------------------
// MonotonicIndex
// ---------------------------------------------------------------------------

/// Guard that only lets strictly increasing indices through.
///
/// Each value is therefore emitted at most once per run and the highlighted
/// word never moves backwards.
///
/// ```
/// use reel_reader::playback::MonotonicIndex;
///
/// let mut guard = MonotonicIndex::new();
/// assert_eq!(guard.advance(Some(0)), Some(0));
/// assert_eq!(guard.advance(Some(0)), None);
/// assert_eq!(guard.advance(Some(2)), Some(2));
/// assert_eq!(guard.advance(Some(1)), None);
/// assert_eq!(guard.current(), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonotonicIndex {
    last: Option<usize>,
}

impl MonotonicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `candidate` if it moves forward; returns the accepted value.
    pub fn advance(&mut self, candidate: Option<usize>) -> Option<usize> {
        let candidate = candidate?;
        match self.last {
            Some(last) if candidate <= last => None,
            _ => {
                self.last = Some(candidate);
                Some(candidate)
            }
        }
    }

    /// Last accepted index; `None` when nothing is active.
    pub fn current(&self) -> Option<usize> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn timing(start: u64, end: u64) -> WordTiming {
        WordTiming {
            word: "w".into(),
            start,
            end,
        }
    }

    // ---- Heuristic ---

    #[test]
    fn heuristic_resolves_from_pacer() {
        let mut r = WordIndexResolver::Heuristic(WordPacer::new(3, ms(100)));
        assert_eq!(r.resolve(ms(0), None), Some(0));
        assert_eq!(r.resolve(ms(150), None), Some(1));
        assert_eq!(r.resolve(ms(9_999), None), Some(2));
        assert_eq!(r.label(), "heuristic");
    }

    // ---- Boundary ---

    fn boundary(
        text: &str,
        stall_ms: u64,
    ) -> (WordIndexResolver, mpsc::UnboundedSender<BoundaryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = BoundaryTracker::new(tokenize(text), rx, ms(100), ms(stall_ms));
        (WordIndexResolver::Boundary(tracker), tx)
    }

    #[test]
    fn boundary_maps_offsets_to_words() {
        let (mut r, tx) = boundary("The cat sat on it.", 1_000);
        assert_eq!(r.resolve(ms(0), None), None);

        tx.send(BoundaryEvent::at(4)).unwrap();
        assert_eq!(r.resolve(ms(50), None), Some(1));

        tx.send(BoundaryEvent::at(12)).unwrap();
        assert_eq!(r.resolve(ms(100), None), Some(3));
    }

    #[test]
    fn boundary_never_regresses_on_out_of_order_events() {
        let (mut r, tx) = boundary("a b c d", 1_000);
        tx.send(BoundaryEvent::at(6)).unwrap();
        tx.send(BoundaryEvent::at(0)).unwrap();
        assert_eq!(r.resolve(ms(10), None), Some(3));
    }

    #[test]
    fn boundary_stall_falls_back_to_heuristic_from_last_word() {
        let (mut r, tx) = boundary("w0 w1 w2 w3 w4 w5 w6 w7", 500);
        tx.send(BoundaryEvent::at(3)).unwrap();
        assert_eq!(r.resolve(ms(200), None), Some(1));

        // Still inside the stall window: held at the last reported word.
        assert_eq!(r.resolve(ms(600), None), Some(1));

        // 500 ms after the last event pacing takes over, anchored at word 1
        // from the time of that event: 1 + (700 - 200) / 100 = 6.
        assert_eq!(r.resolve(ms(700), None), Some(6));
        if let WordIndexResolver::Boundary(t) = &r {
            assert!(t.is_stalled());
        }

        // A fresh event takes control back.
        tx.send(BoundaryEvent::at(21)).unwrap();
        assert_eq!(r.resolve(ms(720), None), Some(7));
        if let WordIndexResolver::Boundary(t) = &r {
            assert!(!t.is_stalled());
        }
    }

    #[test]
    fn boundary_without_any_event_paces_from_start_after_stall() {
        let (mut r, _tx) = boundary("a b c d e", 300);
        assert_eq!(r.resolve(ms(100), None), None);
        assert_eq!(r.resolve(ms(300), None), Some(3));
    }

    // ---- Aligned ---

    #[test]
    fn aligned_prefers_next_word_in_gap() {
        let timings = vec![timing(0, 100), timing(100, 200), timing(200, 300), timing(600, 700)];
        let mut r = WordIndexResolver::Aligned(AlignedTimings::new(timings, 4));
        assert_eq!(r.resolve(ms(250), None), Some(2));
        assert_eq!(r.resolve(ms(450), None), Some(3));
    }

    #[test]
    fn aligned_clamps_to_highlighted_word_count() {
        let timings = vec![timing(0, 100), timing(100, 200), timing(200, 300)];
        let mut r = WordIndexResolver::Aligned(AlignedTimings::new(timings, 2));
        assert_eq!(r.resolve(ms(250), None), Some(1));
    }

    #[test]
    fn aligned_without_words_is_none() {
        let mut r = WordIndexResolver::Aligned(AlignedTimings::new(vec![timing(0, 10)], 0));
        assert_eq!(r.resolve(ms(5), None), None);
    }

    // ---- Duration ---

    #[test]
    fn duration_uses_fallback_until_known() {
        let mut r = WordIndexResolver::Duration(DurationPacing::new(4, ms(100)));
        assert_eq!(r.resolve(ms(150), None), Some(1));
    }

    #[test]
    fn duration_spreads_words_over_audio_length() {
        let mut r = WordIndexResolver::Duration(DurationPacing::new(4, ms(100)));
        assert_eq!(r.resolve(ms(0), Some(ms(2_000))), Some(0));
        assert_eq!(r.resolve(ms(499), Some(ms(2_000))), Some(0));
        assert_eq!(r.resolve(ms(500), Some(ms(2_000))), Some(1));
        assert_eq!(r.resolve(ms(1_999), Some(ms(2_000))), Some(3));
    }

    #[test]
    fn duration_resume_recomputes_remaining_interval() {
        let mut r = WordIndexResolver::Duration(DurationPacing::new(5, ms(100)));
        assert_eq!(r.resolve(ms(0), Some(ms(1_000))), Some(0));
        assert_eq!(r.resolve(ms(450), Some(ms(1_000))), Some(2));

        // Paused at word 2 with 550 ms of audio left for 3 words.
        r.resume(ms(450), Some(2), Some(ms(1_000)));
        let interval = match &r {
            WordIndexResolver::Duration(p) => p.interval(),
            other => panic!("unexpected resolver {}", other.label()),
        };
        assert_eq!(interval, Duration::from_nanos(550_000_000 / 3));
        assert_eq!(r.resolve(ms(450), Some(ms(1_000))), Some(2));
        assert_eq!(r.resolve(ms(999), Some(ms(1_000))), Some(4));
    }

    // ---- MonotonicIndex ---

    #[test]
    fn monotonic_ignores_none_and_regressions() {
        let mut guard = MonotonicIndex::new();
        assert_eq!(guard.advance(None), None);
        assert_eq!(guard.advance(Some(3)), Some(3));
        assert_eq!(guard.advance(None), None);
        assert_eq!(guard.advance(Some(2)), None);
        assert_eq!(guard.current(), Some(3));
        guard.reset();
        assert_eq!(guard.current(), None);
        assert_eq!(guard.advance(Some(0)), Some(0));
    }

    #[test]
    fn pause_resume_never_emits_below_frozen_index() {
        let mut r = WordIndexResolver::Duration(DurationPacing::new(10, ms(100)));
        let mut guard = MonotonicIndex::new();
        let mut emitted = Vec::new();

        for t in (0..=400).step_by(50) {
            emitted.extend(guard.advance(r.resolve(ms(t), Some(ms(2_000)))));
        }
        let frozen = guard.current().unwrap();

        r.resume(ms(400), Some(frozen), Some(ms(2_000)));
        for t in (400..=2_000).step_by(50) {
            emitted.extend(guard.advance(r.resolve(ms(t), Some(ms(2_000)))));
        }

        assert!(emitted.windows(2).all(|w| w[0] < w[1]), "{emitted:?}");
        assert_eq!(emitted.last(), Some(&9));
    }
}
