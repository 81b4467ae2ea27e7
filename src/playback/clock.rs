//! Pausable wall clock.
//!
//! Uses `tokio::time::Instant` so tests can drive it with a paused runtime
//! clock (`#[tokio::test(start_paused = true)]`).

use std::time::Duration;

use tokio::time::Instant;

/// Elapsed playback time that freezes while paused.
///
/// ```
/// use reel_reader::playback::PlaybackClock;
///
/// let clock = PlaybackClock::new();
/// assert!(!clock.is_running());
/// assert_eq!(clock.elapsed(), std::time::Duration::ZERO);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    /// Set while running.
    running_since: Option<Instant>,
    /// Time accumulated by earlier running spans.
    banked: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to zero and start running.
    pub fn start(&mut self) {
        self.banked = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    /// Freeze the elapsed time.  No-op when already paused.
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += since.elapsed();
        }
    }

    /// Continue from the frozen elapsed time.  No-op when running.
    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Total running time since [`start`](Self::start).
    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.banked + since.elapsed(),
            None => self.banked,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
