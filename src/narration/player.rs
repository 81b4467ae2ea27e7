//! Audio output handles.
//!
//! [`AudioPlayer`] is the narrow surface the sync controller needs from
//! whatever actually renders the narration: transport controls plus the
//! current position, total duration and status.  Synthesis and audio I/O stay
//! with the collaborator that implements it.
//!
//! [`ClockPlayer`] is the built-in silent implementation used by the
//! estimated strategy: a [`PlaybackClock`] that "finishes" once the estimated
//! narration length has elapsed.
//!
//! [`MockPlayer`] (available under `#[cfg(test)]`) is a scripted handle whose
//! position and status are set by the test.

use std::time::Duration;

use crate::playback::PlaybackClock;

// ---------------------------------------------------------------------------
// PlayerStatus
// ---------------------------------------------------------------------------

/// Lifecycle of one audio rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Prepared but [`AudioPlayer::play`] not called yet.
    Ready,
    Playing,
    Paused,
    /// Reached the end of the audio.
    Finished,
    /// Output failed mid-stream; carries a human-readable reason.
    Failed(String),
}

// ---------------------------------------------------------------------------
// AudioPlayer trait
// ---------------------------------------------------------------------------

/// Transport and progress of one narration's audio.
///
/// Implementations must be `Send` so a prepared narration can cross the
/// await point in `SyncController::start`.  `position` must freeze while
/// paused.
pub trait AudioPlayer: Send {
    /// Begin output.
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stop output for good.  Called on stop, supersession and stale results.
    fn cancel(&mut self);
    /// Current playback position.
    fn position(&self) -> Duration;
    /// Total length, once known (e.g. after metadata loads).
    fn duration(&self) -> Option<Duration>;
    fn status(&self) -> PlayerStatus;
}

// Compile-time assertion: Box<dyn AudioPlayer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioPlayer>) {}
};

// ---------------------------------------------------------------------------
// ClockPlayer
// ---------------------------------------------------------------------------

/// Silent narration of a fixed estimated length.
#[derive(Debug, Clone)]
pub struct ClockPlayer {
    clock: PlaybackClock,
    total: Duration,
    status: PlayerStatus,
}

impl ClockPlayer {
    pub fn new(total: Duration) -> Self {
        Self {
            clock: PlaybackClock::new(),
            total,
            status: PlayerStatus::Ready,
        }
    }
}

impl AudioPlayer for ClockPlayer {
    fn play(&mut self) {
        if self.status == PlayerStatus::Ready {
            self.clock.start();
            self.status = PlayerStatus::Playing;
        }
    }

    fn pause(&mut self) {
        if self.status == PlayerStatus::Playing {
            self.clock.pause();
            self.status = PlayerStatus::Paused;
        }
    }

    fn resume(&mut self) {
        if self.status == PlayerStatus::Paused {
            self.clock.resume();
            self.status = PlayerStatus::Playing;
        }
    }

    fn cancel(&mut self) {
        self.clock.pause();
        self.status = PlayerStatus::Finished;
    }

    fn position(&self) -> Duration {
        self.clock.elapsed().min(self.total)
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.total)
    }

    fn status(&self) -> PlayerStatus {
        match &self.status {
            PlayerStatus::Playing if self.clock.elapsed() >= self.total => PlayerStatus::Finished,
            other => other.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// MockPlayer (test only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::{MockPlayer, MockPlayerState};


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
