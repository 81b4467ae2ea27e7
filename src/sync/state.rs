//! Session state machine and outbound events.
//!
//! [`SyncState`] is the lifecycle of the single narration session owned by
//! [`SyncController`](super::SyncController).  Observers learn about changes
//! through [`SyncEvent`]s on the controller's channel.

// ---------------------------------------------------------------------------
// SyncState
// ---------------------------------------------------------------------------

/// States of a narration session.
///
/// The state machine transitions are:
///
/// ```text
/// Idle ──start──▶ Loading ──prepared──▶ Playing   (remote strategies)
/// Idle ──start──────────────────────▶ Playing     (estimated)
/// Playing ──pause──▶ Paused ──resume──▶ Playing
/// Playing ──audio ends──▶ Completed
/// Loading / Playing ──collaborator failure──▶ Errored
/// any state ──stop──▶ Idle
/// Completed / Errored ──start──▶ Loading or Playing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No session.
    #[default]
    Idle,

    /// Awaiting remote preparation of the narration.
    Loading,

    /// Audio is playing and the word index is being polled.
    Playing,

    /// Audio and word index are frozen.
    Paused,

    /// The narration reached its end.
    Completed,

    /// A collaborator failed.  Nothing is retried automatically.
    Errored,
}

impl SyncState {
    /// Returns `true` while a session holds the narration output.
    ///
    /// ```
    /// use reel_reader::sync::SyncState;
    ///
    /// assert!(SyncState::Loading.is_active());
    /// assert!(SyncState::Playing.is_active());
    /// assert!(SyncState::Paused.is_active());
    /// assert!(!SyncState::Idle.is_active());
    /// assert!(!SyncState::Completed.is_active());
    /// assert!(!SyncState::Errored.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SyncState::Loading | SyncState::Playing | SyncState::Paused
        )
    }

    /// A short human-readable label suitable for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            SyncState::Idle => "Idle",
            SyncState::Loading => "Loading",
            SyncState::Playing => "Playing",
            SyncState::Paused => "Paused",
            SyncState::Completed => "Done",
            SyncState::Errored => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// SyncEvent
// ---------------------------------------------------------------------------

/// Notifications emitted by the controller, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A new word became active.  Indices strictly increase within a run.
    WordIndexChanged(usize),

    /// The session moved to a new state.
    StateChanged(SyncState),

    /// A collaborator failed; always followed by `StateChanged(Errored)`.
    Error(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
