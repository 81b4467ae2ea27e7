//! Narration strategies: how a chunk gets spoken and how its words are timed.
//!
//! This module provides:
//! * [`TimingStrategy`] — async trait implemented by every narration variant.
//! * [`EstimatedStrategy`] — local, no network; words-per-minute pacing,
//!   optionally driven by a [`LocalSpeech`] engine's boundary events.
//! * [`AlignedStrategy`] — remote synthesis returning a character alignment
//!   table ([`AlignedSpeechBackend`]).
//! * [`DurationStrategy`] — remote synthesis returning audio whose duration
//!   becomes known later ([`SpeechBackend`]).
//! * [`AudioPlayer`] / [`ClockPlayer`] — the audio handle of a prepared
//!   narration.
//! * [`build_strategy`] — picks the variant named in [`NarrationConfig`].
//!
//! # Architecture
//!
//! ```text
//!                    TimingStrategy::prepare(text, words, voice)
//!                                   │
//!        ┌──────────────────────────┼───────────────────────────┐
//!        ▼                          ▼                           ▼
//!  EstimatedStrategy          AlignedStrategy             DurationStrategy
//!  ClockPlayer or             backend.synthesize()        backend.synthesize()
//!  LocalSpeech::speak()       → player + AlignmentTable   → player
//!        │                          │                           │
//!        ▼                          ▼                           ▼
//!  Heuristic / Boundary        Aligned resolver           Duration resolver
//!        └──────────────► PreparedNarration ◄───────────────────┘
//!                         { player, resolver }
//! ```
//!
//! Remote transport (HTTP, retries, timeouts) belongs to the backend
//! implementations, not to this crate.

pub mod aligned;
pub mod estimated;
pub mod player;
pub mod timed;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::{NarrationConfig, StrategyKind, VoiceParams};
use crate::playback::{AlignmentError, AlignmentTable, BoundaryEvent, WordIndexResolver};

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use aligned::AlignedStrategy;
pub use estimated::EstimatedStrategy;
pub use player::{AudioPlayer, ClockPlayer, PlayerStatus};
pub use timed::DurationStrategy;

#[cfg(test)]
pub use player::MockPlayer;

// ---------------------------------------------------------------------------
// NarrationError
// ---------------------------------------------------------------------------

/// Failures reported by narration collaborators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NarrationError {
    /// The collaborator failed before playback could start.
    #[error("narration could not be prepared: {0}")]
    Preparation(String),

    /// Output failed after playback started.
    #[error("narration failed during playback: {0}")]
    Playback(String),

    /// The provider's alignment table was unusable.
    #[error("narration alignment is invalid: {0}")]
    Alignment(#[from] AlignmentError),
}

// ---------------------------------------------------------------------------
// PreparedNarration
// ---------------------------------------------------------------------------

/// A narration ready to play: its audio handle and its word resolver.
pub struct PreparedNarration {
    pub player: Box<dyn AudioPlayer>,
    pub resolver: WordIndexResolver,
}

impl std::fmt::Debug for PreparedNarration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedNarration")
            .field("resolver", &self.resolver.label())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// TimingStrategy trait
// ---------------------------------------------------------------------------

/// One narration back-end, selected by configuration.
///
/// Implementors must be `Send + Sync` so they can be shared behind an
/// `Arc<dyn TimingStrategy>`.
///
/// # Arguments to `prepare`
/// * `text`  – the chunk text to speak.
/// * `words` – its tokens; resolved indices refer to this list.
/// * `voice` – voice selection from config.
#[async_trait]
pub trait TimingStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether `prepare` awaits remote work (the session shows Loading).
    fn needs_preparation(&self) -> bool {
        self.kind().needs_preparation()
    }

    async fn prepare(
        &self,
        text: &str,
        words: &[String],
        voice: &VoiceParams,
    ) -> Result<PreparedNarration, NarrationError>;
}

// Compile-time assertion: Box<dyn TimingStrategy> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TimingStrategy>) {}
};

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// An utterance started by a [`LocalSpeech`] engine.
pub struct LocalUtterance {
    pub player: Box<dyn AudioPlayer>,
    /// Character-offset progress, when the engine reports it.
    pub boundaries: Option<mpsc::UnboundedReceiver<BoundaryEvent>>,
}

/// On-device speech engine (no network).
pub trait LocalSpeech: Send + Sync {
    fn speak(&self, text: &str, voice: &VoiceParams) -> Result<LocalUtterance, NarrationError>;
}

/// Synthesised audio plus its character alignment.
pub struct AlignedAudio {
    pub player: Box<dyn AudioPlayer>,
    pub alignment: AlignmentTable,
}

/// Remote synthesis that returns a character alignment table.
#[async_trait]
pub trait AlignedSpeechBackend: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &VoiceParams)
        -> Result<AlignedAudio, NarrationError>;
}

/// Remote synthesis that returns audio only.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
    ) -> Result<Box<dyn AudioPlayer>, NarrationError>;
}

// ---------------------------------------------------------------------------
// build_strategy
// ---------------------------------------------------------------------------

/// Narration collaborators available to [`build_strategy`].
#[derive(Clone, Default)]
pub struct Backends {
    pub local: Option<Arc<dyn LocalSpeech>>,
    pub aligned: Option<Arc<dyn AlignedSpeechBackend>>,
    pub timed: Option<Arc<dyn SpeechBackend>>,
}

/// Build the strategy named by `config.strategy`.
///
/// A remote strategy whose backend is missing degrades to
/// [`EstimatedStrategy`] with a warning, so narration still works offline.
pub fn build_strategy(config: &NarrationConfig, backends: Backends) -> Arc<dyn TimingStrategy> {
    let estimated = || {
        let strategy = EstimatedStrategy::from_config(config);
        match backends.local.clone() {
            Some(speech) => Arc::new(strategy.with_speech(speech)) as Arc<dyn TimingStrategy>,
            None => Arc::new(strategy) as Arc<dyn TimingStrategy>,
        }
    };

    match config.strategy {
        StrategyKind::Estimated => estimated(),
        StrategyKind::Aligned => match backends.aligned.clone() {
            Some(backend) => Arc::new(AlignedStrategy::new(backend)),
            None => {
                log::warn!("narration: no alignment backend configured, using estimation");
                estimated()
            }
        },
        StrategyKind::Duration => match backends.timed.clone() {
            Some(backend) => Arc::new(DurationStrategy::from_config(backend, config)),
            None => {
                log::warn!("narration: no speech backend configured, using estimation");
                estimated()
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct NoAudio;

    #[async_trait]
    impl SpeechBackend for NoAudio {
        async fn synthesize(
            &self,
            _text: &str,
            _voice: &VoiceParams,
        ) -> Result<Box<dyn AudioPlayer>, NarrationError> {
            Ok(Box::new(MockPlayer::new()))
        }
    }

    fn config(kind: StrategyKind) -> NarrationConfig {
        NarrationConfig {
            strategy: kind,
            ..NarrationConfig::default()
        }
    }

    #[test]
    fn builds_estimated_by_default() {
        let s = build_strategy(&NarrationConfig::default(), Backends::default());
        assert_eq!(s.kind(), StrategyKind::Estimated);
        assert!(!s.needs_preparation());
    }

    #[test]
    fn missing_backend_degrades_to_estimated() {
        let s = build_strategy(&config(StrategyKind::Aligned), Backends::default());
        assert_eq!(s.kind(), StrategyKind::Estimated);
        let s = build_strategy(&config(StrategyKind::Duration), Backends::default());
        assert_eq!(s.kind(), StrategyKind::Estimated);
    }

    #[test]
    fn builds_duration_with_backend() {
        let backends = Backends {
            timed: Some(Arc::new(NoAudio)),
            ..Backends::default()
        };
        let s = build_strategy(&config(StrategyKind::Duration), backends);
        assert_eq!(s.kind(), StrategyKind::Duration);
        assert!(s.needs_preparation());
    }

    #[test]
    fn errors_are_human_readable() {
        let err = NarrationError::Preparation("voice unavailable".into());
        assert_eq!(err.to_string(), "narration could not be prepared: voice unavailable");

        let err: NarrationError = AlignmentError::LengthMismatch {
            characters: 1,
            starts: 2,
            ends: 2,
        }
        .into();
        assert!(err.to_string().starts_with("narration alignment is invalid"));
    }
}
