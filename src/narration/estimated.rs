//! Local estimated narration.
//!
//! Without a speech engine the narration is silent: a [`ClockPlayer`] runs for
//! `words × interval` and the highlighted word advances at the configured
//! words-per-minute.  With a [`LocalSpeech`] engine the engine's own audio
//! handle is used and, when it reports boundary events, those drive the
//! highlight (falling back to pacing if they stall).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{NarrationConfig, StrategyKind, VoiceParams};
use crate::narration::player::ClockPlayer;
use crate::narration::{LocalSpeech, NarrationError, PreparedNarration, TimingStrategy};
use crate::playback::{word_interval, BoundaryTracker, WordIndexResolver, WordPacer};

/// Words-per-minute narration; see the module docs.
pub struct EstimatedStrategy {
    words_per_minute: u32,
    speed: f32,
    boundary_stall: Duration,
    speech: Option<Arc<dyn LocalSpeech>>,
}

impl EstimatedStrategy {
    pub fn new(words_per_minute: u32, speed: f32, boundary_stall: Duration) -> Self {
        Self {
            words_per_minute,
            speed,
            boundary_stall,
            speech: None,
        }
    }

    pub fn from_config(config: &NarrationConfig) -> Self {
        Self::new(config.words_per_minute, config.speed, config.boundary_stall())
    }

    /// Speak through a local engine instead of a silent clock.
    pub fn with_speech(mut self, speech: Arc<dyn LocalSpeech>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Time allotted to each word.
    pub fn interval(&self) -> Duration {
        word_interval(self.words_per_minute, self.speed)
    }
}

#[async_trait]
impl TimingStrategy for EstimatedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Estimated
    }

    async fn prepare(
        &self,
        text: &str,
        words: &[String],
        voice: &VoiceParams,
    ) -> Result<PreparedNarration, NarrationError> {
        let interval = self.interval();
        let pacer = WordPacer::new(words.len(), interval);

        let Some(speech) = &self.speech else {
            log::debug!(
                "estimated: {} word(s) at {:?} each, silent",
                words.len(),
                interval
            );
            return Ok(PreparedNarration {
                player: Box::new(ClockPlayer::new(pacer.total())),
                resolver: WordIndexResolver::Heuristic(pacer),
            });
        };

        let utterance = speech.speak(text, voice)?;
        let resolver = match utterance.boundaries {
            Some(events) => WordIndexResolver::Boundary(BoundaryTracker::new(
                words.to_vec(),
                events,
                interval,
                self.boundary_stall,
            )),
            None => WordIndexResolver::Heuristic(pacer),
        };
        log::debug!("estimated: local speech with {} timing", resolver.label());

        Ok(PreparedNarration {
            player: utterance.player,
            resolver,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
