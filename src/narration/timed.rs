//! Remote narration paced over the audio duration.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{NarrationConfig, StrategyKind, VoiceParams};
use crate::narration::{NarrationError, PreparedNarration, SpeechBackend, TimingStrategy};
use crate::playback::{word_interval, DurationPacing, WordIndexResolver};

/// Narration whose highlight spreads the words evenly over the audio.
///
/// The duration is usually only known once the audio metadata loads; until
/// then the words-per-minute interval stands in.
pub struct DurationStrategy {
    backend: Arc<dyn SpeechBackend>,
    fallback_interval: Duration,
}

impl DurationStrategy {
    pub fn new(backend: Arc<dyn SpeechBackend>, fallback_interval: Duration) -> Self {
        Self {
            backend,
            fallback_interval,
        }
    }

    pub fn from_config(backend: Arc<dyn SpeechBackend>, config: &NarrationConfig) -> Self {
        Self::new(backend, word_interval(config.words_per_minute, config.speed))
    }
}

#[async_trait]
impl TimingStrategy for DurationStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Duration
    }

    async fn prepare(
        &self,
        text: &str,
        words: &[String],
        voice: &VoiceParams,
    ) -> Result<PreparedNarration, NarrationError> {
        let player = self.backend.synthesize(text, voice).await?;
        log::debug!(
            "duration: audio ready (duration {:?}) for {} word(s)",
            player.duration(),
            words.len()
        );

        Ok(PreparedNarration {
            player,
            resolver: WordIndexResolver::Duration(DurationPacing::new(
                words.len(),
                self.fallback_interval,
            )),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::{AudioPlayer, MockPlayer};
    use crate::text::tokenize;

    struct Fixed(MockPlayer);

    #[async_trait]
    impl SpeechBackend for Fixed {
        async fn synthesize(
            &self,
            _text: &str,
            _voice: &VoiceParams,
        ) -> Result<Box<dyn AudioPlayer>, NarrationError> {
            Ok(Box::new(self.0.clone()))
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test]
    async fn paces_over_reported_duration() {
        let mock = MockPlayer::new();
        let strategy = DurationStrategy::new(Arc::new(Fixed(mock.clone())), ms(100));
        let words = tokenize("a b c d");
        let mut prepared = strategy
            .prepare("a b c d", &words, &VoiceParams::default())
            .await
            .unwrap();

        // Metadata not loaded yet: 100 ms per word.
        assert_eq!(prepared.resolver.resolve(ms(150), prepared.player.duration()), Some(1));

        // 4 s of audio for 4 words, known from 150 ms on: 3 words remain after
        // word 1, over 3850 ms.
        mock.set_duration(ms(4_000));
        assert_eq!(prepared.resolver.resolve(ms(150), prepared.player.duration()), Some(1));
        assert_eq!(prepared.resolver.resolve(ms(1_400), prepared.player.duration()), Some(1));
        assert_eq!(prepared.resolver.resolve(ms(1_450), prepared.player.duration()), Some(2));
    }

    #[test]
    fn duration_needs_preparation() {
        let strategy = DurationStrategy::new(Arc::new(Fixed(MockPlayer::new())), ms(100));
        assert!(strategy.needs_preparation());
        assert_eq!(strategy.kind(), StrategyKind::Duration);
    }
}
