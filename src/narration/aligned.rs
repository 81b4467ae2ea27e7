//! Remote narration with a character alignment table.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StrategyKind, VoiceParams};
use crate::narration::{AlignedSpeechBackend, NarrationError, PreparedNarration, TimingStrategy};
use crate::playback::{AlignedTimings, WordIndexResolver};

/// Narration whose highlight follows the provider's per-character timings.
///
/// The alignment table is reduced to per-word timings once, at preparation;
/// a malformed table fails preparation.
pub struct AlignedStrategy {
    backend: Arc<dyn AlignedSpeechBackend>,
}

impl AlignedStrategy {
    pub fn new(backend: Arc<dyn AlignedSpeechBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TimingStrategy for AlignedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Aligned
    }

    async fn prepare(
        &self,
        text: &str,
        words: &[String],
        voice: &VoiceParams,
    ) -> Result<PreparedNarration, NarrationError> {
        let audio = self.backend.synthesize(text, voice).await?;
        let timings = audio.alignment.word_timings()?;

        if timings.len() != words.len() {
            log::warn!(
                "aligned: provider returned {} word(s) for {} token(s)",
                timings.len(),
                words.len()
            );
        }

        Ok(PreparedNarration {
            player: audio.player,
            resolver: WordIndexResolver::Aligned(AlignedTimings::new(timings, words.len())),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::{AlignedAudio, MockPlayer};
    use crate::playback::AlignmentTable;
    use crate::text::tokenize;

    struct FixedAlignment(AlignmentTable);

    #[async_trait]
    impl AlignedSpeechBackend for FixedAlignment {
        async fn synthesize(
            &self,
            _text: &str,
            _voice: &VoiceParams,
        ) -> Result<AlignedAudio, NarrationError> {
            Ok(AlignedAudio {
                player: Box::new(MockPlayer::new()),
                alignment: self.0.clone(),
            })
        }
    }

    struct Unreachable;

    #[async_trait]
    impl AlignedSpeechBackend for Unreachable {
        async fn synthesize(
            &self,
            _text: &str,
            _voice: &VoiceParams,
        ) -> Result<AlignedAudio, NarrationError> {
            Err(NarrationError::Preparation("provider unreachable".into()))
        }
    }

    fn hi_there() -> AlignmentTable {
        AlignmentTable {
            characters: "Hi there".chars().map(String::from).collect(),
            character_start_times_seconds: vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7],
            character_end_times_seconds: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8],
        }
    }

    #[tokio::test]
    async fn prepares_aligned_resolver() {
        let strategy = AlignedStrategy::new(Arc::new(FixedAlignment(hi_there())));
        let words = tokenize("Hi there");
        let mut prepared = strategy
            .prepare("Hi there", &words, &VoiceParams::default())
            .await
            .unwrap();

        assert_eq!(prepared.resolver.label(), "aligned");
        let at = |ms| std::time::Duration::from_millis(ms);
        assert_eq!(prepared.resolver.resolve(at(50), None), Some(0));
        // 200–300 ms is the space: the next word is preferred.
        assert_eq!(prepared.resolver.resolve(at(250), None), Some(1));
    }

    #[tokio::test]
    async fn malformed_alignment_fails_preparation() {
        let mut table = hi_there();
        table.character_end_times_seconds.pop();
        let strategy = AlignedStrategy::new(Arc::new(FixedAlignment(table)));

        let err = strategy
            .prepare("Hi there", &tokenize("Hi there"), &VoiceParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NarrationError::Alignment(_)));
    }

    #[tokio::test]
    async fn backend_failure_propagates() {
        let strategy = AlignedStrategy::new(Arc::new(Unreachable));
        let err = strategy
            .prepare("x", &tokenize("x"), &VoiceParams::default())
            .await
            .unwrap_err();
        assert_eq!(err, NarrationError::Preparation("provider unreachable".into()));
    }

    #[test]
    fn aligned_needs_preparation() {
        let strategy = AlignedStrategy::new(Arc::new(Unreachable));
        assert!(strategy.needs_preparation());
        assert_eq!(strategy.kind(), StrategyKind::Aligned);
    }
}
