//! Chunk sizing policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Rejected [`ChunkingPolicy`] combinations.
///
/// Policies are never clamped into range; an invalid policy is an error at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One of the word counts was zero.
    #[error("{field} must be a positive word count")]
    ZeroWords { field: &'static str },

    /// `min_words` exceeded `target_words`.
    #[error("min_words ({min}) must not exceed target_words ({target})")]
    MinAboveTarget { min: usize, target: usize },

    /// `target_words` exceeded `max_words`.
    #[error("target_words ({target}) must not exceed max_words ({max})")]
    TargetAboveMax { target: usize, max: usize },
}

// ---------------------------------------------------------------------------
// ChunkingPolicy
// ---------------------------------------------------------------------------

/// Word-count targets that drive [`ChunkBuilder`](crate::text::ChunkBuilder).
///
/// Invariant: `0 < min_words <= target_words <= max_words`.  The fields are
/// private so the invariant holds for every value in existence; deserialising
/// goes through the same validation as [`ChunkingPolicy::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy", into = "RawPolicy")]
pub struct ChunkingPolicy {
    target_words: usize,
    max_words: usize,
    min_words: usize,
    preserve_paragraphs: bool,
}

impl ChunkingPolicy {
    /// Build a validated policy.
    ///
    /// ```
    /// use reel_reader::text::{ChunkingPolicy, ConfigError};
    ///
    /// assert!(ChunkingPolicy::new(40, 60, 20, true).is_ok());
    /// assert_eq!(
    ///     ChunkingPolicy::new(70, 60, 20, true),
    ///     Err(ConfigError::TargetAboveMax { target: 70, max: 60 }),
    /// );
    /// ```
    pub fn new(
        target_words: usize,
        max_words: usize,
        min_words: usize,
        preserve_paragraphs: bool,
    ) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("target_words", target_words),
            ("max_words", max_words),
            ("min_words", min_words),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroWords { field });
            }
        }
        if min_words > target_words {
            return Err(ConfigError::MinAboveTarget {
                min: min_words,
                target: target_words,
            });
        }
        if target_words > max_words {
            return Err(ConfigError::TargetAboveMax {
                target: target_words,
                max: max_words,
            });
        }

        Ok(Self {
            target_words,
            max_words,
            min_words,
            preserve_paragraphs,
        })
    }

    /// Running word count at which a chunk is closed after a sentence.
    pub fn target_words(&self) -> usize {
        self.target_words
    }

    /// Ceiling a chunk may only exceed with a single oversize sentence.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Minimum running count for an early close at a paragraph boundary.
    pub fn min_words(&self) -> usize {
        self.min_words
    }

    /// Whether paragraph boundaries may close a chunk early.
    pub fn preserve_paragraphs(&self) -> bool {
        self.preserve_paragraphs
    }
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            target_words: 40,
            max_words: 60,
            min_words: 20,
            preserve_paragraphs: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde shim
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct RawPolicy {
    target_words: usize,
    max_words: usize,
    min_words: usize,
    preserve_paragraphs: bool,
}

impl TryFrom<RawPolicy> for ChunkingPolicy {
    type Error = ConfigError;

    fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
        Self::new(
            raw.target_words,
            raw.max_words,
            raw.min_words,
            raw.preserve_paragraphs,
        )
    }
}

impl From<ChunkingPolicy> for RawPolicy {
    fn from(policy: ChunkingPolicy) -> Self {
        Self {
            target_words: policy.target_words,
            max_words: policy.max_words,
            min_words: policy.min_words,
            preserve_paragraphs: policy.preserve_paragraphs,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_equal_bounds() {
        let policy = ChunkingPolicy::new(5, 5, 5, false).unwrap();
        assert_eq!(policy.target_words(), 5);
        assert_eq!(policy.max_words(), 5);
        assert_eq!(policy.min_words(), 5);
        assert!(!policy.preserve_paragraphs());
    }

    #[test]
    fn rejects_zero_counts() {
        assert_eq!(
            ChunkingPolicy::new(0, 10, 1, true),
            Err(ConfigError::ZeroWords { field: "target_words" })
        );
        assert_eq!(
            ChunkingPolicy::new(5, 10, 0, true),
            Err(ConfigError::ZeroWords { field: "min_words" })
        );
    }

    #[test]
    fn rejects_min_above_target() {
        assert_eq!(
            ChunkingPolicy::new(10, 20, 11, true),
            Err(ConfigError::MinAboveTarget { min: 11, target: 10 })
        );
    }

    #[test]
    fn rejects_target_above_max() {
        assert!(matches!(
            ChunkingPolicy::new(21, 20, 1, true),
            Err(ConfigError::TargetAboveMax { .. })
        ));
    }

    #[test]
    fn default_policy_is_valid() {
        let d = ChunkingPolicy::default();
        assert_eq!(
            ChunkingPolicy::new(d.target_words(), d.max_words(), d.min_words(), true),
            Ok(d)
        );
    }

    #[test]
    fn deserialising_invalid_policy_fails() {
        let toml_src = "target_words = 50\nmax_words = 40\nmin_words = 10\npreserve_paragraphs = true\n";
        let parsed: Result<ChunkingPolicy, _> = toml::from_str(toml_src);
        let err = parsed.unwrap_err().to_string();
        assert!(err.contains("must not exceed max_words"), "got: {err}");
    }

    #[test]
    fn error_messages_are_readable() {
        let err = ChunkingPolicy::new(0, 1, 1, false).unwrap_err();
        assert_eq!(err.to_string(), "target_words must be a positive word count");
    }
}
