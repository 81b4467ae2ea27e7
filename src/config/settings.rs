//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Missing keys fall back to their defaults, so a partial `settings.toml`
//! written by an older version still loads.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::playback::DEFAULT_WORDS_PER_MINUTE;
use crate::text::ChunkingPolicy;

/// Upper bound on the resolver polling cadence.
pub const MAX_POLL_INTERVAL_MS: u64 = 100;

// ---------------------------------------------------------------------------
// StrategyKind
// ---------------------------------------------------------------------------

/// Selects how the spoken word is tracked during narration.
///
/// | Variant   | Timing source                               | Network |
/// |-----------|---------------------------------------------|---------|
/// | Estimated | words-per-minute pacing, optional boundaries | No      |
/// | Aligned   | provider per-character alignment table      | Yes     |
/// | Duration  | audio length spread evenly over the words   | Yes     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StrategyKind {
    /// Local estimation; no network.
    #[default]
    Estimated,
    /// Remote synthesis with a character alignment table.
    Aligned,
    /// Remote synthesis with audio duration only.
    Duration,
}

impl StrategyKind {
    /// Whether the strategy must await remote preparation (Loading state).
    pub fn needs_preparation(&self) -> bool {
        !matches!(self, StrategyKind::Estimated)
    }
}

// ---------------------------------------------------------------------------
// ChunkingConfig
// ---------------------------------------------------------------------------

/// Chunk sizing.  Validated into a [`ChunkingPolicy`] by
/// [`ChunkingConfig::policy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Running word count at which a chunk closes.
    pub target_words: usize,
    /// Hard ceiling, only exceeded by a single oversize sentence.
    pub max_words: usize,
    /// Minimum count for closing early at a paragraph boundary.
    pub min_words: usize,
    /// Close chunks at paragraph boundaries once `min_words` is reached.
    pub preserve_paragraphs: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        let policy = ChunkingPolicy::default();
        Self {
            target_words: policy.target_words(),
            max_words: policy.max_words(),
            min_words: policy.min_words(),
            preserve_paragraphs: policy.preserve_paragraphs(),
        }
    }
}

impl ChunkingConfig {
    /// Validate into a [`ChunkingPolicy`].  Invalid combinations are an error,
    /// never clamped.
    pub fn policy(&self) -> Result<ChunkingPolicy, crate::text::ConfigError> {
        ChunkingPolicy::new(
            self.target_words,
            self.max_words,
            self.min_words,
            self.preserve_paragraphs,
        )
    }
}

// ---------------------------------------------------------------------------
// NarrationConfig
// ---------------------------------------------------------------------------

/// Narration timing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Which timing strategy drives the highlighted word.
    pub strategy: StrategyKind,
    /// Baseline pace for heuristic timing.
    pub words_per_minute: u32,
    /// Playback speed multiplier applied to `words_per_minute`.
    pub speed: f32,
    /// How often the active word is re-resolved, in milliseconds.  Values
    /// above 100 are capped.
    pub poll_interval_ms: u64,
    /// Playback time without a boundary event before heuristic pacing takes
    /// over, in milliseconds.
    pub boundary_stall_ms: u64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            speed: 1.0,
            poll_interval_ms: 50,
            boundary_stall_ms: 1_200,
        }
    }
}

impl NarrationConfig {
    /// Polling cadence, capped at [`MAX_POLL_INTERVAL_MS`] and at least 1 ms.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.clamp(1, MAX_POLL_INTERVAL_MS))
    }

    pub fn boundary_stall(&self) -> Duration {
        Duration::from_millis(self.boundary_stall_ms)
    }
}

// ---------------------------------------------------------------------------
// VoiceParams
// ---------------------------------------------------------------------------

/// Voice selection handed to the narration collaborator on `prepare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceParams {
    /// Provider-specific voice identifier; `None` means the provider default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    /// Speaking rate multiplier.
    pub rate: f32,
    /// Pitch multiplier.
    pub pitch: f32,
    /// Output volume, 0.0 – 1.0.
    pub volume: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            voice_id: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TextConfig
// ---------------------------------------------------------------------------

/// Sentence-splitting tweaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Abbreviations protected in addition to the built-in set, written
    /// without the trailing period (e.g. `"Gen"`).
    pub extra_abbreviations: Vec<String>,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// This is also the singleton settings record of the reader.
///
/// # Persistence
///
/// ```rust,no_run
/// use reel_reader::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chunk sizing.
    pub chunking: ChunkingConfig,
    /// Narration timing.
    pub narration: NarrationConfig,
    /// Voice parameters for narration.
    pub voice: VoiceParams,
    /// Sentence-splitting tweaks.
    pub text: TextConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file())
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file())
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A default `AppConfig` survives a TOML round trip unchanged.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.chunking.target_words, 40);
        assert_eq!(cfg.chunking.max_words, 60);
        assert_eq!(cfg.chunking.min_words, 20);
        assert!(cfg.chunking.preserve_paragraphs);
        assert_eq!(cfg.narration.strategy, StrategyKind::Estimated);
        assert_eq!(cfg.narration.words_per_minute, 180);
        assert_eq!(cfg.narration.poll_interval(), Duration::from_millis(50));
        assert!(cfg.voice.voice_id.is_none());
        assert!(cfg.text.extra_abbreviations.is_empty());
        assert!(cfg.chunking.policy().is_ok());
    }

    /// Modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.chunking.target_words = 30;
        cfg.chunking.preserve_paragraphs = false;
        cfg.narration.strategy = StrategyKind::Aligned;
        cfg.narration.speed = 1.5;
        cfg.voice.voice_id = Some("narrator-2".into());
        cfg.text.extra_abbreviations = vec!["Gen".into()];

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.chunking.target_words, 30);
        assert!(!loaded.chunking.preserve_paragraphs);
        assert_eq!(loaded.narration.strategy, StrategyKind::Aligned);
        assert_eq!(loaded.narration.speed, 1.5);
        assert_eq!(loaded.voice.voice_id.as_deref(), Some("narrator-2"));
        assert_eq!(loaded.text.extra_abbreviations, vec!["Gen".to_string()]);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[narration]\nstrategy = \"Duration\"\n").unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.narration.strategy, StrategyKind::Duration);
        assert_eq!(cfg.narration.words_per_minute, 180);
        assert_eq!(cfg.chunking, ChunkingConfig::default());
    }

    #[test]
    fn invalid_chunking_is_reported_not_clamped() {
        let cfg = ChunkingConfig {
            target_words: 80,
            max_words: 60,
            min_words: 20,
            preserve_paragraphs: true,
        };
        assert!(cfg.policy().is_err());
    }

    #[test]
    fn poll_interval_is_capped() {
        let mut cfg = NarrationConfig::default();
        cfg.poll_interval_ms = 1_000;
        assert_eq!(cfg.poll_interval(), Duration::from_millis(100));
        cfg.poll_interval_ms = 0;
        assert_eq!(cfg.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn only_estimated_skips_preparation() {
        assert!(!StrategyKind::Estimated.needs_preparation());
        assert!(StrategyKind::Aligned.needs_preparation());
        assert!(StrategyKind::Duration.needs_preparation());
    }
}
