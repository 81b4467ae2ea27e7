//! Configuration module for the reel reader.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, ChunkingConfig, NarrationConfig, StrategyKind, TextConfig, VoiceParams,
    MAX_POLL_INTERVAL_MS,
};
