//! Playback synchronisation: keeps the highlighted word in step with narration.
//!
//! This module provides:
//! * [`SyncState`] — lifecycle of the single narration session.
//! * [`SyncEvent`] — word-index, state and error notifications.
//! * [`SyncController`] — starts, pauses, resumes and stops sessions and
//!   emits events on a `tokio::sync::mpsc` channel.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use std::sync::Arc;
//! use reel_reader::config::VoiceParams;
//! use reel_reader::narration::EstimatedStrategy;
//! use reel_reader::sync::SyncController;
//! use reel_reader::text::tokenize;
//!
//! # async fn example() {
//! let strategy = Arc::new(EstimatedStrategy::new(180, 1.0, Duration::from_millis(1200)));
//! let (controller, _events) =
//!     SyncController::new(strategy, VoiceParams::default(), Duration::from_millis(50));
//! controller.start("Hello there.", tokenize("Hello there.")).await;
//! controller.pause();
//! controller.resume();
//! controller.stop();
//! # }
//! ```

pub mod controller;
pub mod state;

pub use controller::{OutputSlot, SyncController};
pub use state::{SyncEvent, SyncState};
