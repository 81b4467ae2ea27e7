//! Where reel-reader keeps its files.
//!
//! Settings live under the platform config root and books under the local
//! data root, each in a `reel-reader` subdirectory:
//!
//! ```text
//! <config root>/reel-reader/settings.toml
//! <data root>/reel-reader/books/<id>.json
//! ```
//!
//! On Linux the roots are `~/.config` and `~/.local/share`; see
//! [`dirs::config_dir`] and [`dirs::data_local_dir`] for other platforms.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "reel-reader";
const SETTINGS_FILE: &str = "settings.toml";
const BOOKS_DIR: &str = "books";

/// The two application directories; file locations derive from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    config_home: PathBuf,
    data_home: PathBuf,
}

impl AppPaths {
    /// Platform roots.  A root the platform does not report becomes `.`.
    pub fn new() -> Self {
        Self::with_roots(
            dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")),
            dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")),
        )
    }

    /// Paths under explicit config and data roots.
    pub fn with_roots(config_root: impl AsRef<Path>, data_root: impl AsRef<Path>) -> Self {
        Self {
            config_home: config_root.as_ref().join(APP_DIR),
            data_home: data_root.as_ref().join(APP_DIR),
        }
    }

    pub fn config_home(&self) -> &Path {
        &self.config_home
    }

    pub fn data_home(&self) -> &Path {
        &self.data_home
    }

    /// `settings.toml` read by [`AppConfig::load`](super::AppConfig::load).
    pub fn settings_file(&self) -> PathBuf {
        self.config_home.join(SETTINGS_FILE)
    }

    /// Directory for [`JsonBookStore`](crate::library::JsonBookStore).
    pub fn books_dir(&self) -> PathBuf {
        self.data_home.join(BOOKS_DIR)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
