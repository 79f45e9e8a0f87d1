//! Persistent configuration for scrolltap.
//!
//! Stores user settings in `~/.scrolltap/config.json`. Today that is the
//! scroll-search budget handed to drivers that do not bring their own.
//!
//! # Example
//!
//! ```no_run
//! use scrolltap_core::config::ScrolltapConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = ScrolltapConfig::load();
//! println!("search times out after {}ms", config.search.timeout_ms);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::driver::SearchPolicy;

const CONFIG_FILENAME: &str = "config.json";

/// Directory holding scrolltap's user files (`~/.scrolltap`).
pub fn scrolltap_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scrolltap")
}

/// Persistent scrolltap configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrolltapConfig {
    /// Retry budget for scroll searches.
    #[serde(default)]
    pub search: SearchPolicy,
}

impl ScrolltapConfig {
    /// Load config from `~/.scrolltap/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(scrolltap_dir().join(CONFIG_FILENAME))
    }

    /// Load config from an explicit path, with the same fallback as
    /// [`load`](Self::load).
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.scrolltap/config.json`.
    pub fn save(&self) -> std::io::Result<()> {
        let dir = scrolltap_dir();
        std::fs::create_dir_all(&dir)?;
        self.save_to(dir.join(CONFIG_FILENAME))
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
