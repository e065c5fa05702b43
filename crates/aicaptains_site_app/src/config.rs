// SPDX-License-Identifier: MIT OR Apache-2.0
//! Site configuration.
//!
//! Settings are stored as RON. Every field has a default, so a config file
//! only needs the values it changes:
//! - Intro schedule and skip flag
//! - Initial mute state and the sound cue bank
//! - Retro TV playback timings
//! - Scroll-to-top threshold

use crate::audio::CueBank;
use crate::playback::PlaybackConfig;
use crate::scroll::DEFAULT_SCROLL_THRESHOLD;
use aicaptains_site_sequencer::Schedule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not a valid configuration
    #[error("Invalid configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serializing failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// Site settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Format version
    pub version: u32,
    /// Jump straight to the end of the intro
    pub skip_intro: bool,
    /// Start with sound muted
    pub muted: bool,
    /// Intro timeline
    pub schedule: Schedule,
    /// Sound cue clips
    pub cues: CueBank,
    /// Directory that relative clip paths are resolved against
    pub assets_root: Option<PathBuf>,
    /// Retro TV settings
    pub playback: PlaybackConfig,
    /// Scroll offset that reveals the scroll-to-top button
    pub scroll_threshold: f32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            skip_intro: false,
            muted: false,
            schedule: Schedule::intro(),
            cues: CueBank::default(),
            assets_root: None,
            playback: PlaybackConfig::default(),
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
        }
    }
}

impl SiteConfig {
    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = ron::from_str(content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded site config from {}", path.display());
        Ok(config)
    }

    /// Render settings as RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundCue;
    use aicaptains_site_sequencer::Stage;

    #[test]
    fn test_default_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert!(!config.skip_intro);
        assert_eq!(config.schedule.terminal(), Stage::Complete);
        assert_eq!(config.cues.len(), SoundCue::ALL.len());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = SiteConfig::from_ron("(skip_intro: true, playback: (boot_ms: 10))").unwrap();
        assert!(config.skip_intro);
        assert_eq!(config.playback.boot_ms, 10);
        assert_eq!(config.playback.static_ms, PlaybackConfig::default().static_ms);
        assert_eq!(config.schedule, Schedule::intro());
    }

    #[test]
    fn test_custom_schedule() {
        let config = SiteConfig::from_ron(
            "(schedule: [(stage: black, offset_ms: 0), (stage: ready, offset_ms: 100), (stage: complete, offset_ms: 200)])",
        )
        .unwrap();
        assert_eq!(config.schedule.len(), 3);
        assert_eq!(config.schedule.terminal(), Stage::Complete);
    }

    #[test]
    fn test_rejects_bad_schedule() {
        let result = SiteConfig::from_ron(
            "(schedule: [(stage: black, offset_ms: 100), (stage: ready, offset_ms: 100)])",
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_newer_version() {
        let result = SiteConfig::from_ron("(version: 99)");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_serialization() {
        let mut config = SiteConfig::default();
        config.muted = true;
        config.assets_root = Some(PathBuf::from("public"));
        let ron_str = config.to_ron().unwrap();
        let loaded = SiteConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }
}
