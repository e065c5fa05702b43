// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retro TV playback surface.
//!
//! This module handles:
//! - Powering the TV on through its boot and static phases
//! - Starting, pausing and resuming the underlying media element
//! - Falling back to the paused overlay when playback is rejected

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Media playback errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The environment refused to start playback without user interaction
    #[error("Autoplay was blocked")]
    AutoplayBlocked,

    /// The media source could not be played
    #[error("Media source unavailable: {0}")]
    SourceUnavailable(String),
}

/// A controllable media element
pub trait MediaElement: Send {
    /// Begin or resume playback
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback
    fn pause(&mut self);
}

/// Coarse surface state shown to the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Screen dark
    #[default]
    Off,
    /// Power-on animation
    Booting,
    /// Static noise before the picture
    Static,
    /// Video playing
    Playing,
    /// Video paused, overlay controls visible
    Paused,
}

/// Timing and source settings for the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Length of the boot phase
    pub boot_ms: u64,
    /// Length of the static phase
    pub static_ms: u64,
    /// Video shown on the TV
    pub source: PathBuf,
    /// Whether the environment permits playback without interaction
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            boot_ms: 1000,
            static_ms: 800,
            source: PathBuf::from("videos/captains.mp4"),
            autoplay: true,
        }
    }
}

/// Playback surface wrapping a media element
pub struct PlaybackSurface {
    state: PlaybackState,
    media: Box<dyn MediaElement>,
    boot_duration: Duration,
    static_duration: Duration,
    /// Time spent in the current boot or static phase
    phase_elapsed: Duration,
}

impl PlaybackSurface {
    /// Create a surface in the `Off` state
    pub fn new(media: Box<dyn MediaElement>, config: &PlaybackConfig) -> Self {
        Self {
            state: PlaybackState::Off,
            media,
            boot_duration: Duration::from_millis(config.boot_ms),
            static_duration: Duration::from_millis(config.static_ms),
            phase_elapsed: Duration::ZERO,
        }
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Power on, or resume from pause.
    /// Returns true if the command changed anything.
    pub fn start(&mut self) -> bool {
        match self.state {
            PlaybackState::Off => {
                self.enter(PlaybackState::Booting);
                true
            }
            PlaybackState::Paused => {
                self.try_play();
                self.state == PlaybackState::Playing
            }
            PlaybackState::Booting | PlaybackState::Static | PlaybackState::Playing => false,
        }
    }

    /// Pause playback
    pub fn pause(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.media.pause();
            self.enter(PlaybackState::Paused);
            true
        } else {
            false
        }
    }

    /// Toggle between playing and paused, powering on if off
    pub fn toggle(&mut self) -> bool {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Off | PlaybackState::Paused => self.start(),
            PlaybackState::Booting | PlaybackState::Static => false,
        }
    }

    /// Switch the screen off
    pub fn power_off(&mut self) {
        if self.state == PlaybackState::Playing {
            self.media.pause();
        }
        self.enter(PlaybackState::Off);
    }

    /// Advance the boot and static phases (called each frame)
    pub fn update(&mut self, delta: Duration) {
        match self.state {
            PlaybackState::Booting => {
                self.phase_elapsed += delta;
                if self.phase_elapsed >= self.boot_duration {
                    let carry = self.phase_elapsed - self.boot_duration;
                    self.enter(PlaybackState::Static);
                    self.phase_elapsed = carry;
                    self.update(Duration::ZERO);
                }
            }
            PlaybackState::Static => {
                self.phase_elapsed += delta;
                if self.phase_elapsed >= self.static_duration {
                    self.try_play();
                }
            }
            PlaybackState::Off | PlaybackState::Playing | PlaybackState::Paused => {}
        }
    }

    /// Get a status string for display
    pub fn status_text(&self) -> &'static str {
        match self.state {
            PlaybackState::Off => "Off",
            PlaybackState::Booting => "Booting",
            PlaybackState::Static => "Tuning",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    fn try_play(&mut self) {
        match self.media.play() {
            Ok(()) => self.enter(PlaybackState::Playing),
            Err(e) => {
                // Overlay controls stay usable; the visitor can start it by hand.
                tracing::debug!("Playback did not start: {e}");
                self.enter(PlaybackState::Paused);
            }
        }
    }

    fn enter(&mut self, state: PlaybackState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "Playback surface state");
        }
        self.state = state;
        self.phase_elapsed = Duration::ZERO;
    }
}

impl std::fmt::Debug for PlaybackSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSurface")
            .field("state", &self.state)
            .field("boot_duration", &self.boot_duration)
            .field("static_duration", &self.static_duration)
            .finish_non_exhaustive()
    }
}

/// Media element for headless runs: tracks play/pause and honours the
/// autoplay policy on the first play request.
#[derive(Debug)]
pub struct HeadlessVideo {
    source: PathBuf,
    autoplay: bool,
    interacted: bool,
    playing: bool,
}

impl HeadlessVideo {
    /// Create from playback settings
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            source: config.source.clone(),
            autoplay: config.autoplay,
            interacted: false,
            playing: false,
        }
    }
}

impl MediaElement for HeadlessVideo {
    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.source.as_os_str().is_empty() {
            return Err(PlaybackError::SourceUnavailable("no source".to_string()));
        }
        if !self.autoplay && !self.interacted {
            // The first refused request counts as the gesture that reveals
            // the overlay; a later explicit start goes through.
            self.interacted = true;
            return Err(PlaybackError::AutoplayBlocked);
        }
        tracing::info!(source = %self.source.display(), "Video playing");
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        if self.playing {
            tracing::info!(source = %self.source.display(), "Video paused");
        }
        self.playing = false;
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedMedia;
    use super::*;

    fn config() -> PlaybackConfig {
        PlaybackConfig {
            boot_ms: 100,
            static_ms: 50,
            ..PlaybackConfig::default()
        }
    }

    fn surface() -> (PlaybackSurface, ScriptedMedia) {
        let media = ScriptedMedia::default();
        (PlaybackSurface::new(Box::new(media.clone()), &config()), media)
    }

    #[test]
    fn test_power_on_sequence() {
        let (mut surface, media) = surface();
        assert_eq!(surface.state(), PlaybackState::Off);
        surface.update(Duration::from_millis(500));
        assert_eq!(surface.state(), PlaybackState::Off);

        assert!(surface.start());
        assert_eq!(surface.state(), PlaybackState::Booting);
        assert!(!surface.start());

        surface.update(Duration::from_millis(99));
        assert_eq!(surface.state(), PlaybackState::Booting);
        surface.update(Duration::from_millis(1));
        assert_eq!(surface.state(), PlaybackState::Static);
        assert_eq!(surface.status_text(), "Tuning");

        surface.update(Duration::from_millis(50));
        assert_eq!(surface.state(), PlaybackState::Playing);
        assert_eq!(*media.calls.lock(), vec!["play"]);
    }

    #[test]
    fn test_long_frame_carries_over() {
        let (mut surface, _media) = surface();
        surface.start();
        surface.update(Duration::from_millis(200));
        assert_eq!(surface.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_rejected_play_lands_paused() {
        let (mut surface, media) = surface();
        *media.reject.lock() = true;
        surface.start();
        surface.update(Duration::from_millis(150));
        assert_eq!(surface.state(), PlaybackState::Paused);

        // Still rejected: stays paused, nothing surfaces
        assert!(!surface.start());
        assert_eq!(surface.state(), PlaybackState::Paused);

        *media.reject.lock() = false;
        assert!(surface.start());
        assert_eq!(surface.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_pause_and_toggle() {
        let (mut surface, media) = surface();
        assert!(!surface.pause());
        surface.start();
        surface.update(Duration::from_millis(150));

        assert!(surface.toggle());
        assert_eq!(surface.state(), PlaybackState::Paused);
        assert!(surface.toggle());
        assert_eq!(surface.state(), PlaybackState::Playing);
        assert_eq!(*media.calls.lock(), vec!["play", "pause", "play"]);

        surface.power_off();
        assert_eq!(surface.state(), PlaybackState::Off);
    }

    #[test]
    fn test_headless_video_autoplay_policy() {
        let config = PlaybackConfig {
            autoplay: false,
            ..config()
        };
        let mut video = HeadlessVideo::new(&config);
        assert_eq!(video.play(), Err(PlaybackError::AutoplayBlocked));
        assert!(!video.playing);
        assert_eq!(video.play(), Ok(()));
        assert!(video.playing);
        video.pause();
        assert!(!video.playing);

        let mut blank = HeadlessVideo::new(&PlaybackConfig {
            source: PathBuf::new(),
            ..PlaybackConfig::default()
        });
        assert!(matches!(blank.play(), Err(PlaybackError::SourceUnavailable(_))));
    }
}
