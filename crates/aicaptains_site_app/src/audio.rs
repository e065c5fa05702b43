// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sound cues for the site.
//!
//! This module provides:
//! - Named sound cues and the cue bank mapping them to clip files
//! - The mute-aware [`AudioSignal`] shared through an [`AudioHandle`]
//! - An audio backend using rodio (when "audio" feature is enabled)
//!
//! When the "audio" feature is not enabled, a stub backend is provided
//! that logs a warning but does not play audio.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Audio errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// Token does not name a cue
    #[error("Unknown sound cue: {0}")]
    UnknownCue(String),
}

/// A named sound effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    /// Retro console power-on
    Boot,
    /// Short arcade blip
    Blip,
    /// Ship flying past
    Whoosh,
    /// Obstacle warning
    Obstacle,
    /// Power-up jingle
    Powerup,
    /// "Ready" fanfare
    Ready,
    /// Button click
    Click,
    /// Pointer hover
    Hover,
}

impl SoundCue {
    /// All cues
    pub const ALL: [SoundCue; 8] = [
        SoundCue::Boot,
        SoundCue::Blip,
        SoundCue::Whoosh,
        SoundCue::Obstacle,
        SoundCue::Powerup,
        SoundCue::Ready,
        SoundCue::Click,
        SoundCue::Hover,
    ];

    /// Get the cue token
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::Blip => "blip",
            Self::Whoosh => "whoosh",
            Self::Obstacle => "obstacle",
            Self::Powerup => "powerup",
            Self::Ready => "ready",
            Self::Click => "click",
            Self::Hover => "hover",
        }
    }
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoundCue {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|cue| cue.name().eq_ignore_ascii_case(token))
            .ok_or_else(|| AudioError::UnknownCue(token.to_string()))
    }
}

/// Cue to clip file lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueBank {
    clips: IndexMap<SoundCue, PathBuf>,
}

impl CueBank {
    /// Create an empty bank
    pub fn empty() -> Self {
        Self {
            clips: IndexMap::new(),
        }
    }

    /// Assign a clip to a cue
    pub fn insert(&mut self, cue: SoundCue, clip: impl Into<PathBuf>) {
        self.clips.insert(cue, clip.into());
    }

    /// Clip for a cue
    pub fn clip(&self, cue: SoundCue) -> Option<&Path> {
        self.clips.get(&cue).map(PathBuf::as_path)
    }

    /// Number of cues with a clip
    pub fn len(&self) -> usize {
        self.clips.len()
    }
}

impl Default for CueBank {
    fn default() -> Self {
        let mut bank = Self::empty();
        for cue in SoundCue::ALL {
            bank.insert(cue, format!("sounds/{}.mp3", cue.name()));
        }
        bank
    }
}

/// Something that can play a clip file
pub trait AudioBackend: Send + Sync {
    /// Start playing a clip. Failures are logged, not returned.
    fn play(&self, clip: &Path);

    /// Whether sound actually reaches an output device
    fn is_available(&self) -> bool;
}

/// Shared handle to the site's audio signal
pub type AudioHandle = Arc<AudioSignal>;

/// Mute-gated, name-keyed cue playback
pub struct AudioSignal {
    bank: CueBank,
    muted: AtomicBool,
    assets_root: Option<PathBuf>,
    backend: Box<dyn AudioBackend>,
}

impl AudioSignal {
    /// Create a signal over a backend
    pub fn new(bank: CueBank, muted: bool, backend: Box<dyn AudioBackend>) -> Self {
        Self {
            bank,
            muted: AtomicBool::new(muted),
            assets_root: None,
            backend,
        }
    }

    /// Create a signal on the default backend for this build
    pub fn with_default_backend(bank: CueBank, muted: bool) -> Self {
        Self::new(bank, muted, Box::new(engine::DefaultBackend::new()))
    }

    /// Resolve relative clip paths against `root`
    pub fn with_assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = Some(root.into());
        self
    }

    /// Wrap into a shared handle
    pub fn into_handle(self) -> AudioHandle {
        Arc::new(self)
    }

    /// Play a cue by token. Returns whether a playback was issued.
    pub fn play(&self, name: &str) -> bool {
        match name.parse::<SoundCue>() {
            Ok(cue) => self.play_cue(cue),
            Err(e) => {
                tracing::warn!("{e}");
                false
            }
        }
    }

    /// Play a cue. Returns whether a playback was issued.
    pub fn play_cue(&self, cue: SoundCue) -> bool {
        if self.is_muted() {
            return false;
        }

        let Some(clip) = self.bank.clip(cue) else {
            tracing::warn!("No clip assigned to sound cue {cue}");
            return false;
        };

        let path = self.resolve(clip);
        tracing::trace!(%cue, clip = %path.display(), "Playing sound cue");
        self.backend.play(&path);
        true
    }

    /// Whether cues are muted
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    /// Set the mute flag
    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
        tracing::debug!(muted, "Audio mute changed");
    }

    /// Flip the mute flag, returning the new value
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.muted.fetch_xor(true, Ordering::Relaxed);
        tracing::debug!(muted, "Audio mute toggled");
        muted
    }

    /// Whether the backend reaches an output device
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    fn resolve(&self, clip: &Path) -> PathBuf {
        match &self.assets_root {
            Some(root) if clip.is_relative() => root.join(clip),
            _ => clip.to_path_buf(),
        }
    }
}

impl fmt::Debug for AudioSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSignal")
            .field("cues", &self.bank.len())
            .field("muted", &self.is_muted())
            .field("assets_root", &self.assets_root)
            .finish()
    }
}

// ============================================================================
// Audio Backend Implementation (with rodio)
// ============================================================================

#[cfg(feature = "audio")]
mod engine {
    use super::AudioBackend;
    use rodio::{Decoder, OutputStream, Sink};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};
    use std::sync::mpsc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Backend that plays clips on a dedicated audio thread.
    ///
    /// The rodio output stream is not `Send`, so it lives on its own thread
    /// and receives clip paths over a channel.
    pub struct DefaultBackend {
        sender: mpsc::Sender<PathBuf>,
        available: Arc<AtomicBool>,
    }

    impl DefaultBackend {
        pub fn new() -> Self {
            let (sender, receiver) = mpsc::channel::<PathBuf>();
            let available = Arc::new(AtomicBool::new(true));
            let flag = Arc::clone(&available);

            let spawned = std::thread::Builder::new()
                .name("site-audio".into())
                .spawn(move || run_output(receiver, &flag));
            if let Err(e) = spawned {
                tracing::warn!("Failed to start audio thread: {e}. Audio will be disabled.");
                available.store(false, Ordering::Relaxed);
            }

            Self { sender, available }
        }
    }

    fn run_output(receiver: mpsc::Receiver<PathBuf>, available: &AtomicBool) {
        let (_stream, handle) = match OutputStream::try_default() {
            Ok(pair) => {
                tracing::info!("Audio engine initialized successfully");
                pair
            }
            Err(e) => {
                tracing::warn!("Failed to initialize audio: {e}. Audio will be disabled.");
                available.store(false, Ordering::Relaxed);
                return;
            }
        };

        while let Ok(clip) = receiver.recv() {
            let file = match File::open(&clip) {
                Ok(f) => f,
                Err(e) => {
                    tracing::warn!("Failed to open audio file {:?}: {}", clip, e);
                    continue;
                }
            };

            let source = match Decoder::new(BufReader::new(file)) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Failed to decode audio file {:?}: {}", clip, e);
                    continue;
                }
            };

            match Sink::try_new(&handle) {
                Ok(sink) => {
                    sink.append(source);
                    sink.detach();
                }
                Err(e) => tracing::warn!("Failed to create audio sink: {e}"),
            }
        }
    }

    impl AudioBackend for DefaultBackend {
        fn play(&self, clip: &Path) {
            if !self.is_available() {
                return;
            }
            if self.sender.send(clip.to_path_buf()).is_err() {
                self.available.store(false, Ordering::Relaxed);
            }
        }

        fn is_available(&self) -> bool {
            self.available.load(Ordering::Relaxed)
        }
    }
}

// ============================================================================
// Stub Audio Backend Implementation (without rodio)
// ============================================================================

#[cfg(not(feature = "audio"))]
mod engine {
    use super::AudioBackend;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Audio backend stub (no audio support)
    pub struct DefaultBackend {
        /// Log warning once
        warned: AtomicBool,
    }

    impl DefaultBackend {
        pub fn new() -> Self {
            tracing::info!("Audio engine: stub implementation (audio feature not enabled)");
            Self {
                warned: AtomicBool::new(false),
            }
        }
    }

    impl AudioBackend for DefaultBackend {
        fn play(&self, clip: &Path) {
            if !self.warned.swap(true, Ordering::Relaxed) {
                tracing::warn!("Audio playback not available: compile with --features audio");
            }
            tracing::trace!(clip = %clip.display(), "Dropped sound cue");
        }

        fn is_available(&self) -> bool {
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Backend that records every clip it is asked to play
    #[derive(Clone, Default)]
    pub(crate) struct RecordingBackend {
        pub(crate) played: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl AudioBackend for RecordingBackend {
        fn play(&self, clip: &Path) {
            self.played.lock().push(clip.to_path_buf());
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    /// A signal over a recording backend, plus the recording
    pub(crate) fn recording_signal(muted: bool) -> (AudioHandle, Arc<Mutex<Vec<PathBuf>>>) {
        let backend = RecordingBackend::default();
        let played = Arc::clone(&backend.played);
        let signal = AudioSignal::new(CueBank::default(), muted, Box::new(backend));
        (signal.into_handle(), played)
    }
}
