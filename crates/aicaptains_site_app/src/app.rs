// SPDX-License-Identifier: MIT OR Apache-2.0
//! Top-level site view.
//!
//! Owns the shared audio signal and the retro TV, mounts the intro, and
//! afterwards runs the page loop that feeds visitor commands into the
//! page state.

use crate::audio::{AudioHandle, AudioSignal, SoundCue};
use crate::commands::PageCommand;
use crate::config::{ConfigError, SiteConfig};
use crate::intro::{IntroOutcome, IntroView, SurfaceHandle};
use crate::newsletter::{NewsletterForm, SignupState};
use crate::playback::{HeadlessVideo, PlaybackSurface};
use crate::scroll::ScrollToTop;
use aicaptains_site_sequencer::SequencerError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tokio::time::{Instant, MissedTickBehavior};

/// Frame interval for the playback surface
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Site errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The intro could not be started
    #[error("Sequencer error: {0}")]
    Sequencer(#[from] SequencerError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Page state after the intro
#[derive(Debug, Default)]
pub struct PageState {
    /// Scroll-to-top button
    pub scroll: ScrollToTop,
    /// Newsletter form
    pub newsletter: NewsletterForm,
}

/// The site application
pub struct SiteApp {
    config: SiteConfig,
    audio: AudioHandle,
    surface: SurfaceHandle,
    page: PageState,
}

impl SiteApp {
    /// Create the site with the default audio backend
    pub fn new(config: SiteConfig) -> Self {
        let mut signal = AudioSignal::with_default_backend(config.cues.clone(), config.muted);
        if let Some(root) = &config.assets_root {
            signal = signal.with_assets_root(root);
        }
        let surface = PlaybackSurface::new(
            Box::new(HeadlessVideo::new(&config.playback)),
            &config.playback,
        );
        Self::with_parts(config, signal.into_handle(), Arc::new(Mutex::new(surface)))
    }

    /// Create the site from prepared collaborators
    pub fn with_parts(config: SiteConfig, audio: AudioHandle, surface: SurfaceHandle) -> Self {
        let page = PageState {
            scroll: ScrollToTop::new(config.scroll_threshold),
            newsletter: NewsletterForm::new(),
        };
        Self {
            config,
            audio,
            surface,
            page,
        }
    }

    /// Run the intro, then the page loop on stdin until quit or Ctrl+C
    pub async fn run(mut self) -> Result<(), AppError> {
        tracing::info!(
            audio = self.audio.is_available(),
            muted = self.audio.is_muted(),
            "Site starting"
        );

        let frames = tokio::spawn(drive_surface(Arc::clone(&self.surface)));

        let mut intro = IntroView::mount(&self.config, Arc::clone(&self.audio), Arc::clone(&self.surface))?;
        let outcome = intro.run_until_complete(shutdown_signal()).await;
        let stage = intro.stage();
        intro.unmount();

        if outcome == IntroOutcome::Interrupted {
            tracing::info!(stage = ?stage, "Interrupted during intro");
            frames.abort();
            return Ok(());
        }

        tracing::info!("Intro complete, page ready");
        let result = self.page_loop().await;
        frames.abort();
        self.surface.lock().power_off();
        result
    }

    async fn page_loop(&mut self) -> Result<(), AppError> {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<PageCommand>() {
                        Ok(command) => {
                            if !self.apply(command) {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("{e}"),
                    }
                }
                () = &mut shutdown => break,
            }
        }

        tracing::info!("Leaving page");
        Ok(())
    }

    /// Apply a visitor command. Returns false when the visitor leaves.
    pub fn apply(&mut self, command: PageCommand) -> bool {
        match command {
            PageCommand::Scroll(offset) => {
                if self.page.scroll.update(offset) {
                    tracing::info!(visible = self.page.scroll.is_visible(), "Scroll-to-top button");
                }
            }
            PageCommand::Subscribe(email) => {
                self.page.newsletter.set_email(email);
                match self.page.newsletter.submit() {
                    Ok(()) => {
                        self.audio.play_cue(SoundCue::Powerup);
                    }
                    Err(e) => tracing::info!("Newsletter form: {e}"),
                }
            }
            PageCommand::ResetForm => self.page.newsletter.reset(),
            PageCommand::Mute => self.audio.set_muted(true),
            PageCommand::Unmute => self.audio.set_muted(false),
            PageCommand::ToggleMute => {
                self.audio.toggle_mute();
            }
            PageCommand::Cue(name) => {
                self.audio.play(&name);
            }
            PageCommand::Play => {
                self.surface.lock().start();
            }
            PageCommand::Pause => {
                self.surface.lock().pause();
            }
            PageCommand::ToggleTv => {
                self.surface.lock().toggle();
            }
            PageCommand::Status => self.log_status(),
            PageCommand::Quit => return false,
        }
        true
    }

    fn log_status(&self) {
        let signup = match self.page.newsletter.state() {
            SignupState::Idle => "idle",
            SignupState::Submitted { .. } => "submitted",
        };
        tracing::info!(
            tv = self.surface.lock().status_text(),
            muted = self.audio.is_muted(),
            scroll_to_top = self.page.scroll.is_visible(),
            newsletter = signup,
            "Page status"
        );
    }
}

/// Advance the playback surface once per frame
async fn drive_surface(surface: SurfaceHandle) {
    let mut interval = tokio::time::interval(FRAME_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let now = Instant::now();
        surface.lock().update(now - last);
        last = now;
    }
}

/// Resolves on Ctrl+C. If the handler cannot be installed it never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::recording_signal;
    use crate::playback::testing::ScriptedMedia;
    use crate::playback::{PlaybackConfig, PlaybackState};
    use std::path::PathBuf;

    fn app(muted: bool) -> (SiteApp, Arc<Mutex<Vec<PathBuf>>>) {
        let (audio, played) = recording_signal(muted);
        let surface = Arc::new(Mutex::new(PlaybackSurface::new(
            Box::new(ScriptedMedia::default()),
            &PlaybackConfig::default(),
        )));
        (SiteApp::with_parts(SiteConfig::default(), audio, surface), played)
    }

    #[test]
    fn test_scroll_and_newsletter() {
        let (mut app, played) = app(false);

        assert!(app.apply(PageCommand::Scroll(500.0)));
        assert!(app.page.scroll.is_visible());

        assert!(app.apply(PageCommand::Subscribe("nope".to_string())));
        assert_eq!(app.page.newsletter.state(), &SignupState::Idle);
        assert!(played.lock().is_empty());

        assert!(app.apply(PageCommand::Subscribe("captain@example.com".to_string())));
        assert!(matches!(
            app.page.newsletter.state(),
            SignupState::Submitted { .. }
        ));
        assert_eq!(*played.lock(), vec![PathBuf::from("sounds/powerup.mp3")]);

        app.apply(PageCommand::ResetForm);
        assert_eq!(app.page.newsletter.state(), &SignupState::Idle);
    }

    #[test]
    fn test_mute_commands_gate_cues() {
        let (mut app, played) = app(false);
        app.apply(PageCommand::Mute);
        app.apply(PageCommand::Cue("click".to_string()));
        assert!(played.lock().is_empty());

        app.apply(PageCommand::ToggleMute);
        app.apply(PageCommand::Cue("click".to_string()));
        app.apply(PageCommand::Cue("unknown".to_string()));
        assert_eq!(played.lock().len(), 1);
    }

    #[test]
    fn test_tv_commands_and_quit() {
        let (mut app, _played) = app(true);
        app.apply(PageCommand::Play);
        assert_eq!(app.surface.lock().state(), PlaybackState::Booting);
        app.surface.lock().update(Duration::from_secs(5));
        assert_eq!(app.surface.lock().state(), PlaybackState::Playing);

        app.apply(PageCommand::ToggleTv);
        assert_eq!(app.surface.lock().state(), PlaybackState::Paused);
        app.apply(PageCommand::Status);

        assert!(!app.apply(PageCommand::Quit));
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_drive_surface() {
        let (app, _played) = app(true);
        app.surface.lock().start();
        let frames = tokio::spawn(drive_surface(Arc::clone(&app.surface)));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(app.surface.lock().state(), PlaybackState::Playing);
        frames.abort();
    }
}
