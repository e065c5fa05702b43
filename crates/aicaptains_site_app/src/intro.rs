// SPDX-License-Identifier: MIT OR Apache-2.0
//! Intro view hosting the stage sequencer.
//!
//! The view owns the [`Sequencer`] for as long as it is mounted and reacts
//! to stage changes: it plays the stage's sound cue and powers on the retro
//! TV when the "ready" stage arrives. Every entered stage is handled, also
//! when several deadlines pass before the reactor gets to run.

use crate::audio::{AudioHandle, SoundCue};
use crate::config::SiteConfig;
use crate::playback::PlaybackSurface;
use aicaptains_site_sequencer::{Sequencer, SequencerError, Stage};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Shared handle to the retro TV
pub type SurfaceHandle = Arc<Mutex<PlaybackSurface>>;

/// How the intro ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroOutcome {
    /// The terminal stage was reached
    Completed,
    /// Shutdown was requested first
    Interrupted,
}

/// Sound cue voiced when a stage is entered
pub fn stage_cue(stage: Stage) -> Option<SoundCue> {
    match stage {
        Stage::Intro => Some(SoundCue::Boot),
        Stage::Navigate => Some(SoundCue::Whoosh),
        Stage::Obstacles => Some(SoundCue::Obstacle),
        Stage::Transform => Some(SoundCue::Powerup),
        Stage::Final => Some(SoundCue::Blip),
        Stage::Ready => Some(SoundCue::Ready),
        Stage::Black | Stage::Complete => None,
    }
}

/// React to a stage: voice its cue, power on the TV when ready
fn react(stage: Stage, audio: &AudioHandle, surface: &SurfaceHandle) {
    if let Some(cue) = stage_cue(stage) {
        audio.play_cue(cue);
    }
    if stage == Stage::Ready {
        surface.lock().start();
    }
}

/// The mounted intro
pub struct IntroView {
    sequencer: Option<Sequencer>,
    reactor: Option<JoinHandle<()>>,
    done: Option<oneshot::Receiver<()>>,
}

impl IntroView {
    /// Mount the intro and start sequencing
    pub fn mount(
        config: &SiteConfig,
        audio: AudioHandle,
        surface: SurfaceHandle,
    ) -> Result<Self, SequencerError> {
        let (done_tx, done_rx) = oneshot::channel();
        let sequencer = Sequencer::start(config.schedule.clone(), config.skip_intro, move || {
            // Receiver is gone if the view was unmounted first
            done_tx.send(()).ok();
        })?;

        // A skipped intro has already finished; there is nothing to voice.
        let reactor = if sequencer.is_complete() {
            None
        } else {
            let mut entered = sequencer.entered();
            Some(tokio::spawn(async move {
                while let Some(stage) = entered.recv().await {
                    react(stage, &audio, &surface);
                }
            }))
        };

        tracing::info!(stage = %sequencer.current(), "Intro mounted");

        Ok(Self {
            sequencer: Some(sequencer),
            reactor,
            done: Some(done_rx),
        })
    }

    /// Current stage, `None` once unmounted
    pub fn stage(&self) -> Option<Stage> {
        self.sequencer.as_ref().map(Sequencer::current)
    }

    /// Wait for the intro to finish or for `shutdown` to resolve
    pub async fn run_until_complete<S>(&mut self, shutdown: S) -> IntroOutcome
    where
        S: Future<Output = ()>,
    {
        let Some(done) = self.done.take() else {
            return IntroOutcome::Completed;
        };

        tokio::select! {
            result = done => match result {
                Ok(()) => IntroOutcome::Completed,
                // Sender dropped without firing: torn down before the end
                Err(_) => IntroOutcome::Interrupted,
            },
            () = shutdown => IntroOutcome::Interrupted,
        }
    }

    /// Tear down the sequencer and stop reacting
    pub fn unmount(&mut self) {
        if let Some(sequencer) = self.sequencer.take() {
            sequencer.teardown();
        }
        if let Some(reactor) = self.reactor.take() {
            reactor.abort();
        }
    }
}

impl Drop for IntroView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::recording_signal;
    use crate::playback::testing::ScriptedMedia;
    use crate::playback::{PlaybackConfig, PlaybackState};
    use aicaptains_site_sequencer::{Schedule, ScheduleEntry};
    use std::path::PathBuf;
    use std::time::Duration;

    fn short_config(skip: bool) -> SiteConfig {
        SiteConfig {
            skip_intro: skip,
            schedule: Schedule::new(vec![
                ScheduleEntry::new(Stage::Black, 0),
                ScheduleEntry::new(Stage::Intro, 100),
                ScheduleEntry::new(Stage::Ready, 200),
                ScheduleEntry::new(Stage::Complete, 300),
            ])
            .unwrap(),
            ..SiteConfig::default()
        }
    }

    fn surface() -> SurfaceHandle {
        Arc::new(Mutex::new(PlaybackSurface::new(
            Box::new(ScriptedMedia::default()),
            &PlaybackConfig::default(),
        )))
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_stage_cues() {
        assert_eq!(stage_cue(Stage::Black), None);
        assert_eq!(stage_cue(Stage::Intro), Some(SoundCue::Boot));
        assert_eq!(stage_cue(Stage::Ready), Some(SoundCue::Ready));
        assert_eq!(stage_cue(Stage::Complete), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intro_plays_cues_and_completes() {
        let (audio, played) = recording_signal(false);
        let surface = surface();
        let mut view = IntroView::mount(&short_config(false), audio, Arc::clone(&surface)).unwrap();

        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(view.stage(), Some(Stage::Intro));
        assert_eq!(*played.lock(), vec![PathBuf::from("sounds/boot.mp3")]);

        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(surface.lock().state(), PlaybackState::Booting);

        let outcome = view.run_until_complete(std::future::pending()).await;
        assert_eq!(outcome, IntroOutcome::Completed);
        assert_eq!(view.stage(), Some(Stage::Complete));
        assert_eq!(played.lock().len(), 2);

        view.unmount();
        assert_eq!(view.stage(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stages_passed_in_one_step_are_handled() {
        let (audio, played) = recording_signal(false);
        let surface = surface();
        let view = IntroView::mount(&short_config(false), audio, Arc::clone(&surface)).unwrap();

        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(view.stage(), Some(Stage::Complete));
        assert_eq!(surface.lock().state(), PlaybackState::Booting);
        assert_eq!(
            *played.lock(),
            vec![PathBuf::from("sounds/boot.mp3"), PathBuf::from("sounds/ready.mp3")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_muted_intro_is_silent() {
        let (audio, played) = recording_signal(true);
        let mut view = IntroView::mount(&short_config(false), audio, surface()).unwrap();
        let outcome = view.run_until_complete(std::future::pending()).await;
        assert_eq!(outcome, IntroOutcome::Completed);
        assert!(played.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_skipped_intro_completes_at_once() {
        let (audio, played) = recording_signal(false);
        let mut view = IntroView::mount(&short_config(true), audio, surface()).unwrap();
        assert_eq!(view.stage(), Some(Stage::Complete));

        let outcome = view.run_until_complete(std::future::pending()).await;
        assert_eq!(outcome, IntroOutcome::Completed);
        assert!(played.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts() {
        let (audio, played) = recording_signal(false);
        let mut view = IntroView::mount(&short_config(false), audio, surface()).unwrap();

        let outcome = view.run_until_complete(std::future::ready(())).await;
        assert_eq!(outcome, IntroOutcome::Interrupted);
        view.unmount();

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert!(played.lock().is_empty());
    }
}
