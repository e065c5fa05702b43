// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timer driven sequencer with teardown.
//!
//! Every schedule entry becomes one deferred tokio task that sleeps until
//! `start + offset` and then advances the shared [`Timeline`] through its
//! index. The task handles are owned by the [`Sequencer`]; teardown (or
//! drop) cancels the timeline and aborts the handles in one pass.

use crate::schedule::Schedule;
use crate::stage::Stage;
use crate::timeline::Timeline;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// Sequencer errors
#[derive(Debug, Error)]
pub enum SequencerError {
    /// Timers need a tokio runtime
    #[error("No tokio runtime available to schedule stage timers")]
    NoRuntime,
}

/// Unique identifier for a sequencer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequencerId(pub Uuid);

impl SequencerId {
    /// Create a new random sequencer ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SequencerId {
    fn default() -> Self {
        Self::new()
    }
}

type CompletionHandler = Box<dyn FnOnce() + Send + 'static>;

/// State shared between the sequencer and its timer tasks
struct Shared {
    timeline: Timeline,
    history: Vec<Stage>,
    stage_tx: watch::Sender<Stage>,
    entered_txs: Vec<mpsc::UnboundedSender<Stage>>,
    on_complete: Option<CompletionHandler>,
}

impl Shared {
    /// Record entered stages and hand back the completion handler once the
    /// terminal stage is reached.
    fn record(&mut self, id: SequencerId, entered: &[Stage]) -> Option<CompletionHandler> {
        let &last = entered.last()?;
        for stage in entered {
            tracing::debug!(sequencer = %id.0, %stage, "Entered stage");
        }
        self.history.extend_from_slice(entered);
        self.stage_tx.send_replace(last);
        self.entered_txs
            .retain(|tx| entered.iter().all(|&stage| tx.send(stage).is_ok()));

        if self.timeline.is_complete() {
            self.on_complete.take()
        } else {
            None
        }
    }
}

/// Drives a [`Schedule`] in real (or paused tokio) time.
pub struct Sequencer {
    id: SequencerId,
    shared: Arc<Mutex<Shared>>,
    stage_rx: watch::Receiver<Stage>,
    tasks: Vec<JoinHandle<()>>,
}

impl Sequencer {
    /// Start sequencing `schedule`.
    ///
    /// With `skip` set no timers are registered: the state jumps to the
    /// terminal stage and `on_complete` runs before this returns. Otherwise
    /// one task per entry is spawned on the current tokio runtime.
    pub fn start<F>(schedule: Schedule, skip: bool, on_complete: F) -> Result<Self, SequencerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = SequencerId::new();
        let (stage_tx, stage_rx) = watch::channel(schedule.first());
        let shared = Arc::new(Mutex::new(Shared {
            timeline: Timeline::new(schedule),
            history: Vec::new(),
            stage_tx,
            entered_txs: Vec::new(),
            on_complete: Some(Box::new(on_complete)),
        }));

        if skip {
            let completion = {
                let mut guard = shared.lock();
                let entered: Vec<Stage> = guard.timeline.skip_to_end().into_iter().collect();
                guard.record(id, &entered)
            };
            tracing::info!(sequencer = %id.0, "Intro skipped");
            if let Some(on_complete) = completion {
                on_complete();
            }
            return Ok(Self {
                id,
                shared,
                stage_rx,
                tasks: Vec::new(),
            });
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SequencerError::NoRuntime)?;
        let started = Instant::now();
        let entries = shared.lock().timeline.schedule().entries().to_vec();

        let tasks = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let shared = Arc::clone(&shared);
                let deadline = started + entry.offset();
                runtime.spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    fire(id, &shared, index);
                })
            })
            .collect();

        tracing::info!(sequencer = %id.0, stages = entries.len(), "Sequencer started");

        Ok(Self {
            id,
            shared,
            stage_rx,
            tasks,
        })
    }

    /// Instance ID
    pub fn id(&self) -> SequencerId {
        self.id
    }

    /// Currently active stage
    pub fn current(&self) -> Stage {
        *self.stage_rx.borrow()
    }

    /// Receiver that observes every change of the current stage
    pub fn subscribe(&self) -> watch::Receiver<Stage> {
        self.stage_rx.clone()
    }

    /// Receiver yielding every entered stage exactly once, in order.
    ///
    /// Stages entered before the call are queued first. Unlike
    /// [`subscribe`](Self::subscribe), nothing is coalesced when several
    /// transitions land in one step. The stream ends once the sequencer
    /// and its timers are gone.
    pub fn entered(&self) -> mpsc::UnboundedReceiver<Stage> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = self.shared.lock();
        for &stage in &shared.history {
            // Receiver is held right here
            let _ = tx.send(stage);
        }
        shared.entered_txs.push(tx);
        rx
    }

    /// Stages entered so far, in order
    pub fn history(&self) -> Vec<Stage> {
        self.shared.lock().history.clone()
    }

    /// Whether the terminal stage has been entered
    pub fn is_complete(&self) -> bool {
        self.shared.lock().timeline.is_complete()
    }

    /// Cancel all pending transitions and release the timers.
    ///
    /// No stage transition happens after this returns. A completion handler
    /// that was already taken by a timer firing concurrently on another
    /// worker may still be running.
    pub fn teardown(self) {
        tracing::info!(sequencer = %self.id.0, "Sequencer torn down");
    }

    fn cancel_pending(&mut self) {
        // Cancel under the lock first so a task that already woke up cannot
        // transition after this returns.
        self.shared.lock().timeline.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("id", &self.id)
            .field("current", &self.current())
            .field("pending_tasks", &self.tasks.iter().filter(|t| !t.is_finished()).count())
            .finish()
    }
}

/// Timer callback for the entry at `index`
fn fire(id: SequencerId, shared: &Mutex<Shared>, index: usize) {
    let completion = {
        let mut guard = shared.lock();
        let entered = guard.timeline.advance_through(index);
        guard.record(id, &entered)
    };

    if let Some(on_complete) = completion {
        tracing::info!(sequencer = %id.0, "Sequence complete");
        on_complete();
    }
}
