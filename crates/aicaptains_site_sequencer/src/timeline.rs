// SPDX-License-Identifier: MIT OR Apache-2.0
//! Forward-only cursor over a schedule.
//!
//! [`Timeline`] holds no timers. Callers tell it how far the presentation
//! has progressed, either by schedule index (the timer tasks of
//! [`crate::Sequencer`]) or by elapsed time (a frame loop), and it reports
//! the stages entered along the way.

use crate::schedule::Schedule;
use crate::stage::Stage;
use std::time::Duration;

/// Forward-only stage state machine
#[derive(Debug, Clone)]
pub struct Timeline {
    schedule: Schedule,
    /// Index of the last entered entry, `None` before the first transition
    cursor: Option<usize>,
    cancelled: bool,
}

impl Timeline {
    /// Create a timeline positioned before its first entry
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            cursor: None,
            cancelled: false,
        }
    }

    /// The schedule being walked
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Current stage. Before the first transition this is the first stage.
    pub fn current(&self) -> Stage {
        match self.cursor {
            Some(index) => self.schedule.entries()[index].stage,
            None => self.schedule.first(),
        }
    }

    /// Index of the last entered entry
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Whether the terminal stage has been entered
    pub fn is_complete(&self) -> bool {
        self.cursor == Some(self.schedule.len() - 1)
    }

    /// Whether the timeline was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether further transitions are possible
    pub fn is_inert(&self) -> bool {
        self.cancelled || self.is_complete()
    }

    /// Move forward through `index`, returning every stage entered in order.
    ///
    /// Indices at or behind the cursor enter nothing, so a late timer for an
    /// earlier entry is a no-op.
    pub fn advance_through(&mut self, index: usize) -> Vec<Stage> {
        if self.is_inert() {
            return Vec::new();
        }

        let target = index.min(self.schedule.len() - 1);
        let from = self.cursor.map_or(0, |c| c + 1);
        if target < from {
            return Vec::new();
        }

        self.cursor = Some(target);
        self.schedule.entries()[from..=target]
            .iter()
            .map(|e| e.stage)
            .collect()
    }

    /// Enter every stage whose offset lies within `elapsed`
    pub fn advance_to(&mut self, elapsed: Duration) -> Vec<Stage> {
        match self.schedule.index_at(elapsed) {
            Some(index) => self.advance_through(index),
            None => Vec::new(),
        }
    }

    /// Jump straight to the terminal stage without entering the others.
    ///
    /// Returns the terminal stage if the jump happened.
    pub fn skip_to_end(&mut self) -> Option<Stage> {
        if self.is_inert() {
            return None;
        }
        self.cursor = Some(self.schedule.len() - 1);
        Some(self.schedule.terminal())
    }

    /// Stop all further transitions
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Offset of the next entry still to be entered
    pub fn next_offset(&self) -> Option<Duration> {
        if self.is_inert() {
            return None;
        }
        let next = self.cursor.map_or(0, |c| c + 1);
        self.schedule.get(next).map(|e| e.offset())
    }
}
