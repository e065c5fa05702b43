// SPDX-License-Identifier: MIT OR Apache-2.0
//! Schedules pairing stages with start offsets.

use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Schedule validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// No entries at all
    #[error("Schedule has no entries")]
    Empty,

    /// Offsets are not strictly increasing
    #[error("Stage {stage} at {offset_ms}ms does not come after {previous_ms}ms")]
    OutOfOrder {
        /// The offending stage
        stage: Stage,
        /// Its offset
        offset_ms: u64,
        /// Offset of the entry before it
        previous_ms: u64,
    },

    /// A stage appears twice
    #[error("Stage {0} is scheduled more than once")]
    RepeatedStage(Stage),
}

/// A stage and the offset from sequence start at which it begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Stage entered at this point
    pub stage: Stage,
    /// Milliseconds from sequence start
    pub offset_ms: u64,
}

impl ScheduleEntry {
    /// Create an entry
    pub const fn new(stage: Stage, offset_ms: u64) -> Self {
        Self { stage, offset_ms }
    }

    /// Offset as a duration
    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.offset_ms)
    }
}

/// An ordered, validated list of schedule entries.
///
/// Entries are never sorted here: input that is not already in strictly
/// increasing offset order is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ScheduleEntry>", into = "Vec<ScheduleEntry>")]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Validate and build a schedule
    pub fn new(entries: Vec<ScheduleEntry>) -> Result<Self, ScheduleError> {
        if entries.is_empty() {
            return Err(ScheduleError::Empty);
        }

        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.stage == entry.stage) {
                return Err(ScheduleError::RepeatedStage(entry.stage));
            }
            if i > 0 && entry.offset_ms <= entries[i - 1].offset_ms {
                return Err(ScheduleError::OutOfOrder {
                    stage: entry.stage,
                    offset_ms: entry.offset_ms,
                    previous_ms: entries[i - 1].offset_ms,
                });
            }
        }

        Ok(Self { entries })
    }

    /// The schedule played by the landing page intro
    pub fn intro() -> Self {
        Self {
            entries: vec![
                ScheduleEntry::new(Stage::Black, 0),
                ScheduleEntry::new(Stage::Intro, 500),
                ScheduleEntry::new(Stage::Navigate, 3000),
                ScheduleEntry::new(Stage::Obstacles, 6000),
                ScheduleEntry::new(Stage::Transform, 9000),
                ScheduleEntry::new(Stage::Final, 12000),
                ScheduleEntry::new(Stage::Ready, 15000),
                ScheduleEntry::new(Stage::Complete, 17000),
            ],
        }
    }

    /// All entries in order
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Get an entry by position
    pub fn get(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    /// First stage of the schedule
    pub fn first(&self) -> Stage {
        self.entries[0].stage
    }

    /// Last stage of the schedule
    pub fn terminal(&self) -> Stage {
        self.entries[self.entries.len() - 1].stage
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offset of the terminal stage
    pub fn total_duration(&self) -> Duration {
        self.entries[self.entries.len() - 1].offset()
    }

    /// Position of the last entry whose offset has elapsed
    pub fn index_at(&self, elapsed: Duration) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|e| e.offset() <= elapsed)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::intro()
    }
}

impl TryFrom<Vec<ScheduleEntry>> for Schedule {
    type Error = ScheduleError;

    fn try_from(entries: Vec<ScheduleEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Schedule> for Vec<ScheduleEntry> {
    fn from(schedule: Schedule) -> Self {
        schedule.entries
    }
}
