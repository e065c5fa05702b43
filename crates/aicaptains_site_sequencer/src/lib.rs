// SPDX-License-Identifier: MIT OR Apache-2.0
//! Intro timeline sequencer for the AI Captains site.
//!
//! This crate drives the scripted intro presentation:
//! - A fixed set of named stages
//! - Validated schedules pairing each stage with a start offset
//! - A pure timeline state machine that only moves forward
//! - A timer driven sequencer with cancellation on teardown
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - [`Timeline`] for the forward-only cursor over a [`Schedule`]
//! - One tokio task per schedule entry, all owned by the [`Sequencer`]
//! - A `watch` channel so passive readers can follow the current stage

pub mod stage;
pub mod schedule;
pub mod timeline;
pub mod sequencer;

pub use stage::Stage;
pub use schedule::{Schedule, ScheduleEntry, ScheduleError};
pub use timeline::Timeline;
pub use sequencer::{Sequencer, SequencerError, SequencerId};
