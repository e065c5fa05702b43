// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visitor commands for the interactive page loop.
//!
//! Each input line is one command:
//!
//! | Line | Effect |
//! |------|--------|
//! | `scroll <px>` | Report the page scroll offset |
//! | `subscribe <email>` | Submit the newsletter form |
//! | `reset-form` | Clear the newsletter form |
//! | `mute` / `unmute` / `toggle-mute` | Change the mute flag |
//! | `cue <name>` | Play a sound cue by name |
//! | `play` / `pause` / `tv` | Control the retro TV |
//! | `status` | Log the page state |
//! | `quit` | Leave the page |

use std::str::FromStr;
use thiserror::Error;

/// Command parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// First word is not a command
    #[error("Unknown command: {0}")]
    Unknown(String),

    /// A required argument is absent
    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),

    /// An argument could not be parsed
    #[error("Invalid argument for {command}: {value}")]
    InvalidArgument {
        /// Command name
        command: &'static str,
        /// Offending text
        value: String,
    },
}

/// A visitor action on the page
#[derive(Debug, Clone, PartialEq)]
pub enum PageCommand {
    /// Page scrolled to an offset in pixels
    Scroll(f32),
    /// Newsletter submitted with this address
    Subscribe(String),
    /// Newsletter form cleared
    ResetForm,
    /// Mute sound
    Mute,
    /// Unmute sound
    Unmute,
    /// Flip mute
    ToggleMute,
    /// Play a sound cue by name
    Cue(String),
    /// Start or resume the TV
    Play,
    /// Pause the TV
    Pause,
    /// Toggle the TV
    ToggleTv,
    /// Report page state
    Status,
    /// Leave
    Quit,
}

impl FromStr for PageCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "scroll" => {
                let offset = required("scroll", rest)?;
                let offset = offset.parse::<f32>().map_err(|_| CommandError::InvalidArgument {
                    command: "scroll",
                    value: offset.to_string(),
                })?;
                PageCommand::Scroll(offset)
            }
            "subscribe" => PageCommand::Subscribe(required("subscribe", rest)?.to_string()),
            "reset-form" => PageCommand::ResetForm,
            "mute" => PageCommand::Mute,
            "unmute" => PageCommand::Unmute,
            "toggle-mute" => PageCommand::ToggleMute,
            "cue" => PageCommand::Cue(required("cue", rest)?.to_string()),
            "play" => PageCommand::Play,
            "pause" => PageCommand::Pause,
            "tv" => PageCommand::ToggleTv,
            "status" => PageCommand::Status,
            "quit" | "exit" => PageCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}
