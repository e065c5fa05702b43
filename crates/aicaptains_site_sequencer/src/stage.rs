// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named phases of the intro presentation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named phase of the intro timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Blank screen before anything is shown
    Black,
    /// Title card and boot sound
    Intro,
    /// Ship navigates the starfield
    Navigate,
    /// Obstacles fly past
    Obstacles,
    /// Ship powers up
    Transform,
    /// Final reveal
    Final,
    /// "Ready" prompt
    Ready,
    /// Intro finished, hand over to the page
    Complete,
}

impl Stage {
    /// All stages in presentation order
    pub const ALL: [Stage; 8] = [
        Stage::Black,
        Stage::Intro,
        Stage::Navigate,
        Stage::Obstacles,
        Stage::Transform,
        Stage::Final,
        Stage::Ready,
        Stage::Complete,
    ];

    /// Get the lowercase stage name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Intro => "intro",
            Self::Navigate => "navigate",
            Self::Obstacles => "obstacles",
            Self::Transform => "transform",
            Self::Final => "final",
            Self::Ready => "ready",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serde() {
        for stage in Stage::ALL {
            let ron_str = ron::to_string(&stage).unwrap();
            assert_eq!(ron_str, stage.name());
            let loaded: Stage = ron::from_str(&ron_str).unwrap();
            assert_eq!(loaded, stage);
            assert_eq!(stage.to_string(), stage.name());
        }
    }

    #[test]
    fn test_order_follows_presentation() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
    }
}
