//! Playback-related type definitions
//!
//! Supporting types carried by [`super::PlayerEvent`].

use crate::asset_advice::{AssetSizeAdvice, LoadStrategy};
use serde::{Deserialize, Serialize};

/// Transport state of the active buffer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Stopped => write!(f, "stopped"),
        }
    }
}

/// What caused a track transition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// Caller invoked next()
    Next,
    /// Caller invoked prev()
    Prev,
    /// Repeat-playlist trigger near the end of a forward-playing track
    AutoAdvance,
    /// Repeat-playlist trigger near the start of a reverse-playing track
    AutoReverse,
}

impl std::fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionCause::Next => write!(f, "next"),
            TransitionCause::Prev => write!(f, "prev"),
            TransitionCause::AutoAdvance => write!(f, "auto_advance"),
            TransitionCause::AutoReverse => write!(f, "auto_reverse"),
        }
    }
}

/// Advisory, non-fatal misconfiguration reported on the event channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerWarning {
    /// Loop start was after loop end; the bounds were swapped
    LoopBoundsSwapped { start_seconds: f64, end_seconds: f64 },
    /// A configured value fell outside its range and was clamped
    ValueClamped {
        field: String,
        requested: f64,
        applied: f64,
    },
    /// An added asset's load strategy does not fit its size
    AssetLoadStrategy {
        asset_name: String,
        size_mib: f64,
        current: LoadStrategy,
        recommended: LoadStrategy,
    },
}

impl From<AssetSizeAdvice> for PlayerWarning {
    fn from(advice: AssetSizeAdvice) -> Self {
        PlayerWarning::AssetLoadStrategy {
            asset_name: advice.asset_name,
            size_mib: advice.size_mib,
            current: advice.current,
            recommended: advice.recommended,
        }
    }
}
