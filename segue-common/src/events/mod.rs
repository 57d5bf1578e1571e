//! Event types emitted by the playback engine
//!
//! The engine is tick driven and never blocks, so events are pushed into an
//! unbounded channel owned by the caller. Every variant serializes to a tagged
//! JSON object for logging or forwarding.

mod playback_types;

pub use playback_types::{PlaybackState, PlayerWarning, TransitionCause};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Segue player events
///
/// `engine_time` is the engine clock in seconds: the sum of every `delta`
/// passed to `update()` so far.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Transport state of the active buffer changed
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        engine_time: f64,
    },

    /// Playlist index changed and the new track was loaded into the idle buffer
    TrackChanged {
        track_id: Uuid,
        index: usize,
        previous_index: usize,
        cause: TransitionCause,
        engine_time: f64,
    },

    /// A crossfade session started
    CrossfadeStarted {
        incoming_track_id: Option<Uuid>,
        duration_seconds: f64,
        engine_time: f64,
    },

    /// A crossfade in flight was superseded by a newer transition request
    CrossfadeCancelled { elapsed_seconds: f64, engine_time: f64 },

    /// The crossfade finished and the buffer roles swapped
    CrossfadeCompleted {
        active_track_id: Option<Uuid>,
        engine_time: f64,
    },

    /// The loop region rewound the active buffer
    LoopRewound {
        from_sample: u64,
        to_sample: u64,
        engine_time: f64,
    },

    /// Non-fatal developer-facing warning
    Warning { warning: PlayerWarning, engine_time: f64 },
}

impl PlayerEvent {
    /// Short name of the variant, useful for log lines
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::TrackChanged { .. } => "TrackChanged",
            PlayerEvent::CrossfadeStarted { .. } => "CrossfadeStarted",
            PlayerEvent::CrossfadeCancelled { .. } => "CrossfadeCancelled",
            PlayerEvent::CrossfadeCompleted { .. } => "CrossfadeCompleted",
            PlayerEvent::LoopRewound { .. } => "LoopRewound",
            PlayerEvent::Warning { .. } => "Warning",
        }
    }
}
