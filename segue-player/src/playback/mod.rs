//! Playlist playback engine and its building blocks

pub mod crossfade;
pub mod engine;
pub mod loop_region;
pub mod playlist;
pub mod ramp;
pub mod sim;
pub mod track;

pub use crossfade::{CrossfadeScheduler, CrossfadeSession, CrossfadeState};
pub use engine::PlaybackEngine;
pub use loop_region::LoopRegion;
pub use playlist::{PlaylistState, PLAY_HISTORY_CAPACITY};
pub use ramp::RampController;
pub use sim::SimulatedHandle;
pub use track::{Track, TrackHandle};
