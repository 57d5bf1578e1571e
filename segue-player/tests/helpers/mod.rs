//! Shared fixtures for segue-player integration tests

#![allow(dead_code)]

use segue_common::{PlayerEvent, PlayerSettings};
use segue_player::playback::{PlaylistState, SimulatedHandle, Track};
use segue_player::PlaybackEngine;
use tokio::sync::mpsc;

pub const SAMPLE_RATE: u32 = 44_100;

/// 10 Hz driver tick used by most scenarios
pub const TICK: f64 = 0.1;

pub type TestEngine = PlaybackEngine<SimulatedHandle>;

/// `count` tracks of `duration` seconds at 44.1 kHz
pub fn make_tracks(count: usize, duration: f64) -> Vec<Track> {
    (0..count)
        .map(|i| Track::new(format!("track-{}", i), duration, SAMPLE_RATE).unwrap())
        .collect()
}

/// Settings with instant ramps so only the crossfade shapes volumes
pub fn instant_settings(fade_seconds: f64) -> PlayerSettings {
    PlayerSettings {
        volume_ramp_seconds: 0.0,
        playback_rate_ramp_seconds: 0.0,
        fade_seconds,
        ..PlayerSettings::default()
    }
}

/// Engine over a seeded playlist
pub fn make_engine(settings: PlayerSettings, tracks: Vec<Track>) -> TestEngine {
    PlaybackEngine::with_playlist(
        settings,
        SimulatedHandle::new("slot-a"),
        SimulatedHandle::new("slot-b"),
        PlaylistState::with_rng_seed(tracks, 0x5e6e),
    )
}

/// Engine with an attached event channel
pub fn make_engine_with_events(
    settings: PlayerSettings,
    tracks: Vec<Track>,
) -> (TestEngine, mpsc::UnboundedReceiver<PlayerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut engine = make_engine(settings, tracks);
    engine.set_event_channel(tx);
    (engine, rx)
}

/// Everything currently queued on the channel
pub fn drain(rx: &mut mpsc::UnboundedReceiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Tick until `condition` holds; returns the number of ticks taken
pub fn tick_until(
    engine: &mut TestEngine,
    max_ticks: usize,
    mut condition: impl FnMut(&TestEngine) -> bool,
) -> Option<usize> {
    for tick in 1..=max_ticks {
        engine.update(TICK);
        if condition(engine) {
            return Some(tick);
        }
    }
    None
}
