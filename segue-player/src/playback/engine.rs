//! Playback engine orchestration
//!
//! Owns the playlist, the two buffer slots and every per-tick controller.
//! The caller drives it by calling [`PlaybackEngine::update`] with the time
//! elapsed since the previous call; nothing here blocks or spawns.
//!
//! Per-tick order:
//! 1. start delay countdown
//! 2. backend clocks advance
//! 3. volume and rate ramps on the active slot
//! 4. loop region
//! 5. repeat-track looping
//! 6. crossfade step and role swap
//! 7. repeat-playlist trigger

use super::crossfade::{CrossfadeScheduler, CrossfadeSession, CrossfadeState};
use super::loop_region::LoopRegion;
use super::playlist::PlaylistState;
use super::ramp::RampController;
use super::sim::SimulatedHandle;
use super::track::{samples_to_seconds, seconds_to_samples, Track, TrackHandle};
use segue_common::events::{PlaybackState, PlayerWarning, TransitionCause};
use segue_common::{FadeCurve, PlayerEvent, PlayerSettings, RepeatMode};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Continuous playlist player over two backend slots
pub struct PlaybackEngine<H: TrackHandle> {
    settings: PlayerSettings,

    /// Fixed pair of playback units; `primary` indexes the active one
    slots: [H; 2],
    primary: usize,

    playlist: PlaylistState,
    loop_region: LoopRegion,
    crossfade: CrossfadeScheduler,
    volume_ramp: RampController,
    rate_ramp: RampController,

    paused: bool,

    /// Seek requested before any clip was loaded
    pending_seek: Option<f64>,

    /// Set when repeat-playlist fires, cleared when the resulting fade completes
    auto_advance_latched: bool,

    /// Remaining delay before `play_on_start` takes effect
    start_delay_remaining: Option<f64>,

    /// Last observed playback direction (reverse rendering is not implemented)
    reverse: bool,

    last_state: PlaybackState,

    /// Sum of all `update()` deltas
    engine_time: f64,

    event_tx: Option<mpsc::UnboundedSender<PlayerEvent>>,

    /// Warnings raised before an event channel was attached
    unsent_warnings: Vec<PlayerWarning>,
}

impl PlaybackEngine<SimulatedHandle> {
    /// Engine over two [`SimulatedHandle`]s
    pub fn simulated(settings: PlayerSettings, tracks: Vec<Track>) -> Self {
        Self::new(
            settings,
            SimulatedHandle::new("slot-a"),
            SimulatedHandle::new("slot-b"),
            tracks,
        )
    }
}

impl<H: TrackHandle> PlaybackEngine<H> {
    /// Create an engine with an entropy-seeded playlist
    pub fn new(settings: PlayerSettings, primary: H, secondary: H, tracks: Vec<Track>) -> Self {
        Self::with_playlist(settings, primary, secondary, PlaylistState::new(tracks))
    }

    /// Create an engine around an existing playlist
    ///
    /// Settings are clamped into range; warnings are logged and replayed once
    /// an event channel is attached.
    pub fn with_playlist(
        settings: PlayerSettings,
        primary: H,
        secondary: H,
        playlist: PlaylistState,
    ) -> Self {
        let mut engine = Self {
            volume_ramp: RampController::volume(settings.volume_ramp_seconds),
            rate_ramp: RampController::rate(settings.playback_rate_ramp_seconds),
            crossfade: CrossfadeScheduler::new(settings.fade_curve),
            settings: PlayerSettings::default(),
            slots: [primary, secondary],
            primary: 0,
            playlist,
            loop_region: LoopRegion::new(),
            paused: false,
            pending_seek: None,
            auto_advance_latched: false,
            start_delay_remaining: None,
            reverse: false,
            last_state: PlaybackState::Stopped,
            engine_time: 0.0,
            event_tx: None,
            unsent_warnings: Vec::new(),
        };
        engine.apply_settings(settings);

        info!(
            "Playback engine created: {} tracks, repeat={:?}, shuffle={}, fade={:.2}s",
            engine.playlist.len(),
            engine.settings.repeat_mode,
            engine.settings.shuffle,
            engine.settings.fade_seconds
        );

        engine
    }

    /// Attach the event channel; replays warnings raised during construction
    pub fn set_event_channel(&mut self, tx: mpsc::UnboundedSender<PlayerEvent>) {
        self.event_tx = Some(tx);
        for warning in std::mem::take(&mut self.unsent_warnings) {
            self.emit_warning(warning);
        }
    }

    /// Load the current track into the active slot and honour `play_on_start`
    pub fn start(&mut self) {
        if let Some(track) = self.playlist.current().cloned() {
            if self.slots[self.primary].clip().is_none() {
                self.load_primary(track);
            }
        }

        if !self.settings.play_on_start {
            return;
        }

        if self.settings.start_delay_seconds > 0.0 {
            info!(
                "Playback will start in {:.2}s",
                self.settings.start_delay_seconds
            );
            self.start_delay_remaining = Some(self.settings.start_delay_seconds);
        } else {
            self.play();
        }
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Resume if paused, otherwise restart the current track from the top.
    ///
    /// No-op on an empty playlist or while a crossfade is in flight.
    pub fn play(&mut self) {
        let Some(current) = self.playlist.current().cloned() else {
            debug!("Play requested on empty playlist, ignoring");
            return;
        };

        if self.paused {
            self.paused = false;
            for slot in self.slots.iter_mut() {
                slot.unpause();
            }
            info!("Playback resumed");
            self.sync_state();
            return;
        }

        if self.crossfade.is_fading() {
            debug!("Play requested during crossfade, ignoring");
            return;
        }

        let primary = self.primary;
        let loaded_id = self.slots[primary].clip().map(Track::id);
        if loaded_id == Some(current.id()) {
            self.slots[primary].set_position_samples(0);
        } else {
            self.load_primary(current);
        }
        self.slots[primary].play();

        info!(
            "Playing index {} ({})",
            self.playlist.current_index(),
            self.slots[primary].clip().map(Track::name).unwrap_or("-")
        );
        self.sync_state();
    }

    /// Pause every sounding slot (both during a crossfade)
    pub fn pause(&mut self) {
        if self.paused || !self.slots.iter().any(|s| s.is_playing()) {
            return;
        }

        for slot in self.slots.iter_mut() {
            slot.pause();
        }
        self.paused = true;
        info!("Playback paused");
        self.sync_state();
    }

    /// Halt both slots, cancel any crossfade and clear the paused flag
    pub fn stop(&mut self) {
        self.cancel_crossfade();
        self.auto_advance_latched = false;
        self.start_delay_remaining = None;
        self.paused = false;
        for slot in self.slots.iter_mut() {
            slot.stop();
        }
        info!("Playback stopped");
        self.sync_state();
    }

    /// Pause when playing, otherwise play
    pub fn play_pause(&mut self) {
        if self.playback_state() == PlaybackState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop, then play the current track from the beginning
    pub fn rewind(&mut self) {
        self.stop();
        self.play();
    }

    /// Crossfade into the next track
    pub fn next(&mut self) {
        self.transition(Direction::Forward, TransitionCause::Next);
    }

    /// Crossfade into the previous track (history first)
    pub fn prev(&mut self) {
        self.transition(Direction::Backward, TransitionCause::Prev);
    }

    /// Move the active slot to `seconds`, clamped to the track length.
    ///
    /// Without a loaded clip the request is kept and applied on the next load
    /// into the active slot.
    pub fn seek(&mut self, seconds: f64) {
        let seconds = if seconds.is_finite() { seconds } else { 0.0 };
        let slot = &mut self.slots[self.primary];

        match slot.clip().map(|c| (c.duration(), c.sample_rate())) {
            Some((duration, sample_rate)) => {
                let target = seconds.clamp(0.0, duration);
                slot.set_position_samples(seconds_to_samples(target, sample_rate));
                debug!("Seek to {:.3}s", target);
            }
            None => {
                debug!("Seek to {:.3}s deferred until a track is loaded", seconds);
                self.pending_seek = Some(seconds);
            }
        }
    }

    /// Loop the active track between `start_secs` and `end_secs`
    ///
    /// Ignored when no clip is loaded. Reversed bounds are swapped and a
    /// warning event is emitted.
    pub fn set_loop_back(&mut self, start_secs: f64, end_secs: f64) {
        let Some((duration, sample_rate)) = self.slots[self.primary]
            .clip()
            .map(|c| (c.duration(), c.sample_rate()))
        else {
            debug!("No track loaded, ignoring loop request");
            return;
        };

        if let Some(warning) = self.loop_region.set(start_secs, end_secs, duration, sample_rate) {
            self.emit_warning(warning);
        }
    }

    pub fn unset_loop_back(&mut self) {
        self.loop_region.unset();
        debug!("Loop region cleared");
    }

    pub fn is_loop_back_enabled(&self) -> bool {
        self.loop_region.is_enabled()
    }

    /// Append a track to the playlist
    ///
    /// A load strategy that does not fit the asset size is reported as a
    /// warning; the track is added regardless.
    pub fn add_track(&mut self, track: Track) {
        if let Some(advice) = track.load_advice() {
            warn!("{}", advice);
            self.emit_warning(advice.into());
        }
        self.playlist.add_track(track);
    }

    /// Remove a track by id; the current index is re-validated afterwards
    pub fn remove_track(&mut self, id: Uuid) -> Option<Track> {
        self.playlist.remove_track(id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Position of the active slot in seconds
    pub fn current_time(&self) -> f64 {
        let slot = self.primary();
        samples_to_seconds(slot.position_samples(), slot.sample_rate())
    }

    /// Length of the clip in the active slot (0 when empty)
    pub fn track_length(&self) -> f64 {
        self.primary().duration()
    }

    /// Whether the active slot is playing
    pub fn is_playing(&self) -> bool {
        self.primary().is_playing()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Track at the playlist's current index.
    ///
    /// Switches as soon as a transition is requested, while the other
    /// queries keep reporting the outgoing slot until the fade completes.
    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.current()
    }

    /// Transport state across both slots
    pub fn playback_state(&self) -> PlaybackState {
        if self.paused {
            PlaybackState::Paused
        } else if self.slots.iter().any(|s| s.is_playing()) {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn crossfade_state(&self) -> CrossfadeState {
        self.crossfade.state()
    }

    pub fn crossfade_session(&self) -> Option<&CrossfadeSession> {
        self.crossfade.session()
    }

    pub fn is_auto_advance_latched(&self) -> bool {
        self.auto_advance_latched
    }

    /// Active slot
    pub fn primary(&self) -> &H {
        &self.slots[self.primary]
    }

    /// Idle slot, or the incoming one during a crossfade
    pub fn secondary(&self) -> &H {
        &self.slots[1 - self.primary]
    }

    /// Index (0 or 1) of the active slot
    pub fn primary_slot(&self) -> usize {
        self.primary
    }

    pub fn playlist(&self) -> &PlaylistState {
        &self.playlist
    }

    pub fn loop_region(&self) -> &LoopRegion {
        &self.loop_region
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn engine_time(&self) -> f64 {
        self.engine_time
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Replace all settings; out-of-range values are clamped with a warning
    pub fn apply_settings(&mut self, mut settings: PlayerSettings) {
        let warnings = settings.clamp_to_ranges();

        self.volume_ramp.set_duration(settings.volume_ramp_seconds);
        self.rate_ramp.set_duration(settings.playback_rate_ramp_seconds);
        self.crossfade.set_curve(settings.fade_curve);
        self.playlist.set_shuffle(settings.shuffle);
        self.playlist.set_repeat_mode(settings.repeat_mode);
        self.settings = settings;

        for warning in warnings {
            self.emit_warning(warning);
        }
    }

    fn update_settings(&mut self, change: impl FnOnce(&mut PlayerSettings)) {
        let mut settings = self.settings.clone();
        change(&mut settings);
        self.apply_settings(settings);
    }

    /// Target volume, reached through the volume ramp
    pub fn set_volume(&mut self, volume: f32) {
        self.update_settings(|s| s.volume = volume);
    }

    pub fn set_volume_ramp_seconds(&mut self, seconds: f64) {
        self.update_settings(|s| s.volume_ramp_seconds = seconds);
    }

    /// Target playback rate, reached through the rate ramp
    pub fn set_playback_rate(&mut self, rate: f32) {
        self.update_settings(|s| s.playback_rate = rate);
    }

    pub fn set_playback_rate_ramp_seconds(&mut self, seconds: f64) {
        self.update_settings(|s| s.playback_rate_ramp_seconds = seconds);
    }

    pub fn set_fade_seconds(&mut self, seconds: f64) {
        self.update_settings(|s| s.fade_seconds = seconds);
    }

    pub fn set_fade_curve(&mut self, curve: FadeCurve) {
        self.update_settings(|s| s.fade_curve = curve);
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.update_settings(|s| s.shuffle = shuffle);
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.update_settings(|s| s.repeat_mode = mode);
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance the engine by `delta_secs` of wall or simulated time.
    ///
    /// Negative and non-finite deltas count as zero.
    pub fn update(&mut self, delta_secs: f64) {
        let delta = if delta_secs.is_finite() {
            delta_secs.max(0.0)
        } else {
            0.0
        };
        self.engine_time += delta;

        if let Some(remaining) = self.start_delay_remaining {
            let remaining = remaining - delta;
            if remaining <= 0.0 {
                self.start_delay_remaining = None;
                info!("Start delay elapsed");
                self.play();
            } else {
                self.start_delay_remaining = Some(remaining);
            }
        }

        if self.paused {
            return;
        }

        let primary = self.primary;
        let was_playing = self.slots[primary].is_playing();
        for slot in self.slots.iter_mut() {
            slot.advance(delta);
        }
        // Backend ran off either end of the clip during this tick
        let finished_slot = (was_playing && !self.slots[primary].is_playing()).then_some(primary);

        self.apply_ramps(delta);
        self.apply_loop_region();

        if self.settings.repeat_mode == RepeatMode::Track {
            self.slots[self.primary].set_looping(true);
        }

        self.crossfade
            .step(&mut self.slots, delta, self.settings.volume);
        self.handle_crossfade_completion();

        if self.settings.repeat_mode == RepeatMode::Playlist {
            self.check_auto_advance(finished_slot);
        }

        self.sync_state();
    }

    fn apply_ramps(&mut self, delta: f64) {
        let primary = self.primary;

        let pitch =
            self.rate_ramp
                .advance_f32(self.slots[primary].pitch(), self.settings.playback_rate, delta);
        self.slots[primary].set_pitch(pitch);
        if let Some(incoming) = self.crossfade.session().map(|s| s.incoming) {
            self.slots[incoming].set_pitch(pitch);
        }

        // The crossfade owns both volumes while it runs
        if !self.crossfade.is_fading() {
            let volume =
                self.volume_ramp
                    .advance_f32(self.slots[primary].volume(), self.settings.volume, delta);
            self.slots[primary].set_volume(volume);
        }

        self.slots[primary].set_looping(false);
        self.track_direction(pitch);
    }

    fn track_direction(&mut self, pitch: f32) {
        let reverse = pitch < 0.0;
        if reverse != self.reverse {
            self.reverse = reverse;
            info!(
                "Playback direction changed to {} (rate {:.2})",
                if reverse { "reverse" } else { "forward" },
                pitch
            );
        }
    }

    fn apply_loop_region(&mut self) {
        if !self.loop_region.is_enabled() {
            return;
        }

        let slot = &mut self.slots[self.primary];
        if !slot.is_playing() {
            return;
        }

        let from_sample = slot.position_samples();
        if let Some(to_sample) = self.loop_region.check(from_sample) {
            slot.set_position_samples(to_sample);
            trace!("Loop rewind {} -> {}", from_sample, to_sample);
            self.emit(PlayerEvent::LoopRewound {
                from_sample,
                to_sample,
                engine_time: self.engine_time,
            });
        }
    }

    fn check_auto_advance(&mut self, finished_slot: Option<usize>) {
        if self.auto_advance_latched || self.crossfade.is_fading() || self.playlist.is_empty() {
            return;
        }

        let finished = finished_slot == Some(self.primary);
        if !finished && !self.slots[self.primary].is_playing() {
            return;
        }

        let rate = self.settings.playback_rate;
        let window = self.settings.fade_seconds * f64::from(rate.abs());
        let time = self.current_time();

        if rate > 0.0 && (finished || time >= self.track_length() - window) {
            debug!("Auto-advance at {:.3}s (window {:.3}s)", time, window);
            self.auto_advance_latched = true;
            self.transition(Direction::Forward, TransitionCause::AutoAdvance);
        } else if rate < 0.0 && (finished || time <= window) {
            debug!("Auto-reverse at {:.3}s (window {:.3}s)", time, window);
            self.auto_advance_latched = true;
            self.transition(Direction::Backward, TransitionCause::AutoReverse);
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn transition(&mut self, direction: Direction, cause: TransitionCause) {
        let index = match direction {
            Direction::Forward => self.playlist.next_index(),
            Direction::Backward => self.playlist.prev_index(),
        };
        let Some(index) = index else {
            debug!("Transition ({}) on empty playlist, ignoring", cause);
            return;
        };

        let previous_index = self.playlist.current_index();
        self.playlist.move_to(index);
        let Some(track) = self.playlist.current().cloned() else {
            return;
        };

        let restarting = self.crossfade.is_fading();
        self.cancel_crossfade();
        self.loop_region.unset();
        self.paused = false;

        let primary = self.primary;
        let incoming = 1 - primary;
        let pitch = self.slots[primary].pitch();
        {
            let slot = &mut self.slots[incoming];
            slot.load(Some(track.clone()));
            // A restarted fade continues from the slot's current volume
            if !restarting {
                slot.set_volume(0.0);
            }
            slot.set_pitch(pitch);
            slot.set_looping(false);
            if pitch < 0.0 {
                slot.set_position_samples(track.total_samples());
            }
        }

        info!(
            "Track changed ({}): index {} -> {} '{}'",
            cause,
            previous_index,
            self.playlist.current_index(),
            track.name()
        );
        self.emit(PlayerEvent::TrackChanged {
            track_id: track.id(),
            index: self.playlist.current_index(),
            previous_index,
            cause,
            engine_time: self.engine_time,
        });

        let fade_seconds = self.settings.fade_seconds;
        self.crossfade
            .begin(&mut self.slots, primary, incoming, fade_seconds, self.settings.volume);
        self.emit(PlayerEvent::CrossfadeStarted {
            incoming_track_id: Some(track.id()),
            duration_seconds: fade_seconds,
            engine_time: self.engine_time,
        });

        self.handle_crossfade_completion();
        self.sync_state();
    }

    fn cancel_crossfade(&mut self) {
        if let Some(elapsed_seconds) = self.crossfade.cancel() {
            self.emit(PlayerEvent::CrossfadeCancelled {
                elapsed_seconds,
                engine_time: self.engine_time,
            });
        }
    }

    fn handle_crossfade_completion(&mut self) {
        let Some(slot) = self.crossfade.take_completed() else {
            return;
        };

        self.primary = slot;
        self.auto_advance_latched = false;

        let active_track_id = self.slots[slot].clip().map(Track::id);
        debug!("Slot {} is now active", slot);
        self.emit(PlayerEvent::CrossfadeCompleted {
            active_track_id,
            engine_time: self.engine_time,
        });
    }

    fn load_primary(&mut self, track: Track) {
        debug!("Loading '{}' into slot {}", track.name(), self.primary);
        let slot = &mut self.slots[self.primary];
        slot.load(Some(track));
        slot.set_looping(false);
        self.loop_region.unset();

        if let Some(seconds) = self.pending_seek.take() {
            self.seek(seconds);
        }
    }

    fn sync_state(&mut self) {
        let new_state = self.playback_state();
        if new_state == self.last_state {
            return;
        }

        let old_state = std::mem::replace(&mut self.last_state, new_state);
        debug!("Playback state: {} -> {}", old_state, new_state);
        self.emit(PlayerEvent::PlaybackStateChanged {
            old_state,
            new_state,
            engine_time: self.engine_time,
        });
    }

    fn emit_warning(&mut self, warning: PlayerWarning) {
        if self.event_tx.is_none() {
            self.unsent_warnings.push(warning);
            return;
        }
        self.emit(PlayerEvent::Warning {
            warning,
            engine_time: self.engine_time,
        });
    }

    fn emit(&mut self, event: PlayerEvent) {
        let Some(tx) = &self.event_tx else {
            return;
        };
        if tx.send(event).is_err() {
            debug!("Event receiver dropped, detaching event channel");
            self.event_tx = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_common::asset_advice::LoadStrategy;

    const TICK: f64 = 0.1;

    fn tracks(count: usize, duration: f64) -> Vec<Track> {
        (0..count)
            .map(|i| Track::new(format!("track-{}", i), duration, 44_100).unwrap())
            .collect()
    }

    fn engine_with(settings: PlayerSettings, count: usize, duration: f64) -> PlaybackEngine<SimulatedHandle> {
        let playlist = PlaylistState::with_rng_seed(tracks(count, duration), 17);
        PlaybackEngine::with_playlist(
            settings,
            SimulatedHandle::new("a"),
            SimulatedHandle::new("b"),
            playlist,
        )
    }

    fn instant_settings() -> PlayerSettings {
        PlayerSettings {
            volume_ramp_seconds: 0.0,
            playback_rate_ramp_seconds: 0.0,
            fade_seconds: 1.0,
            ..PlayerSettings::default()
        }
    }

    #[test]
    fn test_empty_playlist_transport_is_noop() {
        let mut engine = engine_with(PlayerSettings::default(), 0, 1.0);
        engine.play();
        engine.next();
        engine.prev();
        engine.update(TICK);
        assert!(!engine.is_playing());
        assert!(engine.current_track().is_none());
        assert_eq!(engine.crossfade_state(), CrossfadeState::Idle);
    }

    #[test]
    fn test_play_loads_current_track() {
        let mut engine = engine_with(instant_settings(), 3, 10.0);
        engine.play();
        assert!(engine.is_playing());
        assert_eq!(engine.track_length(), 10.0);
        assert_eq!(engine.primary().clip().map(Track::id), engine.current_track().map(Track::id));
    }

    #[test]
    fn test_pause_and_resume() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.play();
        engine.update(1.0);
        engine.pause();
        assert!(engine.is_paused());
        assert!(!engine.is_playing());

        engine.update(1.0);
        assert!((engine.current_time() - 1.0).abs() < 1e-3);

        engine.play();
        assert!(!engine.is_paused());
        assert!(engine.is_playing());
    }

    #[test]
    fn test_play_pause_toggles() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.play_pause();
        assert_eq!(engine.playback_state(), PlaybackState::Playing);
        engine.play_pause();
        assert_eq!(engine.playback_state(), PlaybackState::Paused);
        engine.play_pause();
        assert_eq!(engine.playback_state(), PlaybackState::Playing);
    }

    #[test]
    fn test_stop_clears_pause_and_rewinds() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.play();
        engine.update(2.0);
        engine.pause();
        engine.stop();
        assert!(!engine.is_paused());
        assert!(!engine.is_playing());
        assert_eq!(engine.current_time(), 0.0);
    }

    #[test]
    fn test_rewind_restarts_from_beginning() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.play();
        engine.update(3.0);
        engine.rewind();
        assert!(engine.is_playing());
        assert_eq!(engine.current_time(), 0.0);
    }

    #[test]
    fn test_seek_clamps_to_track_length() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.play();
        engine.seek(25.0);
        assert_eq!(engine.current_time(), 10.0);
        engine.seek(-4.0);
        assert_eq!(engine.current_time(), 0.0);
    }

    #[test]
    fn test_seek_before_load_is_applied_on_load() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.seek(4.0);
        assert_eq!(engine.current_time(), 0.0);

        engine.play();
        assert!((engine.current_time() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_next_starts_crossfade_into_secondary() {
        let mut engine = engine_with(instant_settings(), 3, 10.0);
        engine.play();
        let first = engine.current_track().map(Track::id);

        engine.next();
        assert_eq!(engine.crossfade_state(), CrossfadeState::Fading);
        assert_eq!(engine.playlist().current_index(), 1);
        // Queries keep reporting the outgoing slot until the swap
        assert_eq!(engine.primary().clip().map(Track::id), first);
        assert!(engine.secondary().is_playing());
        assert_eq!(engine.secondary().volume(), 0.0);

        for _ in 0..10 {
            engine.update(TICK);
        }
        assert_eq!(engine.crossfade_state(), CrossfadeState::Idle);
        assert_eq!(engine.primary().clip().map(Track::id), engine.current_track().map(Track::id));
        assert_eq!(engine.primary_slot(), 1);
        assert_eq!(engine.primary().volume(), 1.0);
        assert!(!engine.secondary().is_playing());
    }

    #[test]
    fn test_zero_fade_swaps_immediately() {
        let settings = PlayerSettings {
            fade_seconds: 0.0,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 2, 10.0);
        engine.play();
        engine.next();
        assert_eq!(engine.crossfade_state(), CrossfadeState::Idle);
        assert_eq!(engine.primary_slot(), 1);
        assert!(engine.is_playing());
    }

    #[test]
    fn test_next_mid_fade_restarts_from_current_volume() {
        let mut engine = engine_with(instant_settings(), 4, 10.0);
        engine.play();
        engine.next();
        for _ in 0..5 {
            engine.update(TICK);
        }
        let outgoing_volume = engine.primary().volume();
        let incoming_volume = engine.secondary().volume();
        assert!(outgoing_volume < 1.0);
        assert!(incoming_volume > 0.0);

        engine.next();
        let session = engine.crossfade_session().copied().unwrap();
        assert_eq!(session.elapsed, 0.0);
        assert_eq!(session.outgoing_start_volume, outgoing_volume);
        assert_eq!(session.incoming_start_volume, incoming_volume);
        assert_eq!(engine.secondary().volume(), incoming_volume);
        assert_eq!(engine.playlist().current_index(), 2);
    }

    #[test]
    fn test_stop_cancels_crossfade_and_play_resumes_current() {
        let mut engine = engine_with(instant_settings(), 3, 10.0);
        engine.play();
        engine.next();
        engine.update(TICK);
        engine.stop();

        assert_eq!(engine.crossfade_state(), CrossfadeState::Idle);
        assert!(!engine.primary().is_playing());
        assert!(!engine.secondary().is_playing());

        engine.play();
        assert_eq!(engine.primary().clip().map(Track::id), engine.current_track().map(Track::id));
    }

    #[test]
    fn test_pause_during_crossfade_pauses_both() {
        let mut engine = engine_with(instant_settings(), 3, 10.0);
        engine.play();
        engine.next();
        engine.update(TICK);
        engine.pause();
        assert!(engine.primary().is_paused());
        assert!(engine.secondary().is_paused());

        let elapsed = engine.crossfade_session().map(|s| s.elapsed);
        engine.update(TICK);
        assert_eq!(engine.crossfade_session().map(|s| s.elapsed), elapsed);

        engine.play();
        assert!(engine.primary().is_playing());
        assert!(engine.secondary().is_playing());
    }

    #[test]
    fn test_loop_region_rewinds_by_loop_length() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.play();
        engine.set_loop_back(2.0, 5.0);
        assert!(engine.is_loop_back_enabled());

        engine.seek(4.95);
        engine.update(TICK);
        // 5.05s overshoots by 0.05s and lands 0.05s after the loop start
        assert!((engine.current_time() - 2.05).abs() < 1e-3);
        assert!(engine.is_loop_back_enabled());
    }

    #[test]
    fn test_loop_cleared_on_track_change() {
        let mut engine = engine_with(instant_settings(), 2, 10.0);
        engine.play();
        engine.set_loop_back(1.0, 2.0);
        engine.next();
        assert!(!engine.is_loop_back_enabled());
    }

    #[test]
    fn test_loop_without_track_is_ignored() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.set_loop_back(1.0, 2.0);
        assert!(!engine.is_loop_back_enabled());
    }

    #[test]
    fn test_repeat_track_sets_native_looping() {
        let settings = PlayerSettings {
            repeat_mode: RepeatMode::Track,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 2, 1.0);
        engine.play();
        engine.update(TICK);
        assert!(engine.primary().looping());

        for _ in 0..15 {
            engine.update(TICK);
        }
        assert!(engine.is_playing());
        assert_eq!(engine.playlist().current_index(), 0);
    }

    #[test]
    fn test_repeat_none_stops_at_end() {
        let mut engine = engine_with(instant_settings(), 2, 1.0);
        engine.play();
        for _ in 0..15 {
            engine.update(TICK);
        }
        assert!(!engine.is_playing());
        assert_eq!(engine.playback_state(), PlaybackState::Stopped);
        assert_eq!(engine.playlist().current_index(), 0);
    }

    #[test]
    fn test_rate_zero_never_auto_advances() {
        let settings = PlayerSettings {
            repeat_mode: RepeatMode::Playlist,
            playback_rate: 0.0,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 3, 2.0);
        engine.play();
        for _ in 0..50 {
            engine.update(TICK);
        }
        assert_eq!(engine.playlist().current_index(), 0);
        assert_eq!(engine.crossfade_state(), CrossfadeState::Idle);
    }

    #[test]
    fn test_reverse_rate_auto_advances_backward() {
        let settings = PlayerSettings {
            repeat_mode: RepeatMode::Playlist,
            playback_rate: -1.0,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 3, 10.0);
        engine.play();
        engine.seek(3.0);

        let mut fired = false;
        for _ in 0..40 {
            engine.update(TICK);
            if engine.crossfade_state() == CrossfadeState::Fading {
                fired = true;
                break;
            }
        }
        assert!(fired);
        assert!(engine.current_time() <= 1.0 + 1e-6);
        // No history yet, so prev wraps to the last track
        assert_eq!(engine.playlist().current_index(), 2);
        // Incoming starts at its end when playing backward
        assert_eq!(engine.secondary().position_samples(), 10 * 44_100);
    }

    #[test]
    fn test_latch_clears_with_zero_fade() {
        let settings = PlayerSettings {
            repeat_mode: RepeatMode::Playlist,
            fade_seconds: 0.0,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 3, 1.0);
        engine.play();
        for _ in 0..11 {
            engine.update(TICK);
        }
        assert_eq!(engine.playlist().current_index(), 1);
        assert!(!engine.is_auto_advance_latched());

        for _ in 0..11 {
            engine.update(TICK);
        }
        assert_eq!(engine.playlist().current_index(), 2);
    }

    #[test]
    fn test_volume_ramp_reaches_target_within_duration() {
        let settings = PlayerSettings {
            volume_ramp_seconds: 1.0,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 1, 30.0);
        engine.play();
        engine.set_volume(0.0);
        for _ in 0..10 {
            engine.update(TICK);
        }
        assert!(engine.primary().volume() < 1e-5);
    }

    #[test]
    fn test_rate_ramp_reaches_target_within_duration() {
        let settings = PlayerSettings {
            playback_rate_ramp_seconds: 2.0,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 1, 60.0);
        engine.play();
        engine.seek(30.0);
        engine.set_playback_rate(-5.0);
        engine.update(TICK);
        assert!(engine.primary().pitch() < 1.0);
        assert!(engine.primary().pitch() > -5.0);

        for _ in 0..20 {
            engine.update(TICK);
        }
        assert_eq!(engine.primary().pitch(), -5.0);
    }

    #[test]
    fn test_out_of_range_setting_is_clamped() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        engine.set_volume(3.0);
        assert_eq!(engine.settings().volume, 1.0);
        engine.set_fade_seconds(-2.0);
        assert_eq!(engine.settings().fade_seconds, 0.0);
        engine.set_playback_rate(9.0);
        assert_eq!(engine.settings().playback_rate, 5.0);
    }

    #[test]
    fn test_start_honours_delay() {
        let settings = PlayerSettings {
            play_on_start: true,
            start_delay_seconds: 0.5,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 1, 10.0);
        engine.start();
        assert!(!engine.is_playing());
        assert_eq!(engine.track_length(), 10.0);

        for _ in 0..4 {
            engine.update(TICK);
        }
        assert!(!engine.is_playing());
        engine.update(TICK);
        engine.update(TICK);
        assert!(engine.is_playing());
    }

    #[test]
    fn test_start_without_play_on_start_only_loads() {
        let mut engine = engine_with(instant_settings(), 2, 10.0);
        engine.start();
        assert!(!engine.is_playing());
        assert!(engine.primary().clip().is_some());
    }

    #[test]
    fn test_remove_track_revalidates_index() {
        let mut engine = engine_with(instant_settings(), 3, 10.0);
        engine.next();
        engine.next();
        let current = engine.current_track().map(Track::id).unwrap();
        assert!(engine.remove_track(current).is_some());
        assert_eq!(engine.playlist().current_index(), 0);
        assert_eq!(engine.playlist().len(), 2);
    }

    #[test]
    fn test_events_are_emitted() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = engine_with(instant_settings(), 2, 10.0);
        engine.set_event_channel(tx);

        engine.play();
        engine.next();

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.event_type());
        }
        assert_eq!(
            kinds,
            vec!["PlaybackStateChanged", "TrackChanged", "CrossfadeStarted"]
        );
    }

    #[test]
    fn test_construction_warnings_replayed_on_attach() {
        let settings = PlayerSettings {
            volume: 2.0,
            ..instant_settings()
        };
        let mut engine = engine_with(settings, 1, 10.0);
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.set_event_channel(tx);

        match rx.try_recv() {
            Ok(PlayerEvent::Warning {
                warning: PlayerWarning::ValueClamped { field, applied, .. },
                ..
            }) => {
                assert_eq!(field, "volume");
                assert_eq!(applied, 1.0);
            }
            other => panic!("Expected clamp warning, got {:?}", other),
        }
    }

    #[test]
    fn test_add_track_reports_misfit_load_strategy() {
        let mut engine = engine_with(instant_settings(), 1, 10.0);
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.set_event_channel(tx);

        let fitting = Track::new("jingle", 2.0, 44_100)
            .unwrap()
            .with_asset(1024 * 1024, LoadStrategy::DecompressOnLoad);
        engine.add_track(fitting);
        assert!(rx.try_recv().is_err());

        let oversized = Track::new("album", 600.0, 44_100)
            .unwrap()
            .with_asset(80 * 1024 * 1024, LoadStrategy::DecompressOnLoad);
        engine.add_track(oversized);

        match rx.try_recv() {
            Ok(PlayerEvent::Warning {
                warning:
                    PlayerWarning::AssetLoadStrategy {
                        asset_name,
                        recommended,
                        ..
                    },
                ..
            }) => {
                assert_eq!(asset_name, "album");
                assert_eq!(recommended, LoadStrategy::Streaming);
            }
            other => panic!("Expected load strategy warning, got {:?}", other),
        }
        assert_eq!(engine.playlist().len(), 3);
    }
}
