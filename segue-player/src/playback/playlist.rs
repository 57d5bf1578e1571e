//! Playlist ordering, shuffle and play history
//!
//! `PlaylistState` only picks indices. Loading clips and crossfading belong to
//! the engine, which calls [`PlaylistState::move_to`] once it has decided to
//! switch tracks.

use super::track::Track;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use segue_common::RepeatMode;
use std::collections::VecDeque;
use tracing::{debug, trace};
use uuid::Uuid;

/// Maximum number of indices kept for `prev_index()`
pub const PLAY_HISTORY_CAPACITY: usize = 50;

/// Ordered track list plus navigation state
#[derive(Debug)]
pub struct PlaylistState {
    tracks: Vec<Track>,
    current_index: usize,
    repeat_mode: RepeatMode,
    shuffle: bool,
    /// Most recent entry at the back; oldest evicted from the front
    history: VecDeque<usize>,
    rng: StdRng,
}

impl PlaylistState {
    /// Create a playlist seeded from OS entropy
    pub fn new(tracks: Vec<Track>) -> Self {
        Self::with_rng(tracks, StdRng::from_entropy())
    }

    /// Create a playlist with a fixed shuffle seed (reproducible order)
    pub fn with_rng_seed(tracks: Vec<Track>, seed: u64) -> Self {
        Self::with_rng(tracks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tracks: Vec<Track>, rng: StdRng) -> Self {
        Self {
            tracks,
            current_index: 0,
            repeat_mode: RepeatMode::None,
            shuffle: false,
            history: VecDeque::with_capacity(PLAY_HISTORY_CAPACITY + 1),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Track at the current index, `None` when the playlist is empty
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.current_index)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    /// Previously visited indices, oldest first
    pub fn history(&self) -> impl Iterator<Item = usize> + '_ {
        self.history.iter().copied()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Pick the index `next` should move to.
    ///
    /// With shuffle on, draws uniformly from the whole list and redraws while
    /// the draw equals the current index (skipped for single-track lists).
    /// Returns `None` for an empty playlist.
    pub fn next_index(&mut self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        if self.shuffle {
            let mut candidate = self.rng.gen_range(0..len);
            while len > 1 && candidate == self.current_index {
                candidate = self.rng.gen_range(0..len);
            }
            trace!("Shuffle picked index {} (current {})", candidate, self.current_index);
            Some(candidate)
        } else {
            Some((self.current_index + 1) % len)
        }
    }

    /// Pick the index `prev` should move to.
    ///
    /// Pops the most recent history entry when there is one, regardless of
    /// shuffle. Otherwise steps back one position with wraparound.
    pub fn prev_index(&mut self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        match self.history.pop_back() {
            // Entries can outlive a removal, so re-validate them
            Some(index) => Some(index % len),
            None => Some((self.current_index + len - 1) % len),
        }
    }

    /// Make `index` current, pushing the old index onto the history.
    ///
    /// Out-of-range indices are reduced modulo the playlist length. No-op on
    /// an empty playlist.
    pub fn move_to(&mut self, index: usize) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }

        self.push_history(self.current_index);
        self.current_index = index % len;
        debug!("Playlist moved to index {}", self.current_index);
    }

    fn push_history(&mut self, index: usize) {
        self.history.push_back(index);
        while self.history.len() > PLAY_HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }

    /// Append a track
    pub fn add_track(&mut self, track: Track) {
        debug!("Adding track '{}' ({})", track.name(), track.id());
        self.tracks.push(track);
    }

    /// Remove the first track with `id`.
    ///
    /// The current index is not shifted; it is only reduced modulo the new
    /// length, so it may now refer to a different track.
    pub fn remove_track(&mut self, id: Uuid) -> Option<Track> {
        let position = self.tracks.iter().position(|t| t.id() == id)?;
        let removed = self.tracks.remove(position);
        self.revalidate_index();
        debug!(
            "Removed track '{}' at index {}, current index now {}",
            removed.name(),
            position,
            self.current_index
        );
        Some(removed)
    }

    /// Force `current_index` back into range after structural changes
    pub fn revalidate_index(&mut self) {
        self.current_index = match self.tracks.len() {
            0 => 0,
            len => self.current_index % len,
        };
    }

    /// Set the current index directly without touching history
    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
        self.revalidate_index();
    }
}
