//! Tick-driven crossfade between the engine's two buffer slots
//!
//! Two states:
//! - Idle: one slot is audible, nothing to do per tick
//! - Fading: the outgoing slot ramps to silence while the incoming slot ramps
//!   to the target volume
//!
//! Completion is signalled once through [`CrossfadeScheduler::take_completed`].

use super::track::TrackHandle;
use segue_common::FadeCurve;
use tracing::{debug, trace};

/// Slack when comparing accumulated tick time against the fade duration
const FADE_EPSILON: f64 = 1e-9;

/// Public view of the scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossfadeState {
    Idle,
    Fading,
}

/// One fade between two slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeSession {
    pub outgoing: usize,
    pub incoming: usize,
    pub elapsed: f64,
    pub duration: f64,
    pub outgoing_start_volume: f32,
    pub incoming_start_volume: f32,
}

impl CrossfadeSession {
    /// Fade position in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0) as f32
    }
}

#[derive(Debug)]
enum FadeState {
    Idle,
    Fading(CrossfadeSession),
}

/// Drives at most one crossfade session at a time
#[derive(Debug)]
pub struct CrossfadeScheduler {
    state: FadeState,
    curve: FadeCurve,
    /// Slot that became active when the last fade finished.
    /// Consumed by the engine via take_completed()
    completed_slot: Option<usize>,
}

impl Default for CrossfadeScheduler {
    fn default() -> Self {
        Self::new(FadeCurve::default())
    }
}

impl CrossfadeScheduler {
    pub fn new(curve: FadeCurve) -> Self {
        Self {
            state: FadeState::Idle,
            curve,
            completed_slot: None,
        }
    }

    pub fn curve(&self) -> FadeCurve {
        self.curve
    }

    pub fn set_curve(&mut self, curve: FadeCurve) {
        self.curve = curve;
    }

    pub fn state(&self) -> CrossfadeState {
        match self.state {
            FadeState::Idle => CrossfadeState::Idle,
            FadeState::Fading(_) => CrossfadeState::Fading,
        }
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.state, FadeState::Fading(_))
    }

    /// Session in flight, if any
    pub fn session(&self) -> Option<&CrossfadeSession> {
        match &self.state {
            FadeState::Idle => None,
            FadeState::Fading(session) => Some(session),
        }
    }

    /// Start fading from `outgoing` to `incoming`.
    ///
    /// The incoming slot starts playing and both slots fade from whatever
    /// volume they have right now. A session already in flight is cancelled
    /// and its elapsed time returned. A `duration` of zero or less completes
    /// before returning.
    pub fn begin<H: TrackHandle>(
        &mut self,
        slots: &mut [H; 2],
        outgoing: usize,
        incoming: usize,
        duration: f64,
        target_volume: f32,
    ) -> Option<f64> {
        let cancelled = self.cancel();
        self.completed_slot = None;

        slots[incoming].play();

        let session = CrossfadeSession {
            outgoing,
            incoming,
            elapsed: 0.0,
            duration,
            outgoing_start_volume: slots[outgoing].volume(),
            incoming_start_volume: slots[incoming].volume(),
        };

        debug!(
            "Crossfade started: slot {} -> slot {} over {:.3}s (curve={})",
            outgoing, incoming, duration, self.curve
        );

        if duration <= 0.0 {
            Self::finish(slots, &session, target_volume);
            self.completed_slot = Some(incoming);
        } else {
            self.state = FadeState::Fading(session);
        }

        cancelled
    }

    /// Advance the fade by `delta_secs`. No-op while idle.
    pub fn step<H: TrackHandle>(&mut self, slots: &mut [H; 2], delta_secs: f64, target_volume: f32) {
        let FadeState::Fading(session) = &mut self.state else {
            return;
        };

        session.elapsed += delta_secs.max(0.0);

        if session.elapsed >= session.duration - FADE_EPSILON {
            let done = *session;
            Self::finish(slots, &done, target_volume);
            self.state = FadeState::Idle;
            self.completed_slot = Some(done.incoming);
            debug!(
                "Crossfade completed: slot {} active after {:.3}s",
                done.incoming, done.elapsed
            );
            return;
        }

        let position = session.progress();
        let out_volume = self.curve.fade_out_volume(session.outgoing_start_volume, position);
        let in_volume =
            self.curve
                .fade_in_volume(session.incoming_start_volume, target_volume, position);
        slots[session.outgoing].set_volume(out_volume);
        slots[session.incoming].set_volume(in_volume);

        trace!(
            "Crossfade t={:.3}: out={:.3} in={:.3}",
            position,
            out_volume,
            in_volume
        );
    }

    /// Abandon the session in flight without touching the slots.
    ///
    /// Returns the elapsed time of the abandoned session.
    pub fn cancel(&mut self) -> Option<f64> {
        match std::mem::replace(&mut self.state, FadeState::Idle) {
            FadeState::Idle => None,
            FadeState::Fading(session) => {
                debug!("Crossfade cancelled at {:.3}s", session.elapsed);
                Some(session.elapsed)
            }
        }
    }

    /// Slot that became active if a fade finished since the last call
    pub fn take_completed(&mut self) -> Option<usize> {
        let result = self.completed_slot.take();
        if result.is_some() {
            trace!("Crossfade completion flag consumed: slot={:?}", result);
        }
        result
    }

    fn finish<H: TrackHandle>(slots: &mut [H; 2], session: &CrossfadeSession, target_volume: f32) {
        let outgoing = &mut slots[session.outgoing];
        outgoing.stop();
        outgoing.set_volume(target_volume);
        slots[session.incoming].set_volume(target_volume);
    }
}
