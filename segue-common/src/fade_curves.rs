//! Fade curve implementations for crossfading
//!
//! A crossfade moves the outgoing buffer from its fade-start volume down to
//! silence and the incoming buffer from its fade-start volume up to the target
//! volume. The curve decides how the normalized progress `t` (0.0 → 1.0) is
//! shaped before interpolation. `Linear` reproduces a plain lerp.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

/// Fade curve types for crossfading
///
/// - Linear: Constant rate of change (precise, predictable)
/// - Exponential: Slow start, fast finish
/// - Logarithmic: Fast start, slow finish
/// - SCurve: Smooth acceleration and deceleration
/// - EqualPower: Constant perceived loudness during crossfade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// v(t) = t
    #[default]
    Linear,

    /// v(t) = t²
    Exponential,

    /// v(t) = √t
    Logarithmic,

    /// v(t) = 0.5 × (1 - cos(π × t))
    SCurve,

    /// v(t) = sin(t × π/2)
    EqualPower,
}

impl FadeCurve {
    /// Shape normalized fade progress for the incoming side.
    ///
    /// `position` is clamped to 0.0..=1.0. Returns 0.0 at the start of the
    /// fade and 1.0 at the end for every curve.
    pub fn fade_in_progress(&self, position: f32) -> f32 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
            FadeCurve::Logarithmic => t.sqrt(),
            FadeCurve::SCurve => 0.5 * (1.0 - (PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).sin(),
        }
    }

    /// Shape normalized fade progress for the outgoing side.
    ///
    /// Mirror image of [`FadeCurve::fade_in_progress`]: the returned value is
    /// how far the outgoing buffer has travelled toward silence.
    pub fn fade_out_progress(&self, position: f32) -> f32 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => t,
            // Outgoing side of an exponential fade-in pairs with a fast drop
            FadeCurve::Exponential => 1.0 - (1.0 - t) * (1.0 - t),
            FadeCurve::Logarithmic => 1.0 - (1.0 - t).sqrt(),
            FadeCurve::SCurve => 0.5 * (1.0 - (PI * t).cos()),
            FadeCurve::EqualPower => 1.0 - (t * FRAC_PI_2).cos(),
        }
    }

    /// Volume of the outgoing buffer at `position` through the fade.
    pub fn fade_out_volume(&self, start_volume: f32, position: f32) -> f32 {
        lerp(start_volume, 0.0, self.fade_out_progress(position))
    }

    /// Volume of the incoming buffer at `position` through the fade.
    pub fn fade_in_volume(&self, start_volume: f32, target_volume: f32, position: f32) -> f32 {
        lerp(start_volume, target_volume, self.fade_in_progress(position))
    }

    /// Parse curve from a config string
    ///
    /// Accepts 'linear', 'exponential', 'logarithmic', 'cosine' / 's_curve' /
    /// 'scurve' / 's-curve' and 'equal_power' / 'equalpower'.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(FadeCurve::Linear),
            "exponential" => Some(FadeCurve::Exponential),
            "logarithmic" => Some(FadeCurve::Logarithmic),
            "cosine" | "scurve" | "s-curve" | "s_curve" => Some(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Some(FadeCurve::EqualPower),
            _ => None,
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::Exponential => "Exponential",
            FadeCurve::Logarithmic => "Logarithmic",
            FadeCurve::SCurve => "S-Curve",
            FadeCurve::EqualPower => "Equal Power",
        }
    }

    /// Get all available fade curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Exponential,
            FadeCurve::Logarithmic,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Unclamped linear interpolation, `t` is expected in 0.0..=1.0.
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
