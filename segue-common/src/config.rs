//! Configuration loading and config file resolution
//!
//! Config file priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/segue/config.toml`)
//! 4. Built-in defaults (a missing file is not an error)

use crate::asset_advice::LoadStrategy;
use crate::events::PlayerWarning;
use crate::fade_curves::FadeCurve;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted when no `--config` argument is given
pub const CONFIG_ENV_VAR: &str = "SEGUE_CONFIG";

pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const VOLUME_RAMP_RANGE: RangeInclusive<f64> = 0.0..=5.0;
pub const PLAYBACK_RATE_RANGE: RangeInclusive<f32> = -5.0..=5.0;
pub const PLAYBACK_RATE_RAMP_RANGE: RangeInclusive<f64> = 0.0..=2.0;
pub const FADE_RANGE: RangeInclusive<f64> = 0.0..=10.0;

/// What happens when the active track reaches its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Stop at the end of the track
    #[default]
    None,
    /// Loop the current track natively in the backend
    Track,
    /// Crossfade into the next (or previous, when reversed) playlist entry
    Playlist,
}

/// Runtime player settings
///
/// Every field has a built-in default so a partial `[player]` table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub shuffle: bool,
    pub repeat_mode: RepeatMode,
    /// Target volume, 0.0..=1.0
    pub volume: f32,
    /// Seconds for a full-range volume change (0 = instant)
    pub volume_ramp_seconds: f64,
    /// Signed playback rate, -5.0..=5.0 (negative = reverse intent)
    pub playback_rate: f32,
    /// Seconds for a full-range rate change (0 = instant)
    pub playback_rate_ramp_seconds: f64,
    /// Crossfade length between tracks
    pub fade_seconds: f64,
    pub fade_curve: FadeCurve,
    /// Delay before `play_on_start` kicks in
    pub start_delay_seconds: f64,
    pub play_on_start: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat_mode: RepeatMode::None,
            volume: 1.0,
            volume_ramp_seconds: 1.0,
            playback_rate: 1.0,
            playback_rate_ramp_seconds: 1.0,
            fade_seconds: 0.15,
            fade_curve: FadeCurve::Linear,
            start_delay_seconds: 0.0,
            play_on_start: false,
        }
    }
}

impl PlayerSettings {
    /// Clamp every ranged field into its allowed range.
    ///
    /// Returns one warning per field that had to be changed. Non-finite values
    /// fall back to the field default.
    pub fn clamp_to_ranges(&mut self) -> Vec<PlayerWarning> {
        let defaults = Self::default();
        let mut warnings = Vec::new();

        clamp_field(&mut warnings, "volume", &mut self.volume, defaults.volume, VOLUME_RANGE);
        clamp_field(
            &mut warnings,
            "volume_ramp_seconds",
            &mut self.volume_ramp_seconds,
            defaults.volume_ramp_seconds,
            VOLUME_RAMP_RANGE,
        );
        clamp_field(
            &mut warnings,
            "playback_rate",
            &mut self.playback_rate,
            defaults.playback_rate,
            PLAYBACK_RATE_RANGE,
        );
        clamp_field(
            &mut warnings,
            "playback_rate_ramp_seconds",
            &mut self.playback_rate_ramp_seconds,
            defaults.playback_rate_ramp_seconds,
            PLAYBACK_RATE_RAMP_RANGE,
        );
        clamp_field(
            &mut warnings,
            "fade_seconds",
            &mut self.fade_seconds,
            defaults.fade_seconds,
            FADE_RANGE,
        );
        clamp_field(
            &mut warnings,
            "start_delay_seconds",
            &mut self.start_delay_seconds,
            defaults.start_delay_seconds,
            0.0..=f64::MAX,
        );

        warnings
    }
}

/// Numeric types a settings field can hold
pub trait SettingValue: Copy + PartialOrd + Into<f64> {
    fn is_finite_value(self) -> bool;
}

impl SettingValue for f32 {
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

impl SettingValue for f64 {
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

/// Clamp a single value into `range`, falling back to `default` when it is not finite.
///
/// Returns the applied value and whether it differs from the request.
pub fn clamp_value<T: SettingValue>(value: T, default: T, range: RangeInclusive<T>) -> (T, bool) {
    if !value.is_finite_value() {
        return (default, true);
    }
    if value < *range.start() {
        (*range.start(), true)
    } else if value > *range.end() {
        (*range.end(), true)
    } else {
        (value, false)
    }
}

fn clamp_field<T: SettingValue>(
    warnings: &mut Vec<PlayerWarning>,
    field: &str,
    value: &mut T,
    default: T,
    range: RangeInclusive<T>,
) {
    let requested = *value;
    let (applied, changed) = clamp_value(requested, default, range);
    if changed {
        let requested_f64: f64 = requested.into();
        let applied_f64: f64 = applied.into();
        warn!(
            "Setting '{}' out of range ({}), using {}",
            field, requested_f64, applied_f64
        );
        warnings.push(PlayerWarning::ValueClamped {
            field: field.to_string(),
            requested: requested_f64,
            applied: applied_f64,
        });
        *value = applied;
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// One playlist entry described in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub name: String,
    pub duration_seconds: f64,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Size of the source asset on disk, for load strategy advice
    #[serde(default)]
    pub file_size_bytes: Option<u64>,
    #[serde(default)]
    pub load_strategy: Option<LoadStrategy>,
}

fn default_sample_rate() -> u32 {
    44_100
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub player: PlayerSettings,
    pub logging: LoggingConfig,
    pub tracks: Vec<TrackEntry>,
}

impl TomlConfig {
    /// Parse a configuration document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve and load the config, degrading to defaults when no file exists.
    ///
    /// An explicitly requested file (argument or environment) that is missing
    /// is logged and skipped; a file that exists but fails to parse is an error.
    pub fn load_or_default(cli_arg: Option<&Path>, env_var_name: &str) -> Result<Self> {
        Self::load_with_source(cli_arg, env_var_name).map(|(config, _)| config)
    }

    /// Like [`load_or_default`](Self::load_or_default), also reporting where
    /// the values came from so callers can log it once logging is up.
    pub fn load_with_source(
        cli_arg: Option<&Path>,
        env_var_name: &str,
    ) -> Result<(Self, ConfigSource)> {
        match resolve_config_path(cli_arg, env_var_name) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                let config = Self::load(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => {
                warn!("Config file {} not found, using built-in defaults", path.display());
                Ok((Self::default(), ConfigSource::Missing(path)))
            }
            None => {
                info!("No config file found, using built-in defaults");
                Ok((Self::default(), ConfigSource::Defaults))
            }
        }
    }
}

/// Where a loaded [`TomlConfig`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file was requested but does not exist; defaults were used
    Missing(PathBuf),
    /// No file requested or found
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Missing(path) => {
                write!(f, "built-in defaults ({} not found)", path.display())
            }
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Config path resolution following the priority order in the module docs.
///
/// Returns `None` when neither an override nor a platform config file exists.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|path| path.exists())
}

/// Platform config file location, e.g. `~/.config/segue/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("segue").join("config.toml"))
}
