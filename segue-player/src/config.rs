//! segue-player specific configuration
//!
//! Turns the shared [`TomlConfig`] into engine-ready values: clamped player
//! settings, validated tracks and load strategy advice for the configured
//! assets.

use crate::error::Result;
use crate::playback::Track;
use segue_common::asset_advice::AssetSizeAdvice;
use segue_common::config::{ConfigSource, CONFIG_ENV_VAR};
use segue_common::{PlayerSettings, TomlConfig};
use std::path::Path;

/// Resolved player configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub settings: PlayerSettings,
    pub tracks: Vec<Track>,
    /// Log level from the config file; RUST_LOG wins when set
    pub log_level: String,
    /// Assets whose configured load strategy does not fit their size.
    /// Logged by the caller once logging is up.
    pub advice: Vec<AssetSizeAdvice>,
    /// Where the values came from, for logging once the subscriber is up
    pub source: ConfigSource,
}

impl PlayerConfig {
    /// Resolve the config file (CLI → `SEGUE_CONFIG` → platform dir → defaults) and build
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let (toml, source) = TomlConfig::load_with_source(cli_path, CONFIG_ENV_VAR)?;
        let mut config = Self::from_toml(toml)?;
        config.source = source;
        Ok(config)
    }

    /// Build from an already parsed config
    ///
    /// The source is reported as built-in defaults.
    /// Fails on the first track entry that cannot describe a playable unit.
    pub fn from_toml(config: TomlConfig) -> Result<Self> {
        let tracks = config
            .tracks
            .iter()
            .map(Track::from_entry)
            .collect::<Result<Vec<_>>>()?;

        let advice = tracks.iter().filter_map(Track::load_advice).collect();

        Ok(Self {
            settings: config.player,
            tracks,
            log_level: config.logging.level,
            advice,
            source: ConfigSource::Defaults,
        })
    }
}
