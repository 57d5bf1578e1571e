//! # Segue Common Library
//!
//! Shared code for the Segue player crates:
//! - Configuration loading (TOML + defaults)
//! - Event types (PlayerEvent enum)
//! - Fade curve definitions
//! - Asset load strategy advice
//! - Error types

pub mod asset_advice;
pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;

pub use config::{PlayerSettings, RepeatMode, TomlConfig};
pub use error::{Error, Result};
pub use events::PlayerEvent;
pub use fade_curves::FadeCurve;
