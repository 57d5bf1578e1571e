//! Error types for segue-player
//!
//! Transport operations on the engine never fail; these errors cover
//! construction and configuration paths only.

use thiserror::Error;

/// Main error type for segue-player
#[derive(Error, Debug)]
pub enum Error {
    /// Track metadata cannot describe a playable unit
    #[error("Invalid track '{name}': {reason}")]
    InvalidTrack { name: String, reason: String },

    /// Errors bubbled up from segue-common
    #[error(transparent)]
    Common(#[from] segue_common::Error),
}

/// Convenience Result type using segue-player Error
pub type Result<T> = std::result::Result<T, Error>;
