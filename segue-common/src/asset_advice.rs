//! Load strategy advice for audio assets
//!
//! Large assets should stream, mid-sized ones stay compressed in memory and
//! small ones are cheapest decompressed up front. This is advisory only: the
//! player logs the advice and carries on.

use serde::{Deserialize, Serialize};

/// Below this size an asset should be decompressed on load
pub const DECOMPRESS_MAX_MIB: f64 = 5.0;

/// Above this size an asset should be streamed
pub const COMPRESSED_MAX_MIB: f64 = 50.0;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// How an audio backend keeps an asset in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    DecompressOnLoad,
    CompressedInMemory,
    Streaming,
}

impl LoadStrategy {
    /// Strategy that fits an asset of `size_mib`
    pub fn recommended_for(size_mib: f64) -> Self {
        if size_mib > COMPRESSED_MAX_MIB {
            LoadStrategy::Streaming
        } else if size_mib > DECOMPRESS_MAX_MIB {
            LoadStrategy::CompressedInMemory
        } else {
            LoadStrategy::DecompressOnLoad
        }
    }
}

impl std::fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStrategy::DecompressOnLoad => write!(f, "decompress_on_load"),
            LoadStrategy::CompressedInMemory => write!(f, "compressed_in_memory"),
            LoadStrategy::Streaming => write!(f, "streaming"),
        }
    }
}

/// Advice produced when an asset's strategy does not match its size
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSizeAdvice {
    pub asset_name: String,
    pub size_mib: f64,
    pub current: LoadStrategy,
    pub recommended: LoadStrategy,
}

impl AssetSizeAdvice {
    /// Check an asset; `None` when the strategy already fits or the size is unknown (0).
    pub fn check(asset_name: &str, size_bytes: u64, current: LoadStrategy) -> Option<Self> {
        if size_bytes == 0 {
            return None;
        }

        let size_mib = size_bytes as f64 / BYTES_PER_MIB;
        let recommended = LoadStrategy::recommended_for(size_mib);
        if recommended == current {
            return None;
        }

        Some(Self {
            asset_name: asset_name.to_string(),
            size_mib,
            current,
            recommended,
        })
    }

    /// True when the asset is larger than its current strategy should hold
    pub fn is_too_big(&self) -> bool {
        rank(self.recommended) > rank(self.current)
    }
}

fn rank(strategy: LoadStrategy) -> u8 {
    match strategy {
        LoadStrategy::DecompressOnLoad => 0,
        LoadStrategy::CompressedInMemory => 1,
        LoadStrategy::Streaming => 2,
    }
}

impl std::fmt::Display for AssetSizeAdvice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.is_too_big() { "too big" } else { "too small" };
        write!(
            f,
            "audio asset \"{}\" ({:.1} MiB) is {} for '{}', switch to '{}'",
            self.asset_name, self.size_mib, verdict, self.current, self.recommended
        )
    }
}
