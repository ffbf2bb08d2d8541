//! # Error Module
//!
//! The crate-wide error type. Streaming operations never fail (an unloaded chunk
//! is simply "not ready yet"), so errors only surface from construction,
//! persistence, snapshot validation and world initialization.

use thiserror::Error;
use web_time::Duration;

use super::spatial_key::SpatialKey;

/// Main error type for the voxel world.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed chunk snapshot {key:#010x}: {reason}")]
    MalformedChunk { key: SpatialKey, reason: String },

    #[error("Malformed world map: {0}")]
    MalformedMap(String),

    #[error("Home chunk was not ready after {waited:?}")]
    InitTimeout { waited: Duration },
}

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;
