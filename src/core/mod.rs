//! # Core Module
//!
//! Ambient building blocks shared by every engine subsystem.
//!
//! ## Key Components
//! - `config`: JSON-backed `EngineConfig` and its sub-sections
//! - `error`: the crate-wide `Error` enum and `Result` alias
//! - `spatial_key`: packing of chunk coordinates into a single integer key

pub mod config;
pub mod error;
pub mod spatial_key;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use spatial_key::SpatialKey;
