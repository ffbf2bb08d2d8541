//! # Configuration Module
//!
//! Engine configuration loaded from JSON. Every field has a default, so a config
//! file only needs to name the values it overrides:
//!
//! ```json
//! { "seed": 7, "view_radius": 6, "map": { "width": 32, "height": 16 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Selects which terrain generator fills newly requested chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Biome/height map driven terrain with doodad scatter.
    Overworld,
    /// Standalone two-noise heightfield that ignores the biome map.
    Perlin,
    /// Every voxel filled (testing).
    Solid,
    /// Nothing allocated (testing).
    Empty,
}

/// Dimensions of the seed grid and the number of refinement passes.
///
/// The final map is `width * 2^subdivisions` by `height * 2^subdivisions`
/// block columns.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    pub subdivisions: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
            subdivisions: 4,
        }
    }
}

/// Thresholds applied when the height map is finalized.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaConfig {
    /// Normalized noise height below which a column becomes ocean.
    pub ocean_threshold: f32,
    /// Normalized noise height below which a column becomes beach.
    pub beach_threshold: f32,
    /// Column height assigned to every ocean cell.
    pub ocean_floor: f32,
    /// Octave count of the height noise.
    pub height_octaves: usize,
}

impl Default for SeaConfig {
    fn default() -> Self {
        Self {
            ocean_threshold: 0.53,
            beach_threshold: 0.55,
            ocean_floor: 256.0 * 0.53,
            height_octaves: 9,
        }
    }
}

/// Brightness class emitted per face orientation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadeConfig {
    pub top: u8,
    pub side: u8,
    pub bottom: u8,
}

impl Default for ShadeConfig {
    fn default() -> Self {
        Self {
            top: 255,
            side: 200,
            bottom: 177,
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for map seeding, refinement and terrain noise.
    pub seed: u64,
    pub map: MapConfig,
    pub sea: SeaConfig,
    pub shade: ShadeConfig,
    pub generation: GenerationMethod,
    /// Chunks farther than this (Euclidean, chunk space) are unloaded.
    pub view_radius: u32,
    /// Chunks within this radius also receive collision.
    pub active_radius: u32,
    /// Number of background worker threads.
    pub worker_count: usize,
    /// How long `EngineState::init` waits for the home chunk.
    pub init_timeout_ms: u64,
    /// Poll interval while waiting for the home chunk.
    pub init_poll_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            map: MapConfig::default(),
            sea: SeaConfig::default(),
            shade: ShadeConfig::default(),
            generation: GenerationMethod::Overworld,
            view_radius: 4,
            active_radius: 1,
            worker_count: 4,
            init_timeout_ms: 10_000,
            init_poll_ms: 10,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the invariants other modules rely on.
    pub fn validate(&self) -> Result<()> {
        if self.map.width < 2 || self.map.height < 3 {
            return Err(Error::InvalidConfig(format!(
                "map seed grid must be at least 2x3, got {}x{}",
                self.map.width, self.map.height
            )));
        }
        if self.map.subdivisions > 8 {
            return Err(Error::InvalidConfig(format!(
                "at most 8 subdivisions are supported, got {}",
                self.map.subdivisions
            )));
        }
        if self.worker_count == 0 {
            return Err(Error::InvalidConfig("worker_count must be at least 1".into()));
        }
        if self.active_radius > self.view_radius {
            return Err(Error::InvalidConfig(format!(
                "active_radius {} exceeds view_radius {}",
                self.active_radius, self.view_radius
            )));
        }
        if self.sea.beach_threshold < self.sea.ocean_threshold {
            return Err(Error::InvalidConfig(
                "beach_threshold must not be below ocean_threshold".into(),
            ));
        }
        if self.init_poll_ms == 0 {
            return Err(Error::InvalidConfig("init_poll_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "seed": 7, "map": { "width": 8 }, "generation": "perlin" }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.map.width, 8);
        assert_eq!(config.map.height, 32);
        assert_eq!(config.generation, GenerationMethod::Perlin);
        assert_eq!(config.shade, ShadeConfig::default());
    }

    #[test]
    fn rejects_active_radius_beyond_view_radius() {
        let err = EngineConfig::from_json_str(r#"{ "view_radius": 1, "active_radius": 2 }"#);
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_workers() {
        let config = EngineConfig {
            worker_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(EngineConfig::from_json_str("{ nope"), Err(Error::Json(_))));
    }
}
