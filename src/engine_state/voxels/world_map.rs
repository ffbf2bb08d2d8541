//! # World Map Module
//!
//! The world-scale biome and height grids, built once when a world is created
//! and shared read-only with every chunk generation task afterwards.
//!
//! ## Construction
//!
//! A map moves through `Uninitialized → Seeded → Refined(k) → Finalized`:
//!
//! 1. **Seed**: every cell of a small grid gets a random land biome, except the
//!    first and last rows which are reserved for the arctic boundary biome.
//! 2. **Refine** (k times): both dimensions double. New cells on the primary
//!    axis copy one of their two straddled parents, picked at random; cells on
//!    the secondary axis then copy one of their two resolved neighbors. Values
//!    are picked, never averaged, which gives blocky biome borders. The primary
//!    axis flips after each pass so the jaggedness spreads in both directions.
//! 3. **Finalize**: a multi-octave noise height is sampled per cell. Cells below
//!    the sea threshold become ocean at a fixed floor depth and cells just above
//!    it become beach, leaving polar (and, for beaches, tundra) cells untouched.
//!
//! All lookups wrap toroidally, so unbounded world coordinates address a
//! finite map.

use std::path::Path;

use log::info;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::biome::{Biome, BiomeId};
use crate::core::config::{MapConfig, SeaConfig};
use crate::core::error::{Error, Result};

/// Wraps `n` into `[0, max)`.
#[inline]
pub fn wrap(n: i64, max: usize) -> usize {
    n.rem_euclid(max as i64) as usize
}

/// A dense 2D grid with toroidal lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct MapGrid<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy + Default> MapGrid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        MapGrid {
            data: vec![T::default(); width * height],
            width,
            height,
        }
    }
}

impl<T: Copy> MapGrid<T> {
    fn from_data(data: Vec<T>, width: usize, height: usize) -> Result<Self> {
        if data.len() != width * height {
            return Err(Error::MalformedMap(format!(
                "grid holds {} cells, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(MapGrid {
            data,
            width,
            height,
        })
    }

    /// Wrapped lookup.
    pub fn get(&self, x: i64, y: i64) -> T {
        self.data[wrap(y, self.height) * self.width + wrap(x, self.width)]
    }

    /// Wrapped write.
    pub fn set(&mut self, x: i64, y: i64, value: T) {
        let index = wrap(y, self.height) * self.width + wrap(x, self.width);
        self.data[index] = value;
    }

    /// Unwrapped lookup for in-range coordinates.
    #[inline]
    fn fast_get(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    #[inline]
    fn fast_set(&mut self, x: usize, y: usize, value: T) {
        self.data[y * self.width + x] = value;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// Construction progress of a `WorldMap`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapStage {
    Uninitialized,
    Seeded,
    /// Number of refinement passes applied so far.
    Refined(u32),
    Finalized,
}

/// The persisted form of a map: dimensions, seed and the raw grids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub biome: Option<Vec<BiomeId>>,
    pub depth: Option<Vec<f32>>,
}

/// Biome ids and column heights for every block column of the world.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldMap {
    width: usize,
    height: usize,
    seed: u64,
    stage: MapStage,
    refine_horizontal: bool,
    biome_map: Option<MapGrid<BiomeId>>,
    depth_map: Option<MapGrid<f32>>,
}

impl WorldMap {
    /// An uninitialized map with the dimensions of its seed grid.
    fn new(width: usize, height: usize, seed: u64) -> Self {
        WorldMap {
            width,
            height,
            seed,
            stage: MapStage::Uninitialized,
            refine_horizontal: false,
            biome_map: None,
            depth_map: None,
        }
    }

    /// Runs the full seed / refine / finalize pipeline.
    ///
    /// The result depends only on `seed`, `map` and `sea`.
    pub fn generate(map: &MapConfig, sea: &SeaConfig, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut world_map = WorldMap::new(map.width, map.height, seed);

        world_map.seed_biomes(&mut rng);
        for _ in 0..map.subdivisions {
            world_map.refine(&mut rng);
        }
        world_map.finalize(sea);

        info!(
            "Generated {}x{} world map with seed {}",
            world_map.width, world_map.height, seed
        );
        world_map
    }

    /// Assigns every seed cell a weighted random land biome, arctic on the
    /// first and last rows.
    fn seed_biomes(&mut self, rng: &mut fastrand::Rng) {
        let mut biome_map = MapGrid::new(self.width, self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                if y == 0 || y == self.height - 1 {
                    biome_map.fast_set(x, y, Biome::Arctic.id());
                    continue;
                }

                let roll = rng.f32();
                let biome = if roll < 0.33 {
                    Biome::Grassland
                } else if roll < 0.5 {
                    Biome::Tundra
                } else if roll < 0.75 {
                    Biome::Corruption
                } else {
                    Biome::Desert
                };
                biome_map.fast_set(x, y, biome.id());
            }
        }

        self.biome_map = Some(biome_map);
        self.stage = MapStage::Seeded;
    }

    /// Doubles both dimensions, filling new cells by random parent picks.
    fn refine(&mut self, rng: &mut fastrand::Rng) {
        let Some(old) = self.biome_map.take() else {
            return;
        };

        self.width *= 2;
        self.height *= 2;
        let mut biome_map = MapGrid::new(self.width, self.height);

        // Primary axis: carry originals, pick a straddled parent for the gaps.
        for x in 0..self.width {
            for y in 0..self.height {
                let (xx, yy) = ((x / 2) as i64, (y / 2) as i64);
                let (even_x, even_y) = (x % 2 == 0, y % 2 == 0);

                if even_x && even_y {
                    biome_map.fast_set(x, y, old.fast_get(x / 2, y / 2));
                } else if self.refine_horizontal && even_y {
                    biome_map.fast_set(x, y, old.get(xx + rng.i64(0..=1), yy));
                } else if !self.refine_horizontal && even_x {
                    biome_map.fast_set(x, y, old.get(xx, yy + rng.i64(0..=1)));
                }
            }
        }

        // Secondary axis: pick one of the two resolved neighbors.
        if self.refine_horizontal {
            for y in (1..self.height).step_by(2) {
                for x in 0..self.width {
                    let dy = if rng.bool() { 1 } else { -1 };
                    let value = biome_map.get(x as i64, y as i64 + dy);
                    biome_map.fast_set(x, y, value);
                }
            }
        } else {
            for y in 0..self.height {
                for x in (1..self.width).step_by(2) {
                    let dx = if rng.bool() { 1 } else { -1 };
                    let value = biome_map.get(x as i64 + dx, y as i64);
                    biome_map.fast_set(x, y, value);
                }
            }
        }

        self.refine_horizontal = !self.refine_horizontal;
        self.biome_map = Some(biome_map);
        self.stage = match self.stage {
            MapStage::Refined(passes) => MapStage::Refined(passes + 1),
            _ => MapStage::Refined(1),
        };
    }

    /// Samples the height noise and applies the ocean/beach overrides.
    fn finalize(&mut self, sea: &SeaConfig) {
        let Some(biome_map) = self.biome_map.as_mut() else {
            return;
        };

        let noise = Fbm::<Perlin>::new(self.seed as u32).set_octaves(sea.height_octaves.max(1));
        let mut depth_map = MapGrid::new(self.width, self.height);
        let scale = 4.0 / self.height as f64;

        for y in 0..self.height {
            for x in 0..self.width {
                let sample = noise.get([x as f64 * scale, y as f64 * scale]);
                let d = ((sample as f32 + 1.0) * 0.5).clamp(0.0, 1.0);
                let biome = Biome::from_id(biome_map.fast_get(x, y));

                depth_map.fast_set(x, y, 1.0 + d * 255.0);

                if d < sea.ocean_threshold && !biome.is_polar() {
                    biome_map.fast_set(x, y, Biome::Ocean.id());
                    depth_map.fast_set(x, y, sea.ocean_floor);
                } else if d < sea.beach_threshold && !biome.is_polar() && biome != Biome::Tundra {
                    biome_map.fast_set(x, y, Biome::Beach.id());
                }
            }
        }

        self.depth_map = Some(depth_map);
        self.stage = MapStage::Finalized;
    }

    /// Width of the map in block columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height (Z extent) of the map in block columns.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stage(&self) -> MapStage {
        self.stage
    }

    /// Biome of a block column, wrapping. `Missing` before seeding.
    pub fn biome_at(&self, x: i32, y: i32) -> Biome {
        self.biome_map
            .as_ref()
            .map_or(Biome::Missing, |grid| Biome::from_id(grid.get(x as i64, y as i64)))
    }

    /// Terrain height of a block column, wrapping. Zero before finalizing.
    pub fn height_at(&self, x: i32, y: i32) -> f32 {
        self.depth_map
            .as_ref()
            .map_or(0.0, |grid| grid.get(x as i64, y as i64))
    }

    /// RGB bytes of the biome map, row-major, for minimap display.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                rgb.extend_from_slice(&self.biome_at(x as i32, y as i32).color());
            }
        }
        rgb
    }

    /// Copies the map into its persisted form.
    pub fn serialize(&self) -> MapData {
        MapData {
            width: self.width,
            height: self.height,
            seed: self.seed,
            biome: self.biome_map.as_ref().map(|grid| grid.data.clone()),
            depth: self.depth_map.as_ref().map(|grid| grid.data.clone()),
        }
    }

    /// Rebuilds a map from its persisted form.
    ///
    /// # Errors
    /// `Error::MalformedMap` when a grid does not match the dimensions.
    pub fn deserialize(data: MapData) -> Result<Self> {
        if data.width == 0 || data.height == 0 {
            return Err(Error::MalformedMap(format!(
                "zero-sized map {}x{}",
                data.width, data.height
            )));
        }

        let mut map = WorldMap::new(data.width, data.height, data.seed);
        if let Some(biome) = data.biome {
            map.biome_map = Some(MapGrid::from_data(biome, data.width, data.height)?);
            map.stage = MapStage::Seeded;
        }
        if let Some(depth) = data.depth {
            map.depth_map = Some(MapGrid::from_data(depth, data.width, data.height)?);
            map.stage = MapStage::Finalized;
        }
        Ok(map)
    }

    /// Writes the map as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string(&self.serialize())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a map written by `save`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::deserialize(serde_json::from_str(&json)?)
    }
}
