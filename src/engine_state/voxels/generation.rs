//! # Terrain Generation Module
//!
//! Fills freshly created chunks with blocks and decorative objects.
//!
//! A `TerrainGenerator` holds only seeded noise functions, so it can be shared
//! behind an `Arc` by every worker thread. Output depends solely on the chunk
//! coordinate, the generator seed and the world map. Every random choice
//! (object rotation, scale, rare spawns) is drawn from an RNG seeded by the
//! world column, which makes chunks reproducible regardless of the order
//! workers finish them in.

use log::trace;
use noise::{NoiseFn, Perlin};

use super::biome::Biome;
use super::block::block_type::BlockType;
use super::chunk::{Chunk, CHUNK_DIMENSION};
use super::doodad::DoodadKind;
use super::world_map::{wrap, WorldMap};
use crate::core::config::GenerationMethod;

/// 7x7 bitmask tiled over the world to cluster doodads.
const DITHER_PATTERN: [u8; 49] = [
    0, 1, 0, 0, 1, 0, 1, //
    1, 0, 0, 1, 0, 1, 0, //
    0, 0, 1, 0, 1, 0, 1, //
    1, 1, 0, 0, 0, 1, 0, //
    0, 0, 1, 0, 1, 0, 0, //
    0, 1, 0, 0, 0, 0, 1, //
    1, 0, 0, 0, 1, 0, 0, //
];

/// Tests whether the dither pattern places something at world column `(x, y)`.
///
/// # Arguments
/// * `size` - Base cell spacing of the pattern, in blocks.
/// * `amount` - Local density in `[0, 1]`. Higher values shrink the spacing;
///   below 0.25 nothing is placed.
pub fn dither_pattern(x: i32, y: i32, size: f64, amount: f64) -> bool {
    if amount < 0.25 {
        return false;
    }

    let s = size + size * (1.0 - amount);
    let (x, y) = (x as f64, y as f64);

    if x.rem_euclid(s) >= 1.0 || y.rem_euclid(s) >= 1.0 {
        return false;
    }

    let row = wrap((y / s).round() as i64, 7);
    let column = wrap((x / s).round() as i64, 7);
    DITHER_PATTERN[row * 7 + column] == 1
}

/// Noise sample remapped from `[-1, 1]` to `[0, 1]`.
#[inline]
fn unit_noise(noise: &Perlin, x: f64, y: f64) -> f64 {
    ((noise.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Generates chunk contents for one `GenerationMethod`.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    method: GenerationMethod,
    seed: u64,
    terrain: Perlin,
    clutter: Perlin,
}

impl TerrainGenerator {
    pub fn new(method: GenerationMethod, seed: u64) -> Self {
        let noise_seed = seed as u32;
        TerrainGenerator {
            method,
            seed,
            terrain: Perlin::new(noise_seed),
            clutter: Perlin::new(noise_seed.wrapping_add(1)),
        }
    }

    pub fn method(&self) -> GenerationMethod {
        self.method
    }

    /// Fills `chunk` in place according to the configured method.
    pub fn generate(&self, chunk: &mut Chunk, map: &WorldMap) {
        match self.method {
            GenerationMethod::Overworld => self.overworld(chunk, map),
            GenerationMethod::Perlin => self.perlin(chunk),
            GenerationMethod::Solid => Self::solid(chunk),
            GenerationMethod::Empty => {}
        }

        trace!(
            "Generated chunk {:?}: {} solid, {} objects",
            chunk.position,
            chunk.solid_count(),
            chunk.object_count()
        );
    }

    /// RNG for one world column, independent of generation order.
    fn column_rng(&self, x: i32, z: i32) -> fastrand::Rng {
        let column = ((x as u32 as u64) << 32) | z as u32 as u64;
        fastrand::Rng::with_seed(
            self.seed.rotate_left(17) ^ column.wrapping_mul(0x9E37_79B9_7F4A_7C15),
        )
    }

    /// Biome map driven terrain: each column is filled with its biome's
    /// surface block up to the map height, then clutter is dithered on top.
    fn overworld(&self, chunk: &mut Chunk, map: &WorldMap) {
        let origin = chunk.origin();
        let map_height = map.height().max(1) as f64;

        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let (xx, zz) = (origin.x + x, origin.z + z);
                let biome = map.biome_at(xx, zz);
                let block = biome.surface_code();
                let top = map.height_at(xx, zz).ceil() as i32;

                let low = origin.y.max(0);
                let high = top.min(origin.y + CHUNK_DIMENSION);
                for y in low..high {
                    chunk.set(x, y - origin.y, z, block);
                }

                let local_top = top - origin.y;
                if !(0..CHUNK_DIMENSION).contains(&local_top) {
                    continue;
                }

                let c = unit_noise(
                    &self.clutter,
                    xx as f64 / map_height * 30.0,
                    zz as f64 / map_height * 30.0,
                );

                match biome {
                    Biome::Desert if dither_pattern(xx, zz, 5.0, c) => {
                        let mut rng = self.column_rng(xx, zz);
                        let rotation = rng.u8(0..4) as f32 * 90.0;
                        chunk.add_object(DoodadKind::Cactus, x, local_top, z, rotation, 1.0);
                    }
                    Biome::Grassland if dither_pattern(xx, zz, 3.0, c) => {
                        let mut rng = self.column_rng(xx, zz);
                        let rotation = rng.f32() * 360.0;
                        let scale = rng.f32() * 0.4 + 0.8;
                        chunk.add_object(DoodadKind::Tree2, x, local_top, z, rotation, scale);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Standalone rolling hills that ignore the biome map.
    fn perlin(&self, chunk: &mut Chunk) {
        let origin = chunk.origin();
        let grass = BlockType::Grass.code();
        let sample = |x: f64, z: f64, scale: f64| unit_noise(&self.terrain, x / scale, z / scale);

        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let (xx, zz) = ((origin.x + x) as f64, (origin.z + z) as f64);
                let terrain = sample(xx, zz, 44.0) * sample(xx, zz, 128.0);
                let height = terrain * (CHUNK_DIMENSION - 1) as f64 + 1.0;
                let top = height.floor() as i32 + 1;

                let low = origin.y.max(0);
                let high = top.min(origin.y + CHUNK_DIMENSION);
                for y in low..high {
                    chunk.set(x, y - origin.y, z, grass);
                }

                let local_top = top - origin.y;
                if !(0..CHUNK_DIMENSION).contains(&local_top) {
                    continue;
                }

                let tree = sample(xx, zz, 50.0) * 2.0 + sample(xx, zz, 400.0);
                let pumpkin =
                    sample(xx, zz, 2.0) * 2.0 + sample(xx + 10_000.0, zz + 10_000.0, 100.0);
                let mut rng = self.column_rng(origin.x + x, origin.z + z);

                if tree > 1.5 && rng.f32() < 0.05 {
                    let rotation = rng.u8(0..4) as f32 * 90.0;
                    let scale = rng.f32() * 0.6 + 0.2;
                    chunk.add_object(DoodadKind::Tree, x, local_top, z, rotation, scale);
                } else if pumpkin > 2.5 {
                    let rotation = rng.f32() * 360.0;
                    let scale = rng.f32() * 0.4 + 0.6;
                    chunk.add_object(DoodadKind::Pumpkin, x, local_top, z, rotation, scale);
                } else if rng.f32() < 0.0005 {
                    let kind = if rng.bool() { DoodadKind::Fox } else { DoodadKind::Ocelot };
                    chunk.add_object(kind, x, local_top, z, 0.0, 1.0);
                } else if rng.f32() < 0.5 {
                    chunk.add_object(DoodadKind::Grass2, x, local_top, z, rng.f32() * 360.0, 1.0);
                }
            }
        }
    }

    fn solid(chunk: &mut Chunk) {
        let loam = BlockType::Loam.code();
        for y in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    chunk.set(x, y, z, loam);
                }
            }
        }
    }
}
