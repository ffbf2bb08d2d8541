//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 32x32x32 cube of block codes plus
//! the decorative objects placed inside it.
//!
//! ## Storage
//!
//! Voxels live in a flat dense array addressed as `y * N² + z * N + x`. The
//! array is allocated lazily on the first non-air write, so chunks made only of
//! air (the sky above the terrain) cost nothing beyond their header.
//!
//! A running `solid_count` is maintained on every write that crosses the
//! air/non-air boundary, which makes `is_empty` and `is_full` O(1).
//!
//! ### Bounds
//! Reads outside `[0, N)` on any axis return air and writes there are ignored.
//! The mesher and the generators probe one cell past the edge when deciding
//! face visibility, so this must never panic.

use std::collections::BTreeMap;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::block::BlockTypeSize;
use super::doodad::{DoodadId, DoodadKind};
use crate::core::spatial_key::{self, SpatialKey};

pub mod chunk_iteration;
mod chunk_snapshot;

pub use chunk_snapshot::ChunkData;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 32;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Where a decorative object sits inside its chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectPlacement {
    /// Chunk-local block coordinates.
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Rotation around the vertical axis, in degrees.
    pub rotation: f32,
    pub scale: f32,
    /// Registry id, assigned once the owning chunk is loaded on the main thread.
    #[serde(default)]
    pub id: Option<DoodadId>,
}

/// Decorative objects of a chunk grouped by kind.
pub type ObjectMap = BTreeMap<DoodadKind, Vec<ObjectPlacement>>;

/// Represents a 32x32x32 collection of voxel blocks in the world.
///
/// Chunks are the unit of loading, meshing and streaming. A chunk's identity is
/// its position in chunk coordinates (not block coordinates).
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    pub position: Point3<i32>,

    /// Dense block codes, `None` until the first non-air write.
    voxels: Option<Vec<BlockTypeSize>>,

    /// Number of non-air voxels in `voxels`.
    solid_count: u32,

    /// Decorative object placements keyed by kind. Append-only during generation.
    pub objects: ObjectMap,
}

/// Flat index of a chunk-local coordinate, or `None` when it lies outside the chunk.
#[inline]
fn voxel_index(x: i32, y: i32, z: i32) -> Option<usize> {
    let range = 0..CHUNK_DIMENSION;
    if range.contains(&x) && range.contains(&y) && range.contains(&z) {
        Some((y * CHUNK_PLANE_SIZE + z * CHUNK_DIMENSION + x) as usize)
    } else {
        None
    }
}

impl Chunk {
    /// Creates an empty chunk (all air, nothing allocated).
    pub fn new(position: Point3<i32>) -> Self {
        Chunk {
            position,
            voxels: None,
            solid_count: 0,
            objects: ObjectMap::new(),
        }
    }

    /// The spatial key of this chunk's position.
    pub fn key(&self) -> SpatialKey {
        spatial_key::key_of(self.position)
    }

    /// World-space block coordinate of this chunk's (0, 0, 0) voxel.
    pub fn origin(&self) -> Point3<i32> {
        Point3::new(
            self.position.x * CHUNK_DIMENSION,
            self.position.y * CHUNK_DIMENSION,
            self.position.z * CHUNK_DIMENSION,
        )
    }

    /// Gets the block code at chunk-local coordinates. Air when unallocated or out of bounds.
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        match (&self.voxels, voxel_index(x, y, z)) {
            (Some(voxels), Some(index)) => voxels[index],
            _ => 0,
        }
    }

    /// Sets the block code at chunk-local coordinates.
    ///
    /// Storage is allocated on the first non-air write. Writing air into an
    /// unallocated chunk, or writing out of bounds, does nothing.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockTypeSize) {
        let Some(index) = voxel_index(x, y, z) else {
            return;
        };

        if self.voxels.is_none() {
            if block == 0 {
                return;
            }
            self.voxels = Some(vec![0; CHUNK_SIZE as usize]);
        }

        if let Some(voxels) = self.voxels.as_mut() {
            let previous = std::mem::replace(&mut voxels[index], block);
            match (previous != 0, block != 0) {
                (false, true) => self.solid_count += 1,
                (true, false) => self.solid_count -= 1,
                _ => {}
            }
        }
    }

    /// Whether the voxel holds anything but air. `false` outside the chunk.
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z) != 0
    }

    /// Whether the voxel hides its neighbors' faces. `false` outside the chunk.
    ///
    /// Any non-air code counts, whatever its `BlockInfo::opaque` flag says.
    pub fn is_opaque(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z) != 0
    }

    /// True when no non-air voxel was ever written.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_none()
    }

    /// True when every voxel is non-air.
    pub fn is_full(&self) -> bool {
        self.solid_count == CHUNK_SIZE as u32
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> u32 {
        self.solid_count
    }

    /// Appends a decorative object placement. Placements are never deduplicated.
    pub fn add_object(
        &mut self,
        kind: DoodadKind,
        x: i32,
        y: i32,
        z: i32,
        rotation: f32,
        scale: f32,
    ) {
        self.objects.entry(kind).or_default().push(ObjectPlacement {
            x,
            y,
            z,
            rotation,
            scale,
            id: None,
        });
    }

    /// Total number of object placements across all kinds.
    pub fn object_count(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }

    /// Raw voxel storage, used by snapshots and the solid-voxel iterator.
    pub(crate) fn voxels(&self) -> Option<&[BlockTypeSize]> {
        self.voxels.as_deref()
    }
}
