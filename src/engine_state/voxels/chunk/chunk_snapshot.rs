//! # Chunk Snapshot Module
//!
//! `ChunkData` is the plain value a chunk is copied into whenever it crosses a
//! thread boundary: generation workers send it back to the main thread and the
//! main thread sends it to mesh workers. Nothing in it is shared, so a worker
//! can never observe an edit made after the snapshot was taken.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::{Chunk, ObjectMap, CHUNK_SIZE};
use crate::core::error::{Error, Result};
use crate::core::spatial_key;
use crate::engine_state::voxels::block::BlockTypeSize;

/// A serialized chunk: coordinate, raw voxels (absent when never allocated),
/// object placements and solid count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkData {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub data: Option<Vec<BlockTypeSize>>,
    pub objects: ObjectMap,
    pub solid_count: u32,
}

impl ChunkData {
    pub fn position(&self) -> Point3<i32> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn key(&self) -> spatial_key::SpatialKey {
        spatial_key::encode(self.x, self.y, self.z)
    }
}

impl Chunk {
    /// Copies the chunk into a snapshot.
    pub fn serialize(&self) -> ChunkData {
        ChunkData {
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            data: self.voxels.clone(),
            objects: self.objects.clone(),
            solid_count: self.solid_count,
        }
    }

    /// Moves the chunk into a snapshot without copying its voxels.
    pub fn into_data(self) -> ChunkData {
        ChunkData {
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            data: self.voxels,
            objects: self.objects,
            solid_count: self.solid_count,
        }
    }

    /// Rebuilds a chunk from a snapshot.
    ///
    /// # Errors
    /// `Error::MalformedChunk` when the voxel array is not exactly N³ long or
    /// the recorded solid count disagrees with the voxels.
    pub fn deserialize(data: ChunkData) -> Result<Chunk> {
        let key = data.key();
        let counted = match &data.data {
            Some(voxels) if voxels.len() != CHUNK_SIZE as usize => {
                return Err(Error::MalformedChunk {
                    key,
                    reason: format!("expected {} voxels, got {}", CHUNK_SIZE, voxels.len()),
                });
            }
            Some(voxels) => voxels.iter().filter(|&&block| block != 0).count() as u32,
            None => 0,
        };

        if counted != data.solid_count {
            return Err(Error::MalformedChunk {
                key,
                reason: format!(
                    "solid count {} does not match {} non-air voxels",
                    data.solid_count, counted
                ),
            });
        }

        Ok(Chunk {
            position: Point3::new(data.x, data.y, data.z),
            voxels: data.data,
            solid_count: counted,
            objects: data.objects,
        })
    }
}
