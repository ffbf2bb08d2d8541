//! Collision side of the voxel engine.
//!
//! Only chunks inside the active radius carry collision. The world tells a
//! [`PhysicsBackend`] when a chunk enters or leaves that radius and when a
//! collidable chunk is edited.

use log::trace;

use crate::core::spatial_key::SpatialKey;
use crate::engine_state::voxels::chunk::Chunk;

pub trait PhysicsBackend {
    /// Build collision for a chunk that entered the active radius.
    fn add_chunk(&mut self, chunk: &Chunk);
    /// Rebuild collision for an edited collidable chunk.
    fn update_chunk(&mut self, chunk: &Chunk);
    /// Drop collision for a chunk that left the active radius or was unloaded.
    fn rem_chunk(&mut self, key: SpatialKey);
}

/// A backend without collision that traces every call.
#[derive(Debug, Default)]
pub struct NullPhysics;

impl PhysicsBackend for NullPhysics {
    fn add_chunk(&mut self, chunk: &Chunk) {
        trace!("physics add_chunk {:?}: {} solid", chunk.position, chunk.solid_count());
    }

    fn update_chunk(&mut self, chunk: &Chunk) {
        trace!("physics update_chunk {:?}", chunk.position);
    }

    fn rem_chunk(&mut self, key: SpatialKey) {
        trace!("physics rem_chunk {key:#x}");
    }
}
