//! Rendering side of the voxel engine.
//!
//! The engine never talks to a graphics API directly. Finished chunk meshes are
//! handed to a [`RenderBackend`], which owns whatever GPU resources it needs and
//! names them by the chunk's spatial key.

use log::trace;

use crate::core::spatial_key::SpatialKey;

pub mod meshing;
pub mod tasks;

pub use meshing::{ChunkGeometry, ChunkMesh};

/// Receives chunk meshes as they are built and released.
///
/// Calls arrive on the main thread, in order, and are issued only on
/// transitions: `add_chunk` once per loaded chunk, `update_chunk` for every
/// later re-mesh and `rem_chunk` once when the chunk is unloaded.
pub trait RenderBackend {
    /// A chunk was meshed for the first time since it was loaded.
    fn add_chunk(&mut self, mesh: &ChunkMesh);
    /// An edited chunk was re-meshed.
    fn update_chunk(&mut self, mesh: &ChunkMesh);
    /// The chunk left the view radius; free its resources.
    fn rem_chunk(&mut self, key: SpatialKey);
}

/// A backend that draws nothing and traces every call.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl RenderBackend for NullRenderer {
    fn add_chunk(&mut self, mesh: &ChunkMesh) {
        trace!(
            "add_chunk {:?}: {} faces, {} objects",
            mesh.position,
            mesh.geometry.face_count(),
            mesh.objects.len()
        );
    }

    fn update_chunk(&mut self, mesh: &ChunkMesh) {
        trace!("update_chunk {:?} v{}", mesh.position, mesh.version);
    }

    fn rem_chunk(&mut self, key: SpatialKey) {
        trace!("rem_chunk {key:#x}");
    }
}
