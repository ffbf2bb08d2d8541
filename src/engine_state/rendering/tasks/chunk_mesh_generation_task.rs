//! Task for generating mesh data for chunks in a background thread.
//!
//! The task carries a snapshot of the chunk rather than a shared reference, so
//! the main thread can keep editing the live chunk while the mesh is built. The
//! snapshot's version travels with the result and stale meshes are dropped
//! when they come back.

use log::warn;

use crate::{
    core::{config::ShadeConfig, error::Result, spatial_key::SpatialKey},
    engine_state::{
        rendering::meshing::{self, ChunkMesh},
        task_management::task::{Task, TaskResult, TaskSet},
        voxels::{
            chunk::{Chunk, ChunkData},
            world::World,
        },
    },
};

/// A task that meshes one chunk snapshot.
pub struct ChunkMeshGenerationTask {
    /// Snapshot of the chunk to mesh
    data: ChunkData,
    /// Edit version the snapshot was taken at
    version: u64,
    shade: ShadeConfig,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `data` - Snapshot of the chunk
    /// * `version` - The chunk's edit version at snapshot time
    /// * `shade` - Face brightness constants
    pub fn new(data: ChunkData, version: u64, shade: ShadeConfig) -> Self {
        ChunkMeshGenerationTask {
            data,
            version,
            shade,
        }
    }

    fn build(&self) -> Result<ChunkMesh> {
        let chunk = Chunk::deserialize(self.data.clone())?;
        Ok(ChunkMesh {
            key: chunk.key(),
            position: chunk.position,
            version: self.version,
            geometry: meshing::mesh(&chunk, &self.shade),
            objects: chunk.objects,
        })
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkMeshGenerationTaskResult {
            position: self.data.position(),
            mesh: self.build(),
        })
    }

    fn chunk_key(&self) -> Option<SpatialKey> {
        Some(self.data.key())
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    position: cgmath::Point3<i32>,
    mesh: Result<ChunkMesh>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Hands the mesh to the world, which forwards it to the render backend
    /// unless the chunk was unloaded or edited in the meantime.
    fn handle_result(self: Box<Self>, world: &mut World) -> TaskSet {
        match self.mesh {
            Ok(mesh) => world.handle_mesh(mesh),
            Err(err) => warn!("Failed to mesh chunk {:?}: {err}", self.position),
        }
        TaskSet::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn meshes_the_snapshot_with_its_version() {
        let mut chunk = Chunk::new(Point3::new(1, 2, 3));
        chunk.set(0, 0, 0, 5);
        let task = ChunkMeshGenerationTask::new(chunk.serialize(), 7, ShadeConfig::default());

        let mesh = task.build().unwrap();
        assert_eq!(mesh.key, chunk.key());
        assert_eq!(mesh.version, 7);
        assert_eq!(mesh.geometry.face_count(), 6);
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let mut data = Chunk::new(Point3::new(0, 0, 0)).serialize();
        data.data = Some(vec![1; 10]);
        let task = ChunkMeshGenerationTask::new(data, 0, ShadeConfig::default());
        assert!(task.build().is_err());
    }
}
