//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates chunk data on
//! a worker thread. It is scheduled by the streaming pass for every chunk that
//! enters the view radius.

use std::sync::Arc;

use cgmath::Point3;

use crate::core::spatial_key::{self, SpatialKey};
use crate::engine_state::{
    task_management::task::{Task, TaskResult, TaskSet},
    voxels::{
        chunk::{Chunk, ChunkData},
        generation::TerrainGenerator,
        world::World,
        world_map::WorldMap,
    },
};

/// A task that generates chunk data asynchronously.
///
/// This task is responsible for:
/// 1. Generating the chunk at the specified position from the shared map
/// 2. Handing a snapshot back to the world, which stores it and schedules meshing
pub struct ChunkGenerationTask {
    /// The position of the chunk to generate (in chunk coordinates)
    position: Point3<i32>,
    /// The frozen world map
    map: Arc<WorldMap>,
    generator: Arc<TerrainGenerator>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates where the chunk should be generated
    /// * `map` - The shared world map
    /// * `generator` - The shared terrain generator
    pub fn new(
        position: Point3<i32>,
        map: Arc<WorldMap>,
        generator: Arc<TerrainGenerator>,
    ) -> Self {
        ChunkGenerationTask {
            position,
            map,
            generator,
        }
    }

    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    fn generate(&self) -> ChunkData {
        let mut chunk = Chunk::new(self.position);
        self.generator.generate(&mut chunk, &self.map);
        chunk.into_data()
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            data: self.generate(),
        })
    }

    fn chunk_key(&self) -> Option<SpatialKey> {
        Some(spatial_key::key_of(self.position))
    }
}

/// The result of a chunk generation task: a snapshot of the generated chunk.
pub struct ChunkGenerationTaskResult {
    data: ChunkData,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Stores the chunk in the world, which returns the mesh task for it.
    fn handle_result(self: Box<Self>, world: &mut World) -> TaskSet {
        world.handle_generated(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GenerationMethod, MapConfig, SeaConfig};

    #[test]
    fn generates_the_requested_chunk() {
        let map = WorldMap::generate(
            &MapConfig {
                width: 2,
                height: 3,
                subdivisions: 1,
            },
            &SeaConfig::default(),
            3,
        );
        let task = ChunkGenerationTask::new(
            Point3::new(0, 0, 0),
            Arc::new(map),
            Arc::new(TerrainGenerator::new(GenerationMethod::Solid, 3)),
        );

        let data = task.generate();
        assert_eq!(data.position(), Point3::new(0, 0, 0));
        assert_eq!(Chunk::deserialize(data).unwrap().solid_count(), 32 * 32 * 32);
    }
}
