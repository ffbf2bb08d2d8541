//! # World Module
//!
//! This module provides the `World` struct, the streaming controller that
//! decides which chunks are resident around a moving viewpoint.
//!
//! ## Chunk Lifecycle
//!
//! Each chunk coordinate is in one of three states:
//!
//! - **Unloaded**: absent from the chunk map
//! - **Loading**: present, a generation task is in flight
//! - **Loaded**: present with its voxel data
//!
//! `update_view` requests every chunk within the view radius that is not yet
//! present, unloads every loaded chunk that fell outside it, and attaches or
//! detaches collision for chunks crossing the active radius. The Loading
//! entry coalesces duplicate requests, so the pass is idempotent and safe to
//! run every frame.
//!
//! ## Responses
//!
//! Generated chunks and meshes arrive in any order. A generation response for
//! a chunk that is already Loaded is dropped. A mesh is dropped when its chunk
//! is gone or has been edited since the snapshot was taken.
//!
//! ## Edits
//!
//! Block edits mutate the loaded chunk in place, bump its version and return a
//! single re-mesh task for that chunk. Edits that land in a chunk that is not
//! Loaded do nothing.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, trace, warn};

use super::block::BlockTypeSize;
use super::chunk::{Chunk, ChunkData, CHUNK_DIMENSION};
use super::doodad::{Doodad, DoodadId, DoodadRegistry};
use super::generation::TerrainGenerator;
use super::tasks::chunk_generation_task::ChunkGenerationTask;
use super::world_map::WorldMap;
use crate::core::config::{EngineConfig, ShadeConfig};
use crate::core::spatial_key::{self, SpatialKey};
use crate::engine_state::physics::PhysicsBackend;
use crate::engine_state::rendering::{
    tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask, ChunkMesh, RenderBackend,
};
use crate::engine_state::task_management::task::{Task, TaskSet};

/// Streaming state of one chunk coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Unloaded,
    Loading,
    Loaded,
}

/// A resident chunk and what the collaborators currently hold for it.
#[derive(Debug)]
pub struct LoadedChunk {
    pub chunk: Chunk,
    /// Bumped on every edit; meshes built from older versions are stale.
    pub version: u64,
    /// The render backend has received `add_chunk` for this chunk.
    pub rendered: bool,
    /// The physics backend has received `add_chunk` for this chunk.
    pub collidable: bool,
    /// Registry ids of the doodads this chunk placed.
    pub doodads: Vec<DoodadId>,
}

#[derive(Debug)]
enum ChunkSlot {
    Loading,
    Loaded(LoadedChunk),
}

/// Squared Euclidean distance between two chunk coordinates.
#[inline]
fn distance_squared(a: Point3<i32>, b: Point3<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    let dz = (a.z - b.z) as i64;
    dx * dx + dy * dy + dz * dz
}

/// The streamed voxel world around a viewpoint.
pub struct World {
    map: Arc<WorldMap>,
    generator: Arc<TerrainGenerator>,
    view_radius: i32,
    active_radius: i32,
    shade: ShadeConfig,
    chunks: HashMap<SpatialKey, ChunkSlot>,
    doodads: DoodadRegistry,
    renderer: Box<dyn RenderBackend>,
    physics: Box<dyn PhysicsBackend>,
    /// Chunk containing the viewpoint of the last streaming pass.
    center: Option<Point3<i32>>,
}

impl World {
    /// Creates an empty world over a finished map.
    ///
    /// # Arguments
    /// * `config` - Radii, shading and generation method
    /// * `map` - The frozen world map shared with generation tasks; its seed
    ///   also seeds the terrain generator
    /// * `renderer` - Receives chunk meshes
    /// * `physics` - Receives collidable chunks
    pub fn new(
        config: &EngineConfig,
        map: Arc<WorldMap>,
        renderer: Box<dyn RenderBackend>,
        physics: Box<dyn PhysicsBackend>,
    ) -> Self {
        let generator = Arc::new(TerrainGenerator::new(config.generation, map.seed()));
        World {
            map,
            generator,
            view_radius: config.view_radius as i32,
            active_radius: config.active_radius as i32,
            shade: config.shade,
            chunks: HashMap::new(),
            doodads: DoodadRegistry::new(),
            renderer,
            physics,
            center: None,
        }
    }

    /// Chunk coordinate containing a world-space position.
    pub fn chunk_position_of(position: Point3<f32>) -> Point3<i32> {
        let n = CHUNK_DIMENSION as f32;
        Point3::new(
            (position.x / n).floor() as i32,
            (position.y / n).floor() as i32,
            (position.z / n).floor() as i32,
        )
    }

    /// Runs one streaming pass around `position` (world space).
    ///
    /// # Returns
    /// Generation tasks for every chunk that entered the view radius, nearest first.
    pub fn update_view(&mut self, position: Point3<f32>) -> TaskSet {
        let center = Self::chunk_position_of(position);
        self.center = Some(center);

        let r = self.view_radius;
        let view_squared = (r as i64) * (r as i64);
        let active_squared = (self.active_radius as i64) * (self.active_radius as i64);

        let mut candidates = Vec::new();
        for dy in -r..=r {
            for dz in -r..=r {
                for dx in -r..=r {
                    let candidate = Point3::new(center.x + dx, center.y + dy, center.z + dz);
                    if distance_squared(center, candidate) <= view_squared {
                        candidates.push(candidate);
                    }
                }
            }
        }
        candidates.sort_by_key(|&candidate| distance_squared(center, candidate));

        let tasks: TaskSet = candidates
            .into_iter()
            .filter_map(|candidate| self.request_chunk(candidate))
            .collect();

        let out_of_range: Vec<SpatialKey> = self
            .chunks
            .iter()
            .filter_map(|(key, slot)| match slot {
                ChunkSlot::Loaded(loaded)
                    if distance_squared(center, loaded.chunk.position) > view_squared =>
                {
                    Some(*key)
                }
                _ => None,
            })
            .collect();
        let unloaded = out_of_range.len();
        for key in out_of_range {
            self.unload(key);
        }

        for slot in self.chunks.values_mut() {
            let ChunkSlot::Loaded(loaded) = slot else {
                continue;
            };
            let active = distance_squared(center, loaded.chunk.position) <= active_squared;
            if active && !loaded.collidable {
                self.physics.add_chunk(&loaded.chunk);
                loaded.collidable = true;
            } else if !active && loaded.collidable {
                self.physics.rem_chunk(loaded.chunk.key());
                loaded.collidable = false;
            }
        }

        if !tasks.is_empty() || unloaded > 0 {
            debug!(
                "Streaming pass at {:?}: {} requested, {} unloaded, {} resident",
                center,
                tasks.len(),
                unloaded,
                self.chunks.len()
            );
        }

        tasks
    }

    /// Marks a chunk Loading and returns its generation task.
    ///
    /// Returns `None` when the chunk is below the world or already present.
    pub fn request_chunk(&mut self, position: Point3<i32>) -> Option<Box<dyn Task + Send>> {
        if position.y < 0 {
            return None;
        }

        let key = spatial_key::key_of(position);
        if self.chunks.contains_key(&key) {
            return None;
        }

        self.chunks.insert(key, ChunkSlot::Loading);
        trace!("Requesting chunk {position:?}");
        Some(Box::new(ChunkGenerationTask::new(
            position,
            self.map.clone(),
            self.generator.clone(),
        )))
    }

    /// Stores a generated chunk and returns the task that meshes it.
    pub fn handle_generated(&mut self, data: ChunkData) -> TaskSet {
        let key = data.key();
        if let Some(ChunkSlot::Loaded(_)) = self.chunks.get(&key) {
            debug!("Discarding duplicate chunk {:?}", data.position());
            return TaskSet::new();
        }

        let mut chunk = match Chunk::deserialize(data) {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!("Dropping generated chunk: {err}");
                self.chunks.remove(&key);
                return TaskSet::new();
            }
        };

        let doodads = self.register_doodads(key, &mut chunk);

        let active_squared = (self.active_radius as i64) * (self.active_radius as i64);
        let collidable = self
            .center
            .is_some_and(|center| distance_squared(center, chunk.position) <= active_squared);
        if collidable {
            self.physics.add_chunk(&chunk);
        }

        let task: Box<dyn Task + Send> =
            Box::new(ChunkMeshGenerationTask::new(chunk.serialize(), 0, self.shade));
        trace!("Loaded chunk {:?} with {} doodads", chunk.position, doodads.len());
        self.chunks.insert(
            key,
            ChunkSlot::Loaded(LoadedChunk {
                chunk,
                version: 0,
                rendered: false,
                collidable,
                doodads,
            }),
        );

        vec![task]
    }

    /// Forwards a finished mesh to the render backend unless it is stale.
    pub fn handle_mesh(&mut self, mesh: ChunkMesh) {
        match self.chunks.get_mut(&mesh.key) {
            Some(ChunkSlot::Loaded(loaded)) if loaded.version == mesh.version => {
                if loaded.rendered {
                    self.renderer.update_chunk(&mesh);
                } else {
                    self.renderer.add_chunk(&mesh);
                    loaded.rendered = true;
                }
            }
            _ => debug!("Discarding stale mesh for {:?} v{}", mesh.position, mesh.version),
        }
    }

    /// Recovers a chunk whose task was lost with a dead worker.
    ///
    /// A Loading chunk is dropped so the next streaming pass requests it again.
    /// A Loaded chunk is re-meshed at its current version.
    pub fn reclaim_chunk(&mut self, key: SpatialKey) -> Option<Box<dyn Task + Send>> {
        if matches!(self.chunks.get(&key), Some(ChunkSlot::Loading)) {
            debug!("Reclaiming lost generation task for chunk {key:#x}");
            self.chunks.remove(&key);
            return None;
        }

        match self.chunks.get(&key) {
            Some(ChunkSlot::Loaded(loaded)) => {
                debug!("Reclaiming lost mesh task for chunk {:?}", loaded.chunk.position);
                Some(Box::new(ChunkMeshGenerationTask::new(
                    loaded.chunk.serialize(),
                    loaded.version,
                    self.shade,
                )))
            }
            _ => None,
        }
    }

    /// Gives every placement of a fresh chunk a registry entry and writes the id back.
    fn register_doodads(&mut self, key: SpatialKey, chunk: &mut Chunk) -> Vec<DoodadId> {
        let origin = chunk.origin();
        let mut ids = Vec::with_capacity(chunk.object_count());

        for (kind, placements) in chunk.objects.iter_mut() {
            for placement in placements {
                let id = self.doodads.insert(Doodad {
                    kind: *kind,
                    chunk: key,
                    position: Point3::new(
                        (origin.x + placement.x) as f32 + 0.5,
                        (origin.y + placement.y) as f32,
                        (origin.z + placement.z) as f32 + 0.5,
                    ),
                    rotation: placement.rotation,
                });
                placement.id = Some(id);
                ids.push(id);
            }
        }

        ids
    }

    /// Removes a loaded chunk and releases everything held for it.
    fn unload(&mut self, key: SpatialKey) {
        let loaded = match self.chunks.remove(&key) {
            Some(ChunkSlot::Loaded(loaded)) => loaded,
            Some(slot) => {
                self.chunks.insert(key, slot);
                return;
            }
            None => return,
        };

        if loaded.rendered {
            self.renderer.rem_chunk(key);
        }
        if loaded.collidable {
            self.physics.rem_chunk(key);
        }
        for id in loaded.doodads {
            self.doodads.remove(id);
        }
        trace!("Unloaded chunk {:?}", loaded.chunk.position);
    }

    /// Finds the chunk key and chunk-local coordinate of a world block.
    ///
    /// `x` and `z` wrap into the map's extent first; `y` below zero has no chunk.
    fn locate(&self, x: i32, y: i32, z: i32) -> Option<(SpatialKey, Point3<i32>)> {
        if y < 0 {
            return None;
        }
        let x = x.rem_euclid(self.map.width() as i32);
        let z = z.rem_euclid(self.map.height() as i32);

        let chunk = Point3::new(
            x.div_euclid(CHUNK_DIMENSION),
            y.div_euclid(CHUNK_DIMENSION),
            z.div_euclid(CHUNK_DIMENSION),
        );
        let local = Point3::new(
            x.rem_euclid(CHUNK_DIMENSION),
            y.rem_euclid(CHUNK_DIMENSION),
            z.rem_euclid(CHUNK_DIMENSION),
        );
        Some((spatial_key::key_of(chunk), local))
    }

    /// Block code at a world coordinate, or `None` when its chunk is not loaded.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<BlockTypeSize> {
        let (key, local) = self.locate(x, y, z)?;
        match self.chunks.get(&key) {
            Some(ChunkSlot::Loaded(loaded)) => Some(loaded.chunk.get(local.x, local.y, local.z)),
            _ => None,
        }
    }

    /// Writes a block at a world coordinate.
    ///
    /// # Returns
    /// The re-mesh task for the edited chunk, or `None` (and no change) when
    /// its chunk is not loaded.
    pub fn set_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        block: BlockTypeSize,
    ) -> Option<Box<dyn Task + Send>> {
        let (key, local) = self.locate(x, y, z)?;
        let Some(ChunkSlot::Loaded(loaded)) = self.chunks.get_mut(&key) else {
            debug!("Ignoring edit at ({x}, {y}, {z}): chunk not loaded");
            return None;
        };

        loaded.chunk.set(local.x, local.y, local.z, block);
        loaded.version += 1;
        if loaded.collidable {
            self.physics.update_chunk(&loaded.chunk);
        }

        Some(Box::new(ChunkMeshGenerationTask::new(
            loaded.chunk.serialize(),
            loaded.version,
            self.shade,
        )))
    }

    /// Clears a block to air. See `set_block`.
    pub fn break_block(&mut self, x: i32, y: i32, z: i32) -> Option<Box<dyn Task + Send>> {
        self.set_block(x, y, z, 0)
    }

    pub fn chunk_state(&self, position: Point3<i32>) -> ChunkState {
        match self.chunks.get(&spatial_key::key_of(position)) {
            None => ChunkState::Unloaded,
            Some(ChunkSlot::Loading) => ChunkState::Loading,
            Some(ChunkSlot::Loaded(_)) => ChunkState::Loaded,
        }
    }

    /// True once the chunk holds its voxel data.
    pub fn is_ready(&self, position: Point3<i32>) -> bool {
        self.chunk_state(position) == ChunkState::Loaded
    }

    /// The loaded chunk at a chunk coordinate.
    pub fn loaded_chunk(&self, position: Point3<i32>) -> Option<&LoadedChunk> {
        match self.chunks.get(&spatial_key::key_of(position)) {
            Some(ChunkSlot::Loaded(loaded)) => Some(loaded),
            _ => None,
        }
    }

    pub fn chunk(&self, position: Point3<i32>) -> Option<&Chunk> {
        self.loaded_chunk(position).map(|loaded| &loaded.chunk)
    }

    /// Positions of every loaded chunk, in no particular order.
    pub fn loaded_positions(&self) -> Vec<Point3<i32>> {
        self.chunks
            .values()
            .filter_map(|slot| match slot {
                ChunkSlot::Loaded(loaded) => Some(loaded.chunk.position),
                ChunkSlot::Loading => None,
            })
            .collect()
    }

    /// Number of chunks waiting for their generation response.
    pub fn loading_count(&self) -> usize {
        self.chunks
            .values()
            .filter(|slot| matches!(slot, ChunkSlot::Loading))
            .count()
    }

    pub fn doodads(&self) -> &DoodadRegistry {
        &self.doodads
    }

    pub fn doodads_mut(&mut self) -> &mut DoodadRegistry {
        &mut self.doodads
    }

    pub fn map(&self) -> &Arc<WorldMap> {
        &self.map
    }

    pub fn center(&self) -> Option<Point3<i32>> {
        self.center
    }
}
