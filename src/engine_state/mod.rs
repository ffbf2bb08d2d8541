//! # Engine State Module
//!
//! The core engine module that ties the voxel world to the worker pool.
//!
//! ## Key Components
//!
//! * `EngineState` - The explicit world context: configuration, world and task manager
//! * `physics` - The collision collaborator interface
//! * `rendering` - Meshing, the mesh task and the render collaborator interface
//! * `task_management` - Manages asynchronous tasks and worker threads
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Frame Loop
//!
//! The host calls `EngineState::update` once per frame with the viewpoint. The
//! update runs the streaming pass, publishes the generation tasks it returns,
//! applies every completed result and schedules queued work. Nothing in the
//! update blocks; only `init` waits, and only for the home chunk.

use std::path::Path;
use std::thread;

use cgmath::Point3;
use log::{debug, info, warn};
use web_time::{Duration, Instant};

use crate::core::{
    config::EngineConfig,
    error::{Error, Result},
};
use physics::PhysicsBackend;
use rendering::RenderBackend;
use task_management::{task::Task, TaskManager};
use voxels::{block::block_type::BlockType, world::World, world_map::{MapStage, WorldMap}};

pub mod physics;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```no_run
/// use cgmath::Point3;
/// use voxel_world::core::EngineConfig;
/// use voxel_world::engine_state::{
///     physics::NullPhysics, rendering::NullRenderer, EngineState,
/// };
///
/// let mut engine = EngineState::new(
///     EngineConfig::default(),
///     Box::new(NullRenderer),
///     Box::new(NullPhysics),
/// )?;
/// let spawn = Point3::new(16.0, 140.0, 16.0);
/// engine.init(spawn)?;
///
/// loop {
///     engine.update(spawn);
/// }
/// # Ok::<(), voxel_world::core::Error>(())
/// ```
pub struct EngineState {
    config: EngineConfig,
    /// Task manager for asynchronous operations
    task_manager: TaskManager,
    /// The streamed voxel world
    world: World,
}

impl EngineState {
    /// Creates an engine over a freshly generated world map.
    ///
    /// # Errors
    /// `Error::InvalidConfig` when the configuration fails validation.
    pub fn new(
        config: EngineConfig,
        renderer: Box<dyn RenderBackend>,
        physics: Box<dyn PhysicsBackend>,
    ) -> Result<Self> {
        config.validate()?;
        let map = WorldMap::generate(&config.map, &config.sea, config.seed);
        Self::with_map(config, map, renderer, physics)
    }

    /// Creates an engine over an existing map, e.g. one restored with `WorldMap::load`.
    ///
    /// Terrain is generated from the map's own seed, so a restored map yields
    /// the world it was saved from whatever `config.seed` says.
    ///
    /// # Errors
    /// `Error::InvalidConfig` for a bad configuration, `Error::MalformedMap`
    /// when the map has not been finalized.
    pub fn with_map(
        config: EngineConfig,
        map: WorldMap,
        renderer: Box<dyn RenderBackend>,
        physics: Box<dyn PhysicsBackend>,
    ) -> Result<Self> {
        config.validate()?;
        if map.stage() != MapStage::Finalized {
            return Err(Error::MalformedMap(format!(
                "expected a finalized map, found {:?}",
                map.stage()
            )));
        }
        if map.seed() != config.seed {
            warn!(
                "Map seed {} overrides config seed {} for terrain generation",
                map.seed(),
                config.seed
            );
        }

        let task_manager = TaskManager::new(config.worker_count);
        let world = World::new(&config, map.into(), renderer, physics);
        info!(
            "Engine ready: {:?} generation, view radius {}, {} workers",
            config.generation, config.view_radius, config.worker_count
        );

        Ok(EngineState {
            config,
            task_manager,
            world,
        })
    }

    /// Runs one frame: streaming pass, result handling and task scheduling.
    ///
    /// # Arguments
    /// * `position` - The viewpoint in world space
    pub fn update(&mut self, position: Point3<f32>) {
        for task in self.world.update_view(position) {
            self.task_manager.publish_task(task);
        }
        self.process_tasks();
    }

    /// Applies completed results and schedules queued tasks without moving the viewpoint.
    pub fn process_tasks(&mut self) {
        self.task_manager.process_completed_tasks(&mut self.world);
        self.task_manager.process_queued_tasks();
    }

    /// Blocks until the chunk containing `position` is loaded.
    ///
    /// The home chunk is requested ahead of the rest of the view so it is
    /// generated first. Streaming keeps running while waiting.
    ///
    /// # Errors
    /// `Error::InitTimeout` when the chunk is not ready within `init_timeout_ms`.
    pub fn init(&mut self, position: Point3<f32>) -> Result<()> {
        let home = World::chunk_position_of(position);
        if let Some(task) = self.world.request_chunk(home) {
            self.task_manager.publish_task(task);
        }

        let started = Instant::now();
        let timeout = Duration::from_millis(self.config.init_timeout_ms);
        let poll = Duration::from_millis(self.config.init_poll_ms);

        loop {
            self.update(position);
            if self.world.is_ready(home) {
                info!("Home chunk {:?} ready after {:?}", home, started.elapsed());
                return Ok(());
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(Error::InitTimeout { waited });
            }
            debug!("Waiting for home chunk {home:?}");
            thread::sleep(poll);
        }
    }

    /// Places a block at a world coordinate. Returns `false` when its chunk is not loaded.
    pub fn place_block(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        let task = self.world.set_block(x, y, z, block.code());
        self.publish(task)
    }

    /// Clears a block at a world coordinate. Returns `false` when its chunk is not loaded.
    pub fn break_block(&mut self, x: i32, y: i32, z: i32) -> bool {
        let task = self.world.break_block(x, y, z);
        self.publish(task)
    }

    fn publish(&mut self, task: Option<Box<dyn Task + Send>>) -> bool {
        match task {
            Some(task) => {
                self.task_manager.publish_task(task);
                true
            }
            None => false,
        }
    }

    /// Writes the world map as JSON so a later session can rebuild the same world.
    pub fn save_map(&self, path: impl AsRef<Path>) -> Result<()> {
        self.world.map().save(path)
    }

    /// True when no task is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GenerationMethod, MapConfig};
    use physics::NullPhysics;
    use rendering::NullRenderer;
    use voxels::world::ChunkState;

    fn small_config() -> EngineConfig {
        EngineConfig {
            map: MapConfig {
                width: 4,
                height: 4,
                subdivisions: 3,
            },
            generation: GenerationMethod::Solid,
            view_radius: 1,
            active_radius: 1,
            worker_count: 2,
            ..Default::default()
        }
    }

    fn engine(config: EngineConfig) -> EngineState {
        EngineState::new(config, Box::new(NullRenderer), Box::new(NullPhysics)).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            worker_count: 0,
            ..small_config()
        };
        let result = EngineState::new(config, Box::new(NullRenderer), Box::new(NullPhysics));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn init_waits_for_the_home_chunk() {
        let mut engine = engine(small_config());
        engine.init(Point3::new(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(engine.world().chunk_state(Point3::new(0, 0, 0)), ChunkState::Loaded);
    }

    #[test]
    fn init_times_out_when_the_home_chunk_never_loads() {
        let config = EngineConfig {
            init_timeout_ms: 30,
            init_poll_ms: 5,
            ..small_config()
        };
        // A home chunk below the world is never requested, so it never loads.
        let mut engine = engine(config);
        let err = engine.init(Point3::new(5.0, -40.0, 5.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::InitTimeout { waited } if waited >= Duration::from_millis(30)
        ));
    }

    #[test]
    fn unfinished_map_is_rejected() {
        let data = voxels::world_map::MapData {
            width: 4,
            height: 4,
            seed: 1,
            biome: Some(vec![1; 16]),
            depth: None,
        };
        let map = WorldMap::deserialize(data).unwrap();
        let result = EngineState::with_map(
            small_config(),
            map,
            Box::new(NullRenderer),
            Box::new(NullPhysics),
        );
        assert!(matches!(result, Err(Error::MalformedMap(_))));
    }

    #[test]
    fn edits_report_whether_they_applied() {
        let mut engine = engine(small_config());
        engine.init(Point3::new(5.0, 5.0, 5.0)).unwrap();

        assert!(engine.break_block(1, 1, 1));
        assert!(engine.place_block(1, 1, 1, BlockType::Granite));
        assert!(!engine.break_block(1, 500, 1));
        assert_eq!(engine.world().get_block(1, 1, 1), Some(BlockType::Granite.code()));
    }

    #[test]
    fn saved_map_restores_the_same_world() {
        let engine = engine(small_config());
        let path =
            std::env::temp_dir().join(format!("voxel-world-map-{}.json", std::process::id()));
        engine.save_map(&path).unwrap();

        let restored = WorldMap::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(restored.serialize(), engine.world().map().serialize());
    }
}
