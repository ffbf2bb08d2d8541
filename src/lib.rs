#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A streamed voxel world: a procedurally built biome/height map, chunk
//! generation and meshing on worker threads, and a streaming controller that
//! keeps the chunks around a moving viewpoint resident.
//!
//! ## Key Modules
//!
//! * `core` - Configuration, the crate error type and spatial keys
//! * `engine_state` - The engine context with the world, meshing, collaborator
//!   interfaces and task management
//!
//! ## Architecture
//!
//! The main thread owns the chunk map and runs the per-frame streaming pass.
//! Generation and meshing run on a fixed worker pool and exchange owned chunk
//! snapshots with the main thread over channels. The world map is the only
//! object shared between threads and is frozen before any worker sees it.
//!
//! Rendering and collision live outside the crate behind the
//! `RenderBackend` and `PhysicsBackend` traits.
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     voxel_world::init_logger();
//!     voxel_world::run().unwrap();
//! }
//! ```

use cgmath::Point3;
use log::info;

pub mod core;
pub mod engine_state;

use crate::core::{config::EngineConfig, error::Result};
use engine_state::{physics::NullPhysics, rendering::NullRenderer, EngineState};

/// Number of frames the demo walks for.
const DEMO_FRAMES: usize = 240;

/// Installs the stdout logger, filtered by `RUST_LOG`.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
}

/// Runs a headless streaming session.
///
/// The first command line argument, when present, is a JSON config file. The
/// second is a path the world map is saved to afterwards.
pub fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let save_path = args.next();

    let mut engine = EngineState::new(config, Box::new(NullRenderer), Box::new(NullPhysics))?;

    let ground = engine.world().map().height_at(16, 16).ceil();
    let mut position = Point3::new(16.5, ground + 2.0, 16.5);
    engine.init(position)?;

    let (x, y, z) = (16, ground as i32 - 1, 16);
    if engine.break_block(x, y, z) {
        info!("Broke the block under the spawn point at ({x}, {y}, {z})");
    }

    for _ in 0..DEMO_FRAMES {
        position.x += 1.0;
        engine.update(position);
        std::thread::sleep(std::time::Duration::from_millis(4));
    }

    let world = engine.world();
    info!(
        "Walked to {:?}: {} chunks loaded, {} doodads live",
        world.center(),
        world.loaded_positions().len(),
        world.doodads().len()
    );

    if let Some(path) = save_path {
        engine.save_map(&path)?;
        info!("Saved world map to {path}");
    }

    Ok(())
}
