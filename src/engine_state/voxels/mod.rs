//! # Voxel World
//!
//! This module contains the voxel world itself: what a block is, how chunks
//! store them, how the world map and terrain generator fill them, and how the
//! streaming controller keeps the right chunks resident.
//!
//! ## Architecture
//!
//! * **Block / Biome / Doodad**: static registries of block types, map biomes
//!   and decorative objects
//! * **Chunk**: fixed-size 3D arrays of blocks plus object placements
//! * **WorldMap**: the biome and height grids every chunk is generated from
//! * **Generation**: fills a chunk from the map
//! * **World**: streams chunks around the viewpoint and applies edits
//! * **Tasks**: chunk generation performed on worker threads
//!
//! ## Data Flow
//!
//! 1. The world requests chunks entering the view radius
//! 2. Workers generate them from the shared map and send snapshots back
//! 3. Stored chunks are meshed on workers and handed to the renderer
//! 4. Edits mutate a loaded chunk and re-mesh only that chunk

pub mod biome;
pub mod block;
pub mod chunk;
pub mod doodad;
pub mod generation;
pub mod tasks;
pub mod world;
pub mod world_map;
