//! Per-face quad construction and the chunk mesher.
//!
//! # Architecture
//! - [`Face`]: a single visible voxel side with its corners, texture layer and shade
//! - [`ChunkGeometry`]: the parallel vertex buffers of one chunk
//! - [`mesh`]: chunk → geometry
//! - [`ChunkMesh`]: geometry tagged with the chunk identity and edit version

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
