//! Mesh generation for voxel rendering.
//!
//! Meshing turns a chunk into flat vertex buffers that a render backend can
//! upload without further processing. It runs on worker threads and only ever
//! reads the chunk it is given.

mod mesh;

pub use mesh::*;
