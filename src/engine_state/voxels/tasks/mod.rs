//! # Voxel Task System
//!
//! Tasks related to voxel world generation, processed on worker threads.

pub mod chunk_generation_task;
