//! # Chunk Iteration Module
//!
//! This module provides an iterator over the non-air voxels of a chunk.
//!
//! ## Order
//!
//! Voxels are visited in storage order: y-major, then z, then x. This is the
//! order the mesher emits faces in, so identical chunks always produce
//! identical buffers. Unallocated chunks yield nothing without touching memory.

use cgmath::Point3;

use super::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};
use crate::engine_state::voxels::block::BlockTypeSize;

/// An iterator over all non-air voxels in a chunk, with their local positions.
pub struct ChunkBlockIterator<'a> {
    /// The chunk's dense storage, `None` for empty chunks
    voxels: Option<&'a [BlockTypeSize]>,
    /// Next flat index to inspect
    offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            voxels: chunk_ref.voxels(),
            offset: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, BlockTypeSize);

    fn next(&mut self) -> Option<Self::Item> {
        let voxels = self.voxels?;
        while self.offset < voxels.len() {
            let index = self.offset;
            self.offset += 1;

            let block = voxels[index];
            if block == 0 {
                continue;
            }

            let index = index as i32;
            let position = Point3::new(
                index % CHUNK_DIMENSION,
                index / CHUNK_PLANE_SIZE,
                (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
            );
            return Some((position, block));
        }
        None
    }
}

impl Chunk {
    /// Iterates over the non-air voxels of this chunk.
    pub fn solid_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chunk_yields_nothing() {
        let chunk = Chunk::new(Point3::new(0, 0, 0));
        assert_eq!(chunk.solid_blocks().count(), 0);
    }

    #[test]
    fn yields_positions_in_storage_order() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(3, 1, 0, 2);
        chunk.set(31, 0, 31, 5);
        chunk.set(0, 0, 2, 1);
        chunk.set(0, 0, 2, 0);

        let visited: Vec<_> = chunk.solid_blocks().collect();
        assert_eq!(
            visited,
            vec![(Point3::new(31, 0, 31), 5), (Point3::new(3, 1, 0), 2)]
        );
    }

    #[test]
    fn count_matches_solid_count() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        for i in 0..CHUNK_DIMENSION {
            chunk.set(i, i, (i * 7) % CHUNK_DIMENSION, 1);
        }
        assert_eq!(chunk.solid_blocks().count() as u32, chunk.solid_count());
    }
}
