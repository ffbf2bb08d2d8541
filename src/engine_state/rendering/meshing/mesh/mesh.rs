//! Mesh data structures and the chunk mesher.
//!
//! The mesher emits one quad per visible voxel face. A face is visible when the
//! neighboring cell is air or lies outside the chunk, so chunk borders are
//! always closed and meshing never needs the neighboring chunks.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::core::config::ShadeConfig;
use crate::core::spatial_key::SpatialKey;
use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{Chunk, ObjectMap},
};

use super::face::Face;

/// Parallel vertex buffers for one chunk, sized to exactly the emitted faces.
///
/// Every face contributes 4 vertices (12 position bytes, 8 uv values, 4 shades
/// and 4 texture layers) and 6 indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkGeometry {
    /// xyz triples in chunk-local block units
    pub positions: Vec<u8>,
    pub indices: Vec<u32>,
    /// uv pairs
    pub uvs: Vec<i8>,
    /// per-vertex brightness
    pub shades: Vec<u8>,
    /// per-vertex texture array layer
    pub texture_indices: Vec<u32>,
}

impl ChunkGeometry {
    /// Appends a face, numbering its vertices after the existing ones.
    pub fn push_face(&mut self, face: &Face) {
        let base = self.vertex_count() as u32;

        for corner in face.corners {
            self.positions.extend_from_slice(&[corner.x, corner.y, corner.z]);
        }
        self.indices.extend_from_slice(&face.indices(base));
        self.uvs.extend_from_slice(face.uvs());
        self.shades.extend_from_slice(&[face.shade; 4]);
        self.texture_indices.extend_from_slice(&[face.texture_layer; 4]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 6
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw bytes of the index buffer, for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Raw bytes of the uv buffer, for upload.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw bytes of the texture-layer buffer, for upload.
    pub fn texture_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texture_indices)
    }
}

/// Builds the geometry of a chunk.
///
/// Non-air voxels are visited in storage order (y, then z, then x) and each
/// of the six sides is tested in `BlockSide` order, which fixes the output
/// layout.
pub fn mesh(chunk: &Chunk, shade: &ShadeConfig) -> ChunkGeometry {
    let mut geometry = ChunkGeometry::default();
    for (position, code) in chunk.solid_blocks() {
        let (x, y, z) = (position.x, position.y, position.z);
        for side in BlockSide::all() {
            let n = side.normal();
            if chunk.is_opaque(x + n.x, y + n.y, z + n.z) {
                continue;
            }

            let face = Face::new(
                x as u8,
                y as u8,
                z as u8,
                side,
                BlockType::texture_layer_for_code(code, side),
                side.shade(shade),
            );
            geometry.push_face(&face);
        }
    }

    geometry
}

/// A mesh response for one chunk, as handed to the render backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    pub key: SpatialKey,
    pub position: Point3<i32>,
    /// Edit version of the chunk the mesh was built from
    pub version: u64,
    pub geometry: ChunkGeometry,
    /// Object placements to instance alongside the terrain
    pub objects: ObjectMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;
    use test_case::test_case;

    fn geometry_of(blocks: &[(i32, i32, i32, BlockType)]) -> ChunkGeometry {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        for &(x, y, z, block) in blocks {
            chunk.set(x, y, z, block.code());
        }
        mesh(&chunk, &ShadeConfig::default())
    }

    fn assert_consistent(geometry: &ChunkGeometry) {
        let faces = geometry.face_count();
        assert_eq!(geometry.positions.len(), faces * 12);
        assert_eq!(geometry.indices.len(), faces * 6);
        assert_eq!(geometry.uvs.len(), faces * 8);
        assert_eq!(geometry.shades.len(), faces * 4);
        assert_eq!(geometry.texture_indices.len(), faces * 4);
        assert!(geometry.indices.iter().all(|&i| (i as usize) < geometry.vertex_count()));
    }

    #[test]
    fn empty_chunk_has_no_geometry() {
        let geometry = geometry_of(&[]);
        assert!(geometry.is_empty());
        assert_eq!(geometry, ChunkGeometry::default());
    }

    #[test]
    fn single_voxel_emits_six_faces() {
        let geometry = geometry_of(&[(4, 5, 6, BlockType::Marble)]);
        assert_eq!(geometry.face_count(), 6);
        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.indices.len(), 36);
        assert_consistent(&geometry);
    }

    #[test]
    fn first_face_is_positive_x() {
        let geometry = geometry_of(&[(0, 0, 0, BlockType::Marble)]);
        assert_eq!(&geometry.positions[..12], &[1, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0]);
        assert_eq!(&geometry.indices[..6], &[0, 1, 3, 1, 2, 3]);
        assert_eq!(&geometry.indices[6..12], &[7, 5, 4, 7, 6, 5]);
    }

    #[test]
    fn faces_follow_storage_order_not_insertion_order() {
        let geometry = geometry_of(&[(0, 2, 0, BlockType::Marble), (9, 0, 9, BlockType::Marble)]);
        assert_eq!(geometry.face_count(), 12);
        assert_eq!(&geometry.positions[..3], &[10, 0, 9]);
        assert_eq!(&geometry.positions[72..75], &[1, 2, 0]);
    }

    #[test]
    fn water_culls_faces_like_any_other_block() {
        let geometry = geometry_of(&[(3, 3, 3, BlockType::Water), (4, 3, 3, BlockType::Loam)]);
        assert!(!BlockType::Water.info().opaque);
        assert_eq!(geometry.face_count(), 10);
    }

    #[test]
    fn adjacent_voxels_hide_shared_faces() {
        let geometry = geometry_of(&[(3, 3, 3, BlockType::Loam), (4, 3, 3, BlockType::Loam)]);
        assert_eq!(geometry.face_count(), 10);
        assert_consistent(&geometry);
    }

    #[test]
    fn full_chunk_only_shows_its_shell() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        for y in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    chunk.set(x, y, z, BlockType::Loam.code());
                }
            }
        }
        let shell = (CHUNK_DIMENSION * CHUNK_DIMENSION * 6) as usize;
        assert_eq!(mesh(&chunk, &ShadeConfig::default()).face_count(), shell);

        // Removing a corner keeps the count: three outer faces go, three inner ones appear.
        chunk.set(0, 0, 0, 0);
        let geometry = mesh(&chunk, &ShadeConfig::default());
        assert_eq!(geometry.face_count(), shell);
        assert_consistent(&geometry);

        // An interior hole adds the six faces that border it.
        chunk.set(5, 5, 5, 0);
        assert_eq!(mesh(&chunk, &ShadeConfig::default()).face_count(), shell + 6);
    }

    #[test]
    fn border_faces_are_always_emitted() {
        let geometry = geometry_of(&[(31, 31, 31, BlockType::Clay)]);
        assert_eq!(geometry.face_count(), 6);
    }

    #[test_case(BlockSide::PosY, 0)]
    #[test_case(BlockSide::NegY, 11)]
    #[test_case(BlockSide::PosX, 11)]
    #[test_case(BlockSide::NegZ, 11)]
    fn per_face_textures_select_the_matching_slot(side: BlockSide, expected: u32) {
        let geometry = geometry_of(&[(1, 1, 1, BlockType::Grass)]);
        let face = side as usize;
        let layers = &geometry.texture_indices[face * 4..face * 4 + 4];
        assert_eq!(layers, &[expected; 4]);
    }

    #[test]
    fn uniform_texture_is_used_on_every_side() {
        let geometry = geometry_of(&[(1, 1, 1, BlockType::Sand)]);
        let layer = BlockType::texture_layer_for_code(BlockType::Sand.code(), BlockSide::PosY);
        assert!(geometry.texture_indices.iter().all(|&l| l == layer));
    }

    #[test]
    fn shade_depends_on_orientation() {
        let shade = ShadeConfig::default();
        let geometry = geometry_of(&[(1, 1, 1, BlockType::Sand)]);
        for side in BlockSide::all() {
            let face = side as usize;
            assert_eq!(geometry.shades[face * 4], side.shade(&shade));
        }
        assert!(shade.top > shade.side && shade.side > shade.bottom);
    }

    #[test]
    fn byte_views_cover_the_buffers() {
        let geometry = geometry_of(&[(1, 1, 1, BlockType::Sand)]);
        assert_eq!(geometry.index_bytes().len(), geometry.indices.len() * 4);
        assert_eq!(geometry.uv_bytes().len(), geometry.uvs.len());
        assert_eq!(geometry.texture_index_bytes().len(), geometry.texture_indices.len() * 4);
    }
}
