use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// UV corners for faces whose texture runs top-down (+X, -X, -Z).
const UVS_VERTICAL: [i8; 8] = [0, 1, 1, 1, 1, 0, 0, 0];
/// UV corners for +Z and the horizontal faces.
const UVS_HORIZONTAL: [i8; 8] = [0, 0, 1, 0, 1, 1, 0, 1];

/// Triangulation of a quad relative to its first vertex.
const INDICES_FORWARD: [u32; 6] = [0, 1, 3, 1, 2, 3];
/// -X quads wind the other way.
const INDICES_REVERSED: [u32; 6] = [3, 1, 0, 3, 2, 1];

/// A single visible quad of a voxel.
///
/// Corners are stored in the fixed winding order of the face's side, in
/// chunk-local block coordinates (0..=32, so they fit a byte).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub corners: [Point3<u8>; 4],
    /// Which side of the block this face represents
    pub side: BlockSide,
    /// Texture array layer of the block for this side
    pub texture_layer: u32,
    /// Brightness applied to all four vertices
    pub shade: u8,
}

impl Face {
    /// Creates the face on `side` of the voxel at `(x, y, z)`.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - The coordinates of the voxel in chunk space
    /// * `side` - Which side of the block this face represents
    /// * `texture_layer` - Texture layer resolved for that side
    /// * `shade` - Brightness of the face
    pub fn new(x: u8, y: u8, z: u8, side: BlockSide, texture_layer: u32, shade: u8) -> Self {
        let p = Point3::new;
        let corners = match side {
            BlockSide::PosX => [
                p(x + 1, y, z),
                p(x + 1, y, z + 1),
                p(x + 1, y + 1, z + 1),
                p(x + 1, y + 1, z),
            ],
            BlockSide::NegX => [p(x, y, z), p(x, y, z + 1), p(x, y + 1, z + 1), p(x, y + 1, z)],
            BlockSide::PosZ => [
                p(x, y + 1, z + 1),
                p(x + 1, y + 1, z + 1),
                p(x + 1, y, z + 1),
                p(x, y, z + 1),
            ],
            BlockSide::NegZ => [p(x, y, z), p(x + 1, y, z), p(x + 1, y + 1, z), p(x, y + 1, z)],
            BlockSide::PosY => [
                p(x, y + 1, z),
                p(x + 1, y + 1, z),
                p(x + 1, y + 1, z + 1),
                p(x, y + 1, z + 1),
            ],
            BlockSide::NegY => [p(x, y, z), p(x, y, z + 1), p(x + 1, y, z + 1), p(x + 1, y, z)],
        };

        Face {
            corners,
            side,
            texture_layer,
            shade,
        }
    }

    /// Texture coordinates of the four corners.
    pub fn uvs(&self) -> &'static [i8; 8] {
        match self.side {
            BlockSide::PosX | BlockSide::NegX | BlockSide::NegZ => &UVS_VERTICAL,
            BlockSide::PosZ | BlockSide::PosY | BlockSide::NegY => &UVS_HORIZONTAL,
        }
    }

    /// Triangle indices of this face when its first vertex is `base`.
    pub fn indices(&self, base: u32) -> [u32; 6] {
        let pattern = match self.side {
            BlockSide::NegX => &INDICES_REVERSED,
            _ => &INDICES_FORWARD,
        };
        pattern.map(|offset| base + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_lie_on_the_face_plane() {
        for side in BlockSide::all() {
            let face = Face::new(3, 4, 5, side, 0, 255);
            let normal = side.normal();
            for corner in face.corners {
                let on_plane = match (normal.x, normal.y, normal.z) {
                    (1, _, _) => corner.x == 4,
                    (-1, _, _) => corner.x == 3,
                    (_, 1, _) => corner.y == 5,
                    (_, -1, _) => corner.y == 4,
                    (_, _, 1) => corner.z == 6,
                    _ => corner.z == 5,
                };
                assert!(on_plane, "{side:?} corner {corner:?}");
            }
        }
    }

    #[test]
    fn corners_are_distinct() {
        for side in BlockSide::all() {
            let face = Face::new(0, 0, 0, side, 0, 255);
            for i in 0..4 {
                for j in (i + 1)..4 {
                    assert_ne!(face.corners[i], face.corners[j]);
                }
            }
        }
    }

    #[test]
    fn negative_x_winds_in_reverse() {
        let neg = Face::new(0, 0, 0, BlockSide::NegX, 0, 200);
        let pos = Face::new(0, 0, 0, BlockSide::PosX, 0, 200);
        assert_eq!(neg.indices(8), [11, 9, 8, 11, 10, 9]);
        assert_eq!(pos.indices(8), [8, 9, 11, 9, 10, 11]);
    }

    #[test]
    fn uv_quads_match_side() {
        assert_eq!(Face::new(0, 0, 0, BlockSide::NegZ, 0, 0).uvs(), &UVS_VERTICAL);
        assert_eq!(Face::new(0, 0, 0, BlockSide::PosZ, 0, 0).uvs(), &UVS_HORIZONTAL);
        assert_eq!(Face::new(0, 0, 0, BlockSide::PosY, 0, 0).uvs(), &UVS_HORIZONTAL);
    }
}
