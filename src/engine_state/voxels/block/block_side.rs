//! # Block Side Module
//!
//! This module defines the six axis-aligned faces of a voxel block, in the order
//! the mesher emits them.

use cgmath::Vector3;

use crate::core::config::ShadeConfig;

/// Represents the six possible faces of a voxel block.
///
/// The discriminants are the emission order: +X, -X, +Z, -Z, +Y, -Y.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The face pointing towards positive X
    PosX = 0,

    /// The face pointing towards negative X
    NegX = 1,

    /// The face pointing towards positive Z
    PosZ = 2,

    /// The face pointing towards negative Z
    NegZ = 3,

    /// The top face (positive Y)
    PosY = 4,

    /// The bottom face (negative Y)
    NegY = 5,
}

impl BlockSide {
    /// Returns all six faces in emission order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::PosX,
            BlockSide::NegX,
            BlockSide::PosZ,
            BlockSide::NegZ,
            BlockSide::PosY,
            BlockSide::NegY,
        ]
    }

    /// Unit offset from a voxel to the neighbor this face looks at.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::PosX => Vector3::new(1, 0, 0),
            BlockSide::NegX => Vector3::new(-1, 0, 0),
            BlockSide::PosZ => Vector3::new(0, 0, 1),
            BlockSide::NegZ => Vector3::new(0, 0, -1),
            BlockSide::PosY => Vector3::new(0, 1, 0),
            BlockSide::NegY => Vector3::new(0, -1, 0),
        }
    }

    /// The brightness class for this orientation: top brightest, bottom darkest.
    pub fn shade(self, shade: &ShadeConfig) -> u8 {
        match self {
            BlockSide::PosY => shade.top,
            BlockSide::NegY => shade.bottom,
            _ => shade.side,
        }
    }
}
