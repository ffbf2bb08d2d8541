//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world and
//! their static properties. Block codes are stable integers so chunk snapshots
//! can store them as plain bytes.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::block_side::BlockSide;
use super::BlockTypeSize;

/// Enumerates all block types. The discriminant is the code stored in chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Never counted as solid.
    Air = 0,
    Sand = 1,
    Snow = 2,
    Water = 3,
    Lime = 4,
    Marble = 5,
    Granite = 6,
    Slate = 7,
    Peat = 8,
    Clay = 10,
    Silt = 11,
    Chalk = 12,
    Loam = 13,
    /// Grass top over peat sides.
    Grass = 14,
    TundraGrass = 15,
    CorruptGrass = 16,
}

/// Texture layer indices for each face of a block whose sides differ.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceTextures {
    pub pos_x: u32,
    pub neg_x: u32,
    pub pos_y: u32,
    pub neg_y: u32,
    pub pos_z: u32,
    pub neg_z: u32,
}

/// How a block maps onto the texture array.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureDescriptor {
    /// No texture (air).
    None,
    /// The same layer on all six faces.
    Uniform(u32),
    /// A layer per face direction.
    PerFace(FaceTextures),
}

impl TextureDescriptor {
    /// Resolves the texture layer for one face. Untextured blocks use layer 0.
    pub fn layer(&self, side: BlockSide) -> u32 {
        match self {
            TextureDescriptor::None => 0,
            TextureDescriptor::Uniform(layer) => *layer,
            TextureDescriptor::PerFace(faces) => match side {
                BlockSide::PosX => faces.pos_x,
                BlockSide::NegX => faces.neg_x,
                BlockSide::PosY => faces.pos_y,
                BlockSide::NegY => faces.neg_y,
                BlockSide::PosZ => faces.pos_z,
                BlockSide::NegZ => faces.neg_z,
            },
        }
    }
}

/// Static properties of a block type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub name: &'static str,
    /// Whether physics should collide with this block. Read by collaborators.
    pub solid: bool,
    /// Whether the block hides what is behind it. Read by collaborators; the
    /// mesher culls against any non-air code, water included.
    pub opaque: bool,
    pub texture: TextureDescriptor,
}

const fn info(name: &'static str, texture: TextureDescriptor) -> BlockInfo {
    BlockInfo {
        name,
        solid: true,
        opaque: true,
        texture,
    }
}

const fn side_and_top(top: u32, sides: u32) -> TextureDescriptor {
    TextureDescriptor::PerFace(FaceTextures {
        pos_x: sides,
        neg_x: sides,
        pos_y: top,
        neg_y: sides,
        pos_z: sides,
        neg_z: sides,
    })
}

static AIR_INFO: BlockInfo = BlockInfo {
    name: "air",
    solid: false,
    opaque: false,
    texture: TextureDescriptor::None,
};
static SAND_INFO: BlockInfo = info("sand", TextureDescriptor::Uniform(4));
static SNOW_INFO: BlockInfo = info("snow", TextureDescriptor::Uniform(5));
static WATER_INFO: BlockInfo = BlockInfo {
    name: "water",
    solid: false,
    opaque: false,
    texture: TextureDescriptor::Uniform(6),
};
static LIME_INFO: BlockInfo = info("lime", TextureDescriptor::Uniform(7));
static MARBLE_INFO: BlockInfo = info("marble", TextureDescriptor::Uniform(8));
static GRANITE_INFO: BlockInfo = info("granite", TextureDescriptor::Uniform(9));
static SLATE_INFO: BlockInfo = info("slate", TextureDescriptor::Uniform(10));
static PEAT_INFO: BlockInfo = info("peat", TextureDescriptor::Uniform(11));
static CLAY_INFO: BlockInfo = info("clay", TextureDescriptor::Uniform(12));
static SILT_INFO: BlockInfo = info("silt", TextureDescriptor::Uniform(13));
static CHALK_INFO: BlockInfo = info("chalk", TextureDescriptor::Uniform(14));
static LOAM_INFO: BlockInfo = info("loam", TextureDescriptor::Uniform(15));
static GRASS_INFO: BlockInfo = info("grass", side_and_top(0, 11));
static TUNDRA_GRASS_INFO: BlockInfo = info("tundragrass", side_and_top(2, 14));
static CORRUPT_GRASS_INFO: BlockInfo = info("corruptgrass", side_and_top(3, 15));

/// Name lookup used when reading block names from external data.
static BLOCK_NAMES: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "air" => BlockType::Air,
    "sand" => BlockType::Sand,
    "snow" => BlockType::Snow,
    "water" => BlockType::Water,
    "lime" => BlockType::Lime,
    "marble" => BlockType::Marble,
    "granite" => BlockType::Granite,
    "slate" => BlockType::Slate,
    "peat" => BlockType::Peat,
    "clay" => BlockType::Clay,
    "silt" => BlockType::Silt,
    "chalk" => BlockType::Chalk,
    "loam" => BlockType::Loam,
    "grass" => BlockType::Grass,
    "tundragrass" => BlockType::TundraGrass,
    "corruptgrass" => BlockType::CorruptGrass,
};

impl BlockType {
    /// Converts a stored code back into a block type, `None` for unknown codes.
    pub fn from_code(code: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(code)
    }

    /// Looks a block type up by its registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_NAMES.get(name).copied()
    }

    /// The code written into chunk storage.
    pub fn code(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Static properties of this block type.
    pub fn info(self) -> &'static BlockInfo {
        match self {
            BlockType::Air => &AIR_INFO,
            BlockType::Sand => &SAND_INFO,
            BlockType::Snow => &SNOW_INFO,
            BlockType::Water => &WATER_INFO,
            BlockType::Lime => &LIME_INFO,
            BlockType::Marble => &MARBLE_INFO,
            BlockType::Granite => &GRANITE_INFO,
            BlockType::Slate => &SLATE_INFO,
            BlockType::Peat => &PEAT_INFO,
            BlockType::Clay => &CLAY_INFO,
            BlockType::Silt => &SILT_INFO,
            BlockType::Chalk => &CHALK_INFO,
            BlockType::Loam => &LOAM_INFO,
            BlockType::Grass => &GRASS_INFO,
            BlockType::TundraGrass => &TUNDRA_GRASS_INFO,
            BlockType::CorruptGrass => &CORRUPT_GRASS_INFO,
        }
    }

    /// Texture layer for a raw block code on a given face.
    pub fn texture_layer_for_code(code: BlockTypeSize, side: BlockSide) -> u32 {
        Self::from_code(code).map_or(0, |block| block.info().texture.layer(side))
    }
}
