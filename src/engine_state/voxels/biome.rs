//! # Biome Module
//!
//! Biome ids stored in the world map, with their display colour and the
//! surface block each one is filled with.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::block::{block_type::BlockType, BlockTypeSize};

/// Storage type of a biome id in the world map.
pub type BiomeId = u8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum Biome {
    /// Unassigned cell. Generates air.
    Missing = 0,
    Grassland = 1,
    Beach = 2,
    /// Polar boundary biome reserved for the first and last map rows.
    Arctic = 3,
    Tundra = 4,
    Desert = 5,
    Corruption = 6,
    Ocean = 7,
}

static BIOME_NAMES: phf::Map<&'static str, Biome> = phf::phf_map! {
    "missing" => Biome::Missing,
    "grassland" => Biome::Grassland,
    "beach" => Biome::Beach,
    "arctic" => Biome::Arctic,
    "tundra" => Biome::Tundra,
    "desert" => Biome::Desert,
    "corruption" => Biome::Corruption,
    "ocean" => Biome::Ocean,
};

impl Biome {
    /// Converts a stored id, treating unknown ids as `Missing`.
    pub fn from_id(id: BiomeId) -> Self {
        FromPrimitive::from_u8(id).unwrap_or(Biome::Missing)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BIOME_NAMES.get(name).copied()
    }

    pub fn id(self) -> BiomeId {
        self as BiomeId
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Missing => "missing",
            Biome::Grassland => "grassland",
            Biome::Beach => "beach",
            Biome::Arctic => "arctic",
            Biome::Tundra => "tundra",
            Biome::Desert => "desert",
            Biome::Corruption => "corruption",
            Biome::Ocean => "ocean",
        }
    }

    /// RGB colour used when the map is drawn.
    pub fn color(self) -> [u8; 3] {
        match self {
            Biome::Missing => [255, 0, 255],
            Biome::Grassland => [46, 119, 41],
            Biome::Beach => [237, 236, 161],
            Biome::Arctic => [222, 222, 245],
            Biome::Tundra => [180, 180, 202],
            Biome::Desert => [237, 236, 161],
            Biome::Corruption => [97, 66, 93],
            Biome::Ocean => [17, 49, 154],
        }
    }

    /// Whether this is a polar biome that the sea pass must not overwrite.
    pub fn is_polar(self) -> bool {
        self == Biome::Arctic
    }

    /// The block a column of this biome is filled with.
    pub fn surface_block(self) -> BlockType {
        match self {
            Biome::Ocean => BlockType::Water,
            Biome::Beach | Biome::Desert => BlockType::Sand,
            Biome::Grassland => BlockType::Grass,
            Biome::Arctic => BlockType::Snow,
            Biome::Tundra => BlockType::TundraGrass,
            Biome::Corruption => BlockType::CorruptGrass,
            Biome::Missing => BlockType::Air,
        }
    }

    /// Convenience for generators writing raw codes.
    pub fn surface_code(self) -> BlockTypeSize {
        self.surface_block().code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Biome::Ocean, BlockType::Water)]
    #[test_case(Biome::Beach, BlockType::Sand)]
    #[test_case(Biome::Desert, BlockType::Sand)]
    #[test_case(Biome::Grassland, BlockType::Grass)]
    #[test_case(Biome::Arctic, BlockType::Snow)]
    #[test_case(Biome::Tundra, BlockType::TundraGrass)]
    #[test_case(Biome::Corruption, BlockType::CorruptGrass)]
    #[test_case(Biome::Missing, BlockType::Air)]
    fn biome_fills_with_its_surface_block(biome: Biome, block: BlockType) {
        assert_eq!(biome.surface_block(), block);
    }

    #[test]
    fn unknown_ids_are_missing() {
        assert_eq!(Biome::from_id(42), Biome::Missing);
        assert_eq!(Biome::from_id(7), Biome::Ocean);
    }

    #[test]
    fn names_round_trip() {
        for id in 0..8 {
            let biome = Biome::from_id(id);
            assert_eq!(Biome::from_name(biome.name()), Some(biome));
        }
    }
}
