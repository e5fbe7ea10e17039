//! # Block Type Module
//!
//! The built-in block types and their configuration names.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates the block types shipped with the default block table.
///
/// Games are free to configure additional ids; these only name the defaults.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space.
    AIR,

    /// A basic dirt block.
    DIRT,

    /// Green on top, dirt on the bottom, grass-on-dirt on the sides.
    GRASS,

    /// Bark on all sides.
    WOOD,

    /// A plain white block, often used for testing.
    WHITE,

    /// The floor below the generated world.
    STONE,
}

/// Configuration names of the built-in block types.
pub static BLOCK_TYPE_NAMES: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "air" => BlockType::AIR,
    "dirt" => BlockType::DIRT,
    "grass" => BlockType::GRASS,
    "wood" => BlockType::WOOD,
    "white" => BlockType::WHITE,
    "stone" => BlockType::STONE,
};

impl BlockType {
    /// Converts a stored block id back into a built-in type.
    ///
    /// Returns `None` for ids that only exist in a custom block table.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(id)
    }

    /// Looks up a built-in block type by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPE_NAMES.get(name).copied()
    }

    /// The block id stored in voxels.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }
}
