//! # Block Module
//!
//! This module provides the block-related data for the voxel engine: face
//! directions, the built-in block types, and the block table mapping block ids
//! to atlas tiles.

use serde::{Deserialize, Serialize};

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block ids in voxels.
pub type BlockTypeSize = u8;

/// Maps each built-in block type to its atlas tile for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array is indexed by `BlockSide`:
/// [Right, Left, Top, Bottom, Front, Back]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[u16; 6]; 6] = [
    [0, 0, 0, 0, 0, 0], // AIR (never drawn)
    [1, 1, 1, 1, 1, 1], // DIRT
    [2, 2, 3, 1, 2, 2], // GRASS (top: 3, bottom: 1, sides: 2)
    [0, 0, 0, 0, 0, 0], // WOOD
    [4, 4, 4, 4, 4, 4], // WHITE
    [5, 5, 5, 5, 5, 5], // STONE
];

/// One configured block: a name and an atlas tile per face.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Human readable name, unique within a table.
    pub name: String,
    /// Atlas tile per face, indexed by `BlockSide`.
    pub tiles: [u16; 6],
}

/// Block id to face tile lookup used by the surface extractor.
///
/// Ids index the table directly. The table must cover every id written into the
/// world; looking up an id past the end is a configuration error and panics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockTable {
    blocks: Vec<BlockDefinition>,
}

impl BlockTable {
    /// Creates a table from definitions ordered by block id.
    pub fn new(blocks: Vec<BlockDefinition>) -> Self {
        BlockTable { blocks }
    }

    /// Number of configured ids.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Atlas tile for one face of a block.
    ///
    /// # Panics
    /// Panics if `id` is not covered by the table.
    #[inline]
    pub fn tile(&self, id: BlockTypeSize, side: BlockSide) -> u16 {
        self.blocks[id as usize].tiles[side as usize]
    }

    /// Finds the id of a block by name.
    pub fn id_of(&self, name: &str) -> Option<BlockTypeSize> {
        self.blocks
            .iter()
            .position(|block| block.name == name)
            .and_then(|index| BlockTypeSize::try_from(index).ok())
    }

    pub fn definitions(&self) -> &[BlockDefinition] {
        &self.blocks
    }
}

impl Default for BlockTable {
    /// The built-in block types with their default tiles.
    fn default() -> Self {
        let blocks = (0..BLOCK_TYPE_TO_TEXTURE_INDICES.len() as BlockTypeSize)
            .filter_map(BlockType::from_id)
            .map(|block_type| BlockDefinition {
                name: block_type::BLOCK_TYPE_NAMES
                    .entries()
                    .find(|(_, named)| **named == block_type)
                    .map(|(name, _)| name.to_string())
                    .unwrap_or_default(),
                tiles: BLOCK_TYPE_TO_TEXTURE_INDICES[block_type as usize],
            })
            .collect();

        BlockTable { blocks }
    }
}
