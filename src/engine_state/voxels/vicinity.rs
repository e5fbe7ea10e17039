//! # Vicinity Module
//!
//! A chunk together with dense copies of its 26 neighbours: the only input the
//! surface extractor needs. Slots are indexed
//! `(dx + 1) + 3 * (dy + 1) + 9 * (dz + 1)` with the chunk itself at index 13.
//! Absent neighbours read as air.

use super::chunk::ChunkShape;
use super::voxel::Voxel;

/// Number of slots in a vicinity.
pub const VICINITY_SIZE: usize = 27;
/// Slot of the chunk being meshed.
pub const VICINITY_CENTER: usize = 13;

/// Dense snapshots of a 3×3×3 block of chunks.
#[derive(Clone, Debug)]
pub struct Vicinity {
    shape: ChunkShape,
    slots: Vec<Option<Vec<Voxel>>>,
}

impl Vicinity {
    /// Wraps 27 dense snapshots.
    ///
    /// # Panics
    /// Panics if there are not exactly 27 slots, if the centre slot is empty, or
    /// if a present slot does not hold exactly one chunk volume of voxels.
    pub fn new(shape: ChunkShape, slots: Vec<Option<Vec<Voxel>>>) -> Self {
        assert_eq!(slots.len(), VICINITY_SIZE, "a vicinity has exactly 27 slots");
        assert!(
            slots[VICINITY_CENTER].is_some(),
            "the centre slot of a vicinity must be present"
        );
        for slot in slots.iter().flatten() {
            assert_eq!(
                slot.len(),
                shape.volume(),
                "vicinity slot does not match the chunk volume"
            );
        }
        Vicinity { shape, slots }
    }

    /// A vicinity whose neighbours are all absent.
    pub fn isolated(shape: ChunkShape, center: Vec<Voxel>) -> Self {
        let mut slots = vec![None; VICINITY_SIZE];
        slots[VICINITY_CENTER] = Some(center);
        Self::new(shape, slots)
    }

    /// Slot index of the neighbour at chunk offset `(dx, dy, dz)`, each in `-1..=1`.
    #[inline]
    pub fn slot_index(dx: i32, dy: i32, dz: i32) -> usize {
        debug_assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy) && (-1..=1).contains(&dz));
        ((dx + 1) + 3 * (dy + 1) + 9 * (dz + 1)) as usize
    }

    pub fn shape(&self) -> ChunkShape {
        self.shape
    }

    pub fn slot(&self, dx: i32, dy: i32, dz: i32) -> Option<&[Voxel]> {
        self.slots[Self::slot_index(dx, dy, dz)].as_deref()
    }

    /// The chunk being meshed.
    pub fn center(&self) -> &[Voxel] {
        self.slots[VICINITY_CENTER].as_deref().unwrap_or_default()
    }

    /// Voxel at a coordinate relative to the centre chunk's origin.
    ///
    /// Coordinates may reach one chunk beyond the centre on every side.
    pub fn voxel_at(&self, x: i32, y: i32, z: i32) -> Voxel {
        let [dim_x, dim_y, dim_z] = self.shape.dimensions().map(|d| d as i32);
        let (dx, lx) = (x.div_euclid(dim_x), x.rem_euclid(dim_x));
        let (dy, ly) = (y.div_euclid(dim_y), y.rem_euclid(dim_y));
        let (dz, lz) = (z.div_euclid(dim_z), z.rem_euclid(dim_z));
        if dx.abs() > 1 || dy.abs() > 1 || dz.abs() > 1 {
            return Voxel::AIR;
        }

        self.slot(dx, dy, dz)
            .map(|voxels| voxels[self.shape.index(lx as usize, ly as usize, lz as usize)])
            .unwrap_or(Voxel::AIR)
    }
}
