//! Wrapped neighbour cache: the centre chunk plus a one-voxel shell taken from
//! its vicinity, so that every neighbour lookup during meshing is a plain
//! array read.

use bitvec::vec::BitVec;

use crate::engine_state::voxels::{chunk::ChunkShape, vicinity::Vicinity, voxel::Voxel};

/// `(dim + 2)` voxels per axis around a chunk, with an occluding bit per voxel.
///
/// Coordinates are local to the centre chunk and range over `-1..=dim` on each axis.
pub struct NeighborCache {
    shape: ChunkShape,
    /// Wrapped extent per axis.
    wrapped: [usize; 3],
    voxels: Vec<Voxel>,
    occluding: BitVec,
}

impl NeighborCache {
    /// Copies the centre chunk and its shell out of a vicinity.
    pub fn from_vicinity(vicinity: &Vicinity) -> Self {
        let shape = vicinity.shape();
        let [dim_x, dim_y, dim_z] = shape.dimensions();
        let wrapped = [dim_x + 2, dim_y + 2, dim_z + 2];
        let size = wrapped[0] * wrapped[1] * wrapped[2];

        let mut voxels = Vec::with_capacity(size);
        let mut occluding = BitVec::with_capacity(size);
        // same axis order as the chunk index: x fastest, then z, then y
        for y in -1..=dim_y as i32 {
            for z in -1..=dim_z as i32 {
                for x in -1..=dim_x as i32 {
                    let voxel = vicinity.voxel_at(x, y, z);
                    voxels.push(voxel);
                    occluding.push(voxel.is_occluding());
                }
            }
        }

        NeighborCache {
            shape,
            wrapped,
            voxels,
            occluding,
        }
    }

    pub fn shape(&self) -> ChunkShape {
        self.shape
    }

    #[inline]
    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        let (x, y, z) = ((x + 1) as usize, (y + 1) as usize, (z + 1) as usize);
        debug_assert!(x < self.wrapped[0] && y < self.wrapped[1] && z < self.wrapped[2]);
        x + self.wrapped[0] * (z + self.wrapped[2] * y)
    }

    #[inline]
    pub fn voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.voxels[self.index(x, y, z)]
    }

    #[inline]
    pub fn is_occluding(&self, x: i32, y: i32, z: i32) -> bool {
        self.occluding[self.index(x, y, z)]
    }

    /// `is_occluding` for an `[x, y, z]` array.
    #[inline]
    pub fn occludes(&self, position: [i32; 3]) -> bool {
        self.is_occluding(position[0], position[1], position[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::vicinity::VICINITY_SIZE;

    #[test]
    fn shell_comes_from_neighbours() {
        let shape = ChunkShape::cube(1);
        let mut slots = vec![None; VICINITY_SIZE];
        slots[Vicinity::slot_index(0, 0, 0)] = Some(vec![Voxel::AIR; 8]);
        slots[Vicinity::slot_index(0, 1, 0)] = Some(vec![Voxel::solid(1); 8]);
        slots[Vicinity::slot_index(-1, 0, 0)] = Some(vec![Voxel::new(1, 0b0011); 8]);
        let cache = NeighborCache::from_vicinity(&Vicinity::new(shape, slots));

        assert!(cache.is_occluding(0, 2, 0));
        assert!(!cache.is_occluding(0, 1, 0));
        assert_eq!(cache.voxel(-1, 0, 1), Voxel::new(1, 0b0011));
        assert!(!cache.is_occluding(-1, 0, 1));
        assert!(!cache.is_occluding(2, -1, 2));
    }
}
