//! # World Module
//!
//! This module provides the `World` struct which manages a collection of chunks in the voxel world.
//! It serves as the central coordinator for chunk creation, voxel edits and neighbourhood access.
//!
//! ## Architecture
//!
//! The world uses a sparse storage approach where only chunks that have been
//! edited or explicitly inserted are kept in memory. Space without a chunk
//! follows the floor policy: a solid floor voxel below `floor_level`, air above.
//! A chunk created on first edit starts out with exactly that content, so
//! creating it never changes what the world looks like.
//!
//! ## Change Tracking
//!
//! Edits flag the edited chunk modified. An edit on a chunk border also flags
//! every existing neighbour that can see the voxel, including diagonal ones,
//! since their ambient occlusion samples reach across corners.
//!
//! ## Performance Considerations
//!
//! - Chunks are stored in thread-safe containers to enable concurrent access
//! - Chunk lookup is O(1) using a hash map
//! - Floor-filled chunks are built layer by layer, one run per layer boundary

use std::collections::HashMap;

use cgmath::Point3;
use log::debug;

use crate::core::MtResource;
use crate::engine_state::collision::VoxelOracle;

use super::chunk::{Chunk, ChunkCreationIterator, ChunkError, ChunkShape};
use super::vicinity::{Vicinity, VICINITY_SIZE};
use super::voxel::{Voxel, VoxelEdit};

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_engine_core::engine_state::voxels::{chunk::ChunkShape, voxel::{Voxel, VoxelEdit}, world::World};
///
/// let mut world = World::new(ChunkShape::default(), 0, Voxel::solid(5));
/// world.set_voxel(3, 4, 5, VoxelEdit::id(1));
///
/// assert_eq!(world.get_voxel(3, 4, 5), Voxel::solid(1));
/// assert_eq!(world.get_voxel(0, -1, 0), Voxel::solid(5));
/// assert!(world.get_chunk_at(Point3::new(0, 0, 0)).is_some());
/// ```
pub struct World {
    /// A mapping from chunk coordinates to chunk data.
    /// Chunks are stored in a thread-safe reference-counted wrapper to allow
    /// shared access between the owning thread and mesh scheduling.
    pub chunks: HashMap<Point3<i32>, MtResource<Chunk>>,
    /// Dimensions of every chunk in this world.
    shape: ChunkShape,
    /// World Y below which ungenerated space is solid.
    floor_level: i32,
    /// Voxel filling ungenerated space below the floor.
    floor_voxel: Voxel,
}

impl World {
    /// Creates a new world with no chunks loaded.
    pub fn new(shape: ChunkShape, floor_level: i32, floor_voxel: Voxel) -> Self {
        World {
            chunks: HashMap::new(),
            shape,
            floor_level,
            floor_voxel,
        }
    }

    pub fn shape(&self) -> ChunkShape {
        self.shape
    }

    pub fn floor_level(&self) -> i32 {
        self.floor_level
    }

    /// Splits a world coordinate into its chunk position and local coordinate.
    pub fn split_coords(&self, x: i32, y: i32, z: i32) -> (Point3<i32>, [usize; 3]) {
        let ChunkShape {
            x_bits,
            y_bits,
            z_bits,
        } = self.shape;
        let local = |value: i32, bits: u32| (value & ((1 << bits) - 1)) as usize;
        (
            Point3::new(x >> x_bits, y >> y_bits, z >> z_bits),
            [local(x, x_bits), local(y, y_bits), local(z, z_bits)],
        )
    }

    /// World coordinate of a chunk's origin voxel.
    pub fn chunk_origin(&self, position: Point3<i32>) -> Point3<i32> {
        Point3::new(
            position.x << self.shape.x_bits,
            position.y << self.shape.y_bits,
            position.z << self.shape.z_bits,
        )
    }

    /// Voxel the floor policy places at a world coordinate.
    #[inline]
    fn floor_voxel_at(&self, y: i32) -> Voxel {
        if y < self.floor_level {
            self.floor_voxel
        } else {
            Voxel::AIR
        }
    }

    /// Builds the floor-policy content of the chunk at `position`.
    fn generate_chunk(&self, position: Point3<i32>) -> Chunk {
        let [_, dim_y, _] = self.shape.dimensions();
        let layer = self.shape.volume() / dim_y;
        let origin_y = self.chunk_origin(position).y;

        // y is the outermost index axis, so each layer is one contiguous range
        let mut cci = ChunkCreationIterator::new(position, self.shape);
        for y in 0..dim_y {
            cci.push_voxels(self.floor_voxel_at(origin_y + y as i32), layer);
        }
        cci.return_chunk()
    }

    /// Returns the chunk at `position`, creating it from the floor policy if absent.
    ///
    /// A newly created chunk with any solid content is flagged modified so it
    /// gets meshed.
    pub fn add_chunk_at(&mut self, position: Point3<i32>) -> MtResource<Chunk> {
        if let Some(chunk) = self.chunks.get(&position) {
            return chunk.clone();
        }

        let mut chunk = self.generate_chunk(position);
        if chunk.uniform() != Some(Voxel::AIR) {
            chunk.mark_modified();
        }
        debug!("Created chunk at {:?} with {} runs", position, chunk.run_count());

        let chunk = MtResource::new(chunk);
        self.chunks.insert(position, chunk.clone());
        chunk
    }

    /// Inserts a prebuilt chunk, replacing any chunk at its position, and flags it
    /// and its neighbours for remeshing.
    pub fn insert_chunk(&mut self, mut chunk: Chunk) -> Result<(), ChunkError> {
        if chunk.shape() != self.shape {
            return Err(ChunkError::ShapeMismatch {
                expected: self.shape,
                found: chunk.shape(),
            });
        }
        let position = chunk.position;
        chunk.mark_modified();
        self.chunks.insert(position, MtResource::new(chunk));
        self.mark_neighbours_modified(position, [-1..=1, -1..=1, -1..=1]);
        Ok(())
    }

    /// Removes the chunk at `position`. Its neighbours are flagged, since the
    /// space it covered now reads through the floor policy.
    pub fn remove_chunk(&mut self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        let chunk = self.chunks.remove(&position)?;
        self.mark_neighbours_modified(position, [-1..=1, -1..=1, -1..=1]);
        Some(chunk)
    }

    /// Retrieves the chunk at the specified chunk coordinates, if it exists.
    pub fn get_chunk_at(&self, pos: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get(&pos).cloned()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Voxel at a world coordinate, following the floor policy where no chunk exists.
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        let (position, [lx, ly, lz]) = self.split_coords(x, y, z);
        match self.chunks.get(&position) {
            Some(chunk) => chunk.get().get(lx, ly, lz),
            None => self.floor_voxel_at(y),
        }
    }

    /// Applies an edit at a world coordinate, creating the chunk if needed.
    ///
    /// Returns whether the voxel changed.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, edit: VoxelEdit) -> bool {
        let (position, [lx, ly, lz]) = self.split_coords(x, y, z);
        let changed = self.add_chunk_at(position).get_mut().set(lx, ly, lz, edit);
        if !changed {
            return false;
        }

        let [dim_x, dim_y, dim_z] = self.shape.dimensions();
        let reach = |local: usize, dim: usize| {
            let low = if local == 0 { -1 } else { 0 };
            let high = if local + 1 == dim { 1 } else { 0 };
            low..=high
        };
        self.mark_neighbours_modified(
            position,
            [reach(lx, dim_x), reach(ly, dim_y), reach(lz, dim_z)],
        );
        true
    }

    /// Flags the existing chunks at the given offsets around `position`, except
    /// `position` itself.
    fn mark_neighbours_modified(
        &self,
        position: Point3<i32>,
        [range_x, range_y, range_z]: [std::ops::RangeInclusive<i32>; 3],
    ) {
        for dz in range_z {
            for dy in range_y.clone() {
                for dx in range_x.clone() {
                    if (dx, dy, dz) == (0, 0, 0) {
                        continue;
                    }
                    let neighbour = Point3::new(position.x + dx, position.y + dy, position.z + dz);
                    if let Some(chunk) = self.chunks.get(&neighbour) {
                        chunk.get_mut().mark_modified();
                    }
                }
            }
        }
    }

    /// Positions of every chunk currently flagged modified.
    pub fn modified_chunks(&self) -> Vec<Point3<i32>> {
        self.chunks
            .iter()
            .filter(|(_, chunk)| chunk.get().is_modified())
            .map(|(position, _)| *position)
            .collect()
    }

    /// Snapshots the 3×3×3 chunks around `position` into dense buffers.
    ///
    /// Each chunk is copied under its own short read lock. Absent neighbours
    /// that reach below the floor are synthesized from the floor policy, the
    /// rest are left empty and read as air. Returns `None` when the centre
    /// chunk does not exist.
    pub fn vicinity(&self, position: Point3<i32>) -> Option<Vicinity> {
        let volume = self.shape.volume();
        if !self.chunks.contains_key(&position) {
            return None;
        }

        let mut slots = Vec::with_capacity(VICINITY_SIZE);
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let neighbour = Point3::new(position.x + dx, position.y + dy, position.z + dz);
                    let slot = match self.chunks.get(&neighbour) {
                        Some(chunk) => {
                            let mut dense = vec![Voxel::AIR; volume];
                            chunk.get().unpack_to(&mut dense);
                            Some(dense)
                        }
                        None if self.chunk_origin(neighbour).y < self.floor_level => {
                            let mut dense = vec![Voxel::AIR; volume];
                            self.generate_chunk(neighbour).unpack_to(&mut dense);
                            Some(dense)
                        }
                        None => None,
                    };
                    slots.push(slot);
                }
            }
        }

        Some(Vicinity::new(self.shape, slots))
    }
}

impl VoxelOracle for World {
    fn voxel_at(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.get_voxel(x, y, z)
    }
}
