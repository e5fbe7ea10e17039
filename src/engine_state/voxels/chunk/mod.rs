//! # Chunk Module
//!
//! This module provides the `Chunk` struct: interval (run-length) encoded storage
//! for one fixed-size box of voxels.
//!
//! ## Memory Optimization
//!
//! A chunk stores a sorted list of runs. Each run records the flattened index it
//! starts at and the voxel value shared by every index up to the start of the
//! next run. The runs always satisfy:
//! - the first run starts at index 0
//! - starts are strictly increasing, so runs never overlap and cover the chunk
//! - two neighbouring runs never hold the same value
//!
//! Sky and bedrock chunks collapse to a single run, terrain layers to a handful
//! per column.
//!
//! ### Performance Characteristics
//! - **Point lookup**: O(log r) binary search over run starts
//! - **Point update**: O(r) worst case for the in-place insert, no rebuild
//! - **Bulk pack/unpack**: O(volume)
//!
//! ## Flattened Index
//!
//! `index = x | z << x_bits | y << (x_bits + z_bits)`. Every accessor, the
//! dense buffers and the surface extractor's neighbour lookups use this order.

use cgmath::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::voxel::{Voxel, VoxelEdit};

pub use chunk_creation::ChunkCreationIterator;
pub use chunk_iteration::{ChunkRunIterator, ChunkVoxelIterator};

mod chunk_creation;
pub mod chunk_iteration;

/// Dimensions of a chunk, each a power of two.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkShape {
    /// log2 of the X dimension.
    pub x_bits: u32,
    /// log2 of the Y dimension.
    pub y_bits: u32,
    /// log2 of the Z dimension.
    pub z_bits: u32,
}

/// Largest supported chunk volume, as a power of two. Run starts are `u32`.
pub const MAX_CHUNK_BITS: u32 = 24;

impl ChunkShape {
    pub const fn new(x_bits: u32, y_bits: u32, z_bits: u32) -> Self {
        ChunkShape {
            x_bits,
            y_bits,
            z_bits,
        }
    }

    /// A cube with `1 << bits` voxels per side.
    pub const fn cube(bits: u32) -> Self {
        Self::new(bits, bits, bits)
    }

    pub const fn total_bits(&self) -> u32 {
        self.x_bits + self.y_bits + self.z_bits
    }

    /// Extent along each axis.
    pub const fn dimensions(&self) -> [usize; 3] {
        [1 << self.x_bits, 1 << self.y_bits, 1 << self.z_bits]
    }

    /// Number of voxels in the chunk.
    pub const fn volume(&self) -> usize {
        1 << self.total_bits()
    }

    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        let [dx, dy, dz] = self.dimensions();
        x < dx && y < dy && z < dz
    }

    /// Flattened index of a local coordinate.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(self.contains(x, y, z), "({x}, {y}, {z}) outside {self:?}");
        x | (z << self.x_bits) | (y << (self.x_bits + self.z_bits))
    }

    /// Local coordinate of a flattened index.
    #[inline]
    pub fn coords(&self, index: usize) -> [usize; 3] {
        let x = index & ((1 << self.x_bits) - 1);
        let z = (index >> self.x_bits) & ((1 << self.z_bits) - 1);
        let y = index >> (self.x_bits + self.z_bits);
        [x, y, z]
    }
}

impl Default for ChunkShape {
    fn default() -> Self {
        ChunkShape::cube(4)
    }
}

/// A maximal range of indices sharing one voxel value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Run {
    /// First flattened index covered by the run.
    pub start: u32,
    /// Value of every voxel in the run.
    pub value: Voxel,
}

/// Reasons a serialized interval array cannot become a chunk.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("interval array is empty")]
    Empty,
    #[error("interval array has odd length {0}")]
    OddLength(usize),
    #[error("first interval starts at {0}, expected 0")]
    NonZeroStart(u32),
    #[error("interval {index} starts at {start}, not after the previous interval")]
    Unsorted { index: usize, start: u32 },
    #[error("interval {index} starts at {start}, past the chunk volume {volume}")]
    OutOfRange { index: usize, start: u32, volume: usize },
    #[error("intervals {index} and {next} share value {value:#x}", next = .index + 1)]
    Unmerged { index: usize, value: u32 },
    #[error("value {0:#x} is not a normalized voxel")]
    InvalidValue(u32),
    #[error("chunk shape {0:?} exceeds {max} index bits", max = MAX_CHUNK_BITS)]
    ShapeTooLarge(ChunkShape),
    #[error("chunk shape {found:?} does not match the world shape {expected:?}")]
    ShapeMismatch { expected: ChunkShape, found: ChunkShape },
}

/// Serializable chunk state: position, shape and the flat interval array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub position: [i32; 3],
    pub shape: ChunkShape,
    /// Alternating `start, value` pairs.
    pub intervals: Vec<u32>,
}

/// Represents one box of voxel data in the world.
///
/// Chunks are the unit of storage and of mesh regeneration. Each chunk knows its
/// position in chunk coordinates and whether it changed since its mesh was
/// last built.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not voxel coordinates).
    pub position: Point3<i32>,
    shape: ChunkShape,
    runs: Vec<Run>,
    modified: bool,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all voxels are air).
    pub fn empty(position: Point3<i32>, shape: ChunkShape) -> Self {
        Self::filled(position, shape, Voxel::AIR)
    }

    /// Creates a chunk holding a single value everywhere.
    pub fn filled(position: Point3<i32>, shape: ChunkShape, voxel: Voxel) -> Self {
        let mut cci = ChunkCreationIterator::new(position, shape);
        cci.push_voxels(voxel, shape.volume());
        cci.return_chunk()
    }

    pub(crate) fn from_runs(position: Point3<i32>, shape: ChunkShape, runs: Vec<Run>) -> Self {
        Chunk {
            position,
            shape,
            runs,
            modified: false,
        }
    }

    pub fn shape(&self) -> ChunkShape {
        self.shape
    }

    /// The runs in ascending order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Index of the run covering `index`.
    #[inline]
    fn run_at(&self, index: u32) -> usize {
        self.runs.partition_point(|run| run.start <= index) - 1
    }

    /// One past the last index covered by run `run`.
    #[inline]
    fn run_end(&self, run: usize) -> u32 {
        self.runs
            .get(run + 1)
            .map(|next| next.start)
            .unwrap_or(self.shape.volume() as u32)
    }

    /// Voxel at local coordinates.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.get_index(self.shape.index(x, y, z))
    }

    /// Voxel at a flattened index.
    #[inline]
    pub fn get_index(&self, index: usize) -> Voxel {
        debug_assert!(index < self.shape.volume());
        self.runs[self.run_at(index as u32)].value
    }

    /// Applies a partial update at local coordinates.
    ///
    /// Returns `true` if the stored value changed, in which case the chunk is
    /// flagged modified.
    pub fn set(&mut self, x: usize, y: usize, z: usize, edit: VoxelEdit) -> bool {
        let index = self.shape.index(x, y, z);
        let value = edit.apply(self.get_index(index));
        self.set_index(index, value)
    }

    /// Stores `value` at a flattened index, splitting and merging runs in place.
    pub fn set_index(&mut self, index: usize, value: Voxel) -> bool {
        debug_assert!(index < self.shape.volume());
        let index = index as u32;
        let run = self.run_at(index);
        if self.runs[run].value == value {
            return false;
        }

        let start = self.runs[run].start;
        let end = self.run_end(run);
        let left_matches = run > 0 && self.runs[run - 1].value == value;
        let right_matches = run + 1 < self.runs.len() && self.runs[run + 1].value == value;

        match (index == start, index + 1 == end) {
            // the run is exactly this voxel
            (true, true) => match (left_matches, right_matches) {
                (true, true) => {
                    self.runs.drain(run..run + 2);
                }
                (true, false) => {
                    self.runs.remove(run);
                }
                (false, true) => {
                    self.runs.remove(run + 1);
                    self.runs[run].value = value;
                }
                (false, false) => self.runs[run].value = value,
            },
            (true, false) => {
                self.runs[run].start = index + 1;
                if !left_matches {
                    self.runs.insert(run, Run { start: index, value });
                }
            }
            (false, true) => {
                if right_matches {
                    self.runs[run + 1].start = index;
                } else {
                    self.runs.insert(run + 1, Run { start: index, value });
                }
            }
            (false, false) => {
                let old = self.runs[run].value;
                self.runs.splice(
                    run + 1..run + 1,
                    [
                        Run { start: index, value },
                        Run {
                            start: index + 1,
                            value: old,
                        },
                    ],
                );
            }
        }

        self.modified = true;
        true
    }

    /// True when every voxel holds the same value.
    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.runs.len() == 1
    }

    /// The single value of a uniform chunk.
    pub fn uniform(&self) -> Option<Voxel> {
        self.is_uniform().then(|| self.runs[0].value)
    }

    pub fn uniform_id(&self) -> Option<u8> {
        self.uniform().map(Voxel::id)
    }

    pub fn uniform_slope(&self) -> Option<u8> {
        self.uniform().map(Voxel::slope)
    }

    /// Every voxel with its flattened index, in ascending index order.
    pub fn iter(&self) -> ChunkVoxelIterator<'_> {
        ChunkVoxelIterator::new(self)
    }

    /// Every run as an index range with its value.
    pub fn iter_runs(&self) -> ChunkRunIterator<'_> {
        ChunkRunIterator::new(self)
    }

    /// Writes every voxel into a dense buffer indexed by flattened index.
    ///
    /// # Panics
    /// Panics if the buffer length differs from the chunk volume.
    pub fn unpack_to(&self, buffer: &mut [Voxel]) {
        assert_eq!(
            buffer.len(),
            self.shape.volume(),
            "dense buffer does not match chunk volume"
        );
        for (range, value) in self.iter_runs() {
            buffer[range].fill(value);
        }
    }

    /// Replaces the chunk contents with a dense buffer and flags it modified.
    ///
    /// # Panics
    /// Panics if the buffer length differs from the chunk volume.
    pub fn pack_from(&mut self, buffer: &[Voxel]) {
        assert_eq!(
            buffer.len(),
            self.shape.volume(),
            "dense buffer does not match chunk volume"
        );
        let mut cci = ChunkCreationIterator::new(self.position, self.shape);
        for voxel in buffer {
            cci.push_voxel(*voxel);
        }
        self.runs = cci.return_chunk().runs;
        self.modified = true;
    }

    /// The flat alternating `start, value` array. Its length is twice the run count.
    pub fn intervals(&self) -> Vec<u32> {
        self.runs
            .iter()
            .flat_map(|run| [run.start, run.value.0])
            .collect()
    }

    /// Rebuilds a chunk from a flat interval array, rejecting arrays that break
    /// the run invariant.
    pub fn from_intervals(
        position: Point3<i32>,
        shape: ChunkShape,
        intervals: &[u32],
    ) -> Result<Self, ChunkError> {
        if shape.total_bits() > MAX_CHUNK_BITS {
            return Err(ChunkError::ShapeTooLarge(shape));
        }
        if intervals.len() % 2 != 0 {
            return Err(ChunkError::OddLength(intervals.len()));
        }
        let runs = intervals
            .chunks_exact(2)
            .map(|pair| Run {
                start: pair[0],
                value: Voxel(pair[1]),
            })
            .collect();

        let chunk = Chunk::from_runs(position, shape, runs);
        chunk.validate()?;
        Ok(chunk)
    }

    /// Checks the run invariant.
    pub fn validate(&self) -> Result<(), ChunkError> {
        let volume = self.shape.volume();
        let first = self.runs.first().ok_or(ChunkError::Empty)?;
        if first.start != 0 {
            return Err(ChunkError::NonZeroStart(first.start));
        }

        for (index, run) in self.runs.iter().enumerate() {
            let normalized = Voxel::new(run.value.id(), run.value.slope());
            if normalized != run.value {
                return Err(ChunkError::InvalidValue(run.value.0));
            }
            if run.start as usize >= volume {
                return Err(ChunkError::OutOfRange {
                    index,
                    start: run.start,
                    volume,
                });
            }
            if let Some(next) = self.runs.get(index + 1) {
                if next.start <= run.start {
                    return Err(ChunkError::Unsorted {
                        index: index + 1,
                        start: next.start,
                    });
                }
                if next.value == run.value {
                    return Err(ChunkError::Unmerged {
                        index,
                        value: run.value.0,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn snapshot(&self) -> ChunkSnapshot {
        ChunkSnapshot {
            position: self.position.into(),
            shape: self.shape,
            intervals: self.intervals(),
        }
    }

    pub fn from_snapshot(snapshot: &ChunkSnapshot) -> Result<Self, ChunkError> {
        Self::from_intervals(
            Point3::from(snapshot.position),
            snapshot.shape,
            &snapshot.intervals,
        )
    }

    /// Whether the chunk changed since its mesh was last scheduled.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Flags the chunk for remeshing, e.g. because a neighbour changed.
    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    pub fn clear_modified(&mut self) {
        self.modified = false;
    }
}
