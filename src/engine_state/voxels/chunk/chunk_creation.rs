//! # Chunk Creation Module
//!
//! This module provides a builder that streams voxels in flattened index order
//! and produces a chunk whose runs are already maximal.
//!
//! ## Memory Optimization
//!
//! The `ChunkCreationIterator` never materializes a dense buffer. It only opens a
//! new run when the pushed value differs from the last one, so generating a
//! layered terrain column costs one run per layer boundary rather than one entry
//! per voxel.

use cgmath::Point3;

use crate::engine_state::voxels::voxel::Voxel;

use super::{Chunk, ChunkShape, Run};

/// A builder for creating chunks from voxels pushed in index order.
///
/// Callers must push exactly `shape.volume()` voxels before calling
/// [`return_chunk`](Self::return_chunk).
pub struct ChunkCreationIterator {
    /// The position of the chunk being created, in chunk coordinates
    position: Point3<i32>,
    /// Dimensions of the chunk being created
    shape: ChunkShape,
    /// Runs emitted so far, merged as they are pushed
    runs: Vec<Run>,
    /// Flattened index of the next voxel to be pushed
    next_index: u32,
}

impl ChunkCreationIterator {
    /// Creates a new `ChunkCreationIterator` for building a chunk at the given position.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinate of the chunk to create
    /// * `shape` - The dimensions of the chunk
    ///
    /// # Returns
    /// A new `ChunkCreationIterator` positioned at index 0
    pub fn new(position: Point3<i32>, shape: ChunkShape) -> Self {
        ChunkCreationIterator {
            position,
            shape,
            runs: Vec::new(),
            next_index: 0,
        }
    }

    /// Number of voxels pushed so far.
    pub fn len(&self) -> usize {
        self.next_index as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk`.
    ///
    /// # Panics
    /// Panics if fewer or more voxels than the chunk volume were pushed.
    pub fn return_chunk(self) -> Chunk {
        assert_eq!(
            self.next_index as usize,
            self.shape.volume(),
            "chunk builder was given the wrong number of voxels"
        );
        Chunk::from_runs(self.position, self.shape, self.runs)
    }

    /// Appends one voxel at the next index.
    #[inline]
    pub fn push_voxel(&mut self, voxel: Voxel) {
        self.push_voxels(voxel, 1);
    }

    /// Appends `count` copies of a voxel.
    pub fn push_voxels(&mut self, voxel: Voxel, count: usize) {
        if count == 0 {
            return;
        }
        // Extend the current run when the value repeats
        if self.runs.last().map(|run| run.value) != Some(voxel) {
            self.runs.push(Run {
                start: self.next_index,
                value: voxel,
            });
        }
        self.next_index += count as u32;
    }
}
