//! # Chunk Iteration Module
//!
//! This module provides iterators over a chunk's contents that walk the runs
//! directly instead of looking every index up.
//!
//! ## Run-Aware Iteration
//!
//! `ChunkVoxelIterator` yields every voxel with its flattened index, advancing
//! to the next run only when the current one is exhausted. Each step is O(1).
//! `ChunkRunIterator` yields whole runs as half-open index ranges for callers
//! that can process a run at once.

use std::ops::Range;

use crate::engine_state::voxels::voxel::Voxel;

use super::Chunk;

/// An iterator over every voxel in a chunk, in ascending index order.
pub struct ChunkVoxelIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Index of the run containing `index`
    current_run: usize,
    /// Flattened index of the next voxel to yield
    index: usize,
}

impl<'a> ChunkVoxelIterator<'a> {
    /// Creates a new `ChunkVoxelIterator` positioned at index 0.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkVoxelIterator {
            chunk_ref,
            current_run: 0,
            index: 0,
        }
    }
}

impl Iterator for ChunkVoxelIterator<'_> {
    type Item = (Voxel, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let volume = self.chunk_ref.shape().volume();
        if self.index >= volume {
            return None;
        }

        let runs = self.chunk_ref.runs();
        while runs
            .get(self.current_run + 1)
            .is_some_and(|next| next.start as usize <= self.index)
        {
            self.current_run += 1;
        }

        let item = (runs[self.current_run].value, self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chunk_ref.shape().volume().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkVoxelIterator<'_> {}

/// An iterator over the runs of a chunk as `(index range, value)` pairs.
pub struct ChunkRunIterator<'a> {
    chunk_ref: &'a Chunk,
    current_run: usize,
}

impl<'a> ChunkRunIterator<'a> {
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkRunIterator {
            chunk_ref,
            current_run: 0,
        }
    }
}

impl Iterator for ChunkRunIterator<'_> {
    type Item = (Range<usize>, Voxel);

    fn next(&mut self) -> Option<Self::Item> {
        let runs = self.chunk_ref.runs();
        let run = runs.get(self.current_run)?;
        let end = runs
            .get(self.current_run + 1)
            .map(|next| next.start as usize)
            .unwrap_or(self.chunk_ref.shape().volume());
        self.current_run += 1;
        Some((run.start as usize..end, run.value))
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::voxels::chunk::ChunkShape;
    use crate::engine_state::voxels::voxel::VoxelEdit;

    #[test]
    fn runs_cover_the_chunk() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0), ChunkShape::cube(2));
        chunk.set(1, 1, 1, VoxelEdit::id(3));

        let runs: Vec<_> = ChunkRunIterator::new(&chunk).collect();
        let index = ChunkShape::cube(2).index(1, 1, 1);
        assert_eq!(
            runs,
            vec![
                (0..index, Voxel::AIR),
                (index..index + 1, Voxel::solid(3)),
                (index + 1..64, Voxel::AIR),
            ]
        );
        assert_eq!(chunk.iter().len(), 64);
    }
}
