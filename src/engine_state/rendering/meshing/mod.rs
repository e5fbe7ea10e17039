//! Mesh generation and management for voxel rendering.
//!
//! # Architecture
//! - `MeshManager`: Holds the latest mesh of every chunk and the set of chunks
//!   with a rebuild in flight
//! - `mesh/`: The surface extraction algorithm
//!
//! Meshes are produced on worker threads by
//! [`ChunkMeshGenerationTask`](super::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask)
//! and installed here on the coordinating thread once their result comes back.

use std::{collections::HashSet, num::NonZeroUsize};

use cgmath::Point3;
use log::debug;
use lru::LruCache;

/// Core mesh generation algorithms and data structures.
pub mod mesh;

pub use mesh::Mesh;

/// Latest extracted surface per chunk position.
///
/// Meshes are kept in an LRU cache, so a bounded number of chunks stay
/// resident. At most one rebuild per chunk is in flight at a time; the
/// coordinator asks [`MeshManager::begin_build`] before publishing a task.
///
/// A build stays in flight until its result comes back, even if its chunk is
/// removed in the meantime. Such a result is discarded on arrival.
pub struct MeshManager {
    /// Installed meshes, least recently touched evicted first
    meshes: LruCache<Point3<i32>, Mesh>,
    /// Chunks whose mesh task has been published but not yet installed
    in_flight: HashSet<Point3<i32>>,
    /// In-flight builds whose chunk was removed before the result arrived
    cancelled: HashSet<Point3<i32>>,
    /// Chunks whose mesh was pushed out of the cache, oldest first
    evicted: Vec<Point3<i32>>,
}

impl MeshManager {
    /// Creates a manager holding at most `capacity` meshes.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        MeshManager {
            meshes: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            in_flight: HashSet::new(),
            cancelled: HashSet::new(),
            evicted: Vec::new(),
        }
    }

    /// Marks a rebuild of `position` as in flight.
    ///
    /// Returns `false` if one already is, in which case no new task should be
    /// published.
    pub fn begin_build(&mut self, position: Point3<i32>) -> bool {
        self.in_flight.insert(position)
    }

    pub fn is_in_flight(&self, position: Point3<i32>) -> bool {
        self.in_flight.contains(&position)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Installs a finished mesh, replacing the previous one, and ends the
    /// chunk's build.
    ///
    /// The result of a cancelled build is dropped instead. A mesh evicted to
    /// make room is recorded for [`MeshManager::take_evicted`].
    ///
    /// # Returns
    /// Whether the mesh was installed.
    pub fn install(&mut self, position: Point3<i32>, mesh: Mesh) -> bool {
        self.in_flight.remove(&position);
        if self.cancelled.remove(&position) {
            debug!("Dropping mesh of removed chunk {:?}", position);
            return false;
        }
        debug!(
            "Installing mesh for chunk {:?} with {} vertices",
            position,
            mesh.vertex_count()
        );

        if let Some((evicted, _)) = self.meshes.push(position, mesh) {
            if evicted != position {
                debug!("Evicted mesh for chunk {:?}", evicted);
                self.evicted.push(evicted);
            }
        }
        true
    }

    /// Drains the positions whose meshes were evicted since the last call.
    pub fn take_evicted(&mut self) -> Vec<Point3<i32>> {
        std::mem::take(&mut self.evicted)
    }

    /// The mesh of `position`, marking it as recently used.
    pub fn get(&mut self, position: Point3<i32>) -> Option<&Mesh> {
        self.meshes.get(&position)
    }

    /// The mesh of `position` without touching its LRU rank.
    pub fn peek(&self, position: Point3<i32>) -> Option<&Mesh> {
        self.meshes.peek(&position)
    }

    pub fn is_chunk_meshed(&self, position: Point3<i32>) -> bool {
        self.meshes.contains(&position)
    }

    /// Drops the mesh of an unloaded chunk and cancels its build, if any.
    ///
    /// The build stays in flight until its result arrives, so a chunk loaded
    /// again at the same position waits for it before being rebuilt.
    pub fn remove(&mut self, position: Point3<i32>) -> Option<Mesh> {
        if self.in_flight.contains(&position) {
            self.cancelled.insert(position);
        }
        self.evicted.retain(|evicted| *evicted != position);
        self.meshes.pop(&position)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
