//! Task for generating mesh data for chunks in a background thread.

use std::sync::Arc;

use cgmath::Point3;
use log::trace;

use crate::engine_state::{
    rendering::meshing::{mesh::extract_surface, Mesh, MeshManager},
    task_management::task::{Task, TaskResult},
    voxels::{block::BlockTable, vicinity::Vicinity},
};

/// Extracts the surface of one chunk from a snapshot of its vicinity.
///
/// The vicinity is copied out of the world when the task is created, so the
/// worker never takes a chunk lock and later edits do not affect this build.
pub struct ChunkMeshGenerationTask {
    /// Position of the chunk being meshed
    position: Point3<i32>,
    /// The chunk and its 26 neighbours as dense voxel arrays
    vicinity: Vicinity,
    /// Block id to atlas tile lookup
    block_table: Arc<BlockTable>,
}

impl ChunkMeshGenerationTask {
    pub fn new(position: Point3<i32>, vicinity: Vicinity, block_table: Arc<BlockTable>) -> Self {
        ChunkMeshGenerationTask {
            position,
            vicinity,
            block_table,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let mesh = extract_surface(&self.vicinity, &self.block_table);
        Box::new(ChunkMeshGenerationTaskResult {
            position: self.position,
            mesh,
        })
    }
}

/// A freshly extracted mesh waiting to be installed.
pub struct ChunkMeshGenerationTaskResult {
    position: Point3<i32>,
    mesh: Mesh,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Installs the mesh, replacing the chunk's previous one, unless the chunk
    /// was removed while the build ran.
    fn handle_result(self: Box<Self>, mesh_manager: &mut MeshManager) -> Vec<Box<dyn Task + Send>> {
        if !mesh_manager.install(self.position, self.mesh) {
            trace!("Discarded mesh build of chunk {:?}", self.position);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{chunk::ChunkShape, voxel::Voxel};

    #[test]
    fn result_installs_mesh() {
        let shape = ChunkShape::cube(2);
        let mut voxels = vec![Voxel::AIR; shape.volume()];
        voxels[shape.index(0, 0, 0)] = Voxel::solid(1);
        let position = Point3::new(3, -1, 2);

        let task = ChunkMeshGenerationTask::new(
            position,
            Vicinity::isolated(shape, voxels),
            Arc::new(BlockTable::default()),
        );
        let mut mesh_manager = MeshManager::new(8);
        mesh_manager.begin_build(position);

        let follow_up = task.process().handle_result(&mut mesh_manager);
        assert!(follow_up.is_empty());
        assert!(!mesh_manager.is_in_flight(position));
        assert_eq!(mesh_manager.peek(position).map(Mesh::quad_count), Some(6));
    }

    #[test]
    fn result_for_a_removed_chunk_is_discarded() {
        let shape = ChunkShape::cube(2);
        let mut voxels = vec![Voxel::AIR; shape.volume()];
        voxels[shape.index(1, 1, 1)] = Voxel::solid(1);
        let position = Point3::new(0, 0, 0);

        let task = ChunkMeshGenerationTask::new(
            position,
            Vicinity::isolated(shape, voxels),
            Arc::new(BlockTable::default()),
        );
        let mut mesh_manager = MeshManager::new(8);
        mesh_manager.begin_build(position);
        mesh_manager.remove(position);

        task.process().handle_result(&mut mesh_manager);
        assert!(!mesh_manager.is_in_flight(position));
        assert!(mesh_manager.peek(position).is_none());
    }
}
