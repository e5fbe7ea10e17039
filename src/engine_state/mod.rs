//! # Engine State Module
//!
//! The core engine module that ties voxel storage, surface extraction and
//! collision together.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `config` - Engine tunables loaded from JSON
//! * `collision` - Swept box collision against the voxel grid
//! * `rendering` - Surface extraction, mesh cache and mesh generation tasks
//! * `task_management` - Worker threads for background tasks
//! * `voxels` - Voxel values, chunks, vicinities and the world
//!
//! ## Architecture
//!
//! `EngineState` is owned by one coordinating thread. Edits go straight into
//! the `World`, which flags the chunks whose surface may have changed.
//! [`EngineState::schedule_remeshing`] copies the vicinity of every flagged
//! chunk and hands it to a worker; [`EngineState::process_tasks`] installs the
//! finished meshes. Workers only ever see their private copy, so edits never
//! wait on a mesh build.

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{debug, info};

use collision::{boxsweep, SweepResult};
use config::{ConfigError, EngineConfig};
use rendering::{
    meshing::Mesh, tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask, MeshManager,
};
use task_management::TaskManager;
use voxels::{
    block::BlockTable,
    chunk::{Chunk, ChunkError, ChunkSnapshot},
    voxel::{Voxel, VoxelEdit},
    world::World,
};

pub mod collision;
pub mod config;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel engine
///
/// # Examples
///
/// ```
/// use cgmath::{Point3, Vector3};
/// use voxel_engine_core::engine_state::{
///     config::EngineConfig, voxels::voxel::VoxelEdit, EngineState,
/// };
///
/// let mut engine_state = EngineState::new(EngineConfig {
///     worker_count: 2,
///     ..EngineConfig::default()
/// })
/// .unwrap();
///
/// engine_state.set_voxel(3, 0, 3, VoxelEdit::id(1));
/// engine_state.finish_pending();
/// assert!(engine_state.mesh(Point3::new(0, 0, 0)).is_some());
///
/// // Main loop
/// loop {
///     engine_state.schedule_remeshing();
///     engine_state.process_tasks();
///     let step = engine_state.sweep_box(
///         Point3::new(0.2, 1.0, 0.2),
///         Point3::new(0.8, 2.8, 0.8),
///         Vector3::new(0.0, -0.5, 0.0),
///     );
///     # break;
/// }
/// ```
pub struct EngineState {
    /// The voxel world containing all chunk data
    pub world: World,
    /// Installed chunk meshes
    pub mesh_manager: MeshManager,
    /// Task manager for mesh builds
    pub task_manager: TaskManager,
    /// Block id to atlas tile lookup shared with the mesh workers
    block_table: Arc<BlockTable>,
    config: EngineConfig,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the config does not validate.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let floor_voxel = config.floor_voxel()?;
        info!(
            "Creating engine with chunk dimensions {:?} and {} workers",
            config.chunk_shape.dimensions(),
            config.worker_count
        );

        Ok(Self {
            world: World::new(config.chunk_shape, config.floor_level, floor_voxel),
            mesh_manager: MeshManager::new(config.mesh_cache_capacity),
            task_manager: TaskManager::new(config.worker_count),
            block_table: Arc::new(config.blocks.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn block_table(&self) -> &BlockTable {
        &self.block_table
    }

    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.world.get_voxel(x, y, z)
    }

    /// Edits one voxel and flags the chunks that need a new mesh.
    ///
    /// # Returns
    /// Whether the voxel changed.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, edit: VoxelEdit) -> bool {
        self.world.set_voxel(x, y, z, edit)
    }

    /// Inserts a chunk restored from a snapshot.
    pub fn load_chunk(&mut self, snapshot: &ChunkSnapshot) -> Result<(), ChunkError> {
        let chunk = Chunk::from_snapshot(snapshot)?;
        self.world.insert_chunk(chunk)
    }

    /// Removes a chunk together with its mesh.
    ///
    /// A build already running for the chunk is cancelled: its result is
    /// discarded, and a chunk loaded again at the same position is rebuilt
    /// only after that result has come back.
    pub fn unload_chunk(&mut self, position: Point3<i32>) -> Option<ChunkSnapshot> {
        self.mesh_manager.remove(position);
        let chunk = self.world.remove_chunk(position)?;
        let snapshot = chunk.get().snapshot();
        Some(snapshot)
    }

    /// Publishes a mesh build for every modified chunk without one in flight.
    ///
    /// The vicinity is copied and the modified flag cleared before publishing,
    /// so an edit made while the build runs flags the chunk again and it is
    /// picked up by a later call.
    ///
    /// # Returns
    /// The number of builds published.
    pub fn schedule_remeshing(&mut self) -> usize {
        let mut scheduled = 0;
        for position in self.world.modified_chunks() {
            if self.mesh_manager.is_in_flight(position) {
                continue;
            }
            let (Some(chunk), Some(vicinity)) =
                (self.world.get_chunk_at(position), self.world.vicinity(position))
            else {
                continue;
            };
            chunk.get_mut().clear_modified();

            self.mesh_manager.begin_build(position);
            self.task_manager.publish_task(Box::new(ChunkMeshGenerationTask::new(
                position,
                vicinity,
                self.block_table.clone(),
            )));
            scheduled += 1;
        }

        if scheduled > 0 {
            debug!("Scheduled {} chunk mesh builds", scheduled);
        }
        scheduled
    }

    /// Processes completed and queued tasks
    ///
    /// This method should be called each frame. It never blocks.
    ///
    /// # Returns
    /// The number of meshes installed.
    pub fn process_tasks(&mut self) -> usize {
        let installed = self
            .task_manager
            .process_completed_tasks(&mut self.mesh_manager);
        self.task_manager.process_queued_tasks();
        installed
    }

    /// Schedules and waits for mesh builds until no chunk is left modified.
    pub fn finish_pending(&mut self) {
        loop {
            self.schedule_remeshing();
            self.task_manager.wait_for_all(&mut self.mesh_manager);
            if self.world.modified_chunks().is_empty() {
                break;
            }
        }
    }

    /// The installed mesh of a chunk, if any.
    ///
    /// A loaded chunk whose mesh was evicted from the cache has none until it
    /// is rebuilt; see [`EngineState::take_evicted`].
    pub fn mesh(&mut self, position: Point3<i32>) -> Option<&Mesh> {
        self.mesh_manager.get(position)
    }

    /// Drains the loaded chunks whose meshes were evicted from the cache.
    ///
    /// Eviction is final: the chunks are not rebuilt on their own. Pass the
    /// ones still needed to [`EngineState::remesh_chunk`].
    pub fn take_evicted(&mut self) -> Vec<Point3<i32>> {
        let evicted = self.mesh_manager.take_evicted();
        evicted
            .into_iter()
            .filter(|position| self.world.get_chunk_at(*position).is_some())
            .collect()
    }

    /// Flags a loaded chunk for a rebuild by the next `schedule_remeshing`.
    ///
    /// # Returns
    /// Whether the chunk is loaded.
    pub fn remesh_chunk(&mut self, position: Point3<i32>) -> bool {
        match self.world.get_chunk_at(position) {
            Some(chunk) => {
                chunk.get_mut().mark_modified();
                true
            }
            None => false,
        }
    }

    /// Sweeps the box `min..max` along `vec` through the world.
    pub fn sweep_box(&self, min: Point3<f32>, max: Point3<f32>, vec: Vector3<f32>) -> SweepResult {
        boxsweep(min, max, vec, &self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxels::chunk::ChunkShape;

    fn engine(worker_count: usize) -> EngineState {
        EngineState::new(EngineConfig {
            chunk_shape: ChunkShape::cube(3),
            worker_count,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = EngineState::new(EngineConfig {
            floor_block: "nothing".to_string(),
            ..EngineConfig::default()
        });
        assert!(matches!(result, Err(ConfigError::UnknownBlock(_))));
    }

    #[test]
    fn edits_are_remeshed_once() {
        let mut engine_state = engine(0);
        engine_state.set_voxel(2, 3, 2, VoxelEdit::id(1));

        assert_eq!(engine_state.schedule_remeshing(), 1);
        assert!(engine_state.mesh_manager.is_in_flight(Point3::new(0, 0, 0)));
        assert_eq!(engine_state.schedule_remeshing(), 0);

        engine_state.finish_pending();
        let mesh = engine_state.mesh(Point3::new(0, 0, 0)).unwrap();
        assert_eq!(mesh.quad_count(), 6);
    }

    #[test]
    fn edit_during_build_is_rebuilt() {
        let mut engine_state = engine(0);
        engine_state.set_voxel(1, 1, 1, VoxelEdit::id(1));
        engine_state.schedule_remeshing();

        engine_state.set_voxel(5, 1, 1, VoxelEdit::id(1));
        assert_eq!(engine_state.schedule_remeshing(), 0);
        assert_eq!(engine_state.world.modified_chunks(), vec![Point3::new(0, 0, 0)]);

        engine_state.finish_pending();
        assert_eq!(engine_state.mesh(Point3::new(0, 0, 0)).map(Mesh::quad_count), Some(12));
    }

    #[test]
    fn chunks_round_trip_through_snapshots() {
        let mut engine_state = engine(1);
        engine_state.set_voxel(-1, 4, -1, VoxelEdit::voxel(Voxel::new(2, 0b0011)));
        engine_state.finish_pending();

        let position = Point3::new(-1, 0, -1);
        let snapshot = engine_state.unload_chunk(position).unwrap();
        assert!(engine_state.mesh(position).is_none());
        assert_eq!(engine_state.get_voxel(-1, 4, -1), Voxel::AIR);

        engine_state.load_chunk(&snapshot).unwrap();
        assert_eq!(engine_state.get_voxel(-1, 4, -1), Voxel::new(2, 0b0011));
        engine_state.finish_pending();
        assert_eq!(engine_state.mesh(position).map(Mesh::vertex_count), Some(6));
    }

    #[test]
    fn unloading_during_a_build_discards_its_mesh() {
        let mut engine_state = engine(0);
        let position = Point3::new(0, 0, 0);
        engine_state.set_voxel(1, 1, 1, VoxelEdit::id(1));
        assert_eq!(engine_state.schedule_remeshing(), 1);

        assert!(engine_state.unload_chunk(position).is_some());
        engine_state.finish_pending();
        assert!(engine_state.world.get_chunk_at(position).is_none());
        assert!(engine_state.mesh(position).is_none());
        assert_eq!(engine_state.mesh_manager.in_flight_count(), 0);
    }

    #[test]
    fn reloading_during_a_build_keeps_one_build_in_flight() {
        let mut engine_state = engine(0);
        let position = Point3::new(0, 0, 0);
        engine_state.set_voxel(1, 1, 1, VoxelEdit::id(1));
        assert_eq!(engine_state.schedule_remeshing(), 1);

        let snapshot = engine_state.unload_chunk(position).unwrap();
        engine_state.load_chunk(&snapshot).unwrap();
        engine_state.set_voxel(5, 1, 1, VoxelEdit::id(1));
        assert_eq!(engine_state.schedule_remeshing(), 0);
        assert_eq!(engine_state.task_manager.queued_task_count(), 1);

        // the stale build is dropped, then the reloaded chunk is rebuilt
        engine_state.finish_pending();
        assert_eq!(engine_state.mesh_manager.in_flight_count(), 0);
        assert_eq!(engine_state.mesh(position).map(Mesh::quad_count), Some(12));
    }

    #[test]
    fn evicted_meshes_are_reported_and_rebuilt_on_request() {
        let mut engine_state = EngineState::new(EngineConfig {
            chunk_shape: ChunkShape::cube(3),
            worker_count: 0,
            mesh_cache_capacity: 1,
            ..EngineConfig::default()
        })
        .unwrap();
        let (first, second) = (Point3::new(0, 0, 0), Point3::new(2, 0, 0));
        engine_state.set_voxel(1, 1, 1, VoxelEdit::id(1));
        engine_state.finish_pending();
        engine_state.set_voxel(17, 1, 1, VoxelEdit::id(1));
        engine_state.finish_pending();

        assert!(engine_state.mesh(first).is_none());
        assert!(engine_state.mesh(second).is_some());
        assert_eq!(engine_state.take_evicted(), vec![first]);
        assert!(engine_state.take_evicted().is_empty());

        assert!(engine_state.remesh_chunk(first));
        assert!(!engine_state.remesh_chunk(Point3::new(5, 5, 5)));
        engine_state.finish_pending();
        assert_eq!(engine_state.mesh(first).map(Mesh::quad_count), Some(6));
        assert_eq!(engine_state.take_evicted(), vec![second]);
    }

    #[test]
    fn box_rests_on_the_floor() {
        let engine_state = engine(0);
        let result = engine_state.sweep_box(
            Point3::new(0.25, 0.5, 0.25),
            Point3::new(0.75, 2.0, 0.75),
            Vector3::new(0.0, -2.0, 0.0),
        );
        assert_eq!(result.rest, [0, -1, 0]);
        assert!((result.displacement.y + 0.5).abs() < 1e-4);
    }
}
