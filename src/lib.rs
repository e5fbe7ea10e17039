#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Engine Core
//!
//! The computational core of a voxel world engine: compact storage of per-voxel
//! block state, extraction of that state into renderable surface geometry, and
//! swept collision of axis-aligned bodies against the voxel grid.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership utilities used throughout the engine
//! * `engine_state` - The engine components: voxels, meshing, collision and task management
//!
//! ## Architecture
//!
//! * Voxel data is stored per chunk as sorted runs of identical values
//! * A modified chunk is meshed on a worker thread from a private copy of its
//!   3×3×3 vicinity, with greedy merging and per-corner ambient occlusion
//! * Moving boxes are swept through the grid axis by axis and lifted onto ramps
//!
//! Window, GPU and input handling belong to the embedding application.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_engine_core::init_logger();
//!     if let Err(err) = voxel_engine_core::run(None) {
//!         log::error!("{err}");
//!     }
//! }
//! ```

use std::path::Path;

use cgmath::{Point3, Vector3};
use log::{debug, info};

use engine_state::{
    config::{ConfigError, EngineConfig},
    voxels::{
        block::block_type::BlockType,
        voxel::{Voxel, VoxelEdit},
    },
    EngineState,
};

pub mod core;
pub mod engine_state;

/// Slope code of a ramp rising towards +X.
const RAMP_UP_X: u8 = 0b1010;

/// Initializes `env_logger` on stdout, filtered by `RUST_LOG`.
///
/// Calling it again keeps the logger installed first.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG");
    // tests and embedders may have installed one already
    if let Err(err) = log_builder.try_init() {
        debug!("Keeping the installed logger: {}", err);
    }
}

/// Runs a headless demo: builds a small hill with a ramp, meshes it on the
/// worker pool and walks a box up the ramp.
///
/// # Arguments
/// * `config_path` - Optional JSON config; defaults are used without one
pub fn run(config_path: Option<&Path>) -> Result<(), ConfigError> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut engine_state = EngineState::new(config)?;
    info!("Engine initialized");

    let grass = VoxelEdit::id(BlockType::GRASS.id());
    let stone = VoxelEdit::id(BlockType::STONE.id());
    let ramp = VoxelEdit::voxel(Voxel::new(BlockType::DIRT.id(), RAMP_UP_X));
    for z in -8..8 {
        for x in -8..8 {
            engine_state.set_voxel(x, 0, z, grass);
            if x >= 3 {
                engine_state.set_voxel(x, 1, z, stone);
            }
        }
        engine_state.set_voxel(2, 1, z, ramp);
    }

    engine_state.finish_pending();
    for position in engine_state.world.chunks.keys().copied().collect::<Vec<_>>() {
        if let Some(mesh) = engine_state.mesh(position) {
            info!(
                "Chunk {:?}: {} quads, {} bytes of vertex data",
                position,
                mesh.quad_count(),
                mesh.as_bytes().len()
            );
        }
    }

    let (mut min, mut max) = (Point3::new(-1.5, 1.0, -0.3), Point3::new(-0.9, 2.8, 0.3));
    for step in 0..30 {
        let result = engine_state.sweep_box(min, max, Vector3::new(0.2, -0.1, 0.0));
        min += result.displacement;
        max += result.displacement;
        info!(
            "Step {:2}: feet at ({:.2}, {:.2}, {:.2}), resting {:?}",
            step, min.x, min.y, min.z, result.rest
        );
    }

    Ok(())
}
