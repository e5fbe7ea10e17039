//! # Voxels
//!
//! This module contains the voxel data model: how single voxels are packed, how
//! chunks store them, and how the world ties chunks together.
//!
//! ## Architecture
//!
//! * **Voxel**: the packed `u32` value (block id and slope code) and partial edits
//! * **Slope**: ramp corner tables and the analytic ramp height
//! * **Block**: block types, face directions and the block id to tile table
//! * **Chunk**: interval encoded storage for one fixed-size box of voxels
//! * **Vicinity**: dense copies of a chunk and its 26 neighbours for meshing
//! * **World**: sparse chunk map, floor policy and change tracking
//!
//! ## Data Flow
//!
//! 1. World receives requests for voxel access or modification
//! 2. World delegates to the appropriate chunk, creating it if necessary
//! 3. Changes flag the chunk and affected neighbours modified
//! 4. The mesh scheduler snapshots vicinities of modified chunks for the workers
//!
//! ## Thread Safety
//!
//! Chunks live in `MtResource` containers. Workers never see a live chunk, only
//! the dense snapshot taken for them.

pub mod block;
pub mod chunk;
pub mod slope;
pub mod vicinity;
pub mod voxel;
pub mod world;
