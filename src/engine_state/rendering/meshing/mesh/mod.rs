//! Surface extraction for voxel chunks.
//!
//! Turns the centre chunk of a [`Vicinity`](crate::engine_state::voxels::vicinity::Vicinity)
//! into a triangle list in three passes:
//!
//! - [`NeighborCache`]: the chunk plus a one-voxel shell, with occluding bits
//! - visibility: one [`Face`] record per voxel and direction, carrying tile,
//!   corner AO and slope
//! - greedy merge: identical adjacent faces collapse into rectangles, ramps are
//!   emitted one sloped top each
//!
//! # Usage
//! ```
//! use voxel_engine_core::engine_state::{
//!     rendering::meshing::mesh::extract_surface,
//!     voxels::{block::BlockTable, chunk::ChunkShape, vicinity::Vicinity, voxel::Voxel},
//! };
//!
//! let shape = ChunkShape::cube(2);
//! let mut voxels = vec![Voxel::AIR; shape.volume()];
//! voxels[shape.index(1, 1, 1)] = Voxel::solid(1);
//!
//! let mesh = extract_surface(&Vicinity::isolated(shape, voxels), &BlockTable::default());
//! assert_eq!(mesh.quad_count(), 6);
//! ```

mod face;
mod greedy;
mod mesh;
mod neighborhood;
mod visibility;

pub use face::Face;
pub use greedy::extract_surface;
pub use mesh::{Mesh, VERTICES_PER_QUAD};
pub use neighborhood::NeighborCache;
