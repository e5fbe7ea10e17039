//! # Collision Module
//!
//! Swept collision of axis-aligned boxes against the voxel grid.
//!
//! [`boxmarch`] walks the cells a moving box sweeps through and reports the
//! first blocking contact. [`boxsweep`] chains marches into sliding motion and
//! lifts the box onto ramps. Both only read voxels through a [`VoxelOracle`],
//! so they work against a live [`World`](crate::engine_state::voxels::world::World)
//! as well as a closure in tests.
//!
//! Only occluding voxels (solid and flat) block motion. Ramps are handled by
//! the lift step instead.

use crate::engine_state::voxels::voxel::Voxel;

pub use march::{boxmarch, MarchHit};
pub use sweep::{boxsweep, SweepResult};

pub mod march;
pub mod sweep;

/// Tolerance for boundary comparisons. Faces within this distance of a cell
/// boundary count as touching it, not overlapping the next cell.
pub const COLLISION_EPSILON: f32 = 1e-4;

/// Read access to voxels by world coordinate.
pub trait VoxelOracle {
    fn voxel_at(&self, x: i32, y: i32, z: i32) -> Voxel;
}

impl<F> VoxelOracle for F
where
    F: Fn(i32, i32, i32) -> Voxel,
{
    fn voxel_at(&self, x: i32, y: i32, z: i32) -> Voxel {
        self(x, y, z)
    }
}
