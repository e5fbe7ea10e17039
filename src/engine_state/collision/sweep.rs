//! Sliding motion and ramp lift built on [`boxmarch`].

use cgmath::{Point3, Vector3, Zero};
use log::trace;

use crate::engine_state::voxels::slope::ramp_height;

use super::{boxmarch, VoxelOracle, COLLISION_EPSILON};

/// Outcome of a sweep.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepResult {
    /// How far the box actually moved.
    pub displacement: Vector3<f32>,
    /// Per axis, the direction the box came to rest against (`1`, `-1`) or `0`
    /// when that axis moved freely.
    pub rest: [i32; 3],
}

/// Moves the box `[min, max]` by `vec`, sliding along blocking faces.
///
/// Up to three marches run, one per axis that can be blocked. Each contact
/// clamps the box to the contact boundary, drops the remaining motion on that
/// axis and records the axis as resting. Afterwards the box is lifted onto any
/// ramp under its bottom corners, as far as the headroom above allows; a lift
/// marks the vertical axis as resting on the ground (`rest[1] == -1`).
///
/// A box enclosed in solid voxels does not move.
pub fn boxsweep<O>(min: Point3<f32>, max: Point3<f32>, vec: Vector3<f32>, oracle: &O) -> SweepResult
where
    O: VoxelOracle + ?Sized,
{
    let mut min = min;
    let mut max = max;
    let mut remaining = vec;
    let mut displacement = Vector3::zero();
    let mut rest = [0i32; 3];

    for _ in 0..3 {
        if remaining.is_zero() {
            break;
        }

        let Some(hit) = boxmarch(min, max, remaining, oracle) else {
            min += remaining;
            max += remaining;
            displacement += remaining;
            break;
        };

        let lead = if hit.step > 0 { max[hit.axis] } else { min[hit.axis] };
        let fraction = ((hit.position - lead) / remaining[hit.axis]).clamp(0.0, 1.0);
        let moved = remaining * fraction;
        min += moved;
        max += moved;
        displacement += moved;

        remaining -= moved;
        remaining[hit.axis] = 0.0;
        rest[hit.axis] = hit.step;
    }

    let mut lift = ramp_lift(min, max, oracle);
    if lift > 0.0 {
        // never lift into the cells above
        if let Some(hit) = boxmarch(min, max, Vector3::new(0.0, lift, 0.0), oracle) {
            lift = (hit.position - max.y).clamp(0.0, lift);
        }
        trace!("Lifting box at {:?} by {} onto a ramp", min, lift);
        displacement.y += lift;
        rest[1] = -1;
    }

    SweepResult { displacement, rest }
}

/// How far the box must rise to stand on the ramps under its bottom corners.
///
/// Each corner samples the cell containing it at the box's bottom height; a
/// ramp there yields the analytic surface height at the corner's exact
/// position. The box never moves down.
fn ramp_lift<O>(min: Point3<f32>, max: Point3<f32>, oracle: &O) -> f32
where
    O: VoxelOracle + ?Sized,
{
    let cell_y = min.y.floor();
    let corners = [
        (min.x, min.z),
        (max.x - COLLISION_EPSILON, min.z),
        (min.x, max.z - COLLISION_EPSILON),
        (max.x - COLLISION_EPSILON, max.z - COLLISION_EPSILON),
    ];

    let mut lift = 0.0f32;
    for (x, z) in corners {
        let (cell_x, cell_z) = (x.floor(), z.floor());
        let voxel = oracle.voxel_at(cell_x as i32, cell_y as i32, cell_z as i32);
        if !voxel.is_ramp() {
            continue;
        }
        let surface = cell_y + ramp_height(voxel.slope(), x - cell_x, z - cell_z);
        lift = lift.max(surface - min.y);
    }
    lift
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;
    use crate::engine_state::voxels::voxel::Voxel;

    fn unit_box(x: f32, y: f32, z: f32) -> (Point3<f32>, Point3<f32>) {
        (Point3::new(x, y, z), Point3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    #[test]
    fn slides_along_a_wall() {
        let wall = |x: i32, _: i32, _: i32| if x >= 1 { Voxel::solid(1) } else { Voxel::AIR };
        let (min, max) = unit_box(0.0, 0.0, 0.0);

        let result = boxsweep(min, max, Vector3::new(2.0, 2.0, 0.0), &wall);
        assert_eq!(result.rest, [1, 0, 0]);
        assert!((result.displacement - Vector3::new(0.0, 2.0, 0.0)).magnitude2() < 1e-8);
    }

    #[test]
    fn slides_past_a_single_voxel() {
        let block = |x: i32, y: i32, z: i32| if (x, y, z) == (1, 0, 0) { Voxel::solid(1) } else { Voxel::AIR };
        let (min, max) = unit_box(0.0, 0.0, 0.0);

        let result = boxsweep(min, max, Vector3::new(2.0, 2.0, 0.0), &block);
        assert_eq!(result.rest, [1, 0, 0]);
        assert!((result.displacement - Vector3::new(0.0, 2.0, 0.0)).magnitude2() < 1e-8);
    }

    #[test]
    fn lands_on_the_floor() {
        let floor = |_: i32, y: i32, _: i32| if y < 0 { Voxel::solid(1) } else { Voxel::AIR };
        let (min, max) = unit_box(0.5, 0.5, 0.5);

        let result = boxsweep(min, max, Vector3::new(1.0, -2.0, 0.0), &floor);
        assert_eq!(result.rest, [0, -1, 0]);
        assert!((result.displacement.y + 0.5).abs() < 1e-5);
        assert!((result.displacement.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn enclosed_box_stalls() {
        let solid = |_: i32, _: i32, _: i32| Voxel::solid(1);
        let (min, max) = unit_box(0.0, 0.0, 0.0);

        let result = boxsweep(min, max, Vector3::new(1.0, 1.0, 1.0), &solid);
        assert_eq!(result.displacement, Vector3::zero());
        assert_eq!(result.rest, [1, 1, 1]);
    }

    #[test]
    fn walks_up_a_ramp_without_being_blocked() {
        // ramp rising towards +x in cell (1, 0, 0), floor below y = 0
        let terrain = |x: i32, y: i32, z: i32| match (x, y, z) {
            (1, 0, 0) => Voxel::new(1, 0b1010),
            (_, y, _) if y < 0 => Voxel::solid(1),
            _ => Voxel::AIR,
        };
        let min = Point3::new(0.0, 0.0, 0.25);
        let max = Point3::new(0.5, 1.8, 0.75);

        let result = boxsweep(min, max, Vector3::new(0.75, 0.0, 0.0), &terrain);
        assert_eq!(result.rest, [0, -1, 0]);
        assert!((result.displacement.x - 0.75).abs() < 1e-5);
        // leading corner at x = 1.25 - epsilon
        assert!((result.displacement.y - 0.25).abs() < 1e-3);
    }

    #[test]
    fn lift_is_continuous_across_a_ramp() {
        // ramp rising towards +z: corners c2 and c3 raised
        let terrain = |x: i32, y: i32, z: i32| match (x, y, z) {
            (0, 0, 0) => Voxel::new(1, 0b1100),
            (_, y, _) if y < 0 => Voxel::solid(1),
            _ => Voxel::AIR,
        };
        let mut min = Point3::new(0.25, 0.0, -0.6);
        let mut max = Point3::new(0.75, 1.8, -0.1);
        let step = Vector3::new(0.0, 0.0, 0.02);

        let mut previous_y = min.y;
        for _ in 0..50 {
            let result = boxsweep(min, max, step, &terrain);
            min += result.displacement;
            max += result.displacement;

            assert!(min.y >= previous_y - 1e-6, "box sank to {}", min.y);
            assert!(min.y - previous_y <= step.z + 1e-3, "box jumped by {}", min.y - previous_y);
            previous_y = min.y;

            let expected = ramp_height(0b1100, 0.5, (max.z - COLLISION_EPSILON).clamp(0.0, 1.0));
            if max.z > 0.0 && max.z < 1.0 {
                assert!((min.y - expected).abs() < 1e-3, "at z {} y {}", max.z, min.y);
            }
        }
    }

    #[test]
    fn ramp_lift_stops_under_a_ceiling() {
        // ramp rising towards +x in cell (1, 0, 0), floor below y = 0, ceiling from y = 2
        let terrain = |x: i32, y: i32, z: i32| match (x, y, z) {
            (1, 0, 0) => Voxel::new(1, 0b1010),
            (_, y, _) if y < 0 || y >= 2 => Voxel::solid(1),
            _ => Voxel::AIR,
        };
        let min = Point3::new(0.0, 0.0, 0.25);
        let max = Point3::new(0.5, 1.8, 0.75);

        let result = boxsweep(min, max, Vector3::new(0.75, 0.0, 0.0), &terrain);
        assert_eq!(result.rest, [0, -1, 0]);
        assert!((result.displacement.x - 0.75).abs() < 1e-5);
        // the ramp would lift by 0.25, the ceiling leaves 0.2
        assert!((result.displacement.y - 0.2).abs() < 1e-4);
        assert!(max.y + result.displacement.y <= 2.0 + 1e-5);
    }
}
