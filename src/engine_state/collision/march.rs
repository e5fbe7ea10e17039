//! Incremental box DDA.

use cgmath::{Point3, Vector3};

use super::{VoxelOracle, COLLISION_EPSILON};

/// First blocking contact found by [`boxmarch`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MarchHit {
    /// Axis of the blocked face (0 = X, 1 = Y, 2 = Z).
    pub axis: usize,
    /// Direction of motion along `axis`, `1` or `-1`.
    pub step: i32,
    /// Coordinate of the contact boundary on `axis`.
    pub position: f32,
    /// Fraction of `vec` travelled before the contact, in `[0, 1]`.
    pub time: f32,
}

/// Cells covered by `[min, max]` on one axis, treating faces within epsilon of
/// a boundary as touching.
#[inline]
fn footprint(min: f32, max: f32) -> std::ops::RangeInclusive<i32> {
    let first = (min + COLLISION_EPSILON).floor() as i32;
    let last = (max - COLLISION_EPSILON).ceil() as i32 - 1;
    first..=last
}

/// Marches the box `[min, max]` along `vec` and returns the first contact with
/// an occluding voxel, or `None` when the full displacement is free.
///
/// Each step advances the axis whose leading face reaches its next cell
/// boundary soonest (ties go to the lowest axis) and tests the layer of cells
/// it enters, using the box's extent on the other two axes at that moment.
/// A box already touching a blocking cell reports the contact at time 0, and
/// so does a box moving diagonally into the edge it touches.
pub fn boxmarch<O>(min: Point3<f32>, max: Point3<f32>, vec: Vector3<f32>, oracle: &O) -> Option<MarchHit>
where
    O: VoxelOracle + ?Sized,
{
    let mut step = [0i32; 3];
    let mut lead_cell = [0i32; 3];
    let mut way_delta = [f32::INFINITY; 3];
    let mut way_next = [f32::INFINITY; 3];

    for axis in 0..3 {
        let velocity = vec[axis];
        if velocity == 0.0 {
            continue;
        }
        let (dir, lead) = if velocity > 0.0 {
            (1, max[axis])
        } else {
            (-1, min[axis])
        };
        // the cell the leading face currently bounds, same tolerance as `footprint`
        let cell = if dir > 0 {
            (lead - COLLISION_EPSILON).ceil() as i32 - 1
        } else {
            (lead + COLLISION_EPSILON).floor() as i32
        };
        let distance = if dir > 0 {
            (cell + 1) as f32 - lead
        } else {
            lead - cell as f32
        }
        .max(0.0);

        step[axis] = dir;
        lead_cell[axis] = cell;
        way_delta[axis] = 1.0 / velocity.abs();
        way_next[axis] = distance * way_delta[axis];
    }

    loop {
        let mut axis = 0;
        for candidate in 1..3 {
            if way_next[candidate] < way_next[axis] {
                axis = candidate;
            }
        }

        let time = way_next[axis];
        if time > 1.0 {
            return None;
        }

        lead_cell[axis] += step[axis];
        way_next[axis] += way_delta[axis];

        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        // cells another axis has already entered stay covered, so a box
        // meeting an edge diagonally cannot slip past it
        let span = |other: usize| {
            let cells = footprint(min[other] + vec[other] * time, max[other] + vec[other] * time);
            match step[other] {
                1 => *cells.start()..=(*cells.end()).max(lead_cell[other]),
                -1 => (*cells.start()).min(lead_cell[other])..=*cells.end(),
                _ => cells,
            }
        };

        for cu in span(u) {
            for cv in span(v) {
                let mut cell = [0i32; 3];
                cell[axis] = lead_cell[axis];
                cell[u] = cu;
                cell[v] = cv;

                if oracle.voxel_at(cell[0], cell[1], cell[2]).is_occluding() {
                    let position = if step[axis] > 0 {
                        lead_cell[axis] as f32
                    } else {
                        (lead_cell[axis] + 1) as f32
                    };
                    return Some(MarchHit {
                        axis,
                        step: step[axis],
                        position,
                        time,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::voxel::Voxel;

    fn wall_at_x(wall: i32) -> impl Fn(i32, i32, i32) -> Voxel {
        move |x, _, _| if x == wall { Voxel::solid(1) } else { Voxel::AIR }
    }

    #[test]
    fn hits_wall_in_front() {
        let hit = boxmarch(
            Point3::new(0.2, 0.0, 0.0),
            Point3::new(0.8, 1.0, 1.0),
            Vector3::new(5.0, 0.0, 0.0),
            &wall_at_x(3),
        )
        .unwrap();

        assert_eq!(hit.axis, 0);
        assert_eq!(hit.step, 1);
        assert_eq!(hit.position, 3.0);
        assert!((hit.time - 2.2 / 5.0).abs() < 1e-5);
    }

    #[test]
    fn hits_a_single_voxel() {
        let block = |x: i32, y: i32, z: i32| if (x, y, z) == (1, 0, 0) { Voxel::solid(1) } else { Voxel::AIR };
        let hit = boxmarch(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Vector3::new(2.0, 0.0, 0.0),
            &block,
        )
        .unwrap();

        assert_eq!((hit.axis, hit.step), (0, 1));
        assert_eq!(hit.position, 1.0);
        assert_eq!(hit.time, 0.0);
    }

    #[test]
    fn hits_wall_behind() {
        let hit = boxmarch(
            Point3::new(0.2, 0.0, 0.0),
            Point3::new(0.8, 1.0, 1.0),
            Vector3::new(-4.0, 0.0, 0.0),
            &wall_at_x(-2),
        )
        .unwrap();

        assert_eq!((hit.axis, hit.step), (0, -1));
        assert_eq!(hit.position, -1.0);
    }

    #[test]
    fn misses_when_displacement_runs_out() {
        let hit = boxmarch(
            Point3::new(0.2, 0.0, 0.0),
            Point3::new(0.8, 1.0, 1.0),
            Vector3::new(2.0, 0.0, 0.0),
            &wall_at_x(3),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn zero_displacement_never_hits() {
        let solid = |_: i32, _: i32, _: i32| Voxel::solid(1);
        assert!(boxmarch(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0), Vector3::new(0.0, 0.0, 0.0), &solid).is_none());
    }

    #[test]
    fn touching_faces_block_immediately() {
        let hit = boxmarch(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 1.0),
            Vector3::new(0.5, 0.0, 0.0),
            &wall_at_x(3),
        )
        .unwrap();
        assert_eq!(hit.time, 0.0);
        assert_eq!(hit.position, 3.0);
    }

    #[test]
    fn ramps_do_not_block() {
        let ramp = |x: i32, _: i32, _: i32| if x == 1 { Voxel::new(1, 0b1010) } else { Voxel::AIR };
        assert!(boxmarch(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 0.0, 0.0), &ramp).is_none());
    }

    #[test]
    fn diagonal_motion_finds_the_first_layer() {
        // floor below y = 0, moving down and sideways
        let floor = |_: i32, y: i32, _: i32| if y < 0 { Voxel::solid(1) } else { Voxel::AIR };
        let hit = boxmarch(
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(1.5, 2.5, 1.5),
            Vector3::new(3.0, -1.0, 0.0),
            &floor,
        )
        .unwrap();
        assert_eq!((hit.axis, hit.step), (1, -1));
        assert_eq!(hit.position, 0.0);
        assert!((hit.time - 0.5).abs() < 1e-5);
    }

    #[test]
    fn diagonal_motion_into_a_touched_edge_is_blocked() {
        // step of solid voxels at x >= 1, y <= 0; box resting exactly on its edge corner
        let step = |x: i32, y: i32, _: i32| if x >= 1 && y <= 0 { Voxel::solid(1) } else { Voxel::AIR };
        let hit = boxmarch(
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 1.0),
            Vector3::new(0.5, -0.5, 0.0),
            &step,
        )
        .unwrap();
        assert_eq!(hit.time, 0.0);
        assert_eq!((hit.axis, hit.step), (1, -1));
    }
}
