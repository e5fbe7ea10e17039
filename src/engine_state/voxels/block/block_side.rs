//! # Block Side Module
//!
//! This module defines the six axis-aligned faces of a voxel and the in-plane
//! frame the surface extractor sweeps each of them in.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminant is the index of the face's scratch array during meshing.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The face pointing towards positive X
    RIGHT = 0,

    /// The face pointing towards negative X
    LEFT = 1,

    /// The face pointing towards positive Y
    TOP = 2,

    /// The face pointing towards negative Y
    BOTTOM = 3,

    /// The face pointing towards positive Z
    FRONT = 4,

    /// The face pointing towards negative Z
    BACK = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::RIGHT,
            BlockSide::LEFT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::FRONT,
            BlockSide::BACK,
        ]
    }

    /// The axis (0 = X, 1 = Y, 2 = Z) the face normal lies on.
    pub fn normal_axis(self) -> usize {
        match self {
            BlockSide::RIGHT | BlockSide::LEFT => 0,
            BlockSide::TOP | BlockSide::BOTTOM => 1,
            BlockSide::FRONT | BlockSide::BACK => 2,
        }
    }

    /// `+1` when the face points along the positive axis, `-1` otherwise.
    pub fn step(self) -> i32 {
        match self {
            BlockSide::RIGHT | BlockSide::TOP | BlockSide::FRONT => 1,
            BlockSide::LEFT | BlockSide::BOTTOM | BlockSide::BACK => -1,
        }
    }

    /// The two in-plane axes `(u, v)` of the face.
    ///
    /// They are ordered so that `u × v` is the outward normal, which makes the
    /// corner order `c0 = (0,0)`, `c1 = (1,0)`, `c2 = (0,1)`, `c3 = (1,1)`
    /// counter-clockwise when seen from outside.
    pub fn plane_axes(self) -> (usize, usize) {
        match self {
            BlockSide::RIGHT => (1, 2),
            BlockSide::LEFT => (2, 1),
            BlockSide::TOP => (2, 0),
            BlockSide::BOTTOM => (0, 2),
            BlockSide::FRONT => (0, 1),
            BlockSide::BACK => (1, 0),
        }
    }

    /// Unit outward normal of the face.
    pub fn normal(self) -> Vector3<i32> {
        let mut normal = Vector3::new(0, 0, 0);
        normal[self.normal_axis()] = self.step();
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    fn unit(axis: usize) -> Vector3<i32> {
        let mut v = Vector3::zero();
        v[axis] = 1;
        v
    }

    #[test]
    fn plane_axes_are_right_handed() {
        for side in BlockSide::all() {
            let (u, v) = side.plane_axes();
            assert_eq!(unit(u).cross(unit(v)), side.normal(), "{side:?}");
        }
    }

    #[test]
    fn discriminants_match_order() {
        for (i, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side as usize, i);
        }
    }
}
