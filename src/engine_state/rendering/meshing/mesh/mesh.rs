//! Mesh data structures and operations for voxel rendering.
//!
//! This module provides the vertex buffer of an extracted chunk surface and
//! the two ways faces are turned into triangles: merged axis-aligned quads and
//! single ramp tops.

use cgmath::{Point3, Vector3};

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::{
    block::block_side::BlockSide,
    slope::{SplitDiagonal, SLOPE_CORNER_HEIGHTS, SLOPE_CORNER_NORMALS, SLOPE_DIAGONALS},
};

use super::face::Face;

/// Vertices emitted per quad: two independent triangles.
pub const VERTICES_PER_QUAD: usize = 6;

/// Corner order of the two triangles of a quad split along `c0`–`c3`.
const MAIN_DIAGONAL_ORDER: [usize; 6] = [0, 1, 3, 0, 3, 2];
/// Corner order of the two triangles of a quad split along `c1`–`c2`.
const ANTI_DIAGONAL_ORDER: [usize; 6] = [0, 1, 2, 1, 3, 2];

/// The extracted surface of one chunk.
///
/// Vertex positions are local to the chunk. A mesh is rebuilt from scratch
/// whenever its chunk changes and is never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Triangle list, six vertices per quad
    pub vertices: Vec<Vertex>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Mesh {
            vertices: Vec::new(),
        }
    }

    /// Number of vertices to draw.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex data ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Emits a `width` × `height` rectangle of faces pointing towards `side`.
    ///
    /// # Arguments
    /// * `side` - The direction the faces point towards
    /// * `origin` - The voxel at the rectangle's `(0, 0)` corner
    /// * `width` - Extent along the side's `u` axis, in voxels
    /// * `height` - Extent along the side's `v` axis, in voxels
    /// * `face` - The shared face record; its AO is used for the four corners
    pub fn push_quad(&mut self, side: BlockSide, origin: [i32; 3], width: i32, height: i32, face: Face) {
        let normal_axis = side.normal_axis();
        let (u, v) = side.plane_axes();

        let mut base = origin;
        if side.step() > 0 {
            base[normal_axis] += 1;
        }
        let corners: [Point3<i32>; 4] = std::array::from_fn(|corner| {
            let mut position = base;
            position[u] += (corner & 1) as i32 * width;
            position[v] += (corner >> 1) as i32 * height;
            Point3::from(position)
        });

        let ao = face.ao();
        let order = if face.flip_diagonal() {
            ANTI_DIAGONAL_ORDER
        } else {
            MAIN_DIAGONAL_ORDER
        };
        self.vertices.extend(
            order
                .iter()
                .map(|&corner| Vertex::new(corners[corner], ao[corner], side.normal(), face.tile())),
        );
    }

    /// Emits the sloped top of the ramp voxel at `origin`.
    ///
    /// Corner heights, normals and the split diagonal come from the slope
    /// table, so the triangles match the surface the collision sweeper lifts
    /// bodies onto.
    pub fn push_ramp(&mut self, origin: [i32; 3], face: Face) {
        let slope = face.slope() as usize;
        let heights = SLOPE_CORNER_HEIGHTS[slope];
        let normals = SLOPE_CORNER_NORMALS[slope];
        let ao = face.ao();

        // corners indexed x_bit | z_bit << 1
        let corner_vertex = |corner: usize| {
            let (x_bit, z_bit) = (corner & 1, corner >> 1);
            let position = Point3::new(
                origin[0] + x_bit as i32,
                origin[1] + heights[corner] as i32,
                origin[2] + z_bit as i32,
            );
            let [dx, dz] = normals[corner];
            // the top face frame has u = z and v = x
            let ao = ao[z_bit | (x_bit << 1)];
            Vertex::new(position, ao, Vector3::new(dx as i32, 1, dz as i32), face.tile())
        };

        let order = match SLOPE_DIAGONALS[slope] {
            SplitDiagonal::Main => [0, 3, 1, 0, 2, 3],
            SplitDiagonal::Anti => [0, 2, 1, 1, 2, 3],
        };
        self.vertices.extend(order.iter().map(|&corner| corner_vertex(corner)));
    }
}
