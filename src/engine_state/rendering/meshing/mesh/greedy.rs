//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces with identical face records into larger quads, significantly reducing the number
//! of vertices needed to render a chunk.

use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, BlockTable},
    chunk::ChunkShape,
    vicinity::Vicinity,
};

use super::{
    face::Face,
    mesh::Mesh,
    neighborhood::NeighborCache,
    visibility::compute_faces,
};

/// Extracts the surface of the centre chunk of a vicinity.
///
/// # Arguments
/// * `vicinity` - The chunk to mesh and its 26 neighbours
/// * `table` - Block id to atlas tile lookup
///
/// # Returns
/// A new `Mesh` with one quad per maximal rectangle of identical faces and one
/// ramp top per ramp voxel.
///
/// # Panics
/// Panics if the block table does not cover a block id present in the chunk.
///
/// # Performance
/// Runs in O(n) time in the number of voxels in the chunk. All scratch buffers
/// are owned by the call, so independent chunks can be meshed in parallel.
pub fn extract_surface(vicinity: &Vicinity, table: &BlockTable) -> Mesh {
    let start = Instant::now();
    if vicinity.center().iter().all(|voxel| voxel.is_air()) {
        return Mesh::new();
    }

    let cache = NeighborCache::from_vicinity(vicinity);
    let mut faces = compute_faces(&cache, table);

    let mut mesh = Mesh::new();
    for side in BlockSide::all() {
        merge_side(&mut faces[side as usize], side, cache.shape(), &mut mesh);
    }

    debug!(
        "Extracted {} quads ({} vertices) in {:?}",
        mesh.quad_count(),
        mesh.vertex_count(),
        start.elapsed()
    );
    mesh
}

/// Merges the faces of one direction into rectangles and emits them.
///
/// Layers are walked along the normal axis. Within a layer a rectangle grows
/// along `u` while the face record is identical, then along `v` while the whole
/// row matches. Consumed cells are cleared so every face is emitted once.
fn merge_side(faces: &mut [Face], side: BlockSide, shape: ChunkShape, mesh: &mut Mesh) {
    let dims = shape.dimensions();
    let normal_axis = side.normal_axis();
    let (u, v) = side.plane_axes();

    let coords = |layer: usize, a: usize, b: usize| {
        let mut position = [0usize; 3];
        position[normal_axis] = layer;
        position[u] = a;
        position[v] = b;
        position
    };
    let index = |layer: usize, a: usize, b: usize| {
        let [x, y, z] = coords(layer, a, b);
        shape.index(x, y, z)
    };

    for layer in 0..dims[normal_axis] {
        for b in 0..dims[v] {
            let mut a = 0;
            while a < dims[u] {
                let face = faces[index(layer, a, b)];
                if !face.is_visible() {
                    a += 1;
                    continue;
                }
                let origin = coords(layer, a, b).map(|c| c as i32);

                if face.slope() != 0 {
                    faces[index(layer, a, b)] = Face::EMPTY;
                    mesh.push_ramp(origin, face);
                    a += 1;
                    continue;
                }

                let mut width = 1;
                while a + width < dims[u] && faces[index(layer, a + width, b)] == face {
                    width += 1;
                }

                let mut height = 1;
                'rows: while b + height < dims[v] {
                    for k in a..a + width {
                        if faces[index(layer, k, b + height)] != face {
                            break 'rows;
                        }
                    }
                    height += 1;
                }

                for row in b..b + height {
                    for k in a..a + width {
                        faces[index(layer, k, row)] = Face::EMPTY;
                    }
                }

                mesh.push_quad(side, origin, width as i32, height as i32, face);
                a += width;
            }
        }
    }
}
