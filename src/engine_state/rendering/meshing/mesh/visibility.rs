//! Face visibility and ambient occlusion.
//!
//! For every voxel of the centre chunk and every direction this pass decides
//! whether a face exists and packs its tile, corner AO and slope into a
//! [`Face`]. Its output is one scratch array per direction, indexed like the
//! chunk, which the greedy pass then consumes.

use crate::engine_state::voxels::block::{block_side::BlockSide, BlockTable};

use super::face::{corner_ao, Face};
use super::neighborhood::NeighborCache;

/// One face array per [`BlockSide`], each the size of the chunk.
pub type FaceLayers = [Vec<Face>; 6];

/// Builds the face arrays for the centre chunk of `cache`.
///
/// A flat solid voxel gets a face towards every neighbour that does not
/// occlude. A ramp only gets its top face, tagged with the slope code so it
/// is emitted through the ramp path and never merged.
pub fn compute_faces(cache: &NeighborCache, table: &BlockTable) -> FaceLayers {
    let shape = cache.shape();
    let [dim_x, dim_y, dim_z] = shape.dimensions();
    let mut faces: FaceLayers = std::array::from_fn(|_| vec![Face::EMPTY; shape.volume()]);

    for y in 0..dim_y {
        for z in 0..dim_z {
            for x in 0..dim_x {
                let position = [x as i32, y as i32, z as i32];
                let voxel = cache.voxel(position[0], position[1], position[2]);
                if voxel.is_air() {
                    continue;
                }
                let index = shape.index(x, y, z);

                if voxel.is_ramp() {
                    let side = BlockSide::TOP;
                    faces[side as usize][index] = Face::new(
                        table.tile(voxel.id(), side),
                        face_ao(cache, position, side),
                        voxel.slope(),
                    );
                    continue;
                }

                for side in BlockSide::all() {
                    let mut neighbour = position;
                    neighbour[side.normal_axis()] += side.step();
                    if cache.occludes(neighbour) {
                        continue;
                    }
                    faces[side as usize][index] =
                        Face::new(table.tile(voxel.id(), side), face_ao(cache, position, side), 0);
                }
            }
        }
    }

    faces
}

/// Corner AO of the face of the voxel at `position` pointing towards `side`.
///
/// Samples the layer the face looks into: for corner `(cu, cv)` the edge
/// neighbours one step along `u` and `v` towards the corner, and the diagonal
/// between them.
pub fn face_ao(cache: &NeighborCache, position: [i32; 3], side: BlockSide) -> [u8; 4] {
    let (u, v) = side.plane_axes();
    let mut layer = position;
    layer[side.normal_axis()] += side.step();

    std::array::from_fn(|corner| {
        let su = if corner & 1 != 0 { 1 } else { -1 };
        let sv = if corner & 2 != 0 { 1 } else { -1 };

        let mut edge0 = layer;
        edge0[u] += su;
        let mut edge1 = layer;
        edge1[v] += sv;
        let mut diagonal = edge0;
        diagonal[v] += sv;

        corner_ao(cache.occludes(edge0), cache.occludes(edge1), cache.occludes(diagonal))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        chunk::ChunkShape,
        vicinity::Vicinity,
        voxel::Voxel,
    };

    fn cache_with(voxels: &[([usize; 3], Voxel)]) -> NeighborCache {
        let shape = ChunkShape::cube(2);
        let mut dense = vec![Voxel::AIR; shape.volume()];
        for ([x, y, z], voxel) in voxels {
            dense[shape.index(*x, *y, *z)] = *voxel;
        }
        NeighborCache::from_vicinity(&Vicinity::isolated(shape, dense))
    }

    #[test]
    fn hidden_faces_are_culled() {
        let cache = cache_with(&[([1, 1, 1], Voxel::solid(1)), ([2, 1, 1], Voxel::solid(1))]);
        let faces = compute_faces(&cache, &BlockTable::default());
        let index = ChunkShape::cube(2).index(1, 1, 1);

        assert!(!faces[BlockSide::RIGHT as usize][index].is_visible());
        assert!(faces[BlockSide::LEFT as usize][index].is_visible());
        assert!(faces[BlockSide::TOP as usize][index].is_visible());
    }

    #[test]
    fn ramps_do_not_hide_neighbours() {
        let cache = cache_with(&[([1, 1, 1], Voxel::solid(1)), ([2, 1, 1], Voxel::new(1, 0b0011))]);
        let faces = compute_faces(&cache, &BlockTable::default());
        let shape = ChunkShape::cube(2);

        assert!(faces[BlockSide::RIGHT as usize][shape.index(1, 1, 1)].is_visible());
        let ramp = shape.index(2, 1, 1);
        assert_eq!(faces[BlockSide::TOP as usize][ramp].slope(), 0b0011);
        for side in [BlockSide::RIGHT, BlockSide::LEFT, BlockSide::BOTTOM, BlockSide::FRONT, BlockSide::BACK] {
            assert!(!faces[side as usize][ramp].is_visible());
        }
    }

    #[test]
    fn ao_counts_occluders_beside_the_face() {
        // occluder diagonally above-right of the voxel
        let cache = cache_with(&[([1, 1, 1], Voxel::solid(1)), ([2, 2, 1], Voxel::solid(1))]);
        // TOP has u = z and v = x, so corners with v = 1 touch x + 1
        assert_eq!(face_ao(&cache, [1, 1, 1], BlockSide::TOP), [0, 0, 1, 1]);

        // two edge occluders saturate the shared corner
        let cache = cache_with(&[
            ([1, 1, 1], Voxel::solid(1)),
            ([2, 2, 1], Voxel::solid(1)),
            ([1, 2, 2], Voxel::solid(1)),
        ]);
        assert_eq!(face_ao(&cache, [1, 1, 1], BlockSide::TOP), [0, 1, 1, 3]);
    }
}
