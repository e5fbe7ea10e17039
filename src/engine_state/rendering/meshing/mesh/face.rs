//! The packed per-voxel, per-direction face record used during one meshing pass.

/// Bits holding the atlas tile.
const TILE_MASK: u32 = 0xffff;
/// Offset of the four 2-bit corner AO values.
const AO_SHIFT: u32 = 16;
/// Offset of the 4-bit slope code.
const SLOPE_SHIFT: u32 = 24;
/// Set on every emitted face so that a face with tile 0 and no occlusion is
/// still distinguishable from "no face".
const VISIBLE_BIT: u32 = 1 << 28;

/// One candidate face: tile, corner AO, slope code and a visible flag.
///
/// Two faces may merge into one quad exactly when their words are equal.
/// Corner AO is indexed in the face's `(u, v)` frame:
/// `c0 = (0,0)`, `c1 = (1,0)`, `c2 = (0,1)`, `c3 = (1,1)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Face(pub u32);

impl Face {
    /// No face.
    pub const EMPTY: Face = Face(0);

    pub fn new(tile: u16, ao: [u8; 4], slope: u8) -> Self {
        let ao = ao
            .iter()
            .enumerate()
            .fold(0u32, |acc, (corner, level)| acc | (((*level & 0b11) as u32) << (2 * corner)));
        Face(tile as u32 | (ao << AO_SHIFT) | (((slope & 0b1111) as u32) << SLOPE_SHIFT) | VISIBLE_BIT)
    }

    #[inline]
    pub fn is_visible(self) -> bool {
        self.0 & VISIBLE_BIT != 0
    }

    #[inline]
    pub fn tile(self) -> u16 {
        (self.0 & TILE_MASK) as u16
    }

    #[inline]
    pub fn slope(self) -> u8 {
        ((self.0 >> SLOPE_SHIFT) & 0b1111) as u8
    }

    pub fn ao(self) -> [u8; 4] {
        std::array::from_fn(|corner| ((self.0 >> (AO_SHIFT + 2 * corner as u32)) & 0b11) as u8)
    }

    /// Whether the quad should be split along `c1`–`c2` instead of `c0`–`c3`.
    pub fn flip_diagonal(self) -> bool {
        let [c0, c1, c2, c3] = self.ao();
        c0 + c3 < c1 + c2
    }
}

/// AO level of one face corner from its two edge neighbours and the diagonal
/// neighbour, all in the layer in front of the face.
#[inline]
pub fn corner_ao(edge0: bool, edge1: bool, corner: bool) -> u8 {
    if edge0 && edge1 {
        3
    } else {
        edge0 as u8 + edge1 as u8 + corner as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_unpack() {
        let face = Face::new(0xbeef, [3, 0, 1, 2], 0b0110);
        assert!(face.is_visible());
        assert_eq!(face.tile(), 0xbeef);
        assert_eq!(face.ao(), [3, 0, 1, 2]);
        assert_eq!(face.slope(), 0b0110);
        assert!(!Face::EMPTY.is_visible());
        assert_ne!(Face::new(0, [0; 4], 0), Face::EMPTY);
    }

    #[test]
    fn corner_ao_counts_occluders() {
        assert_eq!(corner_ao(false, false, false), 0);
        assert_eq!(corner_ao(false, false, true), 1);
        assert_eq!(corner_ao(true, false, true), 2);
        assert_eq!(corner_ao(true, true, false), 3);
    }

    #[test]
    fn diagonal_flips_towards_darker_corners() {
        assert!(Face::new(0, [0, 1, 1, 0], 0).flip_diagonal());
        assert!(!Face::new(0, [1, 0, 0, 1], 0).flip_diagonal());
        assert!(!Face::new(0, [1, 1, 1, 1], 0).flip_diagonal());
    }
}
