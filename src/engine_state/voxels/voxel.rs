//! # Voxel Module
//!
//! The packed per-voxel value stored in chunks and returned by voxel oracles.
//!
//! ## Bit Layout
//!
//! | bits   | meaning                                  |
//! |--------|------------------------------------------|
//! | 0..8   | block type id (0 is air)                 |
//! | 8..12  | slope code (raised top corners of a ramp)|
//! | 12..32 | reserved, always zero                    |
//!
//! A slope code of `0` is a full cube. `0b1111` describes a ramp with every
//! corner raised, which is geometrically the same cube, so it is normalized to
//! `0` whenever a voxel is built.

use serde::{Deserialize, Serialize};

/// Number of bits holding the block type id.
pub const ID_BITS: u32 = 8;
/// Mask selecting the block type id.
pub const ID_MASK: u32 = (1 << ID_BITS) - 1;
/// Offset of the slope code.
pub const SLOPE_SHIFT: u32 = ID_BITS;
/// Mask selecting the slope code once shifted down.
pub const SLOPE_MASK: u32 = 0b1111;
/// Slope code of a flat, full cube.
pub const SLOPE_FLAT: u8 = 0;
/// Slope code with all four corners raised.
pub const SLOPE_FULL: u8 = 0b1111;

/// A packed voxel value: block id plus slope code.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Voxel(pub u32);

impl Voxel {
    /// Empty space.
    pub const AIR: Voxel = Voxel(0);

    /// Builds a voxel from a block id and a slope code.
    pub const fn new(id: u8, slope: u8) -> Self {
        let slope = (slope as u32) & SLOPE_MASK;
        let slope = if slope == SLOPE_FULL as u32 { 0 } else { slope };
        Voxel(id as u32 | (slope << SLOPE_SHIFT))
    }

    /// A flat, full cube of the given block id.
    pub const fn solid(id: u8) -> Self {
        Self::new(id, SLOPE_FLAT)
    }

    /// Block type id. `0` is air.
    #[inline]
    pub const fn id(self) -> u8 {
        (self.0 & ID_MASK) as u8
    }

    /// Slope code, `0` for flat cubes.
    #[inline]
    pub const fn slope(self) -> u8 {
        ((self.0 >> SLOPE_SHIFT) & SLOPE_MASK) as u8
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        self.id() == 0
    }

    #[inline]
    pub const fn is_solid(self) -> bool {
        !self.is_air()
    }

    /// True for a solid voxel whose top is shaped by a slope code.
    #[inline]
    pub const fn is_ramp(self) -> bool {
        self.is_solid() && self.slope() != SLOPE_FLAT
    }

    /// Solid and flat. Only occluding voxels hide neighbouring faces or block motion.
    #[inline]
    pub const fn is_occluding(self) -> bool {
        self.is_solid() && self.slope() == SLOPE_FLAT
    }
}

/// A partial voxel update applied by [`Chunk::set`](super::chunk::Chunk::set).
///
/// Missing fields keep the value already stored in the chunk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VoxelEdit {
    /// Replacement block id.
    pub id: Option<u8>,
    /// Replacement (or, with `add_slope`, additional) slope code.
    pub slope: Option<u8>,
    /// OR the given slope into the existing one instead of replacing it.
    pub add_slope: bool,
}

impl VoxelEdit {
    /// Replaces the whole voxel.
    pub fn voxel(voxel: Voxel) -> Self {
        VoxelEdit {
            id: Some(voxel.id()),
            slope: Some(voxel.slope()),
            add_slope: false,
        }
    }

    /// Changes only the block id.
    pub fn id(id: u8) -> Self {
        VoxelEdit {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Changes only the slope code.
    pub fn slope(slope: u8) -> Self {
        VoxelEdit {
            slope: Some(slope),
            ..Default::default()
        }
    }

    /// Raises additional corners on top of the existing slope.
    pub fn add_slope(slope: u8) -> Self {
        VoxelEdit {
            slope: Some(slope),
            add_slope: true,
            ..Default::default()
        }
    }

    /// Resolves the edit against the voxel currently stored.
    ///
    /// Raising the last missing corner of a ramp yields a flat cube rather than
    /// `0b1111`.
    pub fn apply(&self, existing: Voxel) -> Voxel {
        let id = self.id.unwrap_or(existing.id());
        let slope = match (self.slope, self.add_slope) {
            (None, _) => existing.slope(),
            (Some(slope), false) => slope,
            (Some(slope), true) => {
                let combined = (existing.slope() | slope) & SLOPE_MASK as u8;
                if combined == SLOPE_FULL {
                    SLOPE_FLAT
                } else {
                    combined
                }
            }
        };
        Voxel::new(id, slope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_id_and_slope() {
        let voxel = Voxel::new(7, 0b0101);
        assert_eq!(voxel.id(), 7);
        assert_eq!(voxel.slope(), 0b0101);
        assert_eq!(voxel.0, 7 | (0b0101 << 8));
        assert!(voxel.is_ramp());
        assert!(!voxel.is_occluding());
    }

    #[test]
    fn full_slope_is_a_flat_cube() {
        assert_eq!(Voxel::new(3, SLOPE_FULL), Voxel::solid(3));
        assert!(Voxel::new(3, SLOPE_FULL).is_occluding());
    }

    #[test]
    fn air_never_occludes() {
        assert!(Voxel::AIR.is_air());
        assert!(!Voxel::AIR.is_occluding());
        assert!(!Voxel::new(0, 0b0011).is_ramp());
    }

    #[test]
    fn edit_defaults_keep_existing_fields() {
        let existing = Voxel::new(4, 0b0011);
        assert_eq!(VoxelEdit::id(9).apply(existing), Voxel::new(9, 0b0011));
        assert_eq!(VoxelEdit::slope(0b1000).apply(existing), Voxel::new(4, 0b1000));
        assert_eq!(VoxelEdit::default().apply(existing), existing);
    }

    #[test]
    fn adding_the_last_corner_collapses_to_flat() {
        let existing = Voxel::new(2, 0b0111);
        assert_eq!(VoxelEdit::add_slope(0b1000).apply(existing), Voxel::solid(2));
        assert_eq!(
            VoxelEdit::add_slope(0b0100).apply(Voxel::new(2, 0b0011)),
            Voxel::new(2, 0b0111)
        );
    }
}
