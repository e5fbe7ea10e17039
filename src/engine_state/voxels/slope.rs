//! # Slope Module
//!
//! Ramp geometry shared by the surface extractor and the collision sweeper.
//!
//! A ramp's top is described by its four corners in the XZ plane, indexed
//! `corner = x_bit | z_bit << 1`:
//!
//! ```text
//!   z
//!   ^
//!   c2 ---- c3
//!   |        |
//!   c0 ---- c1 --> x
//! ```
//!
//! Bit `c` of the slope code raises corner `c` to the top of the cell. The top
//! surface is split into two triangles along a fixed diagonal; both the mesh
//! and the ramp height used for collision evaluate the same triangle planes, so
//! what is drawn is what bodies stand on.

/// Which pair of corners the top surface is split along.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SplitDiagonal {
    /// Split along `c0`–`c3`.
    Main,
    /// Split along `c1`–`c2`.
    Anti,
}

/// Height offset of each top corner above the cell floor, per slope code.
pub const SLOPE_CORNER_HEIGHTS: [[u8; 4]; 16] = [
    [1, 1, 1, 1], // 0b0000
    [1, 0, 0, 0], // 0b0001
    [0, 1, 0, 0], // 0b0010
    [1, 1, 0, 0], // 0b0011
    [0, 0, 1, 0], // 0b0100
    [1, 0, 1, 0], // 0b0101
    [0, 1, 1, 0], // 0b0110
    [1, 1, 1, 0], // 0b0111
    [0, 0, 0, 1], // 0b1000
    [1, 0, 0, 1], // 0b1001
    [0, 1, 0, 1], // 0b1010
    [1, 1, 0, 1], // 0b1011
    [0, 0, 1, 1], // 0b1100
    [1, 0, 1, 1], // 0b1101
    [0, 1, 1, 1], // 0b1110
    [1, 1, 1, 1], // 0b1111
];

/// Split diagonal of the top surface, per slope code.
pub const SLOPE_DIAGONALS: [SplitDiagonal; 16] = {
    use SplitDiagonal::{Anti, Main};
    [
        Main, Main, Anti, Main, Anti, Main, Anti, Main, //
        Main, Main, Main, Anti, Main, Anti, Main, Main,
    ]
};

/// Horizontal part `(dx, dz)` of the normal at each top corner, per slope code.
///
/// The vertical component is always `1`. Corners shared by both triangles
/// carry the sign of the summed triangle normals.
pub const SLOPE_CORNER_NORMALS: [[[i8; 2]; 4]; 16] = [
    [[0, 0], [0, 0], [0, 0], [0, 0]],       // 0b0000
    [[1, 1], [1, 0], [0, 1], [1, 1]],       // 0b0001
    [[-1, 0], [-1, 1], [-1, 1], [0, 1]],    // 0b0010
    [[0, 1], [0, 1], [0, 1], [0, 1]],       // 0b0011
    [[0, -1], [1, -1], [1, -1], [1, 0]],    // 0b0100
    [[1, 0], [1, 0], [1, 0], [1, 0]],       // 0b0101
    [[-1, -1], [0, 0], [0, 0], [1, 1]],     // 0b0110
    [[1, 1], [0, 1], [1, 0], [1, 1]],       // 0b0111
    [[-1, -1], [0, -1], [-1, 0], [-1, -1]], // 0b1000
    [[0, 0], [1, -1], [-1, 1], [0, 0]],     // 0b1001
    [[-1, 0], [-1, 0], [-1, 0], [-1, 0]],   // 0b1010
    [[0, 1], [-1, 1], [-1, 1], [-1, 0]],    // 0b1011
    [[0, -1], [0, -1], [0, -1], [0, -1]],   // 0b1100
    [[1, 0], [1, -1], [1, -1], [0, -1]],    // 0b1101
    [[-1, -1], [-1, 0], [0, -1], [-1, -1]], // 0b1110
    [[0, 0], [0, 0], [0, 0], [0, 0]],       // 0b1111
];

/// Height of a ramp's top surface above the cell floor.
///
/// `u` and `v` are the position inside the cell along X and Z, in `[0, 1]`.
/// The result is one of the two triangle planes picked by the split diagonal,
/// which works out to a single linear function of `u` or `v` for two adjacent
/// raised corners and a min/max of two such functions otherwise.
pub fn ramp_height(slope: u8, u: f32, v: f32) -> f32 {
    let slope = (slope & 0b1111) as usize;
    let h = SLOPE_CORNER_HEIGHTS[slope].map(f32::from);
    let u = u.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    match SLOPE_DIAGONALS[slope] {
        SplitDiagonal::Main => {
            if v <= u {
                h[0] + (h[1] - h[0]) * u + (h[3] - h[1]) * v
            } else {
                h[0] + (h[2] - h[0]) * v + (h[3] - h[2]) * u
            }
        }
        SplitDiagonal::Anti => {
            if u + v <= 1.0 {
                h[0] + (h[1] - h[0]) * u + (h[2] - h[0]) * v
            } else {
                h[3] + (h[2] - h[3]) * (1.0 - u) + (h[1] - h[3]) * (1.0 - v)
            }
        }
    }
}
