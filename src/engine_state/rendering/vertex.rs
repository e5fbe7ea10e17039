//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format produced by the surface extractor and
//! the buffer layout a renderer binds it with.

use cgmath::{Point3, Vector3};

/// A vertex of an extracted chunk surface.
///
/// Positions are in local chunk coordinates; the renderer adds the chunk
/// origin. Every quad is two independent triangles, so a vertex is never
/// shared between faces and can carry its face's normal and tile directly.
///
/// # Memory Layout
/// - Position: 3x i32 (12 bytes)
/// - Ambient occlusion: u32 (4 bytes), 0 (open) to 3 (fully occluded)
/// - Normal: 3x i32 (12 bytes)
/// - Tile: u32 (4 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Corner position in local chunk coordinates
    pub position: [i32; 3],
    /// Number of occluders around this corner
    pub ao: u32,
    /// Outward normal. Ramp tops carry a tilted, unnormalized normal.
    pub normal: [i32; 3],
    /// Atlas tile of the face
    pub tile: u32,
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - The corner position in local chunk coordinates
    /// * `ao` - Ambient occlusion level of the corner, 0 to 3
    /// * `normal` - The outward normal of the face
    /// * `tile` - The atlas tile of the face
    pub fn new(position: Point3<i32>, ao: u8, normal: Vector3<i32>, tile: u16) -> Self {
        Vertex {
            position: position.into(),
            ao: ao as u32,
            normal: normal.into(),
            tile: tile as u32,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<i32>)
    /// - `location = 1`: ao (u32)
    /// - `location = 2`: normal (vec3<i32>)
    /// - `location = 3`: tile (u32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Sint32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[i32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Uint32,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[u32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Sint32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[u32; 7]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Uint32,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct() {
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(std::mem::offset_of!(Vertex, ao) as u64, layout.attributes[1].offset);
        assert_eq!(std::mem::offset_of!(Vertex, normal) as u64, layout.attributes[2].offset);
        assert_eq!(std::mem::offset_of!(Vertex, tile) as u64, layout.attributes[3].offset);
    }

    #[test]
    fn casts_to_bytes() {
        let vertices = [Vertex::new(Point3::new(1, 2, 3), 2, Vector3::new(0, 1, 0), 7)];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 32);
    }
}
