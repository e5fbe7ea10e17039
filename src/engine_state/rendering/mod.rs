//! # Rendering Module
//!
//! CPU side of chunk rendering: surface extraction, the per-chunk mesh cache
//! and the background tasks that rebuild meshes.
//!
//! ## Key Components
//! - `meshing`: Surface extraction and the `MeshManager` mesh cache
//! - `tasks`: Worker tasks that rebuild chunk meshes
//! - `Vertex`: The GPU vertex format and its `wgpu` buffer layout
//!
//! GPU upload and drawing are left to the embedding application, which reads
//! installed meshes through [`MeshManager`] and binds them with
//! [`Vertex::desc`].

pub mod meshing;
pub mod tasks;
mod vertex;

pub use meshing::MeshManager;
pub use vertex::Vertex;
