//! # Core Module
//!
//! Concurrency primitives shared by the world, the mesh scheduler and the
//! worker threads.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking

pub mod mt_resource;

pub use mt_resource::MtResource;
