//! Geometry module for the turning page.
//!
//! Contains the deformable grid describing the curling sheet and its
//! GPU-ready vertex layout.

mod mesh;

pub use mesh::{MeshVertex, PageMesh};
