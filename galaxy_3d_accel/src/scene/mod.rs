//! Scene input module
//!
//! Gathers triangles from imported meshes into the flat, geometry-tagged
//! list the BVH build consumes.

mod geometry_list;

pub use geometry_list::{Geometry, GeometryList, MeshDesc};
