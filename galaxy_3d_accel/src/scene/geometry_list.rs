/// Scene input for the BVH: triangles gathered from indexed meshes.
///
/// Each pushed mesh becomes one `Geometry` whose index is the `geom_id`
/// stamped on its triangles (the GPU resolves materials through it).
/// Triangles are stored in world space, so their cached bounds agree with
/// their vertices.
///
/// Building a BVH reorders the triangle list. Face ranges recorded per
/// geometry describe the push order only and are reported as unavailable
/// once a build has run.

use std::ops::Range;
use glam::{Mat4, Vec3};
use crate::{accel_debug, accel_error, accel_info};
use crate::bvh::{BuildConfig, BuildStats, BvhTree, Triangle};
use crate::error::{Error, Result};

const SOURCE: &str = "galaxy3d::GeometryList";

/// One imported mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Material index used by the shading stage
    pub material_id: i32,
    /// Object-to-world transform applied to the mesh
    pub transform: Mat4,
    /// First triangle of this geometry in push order
    pub face_start: usize,
    /// Number of triangles
    pub face_count: usize,
}

/// Indexed triangle mesh to import
#[derive(Debug, Clone)]
pub struct MeshDesc<'a> {
    /// Vertex positions (object space)
    pub positions: &'a [Vec3],
    /// Vertex normals, same length as `positions` or empty
    pub normals: &'a [Vec3],
    /// Triangle list, three indices per face
    pub indices: &'a [u32],
    /// Material index
    pub material_id: i32,
    /// Object-to-world transform
    pub transform: Mat4,
}

/// Triangles of a whole scene plus the geometries they came from.
#[derive(Debug, Clone)]
pub struct GeometryList {
    geometries: Vec<Geometry>,
    triangles: Vec<Triangle>,
    /// Cleared once a build reorders `triangles`
    push_order: bool,
}

fn mesh_error(message: String) -> Error {
    accel_error!(SOURCE, "{}", message);
    Error::InvalidMesh(message)
}

impl GeometryList {
    pub fn new() -> Self {
        Self {
            geometries: Vec::new(),
            triangles: Vec::new(),
            push_order: true,
        }
    }

    /// Import a mesh and return its geometry id.
    ///
    /// Missing normals fall back to the face normal of each triangle.
    ///
    /// # Errors
    ///
    /// `Error::InvalidMesh` if the index count is not a multiple of 3,
    /// an index is out of range, or normals do not match positions.
    pub fn push_mesh(&mut self, desc: MeshDesc<'_>) -> Result<i32> {
        if desc.indices.len() % 3 != 0 {
            return Err(mesh_error(format!(
                "Index count {} is not a multiple of 3",
                desc.indices.len()
            )));
        }
        if !desc.normals.is_empty() && desc.normals.len() != desc.positions.len() {
            return Err(mesh_error(format!(
                "Normal count {} does not match position count {}",
                desc.normals.len(),
                desc.positions.len()
            )));
        }
        if let Some(&bad) = desc.indices.iter().find(|&&i| i as usize >= desc.positions.len()) {
            return Err(mesh_error(format!(
                "Index {} out of range for {} vertices",
                bad,
                desc.positions.len()
            )));
        }

        let geom_id = self.geometries.len() as i32;
        let face_start = self.triangles.len();

        for face in desc.indices.chunks_exact(3) {
            let [a, b, c] = [face[0] as usize, face[1] as usize, face[2] as usize];
            let points = [desc.positions[a], desc.positions[b], desc.positions[c]];
            let normals = if desc.normals.is_empty() {
                let n = (points[1] - points[0]).cross(points[2] - points[0]).normalize_or_zero();
                [n; 3]
            } else {
                [desc.normals[a], desc.normals[b], desc.normals[c]]
            };

            let mut triangle = Triangle::new(points, normals, geom_id);
            triangle.transform_to_world(&desc.transform);
            self.triangles.push(triangle);
        }

        let face_count = self.triangles.len() - face_start;
        self.geometries.push(Geometry {
            material_id: desc.material_id,
            transform: desc.transform,
            face_start,
            face_count,
        });

        accel_debug!(SOURCE, "Geometry {} imported with {} triangles", geom_id, face_count);

        Ok(geom_id)
    }

    /// Build a BVH over all triangles.
    ///
    /// Reorders the triangle list, after which `face_range` returns `None`.
    /// A build rejected before partitioning (invalid config, failed bounds
    /// validation) leaves the push order, and face ranges, intact.
    pub fn build_bvh(&mut self, config: &BuildConfig) -> Result<(BvhTree, BuildStats)> {
        let mut tree = BvhTree::new();
        let result = tree.build_with_config(&mut self.triangles, config);
        if !matches!(result, Err(Error::InvalidInput(_) | Error::InvalidPrimitive { .. })) {
            self.push_order = false;
        }
        let stats = result?;

        accel_info!(
            SOURCE,
            "Scene BVH built over {} triangles from {} geometries ({} slots)",
            stats.primitive_count,
            self.geometries.len(),
            stats.node_count
        );

        Ok((tree, stats))
    }

    /// All geometries in push order
    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    /// Geometry by id
    pub fn geometry(&self, geom_id: i32) -> Option<&Geometry> {
        usize::try_from(geom_id).ok().and_then(|i| self.geometries.get(i))
    }

    /// Triangles of a geometry, valid only until the list is reordered
    pub fn face_range(&self, geom_id: i32) -> Option<Range<usize>> {
        if !self.push_order {
            return None;
        }
        self.geometry(geom_id)
            .map(|g| g.face_start..g.face_start + g.face_count)
    }

    /// All triangles
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Mutable triangles (the caller may reorder them, which invalidates face ranges)
    pub fn triangles_mut(&mut self) -> &mut [Triangle] {
        self.push_order = false;
        &mut self.triangles
    }

    /// Take the triangle list
    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }

    /// Total triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

impl Default for GeometryList {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "geometry_list_tests.rs"]
mod tests;
