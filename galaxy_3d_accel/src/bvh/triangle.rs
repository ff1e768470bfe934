/// Triangle primitive, the leaf unit of the BVH.
///
/// Positions and normals are plain data. The bounding box and centroid are
/// a cache derived from the positions: whenever the positions change the
/// cache must be recomputed (`compute_bounds` / `compute_world_bounds`),
/// never patched. The build trusts the cache as-is.

use glam::{Mat4, Vec3};
use super::aabb::AABB;

/// A triangle with cached bounds, owned by one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Triangle {
    /// Vertex positions
    pub points: [Vec3; 3],
    /// Vertex normals
    pub normals: [Vec3; 3],
    /// Owning geometry (material lookup happens through it on the GPU)
    pub geom_id: i32,
    min_corner: Vec3,
    max_corner: Vec3,
    centroid: Vec3,
    /// Transform the cached bounds were taken through, `None` for local space
    bounds_transform: Option<Mat4>,
}

impl Triangle {
    /// Create a triangle and compute its local-space bounds.
    pub fn new(points: [Vec3; 3], normals: [Vec3; 3], geom_id: i32) -> Self {
        let mut triangle = Self {
            points,
            normals,
            geom_id,
            min_corner: Vec3::ZERO,
            max_corner: Vec3::ZERO,
            centroid: Vec3::ZERO,
            bounds_transform: None,
        };
        triangle.compute_bounds();
        triangle
    }

    /// Recompute bounds and centroid from the current positions.
    ///
    /// `centroid` is the center of the box, not the vertex average.
    pub fn compute_bounds(&mut self) {
        let [p1, p2, p3] = self.points;
        self.set_bounds(AABB::from_points(p1, p2, p3));
        self.bounds_transform = None;
    }

    /// Compute bounds of the positions as seen through `transform`,
    /// leaving the stored positions in local space.
    pub fn compute_world_bounds(&mut self, transform: &Mat4) {
        let [p1, p2, p3] = self.points.map(|p| transform.transform_point3(p));
        self.set_bounds(AABB::from_points(p1, p2, p3));
        self.bounds_transform = Some(*transform);
    }

    /// Move positions (w = 1) and normals (w = 0) into world space and
    /// recompute bounds from the moved positions.
    ///
    /// Normals are transformed by the matrix itself, as the renderer's
    /// shading path expects; they are not renormalized.
    pub fn transform_to_world(&mut self, transform: &Mat4) {
        self.points = self.points.map(|p| transform.transform_point3(p));
        self.normals = self.normals.map(|n| transform.transform_vector3(n));
        self.compute_bounds();
    }

    fn set_bounds(&mut self, aabb: AABB) {
        self.min_corner = aabb.min;
        self.max_corner = aabb.max;
        self.centroid = aabb.center();
    }

    /// Minimum corner of the cached box
    pub fn min_corner(&self) -> Vec3 {
        self.min_corner
    }

    /// Maximum corner of the cached box
    pub fn max_corner(&self) -> Vec3 {
        self.max_corner
    }

    /// Center of the cached box (partition key of the build)
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Cached box as an `AABB`
    pub fn aabb(&self) -> AABB {
        AABB::new(self.min_corner, self.max_corner)
    }

    /// Why the cached bounds cannot be trusted, if they cannot.
    ///
    /// Checks finiteness, min <= max, that the centroid is the box center,
    /// and that every position lies inside the box. Positions are taken
    /// through the same transform as the bounds, so world bounds from
    /// `compute_world_bounds` are checked against world positions.
    pub(crate) fn bounds_problem(&self) -> Option<String> {
        let aabb = self.aabb();
        if !aabb.is_valid() {
            return Some(format!(
                "bounds {:?}..{:?} are not finite or inverted",
                self.min_corner, self.max_corner
            ));
        }
        if !self.centroid.abs_diff_eq(aabb.center(), 1e-4 * (1.0 + aabb.diagonal().length())) {
            return Some(format!(
                "centroid {:?} is not the center of its bounds",
                self.centroid
            ));
        }
        let eps = Vec3::splat(1e-4);
        let loose = AABB::new(aabb.min - eps, aabb.max + eps);
        let points = match self.bounds_transform {
            Some(transform) => self.points.map(|p| transform.transform_point3(p)),
            None => self.points,
        };
        if let Some(p) = points.iter().find(|p| !loose.contains(&AABB::new(**p, **p))) {
            return Some(format!("vertex {:?} lies outside cached bounds", p));
        }
        None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "triangle_tests.rs"]
mod tests;
