/// Host reference traversal.
///
/// Walks the implicit tree the way the compute kernel does: an explicit
/// stack of slot indices, children at `2i + 1` / `2i + 2`, slab test on
/// node bounds, Möller–Trumbore on face leaves. Used to check a built
/// tree (or its serialized records) against brute force on the CPU.

use glam::Vec3;
use super::bvh_node::BvhNode;
use super::bvh_tree::BvhTree;
use super::gpu_record::GpuBvhRecord;
use super::aabb::AABB;

/// Below this determinant a ray is treated as parallel to the triangle
const PARALLEL_EPSILON: f32 = 1e-8;

/// A ray with a non-normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Closest intersection found by a traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the hit
    pub t: f32,
    /// Hit point, `ray.at(t)`
    pub position: Vec3,
    /// Slot of the leaf that was hit
    pub node_index: usize,
    /// Owning geometry of the hit triangle
    pub geom_id: i32,
    /// Interpolated vertex normal (geometric normal if degenerate)
    pub normal: Vec3,
}

/// Ray/triangle test, returns `(t, u, v)` with barycentrics of p1 and p2.
pub fn intersect_triangle(ray: &Ray, p0: Vec3, p1: Vec3, p2: Vec3) -> Option<(f32, f32, f32)> {
    let edge1 = p1 - p0;
    let edge2 = p2 - p0;
    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - p0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    Some((t, u, v))
}

fn shading_normal(points: [Vec3; 3], normals: [Vec3; 3], u: f32, v: f32) -> Vec3 {
    let interpolated = normals[0] * (1.0 - u - v) + normals[1] * u + normals[2] * v;
    interpolated
        .try_normalize()
        .or_else(|| (points[1] - points[0]).cross(points[2] - points[0]).try_normalize())
        .unwrap_or(Vec3::ZERO)
}

/// Read access shared by nodes and records during traversal.
trait TraversalSlot {
    fn built(&self) -> bool;
    fn bounds(&self) -> AABB;
    fn has_face(&self) -> bool;
    fn is_leaf(&self) -> bool;
    fn triangle(&self) -> ([Vec3; 3], [Vec3; 3], i32);
}

impl TraversalSlot for BvhNode {
    fn built(&self) -> bool {
        self.is_built()
    }

    fn bounds(&self) -> AABB {
        self.aabb()
    }

    fn has_face(&self) -> bool {
        self.has_face
    }

    fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    fn triangle(&self) -> ([Vec3; 3], [Vec3; 3], i32) {
        (self.face.points, self.face.normals, self.face.geom_id)
    }
}

impl TraversalSlot for GpuBvhRecord {
    fn built(&self) -> bool {
        self.is_built()
    }

    fn bounds(&self) -> AABB {
        AABB::new(Vec3::from_array(self.min_corner), Vec3::from_array(self.max_corner))
    }

    fn has_face(&self) -> bool {
        self.has_face != 0
    }

    fn is_leaf(&self) -> bool {
        self.is_leaf != 0
    }

    fn triangle(&self) -> ([Vec3; 3], [Vec3; 3], i32) {
        let xyz = |v: [f32; 4]| Vec3::new(v[0], v[1], v[2]);
        (
            [Vec3::from_array(self.point1), Vec3::from_array(self.point2), xyz(self.point3)],
            [xyz(self.normal1), xyz(self.normal2), xyz(self.normal3)],
            self.geom_id,
        )
    }
}

fn traverse<S: TraversalSlot>(slots: &[S], ray: &Ray, t_min: f32, t_max: f32) -> Option<Hit> {
    if slots.is_empty() {
        return None;
    }

    let inv_dir = ray.direction.recip();
    let mut closest: Option<Hit> = None;
    let mut stack = vec![0usize];

    while let Some(index) = stack.pop() {
        let Some(slot) = slots.get(index) else {
            continue;
        };
        if !slot.built() {
            continue;
        }

        let limit = closest.map_or(t_max, |hit| hit.t);
        if slot.bounds().hit_distance(ray.origin, inv_dir, t_min, limit).is_none() {
            continue;
        }

        if slot.has_face() {
            let (points, normals, geom_id) = slot.triangle();
            if let Some((t, u, v)) = intersect_triangle(ray, points[0], points[1], points[2]) {
                if t >= t_min && t <= limit {
                    closest = Some(Hit {
                        t,
                        position: ray.at(t),
                        node_index: index,
                        geom_id,
                        normal: shading_normal(points, normals, u, v),
                    });
                }
            }
        } else if !slot.is_leaf() {
            stack.push(BvhNode::right_child_index(index));
            stack.push(BvhNode::left_child_index(index));
        }
    }

    closest
}

impl BvhTree {
    /// Closest hit with `t` in `[t_min, t_max]`.
    pub fn intersect(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<Hit> {
        traverse(self.nodes(), ray, t_min, t_max)
    }
}

/// Closest hit over a serialized record array, as the kernel sees it.
pub fn intersect_records(records: &[GpuBvhRecord], ray: &Ray, t_min: f32, t_max: f32) -> Option<Hit> {
    traverse(records, ray, t_min, t_max)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "traversal_tests.rs"]
mod tests;
