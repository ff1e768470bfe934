use glam::{Mat4, Vec3};
use super::*;

fn make_triangle() -> Triangle {
    Triangle::new(
        [Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 1.0), Vec3::new(0.0, 4.0, -1.0)],
        [Vec3::Z; 3],
        3,
    )
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_new_computes_bounds() {
    let tri = make_triangle();
    assert_eq!(tri.min_corner(), Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(tri.max_corner(), Vec3::new(2.0, 4.0, 1.0));
    assert_eq!(tri.centroid(), Vec3::new(1.0, 2.0, 0.0));
    assert_eq!(tri.geom_id, 3);
}

#[test]
fn test_centroid_is_box_center_not_vertex_average() {
    let tri = Triangle::new(
        [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)],
        [Vec3::Y; 3],
        0,
    );
    // Vertex average would be 11/3
    assert_eq!(tri.centroid().x, 5.0);
}

#[test]
fn test_compute_bounds_after_edit() {
    let mut tri = make_triangle();
    tri.points[1] = Vec3::new(8.0, 0.0, 0.0);
    assert_eq!(tri.max_corner().x, 2.0); // stale until recomputed
    assert!(tri.bounds_problem().is_some());

    tri.compute_bounds();
    assert_eq!(tri.max_corner().x, 8.0);
    assert!(tri.bounds_problem().is_none());
}

#[test]
fn test_aabb_matches_corners() {
    let tri = make_triangle();
    let aabb = tri.aabb();
    assert_eq!(aabb.min, tri.min_corner());
    assert_eq!(aabb.max, tri.max_corner());
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn test_compute_world_bounds_keeps_local_points() {
    let mut tri = make_triangle();
    let local_points = tri.points;
    tri.compute_world_bounds(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));

    assert_eq!(tri.points, local_points);
    assert_eq!(tri.min_corner(), Vec3::new(10.0, 0.0, -1.0));
    assert_eq!(tri.max_corner(), Vec3::new(12.0, 4.0, 1.0));
    assert_eq!(tri.centroid(), Vec3::new(11.0, 2.0, 0.0));
}

#[test]
fn test_transform_to_world_moves_points_and_normals() {
    let mut tri = make_triangle();
    let transform = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0))
        * Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2);
    tri.transform_to_world(&transform);

    // Translation does not affect normals (w = 0)
    for n in tri.normals {
        assert!(n.abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-5));
    }
    // Bounds follow the moved points
    assert!(tri.bounds_problem().is_none());
    assert!((tri.min_corner().y - 4.0).abs() < 1e-5);
    assert!((tri.max_corner().y - 6.0).abs() < 1e-5);
}

// ============================================================================
// Validation helper
// ============================================================================

#[test]
fn test_default_triangle_has_consistent_bounds() {
    assert!(Triangle::default().bounds_problem().is_none());
}

#[test]
fn test_bounds_problem_detects_nan() {
    let mut tri = make_triangle();
    tri.points[0] = Vec3::new(f32::NAN, 0.0, 0.0);
    tri.compute_bounds();
    // NaN is swallowed by min/max on some lanes but the vertex check catches it
    assert!(tri.bounds_problem().is_some());
}

#[test]
fn test_world_bounds_pass_validation() {
    let mut tri = make_triangle();
    tri.compute_world_bounds(&Mat4::from_translation(Vec3::new(100.0, 0.0, 0.0)));

    assert!(tri.bounds_problem().is_none());
}

#[test]
fn test_world_bounds_go_stale_after_edit() {
    let mut tri = make_triangle();
    tri.compute_world_bounds(&Mat4::from_translation(Vec3::new(100.0, 0.0, 0.0)));
    tri.points[1] = Vec3::new(50.0, 0.0, 0.0);

    assert!(tri.bounds_problem().is_some());
}

#[test]
fn test_compute_bounds_returns_to_local_space() {
    let mut tri = make_triangle();
    tri.compute_world_bounds(&Mat4::from_translation(Vec3::new(100.0, 0.0, 0.0)));
    tri.compute_bounds();

    assert_eq!(tri.min_corner(), Vec3::new(0.0, 0.0, -1.0));
    assert!(tri.bounds_problem().is_none());
}
