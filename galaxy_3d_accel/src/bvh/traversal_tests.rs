use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use super::*;
use crate::bvh::{BuildConfig, Triangle};

fn unit_triangle(z: f32, geom_id: i32) -> Triangle {
    Triangle::new(
        [Vec3::new(-1.0, -1.0, z), Vec3::new(1.0, -1.0, z), Vec3::new(0.0, 1.0, z)],
        [Vec3::Z; 3],
        geom_id,
    )
}

fn brute_force(triangles: &[Triangle], ray: &Ray, t_min: f32, t_max: f32) -> Option<(f32, i32)> {
    triangles
        .iter()
        .filter_map(|tri| {
            let (t, _, _) = intersect_triangle(ray, tri.points[0], tri.points[1], tri.points[2])?;
            (t >= t_min && t <= t_max).then_some((t, tri.geom_id))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
}

// ============================================================================
// Triangle test
// ============================================================================

#[test]
fn test_intersect_triangle_hit() {
    let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

    let (t, u, v) = intersect_triangle(
        &ray,
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    )
    .unwrap();

    assert!((t - 5.0).abs() < 1e-6);
    assert!(u >= 0.0 && v >= 0.0 && u + v <= 1.0);
    assert!((ray.at(t).z).abs() < 1e-6);
}

#[test]
fn test_intersect_triangle_miss_and_parallel() {
    let tri = unit_triangle(0.0, 0);
    let outside = Ray::new(Vec3::new(5.0, 5.0, -5.0), Vec3::Z);
    let parallel = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::X);

    assert!(intersect_triangle(&outside, tri.points[0], tri.points[1], tri.points[2]).is_none());
    assert!(intersect_triangle(&parallel, tri.points[0], tri.points[1], tri.points[2]).is_none());
}

// ============================================================================
// Tree traversal
// ============================================================================

#[test]
fn test_empty_tree_never_hits() {
    let tree = BvhTree::new();
    let ray = Ray::new(Vec3::ZERO, Vec3::Z);

    assert!(tree.intersect(&ray, 0.0, f32::INFINITY).is_none());
    assert!(intersect_records(&[], &ray, 0.0, f32::INFINITY).is_none());
}

#[test]
fn test_closest_of_stacked_triangles() {
    let mut triangles = vec![unit_triangle(3.0, 0), unit_triangle(1.0, 1), unit_triangle(2.0, 2)];
    let tree = BvhTree::from_primitives(&mut triangles).unwrap();
    let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);

    let hit = tree.intersect(&ray, 0.0, f32::INFINITY).unwrap();

    assert_eq!(hit.geom_id, 1);
    assert!((hit.t - 2.0).abs() < 1e-6);
    assert!(hit.position.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-6));
    assert!(tree.node(hit.node_index).unwrap().has_face);
}

#[test]
fn test_t_range_is_respected() {
    let mut triangles = vec![unit_triangle(1.0, 0), unit_triangle(4.0, 1)];
    let tree = BvhTree::from_primitives(&mut triangles).unwrap();
    let ray = Ray::new(Vec3::ZERO, Vec3::Z);

    assert_eq!(tree.intersect(&ray, 2.0, 10.0).map(|hit| hit.geom_id), Some(1));
    assert!(tree.intersect(&ray, 0.0, 0.5).is_none());
}

#[test]
fn test_zero_normals_fall_back_to_geometric() {
    let mut triangles = vec![Triangle::new(
        [Vec3::ZERO, Vec3::X, Vec3::Y],
        [Vec3::ZERO; 3],
        0,
    )];
    let tree = BvhTree::from_primitives(&mut triangles).unwrap();
    let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::NEG_Z);

    let hit = tree.intersect(&ray, 0.0, f32::INFINITY).unwrap();

    assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-6));
}

#[test]
fn test_ray_down_shared_edge_hits() {
    // Two triangles sharing the edge x = 0; leaf boxes touch at that plane
    let left = Triangle::new(
        [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
        [Vec3::Z; 3],
        0,
    );
    let right = Triangle::new(
        [Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
        [Vec3::Z; 3],
        1,
    );
    let reference = [left, right];
    let mut triangles = reference.to_vec();
    let tree = BvhTree::from_primitives(&mut triangles).unwrap();
    let records = tree.serialize();

    for y in [-0.9, -0.3, 0.0, 0.3, 0.9] {
        let ray = Ray::new(Vec3::new(0.0, y, -5.0), Vec3::Z);

        let expected = brute_force(&reference, &ray, 0.0, f32::INFINITY);
        let hit = tree.intersect(&ray, 0.0, f32::INFINITY);

        assert!(expected.is_some(), "y = {}", y);
        assert_eq!(hit.map(|hit| hit.t), expected.map(|(t, _)| t), "y = {}", y);
        assert_eq!(intersect_records(&records, &ray, 0.0, f32::INFINITY), hit);
    }
}

#[test]
fn test_truncated_tree_still_traverses() {
    let mut triangles: Vec<Triangle> = (0..8)
        .map(|i| {
            let mut tri = unit_triangle(0.0, i);
            tri.transform_to_world(&glam::Mat4::from_translation(Vec3::new(i as f32 * 4.0, 0.0, 0.0)));
            tri
        })
        .collect();
    let mut tree = BvhTree::new();
    tree.build_with_config(&mut triangles, &BuildConfig::default().with_max_depth(2))
        .unwrap();
    let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);

    // No leaf was written, so nothing can be hit
    assert!(tree.intersect(&ray, 0.0, f32::INFINITY).is_none());
}

#[test]
fn test_random_scene_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(0xb74);
    let mut triangles: Vec<Triangle> = (0..300)
        .map(|i| {
            let center = Vec3::new(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
            );
            let mut offset = || Vec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            );
            let points = [center + offset(), center + offset(), center + offset()];
            Triangle::new(points, [Vec3::Y; 3], i)
        })
        .collect();
    let reference = triangles.clone();

    let tree = BvhTree::from_primitives(&mut triangles).unwrap();
    let records = tree.serialize();

    for _ in 0..200 {
        let origin = Vec3::new(
            rng.gen_range(-30.0..30.0),
            rng.gen_range(-30.0..30.0),
            rng.gen_range(-30.0..30.0),
        );
        let target = Vec3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        );
        let ray = Ray::new(origin, target - origin);

        let expected = brute_force(&reference, &ray, 0.0, f32::INFINITY);
        let from_nodes = tree.intersect(&ray, 0.0, f32::INFINITY);
        let from_records = intersect_records(&records, &ray, 0.0, f32::INFINITY);

        match (expected, from_nodes) {
            (None, None) => {}
            (Some((t, _)), Some(hit)) => assert!((hit.t - t).abs() <= 1e-4 * t.max(1.0)),
            (expected, found) => panic!("brute force {:?}, tree {:?}", expected, found),
        }
        assert_eq!(from_records, from_nodes);
    }
}
