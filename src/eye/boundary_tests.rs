use glam::Vec3;
use std::f32::consts::FRAC_PI_4;

use super::*;

/// Canonical frustum: eye at the origin looking down -Z, up +Y,
/// 90° field of view both ways, near 1, far 10.
fn canonical() -> Vec<Plane> {
    perspective_boundary(
        Vec3::ZERO,
        Vec3::NEG_Z,
        Vec3::Y,
        Vec3::X,
        FRAC_PI_4,
        FRAC_PI_4,
        1.0,
        10.0,
    )
}

// ============================================================================
// Plane
// ============================================================================

#[test]
fn test_signed_distance_sign_convention() {
    let plane = Plane { normal: Vec3::Z, offset: 2.0 };
    assert!(plane.signed_distance(Vec3::new(0.0, 0.0, 1.0)) < 0.0);
    assert_eq!(plane.signed_distance(Vec3::new(0.0, 0.0, 2.0)), 0.0);
    assert!(plane.signed_distance(Vec3::new(0.0, 0.0, 3.0)) > 0.0);
}

// ============================================================================
// Perspective planes
// ============================================================================

#[test]
fn test_perspective_has_six_planes() {
    assert_eq!(canonical().len(), 6);
}

#[test]
fn test_point_on_axis_visible() {
    let planes = canonical();
    assert!(point_visible(&planes, Vec3::new(0.0, 0.0, -5.0)));
}

#[test]
fn test_point_behind_near_plane_invisible() {
    let planes = canonical();
    assert!(!point_visible(&planes, Vec3::new(0.0, 0.0, -0.5)));
    assert!(!point_visible(&planes, Vec3::new(0.0, 0.0, 5.0)));
}

#[test]
fn test_point_beyond_far_plane_invisible() {
    let planes = canonical();
    assert!(!point_visible(&planes, Vec3::new(0.0, 0.0, -20.0)));
}

#[test]
fn test_point_outside_side_plane_invisible() {
    let planes = canonical();
    assert!(!point_visible(&planes, Vec3::new(10.0, 0.0, -5.0)));
    assert!(!point_visible(&planes, Vec3::new(0.0, -10.0, -5.0)));
}

#[test]
fn test_point_on_boundary_counts_visible() {
    // At 90° fov the boundary is the |x| = |z| cone
    let planes = canonical();
    assert!(point_visible(&planes, Vec3::new(5.0, 0.0, -5.0)));
}

// ============================================================================
// Ball classification
// ============================================================================

#[test]
fn test_ball_strictly_inside_is_visible() {
    let planes = canonical();
    assert_eq!(
        ball_visibility(&planes, Vec3::new(0.0, 0.0, -5.0), 1.0),
        Visibility::Visible
    );
}

#[test]
fn test_ball_straddling_plane_is_semi_visible() {
    let planes = canonical();
    assert_eq!(
        ball_visibility(&planes, Vec3::new(5.0, 0.0, -5.0), 1.0),
        Visibility::SemiVisible
    );
}

#[test]
fn test_ball_fully_outside_is_invisible() {
    let planes = canonical();
    assert_eq!(
        ball_visibility(&planes, Vec3::new(20.0, 0.0, -5.0), 1.0),
        Visibility::Invisible
    );
}

#[test]
fn test_zero_radius_ball_reduces_to_point_test() {
    let planes = canonical();
    for point in [
        Vec3::new(0.0, 0.0, -5.0),
        Vec3::new(10.0, 0.0, -5.0),
        Vec3::new(0.0, 0.0, 5.0),
    ] {
        let as_ball = ball_visibility(&planes, point, 0.0) != Visibility::Invisible;
        assert_eq!(as_ball, point_visible(&planes, point));
    }
}

// ============================================================================
// Box classification
// ============================================================================

#[test]
fn test_box_inside_is_visible() {
    let planes = canonical();
    assert_eq!(
        box_visibility(&planes, Vec3::new(-1.0, -1.0, -6.0), Vec3::new(1.0, 1.0, -4.0)),
        Visibility::Visible
    );
}

#[test]
fn test_box_straddling_plane_is_semi_visible() {
    let planes = canonical();
    assert_eq!(
        box_visibility(&planes, Vec3::new(4.0, -1.0, -6.0), Vec3::new(8.0, 1.0, -4.0)),
        Visibility::SemiVisible
    );
}

#[test]
fn test_box_outside_one_plane_is_invisible() {
    // Entirely behind the near plane
    let planes = canonical();
    assert_eq!(
        box_visibility(&planes, Vec3::new(-1.0, -1.0, 2.0), Vec3::new(1.0, 1.0, 4.0)),
        Visibility::Invisible
    );
}

// ============================================================================
// Orthographic planes
// ============================================================================

#[test]
fn test_orthographic_extents() {
    let planes = orthographic_boundary(
        Vec3::ZERO,
        Vec3::NEG_Z,
        Vec3::Y,
        Vec3::X,
        2.0,
        1.0,
        1.0,
        10.0,
        false,
    );
    assert_eq!(planes.len(), 6);
    assert!(point_visible(&planes, Vec3::new(1.5, 0.5, -5.0)));
    assert!(!point_visible(&planes, Vec3::new(2.5, 0.0, -5.0)));
    assert!(!point_visible(&planes, Vec3::new(0.0, -1.5, -5.0)));
}

#[test]
fn test_two_d_has_four_planes_and_no_depth_clipping() {
    let planes = orthographic_boundary(
        Vec3::ZERO,
        Vec3::NEG_Z,
        Vec3::Y,
        Vec3::X,
        2.0,
        1.0,
        1.0,
        10.0,
        true,
    );
    assert_eq!(planes.len(), 4);
    // Depth plays no part in 2D
    assert!(point_visible(&planes, Vec3::new(0.0, 0.0, 100.0)));
}
