use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};
use std::sync::{Arc, Mutex};

use crate::frame::FrameTree;
use crate::graph::GraphKind;
use crate::log::{Diagnostics, LogEntry, LogSeverity, Logger};
use super::*;

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Eye at (0, 0, 10) looking down -Z at the origin, scene radius 100,
/// 60° field of view.
fn scenario() -> (FrameTree, Eye) {
    scenario_with(Arc::new(Diagnostics::new()))
}

fn scenario_with(diagnostics: Arc<Diagnostics>) -> (FrameTree, Eye) {
    let mut tree = FrameTree::with_diagnostics(diagnostics.clone());
    let frame = tree.create_frame();
    tree.set_position(frame, Vec3::new(0.0, 0.0, 10.0));

    let mut eye = Eye::new(GraphKind::ThreeD, frame, diagnostics);
    eye.set_scene_radius(100.0);
    eye.set_field_of_view(&mut tree, FRAC_PI_3);
    (tree, eye)
}

// ============================================================================
// Field of view
// ============================================================================

#[test]
fn test_field_of_view_round_trips_through_magnitude() {
    let (tree, eye) = scenario();
    assert!((eye.field_of_view(&tree) - FRAC_PI_3).abs() < 1e-5);
    assert!((eye.magnitude(&tree) - (FRAC_PI_3 / 2.0).tan()).abs() < 1e-5);
}

#[test]
fn test_unit_magnitude_gives_right_angle_fov() {
    let (mut tree, eye) = scenario();
    tree.set_magnitude(eye.frame(), 1.0);
    assert!((eye.field_of_view(&tree) - FRAC_PI_2).abs() < 1e-5);
}

#[test]
fn test_fov_to_fit_scene_at_long_range() {
    let (mut tree, eye) = scenario();
    eye.set_fov_to_fit_scene(&mut tree);
    // distance 10 < sqrt(2)·100: falls back to a right angle
    assert!((eye.field_of_view(&tree) - FRAC_PI_2).abs() < 1e-4);

    tree.set_position(eye.frame(), Vec3::new(0.0, 0.0, 400.0));
    eye.set_fov_to_fit_scene(&mut tree);
    let expected = 2.0 * (100.0_f32 / 400.0).asin();
    assert!((eye.field_of_view(&tree) - expected).abs() < 1e-4);
}

// ============================================================================
// Clipping
// ============================================================================

#[test]
fn test_z_near_floored_for_perspective() {
    let (tree, eye) = scenario();
    // 10 - sqrt(3)·100 is deeply negative: floored at coef·clip·radius
    let floor = 0.005 * 3.0_f32.sqrt() * 100.0;
    assert!((eye.z_near(&tree) - floor).abs() < 1e-4);
}

#[test]
fn test_z_far_brackets_distance() {
    let (tree, eye) = scenario();
    let expected = 10.0 + 3.0_f32.sqrt() * 100.0;
    assert!((eye.z_far(&tree) - expected).abs() < 1e-3);
}

#[test]
fn test_z_near_positive_band_not_floored() {
    let (mut tree, mut eye) = scenario();
    eye.set_scene_radius(1.0);
    tree.set_position(eye.frame(), Vec3::new(0.0, 0.0, 10.0));
    let clip = 3.0_f32.sqrt();
    assert!((eye.z_near(&tree) - (10.0 - clip)).abs() < 1e-4);
    assert!((eye.z_far(&tree) - (10.0 + clip)).abs() < 1e-4);
}

#[test]
fn test_z_near_clamped_to_zero_for_orthographic() {
    let (tree, mut eye) = scenario();
    eye.set_projection_type(ProjectionType::Orthographic);
    assert_eq!(eye.z_near(&tree), 0.0);
}

// ============================================================================
// Axes and aiming
// ============================================================================

#[test]
fn test_default_axes() {
    let (tree, eye) = scenario();
    assert!(close(eye.view_direction(&tree), Vec3::NEG_Z));
    assert!(close(eye.up_vector(&tree), Vec3::Y));
    assert!(close(eye.right_vector(&tree), Vec3::X));
}

#[test]
fn test_look_at_turns_view_direction() {
    let (mut tree, eye) = scenario();
    eye.look_at(&mut tree, Vec3::new(10.0, 0.0, 10.0));
    assert!(close(eye.view_direction(&tree), Vec3::X));
}

#[test]
fn test_look_at_own_position_warns_and_keeps_orientation() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let diagnostics = Arc::new(Diagnostics::with_logger(CaptureLogger {
        entries: entries.clone(),
    }));
    let (mut tree, eye) = scenario_with(diagnostics);

    let position = eye.position(&tree);
    eye.look_at(&mut tree, position);
    assert!(close(eye.view_direction(&tree), Vec3::NEG_Z));
    assert_eq!(entries.lock().unwrap().len(), 1);
}

#[test]
fn test_center_scene_aims_at_scene_center() {
    let (mut tree, mut eye) = scenario();
    eye.set_scene_center(Vec3::new(0.0, 10.0, 10.0));
    eye.center_scene(&mut tree);
    assert!(close(eye.view_direction(&tree), Vec3::Y));
}

// ============================================================================
// Matrices
// ============================================================================

#[test]
fn test_view_maps_eye_position_to_origin() {
    let (tree, mut eye) = scenario();
    let view = eye.view(&tree);
    assert!(close(view.transform_point3(Vec3::new(0.0, 0.0, 10.0)), Vec3::ZERO));
    // World origin ends up 10 in front of the eye
    assert!(close(view.transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.0, -10.0)));
}

#[test]
fn test_view_respects_orientation() {
    let (mut tree, mut eye) = scenario();
    tree.set_orientation(eye.frame(), Quat::from_rotation_y(FRAC_PI_2));
    // Looking down -X now: a point on -X appears in front
    let view = eye.view(&tree);
    let p = view.transform_point3(Vec3::new(-10.0, 0.0, 10.0));
    assert!(close(p, Vec3::new(0.0, 0.0, -10.0)));
}

#[test]
fn test_projection_cache_invalidated_by_frame_motion() {
    let (mut tree, mut eye) = scenario();
    let before = eye.projection(&tree);
    tree.set_magnitude(eye.frame(), 2.0);
    let after = eye.projection(&tree);
    assert_ne!(before, after);
}

#[test]
fn test_projection_cache_invalidated_by_configuration() {
    let (tree, mut eye) = scenario();
    let before = eye.projection(&tree);
    eye.set_scene_radius(5.0);
    let after = eye.projection(&tree);
    assert_ne!(before, after);
}

// ============================================================================
// Boundary and visibility
// ============================================================================

#[test]
fn test_scenario_point_visibility() {
    let (tree, mut eye) = scenario();
    eye.update_boundary_equations(&tree);
    assert_eq!(eye.boundary_equations().len(), 6);
    assert!(eye.is_point_visible(&tree, Vec3::ZERO));
    assert!(!eye.is_point_visible(&tree, Vec3::new(0.0, 0.0, -10000.0)));
}

#[test]
fn test_ball_visibility_through_eye() {
    let (tree, mut eye) = scenario();
    eye.update_boundary_equations(&tree);
    assert_eq!(eye.ball_visibility(&tree, Vec3::ZERO, 1.0), Visibility::Visible);
    assert_eq!(
        eye.ball_visibility(&tree, Vec3::new(0.0, 0.0, -10000.0), 1.0),
        Visibility::Invisible
    );
}

#[test]
fn test_stale_equations_warn_once_but_answer() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let diagnostics = Arc::new(Diagnostics::with_logger(CaptureLogger {
        entries: entries.clone(),
    }));
    let (mut tree, mut eye) = scenario_with(diagnostics);
    eye.update_boundary_equations(&tree);

    // Move the eye without refreshing the equations
    tree.set_position(eye.frame(), Vec3::new(0.0, 0.0, 20.0));
    assert!(eye.is_point_visible(&tree, Vec3::ZERO));
    assert!(eye.is_point_visible(&tree, Vec3::ZERO));

    let warnings: Vec<_> = entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.severity == LogSeverity::Warn)
        .cloned()
        .collect();
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_distance_to_boundary_far_plane() {
    let (tree, mut eye) = scenario();
    eye.update_boundary_equations(&tree);
    // Plane 5 is FAR; the origin sits z_far - 10 inside it
    let d = eye.distance_to_boundary(&tree, 5, Vec3::ZERO);
    let expected = -(eye.z_far(&tree) - 10.0);
    assert!((d - expected).abs() < 1e-3);
}

// ============================================================================
// Configuration validation
// ============================================================================

#[test]
fn test_non_positive_scene_radius_rejected() {
    let (_, mut eye) = scenario();
    eye.set_scene_radius(-5.0);
    assert_eq!(eye.scene_radius(), 100.0);
}

#[test]
fn test_non_positive_clipping_coefficient_rejected() {
    let (_, mut eye) = scenario();
    let before = eye.z_clipping_coefficient();
    eye.set_z_clipping_coefficient(0.0);
    assert_eq!(eye.z_clipping_coefficient(), before);
}

#[test]
fn test_zero_screen_dimensions_rejected() {
    let (_, mut eye) = scenario();
    eye.set_screen_dimensions(0, 600);
    assert_eq!(eye.screen_width(), 800);
    assert_eq!(eye.screen_height(), 600);
}

#[test]
fn test_set_frame_rejects_unreachable() {
    let (mut tree, mut eye) = scenario();
    let original = eye.frame();
    let detached = tree.create_frame();
    tree.prune_branch(detached);

    assert!(!eye.set_frame(&tree, detached));
    assert_eq!(eye.frame(), original);
}

#[test]
fn test_two_d_eye_is_always_orthographic() {
    let diagnostics = Arc::new(Diagnostics::new());
    let mut tree = FrameTree::with_diagnostics(diagnostics.clone());
    let frame = tree.create_frame();
    let mut eye = Eye::new(GraphKind::TwoD, frame, diagnostics);

    assert_eq!(eye.projection_type(), ProjectionType::Orthographic);
    eye.set_projection_type(ProjectionType::Perspective);
    assert_eq!(eye.projection_type(), ProjectionType::Orthographic);
}

#[test]
fn test_two_d_boundary_width_uses_unit_rescaling() {
    let diagnostics = Arc::new(Diagnostics::new());
    let mut tree = FrameTree::with_diagnostics(diagnostics.clone());
    let frame = tree.create_frame();
    let eye = Eye::new(GraphKind::TwoD, frame, diagnostics);

    let (half_width, half_height) = eye.get_boundary_width_height(&tree);
    assert_eq!(half_width, eye.magnitude(&tree) * 800.0 / 2.0);
    assert_eq!(half_height, eye.magnitude(&tree) * 600.0 / 2.0);
}
