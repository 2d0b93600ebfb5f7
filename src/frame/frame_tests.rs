use glam::{Mat4, Quat, Vec3};
use super::*;

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_new_frame_is_identity() {
    let frame = Frame::new();
    assert_eq!(frame.translation(), Vec3::ZERO);
    assert_eq!(frame.rotation(), Quat::IDENTITY);
    assert_eq!(frame.scaling(), 1.0);
    assert!(frame.reference().is_none());
    assert!(frame.children().is_empty());
    assert!(frame.constraint().is_none());
}

// ============================================================================
// Single-level conversion
// ============================================================================

#[test]
fn test_local_reference_roundtrip() {
    let mut frame = Frame::new();
    frame.set_translation_raw(Vec3::new(1.0, 2.0, 3.0));
    frame.set_rotation_raw(Quat::from_rotation_y(0.7));
    frame.set_scaling_raw(2.5);

    let p = Vec3::new(-4.0, 0.5, 9.0);
    let local = frame.local_coordinates_of(p);
    assert!(close(frame.reference_coordinates_of(local), p));
}

#[test]
fn test_transform_ignores_translation() {
    let mut frame = Frame::new();
    frame.set_translation_raw(Vec3::new(100.0, -50.0, 7.0));
    frame.set_rotation_raw(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));

    let v = Vec3::X;
    // Rotating +X by 90° about Z gives +Y, translation plays no part
    assert!(close(frame.reference_transform_of(v), Vec3::Y));
    assert!(close(frame.local_transform_of(Vec3::Y), Vec3::X));
}

#[test]
fn test_transform_applies_scaling() {
    let mut frame = Frame::new();
    frame.set_scaling_raw(3.0);

    assert!(close(frame.reference_transform_of(Vec3::X), Vec3::new(3.0, 0.0, 0.0)));
    assert!(close(frame.local_transform_of(Vec3::new(3.0, 0.0, 0.0)), Vec3::X));
}

// ============================================================================
// Matrix
// ============================================================================

#[test]
fn test_matrix_matches_conversion() {
    let mut frame = Frame::new();
    frame.set_translation_raw(Vec3::new(1.0, -2.0, 0.5));
    frame.set_rotation_raw(Quat::from_euler(glam::EulerRot::XYZ, 0.3, -0.8, 1.1));
    frame.set_scaling_raw(0.7);

    let p = Vec3::new(2.0, 3.0, -1.0);
    let by_matrix = frame.matrix().transform_point3(p);
    let by_conversion = frame.reference_coordinates_of(p);
    assert!(close(by_matrix, by_conversion));
}

#[test]
fn test_identity_matrix() {
    assert_eq!(Frame::new().matrix(), Mat4::IDENTITY);
}

// ============================================================================
// Value copy
// ============================================================================

#[test]
fn test_value_copy_drops_children_keeps_reference() {
    let mut frame = Frame::new();
    frame.set_translation_raw(Vec3::ONE);
    frame.set_scaling_raw(2.0);
    let parent = FrameKey::default();
    frame.set_reference_raw(Some(parent));
    frame.children_mut().push(FrameKey::default());

    let copy = frame.value_copy();
    assert_eq!(copy.translation(), Vec3::ONE);
    assert_eq!(copy.scaling(), 2.0);
    assert_eq!(copy.reference(), Some(parent));
    assert!(copy.children().is_empty());
}
