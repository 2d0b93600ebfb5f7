use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_4;
use std::sync::{Arc, Mutex};

use crate::log::{Diagnostics, LogEntry, Logger};
use super::super::{twist_angle, ConstraintContext};
use super::*;

fn quat_close(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - 1e-5
}

/// Angle of the filtered +Z axis away from the rest +Z
fn swing_angle(filtered: Quat) -> f32 {
    (filtered * Vec3::Z).angle_between(Vec3::Z)
}

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn capture() -> (Diagnostics, Arc<Mutex<Vec<LogEntry>>>) {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let logger = CaptureLogger { entries: entries.clone() };
    (Diagnostics::with_logger(logger), entries)
}

fn symmetric_cone(half_angle: f32) -> Cone {
    Cone::new(half_angle, half_angle, half_angle, half_angle, &Diagnostics::new())
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_out_of_range_half_angle_corrected_with_warning() {
    let (diagnostics, entries) = capture();
    let cone = Cone::new(-0.5, 2.0, 0.4, 0.4, &diagnostics);
    let (up, down, left, right) = cone.half_angles();
    assert!(up > 0.0);
    assert!(down < std::f32::consts::FRAC_PI_2);
    assert_eq!(left, 0.4);
    assert_eq!(right, 0.4);
    assert_eq!(entries.lock().unwrap().len(), 1);
}

#[test]
fn test_degenerate_rest_basis_warns_and_keeps_reference() {
    let (diagnostics, entries) = capture();
    let mut cone = symmetric_cone(FRAC_PI_4);
    let reference = Quat::from_rotation_y(0.3);
    cone.set_rest_rotation(reference, Vec3::Z, Vec3::Z, &diagnostics);
    assert!(quat_close(cone.rest_rotation(), reference));
    assert_eq!(entries.lock().unwrap().len(), 1);
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_translation_always_forbidden() {
    let cone = symmetric_cone(FRAC_PI_4);
    assert_eq!(
        cone.constrain_translation(Vec3::ONE, &ConstraintContext::identity()),
        Vec3::ZERO
    );
}

#[test]
fn test_swing_inside_cone_passes_through() {
    let cone = symmetric_cone(FRAC_PI_4);
    let delta = Quat::from_rotation_x(0.3);
    let filtered = cone.constrain_rotation(delta, &ConstraintContext::identity());
    assert!(quat_close(filtered, delta));
}

#[test]
fn test_swing_beyond_cone_clamped_to_half_angle() {
    let cone = symmetric_cone(FRAC_PI_4);
    let filtered =
        cone.constrain_rotation(Quat::from_rotation_x(1.2), &ConstraintContext::identity());
    assert!((swing_angle(filtered) - FRAC_PI_4).abs() < 1e-3);
}

#[test]
fn test_pure_twist_passes_through() {
    let cone = symmetric_cone(0.2);
    let delta = Quat::from_rotation_z(1.5);
    let filtered = cone.constrain_rotation(delta, &ConstraintContext::identity());
    assert!(quat_close(filtered, delta));
}

#[test]
fn test_twist_preserved_while_swing_clamped() {
    let cone = symmetric_cone(0.3);
    let delta = Quat::from_rotation_x(1.2) * Quat::from_rotation_z(0.7);
    let filtered = cone.constrain_rotation(delta, &ConstraintContext::identity());
    assert!((twist_angle(filtered, Vec3::Z) - 0.7).abs() < 1e-3);
    assert!((swing_angle(filtered) - 0.3).abs() < 1e-3);
}

#[test]
fn test_asymmetric_quadrants() {
    // Rotating about +X by -θ swings +Z toward +Y (up quadrant),
    // by +θ toward -Y (down quadrant).
    let cone = Cone::new(0.2, 1.0, 0.5, 0.5, &Diagnostics::new());

    let down = cone.constrain_rotation(Quat::from_rotation_x(0.5), &ConstraintContext::identity());
    assert!(quat_close(down, Quat::from_rotation_x(0.5)));

    let up = cone.constrain_rotation(Quat::from_rotation_x(-0.5), &ConstraintContext::identity());
    assert!((swing_angle(up) - 0.2).abs() < 1e-3);
}

#[test]
fn test_reversed_direction_lands_on_boundary() {
    // Swing past 90°: the direction has no valid gnomonic projection
    // and must land on the ellipse boundary instead of escaping.
    let cone = symmetric_cone(FRAC_PI_4);
    let filtered =
        cone.constrain_rotation(Quat::from_rotation_x(2.8), &ConstraintContext::identity());
    assert!((swing_angle(filtered) - FRAC_PI_4).abs() < 1e-3);
}

#[test]
fn test_rest_rotation_recentres_the_cone() {
    let diagnostics = Diagnostics::new();
    let mut cone = symmetric_cone(0.3);
    // Recentre the cone around +X
    cone.set_rest_rotation(Quat::IDENTITY, Vec3::Y, Vec3::X, &diagnostics);

    // Identity is a 90° swing from the recentred axis: pulled to 0.3 of +X
    let filtered = cone.constrain_rotation(Quat::IDENTITY, &ConstraintContext::identity());
    let axis = filtered * Vec3::Z;
    assert!((axis.angle_between(Vec3::X) - 0.3).abs() < 1e-2);
}
