use glam::{Quat, Vec3};
use std::sync::{Arc, Mutex};

use crate::log::{Diagnostics, LogEntry, Logger};
use super::super::ConstraintContext;
use super::*;

fn quat_close(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - 1e-5
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

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_negative_bounds_corrected_with_warning() {
    let (diagnostics, entries) = capture();
    let hinge = Hinge::new(-0.5, -1.0, &diagnostics);
    assert_eq!(hinge.min(), 0.0);
    assert_eq!(hinge.max(), 0.0);
    assert_eq!(entries.lock().unwrap().len(), 1);
}

#[test]
fn test_degenerate_axis_keeps_previous() {
    let (diagnostics, entries) = capture();
    let mut hinge = Hinge::new(1.0, 1.0, &diagnostics);
    hinge.set_axis(Vec3::X, &diagnostics);
    hinge.set_axis(Vec3::ZERO, &diagnostics);
    assert_eq!(hinge.axis(), Vec3::X);
    assert_eq!(entries.lock().unwrap().len(), 1);
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_translation_always_forbidden() {
    let diagnostics = Diagnostics::new();
    let hinge = Hinge::new(1.0, 1.0, &diagnostics);
    assert_eq!(
        hinge.constrain_translation(Vec3::ONE, &ConstraintContext::identity()),
        Vec3::ZERO
    );
}

#[test]
fn test_rotation_within_bounds_passes_through() {
    let diagnostics = Diagnostics::new();
    let hinge = Hinge::new(1.0, 0.5, &diagnostics);
    let delta = Quat::from_rotation_z(0.3);
    let filtered = hinge.constrain_rotation(delta, &ConstraintContext::identity());
    assert!(quat_close(filtered, delta));
}

#[test]
fn test_rotation_clamped_at_max() {
    let diagnostics = Diagnostics::new();
    let hinge = Hinge::new(1.0, 0.5, &diagnostics);
    let filtered =
        hinge.constrain_rotation(Quat::from_rotation_z(1.4), &ConstraintContext::identity());
    assert!(quat_close(filtered, Quat::from_rotation_z(0.5)));
}

#[test]
fn test_rotation_clamped_at_negative_min() {
    let diagnostics = Diagnostics::new();
    let hinge = Hinge::new(1.0, 0.5, &diagnostics);
    let filtered =
        hinge.constrain_rotation(Quat::from_rotation_z(-2.0), &ConstraintContext::identity());
    assert!(quat_close(filtered, Quat::from_rotation_z(-1.0)));
}

#[test]
fn test_accumulated_angle_measured_from_rest() {
    let diagnostics = Diagnostics::new();
    let hinge = Hinge::new(1.0, 0.5, &diagnostics);

    // Frame already at 0.4 about the axis: only 0.1 of headroom left
    let ctx = ConstraintContext {
        rotation: Quat::from_rotation_z(0.4),
        ..ConstraintContext::identity()
    };
    let filtered = hinge.constrain_rotation(Quat::from_rotation_z(0.3), &ctx);
    assert!(quat_close(filtered, Quat::from_rotation_z(0.1)));
}

#[test]
fn test_swing_component_discarded() {
    let diagnostics = Diagnostics::new();
    let hinge = Hinge::new(1.0, 1.0, &diagnostics);
    let filtered =
        hinge.constrain_rotation(Quat::from_rotation_x(0.3), &ConstraintContext::identity());
    assert!(quat_close(filtered, Quat::IDENTITY));
}

#[test]
fn test_rest_rotation_shifts_reference() {
    let diagnostics = Diagnostics::new();
    let mut hinge = Hinge::new(0.0, 0.5, &diagnostics);
    hinge.set_rest_rotation(Quat::from_rotation_z(1.0));

    // Frame at identity is at -1.0 relative to rest, below -min = 0:
    // the filter pulls it back up to the rest pose.
    let filtered = hinge.constrain_rotation(Quat::IDENTITY, &ConstraintContext::identity());
    assert!(quat_close(filtered, Quat::from_rotation_z(1.0)));
}
