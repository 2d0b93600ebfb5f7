//! Hinge constraint
//!
//! Rotation about a single twist axis with angle bounds; translation is
//! fully forbidden. The axis is expressed relative to a rest rotation,
//! so the total accumulated angle is always measured from the rest
//! pose, not from whatever the frame last happened to be.

use glam::{Quat, Vec3};

use crate::log::Diagnostics;
use super::{twist_angle, ConstraintContext};

const SOURCE: &str = "framegraph::Hinge";

/// Single-axis rotation constraint with bounds `[-min, +max]` radians.
#[derive(Debug, Clone)]
pub struct Hinge {
    min: f32,
    max: f32,
    rest_rotation: Quat,
    axis: Vec3,
}

impl Hinge {
    /// Create a hinge about +Z of the rest rotation.
    ///
    /// Bounds are magnitudes: the accumulated angle is clamped to
    /// `[-min, +max]`. Negative bounds are corrected to 0 with a warning.
    pub fn new(min: f32, max: f32, diagnostics: &Diagnostics) -> Self {
        let (min, max) = Self::sanitize_bounds(min, max, diagnostics);
        Self {
            min,
            max,
            rest_rotation: Quat::IDENTITY,
            axis: Vec3::Z,
        }
    }

    // ===== CONFIGURATION =====

    /// Lower bound magnitude (radians)
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound magnitude (radians)
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Rest rotation the accumulated angle is measured from
    pub fn rest_rotation(&self) -> Quat {
        self.rest_rotation
    }

    /// Twist axis, relative to the rest rotation (unit length)
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Replace the angle bounds. Negative values warn and clamp to 0.
    pub fn set_bounds(&mut self, min: f32, max: f32, diagnostics: &Diagnostics) {
        let (min, max) = Self::sanitize_bounds(min, max, diagnostics);
        self.min = min;
        self.max = max;
    }

    /// Set the rest rotation (typically the frame's rotation at setup time).
    pub fn set_rest_rotation(&mut self, rest: Quat) {
        self.rest_rotation = rest.normalize();
    }

    /// Set the twist axis, expressed relative to the rest rotation.
    ///
    /// A zero-length axis is rejected with a warning and the previous
    /// axis is kept.
    pub fn set_axis(&mut self, axis: Vec3, diagnostics: &Diagnostics) {
        let len = axis.length();
        if len < 1e-6 {
            diagnostics.warn_once(SOURCE, "degenerate hinge axis, previous axis kept");
            return;
        }
        self.axis = axis / len;
    }

    fn sanitize_bounds(min: f32, max: f32, diagnostics: &Diagnostics) -> (f32, f32) {
        if min < 0.0 || max < 0.0 {
            diagnostics.warn_once(SOURCE, "negative hinge bound corrected to 0");
        }
        (min.max(0.0), max.max(0.0))
    }

    // ===== FILTERING =====

    /// Translation through a hinge is always fully forbidden.
    pub fn constrain_translation(&self, _delta: Vec3, _ctx: &ConstraintContext) -> Vec3 {
        Vec3::ZERO
    }

    /// Clamp the accumulated twist angle to `[-min, +max]`.
    ///
    /// Decomposes the combined rotation (current ∘ proposed) relative to
    /// the rest pose into its twist about the hinge axis, clamps the
    /// signed total angle, and returns only the incremental rotation
    /// needed to reach the clamped pose. The swing component is
    /// discarded: a hinge has exactly one degree of freedom.
    pub fn constrain_rotation(&self, delta: Quat, ctx: &ConstraintContext) -> Quat {
        let desired = (ctx.rotation * delta).normalize();
        let rel = (self.rest_rotation.inverse() * desired).normalize();

        let total = twist_angle(rel, self.axis);
        let clamped = total.clamp(-self.min, self.max);

        let constrained_total = self.rest_rotation * Quat::from_axis_angle(self.axis, clamped);
        (ctx.rotation.inverse() * constrained_total).normalize()
    }
}

#[cfg(test)]
#[path = "hinge_tests.rs"]
mod tests;
