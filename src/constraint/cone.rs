//! Cone constraint (ball-and-socket)
//!
//! The swing of the frame's +Z axis away from the rest pose is limited
//! to a per-quadrant analytic ellipse built from four half-angles
//! (up/down/left/right). Twist about the axis passes through unchanged;
//! translation is fully forbidden.

use glam::{Quat, Vec2, Vec3};

use crate::log::Diagnostics;
use super::{align_rest, constrain_swing, ConstraintContext};

const SOURCE: &str = "framegraph::Cone";

/// Smallest and largest representable half-angle (radians)
const MIN_HALF_ANGLE: f32 = 1e-3;
const MAX_HALF_ANGLE: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

/// Swing constraint bounded by an analytic ellipse.
///
/// Each quadrant of the limit region uses the pair of half-angles on
/// its side, so asymmetric joints (more freedom up than down, say) are
/// expressed directly.
#[derive(Debug, Clone)]
pub struct Cone {
    up: f32,
    down: f32,
    left: f32,
    right: f32,
    idle_rotation: Quat,
    rest_rotation: Quat,
}

impl Cone {
    /// Create a cone with the given half-angles (radians).
    ///
    /// Angles outside `(0, π/2)` are corrected to the nearest valid
    /// value with a warning.
    pub fn new(up: f32, down: f32, left: f32, right: f32, diagnostics: &Diagnostics) -> Self {
        Self {
            up: Self::sanitize_angle(up, diagnostics),
            down: Self::sanitize_angle(down, diagnostics),
            left: Self::sanitize_angle(left, diagnostics),
            right: Self::sanitize_angle(right, diagnostics),
            idle_rotation: Quat::IDENTITY,
            rest_rotation: Quat::IDENTITY,
        }
    }

    fn sanitize_angle(angle: f32, diagnostics: &Diagnostics) -> f32 {
        if !(MIN_HALF_ANGLE..=MAX_HALF_ANGLE).contains(&angle) {
            diagnostics.warn_once(
                SOURCE,
                "cone half-angle outside (0, PI/2), corrected to the nearest valid value",
            );
        }
        angle.clamp(MIN_HALF_ANGLE, MAX_HALF_ANGLE)
    }

    // ===== CONFIGURATION =====

    /// Half-angles as (up, down, left, right), radians
    pub fn half_angles(&self) -> (f32, f32, f32, f32) {
        (self.up, self.down, self.left, self.right)
    }

    /// Pre-limit reference orientation
    pub fn idle_rotation(&self) -> Quat {
        self.idle_rotation
    }

    /// Idle orientation aligned to the supplied up/twist basis
    pub fn rest_rotation(&self) -> Quat {
        self.rest_rotation
    }

    /// Install the rest pose: `reference` is the frame rotation at setup
    /// time (kept as the idle rotation), `up`/`twist` give the basis the
    /// limit region is expressed in. A degenerate basis warns and keeps
    /// the reference unaligned.
    pub fn set_rest_rotation(
        &mut self,
        reference: Quat,
        up: Vec3,
        twist: Vec3,
        diagnostics: &Diagnostics,
    ) {
        self.idle_rotation = reference.normalize();
        match align_rest(self.idle_rotation, up, twist) {
            Some(rest) => self.rest_rotation = rest,
            None => {
                diagnostics.warn_once(SOURCE, "degenerate up/twist basis, rest left unaligned");
                self.rest_rotation = self.idle_rotation;
            }
        }
    }

    // ===== FILTERING =====

    /// Translation through a cone joint is always fully forbidden.
    pub fn constrain_translation(&self, _delta: Vec3, _ctx: &ConstraintContext) -> Vec3 {
        Vec3::ZERO
    }

    /// Clamp the swing direction to the ellipse region.
    pub fn constrain_rotation(&self, delta: Quat, ctx: &ConstraintContext) -> Quat {
        let desired = (ctx.rotation * delta).normalize();
        let rel = (self.rest_rotation.inverse() * desired).normalize();

        let constrained_rel = constrain_swing(rel, |dir| self.clamp_direction(dir));
        let constrained_total = (self.rest_rotation * constrained_rel).normalize();
        (ctx.rotation.inverse() * constrained_total).normalize()
    }

    /// Clamp a unit direction into the elliptic cone around +Z.
    fn clamp_direction(&self, dir: Vec3) -> Vec3 {
        if dir.z > 1e-6 {
            // Gnomonic projection onto the z=1 plane
            let p = Vec2::new(dir.x / dir.z, dir.y / dir.z);
            let (a, b) = self.semi_axes(p);
            let e = (p.x / a).powi(2) + (p.y / b).powi(2);
            if e <= 1.0 {
                return dir;
            }
            let q = p / e.sqrt();
            Vec3::new(q.x, q.y, 1.0).normalize()
        } else {
            // At or beyond 90° from the axis: land on the ellipse
            // boundary along the direction's lateral component.
            let u = Vec2::new(dir.x, dir.y).normalize_or(Vec2::X);
            let (a, b) = self.semi_axes(u);
            let r = a * b / ((b * u.x).powi(2) + (a * u.y).powi(2)).sqrt();
            Vec3::new(u.x * r, u.y * r, 1.0).normalize()
        }
    }

    /// Ellipse semi-axes for the quadrant containing `p` (tangents of
    /// the matching half-angles).
    fn semi_axes(&self, p: Vec2) -> (f32, f32) {
        let a = if p.x >= 0.0 { self.right.tan() } else { self.left.tan() };
        let b = if p.y >= 0.0 { self.up.tan() } else { self.down.tan() };
        (a, b)
    }
}

#[cfg(test)]
#[path = "cone_tests.rs"]
mod tests;
