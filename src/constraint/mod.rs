//! Constraint layer
//!
//! A Constraint filters proposed translations and rotations before a
//! Frame applies them. Filters are pure functions of the proposed delta
//! and a snapshot of the frame state (ConstraintContext): they never
//! mutate anything and never fail — forbidden motion simply comes back
//! as zero/identity.
//!
//! The set of constraints is closed: one enum with tagged variants
//! selected by configuration data, not an open trait hierarchy.

mod axis_plane;
mod hinge;
mod cone;
mod polygon;
mod distance_field;

pub use axis_plane::{AxisPlaneConstraint, ConstraintSpace, FilterKind};
pub use hinge::Hinge;
pub use cone::Cone;
pub use polygon::PlanarPolygon;
pub use distance_field::DistanceField;

use glam::{Quat, Vec3};

/// Snapshot of the frame state a constraint filter may consult.
///
/// Built by the FrameTree at filter time so the filters themselves stay
/// pure. Orientations are world-space; `rotation` is the frame's local
/// rotation relative to its reference. Missing collaborators (no
/// reference frame, no eye) are represented by identity.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext {
    /// The frame's local rotation (relative to its reference)
    pub rotation: Quat,
    /// The frame's world orientation
    pub orientation: Quat,
    /// World orientation of the frame's reference (identity for roots)
    pub reference_orientation: Quat,
    /// World orientation of the eye's driving frame (identity if none)
    pub eye_orientation: Quat,
}

impl ConstraintContext {
    /// Context for a detached frame: everything identity.
    pub fn identity() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            orientation: Quat::IDENTITY,
            reference_orientation: Quat::IDENTITY,
            eye_orientation: Quat::IDENTITY,
        }
    }
}

/// A translation/rotation filter attached to a Frame.
///
/// `constrain_translation` receives the proposed delta expressed in the
/// frame's reference space; `constrain_rotation` receives the proposed
/// incremental rotation expressed in the frame's local space. Both
/// return the allowed portion of the motion.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Independent FREE/AXIS/PLANE/FORBIDDEN filters per element
    AxisPlane(AxisPlaneConstraint),
    /// Single-axis rotation with angle bounds; translation forbidden
    Hinge(Hinge),
    /// Swing limited to a per-quadrant analytic ellipse; translation forbidden
    Cone(Cone),
    /// Swing limited to a polygon on the z=1 plane; translation forbidden
    PlanarPolygon(PlanarPolygon),
    /// Swing limited by a sampled scalar field; translation forbidden
    DistanceField(DistanceField),
}

impl Constraint {
    /// Filter a proposed translation delta (reference-space).
    pub fn constrain_translation(&self, delta: Vec3, ctx: &ConstraintContext) -> Vec3 {
        match self {
            Constraint::AxisPlane(c) => c.constrain_translation(delta, ctx),
            Constraint::Hinge(c) => c.constrain_translation(delta, ctx),
            Constraint::Cone(c) => c.constrain_translation(delta, ctx),
            Constraint::PlanarPolygon(c) => c.constrain_translation(delta, ctx),
            Constraint::DistanceField(c) => c.constrain_translation(delta, ctx),
        }
    }

    /// Filter a proposed incremental rotation (local-space).
    pub fn constrain_rotation(&self, delta: Quat, ctx: &ConstraintContext) -> Quat {
        match self {
            Constraint::AxisPlane(c) => c.constrain_rotation(delta, ctx),
            Constraint::Hinge(c) => c.constrain_rotation(delta, ctx),
            Constraint::Cone(c) => c.constrain_rotation(delta, ctx),
            Constraint::PlanarPolygon(c) => c.constrain_rotation(delta, ctx),
            Constraint::DistanceField(c) => c.constrain_rotation(delta, ctx),
        }
    }
}

// ===== SHARED VECTOR/QUATERNION HELPERS =====

/// Project `v` onto the axis `axis` (axis need not be unit length).
pub(crate) fn project_on_axis(v: Vec3, axis: Vec3) -> Vec3 {
    let len_sq = axis.length_squared();
    if len_sq < 1e-10 {
        return Vec3::ZERO;
    }
    axis * (v.dot(axis) / len_sq)
}

/// Remove from `v` its component along the plane normal `normal`.
pub(crate) fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - project_on_axis(v, normal)
}

/// Signed twist angle of `q` about the unit axis `axis`, in (-π, π].
pub(crate) fn twist_angle(q: Quat, axis: Vec3) -> f32 {
    let projected = Vec3::new(q.x, q.y, q.z).dot(axis);
    let mut angle = 2.0 * projected.atan2(q.w);
    if angle > std::f32::consts::PI {
        angle -= 2.0 * std::f32::consts::PI;
    } else if angle <= -std::f32::consts::PI {
        angle += 2.0 * std::f32::consts::PI;
    }
    angle
}

/// Decompose `q` into (swing, twist) about the unit axis `axis`, with
/// `q == swing * twist`. The twist is the rotation about `axis`; the
/// swing moves `axis` to `q * axis` without spinning around it.
pub(crate) fn swing_twist(q: Quat, axis: Vec3) -> (Quat, Quat) {
    let projected = project_on_axis(Vec3::new(q.x, q.y, q.z), axis);
    let twist_raw = Quat::from_xyzw(projected.x, projected.y, projected.z, q.w);
    let twist = if twist_raw.length_squared() < 1e-10 {
        Quat::IDENTITY
    } else {
        twist_raw.normalize()
    };
    let swing = (q * twist.inverse()).normalize();
    (swing, twist)
}

/// Constrain the swing of a rest-relative rotation.
///
/// `rel` is the desired rotation expressed relative to the rest
/// orientation. Its swing direction (the image of +Z) is passed through
/// `clamp_direction`; the twist about +Z is preserved unchanged. The
/// clamp is applied twice, matching the layered projection of the
/// original shape constraints; for a well-behaved clamp the second
/// application is the identity on the first's output.
pub(crate) fn constrain_swing<F>(rel: Quat, clamp_direction: F) -> Quat
where
    F: Fn(Vec3) -> Vec3,
{
    let (_, twist) = swing_twist(rel, Vec3::Z);
    let direction = (rel * Vec3::Z).normalize_or_zero();
    if direction == Vec3::ZERO {
        return rel;
    }

    let clamped = clamp_direction(clamp_direction(direction)).normalize_or_zero();
    if clamped == Vec3::ZERO || clamped.abs_diff_eq(direction, 1e-6) {
        return rel;
    }

    let swing = Quat::from_rotation_arc(Vec3::Z, clamped);
    (swing * twist).normalize()
}

/// Align a reference rotation to an up/twist basis.
///
/// Returns the rest rotation whose +Z is `twist` and whose +Y follows
/// `up` (orthonormalized), both expressed in the reference's local
/// space. None if either vector is degenerate or they are parallel.
pub(crate) fn align_rest(reference: Quat, up: Vec3, twist: Vec3) -> Option<Quat> {
    let z = twist.try_normalize()?;
    let x = up.cross(z).try_normalize()?;
    let y = z.cross(x);
    let basis = Quat::from_mat3(&glam::Mat3::from_cols(x, y, z));
    Some((reference * basis).normalize())
}

#[cfg(test)]
#[path = "constraint_tests.rs"]
mod tests;
