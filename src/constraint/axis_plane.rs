//! FREE/AXIS/PLANE/FORBIDDEN constraint family
//!
//! Translation and rotation are filtered independently, each with its
//! own kind and direction. The configured direction lives in one of
//! three coordinate spaces (world, local or eye) and is projected into
//! the space the delta is expressed in before filtering.

use glam::{Quat, Vec3};

use crate::log::Diagnostics;
use super::{project_on_axis, project_on_plane, ConstraintContext};

const SOURCE: &str = "framegraph::AxisPlaneConstraint";

/// Filter kind for one element (translation or rotation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// No filtering, delta passes through
    Free,
    /// Delta is projected onto the configured direction
    Axis,
    /// The component along the configured normal is removed
    /// (translation only)
    Plane,
    /// Delta is fully suppressed
    Forbidden,
}

/// Coordinate space the configured directions are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSpace {
    /// Directions are world coordinates
    World,
    /// Directions are local to the constrained frame
    Local,
    /// Directions are local to the eye's driving frame
    Eye,
}

/// Axis/plane constraint with independent translation and rotation filters.
///
/// Defaults to Free on both elements with +Z directions.
#[derive(Debug, Clone)]
pub struct AxisPlaneConstraint {
    space: ConstraintSpace,
    translation_kind: FilterKind,
    translation_direction: Vec3,
    rotation_kind: FilterKind,
    rotation_direction: Vec3,
}

impl AxisPlaneConstraint {
    /// Create an all-Free constraint in the given space
    pub fn new(space: ConstraintSpace) -> Self {
        Self {
            space,
            translation_kind: FilterKind::Free,
            translation_direction: Vec3::Z,
            rotation_kind: FilterKind::Free,
            rotation_direction: Vec3::Z,
        }
    }

    // ===== CONFIGURATION =====

    /// Coordinate space of the configured directions
    pub fn space(&self) -> ConstraintSpace {
        self.space
    }

    /// Translation filter kind
    pub fn translation_kind(&self) -> FilterKind {
        self.translation_kind
    }

    /// Rotation filter kind
    pub fn rotation_kind(&self) -> FilterKind {
        self.rotation_kind
    }

    /// Configured translation direction (unit length)
    pub fn translation_direction(&self) -> Vec3 {
        self.translation_direction
    }

    /// Configured rotation axis (unit length)
    pub fn rotation_direction(&self) -> Vec3 {
        self.rotation_direction
    }

    /// Set the translation filter kind. All kinds are valid for translation.
    pub fn set_translation_kind(&mut self, kind: FilterKind) {
        self.translation_kind = kind;
    }

    /// Set the rotation filter kind.
    ///
    /// Plane has no meaning for rotations: it is ignored with a warning
    /// and the previous kind is kept.
    pub fn set_rotation_kind(&mut self, kind: FilterKind, diagnostics: &Diagnostics) {
        if kind == FilterKind::Plane {
            diagnostics.warn_once(
                SOURCE,
                "Plane is not a valid rotation constraint kind, ignored",
            );
            return;
        }
        self.rotation_kind = kind;
    }

    /// Set the translation direction.
    ///
    /// The direction is re-normalized on assignment. A zero-length
    /// direction degrades the translation kind to Free with a warning
    /// and leaves the stored direction unchanged.
    pub fn set_translation_direction(&mut self, direction: Vec3, diagnostics: &Diagnostics) {
        match try_normalize(direction) {
            Some(unit) => self.translation_direction = unit,
            None => {
                diagnostics.warn_once(
                    SOURCE,
                    "degenerate translation constraint direction, kind degraded to Free",
                );
                self.translation_kind = FilterKind::Free;
            }
        }
    }

    /// Set the rotation axis.
    ///
    /// Same degenerate-direction handling as the translation direction.
    pub fn set_rotation_direction(&mut self, direction: Vec3, diagnostics: &Diagnostics) {
        match try_normalize(direction) {
            Some(unit) => self.rotation_direction = unit,
            None => {
                diagnostics.warn_once(
                    SOURCE,
                    "degenerate rotation constraint direction, kind degraded to Free",
                );
                self.rotation_kind = FilterKind::Free;
            }
        }
    }

    // ===== FILTERING =====

    /// Filter a reference-space translation delta.
    pub fn constrain_translation(&self, delta: Vec3, ctx: &ConstraintContext) -> Vec3 {
        match self.translation_kind {
            FilterKind::Free => delta,
            FilterKind::Forbidden => Vec3::ZERO,
            FilterKind::Axis => {
                project_on_axis(delta, self.translation_direction_in_reference(ctx))
            }
            FilterKind::Plane => {
                project_on_plane(delta, self.translation_direction_in_reference(ctx))
            }
        }
    }

    /// Filter a local-space incremental rotation.
    pub fn constrain_rotation(&self, delta: Quat, ctx: &ConstraintContext) -> Quat {
        match self.rotation_kind {
            // Plane cannot be assigned to rotations; treat as Free.
            FilterKind::Free | FilterKind::Plane => delta,
            FilterKind::Forbidden => Quat::IDENTITY,
            FilterKind::Axis => {
                let axis = self.rotation_axis_in_local(ctx);
                let projected = project_on_axis(Vec3::new(delta.x, delta.y, delta.z), axis);
                if projected.length_squared() < 1e-10 {
                    return Quat::IDENTITY;
                }
                let angle = 2.0 * delta.w.clamp(-1.0, 1.0).acos();
                Quat::from_axis_angle(projected.normalize(), angle)
            }
        }
    }

    /// Express the configured translation direction in the space the
    /// delta lives in (the frame's reference space).
    fn translation_direction_in_reference(&self, ctx: &ConstraintContext) -> Vec3 {
        match self.space {
            ConstraintSpace::Local => ctx.rotation * self.translation_direction,
            ConstraintSpace::World => {
                ctx.reference_orientation.inverse() * self.translation_direction
            }
            ConstraintSpace::Eye => {
                let world = ctx.eye_orientation * self.translation_direction;
                ctx.reference_orientation.inverse() * world
            }
        }
    }

    /// Express the configured rotation axis in the frame's local space.
    fn rotation_axis_in_local(&self, ctx: &ConstraintContext) -> Vec3 {
        match self.space {
            ConstraintSpace::Local => self.rotation_direction,
            ConstraintSpace::World => ctx.orientation.inverse() * self.rotation_direction,
            ConstraintSpace::Eye => {
                let world = ctx.eye_orientation * self.rotation_direction;
                ctx.orientation.inverse() * world
            }
        }
    }
}

fn try_normalize(v: Vec3) -> Option<Vec3> {
    let len = v.length();
    if len < 1e-6 {
        None
    } else {
        Some(v / len)
    }
}

#[cfg(test)]
#[path = "axis_plane_tests.rs"]
mod tests;
