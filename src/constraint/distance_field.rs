//! Distance field constraint
//!
//! The swing of the frame's +Z axis is limited by a sampled 3D scalar
//! field over direction space: directions whose nearest-cell sample is
//! at or below a threshold are allowed, everything else is pushed down
//! the field's numerically estimated gradient. Translation is
//! forbidden.

use glam::{Quat, Vec3};

use crate::log::Diagnostics;
use super::{align_rest, constrain_swing, ConstraintContext};

const SOURCE: &str = "framegraph::DistanceField";

/// Swing constraint bounded by a sampled scalar field.
///
/// The field is a `dims.0 × dims.1 × dims.2` grid over the direction
/// cube `[-1, 1]³`, stored x-fastest. Samples are looked up at the
/// nearest grid cell; gradients use central differences with indices
/// clamped at the grid border.
#[derive(Debug, Clone)]
pub struct DistanceField {
    field: Vec<f32>,
    dims: (usize, usize, usize),
    threshold: f32,
    idle_rotation: Quat,
    rest_rotation: Quat,
}

impl DistanceField {
    /// Create a field constraint.
    ///
    /// `field.len()` must equal the product of `dims` and every
    /// dimension must be at least 2; otherwise the constraint warns and
    /// passes every rotation through unchanged.
    pub fn new(
        field: Vec<f32>,
        dims: (usize, usize, usize),
        threshold: f32,
        diagnostics: &Diagnostics,
    ) -> Self {
        let valid = field.len() == dims.0 * dims.1 * dims.2
            && dims.0 >= 2
            && dims.1 >= 2
            && dims.2 >= 2;
        let field = if valid {
            field
        } else {
            diagnostics.warn_once(
                SOURCE,
                "invalid distance field dimensions, passing rotations through",
            );
            Vec::new()
        };

        Self {
            field,
            dims,
            threshold,
            idle_rotation: Quat::IDENTITY,
            rest_rotation: Quat::IDENTITY,
        }
    }

    // ===== CONFIGURATION =====

    /// Allowed-region threshold: samples `<= threshold` pass
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Pre-limit reference orientation
    pub fn idle_rotation(&self) -> Quat {
        self.idle_rotation
    }

    /// Idle orientation aligned to the supplied up/twist basis
    pub fn rest_rotation(&self) -> Quat {
        self.rest_rotation
    }

    /// Install the rest pose. Same contract as [`Cone::set_rest_rotation`](super::Cone::set_rest_rotation).
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

    /// Translation through a field-limited joint is always fully forbidden.
    pub fn constrain_translation(&self, _delta: Vec3, _ctx: &ConstraintContext) -> Vec3 {
        Vec3::ZERO
    }

    /// Clamp the swing direction into the allowed region of the field.
    pub fn constrain_rotation(&self, delta: Quat, ctx: &ConstraintContext) -> Quat {
        if self.field.is_empty() {
            return delta;
        }

        let desired = (ctx.rotation * delta).normalize();
        let rel = (self.rest_rotation.inverse() * desired).normalize();

        let constrained_rel = constrain_swing(rel, |dir| self.clamp_direction(dir));
        let constrained_total = (self.rest_rotation * constrained_rel).normalize();
        (ctx.rotation.inverse() * constrained_total).normalize()
    }

    /// One gradient-descent projection step toward the allowed region.
    fn clamp_direction(&self, dir: Vec3) -> Vec3 {
        let value = self.sample_direction(dir);
        if value <= self.threshold {
            return dir;
        }

        let gradient = self.gradient(dir);
        let gradient = match gradient.try_normalize() {
            Some(g) => g,
            // Flat cell: nothing to project along, keep best effort
            None => return dir,
        };

        let step = value - self.threshold;
        (dir - gradient * step).normalize_or(dir)
    }

    /// Nearest-cell sample for a unit direction.
    fn sample_direction(&self, dir: Vec3) -> f32 {
        let (i, j, k) = self.cell_of(dir);
        self.sample(i as isize, j as isize, k as isize)
    }

    /// Map a direction in `[-1, 1]³` to its nearest grid cell.
    fn cell_of(&self, dir: Vec3) -> (usize, usize, usize) {
        let index = |c: f32, dim: usize| -> usize {
            let t = (c.clamp(-1.0, 1.0) + 1.0) / 2.0;
            ((t * (dim - 1) as f32).round() as usize).min(dim - 1)
        };
        (
            index(dir.x, self.dims.0),
            index(dir.y, self.dims.1),
            index(dir.z, self.dims.2),
        )
    }

    /// Grid sample with indices clamped to the border.
    fn sample(&self, i: isize, j: isize, k: isize) -> f32 {
        let i = i.clamp(0, self.dims.0 as isize - 1) as usize;
        let j = j.clamp(0, self.dims.1 as isize - 1) as usize;
        let k = k.clamp(0, self.dims.2 as isize - 1) as usize;
        self.field[i + self.dims.0 * (j + self.dims.1 * k)]
    }

    /// Central-difference gradient at the direction's nearest cell.
    fn gradient(&self, dir: Vec3) -> Vec3 {
        let (i, j, k) = self.cell_of(dir);
        let (i, j, k) = (i as isize, j as isize, k as isize);
        Vec3::new(
            (self.sample(i + 1, j, k) - self.sample(i - 1, j, k)) / 2.0,
            (self.sample(i, j + 1, k) - self.sample(i, j - 1, k)) / 2.0,
            (self.sample(i, j, k + 1) - self.sample(i, j, k - 1)) / 2.0,
        )
    }
}

#[cfg(test)]
#[path = "distance_field_tests.rs"]
mod tests;
