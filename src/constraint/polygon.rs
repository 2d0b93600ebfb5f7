//! Planar polygon constraint
//!
//! The swing of the frame's +Z axis is limited to a polygonal region on
//! the z=1 plane. Membership uses a bounding-box short-circuit followed
//! by ray casting; directions outside the region are moved to the
//! nearest point on the polygon boundary. Translation is forbidden.

use glam::{Quat, Vec2, Vec3};

use crate::log::Diagnostics;
use super::{align_rest, constrain_swing, ConstraintContext};

const SOURCE: &str = "framegraph::PlanarPolygon";

/// Swing constraint bounded by a polygon on the z=1 plane.
#[derive(Debug, Clone)]
pub struct PlanarPolygon {
    vertices: Vec<Vec2>,
    bbox_min: Vec2,
    bbox_max: Vec2,
    idle_rotation: Quat,
    rest_rotation: Quat,
}

impl PlanarPolygon {
    /// Create a polygon constraint from vertices on the z=1 plane.
    ///
    /// Fewer than 3 vertices is degenerate: the constraint warns and
    /// passes every rotation through unchanged.
    pub fn new(vertices: Vec<Vec2>, diagnostics: &Diagnostics) -> Self {
        let vertices = if vertices.len() < 3 {
            diagnostics.warn_once(
                SOURCE,
                "polygon constraint needs at least 3 vertices, passing rotations through",
            );
            Vec::new()
        } else {
            vertices
        };

        let (bbox_min, bbox_max) = bounding_box(&vertices);
        Self {
            vertices,
            bbox_min,
            bbox_max,
            idle_rotation: Quat::IDENTITY,
            rest_rotation: Quat::IDENTITY,
        }
    }

    // ===== CONFIGURATION =====

    /// Polygon vertices (empty when degenerate)
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
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

    /// Translation through a polygon joint is always fully forbidden.
    pub fn constrain_translation(&self, _delta: Vec3, _ctx: &ConstraintContext) -> Vec3 {
        Vec3::ZERO
    }

    /// Clamp the swing direction into the polygon region.
    pub fn constrain_rotation(&self, delta: Quat, ctx: &ConstraintContext) -> Quat {
        if self.vertices.is_empty() {
            return delta;
        }

        let desired = (ctx.rotation * delta).normalize();
        let rel = (self.rest_rotation.inverse() * desired).normalize();

        let constrained_rel = constrain_swing(rel, |dir| self.clamp_direction(dir));
        let constrained_total = (self.rest_rotation * constrained_rel).normalize();
        (ctx.rotation.inverse() * constrained_total).normalize()
    }

    /// Clamp a unit direction so its z=1 projection lies in the polygon.
    fn clamp_direction(&self, dir: Vec3) -> Vec3 {
        let z = dir.z.max(1e-6);
        let p = Vec2::new(dir.x / z, dir.y / z);

        if dir.z > 0.0 && self.contains(p) {
            return dir;
        }

        let q = self.closest_boundary_point(p);
        Vec3::new(q.x, q.y, 1.0).normalize()
    }

    /// Point-in-polygon with a bounding-box short-circuit.
    fn contains(&self, p: Vec2) -> bool {
        if p.x < self.bbox_min.x
            || p.x > self.bbox_max.x
            || p.y < self.bbox_min.y
            || p.y > self.bbox_max.y
        {
            return false;
        }

        // Ray casting: parity of crossings along +x
        let mut inside = false;
        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Nearest point on the polygon boundary to `p`.
    fn closest_boundary_point(&self, p: Vec2) -> Vec2 {
        let n = self.vertices.len();
        let mut best = self.vertices[0];
        let mut best_dist = f32::INFINITY;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let q = closest_point_on_segment(p, a, b);
            let d = p.distance_squared(q);
            if d < best_dist {
                best_dist = d;
                best = q;
            }
        }
        best
    }
}

fn bounding_box(vertices: &[Vec2]) -> (Vec2, Vec2) {
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for v in vertices {
        min = min.min(*v);
        max = max.max(*v);
    }
    (min, max)
}

fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

#[cfg(test)]
#[path = "polygon_tests.rs"]
mod tests;
