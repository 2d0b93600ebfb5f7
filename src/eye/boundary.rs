//! Boundary plane equations and visibility classification
//!
//! The visible volume is bounded by planes stored as outward unit
//! normal + offset pairs: a point is inside when its signed distance to
//! every plane is at most zero. A 3D eye has six planes in the order
//! LEFT, RIGHT, BOTTOM, TOP, NEAR, FAR; a 2D eye has only the first
//! four.

use glam::Vec3;

/// One boundary plane: outward unit normal and offset.
///
/// The plane is the set of points with `normal · p == offset`; the
/// visible side is `normal · p <= offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Outward unit normal
    pub normal: Vec3,
    /// Signed offset along the normal
    pub offset: f32,
}

impl Plane {
    /// Signed distance from `point` to the plane: negative inside the
    /// visible volume, positive outside.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

/// Classification of a volume against the boundary planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Entirely inside the visible volume
    Visible,
    /// Straddles at least one boundary plane
    SemiVisible,
    /// Entirely outside the visible volume
    Invisible,
}

/// Boundary planes of a perspective frustum.
///
/// Side planes pass through the eye position, tilted by the horizontal
/// and vertical half-angles; near and far planes are orthogonal to the
/// view direction.
pub(crate) fn perspective_boundary(
    position: Vec3,
    view_direction: Vec3,
    up: Vec3,
    right: Vec3,
    half_fov: f32,
    horizontal_half_fov: f32,
    z_near: f32,
    z_far: f32,
) -> Vec<Plane> {
    let (sh, ch) = horizontal_half_fov.sin_cos();
    let (sv, cv) = half_fov.sin_cos();

    let left = view_direction * -sh - right * ch;
    let right_n = view_direction * -sh + right * ch;
    let bottom = view_direction * -sv - up * cv;
    let top = view_direction * -sv + up * cv;

    vec![
        Plane { normal: left, offset: left.dot(position) },
        Plane { normal: right_n, offset: right_n.dot(position) },
        Plane { normal: bottom, offset: bottom.dot(position) },
        Plane { normal: top, offset: top.dot(position) },
        near_plane(position, view_direction, z_near),
        far_plane(position, view_direction, z_far),
    ]
}

/// Boundary planes of an orthographic volume.
///
/// Side planes are parallel to the view direction at the half-extents;
/// 2D eyes have no near/far pair.
pub(crate) fn orthographic_boundary(
    position: Vec3,
    view_direction: Vec3,
    up: Vec3,
    right: Vec3,
    half_width: f32,
    half_height: f32,
    z_near: f32,
    z_far: f32,
    two_d: bool,
) -> Vec<Plane> {
    let mut planes = vec![
        Plane { normal: -right, offset: -right.dot(position) + half_width },
        Plane { normal: right, offset: right.dot(position) + half_width },
        Plane { normal: -up, offset: -up.dot(position) + half_height },
        Plane { normal: up, offset: up.dot(position) + half_height },
    ];
    if !two_d {
        planes.push(near_plane(position, view_direction, z_near));
        planes.push(far_plane(position, view_direction, z_far));
    }
    planes
}

fn near_plane(position: Vec3, view_direction: Vec3, z_near: f32) -> Plane {
    Plane {
        normal: -view_direction,
        offset: -view_direction.dot(position) - z_near,
    }
}

fn far_plane(position: Vec3, view_direction: Vec3, z_far: f32) -> Plane {
    Plane {
        normal: view_direction,
        offset: view_direction.dot(position) + z_far,
    }
}

// ===== CLASSIFICATION =====

/// Whether `point` lies inside (or on) every boundary plane.
pub(crate) fn point_visible(planes: &[Plane], point: Vec3) -> bool {
    planes.iter().all(|plane| plane.signed_distance(point) <= 0.0)
}

/// Classify a ball against the boundary planes.
///
/// A zero-radius ball reduces to the point test.
pub(crate) fn ball_visibility(planes: &[Plane], center: Vec3, radius: f32) -> Visibility {
    let mut all_inside = true;
    for plane in planes {
        let distance = plane.signed_distance(center);
        if distance > radius {
            return Visibility::Invisible;
        }
        if distance > -radius {
            all_inside = false;
        }
    }
    if all_inside {
        Visibility::Visible
    } else {
        Visibility::SemiVisible
    }
}

/// Classify an axis-aligned box against the boundary planes.
///
/// Conservative: Invisible only when all 8 corners are outside one
/// plane, Visible only when every corner is inside every plane.
pub(crate) fn box_visibility(planes: &[Plane], min: Vec3, max: Vec3) -> Visibility {
    let mut all_inside = true;
    for plane in planes {
        let mut outside = 0;
        for corner in 0..8 {
            let point = Vec3::new(
                if corner & 1 == 0 { min.x } else { max.x },
                if corner & 2 == 0 { min.y } else { max.y },
                if corner & 4 == 0 { min.z } else { max.z },
            );
            if plane.signed_distance(point) > 0.0 {
                outside += 1;
            }
        }
        if outside == 8 {
            return Visibility::Invisible;
        }
        if outside > 0 {
            all_inside = false;
        }
    }
    if all_inside {
        Visibility::Visible
    } else {
        Visibility::SemiVisible
    }
}

#[cfg(test)]
#[path = "boundary_tests.rs"]
mod tests;
