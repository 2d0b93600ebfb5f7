//! Eye state and camera mathematics
//!
//! Field of view is never stored: it is derived from the driving
//! frame's magnitude (`fov = 2·atan(magnitude)`), so zooming is a frame
//! mutation like any other and invalidates caches through the tree
//! clock. Near/far planes are derived from the scene hints on every
//! read.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::frame::{FrameKey, FrameTree};
use crate::graph::GraphKind;
use crate::log::Diagnostics;
use super::boundary::{self, Plane, Visibility};

const SOURCE: &str = "framegraph::Eye";

/// Projection type of the eye
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    /// Classic perspective frustum
    Perspective,
    /// Orthographic volume sized by the rescaling factor
    Orthographic,
}

/// Cache stamp: (tree clock, eye configuration tick)
type Stamp = (u64, u64);

/// The virtual camera.
///
/// Owns no frame: it is driven by one [`FrameKey`] of the tree, so the
/// eye moves, rotates and zooms through regular frame operations.
/// Methods that need the driving frame's pose take the tree explicitly.
pub struct Eye {
    frame: FrameKey,
    kind: GraphKind,
    projection_type: ProjectionType,
    z_near_coefficient: f32,
    z_clipping_coefficient: f32,
    scene_radius: f32,
    scene_center: Vec3,
    anchor: Vec3,
    screen_width: u32,
    screen_height: u32,
    /// Bumped on every configuration change, pairs with the tree clock
    /// to stamp derived caches
    tick: u64,
    projection_cache: Option<(Stamp, Mat4)>,
    view_cache: Option<(Stamp, Mat4)>,
    planes: Vec<Plane>,
    planes_stamp: Option<Stamp>,
    diagnostics: Arc<Diagnostics>,
}

impl Eye {
    /// Create an eye driven by `frame`.
    ///
    /// 3D eyes default to perspective, 2D eyes are always orthographic.
    pub fn new(kind: GraphKind, frame: FrameKey, diagnostics: Arc<Diagnostics>) -> Self {
        let projection_type = match kind {
            GraphKind::TwoD => ProjectionType::Orthographic,
            GraphKind::ThreeD => ProjectionType::Perspective,
        };
        Self {
            frame,
            kind,
            projection_type,
            z_near_coefficient: 0.005,
            z_clipping_coefficient: 3.0_f32.sqrt(),
            scene_radius: 100.0,
            scene_center: Vec3::ZERO,
            anchor: Vec3::ZERO,
            screen_width: 800,
            screen_height: 600,
            tick: 0,
            projection_cache: None,
            view_cache: None,
            planes: Vec::new(),
            planes_stamp: None,
            diagnostics,
        }
    }

    fn touch(&mut self) {
        self.tick += 1;
    }

    // ===== DRIVING FRAME =====

    /// The driving frame
    pub fn frame(&self) -> FrameKey {
        self.frame
    }

    /// Swap the driving frame.
    ///
    /// The new frame must be reachable in the tree; an unreachable key
    /// is rejected with a warning (returns false, eye unchanged).
    pub fn set_frame(&mut self, tree: &FrameTree, frame: FrameKey) -> bool {
        if !tree.is_reachable(frame) {
            self.diagnostics
                .warn_once(SOURCE, "eye frame must be reachable in the tree, ignored");
            return false;
        }
        self.frame = frame;
        self.touch();
        true
    }

    /// World position of the eye
    pub fn position(&self, tree: &FrameTree) -> Vec3 {
        tree.position(self.frame)
    }

    /// World orientation of the eye
    pub fn orientation(&self, tree: &FrameTree) -> Quat {
        tree.orientation(self.frame)
    }

    /// The direction the eye looks along (world-space, unit length)
    pub fn view_direction(&self, tree: &FrameTree) -> Vec3 {
        self.orientation(tree) * Vec3::NEG_Z
    }

    /// The eye's up direction (world-space, unit length)
    pub fn up_vector(&self, tree: &FrameTree) -> Vec3 {
        self.orientation(tree) * Vec3::Y
    }

    /// The eye's right direction (world-space, unit length)
    pub fn right_vector(&self, tree: &FrameTree) -> Vec3 {
        self.orientation(tree) * Vec3::X
    }

    /// Rotate the driving frame so the eye looks at `target`.
    ///
    /// A target at the eye position is ignored with a warning.
    pub fn look_at(&self, tree: &mut FrameTree, target: Vec3) {
        let direction = target - self.position(tree);
        match direction.try_normalize() {
            Some(direction) => {
                let orientation = Quat::from_rotation_arc(Vec3::NEG_Z, direction);
                tree.set_orientation(self.frame, orientation);
            }
            None => {
                self.diagnostics
                    .warn_once(SOURCE, "look_at target coincides with the eye position, ignored");
            }
        }
    }

    /// Look at the scene center.
    pub fn center_scene(&self, tree: &mut FrameTree) {
        self.look_at(tree, self.scene_center);
    }

    // ===== FIELD OF VIEW =====

    /// The driving frame's world magnitude
    pub fn magnitude(&self, tree: &FrameTree) -> f32 {
        tree.magnitude(self.frame)
    }

    /// Vertical field of view (radians), derived from the magnitude.
    pub fn field_of_view(&self, tree: &FrameTree) -> f32 {
        2.0 * self.magnitude(tree).atan()
    }

    /// Set the vertical field of view by adjusting the frame magnitude.
    pub fn set_field_of_view(&self, tree: &mut FrameTree, fov: f32) {
        tree.set_magnitude(self.frame, (fov / 2.0).tan());
    }

    /// Horizontal field of view (radians)
    pub fn horizontal_field_of_view(&self, tree: &FrameTree) -> f32 {
        2.0 * (self.magnitude(tree) * self.aspect_ratio()).atan()
    }

    /// Widen or narrow the field of view so the scene ball just fits at
    /// the current distance. Very close distances fall back to π/2.
    pub fn set_fov_to_fit_scene(&self, tree: &mut FrameTree) {
        let distance = self.distance_to_scene_center(tree);
        let fov = if distance > std::f32::consts::SQRT_2 * self.scene_radius {
            2.0 * (self.scene_radius / distance).asin()
        } else {
            std::f32::consts::FRAC_PI_2
        };
        self.set_field_of_view(tree, fov);
    }

    // ===== PROJECTION CONFIGURATION =====

    /// Projection type
    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    /// Switch the projection type. 2D eyes are always orthographic:
    /// requesting perspective warns and leaves the eye unchanged.
    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        if self.kind == GraphKind::TwoD && projection_type == ProjectionType::Perspective {
            self.diagnostics
                .warn_once(SOURCE, "a 2D eye is always orthographic, ignored");
            return;
        }
        self.projection_type = projection_type;
        self.touch();
    }

    /// Radius of the scene bounding ball
    pub fn scene_radius(&self) -> f32 {
        self.scene_radius
    }

    /// Set the scene ball radius. Non-positive values warn and are ignored.
    pub fn set_scene_radius(&mut self, radius: f32) {
        if radius <= 0.0 {
            self.diagnostics
                .warn_once(SOURCE, "scene radius must be strictly positive, ignored");
            return;
        }
        self.scene_radius = radius;
        self.touch();
    }

    /// Center of the scene bounding ball
    pub fn scene_center(&self) -> Vec3 {
        self.scene_center
    }

    /// Set the scene ball center.
    pub fn set_scene_center(&mut self, center: Vec3) {
        self.scene_center = center;
        self.touch();
    }

    /// The rotation anchor point
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Set the rotation anchor point.
    pub fn set_anchor(&mut self, anchor: Vec3) {
        self.anchor = anchor;
        self.touch();
    }

    /// Near-plane floor coefficient
    pub fn z_near_coefficient(&self) -> f32 {
        self.z_near_coefficient
    }

    /// Set the near-plane floor coefficient.
    pub fn set_z_near_coefficient(&mut self, coefficient: f32) {
        self.z_near_coefficient = coefficient;
        self.touch();
    }

    /// Clipping band half-width, in scene radii
    pub fn z_clipping_coefficient(&self) -> f32 {
        self.z_clipping_coefficient
    }

    /// Set the clipping band half-width. Non-positive values warn and
    /// are ignored.
    pub fn set_z_clipping_coefficient(&mut self, coefficient: f32) {
        if coefficient <= 0.0 {
            self.diagnostics
                .warn_once(SOURCE, "z clipping coefficient must be strictly positive, ignored");
            return;
        }
        self.z_clipping_coefficient = coefficient;
        self.touch();
    }

    /// Screen width in pixels
    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    /// Screen height in pixels
    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    /// Resize the screen. Zero dimensions warn and are ignored.
    pub fn set_screen_dimensions(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            self.diagnostics
                .warn_once(SOURCE, "screen dimensions must be non-zero, ignored");
            return;
        }
        self.screen_width = width;
        self.screen_height = height;
        self.touch();
    }

    /// Screen width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.screen_width as f32 / self.screen_height as f32
    }

    // ===== CLIPPING =====

    /// Distance from the eye to the scene center, along the view axis.
    pub fn distance_to_scene_center(&self, tree: &FrameTree) -> f32 {
        (self.position(tree) - self.scene_center)
            .dot(self.view_direction(tree))
            .abs()
    }

    /// Near clipping distance.
    ///
    /// `distance − zClip·radius`, floored at
    /// `zNearCoef·zClip·radius` for perspective eyes and at 0 for
    /// orthographic ones.
    pub fn z_near(&self, tree: &FrameTree) -> f32 {
        let z = self.distance_to_scene_center(tree)
            - self.z_clipping_coefficient * self.scene_radius;
        let floor = match self.projection_type {
            ProjectionType::Perspective => {
                self.z_near_coefficient * self.z_clipping_coefficient * self.scene_radius
            }
            ProjectionType::Orthographic => 0.0,
        };
        z.max(floor)
    }

    /// Far clipping distance: `distance + zClip·radius`.
    pub fn z_far(&self, tree: &FrameTree) -> f32 {
        self.distance_to_scene_center(tree) + self.z_clipping_coefficient * self.scene_radius
    }

    /// Orthographic half-extents `(half_width, half_height)`.
    ///
    /// Extents scale with the rescaling factor so apparent object size
    /// stays stable as the anchor moves; 2D eyes use a unit factor.
    pub fn get_boundary_width_height(&self, tree: &FrameTree) -> (f32, f32) {
        let factor = self.rescaling_factor(tree) * self.magnitude(tree);
        (
            factor * self.screen_width as f32 / 2.0,
            factor * self.screen_height as f32 / 2.0,
        )
    }

    fn rescaling_factor(&self, tree: &FrameTree) -> f32 {
        match self.kind {
            GraphKind::TwoD => 1.0,
            GraphKind::ThreeD => {
                let to_anchor = (self.position(tree) - self.anchor)
                    .dot(self.view_direction(tree))
                    .abs();
                2.0 * to_anchor / self.screen_height as f32
            }
        }
    }

    // ===== MATRICES =====

    /// The projection matrix, recomputed lazily keyed on the tree clock
    /// and the eye's own configuration tick.
    pub fn projection(&mut self, tree: &FrameTree) -> Mat4 {
        let stamp = (tree.clock(), self.tick);
        if let Some((cached_stamp, matrix)) = self.projection_cache {
            if cached_stamp == stamp {
                return matrix;
            }
        }
        let matrix = self.compute_projection(tree);
        self.projection_cache = Some((stamp, matrix));
        matrix
    }

    /// The view matrix, recomputed lazily like [`projection`](Self::projection).
    pub fn view(&mut self, tree: &FrameTree) -> Mat4 {
        let stamp = (tree.clock(), self.tick);
        if let Some((cached_stamp, matrix)) = self.view_cache {
            if cached_stamp == stamp {
                return matrix;
            }
        }
        let matrix = self.compute_view(tree);
        self.view_cache = Some((stamp, matrix));
        matrix
    }

    fn compute_projection(&self, tree: &FrameTree) -> Mat4 {
        let z_near = self.z_near(tree);
        let z_far = self.z_far(tree);
        match self.projection_type {
            ProjectionType::Perspective => Mat4::perspective_rh_gl(
                self.field_of_view(tree),
                self.aspect_ratio(),
                z_near,
                z_far,
            ),
            ProjectionType::Orthographic => {
                let (half_width, half_height) = self.get_boundary_width_height(tree);
                Mat4::orthographic_rh_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    z_near,
                    z_far,
                )
            }
        }
    }

    fn compute_view(&self, tree: &FrameTree) -> Mat4 {
        let inverse = self.orientation(tree).inverse();
        let translation = inverse * -self.position(tree);
        Mat4::from_rotation_translation(inverse, translation)
    }

    // ===== BOUNDARY =====

    /// Recompute the boundary plane equations from the current pose.
    pub fn update_boundary_equations(&mut self, tree: &FrameTree) {
        let position = self.position(tree);
        let view_direction = self.view_direction(tree);
        let up = self.up_vector(tree);
        let right = self.right_vector(tree);
        let z_near = self.z_near(tree);
        let z_far = self.z_far(tree);

        self.planes = match self.projection_type {
            ProjectionType::Perspective => boundary::perspective_boundary(
                position,
                view_direction,
                up,
                right,
                self.field_of_view(tree) / 2.0,
                self.horizontal_field_of_view(tree) / 2.0,
                z_near,
                z_far,
            ),
            ProjectionType::Orthographic => {
                let (half_width, half_height) = self.get_boundary_width_height(tree);
                boundary::orthographic_boundary(
                    position,
                    view_direction,
                    up,
                    right,
                    half_width,
                    half_height,
                    z_near,
                    z_far,
                    self.kind == GraphKind::TwoD,
                )
            }
        };
        self.planes_stamp = Some((tree.clock(), self.tick));
    }

    /// The current boundary plane equations, in the order LEFT, RIGHT,
    /// BOTTOM, TOP (NEAR, FAR in 3D). Empty until the first
    /// [`update_boundary_equations`](Self::update_boundary_equations).
    pub fn boundary_equations(&self) -> &[Plane] {
        &self.planes
    }

    /// Best-effort staleness check before answering a visibility query.
    fn check_boundary_fresh(&self, tree: &FrameTree) {
        if self.planes_stamp != Some((tree.clock(), self.tick)) {
            self.diagnostics.warn_once(
                SOURCE,
                "visibility query on stale boundary equations, answering best-effort",
            );
        }
    }

    /// Whether `point` is inside the visible volume.
    pub fn is_point_visible(&self, tree: &FrameTree, point: Vec3) -> bool {
        self.check_boundary_fresh(tree);
        boundary::point_visible(&self.planes, point)
    }

    /// Classify a ball against the visible volume.
    pub fn ball_visibility(&self, tree: &FrameTree, center: Vec3, radius: f32) -> Visibility {
        self.check_boundary_fresh(tree);
        boundary::ball_visibility(&self.planes, center, radius)
    }

    /// Classify an axis-aligned box against the visible volume.
    pub fn box_visibility(&self, tree: &FrameTree, min: Vec3, max: Vec3) -> Visibility {
        self.check_boundary_fresh(tree);
        boundary::box_visibility(&self.planes, min, max)
    }

    /// Signed distance from `point` to boundary plane `index` (plane
    /// order as in [`boundary_equations`](Self::boundary_equations)).
    /// An out-of-range index is a programming error and panics.
    pub fn distance_to_boundary(&self, tree: &FrameTree, index: usize, point: Vec3) -> f32 {
        self.check_boundary_fresh(tree);
        self.planes[index].signed_distance(point)
    }
}

#[cfg(test)]
#[path = "eye_tests.rs"]
mod tests;
