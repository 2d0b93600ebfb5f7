//! Graph — the scene host facade
//!
//! Owns the frame tree, the eye, the matrix handler and the
//! diagnostics sink, and keeps them consistent: binding refreshes the
//! matrix caches, traversal composes frame transforms through the
//! bounded stacks, and prune/append keep the input registry in sync.

use std::sync::Arc;

use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3};

use crate::error::{Error, Result};
use crate::eye::{Eye, Visibility};
use crate::frame::{FrameKey, FrameTree};
use crate::input::InputRegistry;
use crate::log::{Diagnostics, Logger};
use crate::matrix_handler::MatrixHandler;

const SOURCE: &str = "framegraph::Graph";

/// Dimensionality of the scene.
///
/// 2D graphs are orthographic with a unit rescaling factor and carry
/// four boundary planes instead of six.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    TwoD,
    ThreeD,
}

bitflags! {
    /// Derived caches the graph maintains automatically at [`Graph::bind`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CacheFlags: u32 {
        /// Precompute the projection×view product at bind; without it
        /// the product is recomputed on every screen↔world query
        const PROJECTION_VIEW = 1 << 0;
        /// Also cache the product's inverse for unprojection
        const PROJECTION_VIEW_INVERSE = 1 << 1;
        /// Refresh the boundary equations before visibility queries
        const BOUNDARY_EQUATIONS = 1 << 2;
    }
}

/// The scene graph: root frames, one eye, one matrix handler.
pub struct Graph {
    tree: FrameTree,
    eye: Eye,
    matrix_handler: MatrixHandler,
    kind: GraphKind,
    cache_flags: CacheFlags,
    input_registry: Option<Box<dyn InputRegistry>>,
    diagnostics: Arc<Diagnostics>,
}

impl Graph {
    /// Create a graph with the default console logger.
    pub fn new(kind: GraphKind, width: u32, height: u32) -> Self {
        Self::with_diagnostics(kind, width, height, Arc::new(Diagnostics::new()))
    }

    /// Create a graph logging through a custom [`Logger`].
    pub fn with_logger<L: Logger + 'static>(
        kind: GraphKind,
        width: u32,
        height: u32,
        logger: L,
    ) -> Self {
        Self::with_diagnostics(kind, width, height, Arc::new(Diagnostics::with_logger(logger)))
    }

    fn with_diagnostics(
        kind: GraphKind,
        width: u32,
        height: u32,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        let mut tree = FrameTree::with_diagnostics(diagnostics.clone());
        let eye_frame = tree.create_frame();
        let mut eye = Eye::new(kind, eye_frame, diagnostics.clone());
        eye.set_screen_dimensions(width, height);
        if kind == GraphKind::ThreeD {
            // Default 60° vertical field of view
            eye.set_field_of_view(&mut tree, std::f32::consts::FRAC_PI_3);
        }

        Self {
            tree,
            eye,
            matrix_handler: MatrixHandler::new(),
            kind,
            cache_flags: CacheFlags::PROJECTION_VIEW | CacheFlags::BOUNDARY_EQUATIONS,
            input_registry: None,
            diagnostics,
        }
    }

    // ===== ACCESS =====

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn tree(&self) -> &FrameTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FrameTree {
        &mut self.tree
    }

    pub fn eye(&self) -> &Eye {
        &self.eye
    }

    pub fn eye_mut(&mut self) -> &mut Eye {
        &mut self.eye
    }

    pub fn matrix_handler(&self) -> &MatrixHandler {
        &self.matrix_handler
    }

    pub fn matrix_handler_mut(&mut self) -> &mut MatrixHandler {
        &mut self.matrix_handler
    }

    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    pub fn cache_flags(&self) -> CacheFlags {
        self.cache_flags
    }

    /// Select which derived caches [`bind`](Self::bind) maintains.
    pub fn set_cache_flags(&mut self, flags: CacheFlags) {
        self.cache_flags = flags;
        self.matrix_handler
            .set_cache_projection_view(flags.contains(CacheFlags::PROJECTION_VIEW));
        self.matrix_handler
            .set_cache_inverse(flags.contains(CacheFlags::PROJECTION_VIEW_INVERSE));
    }

    /// Install (or remove) the input-registration collaborator.
    pub fn set_input_registry(&mut self, registry: Option<Box<dyn InputRegistry>>) {
        self.input_registry = registry;
    }

    /// Resize the screen, forwarded to the eye.
    pub fn set_screen_dimensions(&mut self, width: u32, height: u32) {
        self.eye.set_screen_dimensions(width, height);
    }

    // ===== FRAME LIFECYCLE =====

    /// Create a root frame and register it with the input collaborator.
    pub fn create_frame(&mut self) -> FrameKey {
        let key = self.tree.create_frame();
        if let Some(registry) = self.input_registry.as_mut() {
            registry.add_grabber(key);
        }
        key
    }

    /// Create a child frame and register it with the input collaborator.
    pub fn create_child(&mut self, parent: FrameKey) -> FrameKey {
        let key = self.tree.create_child(parent);
        if let Some(registry) = self.input_registry.as_mut() {
            registry.add_grabber(key);
        }
        key
    }

    /// Destroy a frame and its descendants, deregistering each.
    ///
    /// Destroying the eye's driving frame is rejected with a warning.
    pub fn remove(&mut self, key: FrameKey) -> Vec<FrameKey> {
        if self.tree.is_ancestor_of(key, self.eye.frame()) || key == self.eye.frame() {
            self.diagnostics
                .warn_once(SOURCE, "cannot destroy the eye's driving frame, ignored");
            return Vec::new();
        }
        let removed = self.tree.remove(key);
        if let Some(registry) = self.input_registry.as_mut() {
            for &k in &removed {
                registry.remove_grabber(k);
            }
        }
        removed
    }

    /// Reparent a frame, forwarded to the tree.
    pub fn set_reference(&mut self, key: FrameKey, reference: Option<FrameKey>) -> bool {
        self.tree.set_reference(key, reference)
    }

    /// Detach a branch from the reachable tree, deregistering each
    /// collected frame from the input collaborator.
    pub fn prune_branch(&mut self, key: FrameKey) -> Vec<FrameKey> {
        let branch = self.tree.prune_branch(key);
        if let Some(registry) = self.input_registry.as_mut() {
            for &k in &branch {
                registry.remove_grabber(k);
            }
        }
        branch
    }

    /// Reattach a previously pruned branch, re-registering the frames
    /// that survived.
    pub fn append_branch(&mut self, branch: &[FrameKey]) {
        self.tree.append_branch(branch);
        if let Some(registry) = self.input_registry.as_mut() {
            for &k in branch {
                if self.tree.contains(k) {
                    registry.add_grabber(k);
                }
            }
        }
    }

    /// Translate a frame through its constraint, with the eye
    /// orientation available to eye-space constraints.
    pub fn translate(&mut self, key: FrameKey, delta: Vec3) {
        let eye_orientation = self.eye.orientation(&self.tree);
        self.tree.translate_filtered(key, delta, eye_orientation);
    }

    /// Rotate a frame through its constraint, with the eye orientation
    /// available to eye-space constraints.
    pub fn rotate(&mut self, key: FrameKey, delta: Quat) {
        let eye_orientation = self.eye.orientation(&self.tree);
        self.tree.rotate_filtered(key, delta, eye_orientation);
    }

    // ===== BINDING AND TRAVERSAL =====

    /// Bind the pass: refresh the eye matrices, hand them to the matrix
    /// handler, and update whichever caches the flags select.
    pub fn bind(&mut self) {
        let projection = self.eye.projection(&self.tree);
        let view = self.eye.view(&self.tree);
        self.matrix_handler.bind(
            projection,
            view,
            self.eye.screen_width(),
            self.eye.screen_height(),
        );
        if self.cache_flags.contains(CacheFlags::BOUNDARY_EQUATIONS) {
            self.eye.update_boundary_equations(&self.tree);
        }
    }

    /// Pre-order depth-first traversal over the reachable tree.
    ///
    /// For every frame: push the modelview, compose the frame's local
    /// transform, invoke `visit` with the frame key and the composed
    /// modelview, recurse into children, pop. Mutating the tree from
    /// inside `visit` is unsupported.
    pub fn traverse<F: FnMut(FrameKey, Mat4)>(&mut self, mut visit: F) {
        let roots: Vec<FrameKey> = self.tree.roots().to_vec();
        for root in roots {
            Self::visit_branch(&self.tree, &mut self.matrix_handler, root, &mut visit);
        }
    }

    fn visit_branch<F: FnMut(FrameKey, Mat4)>(
        tree: &FrameTree,
        handler: &mut MatrixHandler,
        key: FrameKey,
        visit: &mut F,
    ) {
        handler.push_modelview();
        handler.apply_modelview(tree.matrix(key));
        visit(key, handler.modelview());
        let children: Vec<FrameKey> = tree
            .frame(key)
            .map(|f| f.children().to_vec())
            .unwrap_or_default();
        for child in children {
            Self::visit_branch(tree, handler, child, visit);
        }
        handler.pop_modelview();
    }

    // ===== SCREEN <-> WORLD =====

    /// Project a point to screen coordinates `(x_px, y_px, depth)`.
    ///
    /// The point is world-space, or local to `frame` when given.
    /// Requires a prior [`bind`](Self::bind).
    pub fn projected_coordinates_of(
        &self,
        point: Vec3,
        frame: Option<FrameKey>,
    ) -> Result<Vec3> {
        let world = match frame {
            Some(key) => {
                if !self.tree.contains(key) {
                    return Err(Error::UnknownFrame(format!("{key:?}")));
                }
                self.tree.inverse_coordinates_of(key, point)
            }
            None => point,
        };
        self.matrix_handler.project(world)
    }

    /// Unproject screen coordinates back to a point, world-space or
    /// local to `frame` when given. Requires a prior [`bind`](Self::bind).
    pub fn unprojected_coordinates_of(
        &self,
        screen: Vec3,
        frame: Option<FrameKey>,
    ) -> Result<Vec3> {
        let world = self.matrix_handler.unproject(screen)?;
        Ok(match frame {
            Some(key) => {
                if !self.tree.contains(key) {
                    return Err(Error::UnknownFrame(format!("{key:?}")));
                }
                self.tree.coordinates_of(key, world)
            }
            None => world,
        })
    }

    /// World-space convenience wrapper over
    /// [`projected_coordinates_of`](Self::projected_coordinates_of).
    pub fn world_to_screen(&self, point: Vec3) -> Result<Vec3> {
        self.projected_coordinates_of(point, None)
    }

    /// World-space convenience wrapper over
    /// [`unprojected_coordinates_of`](Self::unprojected_coordinates_of).
    pub fn screen_to_world(&self, screen: Vec3) -> Result<Vec3> {
        self.unprojected_coordinates_of(screen, None)
    }

    // ===== VISIBILITY =====

    fn refresh_boundary(&mut self) {
        if self.cache_flags.contains(CacheFlags::BOUNDARY_EQUATIONS) {
            self.eye.update_boundary_equations(&self.tree);
        }
    }

    /// Whether a world point is inside the eye's visible volume.
    pub fn is_point_visible(&mut self, point: Vec3) -> bool {
        self.refresh_boundary();
        self.eye.is_point_visible(&self.tree, point)
    }

    /// Classify a ball against the eye's visible volume.
    pub fn ball_visibility(&mut self, center: Vec3, radius: f32) -> Visibility {
        self.refresh_boundary();
        self.eye.ball_visibility(&self.tree, center, radius)
    }

    /// Classify an axis-aligned box against the eye's visible volume.
    pub fn box_visibility(&mut self, min: Vec3, max: Vec3) -> Visibility {
        self.refresh_boundary();
        self.eye.box_visibility(&self.tree, min, max)
    }

    // ===== EYE POSITIONING =====

    /// Move the eye so the ball fills the view.
    ///
    /// Aims at the center, then backs off along the view direction
    /// until the ball spans the smaller field of view.
    pub fn fit_ball(&mut self, center: Vec3, radius: f32) {
        if radius <= 0.0 {
            self.diagnostics
                .warn_once(SOURCE, "fit_ball radius must be strictly positive, ignored");
            return;
        }
        self.eye.look_at(&mut self.tree, center);
        let fov = self
            .eye
            .field_of_view(&self.tree)
            .min(self.eye.horizontal_field_of_view(&self.tree));
        let distance = radius / (fov / 2.0).sin();
        let position = center - distance * self.eye.view_direction(&self.tree);
        self.tree.set_position(self.eye.frame(), position);
    }

    /// Move the eye so the axis-aligned box fills the view, via its
    /// enclosing ball.
    pub fn fit_bounding_box(&mut self, min: Vec3, max: Vec3) {
        self.fit_ball((min + max) / 2.0, (max - min).length() / 2.0);
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
