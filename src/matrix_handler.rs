//! MatrixHandler — matrix state for one render pass
//!
//! Holds the projection/view pair bound at the top of a pass, the
//! active modelview composed during traversal, two bounded stacks, and
//! the cached projection×view product (plus its inverse when enabled)
//! used by the screen↔world conversions. Stack discipline violations
//! are programming errors and panic.

use glam::{Mat4, Vec3, Vec4};

use crate::error::{Error, Result};

/// Fixed depth of the modelview and projection stacks
pub const STACK_DEPTH: usize = 32;

/// Matrix state bound once per pass by [`Graph::bind`](crate::graph::Graph::bind).
pub struct MatrixHandler {
    projection: Mat4,
    view: Mat4,
    modelview: Mat4,
    modelview_stack: Vec<Mat4>,
    projection_stack: Vec<Mat4>,
    projection_view: Option<Mat4>,
    projection_view_inverse: Option<Mat4>,
    cache_projection_view: bool,
    cache_inverse: bool,
    screen_width: u32,
    screen_height: u32,
    hud_stash: Option<(Mat4, Mat4)>,
}

impl MatrixHandler {
    pub fn new() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            modelview: Mat4::IDENTITY,
            modelview_stack: Vec::with_capacity(STACK_DEPTH),
            projection_stack: Vec::with_capacity(STACK_DEPTH),
            projection_view: None,
            projection_view_inverse: None,
            cache_projection_view: true,
            cache_inverse: false,
            screen_width: 800,
            screen_height: 600,
            hud_stash: None,
        }
    }

    // ===== BINDING =====

    /// Bind a fresh projection/view pair for the pass.
    ///
    /// Precomputes the selected projection×view caches and seeds the
    /// modelview with the view.
    ///
    /// # Panics
    ///
    /// Panics when entries remain on either stack from the previous
    /// pass: unbalanced push/pop is a programming error.
    pub fn bind(&mut self, projection: Mat4, view: Mat4, width: u32, height: u32) {
        assert!(
            self.modelview_stack.is_empty() && self.projection_stack.is_empty(),
            "unbalanced matrix stack at bind"
        );
        self.projection = projection;
        self.view = view;
        self.modelview = view;
        self.screen_width = width;
        self.screen_height = height;
        let product = projection * view;
        self.projection_view = self.cache_projection_view.then_some(product);
        self.projection_view_inverse = if self.cache_inverse {
            invert(product).ok()
        } else {
            None
        };
    }

    /// Whether the projection×view product is precomputed at bind time
    pub fn caches_projection_view(&self) -> bool {
        self.cache_projection_view
    }

    /// Enable or disable precomputing the projection×view product at
    /// bind time. When disabled the product is recomputed per query.
    pub fn set_cache_projection_view(&mut self, enabled: bool) {
        self.cache_projection_view = enabled;
        if !enabled {
            self.projection_view = None;
        }
    }

    /// Whether the projection×view inverse is cached at bind time
    pub fn caches_inverse(&self) -> bool {
        self.cache_inverse
    }

    /// Enable or disable caching the projection×view inverse.
    pub fn set_cache_inverse(&mut self, enabled: bool) {
        self.cache_inverse = enabled;
        if !enabled {
            self.projection_view_inverse = None;
        }
    }

    // ===== MATRIX ACCESS =====

    /// The bound projection matrix
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// The bound view matrix
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// The active modelview matrix
    pub fn modelview(&self) -> Mat4 {
        self.modelview
    }

    /// The projection×view product: the value precomputed at bind when
    /// caching is enabled, otherwise recomputed from the current pair.
    pub fn projection_view(&self) -> Mat4 {
        self.projection_view
            .unwrap_or_else(|| self.projection * self.view)
    }

    /// Replace the active modelview.
    pub fn set_modelview(&mut self, matrix: Mat4) {
        self.modelview = matrix;
    }

    /// Right-multiply the active modelview by a local transform.
    pub fn apply_modelview(&mut self, matrix: Mat4) {
        self.modelview *= matrix;
    }

    // ===== STACKS =====

    /// Push the active modelview.
    ///
    /// # Panics
    ///
    /// Panics when the stack is already [`STACK_DEPTH`] deep.
    pub fn push_modelview(&mut self) {
        assert!(
            self.modelview_stack.len() < STACK_DEPTH,
            "modelview stack overflow (depth {STACK_DEPTH})"
        );
        self.modelview_stack.push(self.modelview);
    }

    /// Pop the active modelview.
    ///
    /// # Panics
    ///
    /// Panics when the stack is empty.
    pub fn pop_modelview(&mut self) {
        match self.modelview_stack.pop() {
            Some(matrix) => self.modelview = matrix,
            None => panic!("modelview stack underflow"),
        }
    }

    /// Push the bound projection.
    ///
    /// # Panics
    ///
    /// Panics when the stack is already [`STACK_DEPTH`] deep.
    pub fn push_projection(&mut self) {
        assert!(
            self.projection_stack.len() < STACK_DEPTH,
            "projection stack overflow (depth {STACK_DEPTH})"
        );
        self.projection_stack.push(self.projection);
    }

    /// Pop the bound projection.
    ///
    /// # Panics
    ///
    /// Panics when the stack is empty.
    pub fn pop_projection(&mut self) {
        match self.projection_stack.pop() {
            Some(matrix) => self.projection = matrix,
            None => panic!("projection stack underflow"),
        }
    }

    // ===== HUD =====

    /// Enter screen-space drawing: pixel-aligned orthographic
    /// projection, identity modelview. Must be balanced by
    /// [`end_hud`](Self::end_hud).
    ///
    /// # Panics
    ///
    /// Panics when a HUD block is already open.
    pub fn begin_hud(&mut self) {
        assert!(self.hud_stash.is_none(), "nested HUD block");
        self.hud_stash = Some((self.projection, self.modelview));
        self.projection = Mat4::orthographic_rh_gl(
            0.0,
            self.screen_width as f32,
            self.screen_height as f32,
            0.0,
            -1.0,
            1.0,
        );
        self.modelview = Mat4::IDENTITY;
    }

    /// Leave screen-space drawing, restoring the stashed matrices.
    ///
    /// # Panics
    ///
    /// Panics when no HUD block is open.
    pub fn end_hud(&mut self) {
        match self.hud_stash.take() {
            Some((projection, modelview)) => {
                self.projection = projection;
                self.modelview = modelview;
            }
            None => panic!("end_hud without begin_hud"),
        }
    }

    // ===== SCREEN <-> WORLD =====

    /// Project a world point to screen coordinates.
    ///
    /// Returns `(x_px, y_px, depth)` with y growing downward (viewport
    /// `(0, height, width, -height)`) and depth in `[0, 1]`.
    pub fn project(&self, world: Vec3) -> Result<Vec3> {
        let clip = self.projection_view() * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w == 0.0 {
            return Err(Error::NullDivisor);
        }
        let ndc = clip / clip.w;
        Ok(Vec3::new(
            self.screen_width as f32 * (ndc.x + 1.0) / 2.0,
            self.screen_height as f32 * (1.0 - ndc.y) / 2.0,
            (ndc.z + 1.0) / 2.0,
        ))
    }

    /// Unproject screen coordinates (as produced by
    /// [`project`](Self::project)) back to a world point.
    ///
    /// Uses the cached inverse when available, otherwise inverts on
    /// demand. Fails on a singular projection×view or a zero
    /// homogeneous divisor.
    pub fn unproject(&self, screen: Vec3) -> Result<Vec3> {
        let inverse = match self.projection_view_inverse {
            Some(inverse) => inverse,
            None => invert(self.projection_view())?,
        };
        let ndc = Vec4::new(
            2.0 * screen.x / self.screen_width as f32 - 1.0,
            1.0 - 2.0 * screen.y / self.screen_height as f32,
            2.0 * screen.z - 1.0,
            1.0,
        );
        let world = inverse * ndc;
        if world.w == 0.0 {
            return Err(Error::NullDivisor);
        }
        Ok(Vec3::new(world.x, world.y, world.z) / world.w)
    }
}

fn invert(matrix: Mat4) -> Result<Mat4> {
    if matrix.determinant() == 0.0 {
        return Err(Error::SingularMatrix(
            "projection x view is not invertible".to_string(),
        ));
    }
    Ok(matrix.inverse())
}

#[cfg(test)]
#[path = "matrix_handler_tests.rs"]
mod tests;
