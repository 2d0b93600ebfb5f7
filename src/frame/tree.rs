//! FrameTree — storage and hierarchy for all frames of a graph.
//!
//! Uses a SlotMap for O(1) insert/remove with stable keys. Reference
//! (parent) links and children lists are kept exactly mutual, the tree
//! is kept acyclic by an explicit ancestor walk on every reparent, and
//! every mutation bumps a monotonic tick clock whose value is stamped
//! onto the modified frame and all of its descendants — derived caches
//! (projection, view, boundary equations) compare against this clock.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use slotmap::SlotMap;

use crate::constraint::{Constraint, ConstraintContext};
use crate::log::Diagnostics;
use super::frame::{Frame, FrameKey};

const SOURCE: &str = "framegraph::FrameTree";

/// Owner of every Frame in a graph.
///
/// Frames are addressed by stable [`FrameKey`]s. Keys passed to tree
/// methods must belong to this tree; using a removed key is a
/// programming error and panics.
pub struct FrameTree {
    frames: SlotMap<FrameKey, Frame>,
    /// Reference-less frames, in creation order (traversal order)
    roots: Vec<FrameKey>,
    /// Monotonic modification clock
    clock: u64,
    diagnostics: Arc<Diagnostics>,
}

impl FrameTree {
    /// Create an empty tree with default diagnostics.
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(Diagnostics::new()))
    }

    /// Create an empty tree reporting through the given diagnostics sink.
    pub fn with_diagnostics(diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            frames: SlotMap::with_key(),
            roots: Vec::new(),
            clock: 0,
            diagnostics,
        }
    }

    /// The diagnostics sink this tree reports through
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Current value of the modification clock
    pub fn clock(&self) -> u64 {
        self.clock
    }

    // ===== TOPOLOGY =====

    /// Number of frames (reachable or pruned)
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the tree holds no frames at all
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether the key refers to a live frame of this tree
    pub fn contains(&self, key: FrameKey) -> bool {
        self.frames.contains_key(key)
    }

    /// Get a frame by key
    pub fn frame(&self, key: FrameKey) -> Option<&Frame> {
        self.frames.get(key)
    }

    /// Root frames in creation order
    pub fn roots(&self) -> &[FrameKey] {
        &self.roots
    }

    /// Iterate over all live frame keys
    pub fn keys(&self) -> impl Iterator<Item = FrameKey> + '_ {
        self.frames.keys()
    }

    /// Create a new root frame.
    pub fn create_frame(&mut self) -> FrameKey {
        let key = self.frames.insert(Frame::new());
        self.roots.push(key);
        self.mark_modified(key);
        key
    }

    /// Create a new frame under `parent`.
    pub fn create_child(&mut self, parent: FrameKey) -> FrameKey {
        let mut frame = Frame::new();
        frame.set_reference_raw(Some(parent));
        let key = self.frames.insert(frame);
        self.frames[parent].children_mut().push(key);
        self.mark_modified(key);
        key
    }

    /// Destroy a frame and all of its descendants.
    ///
    /// Returns the destroyed keys in pre-order, so the caller can
    /// deregister them from collaborators.
    pub fn remove(&mut self, key: FrameKey) -> Vec<FrameKey> {
        let branch = self.collect_branch(key);
        self.detach(key);
        for &k in &branch {
            self.frames.remove(k);
        }
        self.clock += 1;
        branch
    }

    /// Value copy of a frame: same translation/rotation/scaling,
    /// constraint and reference, but never its children.
    ///
    /// The copy is registered with the shared reference (or the root
    /// set), keeping the mutual-linkage invariant.
    pub fn duplicate(&mut self, key: FrameKey) -> FrameKey {
        let copy = self.frames[key].value_copy();
        let new_key = self.frames.insert(copy);
        self.attach(new_key);
        self.mark_modified(new_key);
        new_key
    }

    /// Remove every frame and reset the clock.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.roots.clear();
        self.clock = 0;
    }

    /// Reference chain of a frame, nearest reference first.
    pub fn ancestors(&self, key: FrameKey) -> impl Iterator<Item = FrameKey> + '_ {
        std::iter::successors(self.frames[key].reference(), move |&k| {
            self.frames.get(k).and_then(|f| f.reference())
        })
    }

    /// Whether `ancestor` appears on `key`'s reference chain.
    ///
    /// A frame is not its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: FrameKey, key: FrameKey) -> bool {
        self.ancestors(key).any(|k| k == ancestor)
    }

    /// Whether the frame participates in traversal: roots must be
    /// registered in the root set, referenced frames must be present in
    /// their reference's children, recursively up to a root.
    pub fn is_reachable(&self, key: FrameKey) -> bool {
        if !self.contains(key) {
            return false;
        }
        match self.frames[key].reference() {
            None => self.roots.contains(&key),
            Some(r) => {
                self.frames.get(r).is_some_and(|f| f.children().contains(&key))
                    && self.is_reachable(r)
            }
        }
    }

    /// Change the reference (parent) of a frame.
    ///
    /// Rejected with a warning (tree unchanged, returns false) when the
    /// new reference is the frame itself, one of its descendants, or a
    /// removed key. On success the frame moves atomically between
    /// children lists and/or the root set and the subtree is marked
    /// modified.
    pub fn set_reference(&mut self, key: FrameKey, new_reference: Option<FrameKey>) -> bool {
        if new_reference == Some(key) {
            self.diagnostics
                .warn_once(SOURCE, "a frame cannot be its own reference, ignored");
            return false;
        }
        if let Some(r) = new_reference {
            if !self.contains(r) {
                self.diagnostics
                    .warn_once(SOURCE, "reference target is not part of this tree, ignored");
                return false;
            }
            if self.is_ancestor_of(key, r) {
                self.diagnostics.warn_once(
                    SOURCE,
                    "reference would make the frame its own ancestor, ignored",
                );
                return false;
            }
        }
        if self.frames[key].reference() == new_reference {
            return true;
        }

        self.detach(key);
        self.frames[key].set_reference_raw(new_reference);
        self.attach(key);
        self.mark_modified(key);
        true
    }

    /// Attach or replace the constraint filtering a frame's motion.
    pub fn set_constraint(&mut self, key: FrameKey, constraint: Option<Constraint>) {
        self.frames[key].set_constraint_raw(constraint);
        self.mark_modified(key);
    }

    // ===== PRUNING =====

    /// Collect a frame and all of its descendants, pre-order.
    pub fn collect_branch(&self, key: FrameKey) -> Vec<FrameKey> {
        let mut branch = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            branch.push(k);
            // reversed so the first child is visited first
            for &child in self.frames[k].children().iter().rev() {
                stack.push(child);
            }
        }
        branch
    }

    /// Detach a branch from the reachable tree without destroying it.
    ///
    /// Only the branch head leaves its parent's children list (or the
    /// root set); the links inside the branch stay intact, so a later
    /// [`append_branch`](Self::append_branch) restores world pose
    /// exactly and [`remove`](Self::remove) still destroys the whole
    /// branch. Returns the collected keys, pre-order.
    pub fn prune_branch(&mut self, key: FrameKey) -> Vec<FrameKey> {
        let branch = self.collect_branch(key);
        self.detach(key);
        self.clock += 1;
        for &k in &branch {
            self.frames[k].stamp(self.clock);
        }
        branch
    }

    /// Reattach a previously pruned branch.
    ///
    /// Frames whose reference disappeared in the meantime are promoted
    /// back into the root set; everything else rejoins its reference's
    /// children. Keys that no longer exist are skipped with a warning.
    pub fn append_branch(&mut self, branch: &[FrameKey]) {
        self.clock += 1;
        for &k in branch {
            if !self.contains(k) {
                self.diagnostics
                    .warn_once(SOURCE, "appending a destroyed frame, skipped");
                continue;
            }
            if let Some(r) = self.frames[k].reference() {
                if !self.contains(r) {
                    self.frames[k].set_reference_raw(None);
                }
            }
            self.attach(k);
            self.frames[k].stamp(self.clock);
        }
    }

    fn detach(&mut self, key: FrameKey) {
        match self.frames[key].reference() {
            Some(r) if self.contains(r) => {
                self.frames[r].children_mut().retain(|&c| c != key);
            }
            _ => self.roots.retain(|&c| c != key),
        }
    }

    fn attach(&mut self, key: FrameKey) {
        match self.frames[key].reference() {
            Some(r) => {
                if !self.frames[r].children().contains(&key) {
                    self.frames[r].children_mut().push(key);
                }
            }
            None => {
                if !self.roots.contains(&key) {
                    self.roots.push(key);
                }
            }
        }
    }

    /// Bump the clock and stamp the frame and all of its descendants.
    fn mark_modified(&mut self, key: FrameKey) {
        self.clock += 1;
        let branch = self.collect_branch(key);
        for k in branch {
            self.frames[k].stamp(self.clock);
        }
    }

    // ===== LOCAL MUTATION =====

    /// Set the local translation directly (no constraint filtering).
    pub fn set_translation(&mut self, key: FrameKey, translation: Vec3) {
        self.frames[key].set_translation_raw(translation);
        self.mark_modified(key);
    }

    /// Set the local rotation directly (no constraint filtering).
    pub fn set_rotation(&mut self, key: FrameKey, rotation: Quat) {
        self.frames[key].set_rotation_raw(rotation);
        self.mark_modified(key);
    }

    /// Set the local scaling. Non-positive values are rejected with a
    /// warning, leaving the frame unchanged.
    pub fn set_scaling(&mut self, key: FrameKey, scaling: f32) {
        if scaling <= 0.0 {
            self.diagnostics
                .warn_once(SOURCE, "frame scaling must be strictly positive, ignored");
            return;
        }
        self.frames[key].set_scaling_raw(scaling);
        self.mark_modified(key);
    }

    /// Multiply the local scaling by `factor`.
    pub fn scale(&mut self, key: FrameKey, factor: f32) {
        let scaling = self.frames[key].scaling();
        self.set_scaling(key, scaling * factor);
    }

    /// Translate by `delta` (reference-space), filtered through the
    /// frame's constraint. Eye-space constraints see an identity eye;
    /// use [`translate_filtered`](Self::translate_filtered) when an eye
    /// orientation is available.
    pub fn translate(&mut self, key: FrameKey, delta: Vec3) {
        self.translate_filtered(key, delta, Quat::IDENTITY);
    }

    /// Translate by `delta`, filtering with the given eye orientation.
    pub fn translate_filtered(&mut self, key: FrameKey, delta: Vec3, eye_orientation: Quat) {
        let filtered = match self.frames[key].constraint() {
            Some(constraint) => {
                let ctx = self.constraint_context(key, eye_orientation);
                constraint.constrain_translation(delta, &ctx)
            }
            None => delta,
        };
        let frame = &mut self.frames[key];
        let translation = frame.translation() + filtered;
        frame.set_translation_raw(translation);
        self.mark_modified(key);
    }

    /// Rotate by `delta` (local-space), filtered through the frame's
    /// constraint. Eye-space constraints see an identity eye; use
    /// [`rotate_filtered`](Self::rotate_filtered) when an eye
    /// orientation is available.
    pub fn rotate(&mut self, key: FrameKey, delta: Quat) {
        self.rotate_filtered(key, delta, Quat::IDENTITY);
    }

    /// Rotate by `delta`, filtering with the given eye orientation.
    pub fn rotate_filtered(&mut self, key: FrameKey, delta: Quat, eye_orientation: Quat) {
        let filtered = match self.frames[key].constraint() {
            Some(constraint) => {
                let ctx = self.constraint_context(key, eye_orientation);
                constraint.constrain_rotation(delta, &ctx)
            }
            None => delta,
        };
        let frame = &mut self.frames[key];
        let rotation = (frame.rotation() * filtered).normalize();
        frame.set_rotation_raw(rotation);
        self.mark_modified(key);
    }

    /// Snapshot of the frame state constraint filters consult.
    pub fn constraint_context(&self, key: FrameKey, eye_orientation: Quat) -> ConstraintContext {
        let frame = &self.frames[key];
        ConstraintContext {
            rotation: frame.rotation(),
            orientation: self.orientation(key),
            reference_orientation: frame
                .reference()
                .map_or(Quat::IDENTITY, |r| self.orientation(r)),
            eye_orientation,
        }
    }

    // ===== WORLD-SPACE ACCESSORS (reference-chain walks) =====

    /// World position of the frame's origin.
    pub fn position(&self, key: FrameKey) -> Vec3 {
        self.inverse_coordinates_of(key, Vec3::ZERO)
    }

    /// Move the frame so its origin lands on `position` (world-space).
    ///
    /// Sets local state directly — the constraint is not consulted.
    pub fn set_position(&mut self, key: FrameKey, position: Vec3) {
        let translation = match self.frames[key].reference() {
            Some(r) => self.coordinates_of(r, position),
            None => position,
        };
        self.frames[key].set_translation_raw(translation);
        self.mark_modified(key);
    }

    /// World orientation, composed level-by-level up the reference chain.
    pub fn orientation(&self, key: FrameKey) -> Quat {
        let mut orientation = self.frames[key].rotation();
        let mut current = self.frames[key].reference();
        while let Some(k) = current {
            orientation = self.frames[k].rotation() * orientation;
            current = self.frames[k].reference();
        }
        orientation.normalize()
    }

    /// Rotate the frame so its world orientation becomes `orientation`.
    ///
    /// Sets local state directly — the constraint is not consulted.
    pub fn set_orientation(&mut self, key: FrameKey, orientation: Quat) {
        let rotation = match self.frames[key].reference() {
            Some(r) => self.orientation(r).inverse() * orientation,
            None => orientation,
        };
        self.frames[key].set_rotation_raw(rotation);
        self.mark_modified(key);
    }

    /// World magnitude: the product of scalings up the reference chain.
    pub fn magnitude(&self, key: FrameKey) -> f32 {
        let mut magnitude = self.frames[key].scaling();
        let mut current = self.frames[key].reference();
        while let Some(k) = current {
            magnitude *= self.frames[k].scaling();
            current = self.frames[k].reference();
        }
        magnitude
    }

    /// Scale the frame so its world magnitude becomes `magnitude`.
    pub fn set_magnitude(&mut self, key: FrameKey, magnitude: f32) {
        let reference_magnitude = self.frames[key]
            .reference()
            .map_or(1.0, |r| self.magnitude(r));
        self.set_scaling(key, magnitude / reference_magnitude);
    }

    /// Convert a world-space point into the frame's local space,
    /// composing inverse transforms level-by-level down the chain.
    pub fn coordinates_of(&self, key: FrameKey, world_point: Vec3) -> Vec3 {
        let point = match self.frames[key].reference() {
            Some(r) => self.coordinates_of(r, world_point),
            None => world_point,
        };
        self.frames[key].local_coordinates_of(point)
    }

    /// Convert a point in the frame's local space to world space.
    pub fn inverse_coordinates_of(&self, key: FrameKey, local_point: Vec3) -> Vec3 {
        let mut point = local_point;
        let mut current = Some(key);
        while let Some(k) = current {
            point = self.frames[k].reference_coordinates_of(point);
            current = self.frames[k].reference();
        }
        point
    }

    /// Convert a world-space direction into the frame's local space
    /// (rotation and scale only, translation-invariant).
    pub fn transform_of(&self, key: FrameKey, world_vector: Vec3) -> Vec3 {
        let vector = match self.frames[key].reference() {
            Some(r) => self.transform_of(r, world_vector),
            None => world_vector,
        };
        self.frames[key].local_transform_of(vector)
    }

    /// Convert a direction in the frame's local space to world space.
    pub fn inverse_transform_of(&self, key: FrameKey, local_vector: Vec3) -> Vec3 {
        let mut vector = local_vector;
        let mut current = Some(key);
        while let Some(k) = current {
            vector = self.frames[k].reference_transform_of(vector);
            current = self.frames[k].reference();
        }
        vector
    }

    /// Convert a point expressed in `from` into `to`'s space.
    pub fn coordinates_of_in(&self, point: Vec3, from: FrameKey, to: FrameKey) -> Vec3 {
        self.coordinates_of(to, self.inverse_coordinates_of(from, point))
    }

    /// Convert a direction expressed in `from` into `to`'s space.
    pub fn transform_of_in(&self, vector: Vec3, from: FrameKey, to: FrameKey) -> Vec3 {
        self.transform_of(to, self.inverse_transform_of(from, vector))
    }

    /// The frame's local transform matrix.
    pub fn matrix(&self, key: FrameKey) -> Mat4 {
        self.frames[key].matrix()
    }

    /// The frame's composed world transform matrix.
    pub fn world_matrix(&self, key: FrameKey) -> Mat4 {
        let mut chain = vec![key];
        let mut current = self.frames[key].reference();
        while let Some(k) = current {
            chain.push(k);
            current = self.frames[k].reference();
        }
        let mut matrix = Mat4::IDENTITY;
        for &k in chain.iter().rev() {
            matrix *= self.frames[k].matrix();
        }
        matrix
    }
}

impl Default for FrameTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
