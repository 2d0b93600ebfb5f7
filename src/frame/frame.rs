//! Frame — node of the transform tree.
//!
//! A Frame owns its local translation, rotation and scaling, expressed
//! relative to an optional reference frame. Frames never reference each
//! other directly: linkage goes through stable FrameKeys resolved by
//! the owning FrameTree, so value copies and prune/append bookkeeping
//! stay cheap and safe.

use glam::{Mat4, Quat, Vec3};
use slotmap::new_key_type;

use crate::constraint::Constraint;

new_key_type! {
    /// Stable key for a Frame within a FrameTree.
    ///
    /// Keys remain valid even after other frames are removed.
    /// A key becomes invalid only when its own frame is removed.
    pub struct FrameKey;
}

/// Node of the transform tree.
///
/// Local state only — world-space accessors (`position`, `orientation`,
/// `magnitude`) live on [`FrameTree`](super::FrameTree) because they
/// walk the reference chain.
#[derive(Debug, Clone)]
pub struct Frame {
    translation: Vec3,
    rotation: Quat,
    scaling: f32,
    reference: Option<FrameKey>,
    children: Vec<FrameKey>,
    constraint: Option<Constraint>,
    last_update: u64,
}

impl Frame {
    /// Create a detached identity frame.
    pub(crate) fn new() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scaling: 1.0,
            reference: None,
            children: Vec::new(),
            constraint: None,
            last_update: 0,
        }
    }

    // ===== LOCAL STATE =====

    /// Local translation, expressed in the reference frame
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Local rotation, relative to the reference frame
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scaling (always strictly positive)
    pub fn scaling(&self) -> f32 {
        self.scaling
    }

    /// The reference (parent) frame, None for roots
    pub fn reference(&self) -> Option<FrameKey> {
        self.reference
    }

    /// Child frames, in attachment order
    pub fn children(&self) -> &[FrameKey] {
        &self.children
    }

    /// The constraint filtering this frame's motion, if any
    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    /// Tick-clock stamp of the last modification affecting this frame
    pub fn last_update(&self) -> u64 {
        self.last_update
    }

    pub(crate) fn set_translation_raw(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    pub(crate) fn set_rotation_raw(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    pub(crate) fn set_scaling_raw(&mut self, scaling: f32) {
        self.scaling = scaling;
    }

    pub(crate) fn set_reference_raw(&mut self, reference: Option<FrameKey>) {
        self.reference = reference;
    }

    pub(crate) fn set_constraint_raw(&mut self, constraint: Option<Constraint>) {
        self.constraint = constraint;
    }

    pub(crate) fn stamp(&mut self, tick: u64) {
        self.last_update = tick;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<FrameKey> {
        &mut self.children
    }

    /// Value copy of the local state: translation/rotation/scaling and
    /// constraint, same reference, no children.
    pub(crate) fn value_copy(&self) -> Self {
        Self {
            translation: self.translation,
            rotation: self.rotation,
            scaling: self.scaling,
            reference: self.reference,
            children: Vec::new(),
            constraint: self.constraint.clone(),
            last_update: self.last_update,
        }
    }

    // ===== SINGLE-LEVEL CONVERSION =====

    /// Convert a point from this frame's reference space to local space.
    pub fn local_coordinates_of(&self, reference_point: Vec3) -> Vec3 {
        self.rotation.inverse() * (reference_point - self.translation) / self.scaling
    }

    /// Convert a point from local space to this frame's reference space.
    pub fn reference_coordinates_of(&self, local_point: Vec3) -> Vec3 {
        self.rotation * (local_point * self.scaling) + self.translation
    }

    /// Convert a direction from reference space to local space
    /// (translation-invariant).
    pub fn local_transform_of(&self, reference_vector: Vec3) -> Vec3 {
        self.rotation.inverse() * reference_vector / self.scaling
    }

    /// Convert a direction from local space to reference space
    /// (translation-invariant).
    pub fn reference_transform_of(&self, local_vector: Vec3) -> Vec3 {
        self.rotation * (local_vector * self.scaling)
    }

    /// Local transform as a matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scaling),
            self.rotation,
            self.translation,
        )
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
