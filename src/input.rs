//! Input registration seam
//!
//! The host maps device events to frames through its own picking
//! machinery; the graph only tells it which frames are eligible.
//! Pruning, appending and frame destruction keep the registry in sync
//! so unreachable frames stop receiving events.

use crate::frame::FrameKey;

/// Collaborator notified as frames enter and leave the reachable tree.
pub trait InputRegistry {
    /// A frame became eligible for device-event grabbing.
    fn add_grabber(&mut self, key: FrameKey);

    /// A frame is no longer eligible (pruned or destroyed).
    fn remove_grabber(&mut self, key: FrameKey);
}
