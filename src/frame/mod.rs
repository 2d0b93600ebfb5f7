//! Frame transform tree
//!
//! Provides the Frame node (local translation/rotation/scaling plus an
//! optional reference) and the FrameTree that owns all frames, enforces
//! the hierarchy invariants and performs reference-chain coordinate
//! conversion.

mod frame;
mod tree;

pub use frame::{Frame, FrameKey};
pub use tree::FrameTree;
