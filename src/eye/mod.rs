//! Eye — the virtual camera
//!
//! An Eye is driven by one frame of the tree and derives everything
//! else: field of view from the frame's magnitude, near/far planes from
//! the scene hints, projection and view matrices, and the boundary
//! plane equations used for visibility classification.

mod boundary;
mod eye;

pub use boundary::{Plane, Visibility};
pub use eye::{Eye, ProjectionType};
