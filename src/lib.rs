/*!
# Framegraph Engine

Hierarchical spatial-transform graph with a virtual camera, for
interactive 2D/3D scene hosts that delegate drawing to an external
renderer.

## Architecture

- **Frame / FrameTree**: transform-tree nodes (local
  translation/rotation/scaling relative to an optional reference) with
  chain-walk coordinate conversion, pruning and cycle prevention
- **Constraint**: pure filters applied to proposed frame motion
  (axis/plane, hinge, cone, planar polygon, distance field)
- **Eye**: a camera driven by one frame; derives field of view,
  near/far planes, projection/view matrices and boundary-plane
  visibility
- **MatrixHandler**: bounded matrix stacks, cached projection×view,
  screen↔world conversion, HUD blocks
- **Graph**: the facade owning the tree, the eye, the matrix handler
  and the diagnostics sink

Input mapping and periodic animation are host concerns: the crate only
defines the [`input::InputRegistry`] and [`timing`] seams it calls
through.
*/

mod error;
mod matrix_handler;

pub mod constraint;
pub mod eye;
pub mod frame;
pub mod graph;
pub mod input;
pub mod log;
pub mod timing;

pub use crate::error::{Error, Result};
pub use crate::eye::{Eye, Plane, ProjectionType, Visibility};
pub use crate::frame::{Frame, FrameKey, FrameTree};
pub use crate::graph::{CacheFlags, Graph, GraphKind};
pub use crate::matrix_handler::{MatrixHandler, STACK_DEPTH};

// Re-export math library at crate root
pub use glam;
