//! # Waymark Canvas
//!
//! The raster side of the waymark map annotation engine: the five fixed
//! document layers (base map, drawing, route, waypoint markers, origin
//! marker), their stack with visibility/opacity state, deterministic
//! source-over compositing, and round-pen stroke rasterization.
//!
//! The stack never diffs or snapshots its own buffers; undo bookkeeping
//! belongs to the editor layer above.

pub mod layer;
pub mod stack;
pub mod stroke;

pub use layer::{Layer, LayerKind};
pub use stack::{LayerStack, ValidationMode};
pub use stroke::{StrokeTool, ROUTE_COLOR, ROUTE_WIDTH};
