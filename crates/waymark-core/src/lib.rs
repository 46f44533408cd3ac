//! # Waymark Core
//!
//! Core types for the waymark map annotation engine. This crate holds the
//! pieces of the editor that carry invariants and no presentation concern:
//!
//! - **Transform**: pixel ↔ metric coordinate conversion with an explicit
//!   origin, resolution, and axis orientation, plus the map metadata file
//!   it is initialized from.
//! - **Waypoints**: the numbered, oriented, attributed point model and its
//!   ordered collection with dense 1-based renumbering.
//! - **Schema**: the declared waypoint attribute format, with synchronous
//!   observer notification on every committed change.
//! - **Documents**: versioned structured-text round-trip of waypoint sets.
//!
//! Everything here is synchronous and single-threaded by design; operations
//! either return a value or fail with one of the structured error types in
//! [`error`], and no operation mutates state after a failed validation.

pub mod document;
pub mod error;
pub mod schema;
pub mod transform;
pub mod waypoint;

pub use document::{WaypointDocument, WaypointRecord, FORMAT_VERSION};
pub use error::{
    DocumentError, Error, ParameterError, Result, SchemaError, TransformError,
};
pub use schema::{
    AttrValue, FieldDef, FieldType, FormatSchema, ObserverId, SchemaObserver, SchemaRegistry,
    BUILTIN_FIELDS,
};
pub use transform::{MapMetadata, MapTransform, MetricPoint, PixelPoint};
pub use waypoint::{normalize_degrees, Waypoint, WaypointAction, WaypointCollection};
