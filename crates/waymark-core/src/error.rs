//! Error handling for the waymark engine.
//!
//! Provides structured error types for every layer of the engine:
//! - Transform errors (origin/resolution validation)
//! - Parameter errors (out-of-range values under strict validation)
//! - Schema errors (format schema validation and attribute typing)
//! - Document errors (waypoint document import/export)
//!
//! All error types use `thiserror`. Undo/redo on empty history stacks are
//! defined no-ops and have no error variant.

use thiserror::Error;

/// Coordinate transform error type
///
/// Raised when a transform cannot be constructed or replaced because its
/// parameters are invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Resolution must be strictly positive
    #[error("Invalid resolution {resolution}: must be > 0")]
    InvalidResolution {
        /// The rejected resolution value in metric units per pixel.
        resolution: f64,
    },

    /// A required map metadata field is absent
    #[error("Missing map metadata field '{field}'")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// The origin entry does not hold enough components
    #[error("Malformed origin: expected at least 2 components, got {count}")]
    MalformedOrigin {
        /// The number of components found.
        count: usize,
    },

    /// The metadata text could not be parsed at all
    #[error("Malformed map metadata: {reason}")]
    MalformedMetadata {
        /// A description of the parse failure.
        reason: String,
    },
}

/// Parameter validation error type
///
/// Raised only when strict validation is requested; the default policy
/// clamps silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// Opacity outside [0, 1]
    #[error("Opacity {value} out of range [0, 1]")]
    OpacityOutOfRange {
        /// The rejected opacity value.
        value: f64,
    },

    /// Stroke applied to a layer kind that does not accept strokes
    #[error("Layer '{kind}' does not accept strokes")]
    LayerNotPaintable {
        /// The display name of the layer kind.
        kind: String,
    },

    /// Buffer replacement applied to a layer that owns its own content
    #[error("Layer '{kind}' does not accept external buffers")]
    LayerNotReplaceable {
        /// The display name of the layer kind.
        kind: String,
    },

    /// Base image dimensions must be non-zero
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
}

/// Format schema error type
///
/// Raised when a candidate schema is rejected or a waypoint attribute
/// violates the active schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A built-in field is missing from a candidate schema
    #[error("Schema is missing required built-in field '{field}'")]
    MissingBuiltin {
        /// The name of the missing built-in field.
        field: String,
    },

    /// A built-in field was redeclared with the wrong type
    #[error("Built-in field '{field}' must have type '{expected}'")]
    BuiltinTypeMismatch {
        /// The built-in field name.
        field: String,
        /// The type the built-in requires.
        expected: String,
    },

    /// Two fields share a name
    #[error("Duplicate schema field '{field}'")]
    DuplicateField {
        /// The duplicated field name.
        field: String,
    },

    /// A field type token could not be parsed
    #[error("Malformed type '{type_name}' for field '{field}'")]
    MalformedType {
        /// The field carrying the bad type.
        field: String,
        /// The unrecognized type token.
        type_name: String,
    },

    /// An attribute key is not declared in the active schema
    #[error("Attribute '{field}' is not declared in the active schema")]
    UnknownField {
        /// The undeclared attribute key.
        field: String,
    },

    /// An attribute value has the wrong type for its declared field
    #[error("Attribute '{field}' expects type '{expected}', got '{got}'")]
    TypeMismatch {
        /// The attribute key.
        field: String,
        /// The declared type name.
        expected: String,
        /// The type name of the rejected value.
        got: String,
    },

    /// Built-in fields are owned by dedicated operations, not the
    /// attribute map
    #[error("Field '{field}' is built-in and cannot be set as an attribute")]
    ReservedField {
        /// The reserved field name.
        field: String,
    },
}

/// Waypoint document error type
///
/// Raised during structured import/export of waypoint documents. Import is
/// all-or-nothing: any of these aborts the whole import.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The format version tag is absent
    #[error("Document has no format_version tag")]
    MissingVersion,

    /// The format version is not supported
    #[error("Unsupported format version '{version}'")]
    UnsupportedVersion {
        /// The version tag found in the document.
        version: String,
    },

    /// Two waypoints share a number
    #[error("Duplicate waypoint number {number}")]
    DuplicateNumber {
        /// The colliding waypoint number.
        number: u32,
    },

    /// No waypoint with this number exists
    #[error("No waypoint with number {number}")]
    UnknownWaypoint {
        /// The requested waypoint number.
        number: u32,
    },

    /// The document is structurally invalid
    #[error("Malformed document: {reason}")]
    Malformed {
        /// A description of the structural problem.
        reason: String,
    },

    /// Serialization/deserialization failure
    #[error("Document serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main error type for the waymark engine
///
/// A unified error type that can represent any failure from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Transform error
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Parameter error
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Schema error
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a schema violation
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    /// Check if this is a document error
    pub fn is_document_error(&self) -> bool {
        matches!(self, Error::Document(_))
    }

    /// Check if this is a duplicate-number collision
    pub fn is_duplicate_number(&self) -> bool {
        matches!(self, Error::Document(DocumentError::DuplicateNumber { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
