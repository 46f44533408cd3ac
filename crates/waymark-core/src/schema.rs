//! Waypoint format schema and change notification.
//!
//! The format schema declares the attribute keys and value types recognized
//! on waypoints. Five built-in fields are always present and cannot be
//! removed; custom fields are additive. Schema swaps are validate-then-commit
//! and broadcast synchronously to registered observers in registration order.

use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SchemaError;

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// The type name used in schema declarations and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "str",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
    Str,
    Bool,
}

impl FieldType {
    /// Parses the schema type token (`int`, `float`, `str`, `bool`).
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "int" => Some(FieldType::Int),
            "float" => Some(FieldType::Float),
            "str" => Some(FieldType::Str),
            "bool" => Some(FieldType::Bool),
            _ => None,
        }
    }

    /// The schema type token for this type.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Str => "str",
            FieldType::Bool => "bool",
        }
    }

    /// Whether a value is acceptable for this field type.
    ///
    /// Integer values are accepted for float fields; structured text makes
    /// no distinction between `5` and `5.0`.
    pub fn accepts(&self, value: &AttrValue) -> bool {
        matches!(
            (self, value),
            (FieldType::Int, AttrValue::Int(_))
                | (FieldType::Float, AttrValue::Float(_))
                | (FieldType::Float, AttrValue::Int(_))
                | (FieldType::Str, AttrValue::Str(_))
                | (FieldType::Bool, AttrValue::Bool(_))
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single field declaration in a format schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,
}

impl FieldDef {
    /// Creates an optional field with no default.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            default: None,
        }
    }

    /// Builds a field from schema text tokens, rejecting unknown type
    /// names.
    pub fn from_tokens(name: &str, type_token: &str) -> Result<Self, SchemaError> {
        let field_type =
            FieldType::parse(type_token).ok_or_else(|| SchemaError::MalformedType {
                field: name.to_string(),
                type_name: type_token.to_string(),
            })?;
        Ok(Self::new(name, field_type))
    }

    fn builtin(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required: true,
            default: None,
        }
    }
}

/// The built-in fields every schema must declare, with their types.
pub const BUILTIN_FIELDS: &[(&str, FieldType)] = &[
    ("number", FieldType::Int),
    ("x", FieldType::Float),
    ("y", FieldType::Float),
    ("angle_degrees", FieldType::Float),
    ("angle_radians", FieldType::Float),
];

/// The one supported schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// The declared set of valid waypoint attribute keys and types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSchema {
    pub version: String,
    pub fields: Vec<FieldDef>,
}

impl Default for FormatSchema {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            fields: BUILTIN_FIELDS
                .iter()
                .map(|(name, ty)| FieldDef::builtin(name, *ty))
                .collect(),
        }
    }
}

impl FormatSchema {
    /// Looks up a field declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a field name is one of the built-ins.
    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_FIELDS.iter().any(|(b, _)| *b == name)
    }

    /// The custom (non-built-in) field declarations, in declaration order.
    pub fn custom_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !Self::is_builtin(&f.name))
    }

    /// Validates the schema: all built-ins present with their required
    /// types, and no duplicate field names.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (name, ty) in BUILTIN_FIELDS {
            match self.field(name) {
                None => {
                    return Err(SchemaError::MissingBuiltin {
                        field: name.to_string(),
                    })
                }
                Some(def) if def.field_type != *ty => {
                    return Err(SchemaError::BuiltinTypeMismatch {
                        field: name.to_string(),
                        expected: ty.name().to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        for (i, def) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|other| other.name == def.name) {
                return Err(SchemaError::DuplicateField {
                    field: def.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Checks one attribute key/value pair against this schema.
    ///
    /// Built-in keys are reserved: they are owned by dedicated waypoint
    /// operations and never live in the attribute map.
    pub fn check_attribute(&self, key: &str, value: &AttrValue) -> Result<(), SchemaError> {
        if Self::is_builtin(key) {
            return Err(SchemaError::ReservedField {
                field: key.to_string(),
            });
        }
        let def = self.field(key).ok_or_else(|| SchemaError::UnknownField {
            field: key.to_string(),
        })?;
        if !def.field_type.accepts(value) {
            return Err(SchemaError::TypeMismatch {
                field: key.to_string(),
                expected: def.field_type.name().to_string(),
                got: value.type_name().to_string(),
            });
        }
        Ok(())
    }
}

/// Subscription handle for schema observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obs({})", &self.0.to_string()[..8])
    }
}

/// Callback invoked with the newly committed schema.
///
/// A returned error is logged and swallowed; one failing observer must not
/// corrupt the commit or starve later observers.
pub type SchemaObserver = Box<dyn Fn(&FormatSchema) -> anyhow::Result<()> + Send + Sync>;

/// Holder of the active format schema plus its observer list.
///
/// Swaps are atomic: an invalid candidate is rejected before any observer
/// is notified and the active schema is left untouched.
pub struct SchemaRegistry {
    active: RwLock<FormatSchema>,
    observers: RwLock<Vec<(ObserverId, SchemaObserver)>>,
}

impl SchemaRegistry {
    /// Creates a registry holding the default built-in schema.
    pub fn new() -> Self {
        Self {
            active: RwLock::new(FormatSchema::default()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Returns a read-only snapshot of the active schema.
    pub fn get(&self) -> FormatSchema {
        self.active.read().clone()
    }

    /// Validates and commits a candidate schema, then notifies every
    /// observer in registration order.
    pub fn set(&self, candidate: FormatSchema) -> Result<(), SchemaError> {
        candidate.validate()?;
        {
            let mut active = self.active.write();
            *active = candidate;
        }
        let snapshot = self.get();
        let observers = self.observers.read();
        for (id, callback) in observers.iter() {
            if let Err(err) = callback(&snapshot) {
                tracing::warn!("Schema observer {} failed: {:#}", id, err);
            }
        }
        tracing::debug!(
            "Schema set to version {} ({} fields, {} observers notified)",
            snapshot.version,
            snapshot.fields.len(),
            observers.len()
        );
        Ok(())
    }

    /// Registers an observer, returning its subscription handle.
    pub fn subscribe(&self, callback: SchemaObserver) -> ObserverId {
        let id = ObserverId::new();
        self.observers.write().push((id, callback));
        tracing::debug!("Schema observer {} registered", id);
        id
    }

    /// Removes an observer. Unknown handles are ignored.
    pub fn unsubscribe(&self, id: ObserverId) {
        let mut observers = self.observers.write();
        observers.retain(|(other, _)| *other != id);
    }

    /// The number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("active", &*self.active.read())
            .field("observers", &self.observers.read().len())
            .finish()
    }
}
