//! Structured waypoint document serialization.
//!
//! Implements the versioned save/load format for waypoint sets: a
//! format-version tag, the embedded format schema, optional map metadata,
//! and the waypoint list in number order. Angles are stored in degrees and
//! radians, with radians always recomputed at export time — degrees are the
//! source of truth. Import is all-or-nothing: one invalid waypoint aborts
//! the whole document.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, Error, Result};
use crate::schema::{AttrValue, FormatSchema};
use crate::transform::{MapMetadata, MapTransform, PixelPoint};
use crate::waypoint::{Waypoint, WaypointAction, WaypointCollection};

/// Document format version. The only version accepted on import.
pub const FORMAT_VERSION: &str = "1.0";

/// One serialized waypoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointRecord {
    pub number: u32,
    /// Pixel position, authoritative on import.
    pub pixel: (f64, f64),
    /// Metric x, derived through the transform at export time.
    pub x: f64,
    /// Metric y, derived through the transform at export time.
    pub y: f64,
    pub angle_degrees: f64,
    /// Always `angle_degrees * PI / 180`, recomputed at export.
    pub angle_radians: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<WaypointAction>,
}

/// Complete waypoint document structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointDocument {
    pub format_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    pub schema: FormatSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapMetadata>,
    pub waypoints: Vec<WaypointRecord>,
}

fn record_for(waypoint: &Waypoint, schema: &FormatSchema) -> WaypointRecord {
    // Only schema-declared custom attributes are emitted.
    let attributes = waypoint
        .attributes()
        .iter()
        .filter(|(key, _)| schema.field(key).is_some())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    WaypointRecord {
        number: waypoint.number(),
        pixel: (waypoint.pixel().x, waypoint.pixel().y),
        x: waypoint.metric().x,
        y: waypoint.metric().y,
        angle_degrees: waypoint.angle_degrees(),
        angle_radians: waypoint.angle_radians(),
        attributes,
        actions: waypoint.actions().to_vec(),
    }
}

/// Serializes a waypoint set with its schema and optional map metadata.
///
/// Waypoints are emitted in number order, which is also their sequence
/// order.
pub fn export(
    waypoints: &WaypointCollection,
    schema: &FormatSchema,
    map: Option<&MapMetadata>,
) -> Result<String> {
    schema.validate().map_err(Error::Schema)?;
    let now = Utc::now();
    let doc = WaypointDocument {
        format_version: FORMAT_VERSION.to_string(),
        created: Some(now),
        modified: Some(now),
        schema: schema.clone(),
        map: map.cloned(),
        waypoints: waypoints.iter().map(|wp| record_for(wp, schema)).collect(),
    };
    let text = serde_json::to_string_pretty(&doc).map_err(DocumentError::Json)?;
    tracing::debug!("Exported {} waypoints", waypoints.len());
    Ok(text)
}

/// Deserializes a waypoint document.
///
/// Fails closed on an absent or unsupported version tag, on duplicate
/// waypoint numbers, and on any attribute the embedded schema does not
/// declare. Pixel positions are authoritative; metric positions are
/// recomputed through `transform`. On success the collection is renumbered
/// densely in document number order.
pub fn import(text: &str, transform: &MapTransform) -> Result<(WaypointCollection, FormatSchema)> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DocumentError::Malformed {
            reason: e.to_string(),
        })?;
    let version = value
        .get("format_version")
        .and_then(|v| v.as_str())
        .ok_or(DocumentError::MissingVersion)?;
    if version != FORMAT_VERSION {
        return Err(DocumentError::UnsupportedVersion {
            version: version.to_string(),
        }
        .into());
    }

    let doc: WaypointDocument = serde_json::from_value(value).map_err(DocumentError::Json)?;
    doc.schema.validate().map_err(Error::Schema)?;

    let mut seen = std::collections::BTreeSet::new();
    for record in &doc.waypoints {
        if !seen.insert(record.number) {
            return Err(DocumentError::DuplicateNumber {
                number: record.number,
            }
            .into());
        }
    }

    let mut built = Vec::with_capacity(doc.waypoints.len());
    for record in doc.waypoints {
        for (key, val) in &record.attributes {
            doc_check_attribute(&doc.schema, key, val)?;
        }
        let mut attributes = record.attributes;
        for def in doc.schema.custom_fields() {
            if def.required && !attributes.contains_key(&def.name) {
                match &def.default {
                    Some(default) => {
                        attributes.insert(def.name.clone(), default.clone());
                    }
                    None => {
                        return Err(DocumentError::Malformed {
                            reason: format!(
                                "waypoint {} is missing required attribute '{}'",
                                record.number, def.name
                            ),
                        }
                        .into())
                    }
                }
            }
        }
        built.push(Waypoint::from_parts(
            record.number,
            PixelPoint::new(record.pixel.0, record.pixel.1),
            record.angle_degrees,
            attributes,
            record.actions,
            transform,
        ));
    }

    let collection = WaypointCollection::from_waypoints(built).map_err(Error::Document)?;
    tracing::debug!("Imported {} waypoints", collection.len());
    Ok((collection, doc.schema))
}

fn doc_check_attribute(schema: &FormatSchema, key: &str, value: &AttrValue) -> Result<()> {
    schema.check_attribute(key, value).map_err(Error::Schema)
}

/// Writes an exported document to a file.
pub fn save_to_file(
    path: impl AsRef<Path>,
    waypoints: &WaypointCollection,
    schema: &FormatSchema,
    map: Option<&MapMetadata>,
) -> anyhow::Result<()> {
    let text = export(waypoints, schema, map).context("Failed to serialize waypoint document")?;
    std::fs::write(path.as_ref(), text).context("Failed to write waypoint document")?;
    Ok(())
}

/// Reads and imports a waypoint document from a file.
pub fn load_from_file(
    path: impl AsRef<Path>,
    transform: &MapTransform,
) -> anyhow::Result<(WaypointCollection, FormatSchema)> {
    let text =
        std::fs::read_to_string(path.as_ref()).context("Failed to read waypoint document")?;
    import(&text, transform).context("Failed to parse waypoint document")
}
