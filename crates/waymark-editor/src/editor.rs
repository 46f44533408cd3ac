//! The editor integration surface.
//!
//! `EditorState` owns the transform, layer stack, waypoint set, schema
//! registry, and history, and routes every user-visible mutation through a
//! recorded [`EditCommand`]. Reads (`composite`, accessors, export) never
//! touch the history.

use std::path::Path;

use image::{GrayImage, RgbaImage};
use waymark_core::document;
use waymark_core::error::{Error, Result, SchemaError};
use waymark_core::schema::{AttrValue, FormatSchema, SchemaRegistry};
use waymark_core::transform::{MapMetadata, MapTransform, MetricPoint, PixelPoint};
use waymark_core::waypoint::{Waypoint, WaypointCollection};
use waymark_canvas::{LayerKind, LayerStack, StrokeTool, ValidationMode};

use crate::commands::{
    AddWaypoint, DocumentState, EditCommand, MoveWaypoint, RemoveWaypoint, ReorderWaypoint,
    ReplaceWaypoints, RotateWaypoint, SetAttribute, SetOpacity, SetOrigin, SetVisibility, Stroke,
};
use crate::history::{History, DEFAULT_DEPTH};

struct StrokeInProgress {
    kind: LayerKind,
    before: Option<RgbaImage>,
}

/// One open map document under edit.
pub struct EditorState {
    doc: DocumentState,
    registry: SchemaRegistry,
    history: History,
    map: MapMetadata,
    stroke: Option<StrokeInProgress>,
}

impl EditorState {
    /// Opens a document from a decoded grayscale base image and its map
    /// metadata.
    ///
    /// Validates the image dimensions and derives the pixel/metric
    /// transform from the metadata.
    pub fn open(base: GrayImage, metadata: MapMetadata) -> Result<Self> {
        let height = base.height();
        let layers = LayerStack::new(base).map_err(Error::Parameter)?;
        let transform = metadata.to_transform(height).map_err(Error::Transform)?;
        let registry = SchemaRegistry::new();
        let schema = registry.get();
        tracing::debug!(
            "Opened document '{}' at {}x{} ({})",
            metadata.image,
            layers.width(),
            layers.height(),
            transform
        );
        Ok(Self {
            doc: DocumentState {
                transform,
                layers,
                waypoints: WaypointCollection::new(),
                schema,
            },
            registry,
            history: History::new(DEFAULT_DEPTH),
            map: metadata,
            stroke: None,
        })
    }

    fn run(&mut self, mut command: EditCommand) -> Result<()> {
        command.apply(&mut self.doc)?;
        self.history.record(command);
        Ok(())
    }

    /// Adds a waypoint at the tail of the route, returning its number.
    pub fn add_waypoint(&mut self, pixel: PixelPoint, angle_degrees: f64) -> Result<u32> {
        self.run(EditCommand::AddWaypoint(AddWaypoint {
            pixel,
            angle_degrees,
            number: None,
        }))?;
        Ok(self.doc.waypoints.len() as u32)
    }

    /// Removes a waypoint; later waypoints renumber down.
    pub fn remove_waypoint(&mut self, number: u32) -> Result<()> {
        self.run(EditCommand::RemoveWaypoint(RemoveWaypoint {
            number,
            removed: None,
        }))
    }

    /// Moves a waypoint to a new pixel position.
    pub fn move_waypoint(&mut self, number: u32, to: PixelPoint) -> Result<()> {
        let from = self
            .doc
            .waypoints
            .get(number)
            .map(Waypoint::pixel)
            .ok_or_else(|| unknown_waypoint(number))?;
        self.run(EditCommand::MoveWaypoint(MoveWaypoint { number, from, to }))
    }

    /// Sets a waypoint's orientation in degrees.
    pub fn rotate_waypoint(&mut self, number: u32, degrees: f64) -> Result<()> {
        let from_degrees = self
            .doc
            .waypoints
            .get(number)
            .map(Waypoint::angle_degrees)
            .ok_or_else(|| unknown_waypoint(number))?;
        self.run(EditCommand::RotateWaypoint(RotateWaypoint {
            number,
            from_degrees,
            to_degrees: degrees,
        }))
    }

    /// Moves a waypoint to a new route position; the whole set renumbers.
    pub fn reorder_waypoint(&mut self, number: u32, new_position: u32) -> Result<()> {
        self.run(EditCommand::ReorderWaypoint(ReorderWaypoint {
            number,
            new_position,
            applied_position: None,
        }))
    }

    /// Sets a schema-declared custom attribute on a waypoint.
    pub fn set_waypoint_attribute(
        &mut self,
        number: u32,
        key: impl Into<String>,
        value: AttrValue,
    ) -> Result<()> {
        self.run(EditCommand::SetAttribute(SetAttribute {
            number,
            key: key.into(),
            value,
            previous: None,
        }))
    }

    pub fn set_layer_visible(&mut self, kind: LayerKind, visible: bool) -> Result<()> {
        self.run(EditCommand::SetVisibility(SetVisibility {
            kind,
            visible,
            previous: true,
        }))
    }

    pub fn set_layer_opacity(&mut self, kind: LayerKind, opacity: f64) -> Result<()> {
        self.run(EditCommand::SetOpacity(SetOpacity {
            kind,
            opacity,
            previous: 1.0,
        }))
    }

    /// Replaces the transform parameters and resynchronizes every
    /// waypoint's metric position, as one undoable edit.
    pub fn set_origin(
        &mut self,
        origin_pixel: PixelPoint,
        origin_metric: MetricPoint,
        resolution: f64,
    ) -> Result<()> {
        self.run(EditCommand::SetOrigin(SetOrigin {
            old_pixel: self.doc.transform.origin_pixel(),
            old_metric: self.doc.transform.origin_metric(),
            old_resolution: self.doc.transform.resolution(),
            new_pixel: origin_pixel,
            new_metric: origin_metric,
            new_resolution: resolution,
        }))
    }

    /// Starts a stroke on a paintable layer, snapshotting its buffer.
    pub fn begin_stroke(&mut self, kind: LayerKind) -> Result<()> {
        if self.stroke.is_some() {
            return Err(Error::other("a stroke is already in progress"));
        }
        if !kind.paintable() {
            return Err(waymark_core::error::ParameterError::LayerNotPaintable {
                kind: kind.name().to_string(),
            }
            .into());
        }
        self.stroke = Some(StrokeInProgress {
            kind,
            before: self.doc.layers.buffer(kind).cloned(),
        });
        Ok(())
    }

    /// Rasterizes polyline points into the in-progress stroke.
    pub fn stroke_to(&mut self, points: &[PixelPoint], tool: &StrokeTool) -> Result<()> {
        let stroke = self
            .stroke
            .as_ref()
            .ok_or_else(|| Error::other("no stroke in progress"))?;
        self.doc
            .layers
            .apply_stroke(stroke.kind, points, tool)
            .map_err(Error::Parameter)
    }

    /// Ends the in-progress stroke, recording it as one history entry.
    ///
    /// Ending with no stroke in progress is a no-op.
    pub fn end_stroke(&mut self) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        let after = self.doc.layers.buffer(stroke.kind).cloned();
        // The buffer already holds the stroke; record without re-applying.
        self.history.record(EditCommand::Stroke(Stroke {
            kind: stroke.kind,
            before: stroke.before,
            after,
        }));
    }

    /// Reverts the most recent edit. Returns `false` when the history is
    /// empty.
    ///
    /// A failed revert leaves both the document and the history stacks
    /// exactly as they were.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(command) = self.history.undo() else {
            return Ok(false);
        };
        if let Err(err) = command.undo(&mut self.doc) {
            self.history.cancel_undo();
            return Err(err);
        }
        self.sync_registry();
        Ok(true)
    }

    /// Re-applies the most recently undone edit. Returns `false` when
    /// there is nothing to redo.
    ///
    /// A failed re-apply leaves both the document and the history stacks
    /// exactly as they were.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(command) = self.history.redo() else {
            return Ok(false);
        };
        if let Err(err) = command.apply(&mut self.doc) {
            self.history.cancel_redo();
            return Err(err);
        }
        self.sync_registry();
        Ok(true)
    }

    // Import and its undo swap the document schema; the registry (and its
    // observers) must track the active one.
    fn sync_registry(&self) {
        if self.registry.get() != self.doc.schema {
            if let Err(err) = self.registry.set(self.doc.schema.clone()) {
                tracing::warn!("Failed to resync schema registry: {}", err);
            }
        }
    }

    /// Flattens the visible layers into one image.
    pub fn composite(&self) -> RgbaImage {
        self.doc.layers.composite()
    }

    /// Serializes the waypoint set with the active schema and map
    /// metadata.
    pub fn export_waypoints(&self) -> Result<String> {
        document::export(&self.doc.waypoints, &self.doc.schema, Some(&self.map))
    }

    /// Imports a waypoint document, replacing the waypoint set and active
    /// schema as a single undoable edit. Returns the number of waypoints
    /// loaded.
    pub fn import_waypoints(&mut self, text: &str) -> Result<usize> {
        let (waypoints, schema) = document::import(text, &self.doc.transform)?;
        let count = waypoints.len();
        self.run(EditCommand::ReplaceWaypoints(ReplaceWaypoints {
            new_waypoints: waypoints,
            new_schema: schema,
            old_waypoints: None,
            old_schema: None,
        }))?;
        self.sync_registry();
        Ok(count)
    }

    /// Writes the exported waypoint document to a file.
    pub fn save_waypoints(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        document::save_to_file(path, &self.doc.waypoints, &self.doc.schema, Some(&self.map))
    }

    /// Draws the route polyline through all waypoints in number order.
    pub fn draw_route(&mut self) {
        let points: Vec<PixelPoint> = self.doc.waypoints.iter().map(Waypoint::pixel).collect();
        self.doc.layers.draw_route(&points);
    }

    /// Removes the route polyline.
    pub fn clear_route(&mut self) {
        self.doc.layers.clear_route();
    }

    /// Validates and activates a new format schema, notifying registry
    /// observers. Not undoable; schema edits are configuration, not
    /// document edits.
    pub fn set_schema(&mut self, candidate: FormatSchema) -> std::result::Result<(), SchemaError> {
        self.registry.set(candidate)?;
        self.doc.schema = self.registry.get();
        Ok(())
    }

    /// Installs externally rendered marker content on the waypoints or
    /// origin layer.
    pub fn set_marker_buffer(&mut self, kind: LayerKind, buffer: RgbaImage) -> Result<()> {
        self.doc
            .layers
            .set_buffer(kind, buffer)
            .map_err(Error::Parameter)
    }

    pub fn set_validation_mode(&mut self, mode: ValidationMode) {
        self.doc.layers.set_validation_mode(mode);
    }

    pub fn transform(&self) -> &MapTransform {
        &self.doc.transform
    }

    pub fn layers(&self) -> &LayerStack {
        &self.doc.layers
    }

    pub fn waypoints(&self) -> &WaypointCollection {
        &self.doc.waypoints
    }

    pub fn schema(&self) -> &FormatSchema {
        &self.doc.schema
    }

    pub fn schema_registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn map_metadata(&self) -> &MapMetadata {
        &self.map
    }
}

fn unknown_waypoint(number: u32) -> Error {
    waymark_core::error::DocumentError::UnknownWaypoint { number }.into()
}
