//! Reversible edit commands.
//!
//! Every user-visible mutation of the document is expressed as a data-
//! carrying command with `apply` and `undo` against the document state.
//! Commands hold snapshots, never aliases: undo after apply restores the
//! prior state bit for bit regardless of what happened in between.

use image::RgbaImage;
use waymark_core::error::{Error, Result};
use waymark_core::schema::{AttrValue, FormatSchema};
use waymark_core::transform::{MapTransform, MetricPoint, PixelPoint};
use waymark_core::waypoint::{Waypoint, WaypointCollection};
use waymark_canvas::{LayerKind, LayerStack};

/// The mutable document a command runs against: transform, layer stack,
/// waypoint set, and the active schema snapshot.
#[derive(Debug)]
pub struct DocumentState {
    pub transform: MapTransform,
    pub layers: LayerStack,
    pub waypoints: WaypointCollection,
    pub schema: FormatSchema,
}

/// One undoable edit.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum EditCommand {
    AddWaypoint(AddWaypoint),
    RemoveWaypoint(RemoveWaypoint),
    MoveWaypoint(MoveWaypoint),
    RotateWaypoint(RotateWaypoint),
    SetAttribute(SetAttribute),
    ReorderWaypoint(ReorderWaypoint),
    SetVisibility(SetVisibility),
    SetOpacity(SetOpacity),
    Stroke(Stroke),
    SetOrigin(SetOrigin),
    ReplaceWaypoints(ReplaceWaypoints),
}

#[derive(Debug, Clone)]
pub struct AddWaypoint {
    pub pixel: PixelPoint,
    pub angle_degrees: f64,
    /// Number assigned on apply; used by undo.
    pub number: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RemoveWaypoint {
    pub number: u32,
    /// The removed waypoint, held while undone from the collection.
    pub removed: Option<Waypoint>,
}

#[derive(Debug, Clone)]
pub struct MoveWaypoint {
    pub number: u32,
    pub from: PixelPoint,
    pub to: PixelPoint,
}

#[derive(Debug, Clone)]
pub struct RotateWaypoint {
    pub number: u32,
    pub from_degrees: f64,
    pub to_degrees: f64,
}

#[derive(Debug, Clone)]
pub struct SetAttribute {
    pub number: u32,
    pub key: String,
    pub value: AttrValue,
    /// Prior value captured on apply; `None` means the key was absent.
    pub previous: Option<AttrValue>,
}

#[derive(Debug, Clone)]
pub struct ReorderWaypoint {
    pub number: u32,
    pub new_position: u32,
    /// The clamped position the waypoint actually landed at.
    pub applied_position: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SetVisibility {
    pub kind: LayerKind,
    pub visible: bool,
    pub previous: bool,
}

#[derive(Debug, Clone)]
pub struct SetOpacity {
    pub kind: LayerKind,
    pub opacity: f64,
    pub previous: f64,
}

/// One mouse-down to mouse-up stroke, as full before/after buffer
/// snapshots of the painted layer.
#[derive(Debug, Clone)]
pub struct Stroke {
    pub kind: LayerKind,
    pub before: Option<RgbaImage>,
    pub after: Option<RgbaImage>,
}

#[derive(Debug, Clone)]
pub struct SetOrigin {
    pub old_pixel: PixelPoint,
    pub old_metric: MetricPoint,
    pub old_resolution: f64,
    pub new_pixel: PixelPoint,
    pub new_metric: MetricPoint,
    pub new_resolution: f64,
}

/// Wholesale replacement of the waypoint set and schema, used by document
/// import.
#[derive(Debug, Clone)]
pub struct ReplaceWaypoints {
    pub new_waypoints: WaypointCollection,
    pub new_schema: FormatSchema,
    pub old_waypoints: Option<WaypointCollection>,
    pub old_schema: Option<FormatSchema>,
}

impl EditCommand {
    /// Executes the edit against the document state.
    ///
    /// A failed apply leaves the state untouched and the command must not
    /// be recorded.
    pub fn apply(&mut self, state: &mut DocumentState) -> Result<()> {
        match self {
            EditCommand::AddWaypoint(cmd) => {
                let wp = state
                    .waypoints
                    .add(cmd.pixel, cmd.angle_degrees, &state.transform);
                cmd.number = Some(wp.number());
                Ok(())
            }
            EditCommand::RemoveWaypoint(cmd) => {
                cmd.removed = Some(state.waypoints.remove(cmd.number)?);
                Ok(())
            }
            EditCommand::MoveWaypoint(cmd) => {
                state
                    .waypoints
                    .set_position(cmd.number, cmd.to, &state.transform)?;
                Ok(())
            }
            EditCommand::RotateWaypoint(cmd) => {
                state.waypoints.set_angle(cmd.number, cmd.to_degrees)?;
                Ok(())
            }
            EditCommand::SetAttribute(cmd) => {
                cmd.previous = state
                    .waypoints
                    .get(cmd.number)
                    .and_then(|wp| wp.attributes().get(&cmd.key).cloned());
                state.waypoints.set_attribute(
                    cmd.number,
                    &cmd.key,
                    cmd.value.clone(),
                    &state.schema,
                )
            }
            EditCommand::ReorderWaypoint(cmd) => {
                let target = cmd.new_position.clamp(1, state.waypoints.len().max(1) as u32);
                state.waypoints.reorder(cmd.number, target)?;
                cmd.applied_position = Some(target);
                Ok(())
            }
            EditCommand::SetVisibility(cmd) => {
                cmd.previous = state.layers.is_visible(cmd.kind);
                state.layers.set_visible(cmd.kind, cmd.visible);
                Ok(())
            }
            EditCommand::SetOpacity(cmd) => {
                cmd.previous = state.layers.opacity(cmd.kind);
                state.layers.set_opacity(cmd.kind, cmd.opacity)?;
                Ok(())
            }
            EditCommand::Stroke(cmd) => {
                state.layers.replace_buffer(cmd.kind, cmd.after.clone());
                Ok(())
            }
            EditCommand::SetOrigin(cmd) => {
                state
                    .transform
                    .set_origin(cmd.new_pixel, cmd.new_metric, cmd.new_resolution)?;
                state.waypoints.sync_metric(&state.transform);
                Ok(())
            }
            EditCommand::ReplaceWaypoints(cmd) => {
                cmd.old_waypoints = Some(std::mem::take(&mut state.waypoints));
                cmd.old_schema = Some(std::mem::replace(
                    &mut state.schema,
                    cmd.new_schema.clone(),
                ));
                state.waypoints = cmd.new_waypoints.clone();
                Ok(())
            }
        }
    }

    /// Reverts the edit, restoring the state `apply` saw.
    pub fn undo(&mut self, state: &mut DocumentState) -> Result<()> {
        match self {
            EditCommand::AddWaypoint(cmd) => {
                let number = cmd
                    .number
                    .ok_or_else(|| Error::other("undo of a command that was never applied"))?;
                state.waypoints.remove(number)?;
                Ok(())
            }
            EditCommand::RemoveWaypoint(cmd) => {
                let removed = cmd
                    .removed
                    .take()
                    .ok_or_else(|| Error::other("undo of a command that was never applied"))?;
                state.waypoints.restore(removed);
                Ok(())
            }
            EditCommand::MoveWaypoint(cmd) => {
                state
                    .waypoints
                    .set_position(cmd.number, cmd.from, &state.transform)?;
                Ok(())
            }
            EditCommand::RotateWaypoint(cmd) => {
                state.waypoints.set_angle(cmd.number, cmd.from_degrees)?;
                Ok(())
            }
            // The snapshot is kept, not consumed: a failed revert (the key
            // may no longer be schema-declared) must leave it intact for a
            // later retry, and redo recaptures it anyway.
            EditCommand::SetAttribute(cmd) => match &cmd.previous {
                Some(previous) => state.waypoints.set_attribute(
                    cmd.number,
                    &cmd.key,
                    previous.clone(),
                    &state.schema,
                ),
                None => {
                    state.waypoints.remove_attribute(cmd.number, &cmd.key)?;
                    Ok(())
                }
            },
            EditCommand::ReorderWaypoint(cmd) => {
                let applied = cmd
                    .applied_position
                    .ok_or_else(|| Error::other("undo of a command that was never applied"))?;
                state.waypoints.reorder(applied, cmd.number)?;
                Ok(())
            }
            EditCommand::SetVisibility(cmd) => {
                state.layers.set_visible(cmd.kind, cmd.previous);
                Ok(())
            }
            EditCommand::SetOpacity(cmd) => {
                state.layers.set_opacity(cmd.kind, cmd.previous)?;
                Ok(())
            }
            EditCommand::Stroke(cmd) => {
                state.layers.replace_buffer(cmd.kind, cmd.before.clone());
                Ok(())
            }
            EditCommand::SetOrigin(cmd) => {
                state
                    .transform
                    .set_origin(cmd.old_pixel, cmd.old_metric, cmd.old_resolution)?;
                state.waypoints.sync_metric(&state.transform);
                Ok(())
            }
            EditCommand::ReplaceWaypoints(cmd) => {
                let old_waypoints = cmd
                    .old_waypoints
                    .take()
                    .ok_or_else(|| Error::other("undo of a command that was never applied"))?;
                let old_schema = cmd
                    .old_schema
                    .take()
                    .ok_or_else(|| Error::other("undo of a command that was never applied"))?;
                state.waypoints = old_waypoints;
                state.schema = old_schema;
                Ok(())
            }
        }
    }

    /// Short display name for history listings.
    pub fn describe(&self) -> &'static str {
        match self {
            EditCommand::AddWaypoint(_) => "Add waypoint",
            EditCommand::RemoveWaypoint(_) => "Remove waypoint",
            EditCommand::MoveWaypoint(_) => "Move waypoint",
            EditCommand::RotateWaypoint(_) => "Rotate waypoint",
            EditCommand::SetAttribute(_) => "Set attribute",
            EditCommand::ReorderWaypoint(_) => "Reorder waypoint",
            EditCommand::SetVisibility(_) => "Set layer visibility",
            EditCommand::SetOpacity(_) => "Set layer opacity",
            EditCommand::Stroke(_) => "Stroke",
            EditCommand::SetOrigin(_) => "Set origin",
            EditCommand::ReplaceWaypoints(_) => "Import waypoints",
        }
    }
}
