//! Waypoint model and ordered collection.
//!
//! A waypoint is a numbered, positioned, oriented point with schema-checked
//! attributes and an ordered action list. Numbers are 1-based and dense at
//! all times: display order, route order, and number are the same thing.
//! The metric position is a derived cache over the pixel position — it is
//! recomputed on every write through the active transform and is never
//! independently authoritative.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::schema::{AttrValue, FormatSchema};
use crate::transform::{MapTransform, MetricPoint, PixelPoint};

/// Normalizes an angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// One named action attached to a waypoint, with free-form scalar
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, AttrValue>,
}

impl WaypointAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// A numbered, positioned, oriented, attributed point.
///
/// Not directly serializable; documents go through `WaypointRecord` so
/// the metric cache is always rebuilt through the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    number: u32,
    pixel: PixelPoint,
    metric: MetricPoint,
    angle_degrees: f64,
    attributes: BTreeMap<String, AttrValue>,
    actions: Vec<WaypointAction>,
}

impl Waypoint {
    /// Creates a waypoint at a pixel position, deriving the metric position
    /// through the transform.
    pub fn new(number: u32, pixel: PixelPoint, angle_degrees: f64, transform: &MapTransform) -> Self {
        Self {
            number,
            pixel,
            metric: transform.to_metric(pixel),
            angle_degrees: normalize_degrees(angle_degrees),
            attributes: BTreeMap::new(),
            actions: Vec::new(),
        }
    }

    /// The 1-based waypoint number (also route order and display order).
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The pixel position (authoritative).
    pub fn pixel(&self) -> PixelPoint {
        self.pixel
    }

    /// The metric position (derived from the pixel position).
    pub fn metric(&self) -> MetricPoint {
        self.metric
    }

    /// The orientation in degrees, always within [0, 360).
    pub fn angle_degrees(&self) -> f64 {
        self.angle_degrees
    }

    /// The orientation in radians, recomputed from degrees.
    pub fn angle_radians(&self) -> f64 {
        self.angle_degrees.to_radians()
    }

    /// The schema-validated custom attributes.
    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    /// The ordered action list.
    pub fn actions(&self) -> &[WaypointAction] {
        &self.actions
    }

    /// The list label, e.g. `#03 (1.25, -0.40) 90°`.
    pub fn label(&self) -> String {
        format!(
            "#{:02} ({:.2}, {:.2}) {}°",
            self.number, self.metric.x, self.metric.y, self.angle_degrees as i64
        )
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    pub(crate) fn set_pixel(&mut self, pixel: PixelPoint, transform: &MapTransform) {
        self.pixel = pixel;
        self.metric = transform.to_metric(pixel);
    }

    pub(crate) fn set_angle(&mut self, degrees: f64) {
        self.angle_degrees = normalize_degrees(degrees);
    }

    pub(crate) fn sync_metric(&mut self, transform: &MapTransform) {
        self.metric = transform.to_metric(self.pixel);
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut BTreeMap<String, AttrValue> {
        &mut self.attributes
    }

    pub(crate) fn actions_mut(&mut self) -> &mut Vec<WaypointAction> {
        &mut self.actions
    }

    /// Rebuilds a waypoint from deserialized parts. The metric position is
    /// recomputed through the transform, not trusted from the input.
    pub fn from_parts(
        number: u32,
        pixel: PixelPoint,
        angle_degrees: f64,
        attributes: BTreeMap<String, AttrValue>,
        actions: Vec<WaypointAction>,
        transform: &MapTransform,
    ) -> Self {
        let mut wp = Self::new(number, pixel, angle_degrees, transform);
        wp.attributes = attributes;
        wp.actions = actions;
        wp
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Ordered set of waypoints with dense 1-based numbering.
///
/// Every mutating operation maintains the invariant that numbers are
/// exactly `1..=len()` in sequence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointCollection {
    waypoints: Vec<Waypoint>,
}

impl WaypointCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    /// Looks up a waypoint by number.
    pub fn get(&self, number: u32) -> Option<&Waypoint> {
        if number == 0 {
            return None;
        }
        self.waypoints.get(number as usize - 1)
    }

    fn get_mut(&mut self, number: u32) -> Result<&mut Waypoint, DocumentError> {
        if number == 0 || number as usize > self.waypoints.len() {
            return Err(DocumentError::UnknownWaypoint { number });
        }
        Ok(&mut self.waypoints[number as usize - 1])
    }

    fn renumber(&mut self) {
        for (i, wp) in self.waypoints.iter_mut().enumerate() {
            wp.set_number(i as u32 + 1);
        }
    }

    /// Adds a waypoint at the tail, assigning the next number.
    pub fn add(
        &mut self,
        pixel: PixelPoint,
        angle_degrees: f64,
        transform: &MapTransform,
    ) -> &Waypoint {
        let number = self.waypoints.len() as u32 + 1;
        self.waypoints
            .push(Waypoint::new(number, pixel, angle_degrees, transform));
        self.waypoints.last().expect("just pushed")
    }

    /// Removes a waypoint; every higher-numbered waypoint is decremented so
    /// the numbering stays dense.
    pub fn remove(&mut self, number: u32) -> Result<Waypoint, DocumentError> {
        if number == 0 || number as usize > self.waypoints.len() {
            return Err(DocumentError::UnknownWaypoint { number });
        }
        let removed = self.waypoints.remove(number as usize - 1);
        self.renumber();
        Ok(removed)
    }

    /// Reinserts a previously removed waypoint at the slot its number names,
    /// shifting the tail up. Exact inverse of [`WaypointCollection::remove`].
    pub fn restore(&mut self, waypoint: Waypoint) {
        let index = (waypoint.number().max(1) as usize - 1).min(self.waypoints.len());
        self.waypoints.insert(index, waypoint);
        self.renumber();
    }

    /// Moves a waypoint to a new 1-based position and renumbers so number
    /// and sequence index agree again. Route order and display order are
    /// deliberately the same thing.
    pub fn reorder(&mut self, number: u32, new_position: u32) -> Result<(), DocumentError> {
        if number == 0 || number as usize > self.waypoints.len() {
            return Err(DocumentError::UnknownWaypoint { number });
        }
        let target = new_position.clamp(1, self.waypoints.len() as u32) as usize - 1;
        let wp = self.waypoints.remove(number as usize - 1);
        self.waypoints.insert(target, wp);
        self.renumber();
        Ok(())
    }

    /// Moves a waypoint to a new pixel position, recomputing its metric
    /// position.
    pub fn set_position(
        &mut self,
        number: u32,
        pixel: PixelPoint,
        transform: &MapTransform,
    ) -> Result<(), DocumentError> {
        self.get_mut(number)?.set_pixel(pixel, transform);
        Ok(())
    }

    /// Sets a waypoint's orientation, normalized into [0, 360).
    pub fn set_angle(&mut self, number: u32, degrees: f64) -> Result<(), DocumentError> {
        self.get_mut(number)?.set_angle(degrees);
        Ok(())
    }

    /// Sets a custom attribute after checking it against the active schema.
    pub fn set_attribute(
        &mut self,
        number: u32,
        key: &str,
        value: AttrValue,
        schema: &FormatSchema,
    ) -> Result<(), crate::error::Error> {
        schema.check_attribute(key, &value)?;
        self.get_mut(number)?
            .attributes_mut()
            .insert(key.to_string(), value);
        Ok(())
    }

    /// Removes a custom attribute, returning its prior value if any.
    pub fn remove_attribute(
        &mut self,
        number: u32,
        key: &str,
    ) -> Result<Option<AttrValue>, DocumentError> {
        Ok(self.get_mut(number)?.attributes_mut().remove(key))
    }

    /// Appends an action to a waypoint's ordered action list.
    pub fn push_action(&mut self, number: u32, action: WaypointAction) -> Result<(), DocumentError> {
        self.get_mut(number)?.actions_mut().push(action);
        Ok(())
    }

    /// Removes the action at `index` from a waypoint's list.
    pub fn remove_action(
        &mut self,
        number: u32,
        index: usize,
    ) -> Result<WaypointAction, DocumentError> {
        let wp = self.get_mut(number)?;
        if index >= wp.actions().len() {
            return Err(DocumentError::Malformed {
                reason: format!("action index {} out of range", index),
            });
        }
        Ok(wp.actions_mut().remove(index))
    }

    /// Recomputes every waypoint's metric position after a transform change.
    pub fn sync_metric(&mut self, transform: &MapTransform) {
        for wp in &mut self.waypoints {
            wp.sync_metric(transform);
        }
    }

    /// Removes all waypoints.
    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    /// Builds a collection from already constructed waypoints, rejecting
    /// duplicate numbers and then renumbering densely in number order.
    pub fn from_waypoints(mut waypoints: Vec<Waypoint>) -> Result<Self, DocumentError> {
        waypoints.sort_by_key(|wp| wp.number());
        for pair in waypoints.windows(2) {
            if pair[0].number() == pair[1].number() {
                return Err(DocumentError::DuplicateNumber {
                    number: pair[0].number(),
                });
            }
        }
        let mut collection = Self { waypoints };
        collection.renumber();
        Ok(collection)
    }

    /// The waypoint numbers in sequence order. Always `1..=len()`.
    pub fn numbers(&self) -> Vec<u32> {
        self.waypoints.iter().map(|wp| wp.number()).collect()
    }
}
