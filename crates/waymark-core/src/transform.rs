//! Pixel and metric coordinate transformation.
//!
//! Handles conversion between pixel coordinates (image space, origin at the
//! top-left, +Y down) and metric coordinates (world space, +Y up when the
//! axis is inverted). The transform is defined by an origin point known in
//! both spaces and a resolution in metric units per pixel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// A point in pixel space (image coordinates, top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in metric space (world coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricPoint {
    pub x: f64,
    pub y: f64,
}

impl MetricPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for MetricPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// The active pixel/metric transform parameters.
///
/// Immutable except through [`MapTransform::set_origin`]; the editor wraps
/// that call in an undoable command and resynchronizes every waypoint's
/// metric position afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapTransform {
    origin_pixel: PixelPoint,
    origin_metric: MetricPoint,
    resolution: f64,
    y_axis_inverted: bool,
}

impl MapTransform {
    /// Creates a transform, rejecting a non-positive resolution.
    pub fn new(
        origin_pixel: PixelPoint,
        origin_metric: MetricPoint,
        resolution: f64,
        y_axis_inverted: bool,
    ) -> Result<Self, TransformError> {
        if resolution <= 0.0 || !resolution.is_finite() {
            return Err(TransformError::InvalidResolution { resolution });
        }
        Ok(Self {
            origin_pixel,
            origin_metric,
            resolution,
            y_axis_inverted,
        })
    }

    /// Gets the origin in pixel space.
    pub fn origin_pixel(&self) -> PixelPoint {
        self.origin_pixel
    }

    /// Gets the origin in metric space.
    pub fn origin_metric(&self) -> MetricPoint {
        self.origin_metric
    }

    /// Gets the resolution in metric units per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Whether the metric Y axis runs opposite to the pixel Y axis.
    pub fn y_axis_inverted(&self) -> bool {
        self.y_axis_inverted
    }

    /// Converts pixel coordinates to metric coordinates.
    ///
    /// Formula:
    /// ```text
    /// metric_x = origin_metric.x + (pixel_x - origin_pixel.x) * resolution
    /// metric_y = origin_metric.y + (origin_pixel.y - pixel_y) * resolution  // inverted Y
    /// ```
    pub fn to_metric(&self, pixel: PixelPoint) -> MetricPoint {
        let dx = pixel.x - self.origin_pixel.x;
        let mut dy = pixel.y - self.origin_pixel.y;
        if self.y_axis_inverted {
            dy = -dy;
        }
        MetricPoint::new(
            self.origin_metric.x + dx * self.resolution,
            self.origin_metric.y + dy * self.resolution,
        )
    }

    /// Converts metric coordinates to pixel coordinates.
    ///
    /// Exact algebraic inverse of [`MapTransform::to_metric`].
    pub fn to_pixel(&self, metric: MetricPoint) -> PixelPoint {
        let dx = (metric.x - self.origin_metric.x) / self.resolution;
        let mut dy = (metric.y - self.origin_metric.y) / self.resolution;
        if self.y_axis_inverted {
            dy = -dy;
        }
        PixelPoint::new(self.origin_pixel.x + dx, self.origin_pixel.y + dy)
    }

    /// Replaces the transform parameters.
    ///
    /// Fails with [`TransformError::InvalidResolution`] without touching the
    /// current parameters when `resolution <= 0`. The caller is responsible
    /// for recomputing derived metric positions.
    pub fn set_origin(
        &mut self,
        origin_pixel: PixelPoint,
        origin_metric: MetricPoint,
        resolution: f64,
    ) -> Result<(), TransformError> {
        if resolution <= 0.0 || !resolution.is_finite() {
            return Err(TransformError::InvalidResolution { resolution });
        }
        self.origin_pixel = origin_pixel;
        self.origin_metric = origin_metric;
        self.resolution = resolution;
        tracing::debug!(
            "Transform origin set to pixel ({:.1}, {:.1}), metric {}, resolution {}",
            origin_pixel.x,
            origin_pixel.y,
            self.origin_metric,
            resolution
        );
        Ok(())
    }
}

impl fmt::Display for MapTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "origin px ({:.1}, {:.1}) | origin m {} | {:.4} m/px",
            self.origin_pixel.x, self.origin_pixel.y, self.origin_metric, self.resolution
        )
    }
}

/// Map metadata file contents.
///
/// The structured metadata that accompanies a base map image: the image file
/// name, the resolution, and the metric position of the image's lower-left
/// corner as `[x, y, yaw]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapMetadata {
    #[serde(default)]
    pub image: String,
    pub resolution: Option<f64>,
    pub origin: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupied_thresh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_thresh: Option<f64>,
}

impl MapMetadata {
    /// Parses metadata from structured text.
    ///
    /// Absent fields surface later, from [`MapMetadata::to_transform`], as
    /// [`TransformError::MissingField`]; this only fails on unparseable
    /// text.
    pub fn from_json(text: &str) -> Result<Self, TransformError> {
        serde_json::from_str(text).map_err(|e| TransformError::MalformedMetadata {
            reason: e.to_string(),
        })
    }

    /// Builds the document transform for a base image of the given height.
    ///
    /// The metadata origin is the metric position of the image's lower-left
    /// corner, so the metric origin lands at pixel
    /// `(-origin.x / resolution, height + origin.y / resolution)` with the Y
    /// axis inverted.
    pub fn to_transform(&self, image_height: u32) -> Result<MapTransform, TransformError> {
        let resolution = self.resolution.ok_or_else(|| TransformError::MissingField {
            field: "resolution".to_string(),
        })?;
        let origin = self.origin.as_ref().ok_or_else(|| TransformError::MissingField {
            field: "origin".to_string(),
        })?;
        if origin.len() < 2 {
            return Err(TransformError::MalformedOrigin {
                count: origin.len(),
            });
        }
        if resolution <= 0.0 || !resolution.is_finite() {
            return Err(TransformError::InvalidResolution { resolution });
        }

        let origin_px = PixelPoint::new(
            -origin[0] / resolution,
            image_height as f64 - (-origin[1] / resolution),
        );
        MapTransform::new(origin_px, MetricPoint::new(0.0, 0.0), resolution, true)
    }
}
