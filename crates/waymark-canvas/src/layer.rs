//! Layer kinds and per-layer state.

use std::fmt;

use image::RgbaImage;

/// The five fixed layer kinds, in paint order from lowest to highest.
///
/// Kinds are not reassignable: a layer's kind is fixed at stack creation
/// and determines where it sits in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// The decoded base map image.
    Base,
    /// Freehand pen and eraser strokes.
    Drawing,
    /// The generated waypoint route polyline.
    Route,
    /// Externally rendered waypoint markers.
    Waypoints,
    /// Externally rendered origin marker.
    Origin,
}

impl LayerKind {
    /// All kinds, bottom to top. Compositing walks this order.
    pub const PAINT_ORDER: [LayerKind; 5] = [
        LayerKind::Base,
        LayerKind::Drawing,
        LayerKind::Route,
        LayerKind::Waypoints,
        LayerKind::Origin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Base => "base",
            LayerKind::Drawing => "drawing",
            LayerKind::Route => "route",
            LayerKind::Waypoints => "waypoints",
            LayerKind::Origin => "origin",
        }
    }

    /// Whether strokes may be rasterized onto this layer.
    pub fn paintable(&self) -> bool {
        matches!(self, LayerKind::Drawing | LayerKind::Route)
    }

    /// Whether this layer's content is rendered externally and installed
    /// as a whole buffer.
    pub fn replaceable(&self) -> bool {
        matches!(self, LayerKind::Waypoints | LayerKind::Origin)
    }

    fn index(&self) -> usize {
        match self {
            LayerKind::Base => 0,
            LayerKind::Drawing => 1,
            LayerKind::Route => 2,
            LayerKind::Waypoints => 3,
            LayerKind::Origin => 4,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One layer of the document: visibility, opacity, and pixel content.
///
/// A `None` buffer means the layer has never been painted; it contributes
/// nothing to the composite.
#[derive(Debug, Clone)]
pub struct Layer {
    kind: LayerKind,
    visible: bool,
    opacity: f64,
    buffer: Option<RgbaImage>,
}

impl Layer {
    pub(crate) fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            visible: true,
            opacity: 1.0,
            buffer: None,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Opacity in [0, 1], applied on top of per-pixel alpha at composite
    /// time.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn buffer(&self) -> Option<&RgbaImage> {
        self.buffer.as_ref()
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    pub(crate) fn set_buffer(&mut self, buffer: Option<RgbaImage>) {
        self.buffer = buffer;
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Option<RgbaImage> {
        &mut self.buffer
    }
}

pub(crate) fn layer_index(kind: LayerKind) -> usize {
    kind.index()
}
