//! The five-layer document stack and its composite.

use image::{GrayImage, Rgba, RgbaImage};
use waymark_core::error::ParameterError;
use waymark_core::PixelPoint;

use crate::layer::{layer_index, Layer, LayerKind};
use crate::stroke::{self, StrokeTool, ROUTE_COLOR, ROUTE_WIDTH};

/// Out-of-range parameter policy.
///
/// `Clamp` silently clamps to the legal range; `Strict` rejects with a
/// `ParameterError`. One policy per stack, applied uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Clamp,
    Strict,
}

/// The document's layer stack: five fixed layers over a decoded base map.
///
/// All layer buffers share the base image dimensions. Layers exist for the
/// lifetime of the stack; only visibility, opacity, and pixel content
/// change.
#[derive(Debug, Clone)]
pub struct LayerStack {
    width: u32,
    height: u32,
    layers: [Layer; 5],
    validation: ValidationMode,
}

impl LayerStack {
    /// Builds a stack from a decoded grayscale base image.
    ///
    /// Rejects zero-sized images; decode failures are the caller's concern.
    pub fn new(base: GrayImage) -> Result<Self, ParameterError> {
        let (width, height) = base.dimensions();
        if width == 0 || height == 0 {
            return Err(ParameterError::InvalidDimensions { width, height });
        }
        let base_rgba = RgbaImage::from_fn(width, height, |x, y| {
            let g = base.get_pixel(x, y)[0];
            Rgba([g, g, g, 255])
        });
        let mut layers = LayerKind::PAINT_ORDER.map(Layer::new);
        layers[layer_index(LayerKind::Base)].set_buffer(Some(base_rgba));
        tracing::debug!("Layer stack created at {}x{}", width, height);
        Ok(Self {
            width,
            height,
            layers,
            validation: ValidationMode::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation
    }

    pub fn set_validation_mode(&mut self, mode: ValidationMode) {
        self.validation = mode;
    }

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        &self.layers[layer_index(kind)]
    }

    fn layer_mut(&mut self, kind: LayerKind) -> &mut Layer {
        &mut self.layers[layer_index(kind)]
    }

    pub fn is_visible(&self, kind: LayerKind) -> bool {
        self.layer(kind).visible()
    }

    pub fn opacity(&self, kind: LayerKind) -> f64 {
        self.layer(kind).opacity()
    }

    /// A read-only view of a layer's pixel content, if it has any.
    pub fn buffer(&self, kind: LayerKind) -> Option<&RgbaImage> {
        self.layer(kind).buffer()
    }

    pub fn set_visible(&mut self, kind: LayerKind, visible: bool) {
        self.layer_mut(kind).set_visible(visible);
    }

    /// Sets a layer's opacity under the stack's validation policy.
    pub fn set_opacity(&mut self, kind: LayerKind, opacity: f64) -> Result<(), ParameterError> {
        let value = if (0.0..=1.0).contains(&opacity) {
            opacity
        } else {
            match self.validation {
                ValidationMode::Clamp => opacity.clamp(0.0, 1.0),
                ValidationMode::Strict => {
                    return Err(ParameterError::OpacityOutOfRange { value: opacity })
                }
            }
        };
        self.layer_mut(kind).set_opacity(value);
        Ok(())
    }

    /// Rasterizes a polyline stroke onto a paintable layer.
    ///
    /// Only the drawing and route layers accept strokes. The layer's buffer
    /// is created lazily on first paint.
    pub fn apply_stroke(
        &mut self,
        kind: LayerKind,
        points: &[PixelPoint],
        tool: &StrokeTool,
    ) -> Result<(), ParameterError> {
        if !kind.paintable() {
            return Err(ParameterError::LayerNotPaintable {
                kind: kind.name().to_string(),
            });
        }
        let (width, height) = (self.width, self.height);
        let buffer = self
            .layer_mut(kind)
            .buffer_mut()
            .get_or_insert_with(|| RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])));
        stroke::rasterize(buffer, points, tool);
        Ok(())
    }

    /// Replaces the route layer content with the waypoint polyline, drawn
    /// in green.
    pub fn draw_route(&mut self, points: &[PixelPoint]) {
        let (width, height) = (self.width, self.height);
        let layer = self.layer_mut(LayerKind::Route);
        let buffer = layer
            .buffer_mut()
            .insert(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])));
        stroke::rasterize(
            buffer,
            points,
            &StrokeTool::Pen {
                width: ROUTE_WIDTH,
                color: ROUTE_COLOR,
            },
        );
        tracing::debug!("Route drawn through {} points", points.len());
    }

    /// Removes the route polyline.
    pub fn clear_route(&mut self) {
        self.layer_mut(LayerKind::Route).set_buffer(None);
    }

    /// Installs externally rendered marker content on the waypoints or
    /// origin layer.
    pub fn set_buffer(&mut self, kind: LayerKind, buffer: RgbaImage) -> Result<(), ParameterError> {
        if !kind.replaceable() {
            return Err(ParameterError::LayerNotReplaceable {
                kind: kind.name().to_string(),
            });
        }
        if buffer.dimensions() != (self.width, self.height) {
            return Err(ParameterError::InvalidDimensions {
                width: buffer.width(),
                height: buffer.height(),
            });
        }
        self.layer_mut(kind).set_buffer(Some(buffer));
        Ok(())
    }

    /// Swaps in a layer buffer unconditionally. Undo support: restoring a
    /// snapshot must succeed for any kind, including `None` content.
    pub fn replace_buffer(&mut self, kind: LayerKind, buffer: Option<RgbaImage>) {
        self.layer_mut(kind).set_buffer(buffer);
    }

    /// Flattens the stack bottom-to-top over a white ground.
    ///
    /// Each visible layer is source-over blended with its per-pixel alpha
    /// scaled by the layer opacity. Pure read; the output is always fully
    /// opaque.
    pub fn composite(&self) -> RgbaImage {
        let mut out = RgbaImage::from_pixel(self.width, self.height, Rgba([255, 255, 255, 255]));
        for kind in LayerKind::PAINT_ORDER {
            let layer = self.layer(kind);
            if !layer.visible() || layer.opacity() <= 0.0 {
                continue;
            }
            let Some(buffer) = layer.buffer() else {
                continue;
            };
            for (x, y, src) in buffer.enumerate_pixels() {
                let alpha = (src[3] as f64 / 255.0) * layer.opacity();
                if alpha <= 0.0 {
                    continue;
                }
                let dst = out.get_pixel_mut(x, y);
                for c in 0..3 {
                    let blended = src[c] as f64 * alpha + dst[c] as f64 * (1.0 - alpha);
                    dst[c] = blended.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        out
    }
}
