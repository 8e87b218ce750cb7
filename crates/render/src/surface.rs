use footlight_common::{Color, SurfaceSize};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A drawing operation, as recorded by the headless surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    Clear {
        background: Color,
    },
    Rect {
        origin: Vec2,
        extent: Vec2,
        color: Color,
    },
    Marker {
        position: Vec2,
        label: String,
    },
}

/// View transform applied to world positions during a render pass.
///
/// Produced by the engine's camera; consumers only ever map world space to
/// screen space through it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// World position at the top-left of the surface.
    pub offset: Vec2,
    pub scale: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl View {
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.offset) * self.scale
    }
}

/// The drawing-surface boundary.
///
/// The engine writes to the surface only during the render phase; collaborator
/// hooks receive it as `&mut dyn Surface` and never retain it. The surface
/// never participates in timing.
pub trait Surface {
    /// Current backing-store size in physical pixels.
    fn size(&self) -> SurfaceSize;

    /// Resize the backing store.
    fn set_size(&mut self, size: SurfaceSize);

    /// Device-pixel-ratio applied to the backing store.
    fn scale_factor(&self) -> f32;

    fn set_scale_factor(&mut self, factor: f32);

    /// Wipe the surface to the given background at the start of a render
    /// pass.
    fn clear(&mut self, background: Color);

    fn fill_rect(&mut self, origin: Vec2, extent: Vec2, color: Color);

    /// Draw a labelled marker. The recording surface keeps the label; a real
    /// backend may rasterize it or ignore it.
    fn draw_marker(&mut self, position: Vec2, label: &str);
}

/// Recompute a surface's backing store for a logical size and
/// device-pixel-ratio. Runs at engine start and again on every resize event.
pub fn apply_device_pixel_ratio(surface: &mut dyn Surface, logical: SurfaceSize, ratio: f32) {
    assert!(ratio > 0.0, "device pixel ratio must be positive");
    surface.set_scale_factor(ratio);
    surface.set_size(logical.scaled(ratio));
    tracing::debug!(?logical, ratio, "surface backing store rescaled");
}

/// Headless surface standing in for a canvas/GPU backend.
///
/// Records every operation in order; tests assert against the log and the
/// CLI prints a summary of it. A windowed backend can replace it without
/// changing consumers.
#[derive(Debug)]
pub struct RecordingSurface {
    size: SurfaceSize,
    scale_factor: f32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            scale_factor: 1.0,
            ops: Vec::new(),
        }
    }

    /// Operations recorded since the last take, in draw order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded operations.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Short human-readable description of the recorded frame.
    pub fn summary(&self) -> String {
        let clears = self
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Clear { .. }))
            .count();
        let rects = self
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { .. }))
            .count();
        let markers = self
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Marker { .. }))
            .count();
        format!(
            "surface {}x{} @{:.2}: {} ops ({} clear, {} rect, {} marker)",
            self.size.width,
            self.size.height,
            self.scale_factor,
            self.ops.len(),
            clears,
            rects,
            markers
        )
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    fn set_scale_factor(&mut self, factor: f32) {
        self.scale_factor = factor;
    }

    fn clear(&mut self, background: Color) {
        self.ops.push(DrawOp::Clear { background });
    }

    fn fill_rect(&mut self, origin: Vec2, extent: Vec2, color: Color) {
        self.ops.push(DrawOp::Rect {
            origin,
            extent,
            color,
        });
    }

    fn draw_marker(&mut self, position: Vec2, label: &str) {
        self.ops.push(DrawOp::Marker {
            position,
            label: label.to_owned(),
        });
    }
}
