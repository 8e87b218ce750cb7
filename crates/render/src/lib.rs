//! Rendering boundary: surface-agnostic drawing interface.
//!
//! # Invariants
//! - The surface is written only during the render phase.
//! - Drawing never feeds back into simulation state or timing.
//!
//! # Workaround
//! Ships a recording surface as a workaround for a canvas/GPU backend. The
//! trait is stable; a windowed backend can be swapped in without changing
//! consumers.

mod surface;

pub use surface::{DrawOp, RecordingSurface, Surface, View, apply_device_pixel_ratio};

pub fn crate_info() -> &'static str {
    "footlight-render v0.1.0"
}
