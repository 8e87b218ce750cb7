//! Shared identifiers and value types for the footlight engine workspace.
//!
//! # Invariants
//! - `NodeId` allocation is monotonic; creation order equals `Ord` order.
//! - Types here carry no behavior beyond construction and formatting.

pub mod types;

pub use types::{Color, KeyCode, NodeId, PointerButton, SurfaceSize};

pub fn crate_info() -> &'static str {
    "footlight-common v0.1.0"
}
