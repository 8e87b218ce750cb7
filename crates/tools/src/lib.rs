//! Developer Tooling: engine inspector and diagnostics formatting.
//!
//! # Invariants
//! - Tools are read-only; nothing here mutates engine state.

pub mod inspector;

pub use inspector::{EngineInspector, EngineSummary, SceneInfo};

pub fn crate_info() -> &'static str {
    "footlight-tools v0.1.0"
}
