//! Scene graph: node lifecycle, actors with behavior hooks, scene registries.
//!
//! # Invariants
//! - A node ticks and renders only while Active and enabled.
//! - Disposal is deferred: queueing never mutates a registry mid-pass.
//! - Registry iteration order is deterministic (BTreeMap over creation ids).

pub mod actor;
pub mod node;
pub mod scene;

pub use actor::{Actor, ActorHooks, PreloadError, PreloadFailure, SpriteClip};
pub use node::{Node, Phase};
pub use scene::{Environment, Scene};

pub fn crate_info() -> &'static str {
    "footlight-scene v0.1.0"
}
