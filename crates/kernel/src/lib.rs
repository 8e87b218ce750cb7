//! Engine kernel: fixed-timestep loop, scene registry, and frame scheduling.
//!
//! # Invariants
//! - Simulation advances in fixed steps; rendering interpolates between the
//!   last two steps.
//! - Within a frame, ticks precede the render and pruning follows both.
//! - All state mutations flow through explicit engine operations.

pub mod engine;
pub mod timing;

pub use engine::{Camera, Engine, EngineError, EngineState};
pub use timing::{
    FIXED_STEP_MS, FrameScheduler, FrameStats, FrameTiming, MAX_TICKS_PER_FRAME, ManualScheduler,
    TickPlan,
};

pub fn crate_info() -> &'static str {
    "footlight-kernel v0.1.0"
}
