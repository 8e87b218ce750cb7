use footlight_common::NodeId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a node.
///
/// `Created → Preloading → Active → QueuedForDisposal → Removed`. Any caller
/// may request disposal; the owning registry performs the removal once per
/// frame after the render pass, never mid-iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Created,
    Preloading,
    Active,
    QueuedForDisposal,
    Removed,
}

/// Snapshot of the interpolation-relevant state, taken at the start of the
/// most recent tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub scale: Vec2,
}

/// The shared tick/render/dispose lifecycle unit under every scene and actor.
///
/// Rendering blends between the previous tick's position and the current one,
/// so motion stays smooth even though ticks run at a lower rate than frames.
/// `set_position` is a teleport: it suppresses that blend for exactly one
/// render so an explicit reposition is never smeared across a frame.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    scale: Vec2,
    previous: MotionSnapshot,
    tick_enabled: bool,
    render_enabled: bool,
    interpolate: bool,
    phase: Phase,
}

impl Node {
    pub fn new() -> Self {
        let position = Vec2::ZERO;
        let velocity = Vec2::ZERO;
        let scale = Vec2::ONE;
        Self {
            id: NodeId::next(),
            position,
            velocity,
            rotation: 0.0,
            scale,
            previous: MotionSnapshot {
                position,
                velocity,
                scale,
            },
            tick_enabled: true,
            render_enabled: true,
            interpolate: true,
            phase: Phase::Created,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// State snapshot from the start of the most recent tick.
    pub fn previous(&self) -> &MotionSnapshot {
        &self.previous
    }

    pub fn is_tick_enabled(&self) -> bool {
        self.tick_enabled
    }

    pub fn set_tick_enabled(&mut self, enabled: bool) {
        self.tick_enabled = enabled;
    }

    pub fn is_render_enabled(&self) -> bool {
        self.render_enabled
    }

    pub fn set_render_enabled(&mut self, enabled: bool) {
        self.render_enabled = enabled;
    }

    pub fn is_disposal_queued(&self) -> bool {
        self.phase == Phase::QueuedForDisposal
    }

    /// Teleport: overwrite the position now and draw exactly it on the next
    /// render, with no blend from the previous state.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.interpolate = false;
    }

    /// Move by a delta without touching the interpolation state. Regular
    /// per-tick motion goes through here.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Request removal. The owning registry prunes after the render pass;
    /// repeated calls are no-ops.
    pub fn queue_disposal(&mut self) {
        if matches!(self.phase, Phase::QueuedForDisposal | Phase::Removed) {
            return;
        }
        self.phase = Phase::QueuedForDisposal;
    }

    pub(crate) fn begin_preload(&mut self) {
        if self.phase == Phase::Created {
            self.phase = Phase::Preloading;
        }
    }

    pub(crate) fn activate(&mut self) {
        if matches!(self.phase, Phase::Created | Phase::Preloading) {
            self.phase = Phase::Active;
        }
    }

    pub(crate) fn mark_removed(&mut self) {
        self.phase = Phase::Removed;
    }

    /// Shared start-of-tick work: snap denormal drift to zero, then snapshot
    /// the state the next render interpolates from.
    ///
    /// Returns `false` when the node must not tick this step (tick-disabled,
    /// not yet active, or disposal queued).
    pub fn begin_tick(&mut self) -> bool {
        if !self.tick_enabled || self.phase != Phase::Active {
            return false;
        }
        self.position = snap_to_zero(self.position);
        self.velocity = snap_to_zero(self.velocity);
        self.previous = MotionSnapshot {
            position: self.position,
            velocity: self.velocity,
            scale: self.scale,
        };
        true
    }

    /// Shared start-of-render work: resolve the position to draw this frame.
    ///
    /// Returns `None` when the node must not render (render-disabled, not yet
    /// active, or disposal queued). Interpolation is re-enabled
    /// unconditionally after every render, so a teleport suppresses exactly
    /// one frame.
    pub fn begin_render(&mut self, interpolation: f64) -> Option<Vec2> {
        if !self.render_enabled || self.phase != Phase::Active {
            return None;
        }
        let drawn = if self.interpolate {
            self.previous.position
                + (self.position - self.previous.position) * interpolation as f32
        } else {
            self.position
        };
        self.interpolate = true;
        Some(drawn)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// Snap components with magnitude below machine epsilon to exactly zero.
/// Near rest, denormal drift otherwise accumulates into visible jitter.
fn snap_to_zero(v: Vec2) -> Vec2 {
    Vec2::new(
        if v.x.abs() < f32::EPSILON { 0.0 } else { v.x },
        if v.y.abs() < f32::EPSILON { 0.0 } else { v.y },
    )
}
