use crate::timing::{FrameScheduler, FrameStats, FrameTiming, TickPlan};
use footlight_common::{Color, NodeId, SurfaceSize};
use footlight_events::{
    CallbackId, CallbackRegistry, EngineEvent, EventKind, EventPayload, EventQueue,
};
use footlight_input::{InputTranslator, RawInput};
use footlight_render::{Surface, View, apply_device_pixel_ratio};
use footlight_scene::{Phase, PreloadError, Scene};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A scene or actor preload hook failed during startup fan-out.
    #[error("preload failed")]
    Preload(#[from] PreloadError),
}

/// Engine run state. Pausing freezes simulation and rendering but keeps the
/// frame loop subscribed; stopping unsubscribes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
    Paused,
}

/// World-to-screen mapping owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
}

impl Camera {
    pub fn view(&self) -> View {
        View {
            offset: self.position,
            scale: self.zoom,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

type TickHook = Box<dyn FnMut(f64)>;
type RenderHook = Box<dyn FnMut(&mut dyn Surface, f64)>;

/// The fixed-timestep engine: scene registry, event queue, camera, and the
/// per-frame update/render loop.
///
/// The engine is a plain value the host owns. It never reads a clock or
/// schedules itself; the host's [`FrameScheduler`] answers each
/// `request_frame` with one [`Engine::frame`] call carrying a timestamp.
///
/// # Invariants
/// - Ticks use the fixed step regardless of frame rate; rendering blends
///   between the last two ticks with an interpolation factor in `[0, 1)`.
/// - Paused frames neither accumulate lag nor draw; the queue gate is closed
///   so input cannot mutate queue state behind a paused simulation.
/// - Disposal pruning runs once per frame, after tick and render, so no
///   registry changes mid-pass.
pub struct Engine<S: Surface> {
    surface: S,
    scheduler: Box<dyn FrameScheduler>,
    timing: FrameTiming,
    scenes: BTreeMap<NodeId, Scene>,
    queue: EventQueue,
    callbacks: CallbackRegistry,
    translator: InputTranslator,
    camera: Camera,
    state: EngineState,
    accepting_input: bool,
    logical_size: SurfaceSize,
    device_pixel_ratio: f32,
    overlay_enabled: bool,
    tick_hook: Option<TickHook>,
    render_hook: Option<RenderHook>,
    stats: FrameStats,
}

impl<S: Surface> Engine<S> {
    pub fn new(surface: S, scheduler: Box<dyn FrameScheduler>) -> Self {
        Self::with_timing(surface, scheduler, FrameTiming::new())
    }

    /// Construct with explicit timing limits. Tests use coarse steps and low
    /// ceilings to keep frame sequences short.
    pub fn with_timing(
        surface: S,
        scheduler: Box<dyn FrameScheduler>,
        timing: FrameTiming,
    ) -> Self {
        let logical_size = surface.size();
        Self {
            surface,
            scheduler,
            timing,
            scenes: BTreeMap::new(),
            queue: EventQueue::new(),
            callbacks: CallbackRegistry::new(),
            translator: InputTranslator::new(),
            camera: Camera::default(),
            state: EngineState::Stopped,
            accepting_input: false,
            logical_size,
            device_pixel_ratio: 1.0,
            overlay_enabled: false,
            tick_hook: None,
            render_hook: None,
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Pixel density the backing store is scaled by on start and on resize.
    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        assert!(ratio > 0.0, "device pixel ratio must be positive");
        self.device_pixel_ratio = ratio;
    }

    /// Toggle the diagnostics marker drawn after each render pass.
    pub fn set_overlay(&mut self, enabled: bool) {
        self.overlay_enabled = enabled;
    }

    /// Hook run once per tick, after the scenes, with the fixed step.
    pub fn set_tick_hook<F: FnMut(f64) + 'static>(&mut self, hook: F) {
        self.tick_hook = Some(Box::new(hook));
    }

    /// Hook run once per rendered frame, after the scenes, with the surface
    /// and the interpolation factor.
    pub fn set_render_hook<F: FnMut(&mut dyn Surface, f64) + 'static>(&mut self, hook: F) {
        self.render_hook = Some(Box::new(hook));
    }

    /// Register a scene.
    ///
    /// On a stopped engine the scene waits for the startup fan-out; otherwise
    /// it preloads immediately and a failure leaves it unregistered. Either
    /// way it joins the next pass, never one in progress.
    pub fn add_scene(&mut self, mut scene: Scene) -> Result<NodeId, EngineError> {
        if self.state != EngineState::Stopped {
            scene.preload_all()?;
        }
        let id = scene.id();
        self.scenes.insert(id, scene);
        tracing::debug!(scene = %id, "scene added");
        Ok(id)
    }

    pub fn scene(&self, id: NodeId) -> Option<&Scene> {
        self.scenes.get(&id)
    }

    pub fn scene_mut(&mut self, id: NodeId) -> Option<&mut Scene> {
        self.scenes.get_mut(&id)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Registered scenes in registry order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    /// Preload every scene, rescale the backing store, open the queue gate,
    /// and request the first frame.
    ///
    /// The first failing preload aborts and the engine stays stopped.
    ///
    /// # Panics
    ///
    /// Panics when the engine is already started.
    pub fn start(&mut self) -> Result<(), EngineError> {
        assert!(self.state == EngineState::Stopped, "engine already started");
        let _span = tracing::info_span!("engine_start").entered();
        for scene in self.scenes.values_mut() {
            scene.preload_all()?;
        }
        apply_device_pixel_ratio(&mut self.surface, self.logical_size, self.device_pixel_ratio);
        self.state = EngineState::Running;
        self.queue.set_accepting(true);
        self.attach_input();
        self.scheduler.request_frame();
        tracing::info!(scenes = self.scenes.len(), "engine started");
        Ok(())
    }

    /// Stop the loop. Takes effect at the next frame invocation, which
    /// returns without re-requesting. Timing, held input, and the queue are
    /// reset so a later `start` begins clean.
    pub fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            return;
        }
        self.state = EngineState::Stopped;
        self.detach_input();
        self.timing.reset();
        tracing::info!("engine stopped");
    }

    /// Freeze simulation and rendering. The frame loop stays subscribed and
    /// keeps measuring wall time; lag simply stops accumulating, which is
    /// what keeps the interpolation factor bounded across a pause.
    pub fn pause(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        self.state = EngineState::Paused;
        self.queue.set_accepting(false);
        tracing::debug!("engine paused");
    }

    pub fn resume(&mut self) {
        if self.state != EngineState::Paused {
            return;
        }
        self.state = EngineState::Running;
        self.queue.set_accepting(true);
        tracing::debug!("engine resumed");
    }

    /// Queue an event directly, bypassing input translation. Returns whether
    /// the queue took it.
    pub fn dispatch_event(&mut self, event: EngineEvent) -> bool {
        self.queue.dispatch(event)
    }

    pub fn register_callback<F>(&mut self, kind: EventKind, callback: F) -> CallbackId
    where
        F: FnMut(&EventPayload) + 'static,
    {
        self.callbacks.register(kind, callback)
    }

    pub fn unregister_callback(&mut self, kind: EventKind, id: CallbackId) -> bool {
        self.callbacks.unregister(kind, id)
    }

    /// Open the raw-input path. `start` attaches automatically; hosts call
    /// this to reopen after an explicit detach.
    pub fn attach_input(&mut self) {
        self.accepting_input = true;
    }

    /// Close the raw-input path, forget held keys and buttons, and drop the
    /// queue including held events. `stop` detaches automatically.
    pub fn detach_input(&mut self) {
        self.accepting_input = false;
        self.translator.reset();
        self.queue.clear();
    }

    /// Translate one host notification and queue the resulting events.
    ///
    /// A resize additionally rescales the backing store immediately; the
    /// queued `SurfaceResize` event still goes through dispatch like any
    /// other, so observers see it on the next tick.
    pub fn handle_input(&mut self, raw: RawInput) -> bool {
        if !self.accepting_input {
            return false;
        }
        let mut queued = false;
        for event in self.translator.translate(raw) {
            queued |= self.queue.dispatch(event);
        }
        if let RawInput::Resized(size) = raw {
            self.logical_size = size;
            apply_device_pixel_ratio(&mut self.surface, size, self.device_pixel_ratio);
        }
        queued
    }

    /// Run one frame at the given host timestamp.
    ///
    /// Order within the frame: re-request the next frame, accumulate elapsed
    /// time (unless paused), drain whole fixed steps (dispatching the queue
    /// before each tick), render every scene with the leftover-lag
    /// interpolation factor (unless paused), then prune disposal-queued
    /// scenes and actors.
    pub fn frame(&mut self, timestamp_ms: f64) {
        if self.state == EngineState::Stopped {
            return;
        }
        let _span = tracing::info_span!("frame", timestamp_ms).entered();
        self.scheduler.request_frame();

        let elapsed = self.timing.begin_frame(timestamp_ms);
        self.stats.fps = if elapsed > 0.0 { 1000.0 / elapsed } else { 0.0 };

        let paused = self.state == EngineState::Paused;
        if !paused {
            self.timing.accumulate(elapsed);
            self.stats.elapsed_ms += elapsed;
        }

        let plan = if paused {
            TickPlan {
                ticks: 0,
                discarded: false,
            }
        } else {
            self.timing.drain()
        };
        let step = self.timing.step_ms();
        for _ in 0..plan.ticks {
            self.queue.dispatch_queue(&mut self.callbacks);
            for scene in self.scenes.values_mut() {
                scene.tick(step);
            }
            if let Some(hook) = &mut self.tick_hook {
                hook(step);
            }
        }
        if plan.discarded {
            tracing::warn!(
                ticks = plan.ticks,
                "tick ceiling reached, remaining lag discarded"
            );
        }
        self.stats.total_ticks += u64::from(plan.ticks);
        self.stats.ticks_last_frame = plan.ticks;
        self.stats.lag_ms = self.timing.lag_ms();
        self.stats.interpolation = self.timing.interpolation();

        if !paused {
            self.surface.clear(self.background());
            let view = self.camera.view();
            let interpolation = self.stats.interpolation;
            for scene in self.scenes.values_mut() {
                scene.render(&mut self.surface, &view, interpolation);
            }
            if let Some(hook) = &mut self.render_hook {
                hook(&mut self.surface, interpolation);
            }
            if self.overlay_enabled {
                let label = format!(
                    "fps {:.0} ticks {} lag {:.1}ms",
                    self.stats.fps, self.stats.total_ticks, self.stats.lag_ms
                );
                self.surface.draw_marker(Vec2::ZERO, &label);
            }
        }

        self.prune();
        self.stats.scene_count = self.scenes.len();
    }

    /// Background of the frontmost renderable scene, or black.
    fn background(&self) -> Color {
        self.scenes
            .values()
            .find(|s| s.node().phase() == Phase::Active && s.node().is_render_enabled())
            .map(|s| s.environment().background)
            .unwrap_or(Color::BLACK)
    }

    fn prune(&mut self) {
        let before = self.scenes.len();
        self.scenes.retain(|_, scene| !scene.node().is_disposal_queued());
        let removed = before - self.scenes.len();
        if removed > 0 {
            tracing::debug!(removed, "scenes pruned");
        }
        for scene in self.scenes.values_mut() {
            scene.prune_disposed();
        }
    }
}
