use footlight_common::NodeId;
use footlight_kernel::{Engine, EngineState};
use footlight_render::Surface;
use footlight_scene::{Phase, Scene};
use serde::Serialize;

/// Engine inspector for developer tooling.
///
/// Read-only queries against a live engine for debugging overlays, the CLI,
/// and development UI.
pub struct EngineInspector;

impl EngineInspector {
    /// Produce a summary of the engine's loop state and registries.
    pub fn summary<S: Surface>(engine: &Engine<S>) -> EngineSummary {
        let stats = engine.stats();
        EngineSummary {
            state: state_label(engine.state()),
            fps: stats.fps,
            interpolation: stats.interpolation,
            lag_ms: stats.lag_ms,
            total_ticks: stats.total_ticks,
            elapsed_ms: stats.elapsed_ms,
            scene_count: engine.scene_count(),
            queued_events: engine.queue().len(),
        }
    }

    /// Inspect one registered scene.
    pub fn inspect_scene<S: Surface>(engine: &Engine<S>, id: NodeId) -> Option<SceneInfo> {
        engine.scene(id).map(|scene| SceneInfo {
            id,
            phase: phase_label(scene.node().phase()),
            actor_count: scene.actor_count(),
            tick_enabled: scene.node().is_tick_enabled(),
            render_enabled: scene.node().is_render_enabled(),
        })
    }

    /// List all registered scene ids, in registry order.
    pub fn list_scenes<S: Surface>(engine: &Engine<S>) -> Vec<NodeId> {
        engine.scenes().map(Scene::id).collect()
    }
}

fn state_label(state: EngineState) -> &'static str {
    match state {
        EngineState::Stopped => "stopped",
        EngineState::Running => "running",
        EngineState::Paused => "paused",
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Created => "created",
        Phase::Preloading => "preloading",
        Phase::Active => "active",
        Phase::QueuedForDisposal => "queued-for-disposal",
        Phase::Removed => "removed",
    }
}

/// Summary of engine state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    pub state: &'static str,
    pub fps: f64,
    pub interpolation: f64,
    pub lag_ms: f64,
    pub total_ticks: u64,
    pub elapsed_ms: f64,
    pub scene_count: usize,
    pub queued_events: usize,
}

impl std::fmt::Display for EngineSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Engine: state={} fps={:.1} ticks={} lag={:.2}ms interp={:.3} scenes={} queued={}",
            self.state,
            self.fps,
            self.total_ticks,
            self.lag_ms,
            self.interpolation,
            self.scene_count,
            self.queued_events
        )
    }
}

/// Detailed info about a single scene.
#[derive(Debug, Clone, Serialize)]
pub struct SceneInfo {
    pub id: NodeId,
    pub phase: &'static str,
    pub actor_count: usize,
    pub tick_enabled: bool,
    pub render_enabled: bool,
}

impl std::fmt::Display for SceneInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene {} phase={} actors={} tick={} render={}",
            self.id, self.phase, self.actor_count, self.tick_enabled, self.render_enabled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footlight_common::SurfaceSize;
    use footlight_kernel::{FrameTiming, ManualScheduler};
    use footlight_render::RecordingSurface;
    use footlight_scene::Actor;

    fn engine() -> Engine<RecordingSurface> {
        Engine::with_timing(
            RecordingSurface::new(SurfaceSize::new(64, 64)),
            Box::new(ManualScheduler::new()),
            FrameTiming::with_step(10.0),
        )
    }

    #[test]
    fn summary_of_idle_engine() {
        let engine = engine();
        let summary = EngineInspector::summary(&engine);
        assert_eq!(summary.state, "stopped");
        assert_eq!(summary.total_ticks, 0);
        assert_eq!(summary.scene_count, 0);
    }

    #[test]
    fn summary_tracks_running_engine() {
        let mut engine = engine();
        let mut scene = Scene::new();
        scene.add_actor(Actor::new()).unwrap();
        engine.add_scene(scene).unwrap();
        engine.start().unwrap();
        engine.frame(0.0);
        engine.frame(35.0);

        let summary = EngineInspector::summary(&engine);
        assert_eq!(summary.state, "running");
        assert_eq!(summary.total_ticks, 3);
        assert_eq!(summary.scene_count, 1);
    }

    #[test]
    fn inspect_scene_found() {
        let mut engine = engine();
        let mut scene = Scene::new();
        scene.add_actor(Actor::new()).unwrap();
        scene.add_actor(Actor::new()).unwrap();
        let id = engine.add_scene(scene).unwrap();
        engine.start().unwrap();

        let info = EngineInspector::inspect_scene(&engine, id).unwrap();
        assert_eq!(info.phase, "active");
        assert_eq!(info.actor_count, 2);
        assert!(info.tick_enabled);
    }

    #[test]
    fn inspect_scene_not_found() {
        let engine = engine();
        assert!(EngineInspector::inspect_scene(&engine, NodeId::next()).is_none());
    }

    #[test]
    fn list_scenes_in_registry_order() {
        let mut engine = engine();
        let a = engine.add_scene(Scene::new()).unwrap();
        let b = engine.add_scene(Scene::new()).unwrap();
        assert_eq!(EngineInspector::list_scenes(&engine), vec![a, b]);
    }

    #[test]
    fn summary_display_and_json() {
        let engine = engine();
        let summary = EngineInspector::summary(&engine);
        let line = format!("{summary}");
        assert!(line.contains("state=stopped"));

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"scene_count\":0"));
    }
}
