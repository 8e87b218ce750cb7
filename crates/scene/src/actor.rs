use crate::node::{Node, Phase};
use crate::scene::Environment;
use footlight_common::NodeId;
use footlight_render::{Surface, View};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Reason a collaborator could not prepare its resources.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct PreloadFailure(pub String);

/// Preload failure. Fatal to engine startup: the engine refuses to start (or
/// to register a late-added scene) when any node reports one.
#[derive(Debug, thiserror::Error)]
pub enum PreloadError {
    #[error("preload failed for node {node}")]
    Hook {
        node: NodeId,
        #[source]
        source: PreloadFailure,
    },
}

/// Collaborator seam. Texture systems, physics integrators, collision
/// responders and similar plug in exclusively through these three hooks; the
/// lifecycle core never calls into their internals.
pub trait ActorHooks {
    /// Prepare resources before the first tick. Runs during engine startup,
    /// or immediately when the actor joins a running engine.
    fn preload(&mut self) -> Result<(), PreloadFailure> {
        Ok(())
    }

    /// Advance collaborator state by one fixed step.
    fn internal_tick(&mut self, _node: &mut Node, _step_ms: f64) {}

    /// Draw at the interpolated, view-adjusted position.
    fn internal_render(
        &mut self,
        _node: &Node,
        _surface: &mut dyn Surface,
        _screen_position: Vec2,
        _interpolation: f64,
    ) {
    }
}

/// Sprite animation timing: a frame index advanced on a millisecond
/// accumulator. Bitmap data lives with the collaborator that draws it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteClip {
    frame_duration_ms: f64,
    frame_count: u32,
    accumulator: f64,
    frame: u32,
}

impl SpriteClip {
    /// A looping clip of `frame_count` frames shown `frame_duration_ms` each.
    pub fn new(frame_duration_ms: f64, frame_count: u32) -> Self {
        assert!(
            frame_duration_ms > 0.0 && frame_count > 0,
            "sprite clip needs a positive frame duration and at least one frame"
        );
        Self {
            frame_duration_ms,
            frame_count,
            accumulator: 0.0,
            frame: 0,
        }
    }

    /// Advance by one simulation step, looping past the last frame.
    pub fn advance(&mut self, step_ms: f64) {
        self.accumulator += step_ms;
        while self.accumulator >= self.frame_duration_ms {
            self.accumulator -= self.frame_duration_ms;
            self.frame = (self.frame + 1) % self.frame_count;
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }
}

/// A simulated object inside a scene.
///
/// Owns a [`Node`] lifecycle plus its specialization: velocity integration
/// with optional environment gravity, sprite-clip timing, and delegation to a
/// collaborator's hooks.
pub struct Actor {
    node: Node,
    gravity_enabled: bool,
    clip: Option<SpriteClip>,
    hooks: Option<Box<dyn ActorHooks>>,
}

impl Actor {
    pub fn new() -> Self {
        Self {
            node: Node::new(),
            gravity_enabled: false,
            clip: None,
            hooks: None,
        }
    }

    /// An actor whose specialization is delegated to the given collaborator.
    pub fn with_hooks<H: ActorHooks + 'static>(hooks: H) -> Self {
        Self {
            hooks: Some(Box::new(hooks)),
            ..Self::new()
        }
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    pub fn is_gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    /// Opt in to the scene environment's gravity.
    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.gravity_enabled = enabled;
    }

    pub fn clip(&self) -> Option<&SpriteClip> {
        self.clip.as_ref()
    }

    pub fn set_clip(&mut self, clip: Option<SpriteClip>) {
        self.clip = clip;
    }

    /// Run the collaborator's preload and activate the lifecycle.
    ///
    /// Idempotent for already-active actors; a disposal-queued actor is left
    /// alone to be pruned.
    pub fn preload(&mut self) -> Result<(), PreloadError> {
        if !matches!(self.node.phase(), Phase::Created | Phase::Preloading) {
            return Ok(());
        }
        self.node.begin_preload();
        if let Some(hooks) = &mut self.hooks {
            hooks.preload().map_err(|source| PreloadError::Hook {
                node: self.node.id(),
                source,
            })?;
        }
        self.node.activate();
        Ok(())
    }

    /// Advance one fixed step: base lifecycle, gravity, velocity
    /// integration, sprite timing, then the collaborator hook.
    pub fn tick(&mut self, step_ms: f64, environment: &Environment) {
        if !self.node.begin_tick() {
            return;
        }
        let dt = (step_ms / 1000.0) as f32;
        if self.gravity_enabled {
            let velocity = self.node.velocity() + environment.gravity * dt;
            self.node.set_velocity(velocity);
        }
        let delta = self.node.velocity() * dt;
        self.node.translate(delta);
        if let Some(clip) = &mut self.clip {
            clip.advance(step_ms);
        }
        if let Some(hooks) = &mut self.hooks {
            hooks.internal_tick(&mut self.node, step_ms);
        }
    }

    /// Draw this frame: base lifecycle resolves the blended position, the
    /// view maps it to screen space, then the collaborator draws.
    pub fn render(&mut self, surface: &mut dyn Surface, view: &View, interpolation: f64) {
        let Some(world) = self.node.begin_render(interpolation) else {
            return;
        };
        let screen = view.to_screen(world);
        if let Some(hooks) = &mut self.hooks {
            hooks.internal_render(&self.node, surface, screen, interpolation);
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footlight_common::SurfaceSize;
    use footlight_render::RecordingSurface;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CountingHooks {
        ticks: Rc<RefCell<u32>>,
        screens: Rc<RefCell<Vec<Vec2>>>,
    }

    impl ActorHooks for CountingHooks {
        fn internal_tick(&mut self, _node: &mut Node, _step_ms: f64) {
            *self.ticks.borrow_mut() += 1;
        }

        fn internal_render(
            &mut self,
            _node: &Node,
            _surface: &mut dyn Surface,
            screen_position: Vec2,
            _interpolation: f64,
        ) {
            self.screens.borrow_mut().push(screen_position);
        }
    }

    struct FailingPreload;

    impl ActorHooks for FailingPreload {
        fn preload(&mut self) -> Result<(), PreloadFailure> {
            Err(PreloadFailure("texture missing".into()))
        }
    }

    fn still_environment() -> Environment {
        Environment::default()
    }

    #[test]
    fn preload_activates() {
        let mut actor = Actor::new();
        assert_eq!(actor.node().phase(), Phase::Created);
        actor.preload().unwrap();
        assert_eq!(actor.node().phase(), Phase::Active);
        // Second call is a no-op.
        actor.preload().unwrap();
        assert_eq!(actor.node().phase(), Phase::Active);
    }

    #[test]
    fn preload_failure_names_the_node() {
        let mut actor = Actor::with_hooks(FailingPreload);
        let err = actor.preload().unwrap_err();
        let PreloadError::Hook { node, .. } = err;
        assert_eq!(node, actor.id());
        assert_ne!(actor.node().phase(), Phase::Active);
    }

    #[test]
    fn velocity_integrates_position() {
        let mut actor = Actor::new();
        actor.preload().unwrap();
        actor.node_mut().set_velocity(Vec2::new(60.0, 0.0));
        actor.tick(1000.0, &still_environment());
        assert_eq!(actor.node().position(), Vec2::new(60.0, 0.0));
    }

    #[test]
    fn gravity_accelerates_opted_in_actors() {
        let environment = Environment {
            gravity: Vec2::new(0.0, 10.0),
            ..Environment::default()
        };

        let mut falling = Actor::new();
        falling.preload().unwrap();
        falling.set_gravity_enabled(true);
        falling.tick(1000.0, &environment);
        assert_eq!(falling.node().velocity(), Vec2::new(0.0, 10.0));
        assert_eq!(falling.node().position(), Vec2::new(0.0, 10.0));

        let mut fixed = Actor::new();
        fixed.preload().unwrap();
        fixed.tick(1000.0, &environment);
        assert_eq!(fixed.node().velocity(), Vec2::ZERO);
    }

    #[test]
    fn clip_advances_with_ticks_and_loops() {
        let mut clip = SpriteClip::new(100.0, 3);
        clip.advance(250.0);
        assert_eq!(clip.frame(), 2);
        clip.advance(100.0);
        assert_eq!(clip.frame(), 0);
    }

    #[test]
    #[should_panic]
    fn clip_rejects_zero_frames() {
        let _ = SpriteClip::new(100.0, 0);
    }

    #[test]
    fn actor_advances_its_clip() {
        let mut actor = Actor::new();
        actor.preload().unwrap();
        actor.set_clip(Some(SpriteClip::new(50.0, 4)));
        actor.tick(120.0, &still_environment());
        assert_eq!(actor.clip().unwrap().frame(), 2);
    }

    #[test]
    fn hooks_receive_tick_and_screen_position() {
        let ticks = Rc::new(RefCell::new(0));
        let screens = Rc::new(RefCell::new(Vec::new()));
        let mut actor = Actor::with_hooks(CountingHooks {
            ticks: ticks.clone(),
            screens: screens.clone(),
        });
        actor.preload().unwrap();
        actor.node_mut().set_velocity(Vec2::new(10.0, 0.0));

        let mut surface = RecordingSurface::new(SurfaceSize::new(100, 100));
        let view = View {
            offset: Vec2::new(5.0, 0.0),
            scale: 1.0,
        };

        actor.tick(1000.0, &still_environment());
        actor.render(&mut surface, &view, 0.0);

        assert_eq!(*ticks.borrow(), 1);
        // World previous position is the origin at factor 0, shifted by the view.
        assert_eq!(*screens.borrow(), vec![Vec2::new(-5.0, 0.0)]);
    }

    #[test]
    fn disposal_queued_actor_ignores_tick_and_render() {
        let ticks = Rc::new(RefCell::new(0));
        let screens = Rc::new(RefCell::new(Vec::new()));
        let mut actor = Actor::with_hooks(CountingHooks {
            ticks: ticks.clone(),
            screens: screens.clone(),
        });
        actor.preload().unwrap();
        actor.node_mut().queue_disposal();

        let mut surface = RecordingSurface::new(SurfaceSize::new(100, 100));
        actor.tick(16.0, &still_environment());
        actor.render(&mut surface, &View::default(), 0.5);

        assert_eq!(*ticks.borrow(), 0);
        assert!(screens.borrow().is_empty());
    }
}
