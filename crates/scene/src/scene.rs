use crate::actor::{Actor, PreloadError};
use crate::node::{Node, Phase};
use footlight_common::{Color, NodeId};
use footlight_render::{Surface, View};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scene-local environment applied to children each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Background the engine clears with while this scene is frontmost.
    pub background: Color,
    /// Acceleration applied to gravity-enabled actors, in units per second
    /// squared.
    pub gravity: Vec2,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            gravity: Vec2::ZERO,
        }
    }
}

/// A node owning an ordered registry of actors plus an environment.
///
/// Children tick and render only while the scene itself is enabled and
/// active. The registry is keyed by creation-ordered `NodeId`, so iteration
/// is deterministic and, for the usual create-then-add flow, follows
/// insertion order.
pub struct Scene {
    node: Node,
    actors: BTreeMap<NodeId, Actor>,
    environment: Environment,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_environment(Environment::default())
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self {
            node: Node::new(),
            actors: BTreeMap::new(),
            environment,
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

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Register an actor.
    ///
    /// On an active scene the actor is preloaded immediately; a preload
    /// failure leaves it unregistered. On a scene that has not started yet
    /// the actor waits for the startup fan-out. Either way the actor joins
    /// the next tick/render pass, never one already in progress.
    pub fn add_actor(&mut self, mut actor: Actor) -> Result<NodeId, PreloadError> {
        if self.node.phase() == Phase::Active {
            actor.preload()?;
        }
        let id = actor.id();
        self.actors.insert(id, actor);
        Ok(id)
    }

    pub fn actor(&self, id: NodeId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: NodeId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Actors in registry order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Preload every child, then activate the scene. Idempotent; the first
    /// failing child aborts.
    pub fn preload_all(&mut self) -> Result<(), PreloadError> {
        self.node.begin_preload();
        for actor in self.actors.values_mut() {
            actor.preload()?;
        }
        self.node.activate();
        Ok(())
    }

    /// Advance one fixed step: base lifecycle, then every enabled child with
    /// the same step and this scene's environment.
    pub fn tick(&mut self, step_ms: f64) {
        if !self.node.begin_tick() {
            return;
        }
        let environment = self.environment;
        for actor in self.actors.values_mut() {
            actor.tick(step_ms, &environment);
        }
    }

    /// Draw this frame: base lifecycle, then every enabled child with the
    /// same interpolation factor.
    pub fn render(&mut self, surface: &mut dyn Surface, view: &View, interpolation: f64) {
        if self.node.begin_render(interpolation).is_none() {
            return;
        }
        for actor in self.actors.values_mut() {
            actor.render(surface, view, interpolation);
        }
    }

    /// Remove every disposal-queued actor. Runs once per frame, after the
    /// render pass. Returns how many were removed.
    pub fn prune_disposed(&mut self) -> usize {
        let disposed: Vec<NodeId> = self
            .actors
            .iter()
            .filter(|(_, actor)| actor.node().is_disposal_queued())
            .map(|(id, _)| *id)
            .collect();
        for id in &disposed {
            if let Some(mut actor) = self.actors.remove(id) {
                actor.node_mut().mark_removed();
                tracing::trace!(actor = %id, "actor removed");
            }
        }
        disposed.len()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
