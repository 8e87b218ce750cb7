use clap::{Parser, Subcommand};
use footlight_common::{Color, KeyCode, SurfaceSize};
use footlight_events::{CallbackRegistry, EventKind, EventPayload, EventQueue, NEGATOR_RULES};
use footlight_input::{InputTranslator, RawInput};
use footlight_kernel::{Engine, FrameTiming, ManualScheduler};
use footlight_render::{RecordingSurface, Surface};
use footlight_scene::{Actor, ActorHooks, Environment, Node, Scene, SpriteClip};
use footlight_tools::EngineInspector;
use glam::Vec2;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "footlight-cli", about = "CLI driver for the footlight engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Run a headless demo scene for a number of frames
    Run {
        /// Number of frames to drive
        #[arg(short, long, default_value = "120")]
        frames: u32,
        /// Wall milliseconds between frame timestamps
        #[arg(long, default_value = "16.7")]
        frame_ms: f64,
        /// Fixed simulation step in milliseconds
        #[arg(long, default_value = "16.666666666666668")]
        step_ms: f64,
        /// Draw the diagnostics marker each frame
        #[arg(long)]
        overlay: bool,
        /// Print the final summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Demonstrate press/hold/release queue semantics
    Events,
}

/// Demo actor: a square that falls under scene gravity and bounces off a
/// floor line, losing a little energy each bounce.
struct Bouncer {
    floor_y: f32,
    extent: Vec2,
    color: Color,
}

impl ActorHooks for Bouncer {
    fn internal_tick(&mut self, node: &mut Node, _step_ms: f64) {
        let velocity = node.velocity();
        if node.position().y >= self.floor_y && velocity.y > 0.0 {
            node.set_velocity(Vec2::new(velocity.x, -velocity.y * 0.8));
        }
    }

    fn internal_render(
        &mut self,
        _node: &Node,
        surface: &mut dyn Surface,
        screen_position: Vec2,
        _interpolation: f64,
    ) {
        surface.fill_rect(screen_position, self.extent, self.color);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("footlight-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", footlight_common::crate_info());
            println!("events: {}", footlight_events::crate_info());
            println!("render: {}", footlight_render::crate_info());
            println!("scene: {}", footlight_scene::crate_info());
            println!("input: {}", footlight_input::crate_info());
            println!("kernel: {}", footlight_kernel::crate_info());
            println!("tools: {}", footlight_tools::crate_info());
        }
        Commands::Run {
            frames,
            frame_ms,
            step_ms,
            overlay,
            json,
        } => {
            run_demo(frames, frame_ms, step_ms, overlay, json)?;
        }
        Commands::Events => {
            events_demo();
        }
    }

    Ok(())
}

fn run_demo(
    frames: u32,
    frame_ms: f64,
    step_ms: f64,
    overlay: bool,
    json: bool,
) -> anyhow::Result<()> {
    tracing::info!(frames, frame_ms, step_ms, "starting headless demo");
    let scheduler = ManualScheduler::new();
    let mut engine = Engine::with_timing(
        RecordingSurface::new(SurfaceSize::new(640, 360)),
        Box::new(scheduler.clone()),
        FrameTiming::with_step(step_ms),
    );
    engine.set_overlay(overlay);

    let mut scene = Scene::with_environment(Environment {
        background: Color::rgb(16, 16, 32),
        gravity: Vec2::new(0.0, 600.0),
    });
    let mut ball = Actor::with_hooks(Bouncer {
        floor_y: 320.0,
        extent: Vec2::new(16.0, 16.0),
        color: Color::rgb(240, 196, 25),
    });
    ball.set_gravity_enabled(true);
    ball.node_mut().set_velocity(Vec2::new(90.0, 0.0));
    ball.set_clip(Some(SpriteClip::new(100.0, 4)));
    let ball_id = scene.add_actor(ball)?;
    let scene_id = engine.add_scene(scene)?;

    engine.start()?;
    let mut now = 0.0;
    for _ in 0..frames {
        engine.frame(now);
        now += frame_ms;
    }

    let summary = EngineInspector::summary(&engine);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Demo: {frames} frames at {frame_ms} ms, fixed step {step_ms} ms");
    println!("{summary}");
    if let Some(info) = EngineInspector::inspect_scene(&engine, scene_id) {
        println!("{info}");
    }
    if let Some(ball) = engine.scene(scene_id).and_then(|s| s.actor(ball_id)) {
        let p = ball.node().position();
        let frame = ball.clip().map_or(0, SpriteClip::frame);
        println!("Ball: pos=({:.1}, {:.1}) clip_frame={frame}", p.x, p.y);
    }
    println!("Surface: {}", engine.surface().summary());
    println!("Frame requests answered: {}", scheduler.requests());
    Ok(())
}

fn events_demo() {
    println!("Event queue demo: a key goes down, repeats, and comes back up");

    let mut queue = EventQueue::new();
    let mut registry = CallbackRegistry::new();
    registry.register(EventKind::KeyHold, |payload| {
        if let EventPayload::Key { key } = payload {
            println!("  callback: key {} still held", key.0);
        }
    });

    let mut translator = InputTranslator::new();
    let space = KeyCode(32);

    for event in translator.translate(RawInput::KeyDown(space)) {
        let queued = queue.dispatch(event.clone());
        println!(
            "down  -> {:?} persistent={} queued={queued}",
            event.kind, event.persistent
        );
    }
    let repeats = translator.translate(RawInput::KeyDown(space));
    println!("auto-repeat while held produced {} events", repeats.len());

    println!("dispatch round 1 (press fires once, hold persists):");
    queue.dispatch_queue(&mut registry);
    println!("dispatch round 2 (only the hold remains):");
    queue.dispatch_queue(&mut registry);
    println!("queued after two rounds: {}", queue.len());

    for event in translator.translate(RawInput::KeyUp(space)) {
        queue.dispatch(event.clone());
        println!("up    -> {:?} negates the held key", event.kind);
    }
    queue.dispatch_queue(&mut registry);
    println!("queued after release round: {}", queue.len());

    println!("Negation table:");
    for rule in NEGATOR_RULES {
        println!(
            "  {:?} / {:?} cleared by {:?}",
            rule.press, rule.hold, rule.release
        );
    }
}
