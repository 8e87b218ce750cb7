use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Fixed simulation step, 60 updates per second.
pub const FIXED_STEP_MS: f64 = 1000.0 / 60.0;

/// Ticks allowed in one frame before the remaining lag is abandoned.
pub const MAX_TICKS_PER_FRAME: u32 = 240;

/// Outcome of draining the lag accumulator for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    /// Fixed steps to simulate this frame.
    pub ticks: u32,
    /// Whether lag beyond the ceiling was thrown away.
    pub discarded: bool,
}

/// Lag accumulator for the fixed-timestep loop.
///
/// Wall time is whatever the host passes in; the accumulator never reads a
/// clock itself, so frame sequences replay identically in tests.
///
/// # Invariants
/// - After `drain`, `lag < step`, so `interpolation` is always in `[0, 1)`.
/// - No frame simulates more than `max_ticks_per_frame` steps; overflow is
///   discarded, not carried into the next frame.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    step_ms: f64,
    max_ticks_per_frame: u32,
    previous_timestamp: Option<f64>,
    lag_ms: f64,
}

impl FrameTiming {
    pub fn new() -> Self {
        Self::with_limits(FIXED_STEP_MS, MAX_TICKS_PER_FRAME)
    }

    pub fn with_step(step_ms: f64) -> Self {
        Self::with_limits(step_ms, MAX_TICKS_PER_FRAME)
    }

    pub fn with_limits(step_ms: f64, max_ticks_per_frame: u32) -> Self {
        assert!(step_ms > 0.0, "fixed step must be positive");
        assert!(max_ticks_per_frame > 0, "tick ceiling must be positive");
        Self {
            step_ms,
            max_ticks_per_frame,
            previous_timestamp: None,
            lag_ms: 0.0,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    pub fn lag_ms(&self) -> f64 {
        self.lag_ms
    }

    /// Record a frame timestamp and return the elapsed wall time since the
    /// previous one. The first frame and a backwards-jumping clock both
    /// report 0.
    pub fn begin_frame(&mut self, timestamp_ms: f64) -> f64 {
        let elapsed = match self.previous_timestamp {
            Some(previous) => (timestamp_ms - previous).max(0.0),
            None => 0.0,
        };
        self.previous_timestamp = Some(timestamp_ms);
        elapsed
    }

    /// Add elapsed wall time to the lag. The engine skips this while paused,
    /// which is what freezes the simulation without freezing the clock.
    pub fn accumulate(&mut self, elapsed_ms: f64) {
        self.lag_ms += elapsed_ms;
    }

    /// Convert accumulated lag into a whole number of fixed steps.
    ///
    /// When the lag asks for more steps than the ceiling allows, the plan is
    /// capped there and the rest of the lag is reset to zero, so a long stall
    /// costs one burst of catch-up instead of a spiral.
    pub fn drain(&mut self) -> TickPlan {
        let needed = (self.lag_ms / self.step_ms).floor() as u64;
        if needed > u64::from(self.max_ticks_per_frame) {
            self.lag_ms = 0.0;
            return TickPlan {
                ticks: self.max_ticks_per_frame,
                discarded: true,
            };
        }
        let ticks = needed as u32;
        self.lag_ms = (self.lag_ms - f64::from(ticks) * self.step_ms).max(0.0);
        TickPlan {
            ticks,
            discarded: false,
        }
    }

    /// Fraction of a step the simulation is ahead of the render, in `[0, 1)`.
    pub fn interpolation(&self) -> f64 {
        self.lag_ms / self.step_ms
    }

    /// Forget the previous timestamp and all lag. Used on engine stop so a
    /// later restart does not see a giant first delta.
    pub fn reset(&mut self) {
        self.previous_timestamp = None;
        self.lag_ms = 0.0;
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame diagnostics snapshot, read through [`Engine::stats`].
///
/// [`Engine::stats`]: crate::Engine::stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Display rate derived from the last frame delta; 0 until two frames
    /// have been seen.
    pub fps: f64,
    pub lag_ms: f64,
    pub interpolation: f64,
    pub total_ticks: u64,
    pub ticks_last_frame: u32,
    /// Unpaused wall time accumulated since start.
    pub elapsed_ms: f64,
    pub scene_count: usize,
}

/// Host-side frame driver.
///
/// The engine calls `request_frame` once in `start` and again at the top of
/// every frame; the host answers each request with one `Engine::frame` call
/// at the next display refresh. Requesting before any frame work means a
/// stalled frame cannot silently unsubscribe the loop.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Counts requests instead of scheduling anything.
///
/// Tests and the CLI drive frames by hand and read the count to know whether
/// the engine still wants more. Clones share one counter.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    requests: Rc<Cell<u64>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.requests.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.requests.set(self.requests.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_elapses_nothing() {
        let mut timing = FrameTiming::with_step(10.0);
        assert_eq!(timing.begin_frame(5000.0), 0.0);
        assert_eq!(timing.begin_frame(5016.0), 16.0);
    }

    #[test]
    fn backwards_clock_clamps_to_zero() {
        let mut timing = FrameTiming::with_step(10.0);
        timing.begin_frame(100.0);
        assert_eq!(timing.begin_frame(40.0), 0.0);
    }

    #[test]
    fn drain_consumes_whole_steps_only() {
        let mut timing = FrameTiming::with_step(10.0);
        timing.accumulate(35.0);
        let plan = timing.drain();
        assert_eq!(plan, TickPlan { ticks: 3, discarded: false });
        assert!((timing.lag_ms() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn interpolation_stays_in_unit_range() {
        let mut timing = FrameTiming::with_step(16.0);
        for elapsed in [0.0, 3.5, 7.9, 15.99, 16.0, 16.01, 100.0, 997.3] {
            timing.accumulate(elapsed);
            timing.drain();
            let t = timing.interpolation();
            assert!((0.0..1.0).contains(&t), "interpolation {t} out of range");
        }
    }

    #[test]
    fn ceiling_caps_ticks_and_discards_lag() {
        let mut timing = FrameTiming::with_limits(10.0, 4);
        timing.accumulate(1000.0);
        let plan = timing.drain();
        assert_eq!(plan, TickPlan { ticks: 4, discarded: true });
        assert_eq!(timing.lag_ms(), 0.0);
        assert_eq!(timing.interpolation(), 0.0);
    }

    #[test]
    fn exactly_ceiling_steps_is_not_a_discard() {
        let mut timing = FrameTiming::with_limits(10.0, 4);
        timing.accumulate(40.0);
        let plan = timing.drain();
        assert_eq!(plan, TickPlan { ticks: 4, discarded: false });
    }

    #[test]
    fn reset_forgets_timestamp_and_lag() {
        let mut timing = FrameTiming::with_step(10.0);
        timing.begin_frame(0.0);
        timing.accumulate(25.0);
        timing.reset();
        assert_eq!(timing.lag_ms(), 0.0);
        // A restart must not interpret the downtime as lag.
        assert_eq!(timing.begin_frame(90_000.0), 0.0);
    }

    #[test]
    fn manual_scheduler_counts_shared_requests() {
        let scheduler = ManualScheduler::new();
        let mut clone = scheduler.clone();
        clone.request_frame();
        clone.request_frame();
        assert_eq!(scheduler.requests(), 2);
    }

    #[test]
    fn stats_serialize_round() {
        let stats = FrameStats {
            fps: 60.0,
            total_ticks: 42,
            ..FrameStats::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: FrameStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
