//! Time facilities for the tick loop.
//!
//! The core never owns a scheduling primitive. It only asks a [`Clock`] for
//! the current instant and turns consecutive readings into elapsed-time
//! deltas, capped at [`MAX_ELAPSED_MS`] so a stalled host produces slow
//! particles instead of one enormous burst.
//!
//! # Example
//!
//! ```
//! use flurry::time::{FrameTimer, ManualClock};
//! use std::rc::Rc;
//!
//! let clock = ManualClock::new();
//! let mut timer = FrameTimer::new(Rc::new(clock.clone()));
//!
//! clock.advance(16.0);
//! assert_eq!(timer.tick(), 16.0);
//!
//! // A two second stall is capped.
//! clock.advance(2000.0);
//! assert_eq!(timer.tick(), 500.0);
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Largest simulation step, in milliseconds, the core will ever apply.
pub const MAX_ELAPSED_MS: f32 = 500.0;

/// Cap an elapsed-time delta at [`MAX_ELAPSED_MS`].
///
/// A non-finite delta becomes 0. Negative deltas are passed through
/// untouched; callers must not produce them.
#[inline]
pub fn clamp_elapsed(elapsed_ms: f32) -> f32 {
    if !elapsed_ms.is_finite() {
        log::debug!("ignoring non-finite elapsed time {}", elapsed_ms);
        0.0
    } else if elapsed_ms > MAX_ELAPSED_MS {
        log::debug!(
            "capping elapsed time at {} ms (was {} ms)",
            MAX_ELAPSED_MS,
            elapsed_ms
        );
        MAX_ELAPSED_MS
    } else {
        elapsed_ms
    }
}

/// A monotonic source of "now", in milliseconds.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed epoch.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a host can keep one handle and give
/// another to a [`FrameTimer`] or a [`TimerQueue`](crate::scheduler::TimerQueue).
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `ms`.
    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    /// Jump to an absolute reading.
    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Frame timing against a [`Clock`].
///
/// Each [`tick`](FrameTimer::tick) reports the capped time since the previous
/// tick, counts frames and keeps a periodic FPS estimate.
pub struct FrameTimer {
    clock: Rc<dyn Clock>,
    /// Clock reading at the previous tick.
    last_frame: f64,
    /// Capped delta reported by the previous tick.
    delta_ms: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: f64,
    fps_update_interval_ms: f64,
    paused: bool,
}

impl FrameTimer {
    /// Create a timer whose first tick measures from "now".
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            last_frame: now,
            delta_ms: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval_ms: 500.0,
            paused: false,
        }
    }

    /// Advance one frame and return the capped delta in milliseconds.
    pub fn tick(&mut self) -> f32 {
        let now = self.clock.now_ms();

        if self.paused {
            self.delta_ms = 0.0;
            return self.delta_ms;
        }

        let raw = (now - self.last_frame).max(0.0) as f32;
        self.delta_ms = clamp_elapsed(raw);
        self.last_frame = now;
        self.frame_count += 1;

        let since_fps = now - self.fps_update_time;
        if since_fps >= self.fps_update_interval_ms {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = (frames as f64 / (since_fps / 1000.0)) as f32;
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_ms
    }

    /// Delta reported by the most recent tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_ms
    }

    /// Ticks since creation or the last reset. Paused ticks are not counted.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop time progression. Ticks report 0 until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause. The paused interval is skipped, not replayed.
    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = self.clock.now_ms();
            self.paused = false;
        }
    }

    pub fn reset(&mut self) {
        let now = self.clock.now_ms();
        self.last_frame = now;
        self.delta_ms = 0.0;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_update_time = now;
        self.paused = false;
    }

    /// The clock this timer reads.
    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }
}
