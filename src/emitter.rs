//! Particle emitters.
//!
//! An [`Emitter`] owns a bounded set of particles. Every update it decides
//! how many new particles the elapsed time pays for, spawns them on its
//! surface, advances every live particle and drops the expired ones.
//!
//! # Emission throttle
//!
//! Spawning is paced by a delay accumulator rather than by frame count.
//! Each update subtracts the elapsed time; while the accumulator is at or
//! below zero and there is room, one emit delay is added back and one
//! particle is spawned. A long frame therefore spawns several particles, a
//! zero delay fills the emitter to capacity in one update, and a fraction of
//! a delay left over carries into the next frame.
//!
//! The accumulator starts primed with one emit delay, so the first particle
//! of a fresh emitter is due one delay after it starts updating.
//!
//! # Example
//!
//! ```
//! use flurry::prelude::*;
//!
//! let config = EmitterConfig {
//!     active: true,
//!     max_particles: 5,
//!     emit_delay: EmitDelay::Fixed(0.0),
//!     ..Default::default()
//! };
//! let mut emitter = Emitter::builder(&config)
//!     .with_surface(FixedSurface::new(Vec2::ZERO, Vec2::new(200.0, 100.0)))
//!     .build();
//!
//! emitter.update(1000.0);
//! assert_eq!(emitter.particle_count(), 5);
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::{EmitterConfig, ResolvedEmitterConfig};
use crate::geometry::{Bounds, FixedSurface, SurfaceGeometry};
use crate::particle::{Particle, ParticleFactory, VisualParticles};
use crate::render::{NullSink, RenderSink};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::spawn::{SpawnLayout, SpawnPoint};
use crate::time::clamp_elapsed;

/// Observable emitter state.
///
/// `Idle` and `Active` switch back and forth freely; `Destroyed` is final.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmitterState {
    Idle,
    Active,
    Destroyed,
}

/// Callback run when a [`trigger`](Emitter::trigger) window ends.
pub type TriggerCallback = Box<dyn FnOnce()>;

/// Builder for [`Emitter`].
///
/// Anything left unset gets a harmless default: a zero-sized surface at the
/// origin, a [`NullSink`], [`VisualParticles`] and no scheduler.
pub struct EmitterBuilder {
    config: ResolvedEmitterConfig,
    surface: Option<Box<dyn SurfaceGeometry>>,
    sink: Option<Box<dyn RenderSink>>,
    factory: Option<Box<dyn ParticleFactory>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    seed: Option<u64>,
}

impl EmitterBuilder {
    /// Start from an already resolved configuration.
    pub fn from_resolved(config: ResolvedEmitterConfig) -> Self {
        Self {
            config,
            surface: None,
            sink: None,
            factory: None,
            scheduler: None,
            seed: config.seed,
        }
    }

    /// Surface the emitter spawns on.
    pub fn with_surface(mut self, surface: impl SurfaceGeometry + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    /// Where particles are painted.
    pub fn with_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Particle variant to build.
    pub fn with_factory(mut self, factory: impl ParticleFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Scheduler for [`Emitter::trigger`] deactivation.
    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Seed the emitter's RNG, overriding any seed in the config.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Emitter {
        let surface = self
            .surface
            .unwrap_or_else(|| Box::new(FixedSurface::default()));
        let layout = SpawnLayout::new(self.config.spawn_geometry, surface.bounds().size);

        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let delay = self.config.emit_delay.sample(&mut rng);

        Emitter {
            config: self.config,
            particles: Vec::with_capacity(self.config.max_particles.min(1024)),
            active: Rc::new(Cell::new(self.config.active)),
            destroyed: false,
            delay,
            layout,
            surface,
            sink: self.sink.unwrap_or_else(|| Box::new(NullSink::default())),
            factory: self.factory.unwrap_or_else(|| Box::new(VisualParticles)),
            scheduler: self.scheduler,
            trigger_task: None,
            rng,
            total_emitted: 0,
        }
    }
}

/// Spawns, advances and prunes a bounded set of particles.
pub struct Emitter {
    config: ResolvedEmitterConfig,
    particles: Vec<Particle>,
    /// Shared with a pending trigger task so it can switch emission off.
    active: Rc<Cell<bool>>,
    destroyed: bool,
    /// Countdown to the next spawn, in milliseconds.
    delay: f32,
    layout: SpawnLayout,
    surface: Box<dyn SurfaceGeometry>,
    sink: Box<dyn RenderSink>,
    factory: Box<dyn ParticleFactory>,
    scheduler: Option<Rc<dyn Scheduler>>,
    trigger_task: Option<TaskHandle>,
    rng: SmallRng,
    total_emitted: u64,
}

impl Emitter {
    /// Emitter with default collaborators.
    pub fn new(config: &EmitterConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: &EmitterConfig) -> EmitterBuilder {
        EmitterBuilder::from_resolved(config.resolve())
    }

    /// Advance the emitter by `elapsed_ms`, capped at
    /// [`MAX_ELAPSED_MS`](crate::time::MAX_ELAPSED_MS). A non-finite delta
    /// counts as 0.
    ///
    /// Spawns only while active; live particles always advance. Does nothing
    /// once the emitter is destroyed.
    pub fn update(&mut self, elapsed_ms: f32) {
        if self.destroyed {
            return;
        }

        let elapsed = clamp_elapsed(elapsed_ms);

        if self.active.get() {
            self.create_particles(elapsed);
        }

        self.update_particles(elapsed);
    }

    /// Spawn one particle at `point`.
    ///
    /// Without an explicit `direction` (radians) one is drawn from the
    /// configured policy, aiming inward when `point` carries an edge.
    /// Capacity is not checked here.
    pub fn add_particle(&mut self, point: SpawnPoint, direction: Option<f32>) {
        let direction =
            direction.unwrap_or_else(|| self.config.direction.sample(&point, &mut self.rng));

        let particle = self.factory.create(
            point.position,
            direction,
            &self.config.particle,
            self.sink.as_mut(),
        );
        self.particles.push(particle);
        self.total_emitted += 1;
    }

    /// Emit for `duration_ms`, then switch off and run `callback`.
    ///
    /// Supersedes any earlier pending trigger. Without a scheduler the
    /// emitter is switched on and stays on.
    pub fn trigger(&mut self, duration_ms: f32, callback: Option<TriggerCallback>) {
        if self.destroyed {
            return;
        }

        self.active.set(true);
        self.cancel_trigger();

        let Some(scheduler) = &self.scheduler else {
            log::warn!("emitter triggered without a scheduler; it will not switch itself off");
            return;
        };

        let active = Rc::clone(&self.active);
        let handle = scheduler.schedule(
            duration_ms,
            Box::new(move || {
                active.set(false);
                if let Some(callback) = callback {
                    callback();
                }
            }),
        );
        self.trigger_task = Some(handle);
    }

    /// Flip emission and drop any pending trigger deactivation.
    pub fn toggle(&mut self) {
        if self.destroyed {
            return;
        }
        self.active.set(!self.active.get());
        self.cancel_trigger();
    }

    pub fn activate(&mut self) {
        if !self.destroyed {
            self.active.set(true);
        }
    }

    /// Stop emitting. A pending trigger deactivation is dropped with it.
    pub fn deactivate(&mut self) {
        self.active.set(false);
        self.cancel_trigger();
    }

    /// Destroy the emitter, disposing every live particle.
    pub fn remove(&mut self) {
        self.destroyed = true;
        self.cancel_trigger();

        let sink = self.sink.as_mut();
        for particle in self.particles.iter_mut() {
            particle.dispose(sink);
        }
        self.particles.clear();
    }

    /// The global point the next particle would spawn at.
    ///
    /// Re-reads the surface origin; random and perimeter geometries draw a
    /// fresh point on every call.
    pub fn spawn_position(&mut self) -> SpawnPoint {
        let origin = self.surface.bounds().origin;
        self.layout.spawn_point(origin, &mut self.rng)
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn state(&self) -> EmitterState {
        if self.destroyed {
            EmitterState::Destroyed
        } else if self.active.get() {
            EmitterState::Active
        } else {
            EmitterState::Idle
        }
    }

    /// Whether a trigger deactivation is still waiting to fire.
    pub fn trigger_pending(&self) -> bool {
        match (&self.scheduler, self.trigger_task) {
            (Some(scheduler), Some(handle)) => scheduler.is_pending(handle),
            _ => false,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Particles spawned over the emitter's lifetime.
    pub fn total_emitted(&self) -> u64 {
        self.total_emitted
    }

    /// Current value of the spawn countdown, in milliseconds.
    pub fn delay_accumulator(&self) -> f32 {
        self.delay
    }

    pub fn config(&self) -> &ResolvedEmitterConfig {
        &self.config
    }

    pub fn surface_bounds(&self) -> Bounds {
        self.surface.bounds()
    }

    pub fn sink(&self) -> &dyn RenderSink {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> &mut dyn RenderSink {
        self.sink.as_mut()
    }

    pub fn has_scheduler(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Hand the emitter a scheduler after construction.
    ///
    /// A trigger pending on the previous scheduler is cancelled first.
    pub fn attach_scheduler(&mut self, scheduler: Rc<dyn Scheduler>) {
        self.cancel_trigger();
        self.scheduler = Some(scheduler);
    }

    fn cancel_trigger(&mut self) {
        if let (Some(scheduler), Some(handle)) = (&self.scheduler, self.trigger_task.take()) {
            scheduler.cancel(handle);
        }
    }

    fn create_particles(&mut self, elapsed: f32) {
        let max = self.config.max_particles;
        if self.particles.len() >= max {
            return;
        }

        self.delay -= elapsed;

        let mut spawned = 0usize;
        while self.delay <= 0.0 && self.particles.len() < max {
            self.delay += self.config.emit_delay.sample(&mut self.rng);
            let point = self.spawn_position();
            self.add_particle(point, None);
            spawned += 1;
        }

        if spawned > 1 {
            log::trace!(
                "emitted {} particles in one {} ms update ({} live)",
                spawned,
                elapsed,
                self.particles.len()
            );
        }
    }

    fn update_particles(&mut self, elapsed: f32) {
        let bounds = self.surface.bounds();
        let sink = self.sink.as_mut();
        sink.begin_frame(&bounds);

        self.particles.retain_mut(|particle| {
            particle.update(elapsed, sink);
            if particle.is_expired() {
                particle.dispose(sink);
                false
            } else {
                true
            }
        });
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("state", &self.state())
            .field("particles", &self.particles.len())
            .field("max_particles", &self.config.max_particles)
            .field("delay", &self.delay)
            .field("total_emitted", &self.total_emitted)
            .finish()
    }
}
