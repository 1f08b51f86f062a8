//! Single particles.
//!
//! A [`Particle`] is a point moving at constant velocity with a countdown
//! until it expires. Its velocity is fixed at construction; only position,
//! size and remaining life change as time is fed in.
//!
//! # Direction convention
//!
//! Directions are radians where `0` points along +x and positive angles turn
//! toward screen-up (−y), so the velocity is `(s·cos θ, −s·sin θ)`. Configured
//! degree ranges are shifted so that 0° means "up", see
//! [`DirectionRange::from_degrees`](crate::spawn::DirectionRange::from_degrees).

use glam::Vec2;

use crate::config::ParticleDefaults;
use crate::render::{ParticleInstance, RenderSink, VisualId};

/// Velocity for a given speed and direction.
#[inline]
pub fn velocity_from(speed: f32, direction: f32) -> Vec2 {
    Vec2::new(speed * direction.cos(), -speed * direction.sin())
}

/// One transient particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    position: Vec2,
    velocity: Vec2,
    remaining_life: f32,
    size: f32,
    size_growth: f32,
    visual: Option<VisualId>,
}

impl Particle {
    /// Create a particle with no visual attached.
    ///
    /// `position` is in the coordinate space the particle will be drawn in.
    pub fn new(position: Vec2, direction: f32, defaults: &ParticleDefaults) -> Self {
        Self {
            position,
            velocity: velocity_from(defaults.speed, direction),
            remaining_life: defaults.time_to_live,
            size: defaults.size,
            size_growth: defaults.size_growth,
            visual: None,
        }
    }

    /// Create a particle at a global spawn point, attach it to `sink` and
    /// paint its initial state.
    pub fn spawn_visual(
        spawn: Vec2,
        direction: f32,
        defaults: &ParticleDefaults,
        sink: &mut dyn RenderSink,
    ) -> Self {
        let local = spawn - sink.local_origin();
        let mut particle = Self::new(local, direction, defaults);
        let id = sink.attach();
        particle.visual = Some(id);
        sink.draw(id, &particle.instance());
        particle
    }

    /// Advance the simulation without rendering.
    #[inline]
    pub fn advance(&mut self, elapsed_ms: f32) {
        self.position += self.velocity * elapsed_ms;
        self.remaining_life -= elapsed_ms;
        self.size += self.size_growth * elapsed_ms;
    }

    /// Advance by `elapsed_ms` and repaint.
    pub fn update(&mut self, elapsed_ms: f32, sink: &mut dyn RenderSink) {
        self.advance(elapsed_ms);
        if let Some(id) = self.visual {
            sink.draw(id, &self.instance());
        }
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining_life <= 0.0
    }

    /// Detach the visual from `sink`. Safe to call more than once.
    pub fn dispose(&mut self, sink: &mut dyn RenderSink) {
        if let Some(id) = self.visual.take() {
            sink.detach(id);
        }
    }

    /// Current render state.
    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: self.position.to_array(),
            size: self.size,
            remaining_life: self.remaining_life,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn remaining_life(&self) -> f32 {
        self.remaining_life
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn visual(&self) -> Option<VisualId> {
        self.visual
    }

    pub fn is_attached(&self) -> bool {
        self.visual.is_some()
    }
}

/// Builds particles for an emitter.
///
/// Swapping the factory swaps the particle variant: the emitter never
/// constructs particles itself.
pub trait ParticleFactory {
    /// Build a particle at the global point `spawn` heading in `direction`.
    fn create(
        &self,
        spawn: Vec2,
        direction: f32,
        defaults: &ParticleDefaults,
        sink: &mut dyn RenderSink,
    ) -> Particle;
}

/// Particles that attach to the render sink and paint every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisualParticles;

impl ParticleFactory for VisualParticles {
    fn create(
        &self,
        spawn: Vec2,
        direction: f32,
        defaults: &ParticleDefaults,
        sink: &mut dyn RenderSink,
    ) -> Particle {
        Particle::spawn_visual(spawn, direction, defaults, sink)
    }
}

/// Particles that never touch the sink. Positions stay global.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessParticles;

impl ParticleFactory for HeadlessParticles {
    fn create(
        &self,
        spawn: Vec2,
        direction: f32,
        defaults: &ParticleDefaults,
        _sink: &mut dyn RenderSink,
    ) -> Particle {
        Particle::new(spawn, direction, defaults)
    }
}

impl<F> ParticleFactory for F
where
    F: Fn(Vec2, f32, &ParticleDefaults, &mut dyn RenderSink) -> Particle,
{
    fn create(
        &self,
        spawn: Vec2,
        direction: f32,
        defaults: &ParticleDefaults,
        sink: &mut dyn RenderSink,
    ) -> Particle {
        self(spawn, direction, defaults, sink)
    }
}
