//! # Flurry - a small 2D particle engine
//!
//! Emitters spawn short-lived particles on a rectangular surface, move them
//! in straight lines and retire them when their time runs out. The engine
//! does no painting of its own: every particle is handed to a
//! [`RenderSink`] that owns the actual visuals.
//!
//! ## Quick Start
//!
//! ```
//! use flurry::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let clock = ManualClock::new();
//! let mut system = ParticleSystem::new(Rc::new(clock.clone()));
//! let buffer = Rc::new(RefCell::new(InstanceBuffer::new()));
//!
//! let config = EmitterConfig::from_ron_str(r#"(
//!     spawn_point: outside,
//!     direction: Inward,
//!     emit_delay: Fixed(20.0),
//! )"#).unwrap();
//!
//! let emitter = Emitter::builder(&config)
//!     .with_surface(FixedSurface::new(Vec2::ZERO, Vec2::new(320.0, 200.0)))
//!     .with_sink(buffer.clone())
//!     .build();
//! let id = system.add_emitter(emitter);
//!
//! // Emit for one second.
//! system.emitter_mut(id).unwrap().trigger(1000.0, None);
//!
//! for _ in 0..10 {
//!     clock.advance(30.0);
//!     system.tick();
//! }
//! assert!(!buffer.borrow().is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! | Piece | Role |
//! |-------|------|
//! | [`ParticleSystem`] | owns emitters, measures time, fires trigger timers |
//! | [`Emitter`] | throttles spawning, advances and prunes its particles |
//! | [`Particle`] | position, constant velocity, remaining life, size |
//! | [`SurfaceGeometry`] | where the emitter's surface currently is |
//! | [`RenderSink`] | paints and removes particle visuals |
//! | [`ParticleFactory`] | which particle variant an emitter builds |
//! | [`Scheduler`] | cancellable one-shot timers for [`Emitter::trigger`] |
//!
//! ## Time
//!
//! All durations are milliseconds. Any single step is capped at
//! [`time::MAX_ELAPSED_MS`], so a host that stalls gets slow particles
//! rather than a burst.

pub mod config;
mod emitter;
pub mod error;
pub mod geometry;
pub mod particle;
pub mod render;
pub mod scheduler;
pub mod spawn;
mod system;
pub mod time;

pub use config::{EmitDelay, EmitterConfig, ResolvedEmitterConfig, SystemConfig};
pub use emitter::{Emitter, EmitterBuilder, EmitterState, TriggerCallback};
pub use error::ConfigError;
pub use geometry::{Bounds, FixedSurface, SharedSurface, SurfaceGeometry};
pub use glam::Vec2;
pub use particle::{HeadlessParticles, Particle, ParticleFactory, VisualParticles};
pub use render::{InstanceBuffer, NullSink, ParticleInstance, RenderSink, VisualId};
pub use scheduler::{Scheduler, TaskHandle, TimerQueue};
pub use spawn::{SpawnGeometry, SpawnPoint};
pub use system::{EmitterId, ParticleSystem, SystemStats};

/// Convenient re-exports for common usage.
///
/// ```
/// use flurry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{
        DirectionConfig, EmitDelay, EmitterConfig, ParticleConfig, ParticleDefaults, SystemConfig,
    };
    pub use crate::emitter::{Emitter, EmitterBuilder, EmitterState};
    pub use crate::geometry::{Bounds, FixedSurface, SharedSurface, SurfaceGeometry};
    pub use crate::particle::{HeadlessParticles, Particle, ParticleFactory, VisualParticles};
    pub use crate::render::{InstanceBuffer, NullSink, ParticleInstance, RenderSink};
    pub use crate::scheduler::{Scheduler, TimerQueue};
    pub use crate::spawn::{Edge, SpawnGeometry, SpawnPoint};
    pub use crate::system::{EmitterId, ParticleSystem, SystemStats};
    pub use crate::time::{Clock, FrameTimer, ManualClock, SystemClock};
    pub use crate::Vec2;
}
