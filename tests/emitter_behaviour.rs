//! Emitter behaviour through the public API, with a recording sink and a
//! stub surface.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use flurry::prelude::*;
use flurry::render::VisualId;

/// Records every call the engine makes on a sink.
#[derive(Default)]
struct RecordingSink {
    origin: Vec2,
    next_id: u64,
    live: HashMap<VisualId, ParticleInstance>,
    detach_calls: HashMap<VisualId, u32>,
    frames: Vec<Bounds>,
}

impl RenderSink for RecordingSink {
    fn local_origin(&self) -> Vec2 {
        self.origin
    }

    fn begin_frame(&mut self, surface: &Bounds) {
        self.frames.push(*surface);
    }

    fn attach(&mut self) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, ParticleInstance::default());
        id
    }

    fn draw(&mut self, id: VisualId, instance: &ParticleInstance) {
        self.live.insert(id, *instance);
    }

    fn detach(&mut self, id: VisualId) {
        self.live.remove(&id);
        *self.detach_calls.entry(id).or_default() += 1;
    }
}

fn base_config() -> EmitterConfig {
    EmitterConfig {
        active: true,
        seed: Some(11),
        ..Default::default()
    }
}

fn recorded(config: &EmitterConfig, surface: Bounds) -> (Rc<RefCell<RecordingSink>>, Emitter) {
    let sink = Rc::new(RefCell::new(RecordingSink::default()));
    let emitter = Emitter::builder(config)
        .with_surface(FixedSurface(surface))
        .with_sink(sink.clone())
        .build();
    (sink, emitter)
}

#[test]
fn zero_delay_is_capacity_bound() {
    let config = EmitterConfig {
        max_particles: 5,
        emit_delay: EmitDelay::Fixed(0.0),
        ..base_config()
    };
    let (sink, mut emitter) = recorded(&config, Bounds::from_size(100.0, 100.0));

    emitter.update(1000.0);
    assert_eq!(emitter.particle_count(), 5);
    assert_eq!(sink.borrow().live.len(), 5);

    for _ in 0..20 {
        emitter.update(16.0);
        assert!(emitter.particle_count() <= 5);
    }
}

#[test]
fn constant_delay_spawns_three_in_350ms() {
    let config = EmitterConfig {
        emit_delay: EmitDelay::Range {
            min: 100.0,
            max: 100.0,
        },
        ..base_config()
    };
    let (_, mut emitter) = recorded(&config, Bounds::from_size(100.0, 100.0));

    emitter.update(350.0);
    assert_eq!(emitter.particle_count(), 3);
}

#[test]
fn expired_particles_are_detached_once() {
    let config = EmitterConfig {
        max_particles: 3,
        emit_delay: EmitDelay::Fixed(0.0),
        particle: ParticleConfig {
            time_to_live: 50.0,
            ..Default::default()
        },
        ..base_config()
    };
    let (sink, mut emitter) = recorded(&config, Bounds::from_size(10.0, 10.0));

    emitter.update(10.0);
    emitter.deactivate();
    emitter.update(40.0);
    assert_eq!(emitter.particle_count(), 0);

    let sink = sink.borrow();
    assert!(sink.live.is_empty());
    assert_eq!(sink.detach_calls.len(), 3);
    assert!(sink.detach_calls.values().all(|&n| n == 1));
}

#[test]
fn remove_disposes_everything_exactly_once() {
    let config = EmitterConfig {
        max_particles: 8,
        emit_delay: EmitDelay::Fixed(0.0),
        ..base_config()
    };
    let (sink, mut emitter) = recorded(&config, Bounds::from_size(10.0, 10.0));
    emitter.update(16.0);
    assert_eq!(sink.borrow().live.len(), 8);

    emitter.remove();
    emitter.remove();
    emitter.update(16.0);

    assert!(emitter.is_destroyed());
    assert_eq!(emitter.particle_count(), 0);
    let sink = sink.borrow();
    assert!(sink.live.is_empty());
    assert_eq!(sink.detach_calls.len(), 8);
    assert!(sink.detach_calls.values().all(|&n| n == 1));
}

#[test]
fn particles_are_local_to_the_sink() {
    let config = EmitterConfig {
        max_particles: 1,
        emit_delay: EmitDelay::Fixed(0.0),
        spawn_point: SpawnGeometry::Center,
        ..base_config()
    };
    let sink = Rc::new(RefCell::new(RecordingSink {
        origin: Vec2::new(100.0, 100.0),
        ..Default::default()
    }));
    let mut emitter = Emitter::builder(&config)
        .with_surface(FixedSurface::new(Vec2::new(100.0, 100.0), Vec2::new(40.0, 20.0)))
        .with_sink(sink.clone())
        .build();

    let point = emitter.spawn_position();
    emitter.add_particle(point, Some(0.0));
    let particle = &emitter.particles()[0];
    assert_eq!(particle.position(), Vec2::new(20.0, 10.0));

    let id = particle.visual().unwrap();
    assert_eq!(sink.borrow().live[&id].position, [20.0, 10.0]);
}

#[test]
fn begin_frame_reports_current_surface() {
    let surface = SharedSurface::new(Bounds::from_size(50.0, 50.0));
    let sink = Rc::new(RefCell::new(RecordingSink::default()));
    let mut emitter = Emitter::builder(&base_config())
        .with_surface(surface.clone())
        .with_sink(sink.clone())
        .build();

    emitter.update(16.0);
    surface.move_to(Vec2::new(5.0, 5.0));
    emitter.update(16.0);

    let sink = sink.borrow();
    assert_eq!(sink.frames.len(), 2);
    assert_eq!(sink.frames[1].origin, Vec2::new(5.0, 5.0));
}

#[test]
fn headless_factory_never_touches_sink() {
    let config = EmitterConfig {
        max_particles: 4,
        emit_delay: EmitDelay::Fixed(0.0),
        ..base_config()
    };
    let sink = Rc::new(RefCell::new(RecordingSink::default()));
    let mut emitter = Emitter::builder(&config)
        .with_sink(sink.clone())
        .with_factory(HeadlessParticles)
        .build();

    emitter.update(16.0);
    emitter.remove();
    assert_eq!(emitter.total_emitted(), 4);
    assert_eq!(sink.borrow().next_id, 0);
    assert!(sink.borrow().detach_calls.is_empty());
}

#[test]
fn outside_spawns_move_inward() {
    let config = EmitterConfig {
        max_particles: 400,
        emit_delay: EmitDelay::Fixed(0.0),
        spawn_point: SpawnGeometry::Outside,
        direction: DirectionConfig::Inward,
        particle: ParticleConfig {
            speed: 100.0,
            ..Default::default()
        },
        ..base_config()
    };
    let bounds = Bounds::new(Vec2::new(10.0, 10.0), Vec2::new(200.0, 100.0));
    let mut emitter = Emitter::builder(&config)
        .with_surface(FixedSurface(bounds))
        .with_factory(HeadlessParticles)
        .build();

    emitter.update(0.0);
    assert_eq!(emitter.particle_count(), 400);

    // After a short step nothing may have left through the top, bottom or
    // right edge it started on. The left edge allows every direction.
    let before: Vec<Vec2> = emitter.particles().iter().map(|p| p.position()).collect();
    emitter.update(1.0);
    let mut leftward_from_left = 0;
    for (start, particle) in before.iter().zip(emitter.particles()) {
        let moved = particle.position() - *start;
        let on_top = (start.y - bounds.origin.y).abs() < 1e-3;
        let on_bottom = (start.y - (bounds.origin.y + bounds.size.y)).abs() < 1e-3;
        let on_left = (start.x - bounds.origin.x).abs() < 1e-3;
        let on_right = (start.x - (bounds.origin.x + bounds.size.x)).abs() < 1e-3;
        assert!(on_top || on_bottom || on_left || on_right);
        if on_top && !on_left && !on_right {
            assert!(moved.y >= -1e-4);
        }
        if on_bottom && !on_left && !on_right {
            assert!(moved.y <= 1e-4);
        }
        if on_left && !on_top && !on_bottom && moved.x < -1e-4 {
            leftward_from_left += 1;
        }
        if on_right && !on_top && !on_bottom {
            assert!(moved.x <= 1e-4);
        }
    }
    assert!(leftward_from_left > 0);
}

#[test]
fn custom_factory_substitutes_variant() {
    let config = EmitterConfig {
        max_particles: 2,
        emit_delay: EmitDelay::Fixed(0.0),
        ..base_config()
    };
    let frozen = |spawn: Vec2, dir: f32, d: &ParticleDefaults, _: &mut dyn RenderSink| {
        let mut defaults = *d;
        defaults.speed = 0.0;
        Particle::new(spawn, dir, &defaults)
    };
    let mut emitter = Emitter::builder(&config)
        .with_surface(FixedSurface::new(Vec2::new(3.0, 4.0), Vec2::ZERO))
        .with_factory(frozen)
        .build();

    emitter.update(500.0);
    for particle in emitter.particles() {
        assert_eq!(particle.position(), Vec2::new(3.0, 4.0));
    }
}
