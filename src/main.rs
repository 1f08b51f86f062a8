//! Headless demo driver.
//!
//! Runs one emitter on a 640x480 surface for a few seconds and logs what it
//! is doing. Pass a RON emitter config as the first argument to try your own.
//!
//! Run with: `RUST_LOG=debug cargo run --features demo -- [emitter.ron]`

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use flurry::prelude::*;
use flurry::ConfigError;

const RUN_FOR_MS: u64 = 3_000;

fn main() -> Result<(), ConfigError> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => EmitterConfig::from_ron_file(&path)?,
        None => EmitterConfig::from_ron_str(
            "(max_particles: 200, emit_delay: Range(min: 5.0, max: 25.0), spawn_point: outside, direction: Inward)",
        )?,
    };
    let system_config = SystemConfig::default();

    let buffer = Rc::new(RefCell::new(InstanceBuffer::new()));
    let emitter = Emitter::builder(&config)
        .with_surface(FixedSurface::new(Vec2::ZERO, Vec2::new(640.0, 480.0)))
        .with_sink(buffer.clone())
        .build();

    let mut system = ParticleSystem::with_system_clock();
    let id = system.add_emitter(emitter);

    if let Some(emitter) = system.emitter_mut(id) {
        if !emitter.is_active() {
            emitter.trigger(
                (RUN_FOR_MS / 2) as f32,
                Some(Box::new(|| log::info!("trigger window closed"))),
            );
        }
    }

    let interval = Duration::from_millis(system_config.tick_interval_ms);
    let ticks = RUN_FOR_MS / system_config.tick_interval_ms.max(1);

    for tick in 0..ticks {
        system.tick();
        std::thread::sleep(interval);

        if tick % 20 == 0 {
            let stats = system.stats();
            log::info!(
                "frame {:>4}: {} live, {} emitted, {} bytes of instance data",
                stats.frames,
                stats.live_particles,
                stats.total_emitted,
                buffer.borrow().as_bytes().len()
            );
        }
    }

    let stats = system.stats();
    log::info!(
        "done after {} frames: {} particles emitted",
        stats.frames,
        stats.total_emitted
    );
    system.clear();

    Ok(())
}
