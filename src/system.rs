//! The top-level container that drives every emitter.
//!
//! A [`ParticleSystem`] owns its emitters, a [`FrameTimer`] and one shared
//! [`TimerQueue`]. The host calls [`tick`](ParticleSystem::tick) at roughly
//! fixed intervals; everything else happens synchronously inside that call:
//!
//! 1. fire due trigger timers
//! 2. measure the capped time since the previous tick
//! 3. drop emitters that destroyed themselves since the last tick
//! 4. update the rest
//!
//! ```
//! use flurry::prelude::*;
//! use std::rc::Rc;
//!
//! let clock = ManualClock::new();
//! let mut system = ParticleSystem::new(Rc::new(clock.clone()));
//!
//! let config = EmitterConfig { active: true, ..Default::default() };
//! let id = system.add_emitter(Emitter::new(&config));
//!
//! clock.advance(250.0);
//! system.tick();
//! assert_eq!(system.emitter(id).map(|e| e.particle_count()), Some(2));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::emitter::Emitter;
use crate::scheduler::TimerQueue;
use crate::time::{clamp_elapsed, Clock, FrameTimer, SystemClock};

/// Stable handle to an emitter owned by a [`ParticleSystem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(u64);

impl EmitterId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Snapshot of a system's size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemStats {
    /// Emitters currently held, destroyed ones included until the next tick.
    pub emitters: usize,
    pub live_particles: usize,
    /// Particles ever spawned by emitters still held.
    pub total_emitted: u64,
    /// Ticks that advanced time.
    pub frames: u64,
}

pub struct ParticleSystem {
    emitters: Vec<(EmitterId, Emitter)>,
    next_id: u64,
    timer: FrameTimer,
    timers: Rc<TimerQueue>,
}

impl ParticleSystem {
    /// A system reading time from `clock`.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            emitters: Vec::new(),
            next_id: 0,
            timer: FrameTimer::new(Rc::clone(&clock)),
            timers: Rc::new(TimerQueue::new(clock)),
        }
    }

    /// A system on the wall clock.
    pub fn with_system_clock() -> Self {
        Self::new(Rc::new(SystemClock::new()))
    }

    /// Take ownership of `emitter`.
    ///
    /// Emitters built without a scheduler get the system's timer queue, so
    /// [`Emitter::trigger`] works on them from here on.
    pub fn add_emitter(&mut self, mut emitter: Emitter) -> EmitterId {
        if !emitter.has_scheduler() {
            emitter.attach_scheduler(self.timers.clone());
        }

        let id = EmitterId(self.next_id);
        self.next_id += 1;
        log::debug!("adding emitter {:?}: {:?}", id, emitter);
        self.emitters.push((id, emitter));
        id
    }

    /// Destroy and drop the emitter with `id`. Returns `false` if there was
    /// no such emitter.
    pub fn remove_emitter(&mut self, id: EmitterId) -> bool {
        let Some(index) = self.emitters.iter().position(|(eid, _)| *eid == id) else {
            return false;
        };
        let (_, mut emitter) = self.emitters.remove(index);
        emitter.remove();
        log::debug!("removed emitter {:?}", id);
        true
    }

    /// Run one frame against the clock.
    pub fn tick(&mut self) {
        self.timers.run_due();
        let elapsed = self.timer.tick();
        if self.timer.is_paused() {
            self.drop_destroyed();
            return;
        }
        self.update_emitters(elapsed);
    }

    /// Run one frame with an explicit delta instead of the clock.
    ///
    /// The delta is still capped. Trigger timers keep following the clock.
    pub fn step(&mut self, elapsed_ms: f32) {
        self.timers.run_due();
        self.update_emitters(clamp_elapsed(elapsed_ms));
    }

    pub fn pause(&mut self) {
        self.timer.pause();
    }

    pub fn resume(&mut self) {
        self.timer.resume();
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| e)
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| e)
    }

    /// Emitters in insertion order.
    pub fn emitters(&self) -> impl Iterator<Item = (EmitterId, &Emitter)> {
        self.emitters.iter().map(|(id, e)| (*id, e))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    /// Destroy and drop every emitter.
    pub fn clear(&mut self) {
        for (_, emitter) in self.emitters.iter_mut() {
            emitter.remove();
        }
        self.emitters.clear();
    }

    pub fn stats(&self) -> SystemStats {
        SystemStats {
            emitters: self.emitters.len(),
            live_particles: self.emitters.iter().map(|(_, e)| e.particle_count()).sum(),
            total_emitted: self.emitters.iter().map(|(_, e)| e.total_emitted()).sum(),
            frames: self.timer.frame(),
        }
    }

    /// The queue trigger timers are scheduled on.
    pub fn timers(&self) -> &Rc<TimerQueue> {
        &self.timers
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    fn drop_destroyed(&mut self) {
        self.emitters.retain(|(id, emitter)| {
            let keep = !emitter.is_destroyed();
            if !keep {
                log::debug!("dropping destroyed emitter {:?}", id);
            }
            keep
        });
    }

    fn update_emitters(&mut self, elapsed: f32) {
        self.drop_destroyed();
        for (_, emitter) in self.emitters.iter_mut() {
            emitter.update(elapsed);
        }
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

impl fmt::Debug for ParticleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("emitters", &self.emitters.len())
            .field("paused", &self.timer.is_paused())
            .field("timers", &self.timers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmitDelay, EmitterConfig};
    use crate::time::ManualClock;

    fn system() -> (ManualClock, ParticleSystem) {
        let clock = ManualClock::new();
        let system = ParticleSystem::new(Rc::new(clock.clone()));
        (clock, system)
    }

    fn active(delay: EmitDelay, max: usize) -> Emitter {
        Emitter::new(&EmitterConfig {
            active: true,
            max_particles: max,
            emit_delay: delay,
            seed: Some(3),
            ..Default::default()
        })
    }

    #[test]
    fn test_tick_measures_clock() {
        let (clock, mut system) = system();
        let id = system.add_emitter(active(EmitDelay::Fixed(100.0), 50));

        clock.advance(350.0);
        system.tick();
        assert_eq!(system.emitter(id).unwrap().particle_count(), 3);
        assert_eq!(system.stats().frames, 1);
    }

    #[test]
    fn test_tick_caps_stall() {
        let (clock, mut system) = system();
        let id = system.add_emitter(active(EmitDelay::Fixed(100.0), 50));

        clock.advance(60_000.0);
        system.tick();
        assert_eq!(system.emitter(id).unwrap().particle_count(), 5);
    }

    #[test]
    fn test_destroyed_emitter_dropped_next_tick() {
        let (_, mut system) = system();
        let keep = system.add_emitter(active(EmitDelay::Fixed(0.0), 2));
        let gone = system.add_emitter(active(EmitDelay::Fixed(0.0), 2));
        system.step(16.0);

        system.emitter_mut(gone).unwrap().remove();
        assert_eq!(system.len(), 2);

        system.step(16.0);
        assert_eq!(system.len(), 1);
        assert!(system.emitter(gone).is_none());
        assert!(system.emitter(keep).is_some());
    }

    #[test]
    fn test_remove_emitter_by_id() {
        let (_, mut system) = system();
        let id = system.add_emitter(active(EmitDelay::Fixed(0.0), 3));
        system.step(16.0);

        assert!(system.remove_emitter(id));
        assert!(!system.remove_emitter(id));
        assert!(system.is_empty());
    }

    #[test]
    fn test_added_emitter_gets_scheduler() {
        let (clock, mut system) = system();
        let id = system.add_emitter(Emitter::new(&EmitterConfig::default()));

        system.emitter_mut(id).unwrap().trigger(100.0, None);
        assert!(system.emitter(id).unwrap().is_active());

        clock.advance(100.0);
        system.tick();
        assert!(!system.emitter(id).unwrap().is_active());
    }

    #[test]
    fn test_pause_freezes_particles() {
        let (clock, mut system) = system();
        let id = system.add_emitter(active(EmitDelay::Fixed(0.0), 4));
        clock.advance(16.0);
        system.tick();
        let before = system.emitter(id).unwrap().particles()[0].remaining_life();

        system.pause();
        clock.advance(1000.0);
        system.tick();
        assert_eq!(
            system.emitter(id).unwrap().particles()[0].remaining_life(),
            before
        );

        system.resume();
        clock.advance(10.0);
        system.tick();
        assert_eq!(
            system.emitter(id).unwrap().particles()[0].remaining_life(),
            before - 10.0
        );
    }

    #[test]
    fn test_stats_and_clear() {
        let (_, mut system) = system();
        system.add_emitter(active(EmitDelay::Fixed(0.0), 3));
        system.add_emitter(active(EmitDelay::Fixed(0.0), 2));
        system.step(16.0);

        let stats = system.stats();
        assert_eq!(stats.emitters, 2);
        assert_eq!(stats.live_particles, 5);
        assert_eq!(stats.total_emitted, 5);

        system.clear();
        assert_eq!(system.stats().live_particles, 0);
        assert!(system.is_empty());
    }
}
