//! Emitter and system configuration.
//!
//! Configuration is written by people, so it speaks in people units:
//! degrees with 0° pointing up, speeds and growth per *second*. Before an
//! emitter sees it, [`EmitterConfig::resolve`] turns it into an immutable
//! [`ResolvedEmitterConfig`] in engine units (radians, per-millisecond
//! rates). An emitter never looks at the raw config again.
//!
//! # RON documents
//!
//! Documents list only what differs from the defaults; everything else is
//! merged in field by field:
//!
//! ```
//! use flurry::config::{EmitDelay, EmitterConfig};
//!
//! let cfg = EmitterConfig::from_ron_str(r#"(
//!     active: true,
//!     emit_delay: Range(min: 20.0, max: 60.0),
//!     particle: (speed: 120.0),
//! )"#).unwrap();
//!
//! assert!(cfg.active);
//! assert_eq!(cfg.emit_delay, EmitDelay::Range { min: 20.0, max: 60.0 });
//! assert_eq!(cfg.particle.speed, 120.0);
//! assert_eq!(cfg.particle.time_to_live, 2000.0); // default kept
//! ```

use std::path::Path;

use rand::Rng;
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::spawn::{DirectionPolicy, DirectionRange, InwardRanges, SpawnGeometry};

/// Time between two spawns, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EmitDelay {
    Fixed(f32),
    /// Drawn uniformly for every spawn.
    Range { min: f32, max: f32 },
}

impl Default for EmitDelay {
    fn default() -> Self {
        EmitDelay::Range {
            min: 100.0,
            max: 100.0,
        }
    }
}

impl EmitDelay {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match *self {
            EmitDelay::Fixed(delay) => delay,
            EmitDelay::Range { min, max } => rng.gen::<f32>() * (max - min) + min,
        }
    }
}

/// Configured heading range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DirectionConfig {
    /// Degrees, 0° up, 90° right.
    Range { min: f32, max: f32 },
    /// Aim back across the surface. Only meaningful with
    /// [`SpawnGeometry::Outside`]; anything else gets every direction.
    Inward,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        DirectionConfig::Range {
            min: 0.0,
            max: 360.0,
        }
    }
}

/// Per-particle settings as configured.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Lifespan in milliseconds.
    pub time_to_live: f32,
    /// Pixels per second.
    pub speed: f32,
    /// Size change in pixels per second.
    pub size_growth: f32,
    /// Initial edge length.
    pub size: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            time_to_live: 2000.0,
            speed: 70.0,
            size_growth: 0.0,
            size: 10.0,
        }
    }
}

impl ParticleConfig {
    pub fn resolve(&self) -> ParticleDefaults {
        ParticleDefaults {
            time_to_live: self.time_to_live,
            speed: self.speed / 1000.0,
            size_growth: self.size_growth / 1000.0,
            size: self.size,
        }
    }
}

/// Per-particle settings in engine units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleDefaults {
    /// Milliseconds.
    pub time_to_live: f32,
    /// Pixels per millisecond.
    pub speed: f32,
    /// Pixels per millisecond.
    pub size_growth: f32,
    pub size: f32,
}

impl Default for ParticleDefaults {
    fn default() -> Self {
        ParticleConfig::default().resolve()
    }
}

/// Emitter configuration as written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Whether the emitter starts emitting.
    pub active: bool,
    /// Hard cap on live particles.
    pub max_particles: usize,
    pub emit_delay: EmitDelay,
    pub direction: DirectionConfig,
    pub spawn_point: SpawnGeometry,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub particle: ParticleConfig,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            active: false,
            max_particles: 100,
            emit_delay: EmitDelay::default(),
            direction: DirectionConfig::default(),
            spawn_point: SpawnGeometry::Center,
            seed: None,
            particle: ParticleConfig::default(),
        }
    }
}

impl EmitterConfig {
    /// Parse a partial RON document over the defaults.
    pub fn from_ron_str(s: &str) -> Result<Self> {
        Self::default().merge_ron(s)
    }

    /// Read and parse a partial RON document over the defaults.
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Parse a partial RON document over `self`.
    pub fn merge_ron(&self, s: &str) -> Result<Self> {
        let overrides: EmitterOverrides = ron_options().from_str(s)?;
        Ok(self.merged(&overrides))
    }

    /// Field-wise merge: every override that is set replaces the base value.
    pub fn merged(&self, overrides: &EmitterOverrides) -> Self {
        Self {
            active: overrides.active.unwrap_or(self.active),
            max_particles: overrides.max_particles.unwrap_or(self.max_particles),
            emit_delay: overrides.emit_delay.unwrap_or(self.emit_delay),
            direction: overrides.direction.unwrap_or(self.direction),
            spawn_point: overrides.spawn_point.unwrap_or(self.spawn_point),
            seed: overrides.seed.or(self.seed),
            particle: overrides
                .particle
                .as_ref()
                .map_or(self.particle, |p| p.apply(&self.particle)),
        }
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Convert to engine units.
    pub fn resolve(&self) -> ResolvedEmitterConfig {
        let direction = match self.direction {
            DirectionConfig::Range { min, max } => {
                DirectionPolicy::Range(DirectionRange::from_degrees(min, max))
            }
            DirectionConfig::Inward if self.spawn_point == SpawnGeometry::Outside => {
                DirectionPolicy::Inward(InwardRanges::default())
            }
            DirectionConfig::Inward => DirectionPolicy::Range(DirectionRange::FULL),
        };

        ResolvedEmitterConfig {
            active: self.active,
            max_particles: self.max_particles,
            emit_delay: self.emit_delay,
            direction,
            spawn_geometry: self.spawn_point,
            seed: self.seed,
            particle: self.particle.resolve(),
        }
    }
}

/// A partial [`ParticleConfig`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleOverrides {
    pub time_to_live: Option<f32>,
    pub speed: Option<f32>,
    pub size_growth: Option<f32>,
    pub size: Option<f32>,
}

impl ParticleOverrides {
    fn apply(&self, base: &ParticleConfig) -> ParticleConfig {
        ParticleConfig {
            time_to_live: self.time_to_live.unwrap_or(base.time_to_live),
            speed: self.speed.unwrap_or(base.speed),
            size_growth: self.size_growth.unwrap_or(base.size_growth),
            size: self.size.unwrap_or(base.size),
        }
    }
}

/// A partial [`EmitterConfig`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterOverrides {
    pub active: Option<bool>,
    pub max_particles: Option<usize>,
    pub emit_delay: Option<EmitDelay>,
    pub direction: Option<DirectionConfig>,
    pub spawn_point: Option<SpawnGeometry>,
    pub seed: Option<u64>,
    pub particle: Option<ParticleOverrides>,
}

/// Emitter configuration in engine units, fixed for the emitter's lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedEmitterConfig {
    pub active: bool,
    pub max_particles: usize,
    pub emit_delay: EmitDelay,
    pub direction: DirectionPolicy,
    pub spawn_geometry: SpawnGeometry,
    pub seed: Option<u64>,
    pub particle: ParticleDefaults,
}

impl Default for ResolvedEmitterConfig {
    fn default() -> Self {
        EmitterConfig::default().resolve()
    }
}

/// Settings for whatever drives [`ParticleSystem::tick`](crate::ParticleSystem::tick).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Milliseconds between ticks.
    pub tick_interval_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 30,
        }
    }
}

impl SystemConfig {
    pub fn from_ron_str(s: &str) -> Result<Self> {
        Ok(ron_options().from_str(s)?)
    }
}

fn ron_options() -> ron::Options {
    ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = EmitterConfig::default();
        assert!(!cfg.active);
        assert_eq!(cfg.max_particles, 100);
        assert_eq!(cfg.spawn_point, SpawnGeometry::Center);
        assert_eq!(cfg.particle.time_to_live, 2000.0);
    }

    #[test]
    fn test_resolve_converts_units() {
        let cfg = EmitterConfig {
            particle: ParticleConfig {
                speed: 70.0,
                size_growth: -5.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = cfg.resolve();
        assert!((resolved.particle.speed - 0.07).abs() < 1e-6);
        assert!((resolved.particle.size_growth + 0.005).abs() < 1e-6);
        assert_eq!(resolved.particle.time_to_live, 2000.0);
    }

    #[test]
    fn test_inward_requires_outside() {
        let inward_outside = EmitterConfig {
            direction: DirectionConfig::Inward,
            spawn_point: SpawnGeometry::Outside,
            ..Default::default()
        };
        assert!(matches!(
            inward_outside.resolve().direction,
            DirectionPolicy::Inward(_)
        ));

        let inward_center = EmitterConfig {
            direction: DirectionConfig::Inward,
            ..Default::default()
        };
        assert_eq!(
            inward_center.resolve().direction,
            DirectionPolicy::Range(DirectionRange::FULL)
        );
    }

    #[test]
    fn test_fixed_delay_sample() {
        let mut rng = rand::thread_rng();
        assert_eq!(EmitDelay::Fixed(42.0).sample(&mut rng), 42.0);
        let d = EmitDelay::Range {
            min: 10.0,
            max: 20.0,
        }
        .sample(&mut rng);
        assert!((10.0..=20.0).contains(&d));
    }

    #[test]
    fn test_merge_over_custom_base() {
        let base = EmitterConfig {
            max_particles: 5,
            particle: ParticleConfig {
                size: 3.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let merged = base
            .merge_ron("(spawn_point: outside, direction: Inward, particle: (speed: 1.0))")
            .unwrap();

        assert_eq!(merged.max_particles, 5);
        assert_eq!(merged.spawn_point, SpawnGeometry::Outside);
        assert_eq!(merged.direction, DirectionConfig::Inward);
        assert_eq!(merged.particle.size, 3.0);
        assert_eq!(merged.particle.speed, 1.0);
    }

    #[test]
    fn test_empty_document_is_defaults() {
        assert_eq!(EmitterConfig::from_ron_str("()").unwrap(), EmitterConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = EmitterConfig::from_ron_str("(max_particles: \"lots\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(max_particles: 7, emit_delay: Fixed(0.0))").unwrap();

        let cfg = EmitterConfig::from_ron_file(file.path()).unwrap();
        assert_eq!(cfg.max_particles, 7);
        assert_eq!(cfg.emit_delay, EmitDelay::Fixed(0.0));
    }

    #[test]
    fn test_missing_file() {
        let err = EmitterConfig::from_ron_file("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.ron"));
    }

    #[test]
    fn test_ron_round_trip() {
        let cfg = EmitterConfig {
            active: true,
            seed: Some(9),
            ..Default::default()
        };
        let text = cfg.to_ron_string().unwrap();
        assert_eq!(EmitterConfig::from_ron_str(&text).unwrap(), cfg);
    }

    #[test]
    fn test_system_config() {
        assert_eq!(SystemConfig::default().tick_interval_ms, 30);
        let cfg = SystemConfig::from_ron_str("(tick_interval_ms: 16)").unwrap();
        assert_eq!(cfg.tick_interval_ms, 16);
    }
}
