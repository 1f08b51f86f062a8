//! Spawn geometry and direction policies.
//!
//! Decides where on (or around) its surface an emitter places a new particle
//! and which way the particle heads.
//!
//! # Spawn Geometries
//!
//! | Geometry | Spawn point |
//! |----------|-------------|
//! | [`SpawnGeometry::Corner`] | top-left corner of the surface (the default) |
//! | [`SpawnGeometry::Center`] | centre of the surface |
//! | [`SpawnGeometry::Random`] | uniform inside the surface, re-drawn per spawn |
//! | [`SpawnGeometry::Outside`] | uniform along one perimeter edge, tagged with the edge |
//!
//! # Degrees
//!
//! Configured directions are degrees with 0° pointing up, 90° right, 180°
//! down and 270° left. They are converted once to the radian convention used
//! by [`Particle`](crate::Particle).

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where particles originate relative to the emitter surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnGeometry {
    #[default]
    Corner,
    Center,
    Random,
    Outside,
}

/// A perimeter edge of the emitter surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// A global spawn coordinate, tagged with the perimeter edge it lies on when
/// it came from [`SpawnGeometry::Outside`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub edge: Option<Edge>,
}

impl SpawnPoint {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            edge: None,
        }
    }
}

impl From<Vec2> for SpawnPoint {
    fn from(position: Vec2) -> Self {
        Self::at(position)
    }
}

/// Convert a configured heading in degrees (0° = up) to radians.
#[inline]
pub fn heading_to_radians(degrees: f32) -> f32 {
    (degrees - 90.0) * -(PI / 180.0)
}

/// A range of directions in radians, sampled uniformly.
///
/// `min` may be greater than `max`; sampling still interpolates between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionRange {
    pub min: f32,
    pub max: f32,
}

impl DirectionRange {
    /// Every direction.
    pub const FULL: DirectionRange = DirectionRange {
        min: PI / 2.0,
        max: -3.0 * PI / 2.0,
    };

    pub fn from_degrees(min: f32, max: f32) -> Self {
        Self {
            min: heading_to_radians(min),
            max: heading_to_radians(max),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen::<f32>() * (self.max - self.min) + self.min
    }
}

/// Per-edge ranges that aim particles back across the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InwardRanges {
    pub from_top: DirectionRange,
    pub from_bottom: DirectionRange,
    pub from_left: DirectionRange,
    pub from_right: DirectionRange,
}

impl Default for InwardRanges {
    fn default() -> Self {
        Self {
            from_top: DirectionRange::from_degrees(90.0, 270.0),
            from_bottom: DirectionRange::from_degrees(-90.0, 90.0),
            // Left-edge spawns may head any way, including straight back out.
            from_left: DirectionRange::from_degrees(0.0, 360.0),
            from_right: DirectionRange::from_degrees(180.0, 360.0),
        }
    }
}

impl InwardRanges {
    pub fn for_edge(&self, edge: Edge) -> DirectionRange {
        match edge {
            Edge::Top => self.from_top,
            Edge::Bottom => self.from_bottom,
            Edge::Left => self.from_left,
            Edge::Right => self.from_right,
        }
    }
}

/// How an emitter picks a direction when none is given explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DirectionPolicy {
    Range(DirectionRange),
    /// Aim inward from whichever edge the particle spawned on.
    Inward(InwardRanges),
}

impl Default for DirectionPolicy {
    fn default() -> Self {
        DirectionPolicy::Range(DirectionRange::FULL)
    }
}

impl DirectionPolicy {
    /// Draw a direction for a particle spawned at `point`.
    ///
    /// An inward policy with an untagged point falls back to every direction.
    pub fn sample<R: Rng + ?Sized>(&self, point: &SpawnPoint, rng: &mut R) -> f32 {
        let range = match (self, point.edge) {
            (DirectionPolicy::Range(range), _) => *range,
            (DirectionPolicy::Inward(ranges), Some(edge)) => ranges.for_edge(edge),
            (DirectionPolicy::Inward(_), None) => DirectionRange::FULL,
        };
        range.sample(rng)
    }
}

/// Spawn geometry bound to a surface extent.
///
/// The extent is captured once; the surface origin is supplied per call so
/// a moving surface drags its spawn points along.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnLayout {
    geometry: SpawnGeometry,
    extent: Vec2,
    /// Fixed part of the spawn offset, resolved up front.
    offset: Vec2,
}

impl SpawnLayout {
    pub fn new(geometry: SpawnGeometry, extent: Vec2) -> Self {
        let offset = match geometry {
            SpawnGeometry::Center => extent * 0.5,
            _ => Vec2::ZERO,
        };
        Self {
            geometry,
            extent,
            offset,
        }
    }

    pub fn geometry(&self) -> SpawnGeometry {
        self.geometry
    }

    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    /// Compute a spawn point for a surface whose top-left is at `origin`.
    pub fn spawn_point<R: Rng + ?Sized>(&self, origin: Vec2, rng: &mut R) -> SpawnPoint {
        let mut position = origin + self.offset;
        let mut edge = None;

        match self.geometry {
            SpawnGeometry::Corner | SpawnGeometry::Center => {}
            SpawnGeometry::Random => {
                position.x += rng.gen::<f32>() * self.extent.x;
                position.y += rng.gen::<f32>() * self.extent.y;
            }
            SpawnGeometry::Outside => {
                // Pick the edge pair first, then the side.
                if rng.gen_bool(0.5) {
                    position.x += rng.gen::<f32>() * self.extent.x;
                    if rng.gen_bool(0.5) {
                        position.y += self.extent.y;
                        edge = Some(Edge::Bottom);
                    } else {
                        edge = Some(Edge::Top);
                    }
                } else {
                    position.y += rng.gen::<f32>() * self.extent.y;
                    if rng.gen_bool(0.5) {
                        position.x += self.extent.x;
                        edge = Some(Edge::Right);
                    } else {
                        edge = Some(Edge::Left);
                    }
                }
            }
        }

        SpawnPoint { position, edge }
    }
}
