//! Spawn surface geometry.
//!
//! Emitters do not know what they are drawn on. They ask a
//! [`SurfaceGeometry`] provider for the global rectangle of their spawn
//! surface and work out spawn points from that.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in global coordinates.
///
/// `origin` is the top-left corner, y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Bounds {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle at the origin with the given extent.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.origin + self.size;
        point.x >= self.origin.x && point.y >= self.origin.y && point.x <= max.x && point.y <= max.y
    }
}

/// Supplies the current global bounds of a spawn surface.
pub trait SurfaceGeometry {
    fn bounds(&self) -> Bounds;
}

/// A surface that never moves or resizes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedSurface(pub Bounds);

impl FixedSurface {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self(Bounds::new(origin, size))
    }
}

impl SurfaceGeometry for FixedSurface {
    fn bounds(&self) -> Bounds {
        self.0
    }
}

/// A surface whose bounds the host can change after handing it out.
///
/// Clones observe the same rectangle.
#[derive(Clone, Debug, Default)]
pub struct SharedSurface {
    bounds: Rc<Cell<Bounds>>,
}

impl SharedSurface {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds: Rc::new(Cell::new(bounds)),
        }
    }

    /// Move the surface, keeping its extent.
    pub fn move_to(&self, origin: Vec2) {
        let mut b = self.bounds.get();
        b.origin = origin;
        self.bounds.set(b);
    }

    pub fn set(&self, bounds: Bounds) {
        self.bounds.set(bounds);
    }
}

impl SurfaceGeometry for SharedSurface {
    fn bounds(&self) -> Bounds {
        self.bounds.get()
    }
}
