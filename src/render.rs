//! The render sink seam.
//!
//! The core decides *where* particles are and *how big*; painting them is the
//! host's business. A [`RenderSink`] receives one [`ParticleInstance`] per
//! live particle per frame and a detach request when the particle dies.
//!
//! Two sinks ship with the crate:
//!
//! | Sink | Use |
//! |------|-----|
//! | [`NullSink`] | discard everything (headless simulation) |
//! | [`InstanceBuffer`] | keep a packed, GPU-uploadable array of live instances |

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::geometry::Bounds;

/// Identifies the visual representation of one particle inside a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub u64);

/// Per-particle render state, laid out for direct upload as instance data.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Centre of the particle in sink-local coordinates.
    pub position: [f32; 2],
    /// Edge length of the particle's square footprint.
    pub size: f32,
    /// Milliseconds left before the particle expires.
    pub remaining_life: f32,
}

impl ParticleInstance {
    /// Top-left corner of the particle's footprint.
    pub fn top_left(&self) -> Vec2 {
        Vec2::from(self.position) - Vec2::splat(self.size * 0.5)
    }
}

/// Paints, repositions and removes particle visuals.
pub trait RenderSink {
    /// Offset of the sink's coordinate space in global coordinates.
    ///
    /// Particles convert their global spawn point into sink-local space once,
    /// at construction. Sinks without an offset keep the default.
    fn local_origin(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Called once per emitter update before its particles are drawn.
    fn begin_frame(&mut self, _surface: &Bounds) {}

    /// Create a visual and return its id.
    fn attach(&mut self) -> VisualId;

    /// Paint or move a visual.
    fn draw(&mut self, id: VisualId, instance: &ParticleInstance);

    /// Remove a visual. Unknown ids are ignored.
    fn detach(&mut self, id: VisualId);
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn local_origin(&self) -> Vec2 {
        (**self).local_origin()
    }

    fn begin_frame(&mut self, surface: &Bounds) {
        (**self).begin_frame(surface)
    }

    fn attach(&mut self) -> VisualId {
        (**self).attach()
    }

    fn draw(&mut self, id: VisualId, instance: &ParticleInstance) {
        (**self).draw(id, instance)
    }

    fn detach(&mut self, id: VisualId) {
        (**self).detach(id)
    }
}

/// Lets a host keep a handle on a sink it gave to an emitter.
impl<S: RenderSink + ?Sized> RenderSink for Rc<RefCell<S>> {
    fn local_origin(&self) -> Vec2 {
        self.borrow().local_origin()
    }

    fn begin_frame(&mut self, surface: &Bounds) {
        self.borrow_mut().begin_frame(surface)
    }

    fn attach(&mut self) -> VisualId {
        self.borrow_mut().attach()
    }

    fn draw(&mut self, id: VisualId, instance: &ParticleInstance) {
        self.borrow_mut().draw(id, instance)
    }

    fn detach(&mut self, id: VisualId) {
        self.borrow_mut().detach(id)
    }
}

/// A sink that draws nothing.
#[derive(Debug, Default)]
pub struct NullSink {
    next_id: u64,
}

impl RenderSink for NullSink {
    fn attach(&mut self) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        id
    }

    fn draw(&mut self, _id: VisualId, _instance: &ParticleInstance) {}

    fn detach(&mut self, _id: VisualId) {}
}

/// Packed array of the latest instance of every attached visual.
///
/// Order is unspecified; detaching swaps the last instance into the hole.
#[derive(Debug, Default)]
pub struct InstanceBuffer {
    origin: Vec2,
    next_id: u64,
    ids: Vec<VisualId>,
    instances: Vec<ParticleInstance>,
    slots: HashMap<VisualId, usize>,
    attached_total: u64,
    detached_total: u64,
    frames: u64,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer whose coordinate space starts at `origin`.
    pub fn with_origin(origin: Vec2) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// Instance data as raw bytes, ready for a vertex buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn get(&self, id: VisualId) -> Option<&ParticleInstance> {
        self.slots.get(&id).map(|&slot| &self.instances[slot])
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Visuals ever attached.
    pub fn attached_total(&self) -> u64 {
        self.attached_total
    }

    /// Visuals ever detached.
    pub fn detached_total(&self) -> u64 {
        self.detached_total
    }

    /// `begin_frame` calls seen.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for InstanceBuffer {
    fn local_origin(&self) -> Vec2 {
        self.origin
    }

    fn begin_frame(&mut self, _surface: &Bounds) {
        self.frames += 1;
    }

    fn attach(&mut self) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        self.attached_total += 1;

        self.slots.insert(id, self.instances.len());
        self.ids.push(id);
        self.instances.push(ParticleInstance::zeroed());
        id
    }

    fn draw(&mut self, id: VisualId, instance: &ParticleInstance) {
        if let Some(&slot) = self.slots.get(&id) {
            self.instances[slot] = *instance;
        }
    }

    fn detach(&mut self, id: VisualId) {
        let Some(slot) = self.slots.remove(&id) else {
            return;
        };
        self.detached_total += 1;

        self.ids.swap_remove(slot);
        self.instances.swap_remove(slot);
        if let Some(&moved) = self.ids.get(slot) {
            self.slots.insert(moved, slot);
        }
    }
}
