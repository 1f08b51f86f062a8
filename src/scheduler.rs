//! Cancellable one-shot timers.
//!
//! [`Emitter::trigger`](crate::Emitter::trigger) needs "turn off after N ms"
//! that can be revoked when a later `toggle` or `trigger` supersedes it.
//! Instead of an ambient timer registry, every emitter keeps the
//! [`TaskHandle`] of its pending deactivation and talks to a [`Scheduler`]
//! it was given.
//!
//! Everything here is single-threaded. [`TimerQueue`] uses interior
//! mutability so one queue can be shared through an `Rc` by a
//! [`ParticleSystem`](crate::ParticleSystem) and all of its emitters.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::time::Clock;

/// Identifies one scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Raw id, unique per scheduler.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A pluggable source of one-shot delayed tasks.
pub trait Scheduler {
    /// Run `task` once, `delay_ms` from now.
    fn schedule(&self, delay_ms: f32, task: Box<dyn FnOnce()>) -> TaskHandle;

    /// Revoke a task. Unknown or already-fired handles are ignored.
    fn cancel(&self, handle: TaskHandle);

    /// Whether `handle` is still waiting to fire.
    fn is_pending(&self, handle: TaskHandle) -> bool;
}

struct Entry {
    handle: TaskHandle,
    due_ms: f64,
    task: Box<dyn FnOnce()>,
}

/// Deadline-ordered queue of tasks driven by a [`Clock`].
///
/// Nothing fires on its own: the host (normally
/// [`ParticleSystem::tick`](crate::ParticleSystem::tick)) calls
/// [`run_due`](TimerQueue::run_due) once per frame.
pub struct TimerQueue {
    clock: Rc<dyn Clock>,
    next_id: Cell<u64>,
    entries: RefCell<Vec<Entry>>,
}

impl TimerQueue {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Run every task whose deadline has passed. Returns how many ran.
    ///
    /// Due tasks leave the queue before any of them runs, so a task may
    /// freely schedule or cancel other tasks.
    pub fn run_due(&self) -> usize {
        let now = self.clock.now_ms();

        let mut due: Vec<Entry> = {
            let mut entries = self.entries.borrow_mut();
            let (ready, waiting): (Vec<Entry>, Vec<Entry>) =
                entries.drain(..).partition(|e| e.due_ms <= now);
            *entries = waiting;
            ready
        };

        // Stable sort keeps scheduling order for equal deadlines.
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));

        let count = due.len();
        for entry in due {
            (entry.task)();
        }
        count
    }

    /// Number of tasks still waiting.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&self, delay_ms: f32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let handle = TaskHandle(id);
        let delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        let due_ms = self.clock.now_ms() + f64::from(delay_ms);
        self.entries.borrow_mut().push(Entry {
            handle,
            due_ms,
            task,
        });
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        self.entries.borrow_mut().retain(|e| e.handle != handle);
    }

    fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.borrow().iter().any(|e| e.handle == handle)
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.len())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}
