//! A single-threaded frame and timer loop with an explicit clock.
//!
//! The host drives it by calling [`EventLoop::advance`] once per animation
//! frame. Callbacks are owned by the loop and handed back as [`Subscription`]s
//! that deregister when dropped.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec as AllocVec;
use core::cell::RefCell;
use core::time::Duration;

/// What a frame callback is told about the frame it runs in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Clock after this frame's advance.
    pub now: Duration,
    pub delta: Duration,
    /// 1 for the first frame.
    pub frame: u64,
}

type FrameFn = Rc<RefCell<dyn FnMut(FrameTick)>>;
type TimerFn = Box<dyn FnOnce(Duration)>;

struct Timer {
    id: u64,
    due: Duration,
    callback: TimerFn,
}

#[derive(Default)]
struct Registry {
    now: Duration,
    frame: u64,
    next_id: u64,
    frames: AllocVec<(u64, FrameFn)>,
    timers: AllocVec<Timer>,
}

impl Registry {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Earliest timer due by `now` that existed before `watermark`.
    fn take_due(&mut self, now: Duration, watermark: u64) -> Option<Timer> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now && t.id <= watermark)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        Some(self.timers.remove(index))
    }

    fn remove(&mut self, kind: SubscriptionKind, id: u64) -> bool {
        match kind {
            SubscriptionKind::Frame => {
                let before = self.frames.len();
                self.frames.retain(|(fid, _)| *fid != id);
                self.frames.len() != before
            }
            SubscriptionKind::Timer => {
                let before = self.timers.len();
                self.timers.retain(|t| t.id != id);
                self.timers.len() != before
            }
        }
    }

    fn contains(&self, kind: SubscriptionKind, id: u64) -> bool {
        match kind {
            SubscriptionKind::Frame => self.frames.iter().any(|(fid, _)| *fid == id),
            SubscriptionKind::Timer => self.timers.iter().any(|t| t.id == id),
        }
    }
}

/// Cheap to clone; clones share one clock and one set of callbacks.
#[derive(Clone, Default)]
pub struct EventLoop {
    inner: Rc<RefCell<Registry>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the loop was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Run `callback` on every frame until the subscription is dropped.
    pub fn on_frame<C>(&self, callback: C) -> Subscription
    where
        C: FnMut(FrameTick) + 'static,
    {
        let mut registry = self.inner.borrow_mut();
        let id = registry.allocate_id();
        let callback: FrameFn = Rc::new(RefCell::new(callback));
        registry.frames.push((id, callback));
        Subscription::new(&self.inner, SubscriptionKind::Frame, id)
    }

    /// Run `callback` once, `delay` from now. It receives the clock at firing time.
    pub fn set_timeout<C>(&self, delay: Duration, callback: C) -> Subscription
    where
        C: FnOnce(Duration) + 'static,
    {
        let mut registry = self.inner.borrow_mut();
        let id = registry.allocate_id();
        let due = registry.now + delay;
        registry.timers.push(Timer { id, due, callback: Box::new(callback) });
        Subscription::new(&self.inner, SubscriptionKind::Timer, id)
    }

    /// Move the clock forward by `delta` and run one frame.
    ///
    /// Timers due by the new time fire first, earliest first; timers created
    /// during this call wait for the next one. Frame callbacks then run in
    /// registration order. A callback cancelled by an earlier one in the same
    /// frame does not run.
    pub fn advance(&self, delta: Duration) {
        let (tick, watermark) = {
            let mut registry = self.inner.borrow_mut();
            registry.now += delta;
            registry.frame += 1;
            let tick = FrameTick { now: registry.now, delta, frame: registry.frame };
            (tick, registry.next_id)
        };

        loop {
            let due = self.inner.borrow_mut().take_due(tick.now, watermark);
            match due {
                Some(timer) => (timer.callback)(tick.now),
                None => break,
            }
        }

        let snapshot: AllocVec<(u64, FrameFn)> = self
            .inner
            .borrow()
            .frames
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();
        for (id, callback) in snapshot {
            if !self.inner.borrow().contains(SubscriptionKind::Frame, id) {
                continue;
            }
            (&mut *callback.borrow_mut())(tick);
        }
    }

    /// Advance in `frame`-sized steps until `total` has elapsed.
    pub fn run_for(&self, total: Duration, frame: Duration) {
        if frame.is_zero() {
            return;
        }
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            let step = frame.min(total - elapsed);
            self.advance(step);
            elapsed += step;
        }
    }

    pub fn frame_callbacks(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// When the earliest pending timer is due.
    pub fn next_timer_due(&self) -> Option<Duration> {
        self.inner.borrow().timers.iter().map(|t| t.due).min()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SubscriptionKind {
    Frame,
    Timer,
}

/// Handle to a registered callback. Dropping it deregisters the callback.
#[must_use = "dropping a subscription cancels it"]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    kind: SubscriptionKind,
    id: u64,
}

impl Subscription {
    fn new(registry: &Rc<RefCell<Registry>>, kind: SubscriptionKind, id: u64) -> Self {
        Subscription { registry: Rc::downgrade(registry), kind, id }
    }

    /// Deregister now. Returns false if it had already fired or been cancelled.
    pub fn cancel(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.borrow_mut().remove(self.kind, self.id),
            None => false,
        }
    }

    /// Still registered: a frame callback not yet cancelled, or a timer not yet fired.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map_or(false, |registry| registry.borrow().contains(self.kind, self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription").field("kind", &self.kind).field("id", &self.id).finish()
    }
}
