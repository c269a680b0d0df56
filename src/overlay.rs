//! The mounted cloth overlay.
//!
//! A [`ClothOverlay`] owns one [`SimulationContext`], a draw surface and a
//! single frame subscription that steps the world and then paints it. Flipping
//! the trigger releases the pins and starts the settle timer; when it fires
//! `on_finish` runs once and the frame subscription ends. Unmounting, or dropping the overlay, cancels
//! everything and clears the world.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::time::Duration;

use rand::RngCore;

use crate::config::OverlayConfig;
use crate::context::SimulationContext;
use crate::error::ClothError;
use crate::event_loop::{EventLoop, FrameTick, Subscription};
use crate::float::Float;
use crate::render::{DistortionRenderer, DrawSurface};
use crate::world::PhysicsWorld;

/// Lifecycle of a mounted overlay.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverlayPhase {
    /// Mounted, waiting for a surface with a usable size.
    Pending,
    /// Mesh built and pinned.
    Hanging,
    /// Triggered; the settle timer is running.
    Falling,
    Finished,
    Unmounted,
}

struct OverlayState<W: PhysicsWorld> {
    config: OverlayConfig<W::Scalar>,
    context: SimulationContext<W>,
    surface: Option<Box<dyn DrawSurface<W::Scalar>>>,
    renderer: DistortionRenderer<W::Scalar>,
    rng: Box<dyn RngCore>,
    events: EventLoop,
    frame: Option<Subscription>,
    settle: Option<Subscription>,
    on_finish: Option<Box<dyn FnOnce()>>,
    triggered: bool,
    deferred: bool,
    phase: OverlayPhase,
}

impl<W: PhysicsWorld> OverlayState<W> {
    fn on_frame(&mut self, tick: FrameTick) {
        if self.context.mesh().is_none() && !self.try_build(tick) {
            return;
        }
        self.context.step();

        let OverlayState { context, surface, renderer, .. } = self;
        if let (Some(mesh), Some(surface)) = (context.mesh(), surface.as_mut()) {
            renderer.render(mesh, context.world(), surface.as_mut());
        }
    }

    /// Build once the surface has a size. Returns whether a mesh now exists.
    fn try_build(&mut self, tick: FrameTick) -> bool {
        let Some(surface) = self.surface.as_ref() else {
            return false;
        };
        let (width, height) = surface.size();
        match self.context.build(&self.config.mesh, width, height) {
            Ok(mesh) => {
                log::debug!(
                    "cloth built on frame {} with {} particles",
                    tick.frame,
                    mesh.particle_count()
                );
            }
            Err(ClothError::InvalidViewport { width, height }) => {
                if !self.deferred {
                    log::warn!("viewport is {}x{}; deferring cloth build", width, height);
                    self.deferred = true;
                }
                return false;
            }
            Err(err) => {
                log::warn!("cloth overlay disabled: {}", err);
                self.frame = None;
                return false;
            }
        }

        if self.phase == OverlayPhase::Pending {
            self.phase = OverlayPhase::Hanging;
        }
        if self.triggered {
            self.release();
        }
        true
    }

    fn release(&mut self) {
        let OverlayState { context, rng, config, .. } = self;
        if context.release(rng.as_mut(), &config.release) {
            log::info!("cloth released");
        }
    }
}

/// A cloth hanging over the host page until it is told to fall.
pub struct ClothOverlay<W: PhysicsWorld + 'static> {
    state: Rc<RefCell<OverlayState<W>>>,
}

impl<W: PhysicsWorld + 'static> ClothOverlay<W> {
    /// Mount over `surface`, building the mesh on the first frame with a usable size.
    ///
    /// Without a surface nothing is simulated or drawn, but the trigger and
    /// `on_finish` still work so the host can reveal its content.
    pub fn mount<C>(
        events: &EventLoop,
        world: W,
        surface: Option<Box<dyn DrawSurface<W::Scalar>>>,
        config: OverlayConfig<W::Scalar>,
        rng: Box<dyn RngCore>,
        on_finish: C,
    ) -> Self
    where
        C: FnOnce() + 'static,
    {
        if surface.is_none() {
            log::warn!("no drawing surface; cloth overlay will not be drawn");
        }
        let has_surface = surface.is_some();
        let renderer = DistortionRenderer::new(config.line_width);
        let state = Rc::new(RefCell::new(OverlayState {
            config,
            context: SimulationContext::new(world),
            surface,
            renderer,
            rng,
            events: events.clone(),
            frame: None,
            settle: None,
            on_finish: Some(Box::new(on_finish)),
            triggered: false,
            deferred: false,
            phase: OverlayPhase::Pending,
        }));

        if has_surface {
            let weak = Rc::downgrade(&state);
            let frame = events.on_frame(move |tick| {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().on_frame(tick);
                }
            });
            state.borrow_mut().frame = Some(frame);
        }

        ClothOverlay { state }
    }

    /// Set the trigger. Going `true` releases the cloth and starts the settle
    /// timer; this happens at most once and there is no going back.
    pub fn set_trigger(&self, trigger: bool) {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        if !trigger || st.triggered || st.phase == OverlayPhase::Unmounted {
            return;
        }
        st.triggered = true;
        if st.context.mesh().is_some() {
            st.release();
        } else {
            log::debug!("trigger set before the cloth was built; releasing after build");
        }
        st.phase = OverlayPhase::Falling;

        let weak = Rc::downgrade(&self.state);
        let settle = st.config.settle;
        st.settle = Some(st.events.set_timeout(settle, move |now| finish(&weak, now)));
    }

    /// Cancel every subscription, drop `on_finish` unrun and clear the world.
    pub fn unmount(&self) {
        let mut st = self.state.borrow_mut();
        if st.phase == OverlayPhase::Unmounted {
            return;
        }
        st.frame = None;
        st.settle = None;
        st.on_finish = None;
        st.context.teardown();
        st.phase = OverlayPhase::Unmounted;
        log::debug!("cloth overlay unmounted");
    }

    pub fn phase(&self) -> OverlayPhase {
        self.state.borrow().phase
    }

    pub fn is_triggered(&self) -> bool {
        self.state.borrow().triggered
    }

    pub fn is_finished(&self) -> bool {
        self.state.borrow().phase == OverlayPhase::Finished
    }

    pub fn settle_duration(&self) -> Duration {
        self.state.borrow().config.settle
    }

    /// Read the simulation, e.g. to check what was built.
    pub fn inspect<R>(&self, f: impl FnOnce(&SimulationContext<W>) -> R) -> R {
        f(&self.state.borrow().context)
    }

    /// Size the surface reports now, if there is one.
    pub fn surface_size(&self) -> Option<(W::Scalar, W::Scalar)> {
        self.state.borrow().surface.as_ref().map(|s| s.size())
    }

    /// Whether the mesh exists and has a positive rest area.
    pub fn is_built(&self) -> bool {
        self.inspect(|ctx| ctx.mesh().map_or(false, |m| m.rest_area().is_positive()))
    }
}

impl<W: PhysicsWorld + 'static> Drop for ClothOverlay<W> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn finish<W: PhysicsWorld>(weak: &Weak<RefCell<OverlayState<W>>>, now: Duration) {
    let Some(state) = weak.upgrade() else {
        return;
    };
    let on_finish = {
        let mut st = state.borrow_mut();
        if st.phase != OverlayPhase::Falling {
            log::warn!("settle timer fired in phase {:?}", st.phase);
            return;
        }
        st.phase = OverlayPhase::Finished;
        st.settle = None;
        st.frame = None;
        st.on_finish.take()
    };
    log::info!("cloth overlay finished at {:?}", now);
    if let Some(on_finish) = on_finish {
        on_finish();
    }
}
