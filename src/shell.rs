//! The host page shell: progress in, cloth out, content revealed.
//!
//! [`RevealShell`] owns the [`RevealSequencer`], a progress feed and the
//! [`ClothOverlay`]. It wakes itself on the event loop whenever the sequencer
//! has a deadline, triggers the overlay on release and swaps the overlay for
//! the page content when the overlay reports it has finished.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::RefCell;

use rand::RngCore;

use crate::config::ShellConfig;
use crate::event_loop::{EventLoop, Subscription};
use crate::overlay::ClothOverlay;
use crate::progress::{AssetProgress, TimedProgress};
use crate::render::DrawSurface;
use crate::sequencer::{RevealSequencer, RevealState, RevealTransition};
use crate::world::PhysicsWorld;

/// Where loading progress comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProgressFeed {
    /// The host calls [`RevealShell::report_progress`].
    External,
    /// The host calls [`RevealShell::asset_settled`] once per asset.
    Assets(AssetProgress),
    /// Counts up on its own.
    Timed(TimedProgress),
}

struct ShellState<W: PhysicsWorld + 'static> {
    this: Weak<RefCell<ShellState<W>>>,
    sequencer: RevealSequencer,
    events: EventLoop,
    overlay: Option<ClothOverlay<W>>,
    content_visible: bool,
    feed: ProgressFeed,
    wake: Option<Subscription>,
    ticker: Option<Subscription>,
}

impl<W: PhysicsWorld + 'static> ShellState<W> {
    fn report(&mut self, percent: u32) {
        let now = self.events.now();
        if self.sequencer.report_progress(percent, now) {
            self.schedule_wake();
        }
    }

    /// Arm a timer for the next loading deadline. After release the overlay's
    /// own settle timer drives the finish.
    fn schedule_wake(&mut self) {
        self.wake = None;
        if !matches!(self.sequencer.state(), RevealState::Loading { .. }) {
            return;
        }
        let Some(deadline) = self.sequencer.next_deadline() else {
            return;
        };
        let delay = deadline.saturating_sub(self.events.now());
        let weak = self.this.clone();
        self.wake = Some(self.events.set_timeout(delay, move |_| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().wake();
            }
        }));
    }

    fn wake(&mut self) {
        let now = self.events.now();
        while let Some(transition) = self.sequencer.poll(now) {
            match transition {
                RevealTransition::LoadingComplete => self.ticker = None,
                RevealTransition::Released { .. } => {
                    if let Some(overlay) = &self.overlay {
                        overlay.set_trigger(true);
                    }
                    break;
                }
                RevealTransition::Finished => break,
            }
        }
        self.schedule_wake();
    }

    fn schedule_tick(&mut self) {
        let ProgressFeed::Timed(timed) = self.feed else {
            return;
        };
        let weak = self.this.clone();
        self.ticker = Some(self.events.set_timeout(timed.interval(), move |_| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().tick();
            }
        }));
    }

    fn tick(&mut self) {
        let ProgressFeed::Timed(timed) = &mut self.feed else {
            return;
        };
        let value = timed.next();
        let done = timed.is_complete();
        self.report(u32::from(value));
        if done {
            self.ticker = None;
        } else {
            self.schedule_tick();
        }
    }
}

/// Drives one cloth reveal from mount to content.
pub struct RevealShell<W: PhysicsWorld + 'static> {
    state: Rc<RefCell<ShellState<W>>>,
}

impl<W: PhysicsWorld + 'static> RevealShell<W> {
    /// Mount the overlay and start loading.
    ///
    /// `config.timing.settle` replaces the overlay's own settle duration.
    pub fn mount(
        events: &EventLoop,
        world: W,
        surface: Option<Box<dyn DrawSurface<W::Scalar>>>,
        config: ShellConfig<W::Scalar>,
        rng: Box<dyn RngCore>,
        feed: ProgressFeed,
    ) -> Self {
        let ShellConfig { timing, overlay } = config;
        let overlay_config = overlay.with_settle(timing.settle);

        let state = Rc::new_cyclic(|this| {
            RefCell::new(ShellState {
                this: this.clone(),
                sequencer: RevealSequencer::new(timing),
                events: events.clone(),
                overlay: None,
                content_visible: false,
                feed,
                wake: None,
                ticker: None,
            })
        });

        let weak = Rc::downgrade(&state);
        let overlay = ClothOverlay::mount(events, world, surface, overlay_config, rng, move || {
            overlay_finished(&weak);
        });

        {
            let mut st = state.borrow_mut();
            st.overlay = Some(overlay);
            let now = st.events.now();
            st.sequencer.start(now);
            let feed = st.feed;
            match feed {
                ProgressFeed::Assets(assets) => st.report(u32::from(assets.percent())),
                ProgressFeed::Timed(_) => st.schedule_tick(),
                ProgressFeed::External => {}
            }
            st.schedule_wake();
        }

        RevealShell { state }
    }

    /// Report progress in percent from the host.
    pub fn report_progress(&self, percent: u32) {
        self.state.borrow_mut().report(percent);
    }

    /// One asset loaded or failed. Ignored unless the feed counts assets.
    pub fn asset_settled(&self) {
        let mut st = self.state.borrow_mut();
        let ProgressFeed::Assets(assets) = &mut st.feed else {
            log::warn!("asset settled but the progress feed does not count assets");
            return;
        };
        let percent = assets.settle();
        st.report(u32::from(percent));
    }

    pub fn progress(&self) -> u8 {
        self.state.borrow().sequencer.progress()
    }

    pub fn state(&self) -> RevealState {
        self.state.borrow().sequencer.state()
    }

    pub fn content_visible(&self) -> bool {
        self.state.borrow().content_visible
    }

    pub fn overlay_mounted(&self) -> bool {
        self.state.borrow().overlay.is_some()
    }

    /// Loader text shown while the cloth still hangs, e.g. `"42%"`.
    pub fn loader_label(&self) -> Option<String> {
        let st = self.state.borrow();
        match st.sequencer.state() {
            RevealState::Loading { progress } if st.overlay.is_some() => Some(format!("{}%", progress)),
            _ => None,
        }
    }

    /// Read the overlay, if it is still mounted.
    pub fn with_overlay<R>(&self, f: impl FnOnce(&ClothOverlay<W>) -> R) -> Option<R> {
        self.state.borrow().overlay.as_ref().map(f)
    }

    /// Stop everything. The content is not revealed and `on_finish` never runs.
    pub fn unmount(&self) {
        let overlay = {
            let mut st = self.state.borrow_mut();
            st.sequencer.cancel();
            st.wake = None;
            st.ticker = None;
            st.overlay.take()
        };
        drop(overlay);
    }
}

impl<W: PhysicsWorld + 'static> Drop for RevealShell<W> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn overlay_finished<W: PhysicsWorld + 'static>(weak: &Weak<RefCell<ShellState<W>>>) {
    let Some(state) = weak.upgrade() else {
        return;
    };
    let overlay = {
        let mut st = state.borrow_mut();
        let now = st.events.now();
        if st.sequencer.poll(now) != Some(RevealTransition::Finished) {
            log::warn!("overlay finished while the reveal was {:?}", st.sequencer.state());
        }
        st.content_visible = true;
        st.wake = None;
        st.overlay.take()
    };
    drop(overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MeshConfig, OverlayConfig, RevealTiming};
    use crate::render::RecordingSurface;
    use crate::world::VerletWorld;
    use core::time::Duration;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_millis(16);

    fn shell(events: &EventLoop, feed: ProgressFeed) -> RevealShell<VerletWorld<f32>> {
        let config = ShellConfig::new()
            .with_overlay(OverlayConfig::new().with_mesh(MeshConfig::new().with_grid(4, 4)));
        RevealShell::mount(
            events,
            VerletWorld::new(config.overlay.solver.clone()),
            Some(Box::new(RecordingSurface::<f32>::new(300.0, 300.0))),
            config,
            Box::new(SmallRng::seed_from_u64(11)),
            feed,
        )
    }

    #[test]
    fn external_progress_drives_release_and_finish() {
        let events = EventLoop::new();
        let shell = shell(&events, ProgressFeed::External);
        events.advance(FRAME);
        assert_eq!(shell.loader_label().as_deref(), Some("0%"));

        shell.report_progress(50);
        assert_eq!(shell.loader_label().as_deref(), Some("50%"));
        shell.report_progress(100);
        events.run_for(Duration::from_millis(520), FRAME);
        assert!(matches!(shell.state(), RevealState::Released { .. }));
        assert_eq!(shell.loader_label(), None);
        assert_eq!(shell.with_overlay(|o| o.is_triggered()), Some(true));

        events.run_for(Duration::from_millis(2100), FRAME);
        assert_eq!(shell.state(), RevealState::Finished);
        assert!(shell.content_visible());
        assert!(!shell.overlay_mounted());
        assert_eq!(events.frame_callbacks(), 0);
        assert_eq!(events.pending_timers(), 0);
    }

    #[test]
    fn zero_assets_complete_immediately() {
        let events = EventLoop::new();
        let shell = shell(&events, ProgressFeed::Assets(AssetProgress::new(0)));
        assert_eq!(shell.progress(), 100);
        events.run_for(Duration::from_millis(600), FRAME);
        assert!(matches!(shell.state(), RevealState::Released { .. }));
    }

    #[test]
    fn asset_counter_counts_failures() {
        let events = EventLoop::new();
        let shell = shell(&events, ProgressFeed::Assets(AssetProgress::new(4)));
        shell.asset_settled();
        assert_eq!(shell.progress(), 25);
        shell.asset_settled();
        shell.asset_settled();
        shell.asset_settled();
        assert_eq!(shell.progress(), 100);
    }

    #[test]
    fn timed_feed_reaches_hundred() {
        let events = EventLoop::new();
        let shell = shell(&events, ProgressFeed::Timed(TimedProgress::new().with_increment(10)));
        events.run_for(Duration::from_millis(200), FRAME);
        let early = shell.progress();
        assert!(early > 0 && early < 100);
        events.run_for(Duration::from_millis(1000), FRAME);
        assert_eq!(shell.progress(), 100);
    }

    #[test]
    fn load_timeout_reveals_stalled_page() {
        let events = EventLoop::new();
        let config = ShellConfig::new()
            .with_timing(RevealTiming::new().with_load_timeout(Duration::from_secs(1)))
            .with_overlay(OverlayConfig::new().with_mesh(MeshConfig::new().with_grid(3, 3)));
        let shell: RevealShell<VerletWorld<f32>> = RevealShell::mount(
            &events,
            VerletWorld::default(),
            None,
            config,
            Box::new(SmallRng::seed_from_u64(2)),
            ProgressFeed::External,
        );
        shell.report_progress(30);
        events.run_for(Duration::from_secs(4), FRAME);
        assert_eq!(shell.state(), RevealState::Finished);
        assert!(shell.content_visible());
    }

    #[test]
    fn unmount_cancels_everything() {
        let events = EventLoop::new();
        let shell = shell(&events, ProgressFeed::Timed(TimedProgress::new()));
        events.run_for(Duration::from_millis(100), FRAME);
        shell.unmount();
        assert_eq!(events.frame_callbacks(), 0);
        assert_eq!(events.pending_timers(), 0);
        events.run_for(Duration::from_secs(6), FRAME);
        assert!(!shell.content_visible());
    }
}
