use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use drape::{
    ClothError, ClothOverlay, CollisionGroup, DrawCommand, DrawSurface, EventLoop, LinkHandle, MeshConfig,
    OverlayConfig, ParticleHandle, ParticleParams, ParticleProperty, PhysicsWorld, ProgressFeed,
    RecordingSurface, RevealShell, RevealState, Shade, ShellConfig, Vec2, VerletWorld,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

const FRAME: Duration = Duration::from_millis(16);

/// Counters shared between a test and the world it hands to an overlay.
#[derive(Clone, Default)]
struct Counters {
    remove_batches: Rc<Cell<usize>>,
    impulses: Rc<Cell<usize>>,
    steps: Rc<Cell<usize>>,
    /// Order of world steps and surface clears across frames.
    calls: Rc<RefCell<Vec<&'static str>>>,
}

/// A Verlet world that counts the calls the overlay makes.
struct CountingWorld {
    inner: VerletWorld<f32>,
    counters: Counters,
}

impl PhysicsWorld for CountingWorld {
    type Scalar = f32;

    fn next_group(&mut self) -> CollisionGroup {
        self.inner.next_group()
    }

    fn create_particle(
        &mut self,
        position: Vec2<f32>,
        params: &ParticleParams<f32>,
        group: CollisionGroup,
    ) -> ParticleHandle {
        self.inner.create_particle(position, params, group)
    }

    fn create_link(
        &mut self,
        a: ParticleHandle,
        b: ParticleHandle,
        stiffness: f32,
        rest_length: f32,
    ) -> Result<LinkHandle, ClothError> {
        self.inner.create_link(a, b, stiffness, rest_length)
    }

    fn create_anchor_link(
        &mut self,
        particle: ParticleHandle,
        point: Vec2<f32>,
        stiffness: f32,
    ) -> Result<LinkHandle, ClothError> {
        self.inner.create_anchor_link(particle, point, stiffness)
    }

    fn remove_links(&mut self, links: &[LinkHandle]) -> usize {
        self.counters.remove_batches.set(self.counters.remove_batches.get() + 1);
        self.inner.remove_links(links)
    }

    fn apply_impulse(&mut self, particle: ParticleHandle, impulse: Vec2<f32>) {
        self.counters.impulses.set(self.counters.impulses.get() + 1);
        self.inner.apply_impulse(particle, impulse);
    }

    fn set_property(&mut self, particle: ParticleHandle, property: ParticleProperty<f32>) {
        self.inner.set_property(particle, property);
    }

    fn step(&mut self) {
        self.counters.steps.set(self.counters.steps.get() + 1);
        self.counters.calls.borrow_mut().push("step");
        self.inner.step();
    }

    fn position(&self, particle: ParticleHandle) -> Option<Vec2<f32>> {
        self.inner.position(particle)
    }

    fn particle_count(&self) -> usize {
        self.inner.particle_count()
    }

    fn link_count(&self) -> usize {
        self.inner.link_count()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

fn small_config() -> ShellConfig<f32> {
    ShellConfig::new().with_overlay(OverlayConfig::new().with_mesh(MeshConfig::new().with_grid(4, 4)))
}

/// A recording surface that also notes each `clear` in the shared call log.
struct OrderedSurface {
    inner: RecordingSurface<f32>,
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl DrawSurface<f32> for OrderedSurface {
    fn size(&self) -> (f32, f32) {
        self.inner.size()
    }

    fn clear(&mut self) {
        self.calls.borrow_mut().push("clear");
        self.inner.clear();
    }

    fn fill_polygon(&mut self, points: &[Vec2<f32>], shade: Shade<f32>) {
        self.inner.fill_polygon(points, shade);
    }

    fn stroke_polygon(&mut self, points: &[Vec2<f32>], shade: Shade<f32>, line_width: f32) {
        self.inner.stroke_polygon(points, shade, line_width);
    }
}

fn counting_shell(events: &EventLoop, surface: &RecordingSurface<f32>) -> (RevealShell<CountingWorld>, Counters) {
    let counters = Counters::default();
    let shell = mount_counting(events, Box::new(surface.clone()), counters.clone());
    (shell, counters)
}

fn mount_counting(
    events: &EventLoop,
    surface: Box<dyn DrawSurface<f32>>,
    counters: Counters,
) -> RevealShell<CountingWorld> {
    let config = small_config();
    let world = CountingWorld {
        inner: VerletWorld::new(config.overlay.solver.clone()),
        counters: counters.clone(),
    };
    RevealShell::mount(
        events,
        world,
        Some(surface),
        config,
        Box::new(SmallRng::seed_from_u64(42)),
        ProgressFeed::External,
    )
}

#[test]
fn four_by_four_reveal_end_to_end() {
    let events = EventLoop::new();
    let surface = RecordingSurface::<f32>::new(300.0, 300.0);
    let (shell, counters) = counting_shell(&events, &surface);

    events.advance(FRAME);
    let built = shell
        .with_overlay(|o| {
            o.inspect(|ctx| {
                let mesh = ctx.mesh().unwrap();
                (
                    mesh.particle_count(),
                    mesh.horizontal_link_count(),
                    mesh.vertical_link_count(),
                    ctx.pins().len(),
                )
            })
        })
        .unwrap();
    assert_eq!(built, (16, 12, 12, 4));
    assert_eq!(surface.last_frame_shades().len(), 9);

    let mut seen = Vec::new();
    for p in [0, 50, 100] {
        shell.report_progress(p);
        seen.push(shell.progress());
        events.advance(FRAME);
    }
    assert_eq!(seen, [0, 50, 100]);
    assert_eq!(counters.remove_batches.get(), 0);

    events.run_for(Duration::from_millis(500), FRAME);
    assert!(matches!(shell.state(), RevealState::Released { .. }));
    assert_eq!(counters.remove_batches.get(), 1);
    assert_eq!(counters.impulses.get(), 16);
    let particles = shell.with_overlay(|o| o.inspect(|ctx| ctx.world().particle_count())).unwrap();
    assert_eq!(particles, 16);

    events.run_for(Duration::from_millis(2100), FRAME);
    assert_eq!(shell.state(), RevealState::Finished);
    assert!(shell.content_visible());
    assert!(!shell.overlay_mounted());
    assert_eq!(counters.remove_batches.get(), 1);

    assert_eq!(events.frame_callbacks(), 0);
    assert_eq!(events.pending_timers(), 0);
}

#[test]
fn release_happens_in_a_single_batch_even_if_retriggered() {
    let events = EventLoop::new();
    let surface = RecordingSurface::<f32>::new(300.0, 300.0);
    let (shell, counters) = counting_shell(&events, &surface);
    events.advance(FRAME);
    shell.report_progress(100);
    events.run_for(Duration::from_millis(600), FRAME);

    shell.with_overlay(|o| {
        o.set_trigger(true);
        o.set_trigger(true);
    });
    shell.report_progress(100);
    events.run_for(Duration::from_millis(500), FRAME);
    assert_eq!(counters.remove_batches.get(), 1);
    assert_eq!(counters.impulses.get(), 16);
}

#[test]
fn every_frame_steps_before_it_draws() {
    let events = EventLoop::new();
    let counters = Counters::default();
    let surface = OrderedSurface {
        inner: RecordingSurface::<f32>::new(300.0, 300.0),
        calls: Rc::clone(&counters.calls),
    };
    let _shell = mount_counting(&events, Box::new(surface), counters.clone());

    for frame in 1..=10 {
        events.advance(FRAME);
        let calls = counters.calls.borrow();
        assert_eq!(calls.len(), frame * 2);
        assert_eq!(&calls[calls.len() - 2..], ["step", "clear"], "frame {} drew before stepping", frame);
    }
}

#[test]
fn first_frame_draws_post_step_positions() {
    let events = EventLoop::new();
    let surface = RecordingSurface::<f32>::new(300.0, 300.0);
    let (shell, _counters) = counting_shell(&events, &surface);
    events.advance(FRAME);

    let (current, rest) = shell
        .with_overlay(|o| {
            o.inspect(|ctx| {
                let mesh = ctx.mesh().unwrap();
                let bottom_left = mesh.particle(3, 0).unwrap();
                (ctx.world().position(bottom_left).unwrap(), mesh.rest_position(3, 0))
            })
        })
        .unwrap();
    assert!(current.y > rest.y, "gravity should have moved the bottom row");

    // Quad (2, 0) has particle (3, 0) as its bottom-left corner.
    let drawn = surface.last_frame().into_iter().any(|c| match c {
        DrawCommand::Fill { points, .. } => points[3] == current,
        _ => false,
    });
    assert!(drawn, "no quad was drawn at the stepped position {:?}", current);
}

#[test]
fn on_finish_fires_exactly_once() {
    let events = EventLoop::new();
    let finished = Rc::new(RefCell::new(0u32));
    let f = Rc::clone(&finished);
    let config: OverlayConfig<f32> = OverlayConfig::new().with_mesh(MeshConfig::new().with_grid(4, 4));
    let overlay = ClothOverlay::mount(
        &events,
        VerletWorld::new(config.solver.clone()),
        Some(Box::new(RecordingSurface::<f32>::new(300.0, 300.0)) as Box<dyn DrawSurface<f32>>),
        config,
        Box::new(SmallRng::seed_from_u64(5)),
        move || *f.borrow_mut() += 1,
    );

    events.advance(FRAME);
    overlay.set_trigger(true);
    events.run_for(Duration::from_secs(10), FRAME);
    overlay.set_trigger(true);
    events.run_for(Duration::from_secs(3), FRAME);
    assert_eq!(*finished.borrow(), 1);
}

#[test]
fn unmount_mid_flight_leaves_nothing_behind() {
    let events = EventLoop::new();
    let surface = RecordingSurface::<f32>::new(300.0, 300.0);
    let (shell, _counters) = counting_shell(&events, &surface);
    events.advance(FRAME);
    shell.report_progress(100);
    events.run_for(Duration::from_millis(900), FRAME);
    assert!(matches!(shell.state(), RevealState::Released { .. }));

    shell.unmount();
    assert_eq!(events.frame_callbacks(), 0);
    assert_eq!(events.pending_timers(), 0);

    let frames = surface.frames();
    events.run_for(Duration::from_secs(5), FRAME);
    assert_eq!(surface.frames(), frames);
    assert!(!shell.content_visible());
}

#[test]
fn page_without_surface_is_still_revealed() {
    let events = EventLoop::new();
    let shell: RevealShell<VerletWorld<f32>> = RevealShell::mount(
        &events,
        VerletWorld::default(),
        None,
        small_config(),
        Box::new(SmallRng::seed_from_u64(9)),
        ProgressFeed::External,
    );
    shell.report_progress(100);
    events.run_for(Duration::from_secs(3), FRAME);
    assert_eq!(shell.state(), RevealState::Finished);
    assert!(shell.content_visible());
}

#[test]
fn zero_size_viewport_waits_for_layout() {
    let events = EventLoop::new();
    let surface = RecordingSurface::<f32>::new(0.0, 0.0);
    let (shell, counters) = counting_shell(&events, &surface);
    events.run_for(Duration::from_millis(200), FRAME);
    assert_eq!(surface.frames(), 0);
    assert_eq!(counters.steps.get(), 0);
    assert_eq!(shell.with_overlay(|o| o.is_built()), Some(false));

    surface.resize(300.0, 300.0);
    events.advance(FRAME);
    assert_eq!(surface.frames(), 1);
    assert_eq!(shell.with_overlay(|o| o.is_built()), Some(true));
}
