//! Configuration types for the solver, the cloth mesh and the reveal sequence.
//!
//! Every struct has a `new()` carrying the defaults of the preloader page and
//! chained `with_*` setters:
//!
//! ```
//! use drape::config::{MeshConfig, SolverConfig};
//! use drape::vec::Vec2;
//!
//! let solver: SolverConfig<f32> = SolverConfig::new()
//!     .with_gravity(Vec2::new(0.0, 1000.0))
//!     .with_iterations(6);
//! let mesh: MeshConfig<f32> = MeshConfig::new().with_grid(4, 4).with_stiffness(0.2);
//! assert_eq!(mesh.cols, 4);
//! assert_eq!(solver.iterations, 6);
//! ```

use core::time::Duration;

use crate::error::ClothError;
use crate::float::Float;
use crate::vec::Vec2;

/// Configuration for the Verlet world's stepper.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig<F: Float> {
    /// Number of constraint solver iterations per sub-step. Default: 4.
    pub iterations: usize,
    /// Gravity acceleration in px/s². Default: zero.
    pub gravity: Vec2<F>,
    /// Number of sub-steps per step. Default: 1.
    pub sub_steps: usize,
    /// Fixed duration of one step in seconds. Default: 1/60.
    pub time_step: F,
}

impl<F: Float> SolverConfig<F> {
    pub fn new() -> Self {
        SolverConfig {
            iterations: 4,
            gravity: Vec2::zero(),
            sub_steps: 1,
            time_step: F::one() / F::from_f64(60.0),
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2<F>) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.sub_steps = sub_steps.max(1);
        self
    }

    pub fn with_time_step(mut self, time_step: F) -> Self {
        self.time_step = time_step;
        self
    }
}

impl<F: Float> Default for SolverConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Physical parameters shared by every particle of a mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleParams<F: Float> {
    /// Disc radius in px. Default: 2.
    pub radius: F,
    /// Contact friction in [0, 1]. Default: 0.05.
    ///
    /// Only engines that resolve contacts read this; [`VerletWorld`](crate::VerletWorld)
    /// has no contacts and just stores it on the particle.
    pub friction: F,
    /// Fraction of velocity lost per step, in [0, 1). Default: 0.02.
    pub air_friction: F,
    /// Mass per unit area. Default: 0.002.
    pub density: F,
}

impl<F: Float> ParticleParams<F> {
    pub fn new() -> Self {
        ParticleParams {
            radius: F::from_f64(2.0),
            friction: F::from_f64(0.05),
            air_friction: F::from_f64(0.02),
            density: F::from_f64(0.002),
        }
    }

    pub fn with_radius(mut self, radius: F) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_friction(mut self, friction: F) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_air_friction(mut self, air_friction: F) -> Self {
        self.air_friction = air_friction;
        self
    }

    pub fn with_density(mut self, density: F) -> Self {
        self.density = density;
        self
    }

    /// Mass of one particle: density times disc area.
    pub fn mass(&self) -> F {
        self.density * F::pi() * self.radius * self.radius
    }

    pub fn validate(&self) -> Result<(), ClothError> {
        let unit = |v: F| v.is_finite() && v >= F::zero() && v <= F::one();
        if !self.radius.is_positive()
            || !self.density.is_positive()
            || !unit(self.friction)
            || !unit(self.air_friction)
            || self.air_friction >= F::one()
        {
            return Err(ClothError::InvalidParticleParams);
        }
        Ok(())
    }
}

impl<F: Float> Default for ParticleParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Grid layout and link parameters for a cloth mesh.
///
/// The target area is not part of the config: it is the viewport size the
/// overlay observes at build time.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshConfig<F: Float> {
    /// Particles per row. Default: 20.
    pub cols: usize,
    /// Particles per column. Default: 25.
    pub rows: usize,
    /// Structural link stiffness in (0, 1]. Low values favour visible wrinkles. Default: 0.2.
    pub stiffness: F,
    /// Stiffness of the top-row anchors. Default: 0.1.
    pub pin_stiffness: F,
    pub particle: ParticleParams<F>,
}

impl<F: Float> MeshConfig<F> {
    pub fn new() -> Self {
        MeshConfig {
            cols: 20,
            rows: 25,
            stiffness: F::from_f64(0.2),
            pin_stiffness: F::from_f64(0.1),
            particle: ParticleParams::new(),
        }
    }

    pub fn with_grid(mut self, cols: usize, rows: usize) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    pub fn with_stiffness(mut self, stiffness: F) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_pin_stiffness(mut self, pin_stiffness: F) -> Self {
        self.pin_stiffness = pin_stiffness;
        self
    }

    pub fn with_particle(mut self, particle: ParticleParams<F>) -> Self {
        self.particle = particle;
        self
    }

    /// Check the config against a target area of `width` x `height` px.
    pub fn validate(&self, width: F, height: F) -> Result<(), ClothError> {
        if self.cols < 2 || self.rows < 2 {
            return Err(ClothError::InvalidGridDimensions { cols: self.cols, rows: self.rows });
        }
        if !width.is_positive() || !height.is_positive() {
            return Err(ClothError::InvalidViewport { width: width.to_f64(), height: height.to_f64() });
        }
        let in_range = |k: F| k.is_positive() && k <= F::one();
        if !in_range(self.stiffness) || !in_range(self.pin_stiffness) {
            return Err(ClothError::InvalidStiffness);
        }
        self.particle.validate()
    }
}

impl<F: Float> Default for MeshConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Perturbation applied to every particle when the pins let go.
#[derive(Clone, Debug, PartialEq)]
pub struct ReleaseConfig<F: Float> {
    /// Lower bound of the re-randomised air friction. Default: 0.02.
    pub air_friction_min: F,
    /// Width of the air friction band. Default: 0.04.
    pub air_friction_spread: F,
    /// Horizontal impulses are drawn from `[-spread/2, spread/2)`. Default: 1.5.
    pub impulse_spread: F,
}

impl<F: Float> ReleaseConfig<F> {
    pub fn new() -> Self {
        ReleaseConfig {
            air_friction_min: F::from_f64(0.02),
            air_friction_spread: F::from_f64(0.04),
            impulse_spread: F::from_f64(1.5),
        }
    }

    pub fn with_air_friction(mut self, min: F, spread: F) -> Self {
        self.air_friction_min = min;
        self.air_friction_spread = spread;
        self
    }

    pub fn with_impulse_spread(mut self, spread: F) -> Self {
        self.impulse_spread = spread;
        self
    }
}

impl<F: Float> Default for ReleaseConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock timings of the reveal sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealTiming {
    /// Pause between progress reaching 100 and the release. Default: 500 ms.
    pub release_pause: Duration,
    /// Time from release to finish. Default: 2 s.
    pub settle: Duration,
    /// Force progress to 100 if loading has not completed by then. Default: none.
    pub load_timeout: Option<Duration>,
}

impl RevealTiming {
    pub fn new() -> Self {
        RevealTiming {
            release_pause: Duration::from_millis(500),
            settle: Duration::from_secs(2),
            load_timeout: None,
        }
    }

    pub fn with_release_pause(mut self, pause: Duration) -> Self {
        self.release_pause = pause;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a mounted overlay needs.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayConfig<F: Float> {
    pub mesh: MeshConfig<F>,
    /// Default gravity is 1000 px/s² downwards.
    pub solver: SolverConfig<F>,
    pub release: ReleaseConfig<F>,
    /// Time from trigger to `on_finish`. Default: 2 s.
    pub settle: Duration,
    /// Stroke width of each quad. Default: 1.
    pub line_width: F,
}

impl<F: Float> OverlayConfig<F> {
    pub fn new() -> Self {
        OverlayConfig {
            mesh: MeshConfig::new(),
            solver: SolverConfig::new().with_gravity(Vec2::new(F::zero(), F::from_f64(1000.0))),
            release: ReleaseConfig::new(),
            settle: Duration::from_secs(2),
            line_width: F::one(),
        }
    }

    pub fn with_mesh(mut self, mesh: MeshConfig<F>) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig<F>) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_release(mut self, release: ReleaseConfig<F>) -> Self {
        self.release = release;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_line_width(mut self, line_width: F) -> Self {
        self.line_width = line_width;
        self
    }
}

impl<F: Float> Default for OverlayConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of the host page shell.
///
/// `timing.settle` overrides `overlay.settle` when the shell mounts its overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct ShellConfig<F: Float> {
    pub timing: RevealTiming,
    pub overlay: OverlayConfig<F>,
}

impl<F: Float> ShellConfig<F> {
    pub fn new() -> Self {
        ShellConfig { timing: RevealTiming::new(), overlay: OverlayConfig::new() }
    }

    pub fn with_timing(mut self, timing: RevealTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_overlay(mut self, overlay: OverlayConfig<F>) -> Self {
        self.overlay = overlay;
        self
    }
}

impl<F: Float> Default for ShellConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}
