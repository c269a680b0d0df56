//! The physics collaborator: a trait the cloth composes, and a Verlet implementation of it.

use alloc::vec::Vec as AllocVec;

use crate::config::{ParticleParams, SolverConfig};
use crate::constraint::{AnchorLink, DistanceLink, Link};
use crate::error::ClothError;
use crate::float::Float;
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::particle::{CollisionGroup, Particle};
use crate::vec::Vec2;

/// Opaque reference to a particle owned by a world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleHandle(pub(crate) usize);

impl ParticleHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Opaque reference to a link owned by a world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkHandle(pub(crate) usize);

impl LinkHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Mutable per-particle property.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParticleProperty<F: Float> {
    AirFriction(F),
    /// Contact friction. Stored by [`VerletWorld`], which has no contacts to apply it to.
    Friction(F),
}

/// Operations the cloth needs from a physics engine.
///
/// The mesh builder, pin manager and renderer only talk to the world through
/// this trait; [`VerletWorld`] is the default engine.
pub trait PhysicsWorld {
    type Scalar: Float;

    /// Allocate a fresh collision group whose members never collide with each other.
    fn next_group(&mut self) -> CollisionGroup;

    fn create_particle(
        &mut self,
        position: Vec2<Self::Scalar>,
        params: &ParticleParams<Self::Scalar>,
        group: CollisionGroup,
    ) -> ParticleHandle;

    fn create_link(
        &mut self,
        a: ParticleHandle,
        b: ParticleHandle,
        stiffness: Self::Scalar,
        rest_length: Self::Scalar,
    ) -> Result<LinkHandle, ClothError>;

    fn create_anchor_link(
        &mut self,
        particle: ParticleHandle,
        point: Vec2<Self::Scalar>,
        stiffness: Self::Scalar,
    ) -> Result<LinkHandle, ClothError>;

    /// Remove a batch of links at once. Unknown or already removed handles are
    /// skipped; returns how many links were removed.
    fn remove_links(&mut self, links: &[LinkHandle]) -> usize;

    fn remove_link(&mut self, link: LinkHandle) -> bool {
        self.remove_links(&[link]) == 1
    }

    fn apply_impulse(&mut self, particle: ParticleHandle, impulse: Vec2<Self::Scalar>);

    fn set_property(&mut self, particle: ParticleHandle, property: ParticleProperty<Self::Scalar>);

    /// Advance the simulation by one fixed step.
    fn step(&mut self);

    fn position(&self, particle: ParticleHandle) -> Option<Vec2<Self::Scalar>>;

    fn particle_count(&self) -> usize;

    fn link_count(&self) -> usize;

    /// Drop every particle and link.
    fn clear(&mut self);
}

/// Position-based Verlet world with soft distance and anchor links.
///
/// Links live in slots so handles stay valid after removals.
pub struct VerletWorld<F: Float> {
    particles: AllocVec<Particle<F>>,
    links: AllocVec<Option<Link<F>>>,
    live_links: usize,
    config: SolverConfig<F>,
    last_group: i32,
    steps: u64,
}

impl<F: Float> VerletWorld<F> {
    pub fn new(config: SolverConfig<F>) -> Self {
        VerletWorld {
            particles: AllocVec::new(),
            links: AllocVec::new(),
            live_links: 0,
            config,
            last_group: 0,
            steps: 0,
        }
    }

    pub fn config(&self) -> &SolverConfig<F> {
        &self.config
    }

    pub fn particle(&self, handle: ParticleHandle) -> Option<&Particle<F>> {
        self.particles.get(handle.0)
    }

    pub fn link(&self, handle: LinkHandle) -> Option<&Link<F>> {
        self.links.get(handle.0).and_then(Option::as_ref)
    }

    pub fn anchor_count(&self) -> usize {
        self.links.iter().flatten().filter(|l| l.is_anchor()).count()
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn step_observed<O: StepObserver>(&mut self, observer: &mut O) {
        let sub_dt = self.config.time_step / F::from_usize(self.config.sub_steps);

        for _sub in 0..self.config.sub_steps {
            for p in self.particles.iter_mut() {
                p.apply_acceleration(self.config.gravity);
            }

            for p in self.particles.iter_mut() {
                p.integrate(sub_dt);
            }
            observer.on_integrate();

            for i in 0..self.config.iterations {
                for link in self.links.iter().flatten() {
                    link.solve(&mut self.particles);
                }
                observer.on_constraint_iteration(i);
            }
        }

        self.steps += 1;
        observer.on_step_complete(self.steps);
    }

    fn check(&self, handle: ParticleHandle) -> Result<usize, ClothError> {
        if handle.0 < self.particles.len() {
            Ok(handle.0)
        } else {
            Err(ClothError::ParticleOutOfBounds { index: handle.0, count: self.particles.len() })
        }
    }

    fn push_link(&mut self, link: Link<F>) -> LinkHandle {
        self.links.push(Some(link));
        self.live_links += 1;
        LinkHandle(self.links.len() - 1)
    }
}

impl<F: Float> Default for VerletWorld<F> {
    fn default() -> Self {
        Self::new(SolverConfig::new())
    }
}

impl<F: Float> PhysicsWorld for VerletWorld<F> {
    type Scalar = F;

    fn next_group(&mut self) -> CollisionGroup {
        self.last_group -= 1;
        CollisionGroup(self.last_group)
    }

    fn create_particle(
        &mut self,
        position: Vec2<F>,
        params: &ParticleParams<F>,
        group: CollisionGroup,
    ) -> ParticleHandle {
        self.particles.push(Particle::new(position, params, group));
        ParticleHandle(self.particles.len() - 1)
    }

    fn create_link(
        &mut self,
        a: ParticleHandle,
        b: ParticleHandle,
        stiffness: F,
        rest_length: F,
    ) -> Result<LinkHandle, ClothError> {
        let a = self.check(a)?;
        let b = self.check(b)?;
        Ok(self.push_link(Link::Distance(DistanceLink::new(a, b, rest_length, stiffness))))
    }

    fn create_anchor_link(
        &mut self,
        particle: ParticleHandle,
        point: Vec2<F>,
        stiffness: F,
    ) -> Result<LinkHandle, ClothError> {
        let particle = self.check(particle)?;
        Ok(self.push_link(Link::Anchor(AnchorLink::new(particle, point, stiffness))))
    }

    fn remove_links(&mut self, links: &[LinkHandle]) -> usize {
        let mut removed = 0;
        for handle in links {
            if let Some(slot) = self.links.get_mut(handle.0) {
                if slot.take().is_some() {
                    removed += 1;
                }
            }
        }
        self.live_links -= removed;
        removed
    }

    fn apply_impulse(&mut self, particle: ParticleHandle, impulse: Vec2<F>) {
        if let Some(p) = self.particles.get_mut(particle.0) {
            p.apply_impulse(impulse);
        }
    }

    fn set_property(&mut self, particle: ParticleHandle, property: ParticleProperty<F>) {
        if let Some(p) = self.particles.get_mut(particle.0) {
            match property {
                ParticleProperty::AirFriction(v) => p.air_friction = v,
                ParticleProperty::Friction(v) => p.friction = v,
            }
        }
    }

    fn step(&mut self) {
        self.step_observed(&mut NoOpStepObserver);
    }

    fn position(&self, particle: ParticleHandle) -> Option<Vec2<F>> {
        self.particles.get(particle.0).map(|p| p.pos)
    }

    fn particle_count(&self) -> usize {
        self.particles.len()
    }

    fn link_count(&self) -> usize {
        self.live_links
    }

    fn clear(&mut self) {
        self.particles.clear();
        self.links.clear();
        self.live_links = 0;
    }
}
