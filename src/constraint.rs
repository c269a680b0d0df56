//! Links between particles: particle-to-particle distance and particle-to-point anchor.

use crate::float::Float;
use crate::particle::Particle;
use crate::vec::Vec2;

/// A constraint stored in the world.
#[derive(Clone, Debug, PartialEq)]
pub enum Link<F: Float> {
    Distance(DistanceLink<F>),
    Anchor(AnchorLink<F>),
}

/// Keeps two particles `rest_length` apart.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceLink<F: Float> {
    pub a: usize,
    pub b: usize,
    pub rest_length: F,
    pub stiffness: F,
}

/// Pulls one particle towards a fixed world point.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorLink<F: Float> {
    pub particle: usize,
    pub point: Vec2<F>,
    pub stiffness: F,
}

impl<F: Float> Link<F> {
    pub fn solve(&self, particles: &mut [Particle<F>]) {
        match self {
            Link::Distance(c) => c.solve(particles),
            Link::Anchor(c) => c.solve(particles),
        }
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self, Link::Anchor(_))
    }
}

impl<F: Float> DistanceLink<F> {
    pub fn new(a: usize, b: usize, rest_length: F, stiffness: F) -> Self {
        DistanceLink { a, b, rest_length, stiffness }
    }

    pub fn solve(&self, particles: &mut [Particle<F>]) {
        let a_pos = particles[self.a].pos;
        let b_pos = particles[self.b].pos;
        let a_inv = particles[self.a].inv_mass;
        let b_inv = particles[self.b].inv_mass;

        let w_total = a_inv + b_inv;
        if w_total.is_near_zero(F::from_f64(1e-10)) {
            return; // both static
        }

        let delta = b_pos - a_pos;
        let dist = delta.length();
        if dist.is_near_zero(F::from_f64(1e-10)) {
            return; // degenerate
        }

        let error = dist - self.rest_length;
        let correction = delta.scale(error * self.stiffness / dist);

        particles[self.a].pos = particles[self.a].pos + correction.scale(a_inv / w_total);
        particles[self.b].pos = particles[self.b].pos - correction.scale(b_inv / w_total);
    }
}

impl<F: Float> AnchorLink<F> {
    pub fn new(particle: usize, point: Vec2<F>, stiffness: F) -> Self {
        AnchorLink { particle, point, stiffness }
    }

    pub fn solve(&self, particles: &mut [Particle<F>]) {
        let p = &mut particles[self.particle];
        if p.inv_mass <= F::zero() {
            return;
        }
        let correction = self.point - p.pos;
        p.pos = p.pos + correction.scale(self.stiffness);
    }
}
