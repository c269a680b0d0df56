//! Verlet particles with per-particle air friction and pending impulses.

use crate::config::ParticleParams;
use crate::float::Float;
use crate::vec::Vec2;

/// Collision filter group.
///
/// Particles sharing a negative group never collide with each other; a
/// positive shared group always collides; group 0 means "no group".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CollisionGroup(pub i32);

impl CollisionGroup {
    pub const NONE: CollisionGroup = CollisionGroup(0);

    /// Filter rule for engines that resolve contacts. The Verlet world has
    /// none, so it only hands groups out through `next_group`.
    pub fn collides_with(self, other: CollisionGroup) -> bool {
        if self.0 != 0 && self.0 == other.0 {
            return self.0 > 0;
        }
        true
    }

    pub fn is_non_colliding(self) -> bool {
        self.0 < 0
    }
}

/// A point mass integrated with position Verlet.
#[derive(Clone, Debug)]
pub struct Particle<F: Float> {
    pub pos: Vec2<F>,
    pub prev_pos: Vec2<F>,
    pub acceleration: Vec2<F>,
    /// Impulse accumulated since the last integration.
    pub impulse: Vec2<F>,
    pub radius: F,
    pub mass: F,
    pub inv_mass: F,
    pub friction: F,
    pub air_friction: F,
    pub group: CollisionGroup,
}

impl<F: Float> Particle<F> {
    pub fn new(pos: Vec2<F>, params: &ParticleParams<F>, group: CollisionGroup) -> Self {
        let mass = params.mass();
        let inv_mass = if mass.is_near_zero(F::from_f64(1e-10)) {
            F::zero()
        } else {
            F::one() / mass
        };
        Particle {
            pos,
            prev_pos: pos,
            acceleration: Vec2::zero(),
            impulse: Vec2::zero(),
            radius: params.radius,
            mass,
            inv_mass,
            friction: params.friction,
            air_friction: params.air_friction,
            group,
        }
    }

    pub fn apply_acceleration(&mut self, accel: Vec2<F>) {
        if self.inv_mass > F::zero() {
            self.acceleration = self.acceleration + accel;
        }
    }

    /// Queue an instantaneous change of momentum, applied at the next integration.
    pub fn apply_impulse(&mut self, impulse: Vec2<F>) {
        self.impulse = self.impulse + impulse;
    }

    pub fn integrate(&mut self, dt: F) {
        if self.inv_mass <= F::zero() {
            return;
        }
        let damping = F::one() - self.air_friction;
        let kick = self.impulse.scale(self.inv_mass * dt);
        let velocity = (self.pos - self.prev_pos).scale(damping) + kick;
        let new_pos = self.pos + velocity + self.acceleration.scale(dt * dt);
        self.prev_pos = self.pos;
        self.pos = new_pos;
        self.acceleration = Vec2::zero();
        self.impulse = Vec2::zero();
    }

    /// Velocity in px/s, given the step that produced the current position.
    pub fn velocity(&self, dt: F) -> Vec2<F> {
        if dt.is_near_zero(F::from_f64(1e-30)) {
            return Vec2::zero();
        }
        (self.pos - self.prev_pos).scale(F::one() / dt)
    }
}
