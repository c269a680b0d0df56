//! One overlay's simulation: the world it owns, the mesh built in it, and the pins.

use rand::{Rng, RngCore};

use crate::config::{MeshConfig, ReleaseConfig};
use crate::error::ClothError;
use crate::float::Float;
use crate::mesh::ClothMesh;
use crate::pins::PinSet;
use crate::vec::Vec2;
use crate::world::{ParticleProperty, PhysicsWorld};

/// Exclusively owned by one overlay; created at mount, cleared at teardown.
pub struct SimulationContext<W: PhysicsWorld> {
    world: W,
    mesh: Option<ClothMesh<W::Scalar>>,
    pins: PinSet,
}

impl<W: PhysicsWorld> SimulationContext<W> {
    pub fn new(world: W) -> Self {
        SimulationContext { world, mesh: None, pins: PinSet::new() }
    }

    /// Build the grid over `width x height` and pin its top row.
    pub fn build(
        &mut self,
        config: &MeshConfig<W::Scalar>,
        width: W::Scalar,
        height: W::Scalar,
    ) -> Result<&ClothMesh<W::Scalar>, ClothError> {
        if self.mesh.is_some() {
            return Err(ClothError::MeshAlreadyBuilt);
        }
        let mesh = ClothMesh::build(&mut self.world, config, width, height)?;
        self.pins.pin_top_row(&mut self.world, &mesh, config.pin_stiffness)?;
        Ok(self.mesh.insert(mesh))
    }

    /// Drop the pins and disturb every particle.
    ///
    /// Only the first call has any effect; returns whether it was this one.
    pub fn release(&mut self, rng: &mut dyn RngCore, config: &ReleaseConfig<W::Scalar>) -> bool {
        if self.pins.is_released() {
            return false;
        }
        self.pins.release(&mut self.world);

        if let Some(mesh) = &self.mesh {
            for &handle in mesh.particles() {
                let air = config.air_friction_min
                    + config.air_friction_spread * W::Scalar::from_f64(rng.gen::<f64>());
                self.world.set_property(handle, ParticleProperty::AirFriction(air));

                let push = (W::Scalar::from_f64(rng.gen::<f64>()) - W::Scalar::half()) * config.impulse_spread;
                self.world.apply_impulse(handle, Vec2::new(push, W::Scalar::zero()));
            }
        }
        true
    }

    /// Advance the world by one step, if there is anything to simulate.
    pub fn step(&mut self) {
        if self.mesh.is_some() {
            self.world.step();
        }
    }

    pub fn teardown(&mut self) {
        self.mesh = None;
        self.world.clear();
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn mesh(&self) -> Option<&ClothMesh<W::Scalar>> {
        self.mesh.as_ref()
    }

    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub fn is_released(&self) -> bool {
        self.pins.is_released()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::VerletWorld;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn context() -> SimulationContext<VerletWorld<f32>> {
        let mut ctx = SimulationContext::new(VerletWorld::default());
        ctx.build(&MeshConfig::new().with_grid(4, 4), 300.0, 300.0).unwrap();
        ctx
    }

    #[test]
    fn build_pins_top_row() {
        let ctx = context();
        assert_eq!(ctx.pins().len(), 4);
        assert_eq!(ctx.world().link_count(), 24 + 4);
    }

    #[test]
    fn second_build_is_rejected() {
        let mut ctx = context();
        let err = ctx.build(&MeshConfig::new(), 300.0, 300.0).unwrap_err();
        assert_eq!(err, ClothError::MeshAlreadyBuilt);
    }

    #[test]
    fn release_randomises_air_friction_within_band() {
        let mut ctx = context();
        let mut rng = SmallRng::seed_from_u64(7);
        assert!(ctx.release(&mut rng, &ReleaseConfig::new()));
        let mesh = ctx.mesh().unwrap();
        for &h in mesh.particles() {
            let air = ctx.world().particle(h).unwrap().air_friction;
            assert!((0.02..=0.06).contains(&air), "air friction {} outside band", air);
        }
        assert_eq!(ctx.world().anchor_count(), 0);
    }

    #[test]
    fn second_release_does_nothing() {
        let mut ctx = context();
        let mut rng = SmallRng::seed_from_u64(7);
        ctx.release(&mut rng, &ReleaseConfig::new());
        let before: alloc::vec::Vec<f32> = ctx
            .mesh()
            .unwrap()
            .particles()
            .iter()
            .map(|&h| ctx.world().particle(h).unwrap().air_friction)
            .collect();
        assert!(!ctx.release(&mut rng, &ReleaseConfig::new()));
        for (i, &h) in ctx.mesh().unwrap().particles().iter().enumerate() {
            assert_eq!(ctx.world().particle(h).unwrap().air_friction, before[i]);
        }
    }

    #[test]
    fn teardown_clears_world() {
        let mut ctx = context();
        ctx.teardown();
        assert!(ctx.mesh().is_none());
        assert_eq!(ctx.world().particle_count(), 0);
    }
}
