//! Top-row anchors that keep the cloth hanging until release.

use alloc::vec::Vec as AllocVec;

use crate::error::ClothError;
use crate::float::Float;
use crate::mesh::ClothMesh;
use crate::world::{LinkHandle, PhysicsWorld};

/// Owns the anchor links of one mesh.
#[derive(Clone, Debug, Default)]
pub struct PinSet {
    links: AllocVec<LinkHandle>,
    released: bool,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor each row-0 particle to where it currently is.
    ///
    /// Does nothing once pinned or released; returns the number of pins created.
    pub fn pin_top_row<F: Float, W: PhysicsWorld<Scalar = F>>(
        &mut self,
        world: &mut W,
        mesh: &ClothMesh<F>,
        stiffness: F,
    ) -> Result<usize, ClothError> {
        if self.released || !self.links.is_empty() {
            return Ok(0);
        }
        for (col, &handle) in mesh.top_row().iter().enumerate() {
            let anchor = mesh.position_at(&*world, 0, col);
            self.links.push(world.create_anchor_link(handle, anchor, stiffness)?);
        }
        log::debug!("pinned {} top-row particles", self.links.len());
        Ok(self.links.len())
    }

    /// Remove every pin in one batch. Later calls are no-ops returning 0.
    pub fn release<F: Float, W: PhysicsWorld<Scalar = F>>(&mut self, world: &mut W) -> usize {
        self.released = true;
        if self.links.is_empty() {
            return 0;
        }
        let removed = world.remove_links(&self.links);
        self.links.clear();
        log::debug!("released {} pins", removed);
        removed
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;
    use crate::world::VerletWorld;

    fn setup() -> (VerletWorld<f32>, ClothMesh<f32>) {
        let mut world = VerletWorld::default();
        let mesh = ClothMesh::build(&mut world, &MeshConfig::new().with_grid(5, 3), 400.0, 200.0).unwrap();
        (world, mesh)
    }

    #[test]
    fn pins_one_per_column() {
        let (mut world, mesh) = setup();
        let mut pins = PinSet::new();
        assert_eq!(pins.pin_top_row(&mut world, &mesh, 0.1).unwrap(), 5);
        assert_eq!(world.anchor_count(), 5);
        assert_eq!(pins.pin_top_row(&mut world, &mesh, 0.1).unwrap(), 0);
        assert_eq!(world.anchor_count(), 5);
    }

    #[test]
    fn release_is_idempotent() {
        let (mut world, mesh) = setup();
        let mut pins = PinSet::new();
        pins.pin_top_row(&mut world, &mesh, 0.1).unwrap();
        assert_eq!(pins.release(&mut world), 5);
        assert_eq!(pins.release(&mut world), 0);
        assert_eq!(world.anchor_count(), 0);
        assert_eq!(world.particle_count(), 15);
    }

    #[test]
    fn release_before_pinning_is_harmless_and_final() {
        let (mut world, mesh) = setup();
        let mut pins = PinSet::new();
        assert_eq!(pins.release(&mut world), 0);
        assert!(pins.is_released());
        assert_eq!(pins.pin_top_row(&mut world, &mesh, 0.1).unwrap(), 0);
        assert_eq!(world.anchor_count(), 0);
    }
}
