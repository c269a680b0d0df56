//! Cloth mesh: a regular grid of particles joined by structural links.

use alloc::vec::Vec as AllocVec;

use crate::config::MeshConfig;
use crate::error::ClothError;
use crate::float::Float;
use crate::particle::CollisionGroup;
use crate::vec::Vec2;
use crate::world::{LinkHandle, ParticleHandle, PhysicsWorld};

/// Handles into a world describing one cloth grid.
///
/// Particle `(row, col)` sits at index `row * cols + col` and rests at
/// `(col * spacing.x, row * spacing.y)`.
#[derive(Clone, Debug)]
pub struct ClothMesh<F: Float> {
    cols: usize,
    rows: usize,
    spacing: Vec2<F>,
    particles: AllocVec<ParticleHandle>,
    horizontal: AllocVec<LinkHandle>,
    vertical: AllocVec<LinkHandle>,
    group: CollisionGroup,
}

impl<F: Float> ClothMesh<F> {
    /// Build a `cols x rows` grid covering `width x height` px.
    ///
    /// Each particle is linked to its left neighbour and to the one above it as
    /// soon as it is created, so a link exists iff both ends are in the grid.
    /// Building is deterministic; nothing random happens until release.
    pub fn build<W: PhysicsWorld<Scalar = F>>(
        world: &mut W,
        config: &MeshConfig<F>,
        width: F,
        height: F,
    ) -> Result<Self, ClothError> {
        config.validate(width, height)?;

        let cols = config.cols;
        let rows = config.rows;
        let spacing = Vec2::new(
            width / F::from_usize(cols - 1),
            height / F::from_usize(rows - 1),
        );
        let group = world.next_group();

        let mut particles = AllocVec::with_capacity(cols * rows);
        let mut horizontal = AllocVec::with_capacity((cols - 1) * rows);
        let mut vertical = AllocVec::with_capacity(cols * (rows - 1));

        for row in 0..rows {
            for col in 0..cols {
                let pos = Vec2::new(F::from_usize(col) * spacing.x, F::from_usize(row) * spacing.y);
                let handle = world.create_particle(pos, &config.particle, group);
                particles.push(handle);

                if col > 0 {
                    let left = particles[row * cols + col - 1];
                    horizontal.push(world.create_link(left, handle, config.stiffness, spacing.x)?);
                }
                if row > 0 {
                    let above = particles[(row - 1) * cols + col];
                    vertical.push(world.create_link(above, handle, config.stiffness, spacing.y)?);
                }
            }
        }

        log::debug!(
            "cloth mesh {}x{} over {:.0}x{:.0}px: {} particles, {} links",
            cols,
            rows,
            width.to_f64(),
            height.to_f64(),
            particles.len(),
            horizontal.len() + vertical.len()
        );

        Ok(ClothMesh { cols, rows, spacing, particles, horizontal, vertical, group })
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn particle(&self, row: usize, col: usize) -> Option<ParticleHandle> {
        if row < self.rows && col < self.cols {
            Some(self.particles[self.index(row, col)])
        } else {
            None
        }
    }

    pub fn rest_position(&self, row: usize, col: usize) -> Vec2<F> {
        Vec2::new(F::from_usize(col) * self.spacing.x, F::from_usize(row) * self.spacing.y)
    }

    /// Current position of `(row, col)`, or its rest position if the world has none.
    pub fn position_at<W: PhysicsWorld<Scalar = F>>(&self, world: &W, row: usize, col: usize) -> Vec2<F> {
        self.particle(row, col)
            .and_then(|h| world.position(h))
            .filter(|p| p.is_finite())
            .unwrap_or_else(|| self.rest_position(row, col))
    }

    /// Row 0, left to right.
    pub fn top_row(&self) -> &[ParticleHandle] {
        &self.particles[..self.cols]
    }

    pub fn particles(&self) -> &[ParticleHandle] {
        &self.particles
    }

    /// Links `(r, c-1)-(r, c)` in build order.
    pub fn horizontal_links(&self) -> &[LinkHandle] {
        &self.horizontal
    }

    /// Links `(r-1, c)-(r, c)` in build order.
    pub fn vertical_links(&self) -> &[LinkHandle] {
        &self.vertical
    }

    pub fn spacing(&self) -> Vec2<F> {
        self.spacing
    }

    /// Area of one undeformed cell.
    pub fn rest_area(&self) -> F {
        self.spacing.x * self.spacing.y
    }

    pub fn group(&self) -> CollisionGroup {
        self.group
    }

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }
    pub fn particle_count(&self) -> usize { self.particles.len() }
    pub fn horizontal_link_count(&self) -> usize { self.horizontal.len() }
    pub fn vertical_link_count(&self) -> usize { self.vertical.len() }
    pub fn link_count(&self) -> usize { self.horizontal.len() + self.vertical.len() }
}
