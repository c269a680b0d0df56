//! Error types for mesh construction and world access.

use core::fmt;

/// Errors raised while building or pinning a cloth mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum ClothError {
    /// Grid must be at least 2x2.
    InvalidGridDimensions { cols: usize, rows: usize },
    /// Target area must be positive and finite in both axes.
    InvalidViewport { width: f64, height: f64 },
    /// Link stiffness must be in (0, 1].
    InvalidStiffness,
    /// Radius and density must be positive, friction coefficients in [0, 1).
    InvalidParticleParams,
    /// Particle handle does not belong to this world.
    ParticleOutOfBounds { index: usize, count: usize },
    /// The context already holds a mesh.
    MeshAlreadyBuilt,
}

impl fmt::Display for ClothError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClothError::InvalidGridDimensions { cols, rows } => {
                write!(f, "grid must be at least 2x2 (got {}x{})", cols, rows)
            }
            ClothError::InvalidViewport { width, height } => {
                write!(f, "viewport {}x{} has no area", width, height)
            }
            ClothError::InvalidStiffness => write!(f, "stiffness must be in (0, 1]"),
            ClothError::InvalidParticleParams => {
                write!(f, "particle radius and density must be positive, friction in [0, 1)")
            }
            ClothError::ParticleOutOfBounds { index, count } => {
                write!(f, "particle index {} out of bounds (count: {})", index, count)
            }
            ClothError::MeshAlreadyBuilt => write!(f, "mesh already built for this context"),
        }
    }
}
