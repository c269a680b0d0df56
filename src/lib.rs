//! Cloth reveal overlays for page loaders.
//!
//! `drape` hangs a Verlet cloth over a page while it loads, shades every cell
//! by how far it is stretched or squashed, and lets the cloth fall away once
//! loading completes. Designed for WASM front ends but free of any platform
//! dependency.
//!
//! # Features
//!
//! - **Cloth mesh**: `ClothMesh` builds a grid of particles with structural links
//! - **Pins**: `PinSet` anchors the top row and releases it in one batch
//! - **Strain shading**: `DistortionRenderer` paints quads in grey by area ratio
//! - **Reveal sequence**: `RevealSequencer` drives loading, release and finish
//! - **Event loop**: `EventLoop` frames and timers with RAII `Subscription`s
//! - **Pluggable physics**: anything implementing `PhysicsWorld`; `VerletWorld` built in
//! - **Observable**: Monitor physics steps via the `StepObserver` trait
//! - **`no_std` compatible**: Works in embedded and WASM environments

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod particle;
pub mod constraint;
pub mod world;
pub mod mesh;
pub mod pins;
pub mod render;
pub mod context;
pub mod event_loop;
pub mod sequencer;
pub mod progress;
pub mod overlay;
pub mod shell;
pub mod observer;
pub mod config;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::Vec2;
pub use particle::{CollisionGroup, Particle};
pub use constraint::{AnchorLink, DistanceLink, Link};
pub use world::{LinkHandle, ParticleHandle, ParticleProperty, PhysicsWorld, VerletWorld};
pub use mesh::ClothMesh;
pub use pins::PinSet;
pub use render::{DistortionRenderer, DrawCommand, DrawSurface, Quad, RecordingSurface, Shade};
pub use context::SimulationContext;
pub use event_loop::{EventLoop, FrameTick, Subscription};
pub use sequencer::{RevealSequencer, RevealState, RevealTransition};
pub use progress::{AssetProgress, TimedProgress};
pub use overlay::{ClothOverlay, OverlayPhase};
pub use shell::{ProgressFeed, RevealShell};
pub use config::{MeshConfig, OverlayConfig, ParticleParams, ReleaseConfig, RevealTiming, ShellConfig, SolverConfig};
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::ClothError;
