//! Benchmarks for drape cloth simulation and shading.

use criterion::{criterion_group, criterion_main, Criterion};
use drape::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn gravity_world() -> VerletWorld<f32> {
    VerletWorld::new(SolverConfig::new().with_gravity(Vec2::new(0.0, 1000.0)))
}

fn bench_mesh_build(c: &mut Criterion) {
    c.bench_function("mesh_20x25_build_and_pin", |b| {
        b.iter(|| {
            let mut ctx = SimulationContext::new(gravity_world());
            ctx.build(&MeshConfig::new(), 1280.0, 720.0).unwrap();
            ctx.world().link_count()
        });
    });
}

fn bench_cloth_fall(c: &mut Criterion) {
    c.bench_function("cloth_20x25_release_60_steps", |b| {
        b.iter(|| {
            let mut ctx = SimulationContext::new(gravity_world());
            ctx.build(&MeshConfig::new(), 1280.0, 720.0).unwrap();
            let mut rng = SmallRng::seed_from_u64(7);
            ctx.release(&mut rng, &ReleaseConfig::new());
            for _ in 0..60 {
                ctx.step();
            }
            ctx.world().steps()
        });
    });
}

fn bench_shading(c: &mut Criterion) {
    let mut world = gravity_world();
    let mesh = ClothMesh::build(&mut world, &MeshConfig::new(), 1280.0, 720.0).unwrap();
    for _ in 0..30 {
        world.step();
    }
    let renderer = DistortionRenderer::default();
    c.bench_function("shade_20x25_quads", |b| {
        b.iter(|| renderer.shade_all(&mesh, &world).len());
    });
}

criterion_group!(benches, bench_mesh_build, bench_cloth_fall, bench_shading);
criterion_main!(benches);
