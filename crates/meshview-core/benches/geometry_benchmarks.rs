//! Geometry Benchmarks
//!
//! Analysis and normalization cost for growing mesh sizes

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::Vec3;
use meshview_core::{
    Geometry, GeometrySummary, MeshScene, NormalizationTransform, NormalizeOptions, SceneNode,
};

/// Flat grid of `n x n` quads split across a few sub-meshes
fn grid_scene(n: u32) -> MeshScene {
    let mut root = SceneNode::group("root");
    for part in 0..4u32 {
        let mut positions = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
        for z in 0..=n {
            for x in 0..=n {
                positions.push(Vec3::new(x as f32, part as f32, z as f32));
            }
        }
        let mut indices = Vec::with_capacity((n * n * 6) as usize);
        for z in 0..n {
            for x in 0..n {
                let i = z * (n + 1) + x;
                indices.extend_from_slice(&[i, i + n + 1, i + 1, i + 1, i + n + 1, i + n + 2]);
            }
        }
        let geometry = Geometry::triangles(positions, indices);
        root.add_child(SceneNode::mesh(format!("part{part}"), geometry));
    }
    MeshScene::new(root)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry_analyze");

    for n in [16u32, 64, 256].iter() {
        let scene = grid_scene(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &scene, |b, scene| {
            b.iter(|| black_box(GeometrySummary::analyze(scene)));
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_apply");

    for n in [16u32, 64, 256].iter() {
        let scene = grid_scene(*n);
        let summary = GeometrySummary::analyze(&scene);
        let options = NormalizeOptions::default();
        let transform = NormalizationTransform::from_summary(&summary, &options);
        group.bench_with_input(BenchmarkId::from_parameter(n), &scene, |b, scene| {
            b.iter(|| {
                let mut normalized = transform.apply(scene);
                normalized.compute_vertex_normals();
                black_box(normalized)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_normalize);
criterion_main!(benches);
