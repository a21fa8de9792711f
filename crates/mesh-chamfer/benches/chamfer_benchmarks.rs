//! Benchmarks for angle calculation and chamfered extrusion.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_chamfer::{compute_edge_angles, extrude_all, ChamferParams, ExtrudeParams};
use mesh_facet::PolygonFace;
use nalgebra::{Point3, Vector3};

/// A regular n-gon face of the given radius on z = 0.
fn ngon_face(sides: usize, radius: f64, offset_x: f64) -> PolygonFace {
    let vertices = (0..sides)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / sides as f64;
            Point3::new(offset_x + radius * angle.cos(), radius * angle.sin(), 0.0)
        })
        .collect();
    PolygonFace::new(vertices, Vector3::z(), vec![0])
}

/// A field of separated n-gon plates, all boundary edges.
fn plate_field(count: usize, sides: usize) -> Vec<PolygonFace> {
    (0..count)
        .map(|i| ngon_face(sides, 5.0, i as f64 * 20.0))
        .collect()
}

fn benchmark_angles(c: &mut Criterion) {
    let mut group = c.benchmark_group("angles");

    for count in [10, 100] {
        let faces = plate_field(count, 8);
        let edge_count: usize = faces.iter().map(|f| f.vertex_count()).sum();
        group.throughput(Throughput::Elements(edge_count as u64));
        group.bench_with_input(
            BenchmarkId::new("compute_edge_angles", count),
            &faces,
            |b, faces| b.iter(|| compute_edge_angles(faces, &ChamferParams::default())),
        );
    }

    group.finish();
}

fn benchmark_extrude(c: &mut Criterion) {
    let mut group = c.benchmark_group("extrude");

    for (label, sides) in [("octagon", 8), ("64gon", 64)] {
        let faces = plate_field(50, sides);
        let edges = compute_edge_angles(&faces, &ChamferParams::default());
        group.throughput(Throughput::Elements(faces.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("extrude_all_50", label),
            &(faces, edges),
            |b, (faces, edges)| {
                b.iter(|| extrude_all(faces, edges, &ExtrudeParams::default()))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_angles, benchmark_extrude);
criterion_main!(benches);
