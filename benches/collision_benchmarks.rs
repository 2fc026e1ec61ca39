//! Benchmarks for narrow-phase pair dispatch.

use collider3d::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sphere_pair(offset: f32) -> (Shape, Shape) {
    (
        Shape::Sphere(Sphere::new(Point3::origin(), 1.0).unwrap()),
        Shape::Sphere(Sphere::new(Point3::new(offset, 0.0, 0.0), 1.0).unwrap()),
    )
}

fn box_pair(offset: f32) -> (Shape, Shape) {
    let half = Vector3::new(1.0, 1.0, 1.0);
    (
        Shape::Box(BoxShape::new(Point3::origin(), half).unwrap()),
        Shape::Box(BoxShape::new(Point3::new(offset, 0.0, 0.0), half).unwrap()),
    )
}

fn obb_pair(offset: f32) -> (Shape, Shape) {
    let half = Vector3::new(1.0, 1.0, 1.0);
    (
        Shape::OrientedBox(OrientedBox::new(Point3::origin(), half, Matrix3::identity()).unwrap()),
        Shape::OrientedBox(
            OrientedBox::new(Point3::new(offset, 0.0, 0.0), half, Matrix3::identity()).unwrap(),
        ),
    )
}

fn pair_dispatch_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_dispatch");

    group.bench_function("sphere_sphere_overlapping", |b| {
        let (a, bb) = sphere_pair(1.0);
        b.iter(|| detect_collision(black_box(&a), black_box(&bb)));
    });

    group.bench_function("sphere_sphere_disjoint", |b| {
        let (a, bb) = sphere_pair(10.0);
        b.iter(|| detect_collision(black_box(&a), black_box(&bb)));
    });

    group.bench_function("box_box_overlapping", |b| {
        let (a, bb) = box_pair(1.5);
        b.iter(|| detect_collision(black_box(&a), black_box(&bb)));
    });

    group.bench_function("obb_obb_full_sat", |b| {
        let (a, bb) = obb_pair(1.5);
        b.iter(|| detect_collision(black_box(&a), black_box(&bb)));
    });

    group.finish();
}

fn broad_phase_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("broad_phase");

    for &n in &[16usize, 64, 256] {
        let shapes: Vec<Shape> = (0..n)
            .map(|i| Shape::Sphere(Sphere::new(Point3::new(i as f32 * 0.5, 0.0, 0.0), 1.0).unwrap()))
            .collect();

        group.bench_with_input(BenchmarkId::new("detect_collisions_parallel", n), &shapes, |b, shapes| {
            b.iter(|| detect_collisions_parallel(black_box(shapes)));
        });
    }

    group.finish();
}

criterion_group!(benches, pair_dispatch_benchmarks, broad_phase_benchmarks);
criterion_main!(benches);
