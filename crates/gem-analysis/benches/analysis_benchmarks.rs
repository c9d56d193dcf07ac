//! Benchmarks for gem analysis.
//!
//! Run with: cargo bench -p gem-analysis
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p gem-analysis -- --save-baseline main
//! 2. After changes: cargo bench -p gem-analysis -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use gem_analysis::features::describe_island;
use gem_analysis::partition::partition_islands;
use gem_analysis::primitives::{bipyramid, cuboid, merge_all, uv_sphere};
use gem_analysis::{AnalysisParams, GemAnalyzer, TriangleMesh};

// =============================================================================
// Scene Generation
// =============================================================================

/// Band with a row of `stones` round stones of the given tessellation.
fn create_pave_scene(stones: usize, segments: usize) -> TriangleMesh {
    let width = 4.0 * stones as f64 + 4.0;
    let mut parts = vec![cuboid([0.0, 0.0, 0.0], [width, 8.0, 6.0])];
    for i in 0..stones {
        let x = -width / 2.0 + 4.0 + 4.0 * i as f64;
        parts.push(if i % 2 == 0 {
            uv_sphere([x, 0.0, 0.0], 1.2, segments, segments / 2)
        } else {
            bipyramid([x, 0.0, 0.0], 8, 1.5, 1.0, 1.0)
        });
    }
    merge_all(parts.iter())
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    let params = AnalysisParams::default();

    for stones in [4, 16, 64] {
        let mesh = create_pave_scene(stones, 32);
        group.throughput(Throughput::Elements(mesh.triangle_count() as u64));
        group.bench_with_input(BenchmarkId::new("stones", stones), &mesh, |b, mesh| {
            b.iter(|| partition_islands(black_box(mesh), black_box(&params)))
        });
    }

    group.finish();
}

fn bench_describe(c: &mut Criterion) {
    let mut group = c.benchmark_group("describe_island");
    let params = AnalysisParams::default();

    for segments in [16, 64, 128] {
        let mesh = uv_sphere([0.0, 0.0, 0.0], 1.0, segments, segments / 2);
        let partition = partition_islands(&mesh, &params);
        let island = &partition.islands[0];
        group.throughput(Throughput::Elements(mesh.triangle_count() as u64));
        group.bench_with_input(BenchmarkId::new("segments", segments), &mesh, |b, mesh| {
            b.iter(|| {
                describe_island(
                    black_box(mesh),
                    black_box(island),
                    &partition.quantizer,
                    &params,
                )
            })
        });
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let analyzer = GemAnalyzer::new();

    for stones in [4, 16, 64] {
        let mesh = create_pave_scene(stones, 48);
        group.throughput(Throughput::Elements(mesh.triangle_count() as u64));
        group.bench_with_input(BenchmarkId::new("stones", stones), &mesh, |b, mesh| {
            b.iter(|| analyzer.analyze(black_box(mesh)))
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_partition, bench_describe, bench_analyze);

criterion_main!(benches);
