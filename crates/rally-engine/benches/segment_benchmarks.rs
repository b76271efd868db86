//! Segment renderer benchmarks.
//!
//! Measures the per-segment transform derivation on its own, and a full
//! `draw_lines` pass over the court's debug buffer through the recording
//! context.
//!
//! Run with: `cargo bench --bench segment_benchmarks -p rally-engine`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Mat4, Vec2};

use rally_engine::config::GameConfig;
use rally_engine::court::Court;
use rally_engine::render::{Camera2D, HeadlessContext, RenderTransform, RendererSettings, SegmentRenderer};
use rally_physics::debug::{DebugRenderBuffer, LineSegment};
use rally_physics::world::PhysicsWorld;

/// `count` segments fanning out around the origin.
fn fan(count: usize) -> DebugRenderBuffer {
    let segments: Vec<LineSegment> = (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            LineSegment {
                from: Vec2::ZERO,
                to: Vec2::from_angle(angle) * 10.0,
                color: [1.0, 1.0, 1.0],
            }
        })
        .collect();
    DebugRenderBuffer::from_segments(&segments)
}

fn bench_transform(c: &mut Criterion) {
    let proj_view = Camera2D::square(30.0).projection_view();
    c.bench_function("transform_from_endpoints", |b| {
        b.iter(|| {
            let t = RenderTransform::from_endpoints(
                black_box(Vec2::new(-3.0, -4.0)),
                black_box(Vec2::new(3.0, 4.0)),
                1.0,
                0.3,
            );
            black_box(t.mvp(&proj_view));
        });
    });
}

fn bench_draw_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_lines");
    for count in [16usize, 256, 4096] {
        let lines = fan(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &lines, |b, lines| {
            let mut ctx = HeadlessContext::new();
            let program = ctx.add_program(&[("position", 2)], &["mvpMatrix", "color"]);
            let mut renderer = SegmentRenderer::new(&mut ctx, program, RendererSettings::default()).unwrap();
            renderer.set_projection_view(Mat4::IDENTITY);
            b.iter(|| {
                ctx.clear_draws();
                black_box(renderer.draw_lines(&mut ctx, lines).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_court_frame(c: &mut Criterion) {
    let mut world = PhysicsWorld::new_zero_gravity();
    Court::build(&mut world, &GameConfig::default());
    let mut ctx = HeadlessContext::new();
    let program = ctx.add_program(&[("position", 2)], &["mvpMatrix", "color"]);
    let mut renderer = SegmentRenderer::new(&mut ctx, program, RendererSettings::default()).unwrap();
    renderer.set_projection_view(Camera2D::default().projection_view());

    c.bench_function("court_step_and_draw", |b| {
        b.iter(|| {
            ctx.clear_draws();
            world.step();
            black_box(renderer.draw_all(&mut ctx, &mut world).unwrap());
        });
    });
}

criterion_group!(benches, bench_transform, bench_draw_lines, bench_court_frame);
criterion_main!(benches);
