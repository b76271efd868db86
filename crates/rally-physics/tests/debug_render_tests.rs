//! Tests for the debug-render buffer produced by a stepped world.
//!
//! These run the real rapier pipeline; no graphics context is involved.

use glam::Vec2;
use proptest::prelude::*;
use rally_physics::debug::{COLOR_STRIDE, VERTEX_STRIDE};
use rally_physics::prelude::*;

fn walled_world() -> PhysicsWorld {
    let mut world = PhysicsWorld::new_zero_gravity();
    world.add_fixed_cuboid(
        &CuboidDesc::new(Vec2::new(25.0, 0.5), Vec2::new(0.0, 15.5)).restitution(1.0),
    );
    world.add_fixed_cuboid(
        &CuboidDesc::new(Vec2::new(25.0, 0.5), Vec2::new(0.0, -15.5)).restitution(1.0),
    );
    world
}

#[test]
fn buffers_keep_their_strides() {
    let mut world = walled_world();
    world.step();
    let buffer = world.debug_render();
    assert_eq!(buffer.vertices().len() % VERTEX_STRIDE, 0);
    assert_eq!(
        buffer.colors().len(),
        buffer.segment_count() * COLOR_STRIDE,
        "every segment carries 8 colour floats"
    );
}

#[test]
fn colors_are_in_unit_range() {
    let mut world = walled_world();
    world.add_dynamic_cuboid(&CuboidDesc::new(Vec2::splat(0.5), Vec2::ZERO));
    for seg in world.debug_render().segments() {
        for channel in seg.color {
            assert!(
                (0.0..=1.0).contains(&channel),
                "colour channel out of range: {channel}"
            );
        }
    }
}

#[test]
fn moving_body_moves_its_outline() {
    let mut world = PhysicsWorld::new_zero_gravity();
    world.add_dynamic_cuboid(
        &CuboidDesc::new(Vec2::splat(0.5), Vec2::ZERO).linvel(Vec2::new(30.0, 0.0)),
    );
    let before: f32 = world.debug_render().segments().map(|s| s.from.x).sum();
    for _ in 0..10 {
        world.step();
    }
    let after: f32 = world.debug_render().segments().map(|s| s.from.x).sum();
    assert!(after > before, "outline should follow the body to the right");
}

#[test]
fn source_trait_matches_direct_render() {
    let mut world = walled_world();
    let direct = world.debug_render().clone();
    let via_trait = world.debug_lines().unwrap();
    assert_eq!(&direct, via_trait);
}

#[test]
fn source_reuses_line_storage_across_frames() {
    let mut world = walled_world();
    world.step();
    let first = world.debug_lines().unwrap().vertices().as_ptr();
    world.step();
    let second = world.debug_lines().unwrap().vertices().as_ptr();
    assert_eq!(first, second, "rebuilt lines should land in the same allocation");
}

#[test]
fn kinematic_paddle_pushes_ball() {
    let mut world = PhysicsWorld::new_zero_gravity();
    let paddle = world.add_kinematic_cuboid(
        &CuboidDesc::new(Vec2::new(1.0, 2.0), Vec2::new(-3.0, 0.0))
            .label("paddle")
            .restitution(1.0),
    );
    let ball = world.add_dynamic_cuboid(
        &CuboidDesc::new(Vec2::splat(0.5), Vec2::ZERO)
            .label("ball")
            .restitution(1.0)
            .friction(0.0)
            .lock_rotations()
            .never_sleep()
            .collision_events(),
    );
    let body = paddle.body().unwrap();

    let mut touched = false;
    for i in 1..=60 {
        let x = -3.0 + i as f32 * 0.1;
        world.set_translation(body, Vec2::new(x, 0.0)).unwrap();
        world.step();
        world.contacts_with(ball.collider, |other| {
            if world.label(other) == Some("paddle") {
                touched = true;
            }
        });
        if touched {
            break;
        }
    }
    assert!(touched, "advancing paddle should touch the resting ball");
}

proptest! {
    #[test]
    fn segments_read_back_in_buffer_order(
        raw in prop::collection::vec(
            (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0, 0.0f32..1.0),
            0..32,
        )
    ) {
        let segments: Vec<LineSegment> = raw
            .iter()
            .map(|&(ax, ay, bx, by, c)| LineSegment {
                from: Vec2::new(ax, ay),
                to: Vec2::new(bx, by),
                color: [c, 1.0 - c, 0.5],
            })
            .collect();
        let buffer = DebugRenderBuffer::from_segments(&segments);
        prop_assert_eq!(buffer.segment_count(), segments.len());
        let rebuilt = DebugRenderBuffer::new(buffer.vertices().to_vec(), buffer.colors().to_vec()).unwrap();
        prop_assert_eq!(&rebuilt, &buffer);
        for (i, seg) in segments.iter().enumerate() {
            prop_assert_eq!(buffer.segment(i), Some(*seg));
        }
    }
}
