//! Frame driver runs over the full court with the recording context.

use glam::Vec2;
use rally_engine::prelude::*;

const DT: f32 = 1.0 / 60.0;

fn setup(config: GameConfig) -> (HeadlessContext, FrameDriver) {
    let mut ctx = HeadlessContext::new();
    let program = ctx.add_program(&[("position", 2)], &["mvpMatrix", "color"]);
    let driver = FrameDriver::new(config, &mut ctx, program).unwrap();
    (ctx, driver)
}

/// Advance `ticks` frames and collect every reported contact.
fn run(ctx: &mut HeadlessContext, driver: &mut FrameDriver, ticks: usize) -> Vec<ContactEvent> {
    let mut contacts = Vec::new();
    for _ in 0..ticks {
        ctx.clear_draws();
        let report = driver.advance(DT, ctx).unwrap();
        contacts.extend(report.contacts);
    }
    contacts
}

#[test]
fn serve_reaches_right_paddle_near_its_centre() {
    let (mut ctx, mut driver) = setup(GameConfig::default());
    let contacts = run(&mut ctx, &mut driver, 90);

    let hit = contacts
        .iter()
        .find_map(|c| match c {
            ContactEvent::Paddle {
                side: Side::Right,
                hit_factor,
            } => Some(*hit_factor),
            _ => None,
        })
        .expect("ball should reach the right paddle within 1.5 s");
    assert!(hit.abs() < 0.5, "head-on serve, hit factor {hit}");
}

#[test]
fn ball_bounces_back_after_paddle_hit() {
    let (mut ctx, mut driver) = setup(GameConfig::default());
    let ball = driver.court().ball.body().unwrap();
    run(&mut ctx, &mut driver, 90);
    let v = driver.physics().linvel(ball).unwrap();
    assert!(v.x < 0.0, "ball should be heading left, velocity {v}");
}

#[test]
fn missed_serve_reaches_right_goal() {
    let (mut ctx, mut driver) = setup(GameConfig::default());
    // right paddle drops out of the serve line well before the ball arrives
    driver.keyboard_mut().press(Key::ArrowDown);
    let contacts = run(&mut ctx, &mut driver, 120);

    let goal = contacts
        .iter()
        .position(|c| *c == ContactEvent::Goal { side: Side::Right })
        .expect("ball should reach the right goal within 2 s");
    assert!(
        !contacts[..goal]
            .iter()
            .any(|c| matches!(c, ContactEvent::Paddle { .. })),
        "no paddle should touch the ball before the goal: {contacts:?}"
    );
    assert!(!contacts.contains(&ContactEvent::Goal { side: Side::Left }));
}

#[test]
fn vertical_ball_reports_wall_contact() {
    let (mut ctx, mut driver) = setup(GameConfig::default());
    let ball = driver.court().ball.body().unwrap();
    driver
        .physics_mut()
        .set_linvel(ball, Vec2::new(0.0, 30.0))
        .unwrap();
    let contacts = run(&mut ctx, &mut driver, 60);

    assert!(
        contacts.contains(&ContactEvent::Wall),
        "ball should touch the top wall within 1 s: {contacts:?}"
    );
    assert!(!contacts
        .iter()
        .any(|c| matches!(c, ContactEvent::Paddle { .. } | ContactEvent::Goal { .. })));
    let v = driver.physics().linvel(ball).unwrap();
    assert!(v.y < 0.0, "ball should come back down, velocity {v}");
}

#[test]
fn every_frame_draws_the_same_outline_count() {
    let (mut ctx, mut driver) = setup(GameConfig::default());
    let first = driver.advance(DT, &mut ctx).unwrap();
    ctx.clear_draws();
    let second = driver.advance(DT, &mut ctx).unwrap();

    assert!(first.rendered && second.rendered);
    assert!(first.segments_drawn > 0);
    assert_eq!(first.segments_drawn, second.segments_drawn);
    assert_eq!(ctx.draws().len(), second.segments_drawn);
    assert_eq!(driver.renderer().skipped_segments(), 0);
}

#[test]
fn ticks_count_from_one() {
    let (mut ctx, mut driver) = setup(GameConfig::default());
    for expected in 1..=3 {
        assert_eq!(driver.advance(DT, &mut ctx).unwrap().tick, expected);
    }
    assert_eq!(driver.physics().step_count(), 3);
}

#[test]
fn both_paddles_follow_their_keys() {
    let (mut ctx, mut driver) = setup(GameConfig::default());
    let left = driver.court().left_paddle.object.body().unwrap();
    let right = driver.court().right_paddle.object.body().unwrap();
    let left_start = driver.physics().translation(left).unwrap().y;

    driver.keyboard_mut().press(Key::W);
    driver.keyboard_mut().press(Key::ArrowDown);
    run(&mut ctx, &mut driver, 30);

    let left_y = driver.physics().translation(left).unwrap().y;
    let right_y = driver.physics().translation(right).unwrap().y;
    // 30 ticks at 20 units/s
    assert!((left_y - (left_start + 10.0)).abs() < 1e-2, "left {left_y}");
    assert!((right_y + 10.0).abs() < 1e-2, "right {right_y}");
}

#[test]
fn travel_limit_scales_with_pixels_per_unit() {
    let config = GameConfig {
        pixels_per_unit: 2.0,
        ..GameConfig::default()
    };
    let (mut ctx, mut driver) = setup(config);
    let right = driver.court().right_paddle.object.body().unwrap();
    driver.keyboard_mut().press(Key::ArrowUp);
    run(&mut ctx, &mut driver, 120);
    let y = driver.physics().translation(right).unwrap().y;
    assert!((y - 6.25).abs() < 1e-4, "y = {y}");
}

#[test]
fn camera_change_reaches_the_renderer() {
    let (_, mut driver) = setup(GameConfig::default());
    let camera = Camera2D::square(10.0);
    driver.set_camera(camera.clone());
    assert_eq!(driver.renderer().projection_view(), camera.projection_view());
}

#[test]
fn report_serializes_to_json() {
    let (mut ctx, mut driver) = setup(GameConfig::default());
    let report = driver.advance(DT, &mut ctx).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["tick"], 1);
    assert_eq!(json["rendered"], true);
}
