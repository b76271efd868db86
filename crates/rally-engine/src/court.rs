//! Pong court layout.
//!
//! Dimensions are given in screen units and divided by
//! [`GameConfig::pixels_per_unit`] when the colliders are created:
//!
//! ```text
//!          top wall (25 x 0.5 half extents) at y = +15.5
//!   post |                                          | post
//!   goal |  L paddle            ball    R paddle    | goal
//!   post |  x = -20              0      x = +20     | post
//!          bottom wall at y = -15.5
//! ```

use glam::Vec2;
use rally_physics::prelude::*;

use crate::config::GameConfig;

/// Label of the left paddle collider.
pub const LEFT_PADDLE: &str = "leftPaddle";
/// Label of the right paddle collider.
pub const RIGHT_PADDLE: &str = "rightPaddle";
/// Label of the left goal collider.
pub const LEFT_GOAL: &str = "leftGoal";
/// Label of the right goal collider.
pub const RIGHT_GOAL: &str = "rightGoal";
/// Label shared by the posts and the top and bottom walls.
pub const WALL: &str = "wall";
/// Label of the ball collider.
pub const BALL: &str = "ball";

const PADDLE_HALF_EXTENTS: Vec2 = Vec2::new(1.0, 2.0);
const GOAL_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 8.0);
const POST_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 4.0);
const WALL_HALF_EXTENTS: Vec2 = Vec2::new(25.0, 0.5);
const BALL_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 0.5);

const GOAL_X: f32 = 25.5;
const POST_Y: f32 = 12.0;
const WALL_Y: f32 = 15.5;
const PADDLE_X: f32 = 20.0;
/// The left paddle starts just below the serve line; the ball's lower edge
/// clears its top edge by 0.001 units.
const LEFT_PADDLE_Y: f32 = -2.501;

/// Which end of the court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Side {
    /// Negative x.
    Left,
    /// Positive x.
    Right,
}

impl Side {
    /// Lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// A kinematic paddle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paddle {
    /// Court end.
    pub side: Side,
    /// Body and collider handles.
    pub object: PhysicsObject,
    /// Half height in simulation units.
    pub half_height: f32,
}

/// Handles of every court object.
#[derive(Debug, Clone, PartialEq)]
pub struct Court {
    /// Left paddle, driven by W/S.
    pub left_paddle: Paddle,
    /// Right paddle, driven by the arrow keys.
    pub right_paddle: Paddle,
    /// The ball.
    pub ball: PhysicsObject,
    /// Goal areas behind each paddle, left then right.
    pub goals: [PhysicsObject; 2],
    /// Posts, then top and bottom walls.
    pub walls: Vec<PhysicsObject>,
}

impl Court {
    /// Create every court collider in `world`.
    pub fn build(world: &mut PhysicsWorld, config: &GameConfig) -> Self {
        let ppu = config.pixels_per_unit;
        let solid = |half: Vec2, at: Vec2, label: &str| {
            CuboidDesc::new(half / ppu, at / ppu)
                .restitution(1.0)
                .label(label)
        };

        let goals = [
            world.add_fixed_cuboid(&solid(GOAL_HALF_EXTENTS, Vec2::new(-GOAL_X, 0.0), LEFT_GOAL)),
            world.add_fixed_cuboid(&solid(GOAL_HALF_EXTENTS, Vec2::new(GOAL_X, 0.0), RIGHT_GOAL)),
        ];

        let mut walls = Vec::with_capacity(6);
        for x in [-GOAL_X, GOAL_X] {
            for y in [POST_Y, -POST_Y] {
                walls.push(world.add_fixed_cuboid(&solid(POST_HALF_EXTENTS, Vec2::new(x, y), WALL)));
            }
        }
        for y in [WALL_Y, -WALL_Y] {
            walls.push(world.add_fixed_cuboid(&solid(WALL_HALF_EXTENTS, Vec2::new(0.0, y), WALL)));
        }

        let left_paddle = Paddle {
            side: Side::Left,
            object: world.add_kinematic_cuboid(&solid(
                PADDLE_HALF_EXTENTS,
                Vec2::new(-PADDLE_X, LEFT_PADDLE_Y),
                LEFT_PADDLE,
            )),
            half_height: PADDLE_HALF_EXTENTS.y / ppu,
        };
        let right_paddle = Paddle {
            side: Side::Right,
            object: world.add_kinematic_cuboid(&solid(
                PADDLE_HALF_EXTENTS,
                Vec2::new(PADDLE_X, 0.0),
                RIGHT_PADDLE,
            )),
            half_height: PADDLE_HALF_EXTENTS.y / ppu,
        };

        let ball = world.add_dynamic_cuboid(
            &CuboidDesc::new(BALL_HALF_EXTENTS / ppu, Vec2::ZERO)
                .label(BALL)
                .restitution(1.0)
                .friction(0.0)
                .lock_rotations()
                .never_sleep()
                .linvel(Vec2::new(config.ball_speed, 0.0))
                .collision_events(),
        );

        tracing::debug!(
            colliders = world.collider_count(),
            bodies = world.body_count(),
            ppu,
            "court built"
        );

        Self {
            left_paddle,
            right_paddle,
            ball,
            goals,
            walls,
        }
    }

    /// Both paddles, left first.
    pub fn paddles(&self) -> [&Paddle; 2] {
        [&self.left_paddle, &self.right_paddle]
    }

    /// The paddle owning `collider`, if any.
    pub fn paddle_for(&self, collider: ColliderHandle) -> Option<&Paddle> {
        self.paddles()
            .into_iter()
            .find(|p| p.object.collider == collider)
    }

    /// The goal side owning `collider`, if any.
    pub fn goal_for(&self, collider: ColliderHandle) -> Option<Side> {
        if self.goals[0].collider == collider {
            Some(Side::Left)
        } else if self.goals[1].collider == collider {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Where the ball struck a paddle: `+1` at the top edge, `0` at the centre,
/// `-1` at the bottom edge.
pub fn hit_factor(ball_y: f32, paddle_y: f32, paddle_half_height: f32) -> f32 {
    (ball_y - paddle_y) / paddle_half_height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn court_has_expected_object_counts() {
        let mut world = PhysicsWorld::new_zero_gravity();
        let court = Court::build(&mut world, &GameConfig::default());
        // 2 goals + 4 posts + 2 walls + 2 paddles + ball
        assert_eq!(world.collider_count(), 11);
        // paddles + ball
        assert_eq!(world.body_count(), 3);
        assert_eq!(court.walls.len(), 6);
    }

    #[test]
    fn paddles_start_at_classic_positions() {
        let mut world = PhysicsWorld::new_zero_gravity();
        let court = Court::build(&mut world, &GameConfig::default());
        let left = world.translation(court.left_paddle.object.body().unwrap()).unwrap();
        let right = world.translation(court.right_paddle.object.body().unwrap()).unwrap();
        assert_eq!(left, Vec2::new(-20.0, -2.501));
        assert_eq!(right, Vec2::new(20.0, 0.0));
        assert_eq!(world.label(court.left_paddle.object.collider), Some(LEFT_PADDLE));
        assert_eq!(world.label(court.right_paddle.object.collider), Some(RIGHT_PADDLE));
    }

    #[test]
    fn left_paddle_sits_just_below_serve_line() {
        let paddle_top = LEFT_PADDLE_Y + PADDLE_HALF_EXTENTS.y;
        let ball_bottom = -BALL_HALF_EXTENTS.y;
        assert!(paddle_top < ball_bottom);
        assert!((ball_bottom - paddle_top - 0.001).abs() < 1e-5);
    }

    #[test]
    fn pixels_per_unit_shrinks_layout() {
        let mut world = PhysicsWorld::new_zero_gravity();
        let config = GameConfig {
            pixels_per_unit: 2.0,
            ..GameConfig::default()
        };
        let court = Court::build(&mut world, &config);
        let right = world.translation(court.right_paddle.object.body().unwrap()).unwrap();
        assert_eq!(right, Vec2::new(10.0, 0.0));
        assert_eq!(court.right_paddle.half_height, 1.0);
    }

    #[test]
    fn ball_serves_towards_right() {
        let mut world = PhysicsWorld::new_zero_gravity();
        let court = Court::build(&mut world, &GameConfig::default());
        let v = world.linvel(court.ball.body().unwrap()).unwrap();
        assert_eq!(v, Vec2::new(30.0, 0.0));
    }

    #[test]
    fn lookups_by_collider() {
        let mut world = PhysicsWorld::new_zero_gravity();
        let court = Court::build(&mut world, &GameConfig::default());
        assert_eq!(
            court.paddle_for(court.right_paddle.object.collider).map(|p| p.side),
            Some(Side::Right)
        );
        assert!(court.paddle_for(court.ball.collider).is_none());
        assert_eq!(court.goal_for(court.goals[0].collider), Some(Side::Left));
        assert_eq!(court.goal_for(court.walls[0].collider), None);
    }

    #[test]
    fn hit_factor_spans_paddle() {
        assert_eq!(hit_factor(2.0, 0.0, 2.0), 1.0);
        assert_eq!(hit_factor(0.0, 0.0, 2.0), 0.0);
        assert_eq!(hit_factor(-3.0, -1.0, 2.0), -1.0);
    }
}
