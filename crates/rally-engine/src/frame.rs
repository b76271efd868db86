//! Per-frame orchestration.
//!
//! [`FrameDriver::advance`] runs one tick, strictly in this order:
//!
//! 1. Move each paddle by its held keys, clamped to the travel range.
//! 2. Step the physics world exactly once.
//! 3. Enumerate the ball's contacts and report them.
//! 4. Draw every debug line through the [`SegmentRenderer`].
//!
//! Nothing in a tick overlaps or suspends; the driver is single-owner and
//! not shared between threads.

use rally_physics::debug::DebugLineSource;
use rally_physics::prelude::*;
use serde::Serialize;

use crate::config::GameConfig;
use crate::court::{self, Court, Paddle, Side};
use crate::error::{EngineError, RenderError};
use crate::input::{Key, Keyboard};
use crate::render::{Camera2D, GraphicsContext, ProgramId, SegmentRenderer};

/// Something the ball touched this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ContactEvent {
    /// The ball is touching a paddle.
    Paddle {
        /// Which paddle.
        side: Side,
        /// Strike position, `-1` (bottom edge) to `+1` (top edge).
        hit_factor: f32,
    },
    /// The ball is inside a goal area.
    Goal {
        /// Which goal.
        side: Side,
    },
    /// The ball is touching a post or the top or bottom wall.
    Wall,
}

/// Outcome of one [`FrameDriver::advance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Ball contacts after the step, in collider order.
    pub contacts: Vec<ContactEvent>,
    /// Segments drawn; `0` when rendering was skipped.
    pub segments_drawn: usize,
    /// `false` if the debug buffer could not be obtained.
    pub rendered: bool,
}

/// Owns the simulation and drives it one frame at a time.
#[derive(Debug)]
pub struct FrameDriver {
    config: GameConfig,
    physics: PhysicsWorld,
    court: Court,
    keyboard: Keyboard,
    renderer: SegmentRenderer,
    camera: Camera2D,
    tick: u64,
}

impl FrameDriver {
    /// Build the court and a renderer bound to `program` on `ctx`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] if `config` fails validation,
    /// [`EngineError::Render`] if the renderer cannot initialize.
    pub fn new<C>(config: GameConfig, ctx: &mut C, program: ProgramId) -> Result<Self, EngineError>
    where
        C: GraphicsContext + ?Sized,
    {
        config.validate()?;

        let mut physics = PhysicsWorld::new_zero_gravity();
        physics.set_timestep(config.physics_dt);
        let court = Court::build(&mut physics, &config);

        let camera = Camera2D::square(config.view_half_extent);
        let mut renderer = SegmentRenderer::new(ctx, program, config.renderer_settings())?;
        renderer.set_projection_view(camera.projection_view());

        tracing::info!(
            ppu = config.pixels_per_unit,
            dt = config.physics_dt,
            view = config.view_half_extent,
            "frame driver ready"
        );

        Ok(Self {
            config,
            physics,
            court,
            keyboard: Keyboard::new(),
            renderer,
            camera,
            tick: 0,
        })
    }

    /// Run one tick. `dt` is the wall-clock time since the previous tick and
    /// only scales paddle movement; the physics step is fixed.
    ///
    /// # Errors
    ///
    /// A physics error if a court handle went stale, or a render error
    /// other than a failed debug-buffer query.
    pub fn advance<C>(&mut self, dt: f32, ctx: &mut C) -> Result<FrameReport, EngineError>
    where
        C: GraphicsContext + ?Sized,
    {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.tick += 1;

        self.move_paddle(self.court.left_paddle, Key::W, Key::S, dt)?;
        self.move_paddle(self.court.right_paddle, Key::ArrowUp, Key::ArrowDown, dt)?;

        self.physics.step();

        let contacts = self.ball_contacts()?;

        let drawn = render_frame(&mut self.renderer, ctx, &mut self.physics)?;

        Ok(FrameReport {
            tick: self.tick,
            contacts,
            segments_drawn: drawn.unwrap_or(0),
            rendered: drawn.is_some(),
        })
    }

    fn move_paddle(&mut self, paddle: Paddle, up: Key, down: Key, dt: f32) -> Result<(), PhysicsError> {
        let axis = self.keyboard.axis(up, down);
        if axis == 0.0 || dt == 0.0 {
            return Ok(());
        }
        let body = paddle.object.body()?;
        let limit = self.config.paddle_travel / self.config.pixels_per_unit;
        let mut position = self.physics.translation(body)?;
        position.y = (position.y + axis * self.config.paddle_speed * dt).clamp(-limit, limit);
        self.physics.set_translation(body, position)
    }

    fn ball_contacts(&self) -> Result<Vec<ContactEvent>, PhysicsError> {
        let mut partners = Vec::new();
        self.physics
            .contacts_with(self.court.ball.collider, |other| partners.push(other));

        let ball_y = self.physics.translation(self.court.ball.body()?)?.y;
        let mut events = Vec::with_capacity(partners.len());
        for other in partners {
            let event = if let Some(paddle) = self.court.paddle_for(other) {
                let paddle_y = self.physics.translation(paddle.object.body()?)?.y;
                let hit_factor = court::hit_factor(ball_y, paddle_y, paddle.half_height);
                tracing::info!(
                    tick = self.tick,
                    paddle = self.physics.label(other).unwrap_or_default(),
                    hit_factor,
                    "{} paddle <-> ball",
                    paddle.side.as_str()
                );
                ContactEvent::Paddle {
                    side: paddle.side,
                    hit_factor,
                }
            } else if let Some(side) = self.court.goal_for(other) {
                tracing::debug!(tick = self.tick, goal = side.as_str(), "ball in goal area");
                ContactEvent::Goal { side }
            } else {
                ContactEvent::Wall
            };
            events.push(event);
        }
        Ok(events)
    }

    /// Held keys; update from input events between ticks.
    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    /// Held keys.
    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// The simulated world.
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Mutable access to the simulated world.
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Court handles.
    pub fn court(&self) -> &Court {
        &self.court
    }

    /// The renderer.
    pub fn renderer(&self) -> &SegmentRenderer {
        &self.renderer
    }

    /// The camera the projection-view matrix was taken from.
    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    /// Replace the camera and the renderer's projection-view matrix.
    pub fn set_camera(&mut self, camera: Camera2D) {
        self.renderer.set_projection_view(camera.projection_view());
        self.camera = camera;
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Ticks completed.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

/// Draw one frame of debug lines.
///
/// A failed debug-buffer query skips the frame: it is logged and
/// `Ok(None)` is returned so the loop keeps running. Any other render
/// error is returned.
///
/// # Errors
///
/// Context errors from binding the program or the quad.
pub fn render_frame<C, S>(
    renderer: &mut SegmentRenderer,
    ctx: &mut C,
    source: &mut S,
) -> Result<Option<usize>, RenderError>
where
    C: GraphicsContext + ?Sized,
    S: DebugLineSource + ?Sized,
{
    match renderer.draw_all(ctx, source) {
        Ok(drawn) => Ok(Some(drawn)),
        Err(RenderError::DebugLines(err)) => {
            tracing::warn!(error = %err, "debug lines unavailable -- frame not rendered");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessContext;

    fn driver() -> (HeadlessContext, FrameDriver) {
        let mut ctx = HeadlessContext::new();
        let program = ctx.add_program(&[("position", 2)], &["mvpMatrix", "color"]);
        let driver = FrameDriver::new(GameConfig::default(), &mut ctx, program).unwrap();
        (ctx, driver)
    }

    #[test]
    fn advance_steps_once_and_draws() {
        let (mut ctx, mut driver) = driver();
        let report = driver.advance(1.0 / 60.0, &mut ctx).unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(driver.physics().step_count(), 1);
        assert!(report.rendered);
        assert!(report.segments_drawn > 0);
        assert_eq!(ctx.draws().len(), report.segments_drawn);
    }

    #[test]
    fn held_key_moves_paddle_up() {
        let (mut ctx, mut driver) = driver();
        let body = driver.court().right_paddle.object.body().unwrap();
        driver.keyboard_mut().press(Key::ArrowUp);
        driver.advance(0.1, &mut ctx).unwrap();
        let y = driver.physics().translation(body).unwrap().y;
        assert!((y - 2.0).abs() < 1e-4, "y = {y}");
    }

    #[test]
    fn paddle_stops_at_travel_limit() {
        let (mut ctx, mut driver) = driver();
        let body = driver.court().left_paddle.object.body().unwrap();
        driver.keyboard_mut().press(Key::S);
        for _ in 0..20 {
            driver.advance(0.5, &mut ctx).unwrap();
        }
        let y = driver.physics().translation(body).unwrap().y;
        assert!((y + 12.5).abs() < 1e-4, "y = {y}");
    }

    #[test]
    fn negative_dt_does_not_move_paddles() {
        let (mut ctx, mut driver) = driver();
        let body = driver.court().right_paddle.object.body().unwrap();
        driver.keyboard_mut().press(Key::ArrowUp);
        driver.advance(-1.0, &mut ctx).unwrap();
        driver.advance(f32::NAN, &mut ctx).unwrap();
        assert_eq!(driver.physics().translation(body).unwrap().y, 0.0);
        assert_eq!(driver.tick(), 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut ctx = HeadlessContext::new();
        let program = ctx.add_program(&[("position", 2)], &["mvpMatrix", "color"]);
        let config = GameConfig {
            pixels_per_unit: 0.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            FrameDriver::new(config, &mut ctx, program),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn renderer_uses_camera_matrix() {
        let (_, driver) = driver();
        assert_eq!(
            driver.renderer().projection_view(),
            driver.camera().projection_view()
        );
    }
}
