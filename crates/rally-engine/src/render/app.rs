//! Windowed runner.
//!
//! [`run_windowed`] owns the winit event loop. Once the window exists it
//! builds a [`WgpuContext`], compiles [`COLOR_PROGRAM`] and a
//! [`FrameDriver`] on top of them; every `RedrawRequested` then runs one
//! tick with the measured wall-clock delta.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{WindowAttributes, WindowId};

use super::wgpu_context::{WgpuContext, COLOR_PROGRAM};
use crate::config::GameConfig;
use crate::frame::FrameDriver;
use crate::input::Key;

/// Open a window and play until it is closed or Escape is pressed.
///
/// # Errors
///
/// Returns an error if the event loop cannot be created or if the window,
/// GPU context or frame driver fail to initialize.
pub fn run_windowed(config: GameConfig, window_title: &str) -> Result<(), anyhow::Error> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        state: AppState::Pending { config },
        title: window_title.to_owned(),
        init_failed: false,
    };

    event_loop.run_app(&mut app)?;

    if app.init_failed {
        return Err(anyhow::anyhow!(
            "failed to initialize windowed renderer (see logs for details)"
        ));
    }
    Ok(())
}

/// winit 0.30 only allows window creation inside `resumed`, so the app
/// waits in `Pending` until then.
enum AppState {
    Pending {
        config: GameConfig,
    },
    Running {
        ctx: WgpuContext,
        driver: FrameDriver,
        clear: wgpu::Color,
        last_frame: Instant,
    },
    Transitioning,
}

struct App {
    state: AppState,
    title: String,
    init_failed: bool,
}

impl App {
    fn start(&self, event_loop: &ActiveEventLoop, config: GameConfig) -> Result<AppState, anyhow::Error> {
        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                config.window_width,
                config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let mut ctx = pollster::block_on(WgpuContext::new(window.clone()))?;
        let program = ctx.create_program(&COLOR_PROGRAM)?;
        let [r, g, b, a] = config.clear_color.map(f64::from);
        let driver = FrameDriver::new(config, &mut ctx, program)?;

        window.request_redraw();
        Ok(AppState::Running {
            ctx,
            driver,
            clear: wgpu::Color { r, g, b, a },
            last_frame: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let state = std::mem::replace(&mut self.state, AppState::Transitioning);
        self.state = match state {
            AppState::Pending { config } => match self.start(event_loop, config) {
                Ok(running) => {
                    tracing::info!("rally window running");
                    running
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to start windowed game -- exiting");
                    self.init_failed = true;
                    event_loop.exit();
                    AppState::Transitioning
                }
            },
            other => other,
        };
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let AppState::Running {
            ctx,
            driver,
            clear,
            last_frame,
        } = &mut self.state
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(ticks = driver.tick(), "window close requested -- shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                tracing::debug!(width = size.width, height = size.height, "window resized");
                ctx.resize(size);
            }
            WindowEvent::KeyboardInput { event: key_ev, .. } => {
                let PhysicalKey::Code(code) = key_ev.physical_key else {
                    return;
                };
                if code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                if let Some(key) = map_key(code) {
                    match key_ev.state {
                        ElementState::Pressed => driver.keyboard_mut().press(key),
                        ElementState::Released => driver.keyboard_mut().release(key),
                    }
                }
            }
            WindowEvent::Focused(false) => driver.keyboard_mut().clear(),
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                ctx.begin_frame();
                if let Err(e) = driver.advance(dt, ctx) {
                    tracing::error!(error = %e, "frame failed -- exiting");
                    event_loop.exit();
                    return;
                }

                match ctx.end_frame(*clear) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let size = ctx.window().inner_size();
                        ctx.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("GPU out of memory -- exiting");
                        event_loop.exit();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "surface error during render");
                    }
                }

                ctx.window().request_redraw();
            }
            _ => {}
        }
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::ArrowUp => Some(Key::ArrowUp),
        KeyCode::ArrowDown => Some(Key::ArrowDown),
        _ => None,
    }
}
