//! Two-player pong drawn entirely from physics debug lines.
//!
//! Run with:
//!   cargo run --example pong_visual --features renderer -p rally-engine
//!
//! Arguments:
//!   [CONFIG.json]        optional game config (see `GameConfig`)
//!   --headless <TICKS>   simulate without a window, print the last frame
//!                        report as JSON
//!
//! Controls:
//!   W / S            -- left paddle
//!   Up / Down arrows -- right paddle
//!   Escape           -- quit

use anyhow::Context;
use rally_engine::prelude::*;
use rally_engine::render::run_windowed;

struct Args {
    config: Option<String>,
    headless_ticks: Option<u64>,
}

fn parse_args() -> Result<Args, anyhow::Error> {
    let mut args = Args {
        config: None,
        headless_ticks: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--headless" {
            let ticks = iter
                .next()
                .context("--headless needs a tick count")?
                .parse()
                .context("--headless tick count must be an integer")?;
            args.headless_ticks = Some(ticks);
        } else if args.config.is_none() {
            args.config = Some(arg);
        } else {
            anyhow::bail!("unexpected argument: {arg}");
        }
    }
    Ok(args)
}

fn run_headless(config: GameConfig, ticks: u64) -> Result<(), anyhow::Error> {
    let mut ctx = HeadlessContext::new();
    let program = ctx.add_program(&[("position", 2)], &["mvpMatrix", "color"]);
    let dt = config.physics_dt;
    let mut driver = FrameDriver::new(config, &mut ctx, program)?;

    let mut paddle_hits = 0usize;
    let mut last = None;
    for _ in 0..ticks {
        ctx.clear_draws();
        let report = driver.advance(dt, &mut ctx)?;
        paddle_hits += report
            .contacts
            .iter()
            .filter(|c| matches!(c, ContactEvent::Paddle { .. }))
            .count();
        last = Some(report);
    }

    tracing::info!(ticks, paddle_hits, "headless run finished");
    if let Some(report) = last {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    match args.headless_ticks {
        Some(ticks) => run_headless(config, ticks),
        None => run_windowed(config, "Rally -- W/S and arrows to move, ESC to quit"),
    }
}
