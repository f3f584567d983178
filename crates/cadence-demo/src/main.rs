use std::time::Duration;

use anyhow::{Context, Result};

use cadence_engine::config::LoopConfig;
use cadence_engine::core::{App, AppControl, UpdateCtx};
use cadence_engine::host::HeadlessHost;
use cadence_engine::input::{InputEvent, Key, KeyState};
use cadence_engine::logging::{init_logging, LoggingConfig};
use cadence_engine::window::{Runtime, RuntimeConfig};

const ARENA: f32 = 100.0;

/// A ball bouncing in a box. Physics runs at the fixed rate; the variable
/// rate only reports.
struct Bounce {
    pos: (f32, f32),
    vel: (f32, f32),
    fixed_steps: u64,
    last_reported_fps: u32,
    paused: bool,
}

impl Bounce {
    fn new() -> Self {
        Self {
            pos: (ARENA / 2.0, ARENA / 2.0),
            vel: (37.0, -23.0),
            fixed_steps: 0,
            last_reported_fps: 0,
            paused: false,
        }
    }
}

fn reflect(p: &mut f32, v: &mut f32) {
    if *p < 0.0 {
        *p = -*p;
        *v = -*v;
    } else if *p > ARENA {
        *p = 2.0 * ARENA - *p;
        *v = -*v;
    }
}

impl App for Bounce {
    fn load_content(&mut self) -> Result<()> {
        log::info!("arena {ARENA}x{ARENA}, ball at {:?}", self.pos);
        Ok(())
    }

    fn update(&mut self, ctx: &UpdateCtx<'_>) -> Result<AppControl> {
        if ctx.key_pressed(Key::Space) {
            self.paused = !self.paused;
            log::info!("simulation {}", if self.paused { "paused" } else { "resumed" });
        }

        if ctx.fps != self.last_reported_fps {
            self.last_reported_fps = ctx.fps;
            log::info!(
                "fps {:>4}  fixed steps {:>6}  ball ({:6.2}, {:6.2})",
                ctx.fps,
                self.fixed_steps,
                self.pos.0,
                self.pos.1
            );
        }

        Ok(AppControl::Continue)
    }

    fn fixed_update(&mut self, fixed_dt: f32) -> Result<()> {
        if self.paused {
            return Ok(());
        }

        self.pos.0 += self.vel.0 * fixed_dt;
        self.pos.1 += self.vel.1 * fixed_dt;
        reflect(&mut self.pos.0, &mut self.vel.0);
        reflect(&mut self.pos.1, &mut self.vel.1);

        if !(self.pos.0.is_finite() && self.pos.1.is_finite()) {
            anyhow::bail!("ball left the arena: {:?}", self.pos);
        }

        self.fixed_steps += 1;
        Ok(())
    }

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        match event {
            InputEvent::Key {
                key: Key::Escape,
                state: KeyState::Pressed,
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }
}

struct Args {
    headless: bool,
    seconds: Option<u64>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        headless: false,
        seconds: None,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--headless" => args.headless = true,
            "--seconds" => {
                let raw = it.next().context("--seconds needs a value")?;
                args.seconds = Some(raw.parse().with_context(|| format!("bad --seconds value {raw:?}"))?);
            }
            other => anyhow::bail!("unknown argument {other:?} (expected --headless, --seconds N)"),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let args = parse_args()?;
    let fixed = LoopConfig::from_env()?;

    if args.headless {
        let summary = HeadlessHost::new(fixed)
            .with_time_limit(Duration::from_secs(args.seconds.unwrap_or(3)))
            .run(Bounce::new())?;

        println!(
            "stopped ({:?}): {} variable ticks at ~{} fps, {} fixed ticks in {:.2?}",
            summary.reason,
            summary.variable_ticks,
            summary.fps,
            summary.fixed.ticks,
            summary.fixed.ran_for
        );
        return Ok(());
    }

    Runtime::run(
        RuntimeConfig {
            title: "cadence bounce".to_string(),
            initial_size: (640.0, 480.0),
            fixed,
        },
        Bounce::new(),
    )
}
