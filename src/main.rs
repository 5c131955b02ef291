//! Glide Run headless runner
//!
//! Plays one run on the built-in physics world with a simple autopilot and
//! logs the outcome. Usage: `glide-run [SEED] [--dev] [--tuning FILE]`.

use std::error::Error;

use glide_run::consts::SIM_DT;
use glide_run::sim::{MotionState, PhysicsWorld, Run, RunEvent, TickInput, tick};
use glide_run::ui::{EndPanel, Panel};
use glide_run::{SessionMode, SessionState, Tuning};

/// Give up after ten simulated minutes
const MAX_TICKS: u64 = 60 * 60 * 10;

struct Args {
    seed: Option<u64>,
    mode: SessionMode,
    tuning: Option<String>,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut args = Args {
        seed: None,
        mode: SessionMode::Prod,
        tuning: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dev" => args.mode = SessionMode::Dev,
            "--tuning" => {
                let path = iter.next().ok_or("--tuning needs a file path")?;
                args.tuning = Some(path);
            }
            other => args.seed = Some(other.parse()?),
        }
    }
    Ok(args)
}

/// Dive while falling through the low band, glide otherwise
fn autopilot(run: &Run, wake: bool) -> TickInput {
    let body = run.hero.body();
    let pos = run.world.position(body);
    let vel = run.world.velocity(body);
    TickInput {
        pressing: run.hero.is_awake() && vel.y > 0.0 && pos.y > run.tuning.power.normal_threshold,
        wake,
        pause: false,
    }
}

fn play() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    let tuning = match &args.tuning {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };
    let session = SessionState::new(args.mode);

    let mut run = Run::headless(&session, tuning, args.seed)?;
    let mut panel: Option<EndPanel> = None;

    while run.time_ticks < MAX_TICKS {
        let input = autopilot(&run, run.time_ticks == 0);
        tick(&mut run, &input, SIM_DT)?;

        for event in run.drain_events() {
            log::trace!("{:?}", event);
            if let Some(mut end) = EndPanel::from_event(&event) {
                end.show();
                panel = Some(end);
            }
            if let RunEvent::Landed { x, y } = event {
                log::info!("Landed at ({:.0}, {:.0}) after {} ticks", x, y, run.time_ticks);
            }
        }

        if run.is_over() && run.hero.motion() == MotionState::Finished {
            break;
        }
    }

    match &panel {
        Some(EndPanel::Success(p)) => log::info!("{}: distance {}", p.title(), p.distance_label()),
        Some(EndPanel::Failure(p)) => log::info!("{}: {}%", p.title(), p.percent()),
        None => log::warn!("Run did not end within {} ticks", MAX_TICKS),
    }

    println!("{}", serde_json::to_string_pretty(&run.snapshot())?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Glide Run (headless) starting...");

    if let Err(e) = play() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
