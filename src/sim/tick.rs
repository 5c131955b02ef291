//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically. Per tick: step
//! physics, sample contact, update power, slide the terrain window, run the
//! hero controller, fire due deferred actions, then check for the end of the run.

use super::hero::HeroInputs;
use super::physics::PhysicsWorld;
use super::power::PowerCue;
use super::state::{Deferred, Outcome, Run, RunEvent, RunPhase};
use crate::error::SimError;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Dive button held
    pub pressing: bool,
    /// Wake the sleeping hero (start of play)
    pub wake: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the run by one fixed timestep
pub fn tick<W: PhysicsWorld>(run: &mut Run<W>, input: &TickInput, dt: f32) -> Result<(), SimError> {
    if input.pause {
        toggle_pause(run);
    }

    if run.phase == RunPhase::Paused {
        return Ok(());
    }

    run.time_ticks += 1;

    // After the end only the landing keeps moving
    if run.phase == RunPhase::Over {
        fire_deferred(run, dt);
        settle_landing(run, dt);
        return Ok(());
    }

    if input.wake && run.phase == RunPhase::Ready && run.hero.begin_wake(&mut run.events) {
        run.phase = RunPhase::Playing;
        let hero = &run.tuning.hero;
        run.delays.schedule(hero.wake_cue_delay, Deferred::WakeCue);
        run.delays.schedule(hero.wake_launch_delay, Deferred::Launch);
        log::debug!("Hero waking at tick {}", run.time_ticks);
    }

    run.world.step(dt);

    let body = run.hero.body();
    let pos = run.world.position(body);
    if !pos.is_finite() {
        return Err(SimError::PhysicsDesync { x: pos.x, y: pos.y });
    }
    let in_contact = run.world.in_contact(body);

    let progressing = run.phase == RunPhase::Playing && run.hero.has_reached_min_vel();
    run.power.update(pos.y, progressing);
    match run.power.cue() {
        Some(PowerCue::ChargeStarted) => run.events.push(RunEvent::ChargeStarted),
        Some(PowerCue::SuperChargeStarted) => run.events.push(RunEvent::SuperChargeStarted),
        Some(PowerCue::Emptied) => log::debug!("Power emptied at x={:.0}", pos.x),
        None => {}
    }
    update_alarm(run);

    run.track.update(pos.x - run.tuning.camera.lead, &mut run.world);

    let distance = run.track.distance_to_finish();
    run.progress = if distance > 0.0 {
        (pos.x / distance).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let mark = run.events.len();
    let inputs = HeroInputs {
        pressing: input.pressing,
        in_contact,
        power: run.power.status(),
        progress: run.progress,
    };
    run.hero.update(&mut run.world, inputs, &mut run.events);
    schedule_yell(run, mark);

    fire_deferred(run, dt);

    if run.hero.has_launched() && !run.hero.is_awake() {
        end_run(run);
    }

    settle_landing(run, dt);

    if run.telemetry && run.time_ticks.is_multiple_of(60) {
        let vel = run.world.velocity(body);
        log::debug!(
            "tick={} pos=({:.0}, {:.0}) vel=({:.0}, {:.0}) power={:.1} {:?} progress={:.3}",
            run.time_ticks,
            pos.x,
            pos.y,
            vel.x,
            vel.y,
            run.power.value(),
            run.power.status(),
            run.progress
        );
    }

    Ok(())
}

fn fire_deferred<W: PhysicsWorld>(run: &mut Run<W>, dt: f32) {
    for action in run.delays.advance(dt) {
        match action {
            Deferred::WakeCue => run.events.push(RunEvent::WakeCue),
            Deferred::Launch => {
                run.hero.launch(&mut run.world);
                log::debug!("Hero launched at tick {}", run.time_ticks);
            }
            Deferred::Yell => run.events.push(RunEvent::Yell),
        }
    }
}

fn toggle_pause<W: PhysicsWorld>(run: &mut Run<W>) {
    match run.phase {
        RunPhase::Ready | RunPhase::Playing => {
            run.resume_phase = run.phase;
            run.phase = RunPhase::Paused;
            run.world.pause();
            run.hero.pause_effects(&mut run.events);
            stop_alarm(run);
            run.events.push(RunEvent::Paused);
            log::debug!("Run paused at tick {}", run.time_ticks);
        }
        RunPhase::Paused => {
            run.phase = run.resume_phase;
            run.world.resume();
            run.events.push(RunEvent::Resumed);
            log::debug!("Run resumed at tick {}", run.time_ticks);
        }
        RunPhase::Over => {}
    }
}

fn update_alarm<W: PhysicsWorld>(run: &mut Run<W>) {
    let wanted = run.phase == RunPhase::Playing && run.power.is_low();
    if wanted && !run.alarming {
        run.alarming = true;
        run.events.push(RunEvent::AlarmStarted);
    } else if !wanted {
        stop_alarm(run);
    }
}

fn stop_alarm<W: PhysicsWorld>(run: &mut Run<W>) {
    if run.alarming {
        run.alarming = false;
        run.events.push(RunEvent::AlarmStopped);
    }
}

/// A fast enough whoosh is followed by a yell
fn schedule_yell<W: PhysicsWorld>(run: &mut Run<W>, mark: usize) {
    let yelled = run.events[mark..]
        .iter()
        .any(|e| matches!(e, RunEvent::Whoosh { yell: true, .. }));
    if yelled {
        run.delays.schedule(run.tuning.hero.yell_delay, Deferred::Yell);
    }
}

/// Decide the outcome exactly once and start the matching landing
fn end_run<W: PhysicsWorld>(run: &mut Run<W>) {
    if run.phase == RunPhase::Over {
        return;
    }
    run.phase = RunPhase::Over;
    run.world.pause();
    stop_alarm(run);

    if run.power.is_empty() {
        run.outcome = Some(Outcome::Failed);
        log::info!(
            "Run failed at {:.0}% (seed {})",
            run.progress * 100.0,
            run.seed
        );
        run.events.push(RunEvent::Failed {
            progress: run.progress,
        });
        run.pending_fall = true;
    } else {
        let distance = run.track.distance_to_finish();
        run.outcome = Some(Outcome::Finished);
        log::info!("Run finished, distance {:.0} (seed {})", distance, run.seed);
        run.events.push(RunEvent::Finished { distance });
        let finish = run.track.finish_point();
        run.hero.go_to_finish(&mut run.world, finish, &mut run.events);
    }
}

fn settle_landing<W: PhysicsWorld>(run: &mut Run<W>, dt: f32) {
    if run.pending_fall {
        let x = run.world.position(run.hero.body()).x;
        match run.track.nearest_surface_point(x) {
            Some(surface) => {
                run.hero.fall_to(&mut run.world, surface, &mut run.events);
                run.pending_fall = false;
            }
            None => log::warn!("No terrain under x={:.0}, deferring fall", x),
        }
    }
    run.hero.advance_landing(&mut run.world, dt, &mut run.events);
}
