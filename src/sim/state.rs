//! Run state
//!
//! A [`Run`] owns everything one playthrough needs: the physics world, the
//! streamed track, the hero, the power meter, deferred actions, and the
//! events produced since the host last drained them.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hero::{Animation, Hero, MotionState};
use super::physics::{BasicWorld, PhysicsWorld};
use super::power::{PowerMeter, PowerStatus};
use super::terrain::TerrainTrack;
use super::timer::DelayQueue;
use crate::error::SimError;
use crate::session::SessionState;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Hero asleep, waiting for the wake trigger
    Ready,
    /// Active gameplay
    Playing,
    /// Simulation frozen by the player
    Paused,
    /// Finished or failed; only the landing still animates
    Over,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Finished,
    Failed,
}

/// Things that happened during a tick, for presentation and lifecycle hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    /// Hero clip changed (or the terminal clip was forced)
    ActionChanged(Animation),
    WakeCue,
    DiveLoopStarted,
    DiveLoopStopped,
    /// First tick of a fast climb into flight
    Whoosh { speed: f32, yell: bool },
    Yell,
    ChargeStarted,
    SuperChargeStarted,
    AlarmStarted,
    AlarmStopped,
    Paused,
    Resumed,
    /// Reached the end of the scored distance
    Finished { distance: f32 },
    /// Ran out of power
    Failed { progress: f32 },
    /// Landing transition completed
    Landed { x: f32, y: f32 },
}

/// Actions deferred through the delay queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    WakeCue,
    Launch,
    Yell,
}

/// Tick-boundary view for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: RunPhase,
    pub hero_pos: Vec2,
    pub hero_angle: f32,
    pub motion: MotionState,
    pub animation: Animation,
    pub power_value: f32,
    pub power_max: f32,
    pub power_status: PowerStatus,
    pub power_low: bool,
    pub progress: f32,
    pub terrain: Vec<Vec2>,
}

/// One playthrough
pub struct Run<W: PhysicsWorld = BasicWorld> {
    /// Track seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub world: W,
    pub track: TerrainTrack,
    pub hero: Hero,
    pub power: PowerMeter,
    pub phase: RunPhase,
    /// Phase to return to when unpausing
    pub(crate) resume_phase: RunPhase,
    /// Fraction of the scored distance covered, in `[0, 1]`
    pub progress: f32,
    pub time_ticks: u64,
    pub(crate) outcome: Option<Outcome>,
    /// Fail landing waits for terrain under the hero
    pub(crate) pending_fall: bool,
    pub(crate) alarming: bool,
    pub(crate) delays: DelayQueue<Deferred>,
    pub(crate) events: Vec<RunEvent>,
    pub(crate) telemetry: bool,
}

impl Run<BasicWorld> {
    /// Run on the built-in solver
    pub fn headless(
        session: &SessionState,
        tuning: Tuning,
        seed: Option<u64>,
    ) -> Result<Self, SimError> {
        let world = BasicWorld::new(tuning.gravity);
        Self::new(session, tuning, world, seed)
    }
}

impl<W: PhysicsWorld> Run<W> {
    /// Build a run; a `None` seed picks a fresh random track
    pub fn new(
        session: &SessionState,
        tuning: Tuning,
        mut world: W,
        seed: Option<u64>,
    ) -> Result<Self, SimError> {
        tuning.validate()?;
        let seed = seed.unwrap_or_else(rand::random);
        let (track, hero, power) = build_parts(&tuning, &mut world, seed)?;

        log::info!(
            "Run started with seed {} ({} mode), finish at {:.0}",
            seed,
            session.mode.as_str(),
            track.distance_to_finish()
        );

        let mut run = Self {
            seed,
            tuning,
            world,
            track,
            hero,
            power,
            phase: RunPhase::Ready,
            resume_phase: RunPhase::Ready,
            progress: 0.0,
            time_ticks: 0,
            outcome: None,
            pending_fall: false,
            alarming: false,
            delays: DelayQueue::new(),
            events: Vec::new(),
            telemetry: session.is_dev_mode(),
        };
        run.update_window();
        Ok(run)
    }

    /// Start over on a new track; on error the current run is left untouched
    pub fn restart(&mut self, seed: Option<u64>) -> Result<(), SimError> {
        self.tuning.validate()?;
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let track =
            TerrainTrack::generate(&self.tuning.track, self.tuning.world_height, &mut rng)?;

        self.track.clear(&mut self.world);
        self.hero.cancel_landing();
        self.world.remove_body(self.hero.body());
        self.delays.clear();
        self.events.clear();

        self.seed = seed;
        self.track = track;
        self.hero = Hero::spawn(&mut self.world, self.tuning.hero.clone());
        self.power = PowerMeter::new(self.tuning.power.clone());
        self.phase = RunPhase::Ready;
        self.resume_phase = RunPhase::Ready;
        self.progress = 0.0;
        self.time_ticks = 0;
        self.outcome = None;
        self.pending_fall = false;
        self.alarming = false;
        self.world.resume();
        self.update_window();

        log::info!("Run restarted with seed {}", seed);
        Ok(())
    }

    /// Camera left edge, trailing the hero
    pub fn viewpoint_x(&self) -> f32 {
        self.world.position(self.hero.body()).x - self.tuning.camera.lead
    }

    pub(crate) fn update_window(&mut self) {
        let viewpoint = self.viewpoint_x();
        self.track.update(viewpoint, &mut self.world);
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::Over
    }

    /// Events since the last drain
    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.time_ticks,
            phase: self.phase,
            hero_pos: self.world.position(self.hero.body()),
            hero_angle: self.hero.angle(),
            motion: self.hero.motion(),
            animation: self.hero.animation(),
            power_value: self.power.value(),
            power_max: self.power.max(),
            power_status: self.power.status(),
            power_low: self.power.is_low(),
            progress: self.progress,
            terrain: self.track.visible_polyline(),
        }
    }
}

fn build_parts<W: PhysicsWorld + ?Sized>(
    tuning: &Tuning,
    world: &mut W,
    seed: u64,
) -> Result<(TerrainTrack, Hero, PowerMeter), SimError> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let track = TerrainTrack::generate(&tuning.track, tuning.world_height, &mut rng)?;
    let hero = Hero::spawn(world, tuning.hero.clone());
    let power = PowerMeter::new(tuning.power.clone());
    Ok((track, hero, power))
}
