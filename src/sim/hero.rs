//! Hero motion controller
//!
//! The hero is a single circle in the physics world. Each tick the controller
//! reads terrain contact, input, and power status, applies at most one force,
//! clamps velocity, and derives a heading from the averaged velocity of the
//! last few ticks. Animation and effect changes are edge-triggered: they are
//! reported once per transition, never every tick.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{BodyId, PhysicsWorld};
use super::power::PowerStatus;
use super::state::RunEvent;
use super::timer::{Easing, TimedTransition};
use crate::heading;
use crate::tuning::HeroParams;

/// Behavioral mode of the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Sleeping,
    Waking,
    /// Nose-up, not yet airborne long enough to count as flight
    Ascending,
    /// Nose-up glide after a sustained airborne stretch
    Flying,
    /// Input held, pushing down
    Diving,
    /// Nose-down
    Descending,
    /// Landed after the run ended
    Finished,
}

/// Animation clip shown for the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Animation {
    Sleep,
    Wake,
    Up,
    Fly,
    Down,
    Dive,
    Over,
}

impl Animation {
    pub fn for_motion(motion: MotionState) -> Self {
        match motion {
            MotionState::Sleeping => Animation::Sleep,
            MotionState::Waking => Animation::Wake,
            MotionState::Ascending => Animation::Up,
            MotionState::Flying => Animation::Fly,
            MotionState::Diving => Animation::Dive,
            MotionState::Descending => Animation::Down,
            MotionState::Finished => Animation::Over,
        }
    }

    /// Texture key of the clip
    pub fn clip(&self) -> &'static str {
        match self {
            Animation::Sleep => "hero-sleep",
            Animation::Wake => "hero-wake",
            Animation::Up => "hero-up",
            Animation::Fly => "hero-fly",
            Animation::Down => "hero-down",
            Animation::Dive => "hero-dive",
            Animation::Over => "hero-over",
        }
    }

    /// Playback rate; 0 means a still frame
    pub fn fps(&self) -> u32 {
        match self {
            Animation::Sleep | Animation::Wake => 5,
            Animation::Up => 6,
            Animation::Over => 10,
            Animation::Fly | Animation::Down | Animation::Dive => 0,
        }
    }

    pub fn looping(&self) -> bool {
        matches!(self, Animation::Sleep | Animation::Up)
    }
}

/// Per-tick inputs sampled by the loop before the hero updates
#[derive(Debug, Clone, Copy)]
pub struct HeroInputs {
    pub pressing: bool,
    pub in_contact: bool,
    pub power: PowerStatus,
    pub progress: f32,
}

#[derive(Debug, Clone)]
pub struct Hero {
    body: BodyId,
    params: HeroParams,
    awake: bool,
    launched: bool,
    shut_down: bool,
    motion: MotionState,
    velocity_samples: VecDeque<Vec2>,
    /// True while airborne relative to the terrain
    contact_ending: bool,
    airborne_ticks: u32,
    is_flying: bool,
    has_reached_min_vel: bool,
    dive_loop_active: bool,
    angle: f32,
    animation: Animation,
    landing: Option<TimedTransition>,
}

impl Hero {
    /// Spawn the hero asleep at the configured spawn point
    pub fn spawn<W: PhysicsWorld + ?Sized>(world: &mut W, params: HeroParams) -> Self {
        let body = world.create_circle(params.spawn, params.radius);
        let capacity = params.velocity_samples;
        Self {
            body,
            params,
            awake: false,
            launched: false,
            shut_down: false,
            motion: MotionState::Sleeping,
            velocity_samples: VecDeque::with_capacity(capacity),
            contact_ending: false,
            airborne_ticks: 0,
            is_flying: false,
            has_reached_min_vel: false,
            dive_loop_active: false,
            angle: 0.0,
            animation: Animation::Sleep,
            landing: None,
        }
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Whether the hero was ever launched this run
    pub fn has_launched(&self) -> bool {
        self.launched
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    /// Smoothed heading in radians; negative is nose-up
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn has_reached_min_vel(&self) -> bool {
        self.has_reached_min_vel
    }

    pub fn airborne_ticks(&self) -> u32 {
        self.airborne_ticks
    }

    pub fn is_diving(&self) -> bool {
        self.dive_loop_active
    }

    pub fn is_landing(&self) -> bool {
        self.landing.is_some()
    }

    pub fn radius(&self) -> f32 {
        self.params.radius
    }

    /// Begin waking; only a sleeping hero responds
    pub fn begin_wake(&mut self, events: &mut Vec<RunEvent>) -> bool {
        if self.motion != MotionState::Sleeping {
            return false;
        }
        self.motion = MotionState::Waking;
        self.sync_animation(events);
        true
    }

    /// Kick off to the upper right and hand control to the state machine
    pub fn launch<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        if self.launched || self.shut_down {
            return;
        }
        world.apply_impulse(self.body, self.params.wake_impulse);
        self.awake = true;
        self.launched = true;
    }

    /// One controller tick
    pub fn update<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        inputs: HeroInputs,
        events: &mut Vec<RunEvent>,
    ) {
        if !self.awake {
            return;
        }

        // Airborne bookkeeping from the contact flag sampled at the top of the tick
        self.contact_ending = !inputs.in_contact;
        if self.contact_ending {
            self.airborne_ticks += 1;
        } else {
            self.airborne_ticks = 0;
            self.is_flying = false;
        }

        if inputs.progress >= 1.0 || inputs.power == PowerStatus::Empty {
            self.shutdown(events);
            return;
        }

        self.update_motion(world, inputs.pressing, events);

        let vel = world.velocity(self.body);
        let pos = world.position(self.body);
        let vel = self.clamp_horizontal(vel);
        let vel = self.soft_ceiling(pos.y, vel);
        world.set_velocity(self.body, vel);

        self.record_velocity(vel);
        self.sync_animation(events);
    }

    fn update_motion<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        pressing: bool,
        events: &mut Vec<RunEvent>,
    ) {
        let vel = world.velocity(self.body);

        if pressing {
            // Force only bites once moving, so a dive cannot stall from a standstill
            if vel.x > self.params.min_velocity_x {
                world.apply_force(self.body, Vec2::new(0.0, self.params.dive_force));
            }
            self.motion = MotionState::Diving;
            if !self.dive_loop_active {
                self.dive_loop_active = true;
                events.push(RunEvent::DiveLoopStarted);
            }
            return;
        }

        self.stop_dive_loop(events);

        if self.angle < 0.0 {
            if self.airborne_ticks >= self.params.flying_ticks {
                if !self.is_flying && vel.y < 0.0 {
                    let speed = vel.length();
                    if speed >= self.params.whoosh_speed {
                        events.push(RunEvent::Whoosh {
                            speed,
                            yell: speed >= self.params.yell_speed,
                        });
                    }
                }
                self.motion = MotionState::Flying;
                self.is_flying = true;
            } else {
                self.motion = MotionState::Ascending;
            }
        } else if self.angle > 0.0 {
            self.motion = MotionState::Descending;
        }
    }

    /// Keep horizontal speed inside `[min, max]` once the minimum was reached.
    ///
    /// Idempotent: clamping an already clamped velocity changes nothing.
    pub fn clamp_horizontal(&mut self, mut vel: Vec2) -> Vec2 {
        if vel.x < self.params.min_velocity_x {
            if self.has_reached_min_vel {
                vel.x = self.params.min_velocity_x;
            }
        } else {
            self.has_reached_min_vel = true;
            if vel.x > self.params.max_velocity_x {
                vel.x = self.params.max_velocity_x;
            }
        }
        vel
    }

    /// Above the ceiling, upward speed bleeds off by a tenth per tick
    pub fn soft_ceiling(&self, y: f32, mut vel: Vec2) -> Vec2 {
        if y < self.params.min_y && vel.y < 0.0 {
            vel.y -= vel.y / 10.0;
        }
        vel
    }

    /// Push a velocity sample and recompute the heading from the average
    pub fn record_velocity(&mut self, vel: Vec2) -> f32 {
        if self.velocity_samples.len() >= self.params.velocity_samples {
            self.velocity_samples.pop_front();
        }
        self.velocity_samples.push_back(vel);

        let sum: Vec2 = self.velocity_samples.iter().copied().sum();
        let avg = sum / self.velocity_samples.len() as f32;
        self.angle = heading(avg);
        self.angle
    }

    fn sync_animation(&mut self, events: &mut Vec<RunEvent>) {
        let desired = if self.shut_down {
            Animation::Over
        } else {
            Animation::for_motion(self.motion)
        };
        if desired != self.animation {
            self.animation = desired;
            events.push(RunEvent::ActionChanged(desired));
        }
    }

    fn stop_dive_loop(&mut self, events: &mut Vec<RunEvent>) {
        if self.dive_loop_active {
            self.dive_loop_active = false;
            events.push(RunEvent::DiveLoopStopped);
        }
    }

    /// Freeze effects for a pause; the dive loop restarts on the next pressed tick
    pub fn pause_effects(&mut self, events: &mut Vec<RunEvent>) {
        self.stop_dive_loop(events);
    }

    /// Stop responding to input; the body keeps its velocity until landing
    pub fn shutdown(&mut self, events: &mut Vec<RunEvent>) {
        if self.shut_down {
            return;
        }
        self.awake = false;
        self.shut_down = true;
        self.stop_dive_loop(events);
        self.sync_animation(events);
    }

    /// Glide onto the finish point
    pub fn go_to_finish<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        finish: Vec2,
        events: &mut Vec<RunEvent>,
    ) {
        self.shutdown(events);
        let target = finish - Vec2::new(0.0, self.params.radius);
        self.start_landing(world, target, self.params.finish_duration, Easing::Linear);
    }

    /// Drop onto the surface below; duration grows with the square root of the drop
    pub fn fall_to<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        surface: Vec2,
        events: &mut Vec<RunEvent>,
    ) {
        self.shutdown(events);
        let target = surface - Vec2::new(0.0, self.params.radius);
        let drop = (world.position(self.body).y - target.y).abs();
        let duration = self.params.fall_factor * drop.sqrt();
        self.start_landing(world, target, duration, Easing::QuadraticIn);
    }

    fn start_landing<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        target: Vec2,
        duration: f32,
        easing: Easing,
    ) {
        if self.landing.is_some() || self.motion == MotionState::Finished {
            return;
        }
        let from = world.position(self.body);
        world.set_velocity(self.body, Vec2::ZERO);
        self.landing =
            Some(TimedTransition::new(from, target, duration, easing).with_angle(self.angle, 0.0));
    }

    /// Advance an active landing; returns true on the tick it completes
    pub fn advance_landing<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        dt: f32,
        events: &mut Vec<RunEvent>,
    ) -> bool {
        let Some(landing) = self.landing.as_mut() else {
            return false;
        };
        let done = landing.advance(dt);
        let pos = landing.position();
        self.angle = landing.angle();
        world.set_position(self.body, pos);
        world.set_velocity(self.body, Vec2::ZERO);

        if done {
            self.landing = None;
            self.motion = MotionState::Finished;
            // Terminal clip replays even though "over" is already showing
            self.animation = Animation::Over;
            events.push(RunEvent::ActionChanged(Animation::Over));
            events.push(RunEvent::Landed { x: pos.x, y: pos.y });
        }
        done
    }

    /// Abandon an in-flight landing (run teardown)
    pub fn cancel_landing(&mut self) {
        if let Some(landing) = self.landing.as_mut() {
            landing.cancel();
        }
        self.landing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::BasicWorld;

    fn awake_hero(world: &mut BasicWorld) -> Hero {
        let mut hero = Hero::spawn(world, HeroParams::default());
        let mut events = Vec::new();
        hero.begin_wake(&mut events);
        hero.launch(world);
        hero
    }

    fn inputs(pressing: bool, in_contact: bool) -> HeroInputs {
        HeroInputs {
            pressing,
            in_contact,
            power: PowerStatus::Losing,
            progress: 0.2,
        }
    }

    #[test]
    fn test_wake_only_from_sleep() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = Hero::spawn(&mut world, HeroParams::default());
        let mut events = Vec::new();
        assert!(hero.begin_wake(&mut events));
        assert_eq!(hero.motion(), MotionState::Waking);
        assert_eq!(events, vec![RunEvent::ActionChanged(Animation::Wake)]);
        assert!(!hero.begin_wake(&mut events));

        hero.launch(&mut world);
        assert!(hero.is_awake());
        assert_eq!(world.velocity(hero.body()), Vec2::new(200.0, -200.0));
    }

    #[test]
    fn test_min_velocity_snap_needs_prior_reach() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);

        let vel = hero.clamp_horizontal(Vec2::new(50.0, 0.0));
        assert_eq!(vel.x, 50.0);
        assert!(!hero.has_reached_min_vel());

        let vel = hero.clamp_horizontal(Vec2::new(90.0, 0.0));
        assert_eq!(vel.x, 90.0);
        assert!(hero.has_reached_min_vel());

        let vel = hero.clamp_horizontal(Vec2::new(50.0, 0.0));
        assert_eq!(vel.x, 80.0);
    }

    #[test]
    fn test_max_velocity_clamp_is_idempotent() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        let once = hero.clamp_horizontal(Vec2::new(5000.0, -30.0));
        let twice = hero.clamp_horizontal(once);
        assert_eq!(once, Vec2::new(1200.0, -30.0));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_soft_ceiling_bleeds_upward_speed() {
        let mut world = BasicWorld::new(0.0);
        let hero = awake_hero(&mut world);
        assert_eq!(hero.soft_ceiling(50.0, Vec2::new(100.0, -100.0)).y, -90.0);
        // Falling or below the ceiling: untouched
        assert_eq!(hero.soft_ceiling(50.0, Vec2::new(100.0, 40.0)).y, 40.0);
        assert_eq!(hero.soft_ceiling(300.0, Vec2::new(100.0, -100.0)).y, -100.0);
    }

    #[test]
    fn test_smoothed_angle_converges() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        for _ in 0..5 {
            hero.record_velocity(Vec2::new(100.0, 100.0));
        }
        let steady = Vec2::new(300.0, -120.0);
        let mut angle = 0.0;
        for _ in 0..10 {
            angle = hero.record_velocity(steady);
        }
        assert!((angle - heading(steady)).abs() < 1e-5);
    }

    #[test]
    fn test_dive_loop_edge_triggered() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        let mut events = Vec::new();

        for _ in 0..5 {
            hero.update(&mut world, inputs(true, false), &mut events);
        }
        let starts = events.iter().filter(|e| **e == RunEvent::DiveLoopStarted).count();
        assert_eq!(starts, 1);
        assert_eq!(hero.motion(), MotionState::Diving);

        hero.update(&mut world, inputs(false, false), &mut events);
        hero.update(&mut world, inputs(false, false), &mut events);
        let stops = events.iter().filter(|e| **e == RunEvent::DiveLoopStopped).count();
        assert_eq!(stops, 1);
        assert_ne!(hero.motion(), MotionState::Diving);
    }

    #[test]
    fn test_dive_force_waits_for_speed() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = Hero::spawn(&mut world, HeroParams::default());
        let mut events = Vec::new();
        hero.begin_wake(&mut events);
        hero.launch(&mut world);
        world.set_velocity(hero.body(), Vec2::new(20.0, 0.0));

        hero.update(&mut world, inputs(true, true), &mut events);
        world.step(0.1);
        assert_eq!(world.velocity(hero.body()).y, 0.0);

        world.set_velocity(hero.body(), Vec2::new(200.0, 0.0));
        hero.update(&mut world, inputs(true, true), &mut events);
        world.step(0.1);
        assert!(world.velocity(hero.body()).y > 0.0);
    }

    #[test]
    fn test_ascending_then_flying_after_airborne_ticks() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        let mut events = Vec::new();
        world.set_velocity(hero.body(), Vec2::new(600.0, -300.0));

        // Seed the heading so the first decision already sees nose-up
        hero.record_velocity(Vec2::new(600.0, -300.0));
        for _ in 0..11 {
            hero.update(&mut world, inputs(false, false), &mut events);
            assert_eq!(hero.motion(), MotionState::Ascending);
        }
        hero.update(&mut world, inputs(false, false), &mut events);
        assert_eq!(hero.motion(), MotionState::Flying);

        let whooshes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, RunEvent::Whoosh { .. }))
            .collect();
        assert_eq!(whooshes.len(), 1);
        assert!(matches!(whooshes[0], RunEvent::Whoosh { yell: false, .. }));

        // Staying airborne keeps flying without a second whoosh
        hero.update(&mut world, inputs(false, false), &mut events);
        let count = events.iter().filter(|e| matches!(e, RunEvent::Whoosh { .. })).count();
        assert_eq!(count, 1);

        // Touching down resets the airborne count
        hero.update(&mut world, inputs(false, true), &mut events);
        assert_eq!(hero.airborne_ticks(), 0);
        assert_eq!(hero.motion(), MotionState::Ascending);
    }

    #[test]
    fn test_nose_down_descends() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        let mut events = Vec::new();
        world.set_velocity(hero.body(), Vec2::new(300.0, 200.0));
        for _ in 0..10 {
            hero.record_velocity(Vec2::new(300.0, 200.0));
        }
        hero.update(&mut world, inputs(false, true), &mut events);
        assert_eq!(hero.motion(), MotionState::Descending);
        assert_eq!(hero.animation(), Animation::Down);
    }

    #[test]
    fn test_action_changes_fire_once_per_transition() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        let mut events = Vec::new();
        world.set_velocity(hero.body(), Vec2::new(300.0, 200.0));
        for _ in 0..10 {
            hero.record_velocity(Vec2::new(300.0, 200.0));
        }
        for _ in 0..5 {
            world.set_velocity(hero.body(), Vec2::new(300.0, 200.0));
            hero.update(&mut world, inputs(false, true), &mut events);
        }
        let changes = events
            .iter()
            .filter(|e| matches!(e, RunEvent::ActionChanged(_)))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_empty_power_shuts_down_and_freezes() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        let mut events = Vec::new();
        hero.update(&mut world, inputs(true, false), &mut events);
        events.clear();

        let empty = HeroInputs {
            power: PowerStatus::Empty,
            ..inputs(true, false)
        };
        hero.update(&mut world, empty, &mut events);
        assert!(!hero.is_awake());
        assert_eq!(
            events,
            vec![
                RunEvent::DiveLoopStopped,
                RunEvent::ActionChanged(Animation::Over)
            ]
        );

        let vel = world.velocity(hero.body());
        hero.update(&mut world, empty, &mut events);
        assert_eq!(world.velocity(hero.body()), vel);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_finish_landing_reaches_target() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        let mut events = Vec::new();
        hero.go_to_finish(&mut world, Vec2::new(1000.0, 600.0), &mut events);
        assert!(hero.is_landing());

        let mut done = false;
        for _ in 0..30 {
            done |= hero.advance_landing(&mut world, 1.0 / 60.0, &mut events);
        }
        assert!(done);
        assert_eq!(hero.motion(), MotionState::Finished);
        assert_eq!(world.position(hero.body()), Vec2::new(1000.0, 568.0));
        assert_eq!(hero.angle(), 0.0);
        assert!(events.contains(&RunEvent::Landed { x: 1000.0, y: 568.0 }));
    }

    #[test]
    fn test_fall_duration_scales_with_drop() {
        let mut world = BasicWorld::new(0.0);
        let mut hero = awake_hero(&mut world);
        let mut events = Vec::new();
        let start = world.position(hero.body());
        // Surface 400 below the hero's feet
        let surface = start + Vec2::new(0.0, 400.0 + 32.0);
        hero.fall_to(&mut world, surface, &mut events);

        // 0.02 * sqrt(400) = 0.4s = 24 ticks
        let mut ticks = 0;
        while !hero.advance_landing(&mut world, 1.0 / 60.0, &mut events) {
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!((23..=24).contains(&ticks), "took {ticks} ticks");
    }
}
