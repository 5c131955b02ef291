//! Glide Run - simulation core for an endless gliding game
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (terrain streaming, hero controller, power meter)
//! - `tuning`: Data-driven game balance
//! - `session`: Host session state (mode, resource paths, persisted flags)
//! - `ui`: End-of-run panels
//! - `error`: Error taxonomy

pub mod error;
pub mod session;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::SimError;
pub use session::{SessionMode, SessionState};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// World height in world units (y grows downward)
    pub const WORLD_HEIGHT: f32 = 720.0;
    /// Viewport width, also the power meter capacity
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    /// Downward gravity (units/s²)
    pub const GRAVITY: f32 = 300.0;

    /// Hero collider radius
    pub const HERO_RADIUS: f32 = 32.0;
    /// Soft ceiling: above this y, upward velocity bleeds off
    pub const MIN_Y: f32 = 100.0;
    /// Minimum horizontal speed once reached
    pub const MIN_VELOCITY_X: f32 = 80.0;
    /// Maximum horizontal speed
    pub const MAX_VELOCITY_X: f32 = 1200.0;
    /// Number of velocity samples averaged for the heading angle
    pub const VELOCITY_SAMPLES: usize = 10;
}

/// Linear interpolation between two points
#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Heading angle (radians) of a velocity vector; negative means nose-up
#[inline]
pub fn heading(vel: Vec2) -> f32 {
    vel.y.atan2(vel.x)
}
