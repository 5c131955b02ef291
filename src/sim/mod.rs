//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (ordered maps, index-ordered windows)
//! - No rendering, audio, or platform dependencies

pub mod hero;
pub mod physics;
pub mod points;
pub mod power;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod timer;

pub use hero::{Animation, Hero, HeroInputs, MotionState};
pub use physics::{BasicWorld, BodyId, EdgeId, PhysicsWorld};
pub use points::{ExtremumPoint, generate_extremums};
pub use power::{PowerCue, PowerMeter, PowerStatus};
pub use state::{Outcome, Run, RunEvent, RunPhase, Snapshot};
pub use terrain::{CurveSegment, TerrainTrack};
pub use tick::{TickInput, tick};
pub use timer::{DelayQueue, Easing, TimedTransition};
