//! Error taxonomy for the simulation core
//!
//! Query misses are not errors (they are `Option::None`), and stale effect
//! stops are no-ops. What remains is fatal to a run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Parameter set rejected before the track could be generated
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
    /// Rejection sampling could not place an extremum inside the height band
    #[error("extremum {index} still out of band after {attempts} resamples")]
    GenerationExhausted { index: usize, attempts: u32 },
    /// The physics world produced a non-finite hero position
    #[error("physics desync: hero position ({x}, {y}) is not finite")]
    PhysicsDesync { x: f32, y: f32 },
    /// Tuning or session JSON could not be parsed
    #[error("failed to parse config: {0}")]
    Config(#[from] serde_json::Error),
}
