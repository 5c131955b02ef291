//! Data-driven game balance
//!
//! Every threshold, rate, and speed gate the simulation reads lives here.
//! Defaults reproduce the shipped feel; hosts may override any subset from JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Track generation and streaming parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Number of extremum points, seeds included, landing pad excluded
    pub count: usize,
    /// Hand-tuned opening geometry
    pub seed_points: Vec<Vec2>,
    pub min_dx: f32,
    pub range_dx: f32,
    pub min_dy: f32,
    pub range_dy: f32,
    /// Lowest terrain height above the world floor
    pub min_height: f32,
    /// Highest terrain height above the world floor
    pub max_height: f32,
    /// Horizontal length of the flat landing pad after the last scored point
    pub landing_pad: f32,
    /// Finish point sits this far before the end of the landing pad
    pub finish_offset: f32,
    /// Target width of one collision edge
    pub segment_width: f32,
    /// Geometry is retired once it falls this far behind the viewpoint
    pub behind_margin: f32,
    /// Geometry is materialized this far ahead of the viewpoint
    pub ahead_margin: f32,
    /// Horizontal tolerance for surface point lookups
    pub surface_epsilon: f32,
    /// Resample cap per extremum before generation gives up
    pub max_resample_attempts: u32,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            count: 500,
            seed_points: vec![Vec2::new(0.0, WORLD_HEIGHT - 240.0)],
            min_dx: 180.0,
            range_dx: 140.0,
            min_dy: 80.0,
            range_dy: 120.0,
            min_height: 30.0,
            max_height: 360.0,
            landing_pad: 1200.0,
            finish_offset: 300.0,
            segment_width: 10.0,
            behind_margin: 400.0,
            ahead_margin: 2000.0,
            surface_epsilon: 12.0,
            max_resample_attempts: 100_000,
        }
    }
}

impl TrackParams {
    /// Upper bound on the gap between neighbouring surface samples
    ///
    /// A span `s` is cut into `floor(s / w)` pieces, so pieces are at most
    /// `w * s / (s - w)` wide; the bound is worst for the shortest span.
    pub fn max_point_spacing(&self) -> f32 {
        let shortest = self
            .seed_points
            .windows(2)
            .map(|w| w[1].x - w[0].x)
            .fold(self.min_dx.min(self.landing_pad), f32::min);
        if shortest <= self.segment_width {
            return shortest.max(self.segment_width * 2.0);
        }
        self.segment_width * shortest / (shortest - self.segment_width)
    }
}

/// Power meter economy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerParams {
    pub max: f32,
    pub drain_rate: f32,
    pub charge_rate_low: f32,
    pub charge_rate_high: f32,
    /// Normal charge when hero y <= this (world y, smaller is higher)
    pub normal_threshold: f32,
    /// Super charge when hero y <= this
    pub super_threshold: f32,
    /// Below this value the meter reports low
    pub low_threshold: f32,
}

impl Default for PowerParams {
    fn default() -> Self {
        Self {
            max: VIEWPORT_WIDTH,
            drain_rate: 0.5,
            charge_rate_low: 0.6,
            charge_rate_high: 1.2,
            normal_threshold: WORLD_HEIGHT - 440.0,
            super_threshold: WORLD_HEIGHT - 590.0,
            low_threshold: 150.0,
        }
    }
}

/// Hero motion controller parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroParams {
    pub radius: f32,
    pub spawn: Vec2,
    pub min_y: f32,
    pub min_velocity_x: f32,
    pub max_velocity_x: f32,
    pub velocity_samples: usize,
    /// Airborne ticks before a nose-up hero counts as flying
    pub flying_ticks: u32,
    /// Downward force while diving
    pub dive_force: f32,
    pub wake_impulse: Vec2,
    /// Seconds from wake trigger to the wake cue
    pub wake_cue_delay: f32,
    /// Seconds from wake trigger to launch
    pub wake_launch_delay: f32,
    pub whoosh_speed: f32,
    pub yell_speed: f32,
    pub yell_delay: f32,
    /// Seconds to glide onto the finish point
    pub finish_duration: f32,
    /// Fall duration is `fall_factor * sqrt(drop)` seconds
    pub fall_factor: f32,
}

impl Default for HeroParams {
    fn default() -> Self {
        Self {
            radius: HERO_RADIUS,
            // Above the highest terrain band; the hero settles onto the track while asleep
            spawn: Vec2::new(100.0, WORLD_HEIGHT - 360.0 - 2.0 * HERO_RADIUS),
            min_y: MIN_Y,
            min_velocity_x: MIN_VELOCITY_X,
            max_velocity_x: MAX_VELOCITY_X,
            velocity_samples: VELOCITY_SAMPLES,
            flying_ticks: 12,
            dive_force: 600.0,
            wake_impulse: Vec2::new(200.0, -200.0),
            wake_cue_delay: 0.2,
            wake_launch_delay: 1.3,
            whoosh_speed: 550.0,
            yell_speed: 800.0,
            yell_delay: 0.25,
            finish_duration: 0.4,
            fall_factor: 0.02,
        }
    }
}

/// Viewpoint placement relative to the hero
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    /// Camera left edge trails the hero by this much
    pub lead: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self { lead: 300.0 }
    }
}

/// Complete tuning set for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world_height: f32,
    pub gravity: f32,
    pub track: TrackParams,
    pub power: PowerParams,
    pub hero: HeroParams,
    pub camera: CameraParams,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_height: WORLD_HEIGHT,
            gravity: GRAVITY,
            track: TrackParams::default(),
            power: PowerParams::default(),
            hero: HeroParams::default(),
            camera: CameraParams::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject parameter sets that cannot produce a valid run
    pub fn validate(&self) -> Result<(), SimError> {
        let t = &self.track;
        if t.min_height >= t.max_height {
            return Err(invalid(format!(
                "min_height {} must be below max_height {}",
                t.min_height, t.max_height
            )));
        }
        if t.max_height - t.min_height < t.min_dy {
            return Err(invalid(format!(
                "height band {} is narrower than min_dy {}",
                t.max_height - t.min_height,
                t.min_dy
            )));
        }
        if t.seed_points.is_empty() {
            return Err(invalid("at least one seed point is required".into()));
        }
        if t.seed_points.windows(2).any(|w| w[1].x <= w[0].x) {
            return Err(invalid("seed points must have strictly increasing x".into()));
        }
        if t.count < t.seed_points.len() {
            return Err(invalid(format!(
                "count {} is smaller than the {} seed points",
                t.count,
                t.seed_points.len()
            )));
        }
        if t.min_dx <= 0.0 || t.min_dy <= 0.0 || t.range_dx < 0.0 || t.range_dy < 0.0 {
            return Err(invalid("step sizes must be positive".into()));
        }
        if t.segment_width <= 0.0 || t.landing_pad <= t.finish_offset {
            return Err(invalid(
                "segment_width must be positive and landing_pad longer than finish_offset".into(),
            ));
        }
        let spacing = t.max_point_spacing();
        if t.surface_epsilon <= spacing {
            return Err(invalid(format!(
                "surface_epsilon {} must exceed the widest sample spacing {:.2}",
                t.surface_epsilon, spacing
            )));
        }
        if self.power.super_threshold >= self.power.normal_threshold {
            return Err(invalid(format!(
                "super_threshold {} must be above (smaller than) normal_threshold {}",
                self.power.super_threshold, self.power.normal_threshold
            )));
        }
        if self.power.max <= 0.0 {
            return Err(invalid("power max must be positive".into()));
        }
        let h = &self.hero;
        if h.velocity_samples == 0 || h.min_velocity_x >= h.max_velocity_x {
            return Err(invalid(
                "velocity_samples must be non-zero and min_velocity_x below max_velocity_x".into(),
            ));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> SimError {
    SimError::InvalidTuning(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "power": { "drain_rate": 0.75 } }"#).unwrap();
        assert_eq!(tuning.power.drain_rate, 0.75);
        assert_eq!(tuning.power.charge_rate_high, 1.2);
        assert_eq!(tuning.track.count, 500);
    }

    #[test]
    fn test_inverted_height_band_rejected() {
        let mut tuning = Tuning::default();
        tuning.track.min_height = 400.0;
        assert!(matches!(tuning.validate(), Err(SimError::InvalidTuning(_))));
    }

    #[test]
    fn test_swapped_power_thresholds_rejected() {
        let mut tuning = Tuning::default();
        std::mem::swap(
            &mut tuning.power.normal_threshold,
            &mut tuning.power.super_threshold,
        );
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_default_spacing_fits_surface_epsilon() {
        let track = TrackParams::default();
        let spacing = track.max_point_spacing();
        assert!(spacing > track.segment_width);
        assert!(spacing < track.surface_epsilon);
    }

    #[test]
    fn test_wide_segments_rejected() {
        let mut tuning = Tuning::default();
        tuning.track.segment_width = 30.0;
        assert!(matches!(tuning.validate(), Err(SimError::InvalidTuning(_))));

        tuning.track.surface_epsilon = 40.0;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(SimError::Config(_))));
    }
}
