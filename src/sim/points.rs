//! Extremum point generation
//!
//! The track profile is a chain of alternating peaks and troughs. Starting
//! from the hand-tuned seed points, each new extremum steps right by a random
//! dx and up or down by a random dy, resampling dy until the point lands
//! inside the allowed height band. A flat landing pad closes the sequence.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::tuning::TrackParams;

/// A local peak or trough of the track profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremumPoint {
    pub x: f32,
    pub y: f32,
}

impl ExtremumPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for ExtremumPoint {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// Generate `params.count` extremums plus the landing pad point.
///
/// y grows downward, so the band is `[world_height - max_height, world_height - min_height]`.
pub fn generate_extremums<R: Rng + ?Sized>(
    params: &TrackParams,
    world_height: f32,
    rng: &mut R,
) -> Result<Vec<ExtremumPoint>, SimError> {
    let top = world_height - params.max_height;
    let bottom = world_height - params.min_height;
    if top >= bottom {
        return Err(SimError::InvalidTuning(format!(
            "empty height band [{top}, {bottom}]"
        )));
    }
    if params.seed_points.is_empty() {
        return Err(SimError::InvalidTuning("no seed points".into()));
    }

    let mut points: Vec<ExtremumPoint> = Vec::with_capacity(params.count.max(1) + 1);
    points.extend(params.seed_points.iter().copied().map(ExtremumPoint::from));

    // Continue the seed's alternation: if the seeds last stepped up, step down next
    let seeds = points.len();
    let first_sign = match points.as_slice() {
        [.., a, b] if b.y < a.y => 1.0,
        [.., _, _] => -1.0,
        _ => 1.0,
    };

    for i in seeds..params.count {
        let prev = points[i - 1];
        let sign = if (i - seeds) % 2 == 0 {
            first_sign
        } else {
            -first_sign
        };

        let mut attempts = 0;
        let y = loop {
            let dy = params.min_dy + rng.random_range(0.0..=params.range_dy);
            let candidate = prev.y + sign * dy;
            if (top..=bottom).contains(&candidate) {
                break candidate;
            }
            attempts += 1;
            if attempts >= params.max_resample_attempts {
                return Err(SimError::GenerationExhausted { index: i, attempts });
            }
        };

        let x = prev.x + params.min_dx + rng.random_range(0.0..=params.range_dx);
        points.push(ExtremumPoint::new(x, y));
    }

    // Flat landing pad beyond the last scored point
    let last = points[points.len() - 1];
    points.push(ExtremumPoint::new(last.x + params.landing_pad, last.y));

    log::debug!(
        "Generated {} extremums, finish at x={:.0}",
        points.len(),
        points[points.len() - 2].x
    );

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn scenario_params() -> TrackParams {
        TrackParams {
            count: 5,
            seed_points: vec![
                Vec2::new(-60.0, 640.0),
                Vec2::new(100.0, 560.0),
                Vec2::new(320.0, 680.0),
                Vec2::new(600.0, 520.0),
            ],
            min_dx: 200.0,
            range_dx: 120.0,
            min_dy: 80.0,
            range_dy: 110.0,
            min_height: 30.0,
            max_height: 360.0,
            ..TrackParams::default()
        }
    }

    #[test]
    fn test_generated_point_after_seeds() {
        for seed in 0..50 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let points = generate_extremums(&scenario_params(), 720.0, &mut rng).unwrap();
            // 5 extremums + landing pad
            assert_eq!(points.len(), 6);
            let p = points[4];
            assert!((360.0..=690.0).contains(&p.y), "y={} out of band", p.y);
            assert!(p.x > 800.0 - 0.001, "x={}", p.x);
        }
    }

    #[test]
    fn test_bounds_and_monotonic_x() {
        let params = TrackParams::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let points = generate_extremums(&params, 720.0, &mut rng).unwrap();
        assert_eq!(points.len(), params.count + 1);
        for w in points.windows(2) {
            assert!(w[1].x > w[0].x);
        }
        for p in &points[1..] {
            assert!(p.y >= 720.0 - params.max_height && p.y <= 720.0 - params.min_height);
        }
    }

    #[test]
    fn test_generated_points_alternate() {
        let mut rng = Pcg32::seed_from_u64(3);
        let points = generate_extremums(&scenario_params(), 720.0, &mut rng).unwrap();
        let params = TrackParams {
            count: 40,
            ..scenario_params()
        };
        let points_long = generate_extremums(&params, 720.0, &mut rng).unwrap();
        assert!(points[4].y > points[3].y, "seeds stepped up, next must step down");
        let n = points_long.len() - 1;
        for i in 4..n - 1 {
            let d0 = points_long[i].y - points_long[i - 1].y;
            let d1 = points_long[i + 1].y - points_long[i].y;
            assert!(d0 * d1 < 0.0, "extremum {i} does not alternate");
        }
    }

    #[test]
    fn test_landing_pad_is_flat() {
        let mut rng = Pcg32::seed_from_u64(11);
        let params = TrackParams::default();
        let points = generate_extremums(&params, 720.0, &mut rng).unwrap();
        let pad = points[points.len() - 1];
        let last = points[points.len() - 2];
        assert_eq!(pad.y, last.y);
        assert!((pad.x - last.x - params.landing_pad).abs() < 0.001);
    }

    #[test]
    fn test_same_seed_same_track() {
        let params = TrackParams::default();
        let a = generate_extremums(&params, 720.0, &mut Pcg32::seed_from_u64(42)).unwrap();
        let b = generate_extremums(&params, 720.0, &mut Pcg32::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_inverted_band_fails_construction() {
        let params = TrackParams {
            min_height: 400.0,
            max_height: 100.0,
            ..TrackParams::default()
        };
        let result = generate_extremums(&params, 720.0, &mut Pcg32::seed_from_u64(1));
        assert!(matches!(result, Err(SimError::InvalidTuning(_))));
    }

    #[test]
    fn test_unreachable_band_exhausts() {
        // Steps always overshoot a 20-unit band
        let params = TrackParams {
            seed_points: vec![Vec2::new(0.0, 700.0)],
            min_height: 10.0,
            max_height: 30.0,
            max_resample_attempts: 50,
            ..TrackParams::default()
        };
        let result = generate_extremums(&params, 720.0, &mut Pcg32::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(SimError::GenerationExhausted { index: 1, attempts: 50 })
        ));
    }
}
