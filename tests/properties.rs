//! Property tests for the simulation invariants

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use glide_run::consts::WORLD_HEIGHT;
use glide_run::heading;
use glide_run::sim::{BasicWorld, Hero, PhysicsWorld, PowerMeter, TerrainTrack, generate_extremums};
use glide_run::tuning::{HeroParams, PowerParams, TrackParams};

fn track_params(count: usize) -> TrackParams {
    TrackParams {
        count,
        ..TrackParams::default()
    }
}

proptest! {
    #[test]
    fn generated_points_stay_in_band(seed in any::<u64>(), count in 2usize..80) {
        let params = track_params(count);
        let mut rng = Pcg32::seed_from_u64(seed);
        let points = generate_extremums(&params, WORLD_HEIGHT, &mut rng).unwrap();

        prop_assert_eq!(points.len(), count + 1);
        let top = WORLD_HEIGHT - params.max_height;
        let bottom = WORLD_HEIGHT - params.min_height;
        let seeds = params.seed_points.len();
        for w in points[seeds - 1..count].windows(2) {
            let dx = w[1].x - w[0].x;
            prop_assert!(dx >= params.min_dx - 1e-2 && dx <= params.min_dx + params.range_dx + 1e-2);
            let dy = (w[1].y - w[0].y).abs();
            prop_assert!(dy >= params.min_dy - 1e-3 && dy <= params.min_dy + params.range_dy + 1e-3);
            prop_assert!(w[1].y >= top && w[1].y <= bottom);
        }
        // Landing pad is flat
        prop_assert_eq!(points[count].y, points[count - 1].y);
    }

    #[test]
    fn window_stays_contiguous(seed in any::<u64>(), steps in prop::collection::vec(0.0f32..900.0, 1..40)) {
        let params = track_params(60);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut track = TerrainTrack::generate(&params, WORLD_HEIGHT, &mut rng).unwrap();
        let mut world = BasicWorld::new(300.0);
        let mut retired = Vec::new();

        let mut viewpoint = 0.0;
        for step in steps {
            viewpoint += step;
            let before: Vec<_> = track.segments().flat_map(|s| s.edge_ids().to_vec()).collect();
            track.update(viewpoint, &mut world);

            let indices: Vec<usize> = track.window_indices().collect();
            for w in indices.windows(2) {
                prop_assert_eq!(w[1], w[0] + 1);
            }

            let live: Vec<_> = track.segments().flat_map(|s| s.edge_ids().to_vec()).collect();
            retired.extend(before.into_iter().filter(|id| !live.contains(id)));
            prop_assert_eq!(world.edge_count(), live.len());
            prop_assert!(retired.iter().all(|id| !world.has_edge(*id)));
        }
    }

    #[test]
    fn power_value_stays_clamped(
        start in 0.0f32..1280.0,
        ticks in prop::collection::vec((0.0f32..720.0, any::<bool>()), 1..400),
    ) {
        let mut meter = PowerMeter::new(PowerParams::default());
        meter.set_value(start);
        for (altitude, progressing) in ticks {
            meter.update(altitude, progressing);
            prop_assert!(meter.value() >= 0.0 && meter.value() <= meter.max());
        }
    }

    #[test]
    fn horizontal_clamp_is_idempotent(vx in -2000.0f32..3000.0, vy in -1000.0f32..1000.0) {
        let mut world = BasicWorld::new(0.0);
        let mut hero = Hero::spawn(&mut world, HeroParams::default());
        let once = hero.clamp_horizontal(Vec2::new(vx, vy));
        let twice = hero.clamp_horizontal(once);
        prop_assert_eq!(once, twice);
        prop_assert!(once.x <= HeroParams::default().max_velocity_x);
    }

    #[test]
    fn heading_converges_after_full_window(
        noise in prop::collection::vec((-500.0f32..500.0, -500.0f32..500.0), 0..20),
        vx in 10.0f32..1200.0,
        vy in -600.0f32..600.0,
    ) {
        let params = HeroParams::default();
        let samples = params.velocity_samples;
        let mut world = BasicWorld::new(0.0);
        let mut hero = Hero::spawn(&mut world, params);
        for (x, y) in noise {
            hero.record_velocity(Vec2::new(x, y));
        }
        let steady = Vec2::new(vx, vy);
        let mut angle = 0.0;
        for _ in 0..samples {
            angle = hero.record_velocity(steady);
        }
        prop_assert!((angle - heading(steady)).abs() < 1e-4);
    }
}
