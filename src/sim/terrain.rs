//! Streaming terrain track
//!
//! The track owns the full extremum sequence but only keeps collision
//! geometry for the curve segments near the viewpoint. Segment `i` spans
//! extremums `i` and `i + 1` with a half-cosine profile, sampled into short
//! edges. The window of live segments is a contiguous index range that only
//! ever slides forward.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::physics::{EdgeId, PhysicsWorld};
use super::points::{ExtremumPoint, generate_extremums};
use crate::error::SimError;
use crate::tuning::TrackParams;

/// Half-cosine polyline between two extremums, with its collision edges
#[derive(Debug, Clone)]
pub struct CurveSegment {
    pub index: usize,
    pub points: Vec<Vec2>,
    edges: Vec<EdgeId>,
}

impl CurveSegment {
    /// Sample the curve from `a` to `b` into sub-segments about `width` wide
    pub fn build(index: usize, a: ExtremumPoint, b: ExtremumPoint, width: f32) -> Self {
        let span = b.x - a.x;
        let count = ((span / width).floor() as usize).max(1);
        let dx = span / count as f32;
        let da = std::f32::consts::PI / count as f32;
        let ymid = (a.y + b.y) / 2.0;
        let ampl = (a.y - b.y) / 2.0;

        let points = (0..=count)
            .map(|j| match j {
                0 => a.pos(),
                j if j == count => b.pos(),
                j => Vec2::new(a.x + j as f32 * dx, ymid + ampl * (da * j as f32).cos()),
            })
            .collect();

        Self {
            index,
            points,
            edges: Vec::new(),
        }
    }

    pub fn left(&self) -> f32 {
        self.points.first().map(|p| p.x).unwrap_or(0.0)
    }

    pub fn right(&self) -> f32 {
        self.points.last().map(|p| p.x).unwrap_or(0.0)
    }

    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edges
    }

    fn register<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        self.edges = self
            .points
            .windows(2)
            .map(|w| world.add_edge(w[0], w[1]))
            .collect();
    }

    fn release<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        for id in self.edges.drain(..) {
            world.remove_edge(id);
        }
        self.points.clear();
    }
}

/// The procedurally generated track and its live window
#[derive(Debug)]
pub struct TerrainTrack {
    extremums: Vec<ExtremumPoint>,
    window: VecDeque<CurveSegment>,
    /// Next segment index to materialize; everything below is live or retired
    next_index: usize,
    params: TrackParams,
}

impl TerrainTrack {
    /// Generate a new track; fails if the tuning cannot produce one
    pub fn generate<R: Rng + ?Sized>(
        params: &TrackParams,
        world_height: f32,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        let extremums = generate_extremums(params, world_height, rng)?;
        Ok(Self::from_extremums(extremums, params.clone()))
    }

    /// Build a track over a fixed extremum sequence (last point is the landing pad)
    pub fn from_extremums(extremums: Vec<ExtremumPoint>, params: TrackParams) -> Self {
        Self {
            extremums,
            window: VecDeque::new(),
            next_index: 0,
            params,
        }
    }

    pub fn extremums(&self) -> &[ExtremumPoint] {
        &self.extremums
    }

    fn segment_count(&self) -> usize {
        self.extremums.len().saturating_sub(1)
    }

    /// Slide the window to cover `[viewpoint_x - behind, viewpoint_x + ahead]`
    pub fn update<W: PhysicsWorld + ?Sized>(&mut self, viewpoint_x: f32, world: &mut W) {
        let left_bound = viewpoint_x - self.params.behind_margin;
        let right_bound = viewpoint_x + self.params.ahead_margin;

        while let Some(front) = self.window.front() {
            if front.right() >= left_bound {
                break;
            }
            if let Some(mut segment) = self.window.pop_front() {
                log::debug!("Retiring terrain segment {}", segment.index);
                segment.release(world);
            }
        }

        while self.next_index < self.segment_count() {
            let i = self.next_index;
            let a = self.extremums[i];
            let b = self.extremums[i + 1];
            if a.x > right_bound {
                break;
            }
            self.next_index += 1;
            if b.x < left_bound {
                // Already behind the viewpoint; never materialize it
                continue;
            }
            let mut segment = CurveSegment::build(i, a, b, self.params.segment_width);
            segment.register(world);
            log::debug!(
                "Materialized terrain segment {} ({} edges)",
                i,
                segment.edges.len()
            );
            self.window.push_back(segment);
        }
    }

    /// First windowed surface point with x in `[x, x + epsilon)`
    pub fn nearest_surface_point(&self, x: f32) -> Option<Vec2> {
        let epsilon = self.params.surface_epsilon;
        self.window
            .iter()
            .filter(|s| s.right() >= x && s.left() < x + epsilon)
            .flat_map(|s| s.points.iter())
            .find(|p| p.x >= x && p.x < x + epsilon)
            .copied()
    }

    /// Landing target on success: a fixed offset before the end of the pad
    pub fn finish_point(&self) -> Vec2 {
        self.extremums
            .last()
            .map(|last| Vec2::new(last.x - self.params.finish_offset, last.y))
            .unwrap_or(Vec2::ZERO)
    }

    /// Scored distance: the x of the last extremum before the landing pad
    pub fn distance_to_finish(&self) -> f32 {
        let n = self.extremums.len();
        if n >= 2 {
            self.extremums[n - 2].x
        } else {
            self.extremums.first().map(|p| p.x).unwrap_or(0.0)
        }
    }

    /// Indices of the live segments, in order
    pub fn window_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.window.iter().map(|s| s.index)
    }

    pub fn segments(&self) -> impl Iterator<Item = &CurveSegment> {
        self.window.iter()
    }

    /// Concatenated polyline of the live window, for drawing
    pub fn visible_polyline(&self) -> Vec<Vec2> {
        let mut out: Vec<Vec2> = Vec::new();
        for segment in &self.window {
            let skip = usize::from(out.last() == segment.points.first());
            out.extend(segment.points.iter().skip(skip));
        }
        out
    }

    /// Remove every live edge from the world (run teardown)
    pub fn clear<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        for mut segment in self.window.drain(..) {
            segment.release(world);
        }
    }
}
