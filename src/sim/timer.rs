//! Tick-driven deferrals
//!
//! Nothing in the simulation waits on wall-clock time. Delayed one-shot
//! actions sit in a [`DelayQueue`] and timed motions are [`TimedTransition`]s;
//! both only advance when the loop ticks them, so pausing the loop freezes them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::lerp;

/// One-shot actions fired after a delay, in schedule order for equal deadlines
#[derive(Debug, Clone)]
pub struct DelayQueue<T> {
    entries: Vec<(f32, u64, T)>,
    seq: u64,
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            seq: 0,
        }
    }
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `action` once `delay` seconds of ticks have elapsed
    pub fn schedule(&mut self, delay: f32, action: T) {
        self.entries.push((delay.max(0.0), self.seq, action));
        self.seq += 1;
    }

    /// Advance by `dt` and return every action whose delay ran out
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        for entry in &mut self.entries {
            entry.0 -= dt;
        }
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|(remaining, _, _)| *remaining <= 1e-6);
        self.entries = pending;
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, action)| action).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Easing curve for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    QuadraticIn,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticIn => t * t,
        }
    }
}

/// Cancellable timed move of a position and heading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedTransition {
    pub from: Vec2,
    pub to: Vec2,
    pub from_angle: f32,
    pub to_angle: f32,
    pub duration: f32,
    pub easing: Easing,
    elapsed: f32,
    cancelled: bool,
}

impl TimedTransition {
    pub fn new(from: Vec2, to: Vec2, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            from_angle: 0.0,
            to_angle: 0.0,
            duration: duration.max(0.0),
            easing,
            elapsed: 0.0,
            cancelled: false,
        }
    }

    /// Also ease the heading from `from` to `to`
    pub fn with_angle(mut self, from: f32, to: f32) -> Self {
        self.from_angle = from;
        self.to_angle = to;
        self
    }

    /// Advance by `dt`; returns true on the tick the transition completes
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.cancelled || self.is_complete() {
            return false;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_complete()
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn position(&self) -> Vec2 {
        if self.is_complete() {
            return self.to;
        }
        lerp(self.from, self.to, self.easing.apply(self.progress()))
    }

    /// Heading eases linearly regardless of the position curve
    pub fn angle(&self) -> f32 {
        if self.is_complete() {
            return self.to_angle;
        }
        self.from_angle + (self.to_angle - self.from_angle) * self.progress()
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
