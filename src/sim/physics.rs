//! Rigid-body world seam
//!
//! The simulation drives a 2D physics world through [`PhysicsWorld`]. Any
//! solver that offers static edges, a dynamic circle, forces/impulses, and a
//! per-body contact flag can sit behind it. [`BasicWorld`] is a small built-in
//! solver (gravity, circle vs. edge contact with restitution and friction) so
//! the core runs headless.

use std::collections::BTreeMap;

use glam::Vec2;

/// Handle to a static collision edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

/// Handle to a dynamic body
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u32);

/// Capabilities the simulation needs from a physics engine
pub trait PhysicsWorld {
    /// Register a static edge from `a` to `b`
    fn add_edge(&mut self, a: Vec2, b: Vec2) -> EdgeId;
    /// Remove a static edge; returns false if it did not exist
    fn remove_edge(&mut self, id: EdgeId) -> bool;
    fn edge_count(&self) -> usize;
    fn has_edge(&self, id: EdgeId) -> bool;

    /// Create a dynamic circle with fixed rotation
    fn create_circle(&mut self, pos: Vec2, radius: f32) -> BodyId;
    fn remove_body(&mut self, id: BodyId) -> bool;

    /// Continuous force for the next step
    fn apply_force(&mut self, id: BodyId, force: Vec2);
    /// Instantaneous velocity change
    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2);

    fn position(&self, id: BodyId) -> Vec2;
    fn set_position(&mut self, id: BodyId, pos: Vec2);
    fn velocity(&self, id: BodyId) -> Vec2;
    fn set_velocity(&mut self, id: BodyId, vel: Vec2);

    /// Whether the body touched static geometry during the last step
    fn in_contact(&self, id: BodyId) -> bool;

    /// Advance the world; a paused world ignores this
    fn step(&mut self, dt: f32);
    fn pause(&mut self);
    fn resume(&mut self);
    fn is_paused(&self) -> bool;
}

/// Static line segment
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub a: Vec2,
    pub b: Vec2,
}

impl Edge {
    /// Closest point on the segment to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let ab = self.b - self.a;
        let len_sq = ab.length_squared();
        if len_sq <= f32::EPSILON {
            return self.a;
        }
        let t = ((p - self.a).dot(ab) / len_sq).clamp(0.0, 1.0);
        self.a + ab * t
    }
}

/// Dynamic circle
#[derive(Debug, Clone)]
pub struct CircleBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    force: Vec2,
    contact: bool,
}

/// Result of a circle vs. edge check
#[derive(Debug, Clone)]
pub struct ContactResult {
    pub hit: bool,
    /// Surface normal pointing toward the circle center
    pub normal: Vec2,
    pub penetration: f32,
}

impl ContactResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against an edge, within `skin` extra distance
pub fn circle_edge_contact(center: Vec2, radius: f32, edge: &Edge, skin: f32) -> ContactResult {
    let closest = edge.closest_point(center);
    let delta = center - closest;
    let dist = delta.length();
    if dist >= radius + skin {
        return ContactResult::miss();
    }
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        // Center on the edge: push along the edge's upward normal
        let d = (edge.b - edge.a).normalize_or_zero();
        let n = Vec2::new(d.y, -d.x);
        if n.y > 0.0 { -n } else { n }
    };
    ContactResult {
        hit: true,
        normal,
        penetration: radius - dist,
    }
}

/// Minimal solver used headless and in tests
#[derive(Debug, Clone)]
pub struct BasicWorld {
    pub gravity: Vec2,
    /// Fraction of normal speed kept on bounce
    pub restitution: f32,
    /// Fraction of tangential speed lost per contact step
    pub friction: f32,
    /// Contact is reported within this distance of the surface
    pub contact_skin: f32,
    edges: BTreeMap<EdgeId, Edge>,
    bodies: BTreeMap<BodyId, CircleBody>,
    next_id: u32,
    paused: bool,
}

impl BasicWorld {
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity: Vec2::new(0.0, gravity),
            restitution: 0.08,
            friction: 0.05,
            contact_skin: 1.0,
            edges: BTreeMap::new(),
            bodies: BTreeMap::new(),
            next_id: 1,
            paused: false,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeId, &Edge)> {
        self.edges.iter()
    }

    pub fn body(&self, id: BodyId) -> Option<&CircleBody> {
        self.bodies.get(&id)
    }

    fn resolve_contacts(&mut self, body_id: BodyId) {
        let Some(body) = self.bodies.get_mut(&body_id) else {
            return;
        };
        body.contact = false;

        // Nearby edges only; edges are short so a coarse x filter is enough
        let reach = body.radius + self.contact_skin;
        for edge in self.edges.values() {
            if edge.a.x.max(edge.b.x) < body.pos.x - reach
                || edge.a.x.min(edge.b.x) > body.pos.x + reach
            {
                continue;
            }
            let result = circle_edge_contact(body.pos, body.radius, edge, self.contact_skin);
            if !result.hit {
                continue;
            }
            body.contact = true;
            if result.penetration > 0.0 {
                body.pos += result.normal * result.penetration;
            }
            let vn = body.vel.dot(result.normal);
            if vn < 0.0 {
                let normal_vel = result.normal * vn;
                let tangent_vel = body.vel - normal_vel;
                body.vel = tangent_vel * (1.0 - self.friction) - normal_vel * self.restitution;
            }
        }
    }
}

impl PhysicsWorld for BasicWorld {
    fn add_edge(&mut self, a: Vec2, b: Vec2) -> EdgeId {
        let id = EdgeId(self.alloc_id());
        self.edges.insert(id, Edge { a, b });
        id
    }

    fn remove_edge(&mut self, id: EdgeId) -> bool {
        self.edges.remove(&id).is_some()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn has_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    fn create_circle(&mut self, pos: Vec2, radius: f32) -> BodyId {
        let id = BodyId(self.alloc_id());
        self.bodies.insert(
            id,
            CircleBody {
                pos,
                vel: Vec2::ZERO,
                radius,
                force: Vec2::ZERO,
                contact: false,
            },
        );
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn apply_force(&mut self, id: BodyId, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.force += force;
        }
    }

    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.vel += impulse;
        }
    }

    fn position(&self, id: BodyId) -> Vec2 {
        self.bodies.get(&id).map(|b| b.pos).unwrap_or(Vec2::NAN)
    }

    fn set_position(&mut self, id: BodyId, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
        }
    }

    fn velocity(&self, id: BodyId) -> Vec2 {
        self.bodies.get(&id).map(|b| b.vel).unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(&mut self, id: BodyId, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.vel = vel;
        }
    }

    fn in_contact(&self, id: BodyId) -> bool {
        self.bodies.get(&id).is_some_and(|b| b.contact)
    }

    fn step(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        let ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        for id in ids {
            if let Some(body) = self.bodies.get_mut(&id) {
                // Unit mass: force is acceleration
                body.vel += (self.gravity + body.force) * dt;
                body.pos += body.vel * dt;
                body.force = Vec2::ZERO;
            }
            self.resolve_contacts(id);
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
