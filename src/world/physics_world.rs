use crate::broadphase::{BroadPhase, BroadPhaseError, NaiveScan};
use crate::collision::buffer::CollisionBuffer;
use crate::collision::detection;
use crate::collision::manifold::ContactManifold;
use crate::collision::resolver;
use crate::integration::integrator;
use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;
use crate::shapes::{Circle, Shape, VertexArena};

/// Capacity of the body pool; registrations past it return `None`.
pub const MAX_BODIES: usize = 2000;

/// Per-step pipeline counters, returned by [`PhysicsWorld::step`] so
/// callers can compare broad-phase strategies without the engine reaching
/// into any global instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Candidates reported by the broad phase (duplicates included).
    pub raw_candidates: usize,
    /// Candidates dropped because the raw buffer was full.
    pub dropped_candidates: usize,
    /// Unique pairs after deduplication.
    pub unique_candidates: usize,
    /// Manifolds confirmed by the narrow phase.
    pub contacts: usize,
}

/// The simulation world: a fixed-capacity body pool, the shared polygon
/// vertex arena, the candidate buffer, gravity, and a pluggable
/// broad-phase strategy.
pub struct PhysicsWorld {
    bodies: Vec<RigidBody>,
    arena: VertexArena,
    candidates: CollisionBuffer,
    contacts: Vec<ContactManifold>,
    broad_phase: Box<dyn BroadPhase>,
    gravity: Vec2,
}

impl PhysicsWorld {
    /// An empty world with zero gravity and the naive broad phase.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            arena: VertexArena::new(),
            candidates: CollisionBuffer::new(),
            contacts: Vec::new(),
            broad_phase: Box::new(NaiveScan::new()),
            gravity: Vec2::ZERO,
        }
    }

    pub fn with_broad_phase(broad_phase: Box<dyn BroadPhase>) -> Self {
        let mut world = Self::new();
        world.broad_phase = broad_phase;
        world
    }

    pub fn set_broad_phase(&mut self, broad_phase: Box<dyn BroadPhase>) {
        self.broad_phase = broad_phase;
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&RigidBody> {
        self.bodies.get(index)
    }

    pub fn body_mut(&mut self, index: usize) -> Option<&mut RigidBody> {
        self.bodies.get_mut(index)
    }

    pub fn arena(&self) -> &VertexArena {
        &self.arena
    }

    /// Registers a circle body at `(x, y)`. `None` once the pool is full.
    pub fn register_circle(&mut self, x: f64, y: f64, radius: f64) -> Option<usize> {
        if self.bodies.len() >= MAX_BODIES {
            log::debug!("body pool full ({} bodies)", self.bodies.len());
            return None;
        }
        let mut body = RigidBody::new(Shape::Circle(Circle::new(radius)), &self.arena);
        body.set_position(Vec2::new(x, y));
        let index = self.bodies.len();
        self.bodies.push(body);
        Some(index)
    }

    /// Registers a convex polygon body at `(x, y)`. `None` when the pool
    /// is full, the vertex arena is exhausted, or the polygon is
    /// degenerate.
    pub fn register_poly(&mut self, x: f64, y: f64, vertices: &[Vec2]) -> Option<usize> {
        if self.bodies.len() >= MAX_BODIES {
            log::debug!("body pool full ({} bodies)", self.bodies.len());
            return None;
        }
        let handle = self.arena.create_poly(vertices)?;
        let mut body = RigidBody::new(Shape::Polygon(handle), &self.arena);
        body.set_position(Vec2::new(x, y));
        let index = self.bodies.len();
        self.bodies.push(body);
        Some(index)
    }

    /// Registers an axis-aligned `w` by `h` rectangle centered at `(x, y)`.
    pub fn register_rectangle(&mut self, x: f64, y: f64, w: f64, h: f64) -> Option<usize> {
        let hw = w / 2.0;
        let hh = h / 2.0;
        self.register_poly(
            x,
            y,
            &[
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
        )
    }

    /// Registers a square box of side `a` centered at `(x, y)`.
    pub fn register_box(&mut self, x: f64, y: f64, a: f64) -> Option<usize> {
        self.register_rectangle(x, y, a, a)
    }

    /// Flags a body static or dynamic, recomputing its mass data.
    pub fn set_static(&mut self, index: usize, flag: bool) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.set_static(flag, &self.arena);
        }
    }

    /// Sets a body's density and recomputes its mass data.
    pub fn set_density(&mut self, index: usize, density: f64) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.set_density(density, &self.arena);
        }
    }

    /// Destroys every body and polygon at once, resetting all pools. There
    /// is no per-body destruction; the pool only resets wholesale.
    pub fn destroy_all(&mut self) {
        self.bodies.clear();
        self.arena.destroy_all();
        self.candidates.reset();
        self.contacts.clear();
    }

    /// Advances the simulation by `dt`: AABB refresh, broad phase,
    /// deduplication, narrow phase, impulse and positional resolution,
    /// integration. Fails only on broad-phase table saturation.
    pub fn step(&mut self, dt: f64) -> Result<StepStats, BroadPhaseError> {
        if dt <= 0.0 {
            return Ok(StepStats::default());
        }

        for body in &mut self.bodies {
            body.update_aabb(&self.arena);
        }

        self.candidates.reset();
        self.broad_phase.ingest(&self.bodies)?;
        self.broad_phase.solve(&self.bodies, &mut self.candidates);
        self.broad_phase.clear();
        self.candidates.deduplicate();

        self.contacts.clear();
        for pair in self.candidates.unique_pairs() {
            if self.bodies[pair.a].is_static() && self.bodies[pair.b].is_static() {
                continue;
            }
            if let Some(manifold) = detection::check_collision(&self.bodies, &self.arena, pair) {
                self.contacts.push(manifold);
            }
        }

        resolver::resolve_all(&mut self.bodies, &self.contacts);

        for body in &mut self.bodies {
            integrator::integrate(body, self.gravity, dt);
        }

        let stats = StepStats {
            raw_candidates: self.candidates.raw_count(),
            dropped_candidates: self.candidates.dropped(),
            unique_candidates: self.candidates.unique_count(),
            contacts: self.contacts.len(),
        };
        log::trace!(
            "step: {} raw / {} unique candidates, {} contacts",
            stats.raw_candidates,
            stats.unique_candidates,
            stats.contacts
        );
        Ok(stats)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
