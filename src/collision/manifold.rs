use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;

/// An unordered pair of body pool indices, canonicalized so the smaller
/// index comes first. `(a, b)` and `(b, a)` construct the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyPair {
    pub a: usize,
    pub b: usize,
}

impl BodyPair {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

/// Contact geometry and combined material data for one colliding pair,
/// produced by the narrow phase and consumed by the resolver within the
/// same step.
///
/// The normal points from body `pair.a` toward body `pair.b`. Degenerate
/// polygon clipping can leave `contact_count == 0`; such manifolds carry no
/// impulses but still drive positional correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactManifold {
    pub pair: BodyPair,
    pub normal: Vec2,
    pub contacts: [Vec2; 2],
    pub contact_count: usize,
    pub penetration: f64,
    pub restitution: f64,
    pub static_friction: f64,
    pub dynamic_friction: f64,
}

impl ContactManifold {
    /// An empty manifold for `pair` with the combined material response:
    /// the lesser restitution and the geometric mean of each friction
    /// coefficient.
    pub fn new(pair: BodyPair, body_a: &RigidBody, body_b: &RigidBody) -> Self {
        let mat_a = body_a.material();
        let mat_b = body_b.material();
        Self {
            pair,
            normal: Vec2::ZERO,
            contacts: [Vec2::ZERO; 2],
            contact_count: 0,
            penetration: 0.0,
            restitution: mat_a.restitution.min(mat_b.restitution),
            static_friction: (mat_a.static_friction * mat_b.static_friction).sqrt(),
            dynamic_friction: (mat_a.dynamic_friction * mat_b.dynamic_friction).sqrt(),
        }
    }

    pub(crate) fn push_contact(&mut self, point: Vec2) {
        if self.contact_count < self.contacts.len() {
            self.contacts[self.contact_count] = point;
            self.contact_count += 1;
        }
    }
}
