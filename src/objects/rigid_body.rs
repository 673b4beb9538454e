use crate::collision::aabb::Aabb;
use crate::common::material::Material;
use crate::math::rot::Rot2;
use crate::math::vec2::Vec2;
use crate::shapes::{Shape, VertexArena};

/// A rigid body resident in the world's pool.
///
/// Invariant: `inv_mass` and `inv_inertia` are exactly 0 if and only if the
/// body is static; density or static-flag changes recompute the mass data.
/// The AABB is a per-step cache, refreshed before broad-phase work.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub(crate) shape: Shape,
    pub(crate) material: Material,
    pub(crate) is_static: bool,

    pub(crate) position: Vec2,
    pub(crate) rotation: Rot2,
    pub(crate) linear_velocity: Vec2,
    pub(crate) angular_velocity: f64,

    // Accumulated once per step, cleared after integration.
    pub(crate) force: Vec2,
    pub(crate) torque: f64,

    pub(crate) mass: f64,
    pub(crate) inv_mass: f64,
    pub(crate) inertia: f64,
    pub(crate) inv_inertia: f64,

    pub(crate) aabb: Aabb,
}

impl RigidBody {
    /// Creates a dynamic body with default material; mass data is derived
    /// from the shape and the material density.
    pub fn new(shape: Shape, arena: &VertexArena) -> Self {
        let mut body = Self {
            shape,
            material: Material::default(),
            is_static: false,
            position: Vec2::ZERO,
            rotation: Rot2::IDENTITY,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            aabb: Aabb::default(),
        };
        body.calculate_mass_data(arena);
        body
    }

    // --- accessors ---

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rotation(&self) -> Rot2 {
        self.rotation
    }

    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f64 {
        self.inv_inertia
    }

    /// The AABB cached by the last [`RigidBody::update_aabb`] call.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    // --- mutators ---

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, angle: f64) {
        self.rotation = Rot2::from_angle(angle);
    }

    /// Flags the body static (infinite mass and inertia, zeroed inverses)
    /// or recomputes its mass data when it becomes dynamic again.
    pub fn set_static(&mut self, flag: bool, arena: &VertexArena) {
        self.is_static = flag;
        if flag {
            self.mass = 0.0;
            self.inv_mass = 0.0;
            self.inertia = 0.0;
            self.inv_inertia = 0.0;
        } else {
            self.calculate_mass_data(arena);
        }
    }

    pub fn set_density(&mut self, density: f64, arena: &VertexArena) {
        self.material.density = density.max(0.0);
        if !self.is_static {
            self.calculate_mass_data(arena);
        }
    }

    pub fn set_restitution(&mut self, restitution: f64) {
        self.material.restitution = restitution.abs().clamp(0.0, 1.0);
    }

    pub fn set_static_friction(&mut self, friction: f64) {
        self.material.static_friction = friction.abs().clamp(0.0, 1.0);
    }

    pub fn set_dynamic_friction(&mut self, friction: f64) {
        self.material.dynamic_friction = friction.abs().clamp(0.0, 1.0);
    }

    /// Accumulates a force applied at `offset` from the center of mass.
    /// No-op on static bodies.
    pub fn apply_force(&mut self, force: Vec2, offset: Vec2) {
        if self.is_static {
            return;
        }
        self.force += force;
        self.torque += offset.cross(force);
    }

    /// Applies an impulse at `offset` from the center of mass, changing
    /// linear velocity by exactly `impulse * inv_mass`. No-op on static
    /// bodies.
    pub fn apply_impulse(&mut self, impulse: Vec2, offset: Vec2) {
        if self.is_static {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += offset.cross(impulse) * self.inv_inertia;
    }

    pub(crate) fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Recomputes mass, inertia, and their inverses from the shape and the
    /// material density.
    pub(crate) fn calculate_mass_data(&mut self, arena: &VertexArena) {
        let mass = self.material.density * self.shape.area(arena);
        self.mass = mass;
        self.inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };

        let inertia = match self.shape {
            Shape::Circle(circle) => 0.5 * mass * circle.radius * circle.radius,
            Shape::Polygon(handle) => {
                let n = handle.count();
                let mut sum = 0.0;
                for i in 0..n {
                    let v1 = arena.vertex(handle, i).position;
                    let v2 = arena.vertex(handle, i + 1).position;
                    sum += (v1.length_squared() + v1.dot(v2) + v2.length_squared())
                        * v1.cross(v2);
                }
                // Vertices are centroid-centered at creation, so this is
                // already the moment about the center of mass.
                (sum * self.material.density / 12.0).abs()
            }
        };
        self.inertia = inertia;
        self.inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
    }

    /// Refreshes the cached world-space AABB from the current transform.
    pub(crate) fn update_aabb(&mut self, arena: &VertexArena) {
        self.aabb = match self.shape {
            Shape::Circle(circle) => {
                let r = Vec2::new(circle.radius, circle.radius);
                Aabb::new(self.position - r, self.position + r)
            }
            Shape::Polygon(handle) => {
                let mut min = Vec2::new(f64::MAX, f64::MAX);
                let mut max = Vec2::new(f64::MIN, f64::MIN);
                for i in 0..handle.count() {
                    let v = self.rotation.apply(arena.vertex(handle, i).position);
                    min = min.min(v);
                    max = max.max(v);
                }
                Aabb::new(self.position + min, self.position + max)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Circle;
    use std::f64::consts::PI;
    const EPSILON: f64 = 1e-9;

    fn circle_body(radius: f64) -> (RigidBody, VertexArena) {
        let arena = VertexArena::new();
        let body = RigidBody::new(Shape::Circle(Circle::new(radius)), &arena);
        (body, arena)
    }

    fn square_body(half: f64) -> (RigidBody, VertexArena) {
        let mut arena = VertexArena::new();
        let handle = arena
            .create_poly(&[
                Vec2::new(-half, -half),
                Vec2::new(half, -half),
                Vec2::new(half, half),
                Vec2::new(-half, half),
            ])
            .unwrap();
        let body = RigidBody::new(Shape::Polygon(handle), &arena);
        (body, arena)
    }

    #[test]
    fn test_circle_mass_data() {
        let (body, _) = circle_body(2.0);
        let expected_mass = 4.0 * PI; // density 1
        assert!((body.mass() - expected_mass).abs() < EPSILON);
        assert!((body.inv_mass() - 1.0 / expected_mass).abs() < EPSILON);
        let expected_inertia = 0.5 * expected_mass * 4.0;
        assert!((body.inertia() - expected_inertia).abs() < EPSILON);
        assert!((body.inv_inertia() - 1.0 / expected_inertia).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_mass_data() {
        // Unit square, density 1: mass = 1, inertia = m*(w^2+h^2)/12 = 1/6.
        let (body, _) = square_body(0.5);
        assert!((body.mass() - 1.0).abs() < EPSILON);
        assert!((body.inertia() - 1.0 / 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_density_change_recomputes_mass() {
        let (mut body, arena) = square_body(0.5);
        body.set_density(3.0, &arena);
        assert!((body.mass() - 3.0).abs() < EPSILON);
        assert!((body.inertia() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_static_invariance() {
        let (mut body, arena) = circle_body(1.0);
        body.set_static(true, &arena);
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.inv_inertia(), 0.0);

        let before = body.clone();
        body.apply_force(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0));
        body.apply_impulse(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0));
        assert_eq!(body, before);
    }

    #[test]
    fn test_static_round_trip_restores_mass() {
        let (mut body, arena) = circle_body(1.0);
        let mass = body.mass();
        body.set_static(true, &arena);
        body.set_static(false, &arena);
        assert!((body.mass() - mass).abs() < EPSILON);
        assert!(body.inv_mass() > 0.0);
    }

    #[test]
    fn test_momentum_exactness() {
        let (mut body, _) = circle_body(1.0);
        let impulse = Vec2::new(3.0, -7.0);
        body.apply_impulse(impulse, Vec2::ZERO);
        let expected = impulse * body.inv_mass();
        assert!((body.linear_velocity() - expected).length() < EPSILON);
        assert_eq!(body.angular_velocity(), 0.0);
    }

    #[test]
    fn test_off_center_impulse_spins() {
        let (mut body, _) = circle_body(1.0);
        body.apply_impulse(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
        // r x J = 1 * 1 = +1, scaled by the inverse inertia.
        assert!((body.angular_velocity() - body.inv_inertia()).abs() < EPSILON);
    }

    #[test]
    fn test_circle_aabb() {
        let (mut body, arena) = circle_body(2.0);
        body.set_position(Vec2::new(10.0, -3.0));
        body.update_aabb(&arena);
        assert_eq!(body.aabb().min, Vec2::new(8.0, -5.0));
        assert_eq!(body.aabb().max, Vec2::new(12.0, -1.0));
    }

    #[test]
    fn test_rotated_polygon_aabb() {
        let (mut body, arena) = square_body(1.0);
        body.set_rotation(PI / 4.0);
        body.update_aabb(&arena);
        // A unit half-extent square rotated 45 degrees spans sqrt(2).
        let d = 2.0f64.sqrt();
        assert!((body.aabb().min.x + d).abs() < EPSILON);
        assert!((body.aabb().max.x - d).abs() < EPSILON);
        assert!((body.aabb().min.y + d).abs() < EPSILON);
        assert!((body.aabb().max.y - d).abs() < EPSILON);
    }

    #[test]
    fn test_clear_accumulators() {
        let (mut body, _) = circle_body(1.0);
        body.apply_force(Vec2::new(1.0, 2.0), Vec2::new(0.5, 0.0));
        body.clear_accumulators();
        assert_eq!(body.force, Vec2::ZERO);
        assert_eq!(body.torque, 0.0);
    }
}
