//! Physical material properties.

/// Material coefficients of a rigid body. Restitution and the friction
/// coefficients are clamped to `[0, 1]`; density must be positive for a
/// dynamic body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub density: f64,
    /// Bounciness: 0 = perfectly inelastic, 1 = perfectly elastic.
    pub restitution: f64,
    pub static_friction: f64,
    pub dynamic_friction: f64,
}

impl Material {
    pub fn new(density: f64, restitution: f64, static_friction: f64, dynamic_friction: f64) -> Self {
        Self {
            density: density.max(0.0),
            restitution: restitution.abs().clamp(0.0, 1.0),
            static_friction: static_friction.abs().clamp(0.0, 1.0),
            dynamic_friction: dynamic_friction.abs().clamp(0.0, 1.0),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            restitution: 0.5,
            static_friction: 0.3,
            dynamic_friction: 0.2,
        }
    }
}
