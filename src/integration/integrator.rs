use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;

/// Advances one body by `dt` with a half-kick / drift / half-kick
/// (leapfrog) scheme: half the acceleration before the position update,
/// half after. Gravity enters as an acceleration, so it is mass
/// independent. Accumulated force and torque are cleared afterwards.
pub fn integrate(body: &mut RigidBody, gravity: Vec2, dt: f64) {
    if !body.is_static() {
        half_kick(body, gravity, dt);

        body.position += body.linear_velocity * dt;
        body.rotation = body.rotation.rotated_by(body.angular_velocity * dt);

        half_kick(body, gravity, dt);
    }
    body.clear_accumulators();
}

fn half_kick(body: &mut RigidBody, gravity: Vec2, dt: f64) {
    body.linear_velocity += (body.force * body.inv_mass + gravity) * (dt * 0.5);
    body.angular_velocity += body.torque * body.inv_inertia * (dt * 0.5);
}
