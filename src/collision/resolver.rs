//! Sequential-impulse contact resolution and positional stabilization.

use super::manifold::ContactManifold;
use crate::objects::rigid_body::RigidBody;

/// Fraction of the residual penetration corrected per step.
const CORRECTION_FACTOR: f64 = 0.1;
/// Penetration below this is tolerated to keep resting contacts calm.
pub const PENETRATION_SLOP: f64 = 0.01;
/// Tangential impulses below this are not worth applying.
const FRICTION_CUTOFF: f64 = 1e-3;

/// Resolves every manifold: one impulse pass over all contacts in manifold
/// order, then one positional-correction pass. No sub-iteration.
pub fn resolve_all(bodies: &mut [RigidBody], manifolds: &[ContactManifold]) {
    for manifold in manifolds {
        let (body_a, body_b) = pair_mut(bodies, manifold);
        apply_impulses(manifold, body_a, body_b);
    }
    for manifold in manifolds {
        let (body_a, body_b) = pair_mut(bodies, manifold);
        correct_positions(manifold, body_a, body_b);
    }
}

/// Splits the pool into disjoint mutable references to the manifold's two
/// bodies. Pairs are canonical (`a < b`), which makes the split valid.
fn pair_mut<'a>(
    bodies: &'a mut [RigidBody],
    manifold: &ContactManifold,
) -> (&'a mut RigidBody, &'a mut RigidBody) {
    let (head, tail) = bodies.split_at_mut(manifold.pair.b);
    (&mut head[manifold.pair.a], &mut tail[0])
}

fn apply_impulses(manifold: &ContactManifold, body_a: &mut RigidBody, body_b: &mut RigidBody) {
    if body_a.is_static() && body_b.is_static() {
        return;
    }

    let normal = manifold.normal;
    let inv_count = 1.0 / manifold.contact_count.max(1) as f64;

    for i in 0..manifold.contact_count {
        let contact = manifold.contacts[i];
        let rad_a = contact - body_a.position();
        let rad_b = contact - body_b.position();

        // Relative velocity at the contact, angular terms included.
        let vel_a = body_a.linear_velocity() + rad_a.cross_scalar(-body_a.angular_velocity());
        let vel_b = body_b.linear_velocity() + rad_b.cross_scalar(-body_b.angular_velocity());
        let relative_vel = vel_b - vel_a;
        let contact_vel = relative_vel.dot(normal);

        // Already separating: abandon the remaining contacts of this
        // manifold as well (single-pass trade-off, kept deliberately).
        if contact_vel > 0.0 {
            return;
        }

        let ra_cross_n = rad_a.cross(normal);
        let rb_cross_n = rad_b.cross(normal);
        let inv_mass_sum = body_a.inv_mass()
            + body_b.inv_mass()
            + ra_cross_n * ra_cross_n * body_a.inv_inertia()
            + rb_cross_n * rb_cross_n * body_b.inv_inertia();

        let j = -(1.0 + manifold.restitution) * contact_vel / inv_mass_sum * inv_count;
        let impulse = normal * j;
        body_a.apply_impulse(-impulse, rad_a);
        body_b.apply_impulse(impulse, rad_b);

        // Coulomb friction approximated with one tangential impulse per
        // contact: static clamp when the required impulse is small, else
        // the dynamic coefficient scaled by the normal impulse.
        let tangent = (relative_vel - normal * contact_vel).normalized();
        let jt = relative_vel.dot(tangent) / inv_mass_sum * inv_count;
        if jt.abs() < FRICTION_CUTOFF {
            continue;
        }

        let tangent_impulse = if jt.abs() < (j * manifold.static_friction).abs() {
            tangent * -jt
        } else {
            tangent * -j * manifold.dynamic_friction
        };
        body_a.apply_impulse(-tangent_impulse, rad_a);
        body_b.apply_impulse(tangent_impulse, rad_b);
    }
}

fn correct_positions(manifold: &ContactManifold, body_a: &mut RigidBody, body_b: &mut RigidBody) {
    if body_a.is_static() && body_b.is_static() {
        return;
    }

    let total_inv_mass = body_a.inv_mass() + body_b.inv_mass();
    let coeff = (manifold.penetration - PENETRATION_SLOP).max(0.0) / total_inv_mass;
    if coeff == 0.0 {
        return;
    }

    // Applied straight to position, split by inverse-mass ratio.
    let correction = -manifold.normal * coeff * CORRECTION_FACTOR;
    if !body_a.is_static() {
        let pos = body_a.position() + correction * body_a.inv_mass();
        body_a.set_position(pos);
    }
    if !body_b.is_static() {
        let pos = body_b.position() - correction * body_b.inv_mass();
        body_b.set_position(pos);
    }
}
