//! Narrow-phase intersection tests and contact-manifold generation.
//!
//! Dispatch is an exhaustive match on the pair's shape kinds: circles
//! against circles by distance, circles against polygons by face/Voronoi
//! regions in the polygon's local frame, and polygon pairs through
//! GJK (overlap), EPA (normal and penetration), and reference/incident
//! edge clipping (contact points).

use super::manifold::{BodyPair, ContactManifold};
use crate::math::rot::Rot2;
use crate::math::vec2::{triple_product, Vec2};
use crate::objects::rigid_body::RigidBody;
use crate::shapes::{farthest_vertex, Circle, PolyHandle, Shape, VertexArena};

/// Face separations below this count as "circle center inside polygon".
const CENTER_INSIDE_EPSILON: f64 = 1e-4;
/// EPA terminates once the support projection is this close to the current
/// closest-edge distance.
const EPA_TOLERANCE: f64 = 1e-3;
// Iteration bounds so degenerate geometry exits instead of spinning.
const MAX_GJK_ITERATIONS: usize = 64;
const MAX_EPA_ITERATIONS: usize = 64;

/// Computes the exact contact manifold for a candidate pair, or `None` if
/// the shapes do not actually intersect. The manifold normal points from
/// `pair.a` toward `pair.b`.
pub fn check_collision(
    bodies: &[RigidBody],
    arena: &VertexArena,
    pair: BodyPair,
) -> Option<ContactManifold> {
    let body_a = &bodies[pair.a];
    let body_b = &bodies[pair.b];
    match (*body_a.shape(), *body_b.shape()) {
        (Shape::Circle(ca), Shape::Circle(cb)) => {
            check_circle_circle(body_a, ca, body_b, cb, pair)
        }
        (Shape::Circle(ca), Shape::Polygon(pb)) => {
            let (normal, contact, penetration) =
                circle_vs_polygon(body_a, ca, body_b, pb, arena)?;
            let mut manifold = ContactManifold::new(pair, body_a, body_b);
            manifold.normal = normal;
            manifold.penetration = penetration;
            manifold.push_contact(contact);
            Some(manifold)
        }
        (Shape::Polygon(pa), Shape::Circle(cb)) => {
            // Mirror of the circle-polygon call; the normal flips so it
            // still points from `pair.a` (the polygon) toward `pair.b`.
            let (normal, contact, penetration) =
                circle_vs_polygon(body_b, cb, body_a, pa, arena)?;
            let mut manifold = ContactManifold::new(pair, body_a, body_b);
            manifold.normal = -normal;
            manifold.penetration = penetration;
            manifold.push_contact(contact);
            Some(manifold)
        }
        (Shape::Polygon(pa), Shape::Polygon(pb)) => {
            check_polygon_polygon(body_a, pa, body_b, pb, arena, pair)
        }
    }
}

fn check_circle_circle(
    body_a: &RigidBody,
    circle_a: Circle,
    body_b: &RigidBody,
    circle_b: Circle,
    pair: BodyPair,
) -> Option<ContactManifold> {
    let offset = body_b.position() - body_a.position();
    let dist_sq = offset.length_squared();
    let rad_sum = circle_a.radius + circle_b.radius;
    if dist_sq > rad_sum * rad_sum {
        return None;
    }

    let mut manifold = ContactManifold::new(pair, body_a, body_b);
    let distance = dist_sq.sqrt();
    if distance == 0.0 {
        // Coincident centers: fall back to a fixed axis.
        manifold.penetration = circle_a.radius;
        manifold.normal = Vec2::new(1.0, 0.0);
        manifold.push_contact(body_a.position());
    } else {
        manifold.penetration = rad_sum - distance;
        manifold.normal = offset / distance;
        manifold.push_contact(manifold.normal * circle_a.radius + body_a.position());
    }
    Some(manifold)
}

/// Circle against polygon in the polygon's local frame. Returns
/// `(normal, contact, penetration)` with the normal pointing from the
/// circle toward the polygon, in world space.
fn circle_vs_polygon(
    circle_body: &RigidBody,
    circle: Circle,
    poly_body: &RigidBody,
    handle: PolyHandle,
    arena: &VertexArena,
) -> Option<(Vec2, Vec2, f64)> {
    let radius = circle.radius;
    let rot = poly_body.rotation();
    let center = rot.apply_inv(circle_body.position() - poly_body.position());

    // Face of maximum signed separation along its outward normal.
    let mut separation = f64::NEG_INFINITY;
    let mut face = 0;
    for i in 0..handle.count() {
        let vertex = arena.vertex(handle, i);
        let s = vertex.normal.dot(center - vertex.position);
        if s > radius {
            return None;
        }
        if s > separation {
            separation = s;
            face = i;
        }
    }

    let face_normal = arena.vertex(handle, face).normal;
    let v1 = arena.vertex(handle, face).position;
    let v2 = arena.vertex(handle, face + 1).position;

    if separation < CENTER_INSIDE_EPSILON {
        // Center inside the polygon: push out along the nearest face.
        let normal = -rot.apply(face_normal);
        let contact = normal * radius + circle_body.position();
        return Some((normal, contact, radius));
    }

    let penetration = radius - separation;
    let d1 = (center - v1).dot(v2 - v1);
    let d2 = (center - v2).dot(v1 - v2);

    if d1 <= 0.0 {
        // Voronoi region of the face's first vertex.
        if (center - v1).length_squared() > radius * radius {
            return None;
        }
        let normal = rot.apply(v1 - center).normalized();
        let contact = rot.apply(v1) + poly_body.position();
        Some((normal, contact, penetration))
    } else if d2 <= 0.0 {
        // Voronoi region of the face's second vertex.
        if (center - v2).length_squared() > radius * radius {
            return None;
        }
        let normal = rot.apply(v2 - center).normalized();
        let contact = rot.apply(v2) + poly_body.position();
        Some((normal, contact, penetration))
    } else {
        // Between the two vertices: face normal region.
        if (center - v1).dot(face_normal) > radius {
            return None;
        }
        let normal = -rot.apply(face_normal);
        let contact = normal * radius + circle_body.position();
        Some((normal, contact, penetration))
    }
}

/// A support point on the Minkowski difference `A - B` along `dir`.
fn support_point(
    arena: &VertexArena,
    body_a: &RigidBody,
    handle_a: PolyHandle,
    body_b: &RigidBody,
    handle_b: PolyHandle,
    dir: Vec2,
) -> Vec2 {
    let p1 = farthest_vertex(arena, handle_a, body_a.rotation(), dir) + body_a.position();
    let p2 = farthest_vertex(arena, handle_b, body_b.rotation(), -dir) + body_b.position();
    p1 - p2
}

/// One GJK simplex update. Returns `true` once the simplex encloses the
/// origin; otherwise shrinks the simplex toward the origin and redirects
/// the search direction.
fn simplex_contains_origin(simplex: &mut Vec<Vec2>, dir: &mut Vec2) -> bool {
    if simplex.len() < 2 {
        return false;
    }
    let a = simplex[simplex.len() - 1];
    let ao = -a;

    if simplex.len() == 3 {
        let b = simplex[1];
        let c = simplex[0];
        let ab = b - a;
        let ac = c - a;
        let ab_perp = triple_product(ac, ab, ab);
        let ac_perp = triple_product(ab, ac, ac);
        if ab_perp.dot(ao) >= 0.0 {
            simplex.remove(0);
            *dir = ab_perp;
        } else if ac_perp.dot(ao) >= 0.0 {
            simplex.remove(1);
            *dir = ac_perp;
        } else {
            return true;
        }
    } else {
        let b = simplex[0];
        let ab = b - a;
        if ab.dot(ao) >= 0.0 {
            *dir = triple_product(ab, ao, ab);
        } else {
            *dir = ao;
        }
    }
    false
}

/// The polygon edge most anti-parallel to `normal`, rotated into world
/// orientation but not translated. Returns the edge endpoints in winding
/// order plus the maximum-projection vertex.
fn most_perpendicular_edge(
    arena: &VertexArena,
    handle: PolyHandle,
    rot: Rot2,
    normal: Vec2,
) -> (Vec2, Vec2, Vec2) {
    let count = handle.count();
    let mut idx = 0;
    let mut max_projection = f64::NEG_INFINITY;
    for i in 0..count {
        let v = rot.apply(arena.vertex(handle, i).position);
        let projection = normal.dot(v);
        if projection > max_projection {
            max_projection = projection;
            idx = i;
        }
    }

    let v = arena.vertex(handle, idx).position;
    let v_next = arena.vertex(handle, idx + 1).position;
    let v_prev = arena.vertex(handle, idx + count - 1).position;

    let left = rot.apply(v - v_next).normalized();
    let right = rot.apply(v - v_prev).normalized();

    let v_max = rot.apply(v);
    if left.dot(normal) >= right.dot(normal) {
        (rot.apply(v_prev), v_max, v_max)
    } else {
        (v_max, rot.apply(v_next), v_max)
    }
}

/// Clips the segment `v1`-`v2` against the half-plane
/// `normal . p >= offset`, keeping at most two points.
fn clip_segment(v1: Vec2, v2: Vec2, normal: Vec2, offset: f64) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(2);
    let d1 = normal.dot(v1) - offset;
    let d2 = normal.dot(v2) - offset;

    if d1 >= 0.0 {
        out.push(v1);
    }
    if d2 >= 0.0 {
        out.push(v2);
    }
    if d1 * d2 < 0.0 {
        let t = d1 / (d1 - d2);
        out.push(v1 + (v2 - v1) * t);
    }
    out
}

fn check_polygon_polygon(
    body_a: &RigidBody,
    handle_a: PolyHandle,
    body_b: &RigidBody,
    handle_b: PolyHandle,
    arena: &VertexArena,
    pair: BodyPair,
) -> Option<ContactManifold> {
    // GJK: grow a simplex on the Minkowski difference until it encloses
    // the origin, or prove separation.
    let mut simplex: Vec<Vec2> = Vec::with_capacity(4);
    let mut dir = Vec2::new(0.0, -1.0);
    let first = support_point(arena, body_a, handle_a, body_b, handle_b, dir);
    simplex.push(first);
    dir = -first;

    let mut enclosed = false;
    for _ in 0..MAX_GJK_ITERATIONS {
        let support = support_point(arena, body_a, handle_a, body_b, handle_b, dir);
        simplex.push(support);
        if support.dot(dir) <= 0.0 {
            // The newest support never passed the origin: separated.
            return None;
        }
        if simplex_contains_origin(&mut simplex, &mut dir) {
            enclosed = true;
            break;
        }
    }
    if !enclosed {
        return None;
    }

    // EPA: expand the simplex along the closest-edge normal until the
    // support projection converges on the edge distance.
    let mut normal = Vec2::ZERO;
    let mut penetration = 0.0;
    for _ in 0..MAX_EPA_ITERATIONS {
        let mut distance = f64::MAX;
        let mut closest = 0;
        let mut edge_normal = Vec2::ZERO;
        for i in 0..simplex.len() {
            let j = (i + 1) % simplex.len();
            let ab = simplex[j] - simplex[i];
            let n = triple_product(ab, simplex[i], ab).normalized();
            let d = n.dot(simplex[i]);
            if d < distance {
                distance = d;
                edge_normal = n;
                closest = j;
            }
        }

        let support = support_point(arena, body_a, handle_a, body_b, handle_b, edge_normal);
        let d = support.dot(edge_normal);
        normal = edge_normal;
        penetration = d;
        if (d - distance).abs() < EPA_TOLERANCE {
            break;
        }
        simplex.insert(closest, support);
    }

    let mut manifold = ContactManifold::new(pair, body_a, body_b);
    manifold.normal = normal;
    manifold.penetration = penetration;

    // Contact clipping, in coordinates relative to body A's position.
    let rel = body_b.position() - body_a.position();
    let (a1, a2, a_max) = most_perpendicular_edge(arena, handle_a, body_a.rotation(), normal);
    let (b1, b2, b_max) = most_perpendicular_edge(arena, handle_b, body_b.rotation(), -normal);
    let (b1, b2, b_max) = (b1 + rel, b2 + rel, b_max + rel);

    let edge_a = a2 - a1;
    let edge_b = b2 - b1;

    // The edge more perpendicular to the normal becomes the reference.
    let (ref_v1, ref_v2, ref_max, inc_v1, inc_v2) =
        if edge_a.dot(normal).abs() <= edge_b.dot(normal).abs() {
            (a1, a2, a_max, b1, b2)
        } else {
            (b1, b2, b_max, a1, a2)
        };
    let ref_dir = (ref_v2 - ref_v1).normalized();

    // Two-sided clip of the incident edge against the reference edge's
    // side planes. A degenerate clip leaves the manifold without contact
    // points; positional correction still separates the pair.
    let clipped = clip_segment(inc_v1, inc_v2, ref_dir, ref_dir.dot(ref_v1));
    if clipped.len() < 2 {
        return Some(manifold);
    }
    let clipped = clip_segment(clipped[0], clipped[1], -ref_dir, -ref_dir.dot(ref_v2));
    if clipped.len() < 2 {
        return Some(manifold);
    }

    // Keep only points on the penetrating side of the reference face.
    let ref_face_normal = ref_dir.perpendicular();
    let face_offset = ref_face_normal.dot(ref_max);
    for point in clipped {
        if ref_face_normal.dot(point) - face_offset >= 0.0 {
            manifold.push_contact(point + body_a.position());
        }
    }
    Some(manifold)
}
