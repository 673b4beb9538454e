pub mod arena;
pub mod circle;

pub use arena::{PolyHandle, PolyVertex, VertexArena, MAX_VERTICES};
pub use circle::Circle;

use crate::math::rot::Rot2;
use crate::math::vec2::Vec2;

/// The geometric shape of a rigid body. Polygons hold only a handle into
/// the shared [`VertexArena`], never a private vertex copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(PolyHandle),
}

impl Shape {
    pub fn area(&self, arena: &VertexArena) -> f64 {
        match self {
            Shape::Circle(circle) => circle.area(),
            Shape::Polygon(handle) => arena.area(*handle),
        }
    }
}

/// The farthest vertex of a rotated polygon along `dir`, in the body's
/// rotated (but untranslated) frame. The support function for GJK/EPA.
pub fn farthest_vertex(arena: &VertexArena, handle: PolyHandle, rot: Rot2, dir: Vec2) -> Vec2 {
    let mut best = Vec2::ZERO;
    let mut best_dot = f64::NEG_INFINITY;
    for i in 0..handle.count() {
        let v = rot.apply(arena.vertex(handle, i).position);
        let d = v.dot(dir);
        if d > best_dot {
            best_dot = d;
            best = v;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_shape_area_dispatch() {
        let mut arena = VertexArena::new();
        let circle = Shape::Circle(Circle::new(1.0));
        assert!((circle.area(&arena) - PI).abs() < 1e-12);

        let handle = arena
            .create_poly(&[
                Vec2::new(0.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(2.0, 1.0),
                Vec2::new(0.0, 1.0),
            ])
            .unwrap();
        let poly = Shape::Polygon(handle);
        assert!((poly.area(&arena) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_farthest_vertex() {
        let mut arena = VertexArena::new();
        let handle = arena
            .create_poly(&[
                Vec2::new(-1.0, -1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(-1.0, 1.0),
            ])
            .unwrap();

        let v = farthest_vertex(&arena, handle, Rot2::IDENTITY, Vec2::new(1.0, 0.5));
        assert_eq!(v, Vec2::new(1.0, 1.0));

        // A quarter turn moves the supporting vertex with the shape.
        let v = farthest_vertex(
            &arena,
            handle,
            Rot2::from_angle(PI / 4.0),
            Vec2::new(1.0, 0.0),
        );
        assert!((v.x - 2.0f64.sqrt()).abs() < 1e-12);
        assert!(v.y.abs() < 1e-12);
    }
}
