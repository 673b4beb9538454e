use crate::math::vec2::Vec2;

/// Capacity of the shared vertex store. Shared by every polygon in a world;
/// creation fails once it is exhausted.
pub const MAX_VERTICES: usize = 20_100;

/// One polygon vertex: local-space position plus the outward normal of the
/// edge leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolyVertex {
    pub position: Vec2,
    pub normal: Vec2,
}

/// A handle into the shared [`VertexArena`]: first slot plus vertex count.
/// Polygons never own their vertices; they reference a contiguous run in
/// the arena, which fixes the vertex set for the polygon's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyHandle {
    first: u32,
    count: u32,
}

impl PolyHandle {
    pub fn count(&self) -> usize {
        self.count as usize
    }
}

/// Fixed-capacity arena holding every polygon's vertices and precomputed
/// edge normals. Individual polygons cannot be destroyed; the arena resets
/// as a whole (`destroy_all`), matching the body pool lifecycle.
#[derive(Debug)]
pub struct VertexArena {
    vertices: Vec<PolyVertex>,
    tail: usize,
}

impl VertexArena {
    pub fn new() -> Self {
        Self {
            vertices: vec![PolyVertex::default(); MAX_VERTICES],
            tail: 0,
        }
    }

    /// Number of occupied vertex slots.
    pub fn len(&self) -> usize {
        self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.tail == 0
    }

    /// Allocates a polygon from the arena.
    ///
    /// Vertices are stored counter-clockwise (clockwise input is reversed),
    /// re-centered on the polygon's area centroid so a body's position
    /// always coincides with the shape's center of mass, and each vertex
    /// gets the outward normal of its leaving edge.
    ///
    /// Returns `None` when fewer than 3 vertices are given, when the
    /// polygon is degenerate (zero area), or when the arena is full.
    pub fn create_poly(&mut self, vertices: &[Vec2]) -> Option<PolyHandle> {
        let count = vertices.len();
        if count < 3 {
            return None;
        }
        if self.tail + count > MAX_VERTICES {
            log::debug!(
                "vertex arena full: {} slots used, {} requested",
                self.tail,
                count
            );
            return None;
        }

        let signed_area = signed_area(vertices);
        if signed_area.abs() < 1e-10 {
            return None;
        }

        let slots = &mut self.vertices[self.tail..self.tail + count];
        for (slot, &v) in slots.iter_mut().zip(vertices) {
            slot.position = v;
        }
        if signed_area < 0.0 {
            slots.reverse();
        }

        // Re-center on the centroid.
        let mut centroid = Vec2::ZERO;
        for i in 0..count {
            let v1 = slots[i].position;
            let v2 = slots[(i + 1) % count].position;
            centroid += (v1 + v2) * v1.cross(v2);
        }
        centroid = centroid / (6.0 * signed_area.abs());
        for slot in slots.iter_mut() {
            slot.position -= centroid;
        }

        // Outward edge normals, counter-clockwise winding assumed from here.
        for i in 0..count {
            let edge = slots[(i + 1) % count].position - slots[i].position;
            slots[i].normal = Vec2::new(edge.y, -edge.x).normalized();
        }

        let handle = PolyHandle {
            first: self.tail as u32,
            count: count as u32,
        };
        self.tail += count;
        Some(handle)
    }

    /// Vertex accessor with wraparound: index `i` is taken modulo the
    /// polygon's vertex count, so `vertex(h, i + 1)` is always the next
    /// vertex along the winding.
    pub fn vertex(&self, handle: PolyHandle, i: usize) -> &PolyVertex {
        let i = i % handle.count as usize;
        &self.vertices[handle.first as usize + i]
    }

    /// Polygon area by the shoelace formula over the stored vertices.
    pub fn area(&self, handle: PolyHandle) -> f64 {
        let n = handle.count as usize;
        let mut sum = 0.0;
        for i in 0..n {
            let v1 = self.vertex(handle, i).position;
            let v2 = self.vertex(handle, i + 1).position;
            sum += v1.cross(v2);
        }
        (sum / 2.0).abs()
    }

    /// Releases every polygon at once. Outstanding handles become dangling
    /// and must not be used afterwards.
    pub fn destroy_all(&mut self) {
        for slot in &mut self.vertices[..self.tail] {
            *slot = PolyVertex::default();
        }
        self.tail = 0;
    }
}

impl Default for VertexArena {
    fn default() -> Self {
        Self::new()
    }
}

fn signed_area(vertices: &[Vec2]) -> f64 {
    let n = vertices.len();
    let mut sum = 0.0;
    for i in 0..n {
        sum += vertices[i].cross(vertices[(i + 1) % n]);
    }
    sum / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    fn square(offset: Vec2, half: f64) -> Vec<Vec2> {
        vec![
            offset + Vec2::new(-half, -half),
            offset + Vec2::new(half, -half),
            offset + Vec2::new(half, half),
            offset + Vec2::new(-half, half),
        ]
    }

    #[test]
    fn test_create_poly_centers_vertices() {
        let mut arena = VertexArena::new();
        let handle = arena.create_poly(&square(Vec2::new(10.0, -5.0), 1.0)).unwrap();
        assert_eq!(handle.count(), 4);

        // The offset square must come out centered on the origin.
        let mut centroid = Vec2::ZERO;
        for i in 0..4 {
            centroid += arena.vertex(handle, i).position;
        }
        assert!(centroid.length() < EPSILON);
        assert!((arena.area(handle) - 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_normals_point_outward() {
        let mut arena = VertexArena::new();
        let handle = arena.create_poly(&square(Vec2::ZERO, 1.0)).unwrap();
        for i in 0..4 {
            let v = arena.vertex(handle, i);
            // For a centered convex polygon the outward normal must agree
            // with the direction from the centroid to the edge midpoint.
            let mid = (v.position + arena.vertex(handle, i + 1).position) * 0.5;
            assert!(v.normal.dot(mid) > 0.0, "normal {:?} at vertex {}", v.normal, i);
            assert!((v.normal.length() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_clockwise_input_is_reversed() {
        let mut arena = VertexArena::new();
        let mut cw = square(Vec2::ZERO, 1.0);
        cw.reverse();
        let handle = arena.create_poly(&cw).unwrap();
        // Normals must still point outward after the reversal.
        for i in 0..4 {
            let v = arena.vertex(handle, i);
            let mid = (v.position + arena.vertex(handle, i + 1).position) * 0.5;
            assert!(v.normal.dot(mid) > 0.0);
        }
    }

    #[test]
    fn test_wraparound_accessor() {
        let mut arena = VertexArena::new();
        let handle = arena.create_poly(&square(Vec2::ZERO, 1.0)).unwrap();
        assert_eq!(
            arena.vertex(handle, 4).position,
            arena.vertex(handle, 0).position
        );
        assert_eq!(
            arena.vertex(handle, 7).position,
            arena.vertex(handle, 3).position
        );
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let mut arena = VertexArena::new();
        assert!(arena
            .create_poly(&[Vec2::ZERO, Vec2::new(1.0, 0.0)])
            .is_none());
        // Collinear vertices have zero area.
        assert!(arena
            .create_poly(&[Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)])
            .is_none());
    }

    #[test]
    fn test_capacity_exhaustion_is_a_sentinel() {
        let mut arena = VertexArena::new();
        let verts = square(Vec2::ZERO, 1.0);
        let mut created = 0;
        while arena.create_poly(&verts).is_some() {
            created += 1;
        }
        assert_eq!(created, MAX_VERTICES / 4);
        assert!(arena.create_poly(&verts).is_none());

        arena.destroy_all();
        assert!(arena.is_empty());
        assert!(arena.create_poly(&verts).is_some());
    }
}
