use crate::math::vec2::Vec2;

/// An axis-aligned bounding box stored as minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Creates an AABB, swapping coordinates so `min <= max` holds per axis.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// The tightest AABB around a set of points. `None` for an empty set.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut min = first;
        let mut max = first;
        for &p in rest {
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Half-extents per axis.
    pub fn extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Overlap test, inclusive of touching edges.
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.min.x > other.max.x {
            return false;
        }
        if self.min.y > other.max.y {
            return false;
        }
        if self.max.x < other.min.x {
            return false;
        }
        if self.max.y < other.min.y {
            return false;
        }
        true
    }

    /// Whether `other` lies entirely inside this box (edges included).
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_corners() {
        let b = Aabb::new(Vec2::new(2.0, -1.0), Vec2::new(-2.0, 1.0));
        assert_eq!(b.min, Vec2::new(-2.0, -1.0));
        assert_eq!(b.max, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_from_points() {
        let pts = [
            Vec2::new(1.0, 4.0),
            Vec2::new(-2.0, 0.5),
            Vec2::new(3.0, -1.0),
        ];
        let b = Aabb::from_points(&pts).unwrap();
        assert_eq!(b.min, Vec2::new(-2.0, -1.0));
        assert_eq!(b.max, Vec2::new(3.0, 4.0));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn test_center_extents() {
        let b = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0));
        assert_eq!(b.center(), Vec2::new(2.0, 1.0));
        assert_eq!(b.extents(), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_intersects() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        let b = Aabb::new(Vec2::new(1.0, 1.0), Vec2::new(3.0, 3.0));
        let c = Aabb::new(Vec2::new(2.5, 0.0), Vec2::new(4.0, 2.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));

        // Touching edges count as overlap.
        let touching = Aabb::new(Vec2::new(2.0, 0.0), Vec2::new(4.0, 2.0));
        assert!(a.intersects(&touching));
    }

    #[test]
    fn test_contains() {
        let outer = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let inner = Aabb::new(Vec2::new(2.0, 2.0), Vec2::new(5.0, 5.0));
        let straddling = Aabb::new(Vec2::new(8.0, 8.0), Vec2::new(12.0, 12.0));
        assert!(outer.contains(&inner));
        assert!(!outer.contains(&straddling));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
    }
}
