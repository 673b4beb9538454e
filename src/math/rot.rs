use super::vec2::Vec2;

/// An orientation stored as a unit complex number (`cos`, `sin`) rather
/// than an accumulated angle, so that repeated incremental rotation does
/// not drift through trigonometric round trips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rot2 {
    pub sin: f64,
    pub cos: f64,
}

impl Rot2 {
    pub const IDENTITY: Rot2 = Rot2 { sin: 0.0, cos: 1.0 };

    pub fn from_angle(angle: f64) -> Self {
        Self {
            sin: angle.sin(),
            cos: angle.cos(),
        }
    }

    /// The represented angle in radians, in `[-PI, PI]`.
    pub fn angle(self) -> f64 {
        self.sin.atan2(self.cos)
    }

    /// This orientation advanced by `delta` radians, composed as a complex
    /// product with `(cos delta, sin delta)`.
    pub fn rotated_by(self, delta: f64) -> Self {
        let (ds, dc) = delta.sin_cos();
        Self {
            sin: self.sin * dc + self.cos * ds,
            cos: self.cos * dc - self.sin * ds,
        }
    }

    /// The inverse orientation (conjugate).
    pub fn inverse(self) -> Self {
        Self {
            sin: -self.sin,
            cos: self.cos,
        }
    }

    /// Rotates a vector by this orientation.
    pub fn apply(self, v: Vec2) -> Vec2 {
        Vec2::new(
            v.x * self.cos - v.y * self.sin,
            v.x * self.sin + v.y * self.cos,
        )
    }

    /// Rotates a vector by the inverse of this orientation.
    pub fn apply_inv(self, v: Vec2) -> Vec2 {
        Vec2::new(
            v.x * self.cos + v.y * self.sin,
            -v.x * self.sin + v.y * self.cos,
        )
    }
}

impl Default for Rot2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}
