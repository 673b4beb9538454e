pub mod rot;
pub mod vec2;

pub use rot::Rot2;
pub use vec2::{triple_product, Vec2};
