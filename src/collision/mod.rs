pub mod aabb;
pub mod buffer;
pub mod detection;
pub mod manifold;
pub mod resolver;

// Re-export key types
pub use aabb::Aabb;
pub use buffer::{CollisionBuffer, MAX_RAW_CANDIDATES};
pub use manifold::{BodyPair, ContactManifold};
