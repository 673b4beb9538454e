//! A 2D rigid-body collision pipeline: pluggable broad-phase spatial
//! indexes, a deduplicating candidate buffer, exact narrow-phase tests
//! (GJK/EPA for polygon pairs), and single-pass sequential-impulse
//! resolution with positional correction.

pub mod broadphase;
pub mod collision;
pub mod common;
pub mod integration;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod world;

// Re-export key types for easier use
pub use broadphase::{
    BroadPhase, BroadPhaseError, ClosedHashGrid, DenseGrid, HierarchicalGrid, NaiveScan,
    OpenHashGrid, QuadTree,
};
pub use collision::{Aabb, BodyPair, CollisionBuffer, ContactManifold};
pub use common::Material;
pub use math::{Rot2, Vec2};
pub use objects::RigidBody;
pub use shapes::{Circle, PolyHandle, Shape, VertexArena};
pub use world::{PhysicsWorld, StepStats};
