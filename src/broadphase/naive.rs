use super::{BroadPhase, BroadPhaseError};
use crate::collision::buffer::CollisionBuffer;
use crate::objects::rigid_body::RigidBody;

/// The O(n^2) pairwise scan: every unique pair is AABB-tested directly.
/// Stateless; serves as the correctness baseline for the other strategies.
#[derive(Debug, Default)]
pub struct NaiveScan;

impl NaiveScan {
    pub fn new() -> Self {
        Self
    }
}

impl BroadPhase for NaiveScan {
    fn ingest(&mut self, _bodies: &[RigidBody]) -> Result<(), BroadPhaseError> {
        Ok(())
    }

    fn solve(&mut self, bodies: &[RigidBody], candidates: &mut CollisionBuffer) {
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                if bodies[i].aabb().intersects(&bodies[j].aabb()) {
                    candidates.append(i, j);
                }
            }
        }
    }

    fn clear(&mut self) {}
}
