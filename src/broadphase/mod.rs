//! Broad-phase spatial indexing strategies.
//!
//! Every strategy implements the same contract: ingest the bodies, emit
//! candidate pairs for all AABB overlaps, clear per-frame state. A strategy
//! may over-report (duplicates and false positives are removed downstream
//! by the candidate buffer and the narrow phase) but must never miss a pair
//! whose AABBs truly intersect.

pub mod hierarchical_grid;
pub mod naive;
pub mod quad_tree;
pub mod uniform_grid;

pub use hierarchical_grid::HierarchicalGrid;
pub use naive::NaiveScan;
pub use quad_tree::QuadTree;
pub use uniform_grid::{average_cell_size, ClosedHashGrid, DenseGrid, OpenHashGrid};

use crate::collision::buffer::CollisionBuffer;
use crate::objects::rigid_body::RigidBody;
use thiserror::Error;

/// Loud failures of a broad-phase structure. Unlike the silent capacity
/// sentinels elsewhere, an undersized probing table is a configuration
/// error and is reported instead of looping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BroadPhaseError {
    #[error("closed-hash grid table saturated after {probes} probes (capacity {capacity})")]
    TableSaturated { probes: usize, capacity: usize },
}

/// A pluggable broad-phase strategy.
pub trait BroadPhase {
    /// Maps the bodies (by their cached AABBs) into the index.
    fn ingest(&mut self, bodies: &[RigidBody]) -> Result<(), BroadPhaseError>;

    /// Emits candidate pairs for every AABB overlap into `candidates`.
    fn solve(&mut self, bodies: &[RigidBody], candidates: &mut CollisionBuffer);

    /// Drops all per-frame state; a subsequent ingest/solve must not see
    /// anything stale.
    fn clear(&mut self);
}
