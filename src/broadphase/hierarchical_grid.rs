//! Multi-resolution hash grid: cell size doubles per level, and each body
//! is stored once, at the level matching its size.

use super::{BroadPhase, BroadPhaseError};
use crate::collision::buffer::CollisionBuffer;
use crate::objects::rigid_body::RigidBody;

/// Number of levels; level 0 is the finest.
pub const GRID_LEVELS: usize = 4;
/// Shared bucket count across all levels.
const NUM_BUCKETS: usize = 4001;

// Multipliers for the (x, y, level) bucket hash. The level is part of the
// key so different levels never alias into the same bucket by coordinate
// alone.
const PRIME_X: u64 = 3_751_102_111;
const PRIME_Y: u64 = 2_364_347_677;
const PRIME_L: u64 = 4_223_902_003;

fn bucket_index(x: i32, y: i32, level: usize) -> usize {
    let hash = PRIME_X
        .wrapping_mul(x as u32 as u64)
        .wrapping_add(PRIME_Y.wrapping_mul(y as u32 as u64))
        .wrapping_add(PRIME_L.wrapping_mul(level as u64));
    (hash % NUM_BUCKETS as u64) as usize
}

fn cell_range(body: &RigidBody, inv_cell_size: f64) -> (i32, i32, i32, i32) {
    let aabb = body.aabb();
    (
        (aabb.min.x * inv_cell_size).floor() as i32,
        (aabb.max.x * inv_cell_size).floor() as i32,
        (aabb.min.y * inv_cell_size).floor() as i32,
        (aabb.max.y * inv_cell_size).floor() as i32,
    )
}

/// Hierarchical (multi-level) grid.
///
/// A body lands on the coarsest level it needs: the cell size doubles
/// until half of it is at least the body's longer AABB edge (or the top
/// level is reached), which bounds the number of cells any body touches.
/// A level-occupancy bitmask lets the per-object solve skip empty levels,
/// and a per-query tick stamp keeps each bucket from being scanned twice
/// for the same object.
#[derive(Debug)]
pub struct HierarchicalGrid {
    min_cell_size: f64,
    buckets: Vec<Vec<usize>>,
    stamps: Vec<u32>,
    tick: u32,
    occupied_levels: u32,
}

impl HierarchicalGrid {
    pub fn new(min_cell_size: f64) -> Self {
        assert!(min_cell_size > 0.0, "cell size must be positive");
        Self {
            min_cell_size,
            buckets: vec![Vec::new(); NUM_BUCKETS],
            stamps: vec![0; NUM_BUCKETS],
            tick: 0,
            occupied_levels: 0,
        }
    }

    /// The storage level for a body and that level's cell size.
    fn level_for(&self, body: &RigidBody) -> (usize, f64) {
        let full = body.aabb().extents() * 2.0;
        let longer_edge = full.x.max(full.y);
        let mut cell_size = self.min_cell_size;
        let mut level = 0;
        while cell_size * 0.5 < longer_edge && level < GRID_LEVELS - 1 {
            cell_size *= 2.0;
            level += 1;
        }
        (level, cell_size)
    }
}

impl BroadPhase for HierarchicalGrid {
    fn ingest(&mut self, bodies: &[RigidBody]) -> Result<(), BroadPhaseError> {
        for (index, body) in bodies.iter().enumerate() {
            let (level, cell_size) = self.level_for(body);
            let (min_x, max_x, min_y, max_y) = cell_range(body, 1.0 / cell_size);
            for x in min_x..=max_x {
                for y in min_y..=max_y {
                    self.buckets[bucket_index(x, y, level)].push(index);
                    self.occupied_levels |= 1 << level;
                }
            }
        }
        Ok(())
    }

    fn solve(&mut self, bodies: &[RigidBody], candidates: &mut CollisionBuffer) {
        for (index, body) in bodies.iter().enumerate() {
            self.tick += 1;
            let aabb = body.aabb();

            let mut cell_size = self.min_cell_size;
            for level in 0..GRID_LEVELS {
                if self.occupied_levels & (1 << level) != 0 {
                    let (min_x, max_x, min_y, max_y) = cell_range(body, 1.0 / cell_size);
                    for x in min_x..=max_x {
                        for y in min_y..=max_y {
                            let bucket = bucket_index(x, y, level);
                            if self.stamps[bucket] == self.tick {
                                continue;
                            }
                            self.stamps[bucket] = self.tick;
                            for &other in &self.buckets[bucket] {
                                if other == index {
                                    continue;
                                }
                                if aabb.intersects(&bodies[other].aabb()) {
                                    candidates.append(index, other);
                                }
                            }
                        }
                    }
                }
                cell_size *= 2.0;
            }
        }
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for stamp in &mut self.stamps {
            *stamp = 0;
        }
        self.tick = 0;
        self.occupied_levels = 0;
    }
}
