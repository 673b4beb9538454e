//! Uniform grid broad phase with three interchangeable bucket stores:
//! a dense per-cell array over a bounded domain, an open-hashed bucket
//! table, and a closed-hashed flat slot table.
//!
//! All three share the same mapping rules: floor-based world-to-cell
//! conversion, and insertion into every cell a body's AABB covers.

use super::{BroadPhase, BroadPhaseError};
use crate::collision::aabb::Aabb;
use crate::collision::buffer::CollisionBuffer;
use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;

/// Bucket count of the open-hashed store.
const OPEN_HASH_BUCKETS: usize = 4001;

// Large odd multipliers for the cell hash.
const CELL_PRIME_X: u64 = 3_751_102_111;
const CELL_PRIME_Y: u64 = 2_364_347_677;

/// Derives a cell size from the bodies: the mean of each body's longer
/// AABB edge (the "average object" rule). Deterministic for a fixed body
/// order; 1.0 for an empty set.
pub fn average_cell_size(bodies: &[RigidBody]) -> f64 {
    if bodies.is_empty() {
        return 1.0;
    }
    let mut sum = 0.0;
    for body in bodies {
        let full = body.aabb().extents() * 2.0;
        sum += full.x.max(full.y);
    }
    sum / bodies.len() as f64
}

fn cell_coord(value: f64, inv_cell_size: f64) -> i32 {
    (value * inv_cell_size).floor() as i32
}

/// The inclusive cell range `(min_x, max_x, min_y, max_y)` covered by an
/// AABB at the given cell resolution.
fn cell_range(aabb: &Aabb, inv_cell_size: f64) -> (i32, i32, i32, i32) {
    (
        cell_coord(aabb.min.x, inv_cell_size),
        cell_coord(aabb.max.x, inv_cell_size),
        cell_coord(aabb.min.y, inv_cell_size),
        cell_coord(aabb.max.y, inv_cell_size),
    )
}

fn cell_hash(x: i32, y: i32) -> u64 {
    CELL_PRIME_X
        .wrapping_mul(x as u32 as u64)
        .wrapping_add(CELL_PRIME_Y.wrapping_mul(y as u32 as u64))
}

/// Emits all AABB-overlapping pairs within one bucket. Hashed stores can
/// map a body into the same bucket twice via colliding cells, hence the
/// self-pair guard.
fn solve_bucket(bucket: &[usize], bodies: &[RigidBody], candidates: &mut CollisionBuffer) {
    for i in 0..bucket.len() {
        for j in (i + 1)..bucket.len() {
            let a = bucket[i];
            let b = bucket[j];
            if a == b {
                continue;
            }
            if bodies[a].aabb().intersects(&bodies[b].aabb()) {
                candidates.append(a, b);
            }
        }
    }
}

/// Dense bucket store: one bucket per cell of a bounded rectangular
/// domain, indexed `row * width + col`. AABBs are clamped into the domain,
/// so bodies outside it pile into the border cells (correct, slower).
#[derive(Debug)]
pub struct DenseGrid {
    origin: Vec2,
    width: usize,
    height: usize,
    inv_cell_size: f64,
    buckets: Vec<Vec<usize>>,
}

impl DenseGrid {
    /// A grid covering `extents` from `origin` (the minimum corner).
    pub fn new(origin: Vec2, extents: Vec2, cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");
        let width = (extents.x / cell_size).ceil().max(1.0) as usize;
        let height = (extents.y / cell_size).ceil().max(1.0) as usize;
        log::debug!(
            "dense grid: {}x{} cells of {} from {:?}",
            width,
            height,
            cell_size,
            origin
        );
        Self {
            origin,
            width,
            height,
            inv_cell_size: 1.0 / cell_size,
            buckets: vec![Vec::new(); width * height],
        }
    }

    fn clamped_range(&self, aabb: &Aabb) -> (usize, usize, usize, usize) {
        let local = Aabb {
            min: aabb.min - self.origin,
            max: aabb.max - self.origin,
        };
        let (min_x, max_x, min_y, max_y) = cell_range(&local, self.inv_cell_size);
        (
            min_x.clamp(0, self.width as i32 - 1) as usize,
            max_x.clamp(0, self.width as i32 - 1) as usize,
            min_y.clamp(0, self.height as i32 - 1) as usize,
            max_y.clamp(0, self.height as i32 - 1) as usize,
        )
    }
}

impl BroadPhase for DenseGrid {
    fn ingest(&mut self, bodies: &[RigidBody]) -> Result<(), BroadPhaseError> {
        for (index, body) in bodies.iter().enumerate() {
            let (min_x, max_x, min_y, max_y) = self.clamped_range(&body.aabb());
            for row in min_y..=max_y {
                for col in min_x..=max_x {
                    self.buckets[row * self.width + col].push(index);
                }
            }
        }
        Ok(())
    }

    fn solve(&mut self, bodies: &[RigidBody], candidates: &mut CollisionBuffer) {
        for bucket in &self.buckets {
            solve_bucket(bucket, bodies, candidates);
        }
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }
}

/// Open-hashed bucket store: cell coordinates hash into a fixed number of
/// shared buckets, so the domain is unbounded. Distinct cells may land in
/// the same bucket; correctness is preserved, locality is not.
#[derive(Debug)]
pub struct OpenHashGrid {
    inv_cell_size: f64,
    buckets: Vec<Vec<usize>>,
}

impl OpenHashGrid {
    pub fn new(cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");
        Self {
            inv_cell_size: 1.0 / cell_size,
            buckets: vec![Vec::new(); OPEN_HASH_BUCKETS],
        }
    }
}

impl BroadPhase for OpenHashGrid {
    fn ingest(&mut self, bodies: &[RigidBody]) -> Result<(), BroadPhaseError> {
        for (index, body) in bodies.iter().enumerate() {
            let (min_x, max_x, min_y, max_y) = cell_range(&body.aabb(), self.inv_cell_size);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let bucket = (cell_hash(x, y) % OPEN_HASH_BUCKETS as u64) as usize;
                    self.buckets[bucket].push(index);
                }
            }
        }
        Ok(())
    }

    fn solve(&mut self, bodies: &[RigidBody], candidates: &mut CollisionBuffer) {
        for bucket in &self.buckets {
            solve_bucket(bucket, bodies, candidates);
        }
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    cell: (i32, i32),
    body: usize,
}

/// Closed-hashed store: one flat table of (cell, body) slots. A cell's
/// first entry sits at its hashed slot; further entries (same cell or a
/// colliding one) linear-probe to the next free slot. A cell query walks
/// the same probe sequence until the first empty slot, deliberately
/// over-collecting entries from interleaved chains — the AABB test
/// discards strangers, and over-reporting is within the broad-phase
/// contract.
///
/// The table must be sized with headroom: at least twice the expected
/// number of simultaneous body-cell entries. An exhausted table surfaces
/// [`BroadPhaseError::TableSaturated`] instead of probing forever.
#[derive(Debug)]
pub struct ClosedHashGrid {
    inv_cell_size: f64,
    slots: Vec<Option<Slot>>,
    stamps: Vec<u32>,
    tick: u32,
}

impl ClosedHashGrid {
    pub fn new(cell_size: f64, capacity: usize) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");
        assert!(capacity > 0, "table capacity must be positive");
        Self {
            inv_cell_size: 1.0 / cell_size,
            slots: vec![None; capacity],
            stamps: vec![0; capacity],
            tick: 0,
        }
    }

    fn insert(&mut self, cell: (i32, i32), body: usize) -> Result<(), BroadPhaseError> {
        let capacity = self.slots.len();
        let entry = Slot { cell, body };
        let mut index = (cell_hash(cell.0, cell.1) % capacity as u64) as usize;
        let mut probes = 0;
        loop {
            match self.slots[index] {
                None => {
                    self.slots[index] = Some(entry);
                    return Ok(());
                }
                Some(existing) if existing == entry => return Ok(()),
                Some(_) => {
                    index = (index + 1) % capacity;
                    probes += 1;
                    if probes >= capacity {
                        log::warn!(
                            "closed-hash grid saturated (capacity {}), body {}",
                            capacity,
                            body
                        );
                        return Err(BroadPhaseError::TableSaturated { probes, capacity });
                    }
                }
            }
        }
    }
}

impl BroadPhase for ClosedHashGrid {
    fn ingest(&mut self, bodies: &[RigidBody]) -> Result<(), BroadPhaseError> {
        for (index, body) in bodies.iter().enumerate() {
            let (min_x, max_x, min_y, max_y) = cell_range(&body.aabb(), self.inv_cell_size);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    self.insert((x, y), index)?;
                }
            }
        }
        Ok(())
    }

    fn solve(&mut self, bodies: &[RigidBody], candidates: &mut CollisionBuffer) {
        let capacity = self.slots.len();
        for (index, body) in bodies.iter().enumerate() {
            // One tick per body: a slot already visited for this body has
            // had its occupant tested, even if another cell's chain passes
            // through it again.
            self.tick += 1;
            let aabb = body.aabb();
            let (min_x, max_x, min_y, max_y) = cell_range(&aabb, self.inv_cell_size);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let mut slot = (cell_hash(x, y) % capacity as u64) as usize;
                    let mut walked = 0;
                    while let Some(entry) = self.slots[slot] {
                        if self.stamps[slot] != self.tick {
                            self.stamps[slot] = self.tick;
                            if entry.body != index
                                && aabb.intersects(&bodies[entry.body].aabb())
                            {
                                candidates.append(index, entry.body);
                            }
                        }
                        slot = (slot + 1) % capacity;
                        walked += 1;
                        if walked >= capacity {
                            break;
                        }
                    }
                }
            }
        }
    }

    fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        for stamp in &mut self.stamps {
            *stamp = 0;
        }
        self.tick = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadphase::naive::NaiveScan;
    use crate::shapes::{Circle, Shape, VertexArena};
    use std::collections::BTreeSet;

    fn scattered_bodies(count: usize, arena: &VertexArena) -> Vec<RigidBody> {
        // Deterministic scatter with a mix of clustered and lone bodies.
        let mut bodies = Vec::new();
        for i in 0..count {
            let x = ((i * 73) % 97) as f64 - 48.0;
            let y = ((i * 37) % 89) as f64 - 44.0;
            let radius = 1.0 + ((i * 13) % 5) as f64;
            let mut body = RigidBody::new(Shape::Circle(Circle::new(radius)), arena);
            body.set_position(Vec2::new(x, y));
            body.update_aabb(arena);
            bodies.push(body);
        }
        bodies
    }

    fn candidate_set(
        strategy: &mut dyn BroadPhase,
        bodies: &[RigidBody],
    ) -> BTreeSet<(usize, usize)> {
        let mut candidates = CollisionBuffer::new();
        strategy.ingest(bodies).unwrap();
        strategy.solve(bodies, &mut candidates);
        strategy.clear();
        candidates.deduplicate();
        candidates.unique_pairs().map(|p| (p.a, p.b)).collect()
    }

    fn reference_set(bodies: &[RigidBody]) -> BTreeSet<(usize, usize)> {
        candidate_set(&mut NaiveScan::new(), bodies)
    }

    #[test]
    fn test_dense_grid_matches_naive() {
        let arena = VertexArena::new();
        let bodies = scattered_bodies(60, &arena);
        let mut grid = DenseGrid::new(Vec2::new(-60.0, -60.0), Vec2::new(120.0, 120.0), 8.0);
        assert_eq!(candidate_set(&mut grid, &bodies), reference_set(&bodies));
    }

    #[test]
    fn test_dense_grid_clamps_outside_bodies() {
        let arena = VertexArena::new();
        // Both bodies sit left of the domain; they still share the border
        // cell and must be reported.
        let mut bodies = Vec::new();
        for x in [-30.0, -31.5] {
            let mut body = RigidBody::new(Shape::Circle(Circle::new(1.0)), &arena);
            body.set_position(Vec2::new(x, 0.0));
            body.update_aabb(&arena);
            bodies.push(body);
        }
        let mut grid = DenseGrid::new(Vec2::new(0.0, 0.0), Vec2::new(50.0, 50.0), 5.0);
        let pairs = candidate_set(&mut grid, &bodies);
        assert!(pairs.contains(&(0, 1)));
    }

    #[test]
    fn test_open_hash_grid_matches_naive() {
        let arena = VertexArena::new();
        let bodies = scattered_bodies(60, &arena);
        let mut grid = OpenHashGrid::new(8.0);
        assert_eq!(candidate_set(&mut grid, &bodies), reference_set(&bodies));
    }

    #[test]
    fn test_open_hash_grid_handles_negative_cells() {
        let arena = VertexArena::new();
        let mut bodies = Vec::new();
        for x in [-200.0, -201.5] {
            let mut body = RigidBody::new(Shape::Circle(Circle::new(1.0)), &arena);
            body.set_position(Vec2::new(x, -300.0));
            body.update_aabb(&arena);
            bodies.push(body);
        }
        let mut grid = OpenHashGrid::new(4.0);
        let pairs = candidate_set(&mut grid, &bodies);
        assert!(pairs.contains(&(0, 1)));
    }

    #[test]
    fn test_closed_hash_grid_matches_naive() {
        let arena = VertexArena::new();
        let bodies = scattered_bodies(60, &arena);
        // Generous headroom over the expected body-cell entry count.
        let mut grid = ClosedHashGrid::new(8.0, 2048);
        assert_eq!(candidate_set(&mut grid, &bodies), reference_set(&bodies));
    }

    #[test]
    fn test_closed_hash_grid_saturation_fails_loudly() {
        let arena = VertexArena::new();
        let mut bodies = Vec::new();
        for _ in 0..5 {
            let mut body = RigidBody::new(Shape::Circle(Circle::new(0.1)), &arena);
            body.set_position(Vec2::new(5.0, 5.0));
            body.update_aabb(&arena);
            bodies.push(body);
        }
        let mut grid = ClosedHashGrid::new(10.0, 4);
        assert_eq!(
            grid.ingest(&bodies),
            Err(BroadPhaseError::TableSaturated {
                probes: 4,
                capacity: 4
            })
        );
    }

    #[test]
    fn test_clear_removes_stale_state() {
        let arena = VertexArena::new();
        let bodies = scattered_bodies(20, &arena);
        let mut grid = ClosedHashGrid::new(8.0, 2048);

        let first = candidate_set(&mut grid, &bodies);
        // Same input after a clear must reproduce the same set, not
        // accumulate.
        let second = candidate_set(&mut grid, &bodies);
        assert_eq!(first, second);

        let mut candidates = CollisionBuffer::new();
        grid.solve(&bodies, &mut candidates);
        candidates.deduplicate();
        assert_eq!(candidates.unique_count(), 0);
    }

    #[test]
    fn test_average_cell_size() {
        let arena = VertexArena::new();
        let mut bodies = Vec::new();
        for radius in [1.0, 3.0] {
            let mut body = RigidBody::new(Shape::Circle(Circle::new(radius)), &arena);
            body.update_aabb(&arena);
            bodies.push(body);
        }
        // Longer edges are 2 and 6; the mean is 4.
        assert!((average_cell_size(&bodies) - 4.0).abs() < 1e-12);
        assert_eq!(average_cell_size(&[]), 1.0);
    }
}
