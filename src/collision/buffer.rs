use super::manifold::BodyPair;

/// Capacity of the raw candidate list; appends past it are dropped.
pub const MAX_RAW_CANDIDATES: usize = 32_768;

/// Dedup table size. Kept above twice the raw capacity so linear probing
/// stays under half load and always terminates long before the bounded
/// scan.
const DEDUP_TABLE_SIZE: usize = 65_537;

const PAIR_PRIME_A: u64 = 1_231_872_409;
const PAIR_PRIME_B: u64 = 3_116_752_669;

/// Collision-candidate buffer: a bounded raw list fed by the broad phase
/// plus a closed-hash table that collapses duplicates.
///
/// The broad phase may report the same pair several times (once per shared
/// bucket or level); after [`CollisionBuffer::deduplicate`] each unordered
/// pair appears at most once. Appends beyond capacity are silently dropped
/// and counted — a deliberate bounded-resource trade-off, surfaced through
/// [`CollisionBuffer::dropped`] rather than an error.
#[derive(Debug)]
pub struct CollisionBuffer {
    raw: Vec<BodyPair>,
    dropped: usize,
    table: Vec<Option<BodyPair>>,
    unique_count: usize,
}

impl CollisionBuffer {
    pub fn new() -> Self {
        Self {
            raw: Vec::with_capacity(MAX_RAW_CANDIDATES),
            dropped: 0,
            table: vec![None; DEDUP_TABLE_SIZE],
            unique_count: 0,
        }
    }

    /// Appends a raw candidate pair, canonicalizing the order. Self-pairs
    /// are ignored; appends past capacity are dropped and counted.
    pub fn append(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        if self.raw.len() >= MAX_RAW_CANDIDATES {
            self.dropped += 1;
            return;
        }
        self.raw.push(BodyPair::new(a, b));
    }

    /// Collapses the raw list into the unique set.
    ///
    /// Each raw pair hashes to a table slot; linear probing walks to the
    /// first empty slot or an equal pair. The probe count is bounded by the
    /// table size, so an (impossible under the sizing above) full table
    /// drops the candidate instead of spinning.
    pub fn deduplicate(&mut self) {
        for &pair in &self.raw {
            let mut idx = Self::slot(pair);
            let mut probes = 0;
            loop {
                match self.table[idx] {
                    None => {
                        self.table[idx] = Some(pair);
                        self.unique_count += 1;
                        break;
                    }
                    Some(existing) if existing == pair => break,
                    Some(_) => {
                        idx = (idx + 1) % DEDUP_TABLE_SIZE;
                        probes += 1;
                        if probes >= DEDUP_TABLE_SIZE {
                            log::warn!("candidate dedup table full, dropping {:?}", pair);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Unique pairs in table-slot order. The order is deterministic for a
    /// fixed table size; changing the table size reorders traversal (and
    /// with it the order impulses are later applied), not the reported set.
    pub fn unique_pairs(&self) -> impl Iterator<Item = BodyPair> + '_ {
        self.table.iter().filter_map(|slot| *slot)
    }

    /// Number of raw candidates accepted this step.
    pub fn raw_count(&self) -> usize {
        self.raw.len()
    }

    /// Number of candidates dropped on overflow this step.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of unique pairs after deduplication.
    pub fn unique_count(&self) -> usize {
        self.unique_count
    }

    /// Clears raw list, table, and counters for the next step.
    pub fn reset(&mut self) {
        self.raw.clear();
        self.dropped = 0;
        if self.unique_count > 0 {
            for slot in &mut self.table {
                *slot = None;
            }
        }
        self.unique_count = 0;
    }

    fn slot(pair: BodyPair) -> usize {
        let hash = PAIR_PRIME_A
            .wrapping_mul(pair.a as u64)
            .wrapping_add(PAIR_PRIME_B.wrapping_mul(pair.b as u64));
        (hash % DEDUP_TABLE_SIZE as u64) as usize
    }
}

impl Default for CollisionBuffer {
    fn default() -> Self {
        Self::new()
    }
}
