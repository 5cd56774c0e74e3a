//! Resident chunk store shared between the main thread and the generation
//! workers.
//!
//! The map itself sits behind one `RwLock`; each chunk sits behind its own
//! `Arc<RwLock<_>>` so block reads and writes on different chunks never
//! contend. Generation is serialized on a coarse mutex held across
//! generate-plus-insert, with a re-check under the mutex: a coordinate is
//! generated at most once while resident. Eviction takes the same mutex, so
//! a stale generation can never be inserted behind an eviction pass.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::chunk::Chunk;
use crate::core::coords::ChunkCoord;
use crate::world::generator::OverworldGenerator;

pub type SharedChunk = Arc<RwLock<Chunk>>;

pub struct ChunkManager {
    chunks: RwLock<FxHashMap<ChunkCoord, SharedChunk>>,
    // Held for the whole generate-plus-insert of one `ensure` miss, and by
    // `evict_outside`. Lock order: `generation` before `chunks`.
    generation: Mutex<()>,
    generated: AtomicUsize,
    generator: OverworldGenerator,
}

impl ChunkManager {
    pub fn new(generator: OverworldGenerator) -> Self {
        ChunkManager {
            chunks: RwLock::new(FxHashMap::default()),
            generation: Mutex::new(()),
            generated: AtomicUsize::new(0),
            generator,
        }
    }

    pub fn generator(&self) -> &OverworldGenerator {
        &self.generator
    }

    /// Resident chunk at `coord`, if any. Never generates.
    pub fn lookup(&self, coord: ChunkCoord) -> Option<SharedChunk> {
        self.chunks.read().get(&coord).cloned()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.read().contains_key(&coord)
    }

    pub fn resident(&self) -> usize {
        self.chunks.read().len()
    }

    /// Returns the chunk at `coord`, generating it first if it is not
    /// resident. Safe to call from any number of threads; a resident
    /// coordinate is never generated a second time. Losers of a concurrent
    /// miss block on the generation mutex and then observe the winner's
    /// chunk on the re-check.
    pub fn ensure(&self, coord: ChunkCoord) -> SharedChunk {
        if let Some(chunk) = self.lookup(coord) {
            return chunk;
        }

        let _generation = self.generation.lock();
        // A concurrent ensure may have published while this thread waited.
        if let Some(chunk) = self.lookup(coord) {
            return chunk;
        }

        let chunk = self.generator.generate(coord);
        self.generated.fetch_add(1, Ordering::Relaxed);

        let shared = Arc::new(RwLock::new(chunk));
        self.chunks.write().insert(coord, shared.clone());
        shared
    }

    /// Total generations performed, for assertions and load stats.
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    /// Drops every chunk farther than `radius` rings from `center`.
    /// Outstanding `Arc` handles keep their chunk alive until released, so
    /// a reader mid-access never observes a freed chunk. Takes the
    /// generation mutex: an in-flight `ensure` completes before the pass,
    /// and nothing generated before the pass is inserted after it.
    pub fn evict_outside(&self, center: ChunkCoord, radius: i32) -> usize {
        let _generation = self.generation.lock();
        let mut map = self.chunks.write();
        let before = map.len();
        map.retain(|coord, _| coord.ring_distance(center) <= radius);
        let evicted = before - map.len();
        if evicted > 0 {
            debug!(evicted, resident = map.len(), "evicted distant chunks");
        }
        evicted
    }

    /// Coordinates of all resident chunks, snapshotted.
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        self.chunks.read().keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WORLD_SEED;
    use crate::world::structures::StructureSet;
    use std::path::Path;

    fn test_manager() -> ChunkManager {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("res/structures");
        let structures = Arc::new(StructureSet::load_dir(&dir).unwrap());
        ChunkManager::new(OverworldGenerator::new(WORLD_SEED, structures))
    }

    #[test]
    fn ensure_is_idempotent() {
        let manager = test_manager();
        let first = manager.ensure(ChunkCoord::new(3, -1));
        let second = manager.ensure(ChunkCoord::new(3, -1));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.resident(), 1);
    }

    #[test]
    fn concurrent_ensure_publishes_one_chunk() {
        let manager = Arc::new(test_manager());
        let coord = ChunkCoord::new(0, 0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || manager.ensure(coord))
            })
            .collect();

        let chunks: Vec<SharedChunk> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for chunk in &chunks[1..] {
            assert!(Arc::ptr_eq(&chunks[0], chunk));
        }
        assert_eq!(manager.resident(), 1);
        // Eight concurrent misses, one generation: the losers blocked on the
        // generation mutex and picked up the winner's chunk.
        assert_eq!(manager.generated_count(), 1);
    }

    #[test]
    fn eviction_does_not_resurrect_a_chunk() {
        let manager = test_manager();
        let coord = ChunkCoord::new(4, 4);

        let before = manager.ensure(coord);
        // Edit well above any generated terrain.
        before
            .write()
            .set_block(0, 250, 0, crate::core::block::BlockId::Stone.into());

        manager.evict_outside(ChunkCoord::new(0, 0), 1);
        assert!(!manager.contains(coord));

        // A later ensure is a fresh generation, never a stale pre-eviction
        // copy carrying (or dropping) old edits.
        let after = manager.ensure(coord);
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.read().get_block(0, 250, 0).is_air());
        assert_eq!(manager.generated_count(), 2);
    }

    #[test]
    fn eviction_keeps_exactly_the_in_range_ring() {
        let manager = test_manager();
        for x in -3..=3 {
            for z in -3..=3 {
                manager.ensure(ChunkCoord::new(x, z));
            }
        }
        assert_eq!(manager.resident(), 49);

        let evicted = manager.evict_outside(ChunkCoord::new(0, 0), 2);
        assert_eq!(evicted, 49 - 25);
        assert_eq!(manager.resident(), 25);
        assert!(manager.contains(ChunkCoord::new(2, -2)));
        assert!(!manager.contains(ChunkCoord::new(3, 0)));
    }

    #[test]
    fn eviction_respects_a_moved_center() {
        let manager = test_manager();
        for x in 0..4 {
            manager.ensure(ChunkCoord::new(x, 0));
        }
        manager.evict_outside(ChunkCoord::new(3, 0), 1);
        assert!(manager.contains(ChunkCoord::new(2, 0)));
        assert!(manager.contains(ChunkCoord::new(3, 0)));
        assert!(!manager.contains(ChunkCoord::new(0, 0)));
        assert!(!manager.contains(ChunkCoord::new(1, 0)));
    }

    #[test]
    fn outstanding_handles_survive_eviction() {
        let manager = test_manager();
        let held = manager.ensure(ChunkCoord::new(10, 10));
        manager.evict_outside(ChunkCoord::new(0, 0), 1);
        assert_eq!(manager.resident(), 0);
        // The Arc still resolves to valid chunk data.
        assert_eq!(held.read().coord(), ChunkCoord::new(10, 10));
    }
}
