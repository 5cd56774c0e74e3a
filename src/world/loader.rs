//! Background chunk generation.
//!
//! Worker threads pull coordinates from a bounded channel and generate
//! straight into the shared [`ChunkManager`], so a finished chunk is visible
//! to block queries the moment the worker publishes it. The main thread
//! never blocks on generation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::{debug, error, trace};

use crate::constants::REQUEST_QUEUE_CAPACITY;
use crate::core::coords::ChunkCoord;
use crate::world::manager::ChunkManager;

pub struct ChunkLoader {
    request_tx: Sender<ChunkCoord>,
    // Coordinates requested but not yet resident. Shared with the workers,
    // which clear entries when they finish or drop a request.
    pending: Arc<Mutex<FxHashSet<ChunkCoord>>>,
    // Latest viewpoint, packed so workers can read it without a lock.
    viewpoint: Arc<AtomicI64>,
    running: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    unload_distance: i32,
}

impl ChunkLoader {
    pub fn new(manager: Arc<ChunkManager>, worker_count: usize, unload_distance: i32) -> Self {
        let (request_tx, request_rx) = bounded::<ChunkCoord>(REQUEST_QUEUE_CAPACITY);
        let pending = Arc::new(Mutex::new(FxHashSet::default()));
        let viewpoint = Arc::new(AtomicI64::new(ChunkCoord::new(0, 0).pack()));
        let running = Arc::new(AtomicBool::new(true));

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let rx = request_rx.clone();
            let manager = Arc::clone(&manager);
            let pending = Arc::clone(&pending);
            let viewpoint = Arc::clone(&viewpoint);
            let running = Arc::clone(&running);

            let handle = thread::Builder::new()
                .name(format!("chunk-gen-{}", worker_id))
                .spawn(move || {
                    worker_loop(rx, manager, pending, viewpoint, running, unload_distance)
                })
                .expect("Failed to spawn chunk generation worker");
            workers.push(handle);
        }

        debug!(worker_count, "chunk loader started");

        ChunkLoader {
            request_tx,
            pending,
            viewpoint,
            running,
            workers,
            unload_distance,
        }
    }

    /// Publishes the current viewpoint for the staleness check in the
    /// workers.
    pub fn set_viewpoint(&self, center: ChunkCoord) {
        self.viewpoint.store(center.pack(), Ordering::Relaxed);
    }

    /// Queues one chunk for generation. Duplicate requests and requests
    /// that do not fit the bounded queue are dropped; the caller re-issues
    /// missing chunks every update tick, so a dropped request is retried
    /// naturally.
    pub fn request(&self, coord: ChunkCoord) -> bool {
        let mut pending = self.pending.lock();
        if pending.contains(&coord) {
            return false;
        }
        if self.request_tx.try_send(coord).is_ok() {
            pending.insert(coord);
            true
        } else {
            false
        }
    }

    /// Queues many chunks, nearest ring first.
    pub fn request_sorted(&self, center: ChunkCoord, coords: &mut Vec<ChunkCoord>) {
        coords.sort_by_key(|coord| coord.ring_distance(center));
        for &coord in coords.iter() {
            self.request(coord);
        }
    }

    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.lock().contains(&coord)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn unload_distance(&self) -> i32 {
        self.unload_distance
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("chunk generation worker terminated abnormally");
            }
        }
        debug!("chunk loader stopped");
    }
}

impl Drop for ChunkLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    rx: Receiver<ChunkCoord>,
    manager: Arc<ChunkManager>,
    pending: Arc<Mutex<FxHashSet<ChunkCoord>>>,
    viewpoint: Arc<AtomicI64>,
    running: Arc<AtomicBool>,
    unload_distance: i32,
) {
    while running.load(Ordering::Relaxed) {
        let coord = match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(coord) => coord,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        // The viewpoint may have moved a long way since this request was
        // queued. Checked once per request, before the expensive part; a
        // generation already underway is allowed to finish.
        let center = ChunkCoord::unpack(viewpoint.load(Ordering::Relaxed));
        if coord.ring_distance(center) > unload_distance {
            pending.lock().remove(&coord);
            trace!(?coord, "dropped stale chunk request");
            continue;
        }

        // A panicking generator must not take the worker down with it. The
        // chunk is simply left absent; the next update tick re-requests it.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            manager.ensure(coord);
        }));
        pending.lock().remove(&coord);
        if result.is_err() {
            error!(?coord, "chunk generation panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WORLD_SEED;
    use crate::world::generator::OverworldGenerator;
    use crate::world::structures::StructureSet;
    use std::path::Path;
    use std::time::Instant;

    fn test_manager() -> Arc<ChunkManager> {
        // Surface worker logs when a test runs with RUST_LOG set.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("res/structures");
        let structures = Arc::new(StructureSet::load_dir(&dir).unwrap());
        Arc::new(ChunkManager::new(OverworldGenerator::new(
            WORLD_SEED, structures,
        )))
    }

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn requested_chunks_become_resident() {
        let manager = test_manager();
        let loader = ChunkLoader::new(Arc::clone(&manager), 2, 4);
        loader.set_viewpoint(ChunkCoord::new(0, 0));

        for x in -1..=1 {
            for z in -1..=1 {
                loader.request(ChunkCoord::new(x, z));
            }
        }

        assert!(
            wait_until(Duration::from_secs(30), || manager.resident() == 9),
            "workers did not finish: {} of 9 resident",
            manager.resident()
        );
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn duplicate_requests_are_coalesced() {
        let manager = test_manager();
        let loader = ChunkLoader::new(Arc::clone(&manager), 1, 4);
        loader.set_viewpoint(ChunkCoord::new(0, 0));

        let coord = ChunkCoord::new(2, 2);
        let first = loader.request(coord);
        let second = loader.request(coord);
        assert!(first);
        // Either still pending (coalesced) or already generated.
        assert!(!second || !loader.is_pending(coord));
    }

    #[test]
    fn stale_requests_are_dropped() {
        let manager = test_manager();
        let loader = ChunkLoader::new(Arc::clone(&manager), 1, 2);
        // Viewpoint far from the requested chunk: the worker must discard
        // the request instead of generating it.
        loader.set_viewpoint(ChunkCoord::new(100, 100));
        let coord = ChunkCoord::new(0, 0);
        loader.request(coord);

        assert!(
            wait_until(Duration::from_secs(10), || !loader.is_pending(coord)),
            "request never resolved"
        );
        assert!(!manager.contains(coord));
    }

    #[test]
    fn drop_joins_workers() {
        let manager = test_manager();
        let loader = ChunkLoader::new(Arc::clone(&manager), 3, 4);
        loader.request(ChunkCoord::new(0, 0));
        drop(loader);
        // No hang: reaching this line means the workers joined.
    }
}
