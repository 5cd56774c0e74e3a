use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// World streaming settings. Deserializable so a launcher can read these
/// from a settings file; defaults match the shipped constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for every noise field and decoration draw.
    pub seed: i32,
    /// Ring radius (in chunks) kept resident around the viewpoint.
    pub load_distance: i32,
    /// Ring radius beyond which chunks are evicted. Kept a little wider than
    /// `load_distance` so chunks do not thrash at the boundary.
    pub unload_distance: i32,
    /// Background generation threads. Zero means "pick from CPU count".
    pub worker_threads: usize,
    /// Directory holding the `.structure` template files.
    pub structures_dir: PathBuf,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: WORLD_SEED,
            load_distance: LOAD_DISTANCE,
            unload_distance: UNLOAD_DISTANCE,
            worker_threads: 0,
            structures_dir: PathBuf::from("res/structures"),
        }
    }
}

impl WorldConfig {
    /// Resolved worker count: configured value, or half the CPUs capped at 4.
    pub fn effective_workers(&self) -> usize {
        if self.worker_threads > 0 {
            self.worker_threads
        } else {
            (num_cpus::get() / 2).clamp(1, 4)
        }
    }
}
