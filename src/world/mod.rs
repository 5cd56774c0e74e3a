//! World state: resident chunks, background generation, and the block
//! read/write surface the rest of the game talks to.

pub mod biome;
pub mod events;
pub mod generator;
pub mod loader;
pub mod manager;
pub mod noise;
pub mod structures;

use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;
use tracing::info;

use crate::config::WorldConfig;
use crate::constants::{CHUNK_SIZE, WORLD_HEIGHT};
use crate::core::block::ChunkBlock;
use crate::core::coords::{ChunkCoord, local_of};
use crate::error::WorldError;
use crate::world::events::{DigAction, WorldEvent};
use crate::world::generator::OverworldGenerator;
use crate::world::loader::ChunkLoader;
use crate::world::manager::{ChunkManager, SharedChunk};
use crate::world::structures::StructureSet;

/// How far from the origin the spawn probe walks before giving up and
/// settling for the origin column.
const SPAWN_SEARCH_RADIUS: i32 = 1024;

pub struct World {
    manager: Arc<ChunkManager>,
    loader: ChunkLoader,
    events: Mutex<Vec<WorldEvent>>,
    load_distance: i32,
    unload_distance: i32,
}

impl World {
    pub fn new(config: &WorldConfig) -> Result<World, WorldError> {
        let structures = Arc::new(StructureSet::load_dir(&config.structures_dir)?);
        let generator = OverworldGenerator::new(config.seed, structures);
        let manager = Arc::new(ChunkManager::new(generator));
        let workers = config.effective_workers();
        let loader = ChunkLoader::new(Arc::clone(&manager), workers, config.unload_distance);

        info!(
            seed = config.seed,
            workers,
            load_distance = config.load_distance,
            "world initialized"
        );

        Ok(World {
            manager,
            loader,
            events: Mutex::new(Vec::new()),
            load_distance: config.load_distance,
            unload_distance: config.unload_distance,
        })
    }

    /// Block at a world position. Out-of-world positions and positions in
    /// chunks that are not resident read as air; this never triggers
    /// generation.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> ChunkBlock {
        if y < 0 || y >= WORLD_HEIGHT {
            return ChunkBlock::AIR;
        }
        match self.manager.lookup(ChunkCoord::of_world(x, z)) {
            Some(chunk) => chunk.read().get_block(local_of(x), y, local_of(z)),
            None => ChunkBlock::AIR,
        }
    }

    /// Writes a block into a resident chunk, marking it and any chunk
    /// touching the edited cell for remeshing. Writes into absent chunks
    /// are dropped; returns whether the write landed.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: ChunkBlock) -> bool {
        if y < 0 || y >= WORLD_HEIGHT {
            return false;
        }
        let coord = ChunkCoord::of_world(x, z);
        let Some(chunk) = self.manager.lookup(coord) else {
            return false;
        };
        let lx = local_of(x);
        let lz = local_of(z);
        chunk.write().set_block(lx, y, lz, block);

        // An edit on a chunk edge changes the neighbor's visible faces too.
        let mut neighbors = Vec::new();
        if lx == 0 {
            neighbors.push(ChunkCoord::new(coord.x - 1, coord.z));
        }
        if lx == CHUNK_SIZE - 1 {
            neighbors.push(ChunkCoord::new(coord.x + 1, coord.z));
        }
        if lz == 0 {
            neighbors.push(ChunkCoord::new(coord.x, coord.z - 1));
        }
        if lz == CHUNK_SIZE - 1 {
            neighbors.push(ChunkCoord::new(coord.x, coord.z + 1));
        }
        for neighbor in neighbors {
            if let Some(chunk) = self.manager.lookup(neighbor) {
                chunk.write().mesh_dirty = true;
            }
        }
        true
    }

    /// Queues a mutation for the next [`World::update`] tick.
    pub fn add_event(&self, event: WorldEvent) {
        self.events.lock().push(event);
    }

    /// One streaming tick: applies queued events in arrival order, then
    /// requests every missing chunk within the load ring of `viewpoint`
    /// (nearest first) and evicts everything beyond the unload ring.
    pub fn update(&self, viewpoint: Vec3) {
        let events: Vec<WorldEvent> = std::mem::take(&mut *self.events.lock());
        for event in events {
            match event {
                WorldEvent::PlayerDig { action, position } => {
                    let block = match action {
                        DigAction::Break => ChunkBlock::AIR,
                        DigAction::Place(block) => block,
                    };
                    self.set_block(position.x, position.y, position.z, block);
                }
            }
        }

        let center = ChunkCoord::of_world(viewpoint.x.floor() as i32, viewpoint.z.floor() as i32);
        self.loader.set_viewpoint(center);

        let mut missing = Vec::new();
        for dx in -self.load_distance..=self.load_distance {
            for dz in -self.load_distance..=self.load_distance {
                let coord = ChunkCoord::new(center.x + dx, center.z + dz);
                if !self.manager.contains(coord) && !self.loader.is_pending(coord) {
                    missing.push(coord);
                }
            }
        }
        self.loader.request_sorted(center, &mut missing);

        self.manager.evict_outside(center, self.unload_distance);
    }

    /// First column at or above the minimum spawn height, walking outward
    /// from the origin in square rings. The returned position stands on the
    /// surface block.
    pub fn spawn_point(&self) -> Vec3 {
        let generator = self.manager.generator();
        let floor = generator.minimum_spawn_height();

        for radius in 0..=SPAWN_SEARCH_RADIUS {
            for (wx, wz) in ring_columns(radius) {
                let height = generator.surface_height(wx, wz);
                if height >= floor {
                    return Vec3::new(wx as f32 + 0.5, height as f32 + 1.0, wz as f32 + 0.5);
                }
            }
        }
        // Open ocean in every direction; float at sea level.
        Vec3::new(0.5, floor as f32 + 1.0, 0.5)
    }

    /// Same contract as [`World::get_block`]: reads only already-loaded
    /// chunks. The name states the intent at hot call sites.
    pub fn get_block_loaded(&self, x: i32, y: i32, z: i32) -> ChunkBlock {
        self.get_block(x, y, z)
    }

    /// Blocking path: returns the chunk at `coord`, generating it on the
    /// calling thread if it is not resident.
    pub fn ensure_chunk(&self, coord: ChunkCoord) -> SharedChunk {
        self.manager.ensure(coord)
    }

    pub fn chunk_at(&self, coord: ChunkCoord) -> Option<SharedChunk> {
        self.manager.lookup(coord)
    }

    pub fn seed(&self) -> i32 {
        self.manager.generator().seed()
    }

    pub fn chunk_manager(&self) -> &Arc<ChunkManager> {
        &self.manager
    }

    pub fn resident_chunks(&self) -> usize {
        self.manager.resident()
    }

    pub fn pending_generation(&self) -> usize {
        self.loader.pending_count()
    }

    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        self.manager.generator().surface_height(wx, wz)
    }
}

/// Columns on the square ring of the given radius around the origin,
/// sampled at chunk granularity so the probe covers ground quickly.
fn ring_columns(radius: i32) -> Vec<(i32, i32)> {
    if radius == 0 {
        return vec![(0, 0)];
    }
    let step = CHUNK_SIZE;
    let r = radius * step;
    let mut columns = Vec::new();
    for i in (-r..=r).step_by(step as usize) {
        columns.push((i, -r));
        columns.push((i, r));
        columns.push((-r, i));
        columns.push((r, i));
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{WATER_LEVEL, WORLD_SEED};
    use crate::core::block::BlockId;
    use glam::IVec3;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, Instant};

    fn test_config(load_distance: i32) -> WorldConfig {
        WorldConfig {
            seed: WORLD_SEED,
            load_distance,
            unload_distance: load_distance + 2,
            worker_threads: 2,
            structures_dir: PathBuf::from(Path::new(env!("CARGO_MANIFEST_DIR")))
                .join("res/structures"),
        }
    }

    fn settle(world: &World, viewpoint: Vec3, want: usize) {
        let start = Instant::now();
        loop {
            world.update(viewpoint);
            if world.resident_chunks() >= want {
                return;
            }
            assert!(
                start.elapsed() < Duration::from_secs(60),
                "only {} of {} chunks resident",
                world.resident_chunks(),
                want
            );
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn absent_chunks_read_as_air() {
        let world = World::new(&test_config(1)).unwrap();
        // Ten thousand chunks out: no generation, no collision.
        let far = 10_000 * CHUNK_SIZE;
        let block = world.get_block(far, 70, far);
        assert!(block.is_air());
        assert!(!block.is_collidable());
        assert_eq!(world.resident_chunks(), 0);
        assert!(world.get_block(0, -1, 0).is_air());
        assert!(world.get_block(0, WORLD_HEIGHT, 0).is_air());
    }

    #[test]
    fn update_loads_the_ring_around_the_viewpoint() {
        let world = World::new(&test_config(1)).unwrap();
        settle(&world, Vec3::new(8.0, 80.0, 8.0), 9);
        for dx in -1..=1 {
            for dz in -1..=1 {
                assert!(world.chunk_at(ChunkCoord::new(dx, dz)).is_some());
            }
        }
    }

    #[test]
    fn moving_the_viewpoint_evicts_distant_chunks() {
        let world = World::new(&test_config(1)).unwrap();
        settle(&world, Vec3::new(8.0, 80.0, 8.0), 9);

        // Jump far away; everything around the origin is beyond the unload
        // ring now.
        let far = Vec3::new(100.0 * CHUNK_SIZE as f32, 80.0, 0.0);
        world.update(far);
        assert!(world.chunk_at(ChunkCoord::new(0, 0)).is_none());
    }

    #[test]
    fn writes_land_and_edges_dirty_the_neighbor() {
        let world = World::new(&test_config(1)).unwrap();
        settle(&world, Vec3::new(8.0, 80.0, 8.0), 9);

        // In-chunk write.
        assert!(world.set_block(3, 100, 3, ChunkBlock::new(BlockId::Stone)));
        assert_eq!(world.get_block(3, 100, 3).block_id(), BlockId::Stone);

        // Edge write dirties the chunk across the boundary.
        let neighbor = world.chunk_at(ChunkCoord::new(-1, 0)).unwrap();
        neighbor.write().mesh_dirty = false;
        assert!(world.set_block(0, 100, 5, ChunkBlock::new(BlockId::Sand)));
        assert!(neighbor.read().mesh_dirty);

        // Write into an absent chunk is refused.
        assert!(!world.set_block(5000, 100, 5000, ChunkBlock::new(BlockId::Stone)));
    }

    #[test]
    fn dig_events_apply_in_order_on_update() {
        let world = World::new(&test_config(1)).unwrap();
        settle(&world, Vec3::new(8.0, 80.0, 8.0), 9);

        let position = IVec3::new(4, 120, 4);
        world.add_event(WorldEvent::PlayerDig {
            action: DigAction::Place(ChunkBlock::new(BlockId::Stone)),
            position,
        });
        world.add_event(WorldEvent::PlayerDig {
            action: DigAction::Break,
            position,
        });
        world.update(Vec3::new(8.0, 80.0, 8.0));

        // Place then break: the later event wins.
        assert!(world.get_block(4, 120, 4).is_air());
    }

    #[test]
    fn ensure_chunk_blocks_and_publishes() {
        let world = World::new(&test_config(1)).unwrap();
        assert_eq!(world.seed(), WORLD_SEED);

        // No update tick has run; the blocking path still yields the chunk.
        let coord = ChunkCoord::new(2, 3);
        let chunk = world.ensure_chunk(coord);
        assert_eq!(chunk.read().coord(), coord);
        assert!(world.chunk_at(coord).is_some());
        assert_eq!(world.chunk_manager().resident(), 1);

        // The loaded-only read now sees it; a neighbor stays air.
        let (base_x, base_z) = coord.world_base();
        let surface = chunk.read().surface_at(0, 0);
        assert!(!world.get_block_loaded(base_x, surface, base_z).is_air());
        assert!(world.get_block_loaded(base_x - CHUNK_SIZE, surface, base_z).is_air());
    }

    #[test]
    fn spawn_point_stands_on_dry_land_or_sea_level() {
        let world = World::new(&test_config(1)).unwrap();
        let spawn = world.spawn_point();
        let height = world.surface_height(spawn.x.floor() as i32, spawn.z.floor() as i32);
        assert!(spawn.y >= WATER_LEVEL as f32);
        assert!(height >= WATER_LEVEL || spawn.y == WATER_LEVEL as f32 + 1.0);
    }

    #[test]
    fn missing_structure_directory_is_a_startup_error() {
        let mut config = test_config(1);
        config.structures_dir = PathBuf::from("/nonexistent/structures");
        assert!(World::new(&config).is_err());
    }
}
