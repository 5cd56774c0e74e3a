//! The classic overworld pipeline: biome map, quadrant-interpolated height
//! map, column fill, then vegetation and structure placement.
//!
//! Generation is a pure function of (seed, chunk coordinate): every random
//! draw is keyed on the world column it concerns, so any chunk that looks at
//! a neighboring column reproduces exactly the decisions that neighbor makes
//! for itself. That is what keeps trees and buildings seam-free when they
//! cross chunk boundaries.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rustc_hash::FxHashSet;

use crate::constants::*;
use crate::core::block::{BlockId, ChunkBlock};
use crate::core::chunk::Chunk;
use crate::core::coords::{ChunkCoord, chunk_of, local_of};
use crate::world::biome::BiomeKind;
use crate::world::noise::{NoiseGenerator, NoiseParameters};
use crate::world::structures::{Structure, StructureSet};

/// Noise field driving biome classification. Coarser than the height noise
/// so biome regions span many chunks.
const BIOME_NOISE_PARAMS: NoiseParameters = NoiseParameters {
    octaves: 5,
    amplitude: 120,
    smoothness: 1035,
    height_offset: 0,
    roughness: 0.75,
};

/// Square map over the 3x3 chunk window, indexed by chunk-local coordinates
/// in `-CHUNK_SIZE..` (the target chunk occupies `0..CHUNK_SIZE`).
struct WindowMap {
    size: i32,
    cells: Vec<i32>,
}

impl WindowMap {
    fn new(size: usize) -> Self {
        WindowMap {
            size: size as i32,
            cells: vec![0; size * size],
        }
    }

    fn get(&self, x: i32, z: i32) -> i32 {
        self.cells[((x + CHUNK_SIZE) * self.size + (z + CHUNK_SIZE)) as usize]
    }

    fn set(&mut self, x: i32, z: i32, value: i32) {
        self.cells[((x + CHUNK_SIZE) * self.size + (z + CHUNK_SIZE)) as usize] = value;
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let x = x * x * (3.0 - 2.0 * x);
    edge0 * x + edge1 * (1.0 - x)
}

#[allow(clippy::too_many_arguments)]
fn smooth_interpolation(
    bottom_left: f32,
    top_left: f32,
    bottom_right: f32,
    top_right: f32,
    x_min: f32,
    x_max: f32,
    z_min: f32,
    z_max: f32,
    x: f32,
    z: f32,
) -> f32 {
    let width = x_max - x_min;
    let height = z_max - z_min;
    let x_value = 1.0 - (x - x_min) / width;
    let z_value = 1.0 - (z - z_min) / height;

    let a = smoothstep(bottom_left, bottom_right, x_value);
    let b = smoothstep(top_left, top_right, x_value);
    smoothstep(a, b, z_value)
}

/// A deferred structure stamp: anchor position in chunk-local coordinates
/// plus the chosen template.
struct Placement<'a> {
    x: i32,
    y: i32,
    z: i32,
    structure: &'a Structure,
}

pub struct OverworldGenerator {
    seed: i32,
    biome_noise: NoiseGenerator,
    // One height generator per biome kind, indexed by BiomeKind::index().
    biome_heights: [NoiseGenerator; BiomeKind::ALL.len()],
    structures: Arc<StructureSet>,
}

impl OverworldGenerator {
    pub fn new(seed: i32, structures: Arc<StructureSet>) -> Self {
        // The biome field gets its own seed stream so it does not correlate
        // with any biome's height field.
        let biome_noise = NoiseGenerator::new(seed.wrapping_mul(2), BIOME_NOISE_PARAMS);
        let biome_heights =
            BiomeKind::ALL.map(|kind| NoiseGenerator::new(seed, kind.noise_parameters()));

        OverworldGenerator {
            seed,
            biome_noise,
            biome_heights,
            structures,
        }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Lowest surface height considered acceptable for the player spawn.
    pub fn minimum_spawn_height(&self) -> i32 {
        WATER_LEVEL
    }

    /// Generates a complete chunk. Infallible: all static data (structure
    /// templates, block registry) was validated at startup.
    pub fn generate(&self, coord: ChunkCoord) -> Chunk {
        let mut chunk = Chunk::new(coord);

        let biome_map = self.biome_map(coord);
        let height_map = self.height_map(coord, &biome_map);

        self.fill_columns(&mut chunk, &biome_map, &height_map);
        self.decorate(&mut chunk, &biome_map, &height_map);

        chunk
    }

    /// Biome noise value for a window-local column of `coord`. The sample is
    /// taken `BIOME_NOISE_CHUNK_OFFSET` chunks away so the biome field does
    /// not track the terrain field.
    fn biome_value(&self, coord: ChunkCoord, x: i32, z: i32) -> i32 {
        self.biome_noise.height(
            x,
            z,
            coord.x + BIOME_NOISE_CHUNK_OFFSET,
            coord.z + BIOME_NOISE_CHUNK_OFFSET,
        ) as i32
    }

    fn biome_map(&self, coord: ChunkCoord) -> WindowMap {
        let mut map = WindowMap::new(BIOME_MAP_SIZE);
        for x in -CHUNK_SIZE..=2 * CHUNK_SIZE {
            for z in -CHUNK_SIZE..=2 * CHUNK_SIZE {
                map.set(x, z, self.biome_value(coord, x, z));
            }
        }
        map
    }

    fn biome_at(&self, biome_map: &WindowMap, x: i32, z: i32) -> BiomeKind {
        BiomeKind::classify(biome_map.get(x, z))
    }

    /// Raw (uninterpolated) biome height for one window-local column.
    fn corner_height(&self, coord: ChunkCoord, biome_map: &WindowMap, x: i32, z: i32) -> f32 {
        let biome = self.biome_at(biome_map, x, z);
        self.biome_heights[biome.index()].height(x, z, coord.x, coord.z) as f32
    }

    /// Evaluates height noise only at the four corners of one half-chunk
    /// quadrant and smoothstep-interpolates the interior. Corner evaluation
    /// is O(corners) where full-resolution sampling would be O(area); that
    /// trade is what makes nine-chunk windows affordable.
    fn height_in(
        &self,
        map: &mut WindowMap,
        coord: ChunkCoord,
        biome_map: &WindowMap,
        x_min: i32,
        z_min: i32,
        x_max: i32,
        z_max: i32,
    ) {
        let bottom_left = self.corner_height(coord, biome_map, x_min, z_min);
        let bottom_right = self.corner_height(coord, biome_map, x_max, z_min);
        let top_left = self.corner_height(coord, biome_map, x_min, z_max);
        let top_right = self.corner_height(coord, biome_map, x_max, z_max);

        for x in x_min..x_max {
            for z in z_min..z_max {
                let h = smooth_interpolation(
                    bottom_left,
                    top_left,
                    bottom_right,
                    top_right,
                    x_min as f32,
                    x_max as f32,
                    z_min as f32,
                    z_max as f32,
                    x as f32,
                    z as f32,
                );
                map.set(x, z, h as i32);
            }
        }
    }

    /// Height map over the full 3x3 window, one quadrant at a time. Quadrant
    /// corners land on world positions that are multiples of half a chunk,
    /// so neighboring chunks interpolate from identical corner sets and the
    /// shared columns come out identical.
    fn height_map(&self, coord: ChunkCoord, biome_map: &WindowMap) -> WindowMap {
        const HALF: i32 = CHUNK_SIZE / 2;
        let mut map = WindowMap::new(HEIGHT_MAP_SIZE);

        for off_x in [-CHUNK_SIZE, 0, CHUNK_SIZE] {
            for off_z in [-CHUNK_SIZE, 0, CHUNK_SIZE] {
                for (qx, qz) in [(0, 0), (HALF, 0), (0, HALF), (HALF, HALF)] {
                    self.height_in(
                        &mut map,
                        coord,
                        biome_map,
                        off_x + qx,
                        off_z + qz,
                        off_x + qx + HALF,
                        off_z + qz + HALF,
                    );
                }
            }
        }
        map
    }

    /// Deterministic per-column RNG. `salt` separates independent streams so
    /// surface-block draws never perturb decoration draws.
    fn column_rng(&self, wx: i32, wz: i32, salt: u64) -> StdRng {
        let mut hash = (self.seed as u32 as u64) ^ salt;
        hash = hash.wrapping_add(wx as u32 as u64).wrapping_mul(73856093);
        hash = hash.wrapping_add(wz as u32 as u64).wrapping_mul(19349663);
        hash ^= hash >> 16;
        StdRng::seed_from_u64(hash)
    }

    const SURFACE_SALT: u64 = 0;
    const DECOR_SALT: u64 = 0x5DEECE66D;

    /// Fills every column of the target chunk up to max(height, sea level):
    /// stone at depth, a three-block dirt cap, a biome surface block, and
    /// water above drowned columns.
    fn fill_columns(&self, chunk: &mut Chunk, biome_map: &WindowMap, height_map: &WindowMap) {
        let (base_x, base_z) = chunk.coord().world_base();

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let height = height_map.get(lx, lz);
                let biome = self.biome_at(biome_map, lx, lz);
                let mut rng = self.column_rng(base_x + lx, base_z + lz, Self::SURFACE_SALT);

                let column_top = height.max(WATER_LEVEL).min(WORLD_HEIGHT - 1);
                for y in 0..=column_top {
                    let block = if y > height {
                        // Only reached when the column is below sea level.
                        ChunkBlock::new(BlockId::Water)
                    } else if y == height {
                        if y < WATER_LEVEL {
                            biome.underwater_block(&mut rng)
                        } else if y < WATER_LEVEL + BEACH_BAND {
                            biome.beach_block(&mut rng)
                        } else {
                            biome.top_block(&mut rng)
                        }
                    } else if y > height - 3 {
                        ChunkBlock::new(BlockId::Dirt)
                    } else {
                        ChunkBlock::new(BlockId::Stone)
                    };
                    chunk.set_block(lx, y, lz, block);
                }
            }
        }
    }

    /// Candidate draws for one column, in a fixed order: tree, plant, large
    /// structure. Returns (tree placement, plant block, structure placement).
    fn column_candidates(
        &self,
        wx: i32,
        wz: i32,
        height: i32,
        biome: BiomeKind,
    ) -> (Option<&Structure>, Option<ChunkBlock>, Option<&Structure>) {
        let mut rng = self.column_rng(wx, wz, Self::DECOR_SALT);

        let mut tree = None;
        if rng.random_range(0..=biome.tree_frequency()) == 5 {
            let group = biome.tree_group(&mut rng, height);
            tree = self.structures.variant(group, &mut rng);
        }

        let mut plant = None;
        if rng.random_range(0..=biome.plant_frequency()) == 5 {
            plant = Some(biome.plant(&mut rng));
        }

        let mut structure = None;
        if let Some(group) = biome.structure_group(&mut rng, height) {
            structure = self.structures.variant(group, &mut rng);
        }

        (tree, plant, structure)
    }

    /// Vegetation and structure placement. Candidates are collected over the
    /// whole 3x3 window after its base terrain heights are known, so stamps
    /// anchored in a neighbor chunk write their slice of this chunk too;
    /// writes outside the chunk are clipped. Plants are stamped directly;
    /// trees and structures are deferred so no stamp ever reads unfinished
    /// terrain.
    fn decorate(&self, chunk: &mut Chunk, biome_map: &WindowMap, height_map: &WindowMap) {
        let (base_x, base_z) = chunk.coord().world_base();

        let mut trees: Vec<Placement> = Vec::new();
        let mut structures: Vec<Placement> = Vec::new();
        // At most one large structure per anchor chunk; the first candidate
        // in scan order wins. Column scan order within each anchor chunk is
        // the same no matter which window is looking, so every chunk agrees
        // on the winner.
        let mut claimed: FxHashSet<ChunkCoord> = FxHashSet::default();

        for x in -CHUNK_SIZE..2 * CHUNK_SIZE {
            for z in -CHUNK_SIZE..2 * CHUNK_SIZE {
                let height = height_map.get(x, z);
                // No vegetation under water or on the beach band.
                if height < WATER_LEVEL + BEACH_BAND {
                    continue;
                }
                let biome = self.biome_at(biome_map, x, z);
                let wx = base_x + x;
                let wz = base_z + z;

                let (tree, plant, structure) = self.column_candidates(wx, wz, height, biome);

                if let Some(template) = tree {
                    trees.push(Placement {
                        x,
                        y: height + 1,
                        z,
                        structure: template,
                    });
                }

                if let Some(block) = plant {
                    chunk.set_block(x, height + 1, z, block);
                }

                if let Some(template) = structure {
                    let anchor = ChunkCoord::of_world(wx, wz);
                    if claimed.insert(anchor) {
                        structures.push(Placement {
                            x,
                            y: height,
                            z,
                            structure: template,
                        });
                    }
                }
            }
        }

        for placement in trees.iter().chain(structures.iter()) {
            placement
                .structure
                .stamp(chunk, placement.x, placement.y, placement.z);
        }
    }

    /// Raw surface height of a world column, without quadrant interpolation.
    /// Used for spawn probing and seam checks; matches the interpolated map
    /// at quadrant corners.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let coord = ChunkCoord::new(chunk_of(wx), chunk_of(wz));
        let lx = local_of(wx);
        let lz = local_of(wz);
        let biome = BiomeKind::classify(self.biome_value(coord, lx, lz));
        // Same f64 -> f32 narrowing as the height map, so corner columns
        // agree exactly.
        self.biome_heights[biome.index()].height(lx, lz, coord.x, coord.z) as f32 as i32
    }

    /// Biome of a world column, resolved the same way the chunk pipeline
    /// resolves it.
    pub fn biome_of(&self, wx: i32, wz: i32) -> BiomeKind {
        let coord = ChunkCoord::new(chunk_of(wx), chunk_of(wz));
        BiomeKind::classify(self.biome_value(coord, local_of(wx), local_of(wz)))
    }
}
