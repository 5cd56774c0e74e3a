use rand::{Rng, RngExt};

use crate::constants::*;
use crate::core::block::{BlockId, ChunkBlock};
use crate::world::noise::NoiseParameters;

/// Closed set of biomes. A biome is a classifier: height noise parameters
/// plus pure block-choice rules, dispatched by matching on the kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BiomeKind {
    Grassland,
    TemperateForest,
    LightForest,
    Desert,
    Ocean,
}

impl BiomeKind {
    pub const ALL: [BiomeKind; 5] = [
        BiomeKind::Grassland,
        BiomeKind::TemperateForest,
        BiomeKind::LightForest,
        BiomeKind::Desert,
        BiomeKind::Ocean,
    ];

    pub fn index(self) -> usize {
        match self {
            BiomeKind::Grassland => 0,
            BiomeKind::TemperateForest => 1,
            BiomeKind::LightForest => 2,
            BiomeKind::Desert => 3,
            BiomeKind::Ocean => 4,
        }
    }

    /// Maps a biome-map noise value to a biome. The bands are monotonic and
    /// total: every value lands somewhere, with desert as the floor.
    pub fn classify(biome_value: i32) -> BiomeKind {
        if biome_value > BIOME_OCEAN_THRESHOLD {
            BiomeKind::Ocean
        } else if biome_value > BIOME_GRASS_UPPER_THRESHOLD {
            BiomeKind::Grassland
        } else if biome_value > BIOME_LIGHT_FOREST_UPPER_THRESHOLD {
            BiomeKind::LightForest
        } else if biome_value > BIOME_TEMPERATE_FOREST_THRESHOLD {
            BiomeKind::TemperateForest
        } else if biome_value > BIOME_LIGHT_FOREST_LOWER_THRESHOLD {
            BiomeKind::LightForest
        } else if biome_value > BIOME_GRASS_LOWER_THRESHOLD {
            BiomeKind::Grassland
        } else {
            BiomeKind::Desert
        }
    }

    pub fn noise_parameters(self) -> NoiseParameters {
        match self {
            BiomeKind::Grassland => NoiseParameters {
                octaves: 9,
                amplitude: 85,
                smoothness: 235,
                height_offset: -20,
                roughness: 0.51,
            },
            BiomeKind::TemperateForest => NoiseParameters {
                octaves: 5,
                amplitude: 100,
                smoothness: 195,
                height_offset: -30,
                roughness: 0.52,
            },
            BiomeKind::LightForest => NoiseParameters {
                octaves: 5,
                amplitude: 100,
                smoothness: 195,
                height_offset: -32,
                roughness: 0.52,
            },
            BiomeKind::Desert => NoiseParameters {
                octaves: 9,
                amplitude: 80,
                smoothness: 335,
                height_offset: -7,
                roughness: 0.56,
            },
            BiomeKind::Ocean => NoiseParameters {
                octaves: 7,
                amplitude: 43,
                smoothness: 55,
                height_offset: 0,
                roughness: 0.50,
            },
        }
    }

    /// One tree spawns per `tree_frequency` draws, on average.
    pub fn tree_frequency(self) -> i32 {
        match self {
            BiomeKind::Grassland => 1000,
            BiomeKind::TemperateForest => 55,
            BiomeKind::LightForest => 60,
            BiomeKind::Desert => 1350,
            BiomeKind::Ocean => 50,
        }
    }

    pub fn plant_frequency(self) -> i32 {
        match self {
            BiomeKind::Grassland => 20,
            BiomeKind::TemperateForest => 75,
            BiomeKind::LightForest => 80,
            BiomeKind::Desert => 500,
            BiomeKind::Ocean => 100,
        }
    }

    pub fn top_block<R: Rng>(self, rng: &mut R) -> ChunkBlock {
        match self {
            BiomeKind::TemperateForest => {
                if rng.random_range(0..=10) < 8 {
                    BlockId::Grass.into()
                } else {
                    BlockId::Dirt.into()
                }
            }
            BiomeKind::Desert => BlockId::Sand.into(),
            _ => BlockId::Grass.into(),
        }
    }

    pub fn underwater_block<R: Rng>(self, rng: &mut R) -> ChunkBlock {
        match self {
            BiomeKind::Grassland | BiomeKind::TemperateForest => {
                if rng.random_range(0..=10) > 8 {
                    BlockId::Dirt.into()
                } else {
                    BlockId::Sand.into()
                }
            }
            BiomeKind::LightForest => {
                if rng.random_range(0..=10) > 9 {
                    BlockId::Sand.into()
                } else {
                    BlockId::Dirt.into()
                }
            }
            BiomeKind::Desert | BiomeKind::Ocean => BlockId::Sand.into(),
        }
    }

    pub fn beach_block<R: Rng>(self, rng: &mut R) -> ChunkBlock {
        match self {
            BiomeKind::Grassland => {
                if rng.random_range(0..=10) > 2 {
                    BlockId::Grass.into()
                } else {
                    BlockId::Dirt.into()
                }
            }
            _ => BlockId::Sand.into(),
        }
    }

    pub fn plant<R: Rng>(self, rng: &mut R) -> ChunkBlock {
        match self {
            BiomeKind::Grassland | BiomeKind::Ocean => {
                if rng.random_range(0..=10) > 6 {
                    BlockId::Rose.into()
                } else {
                    BlockId::TallGrass.into()
                }
            }
            BiomeKind::LightForest => {
                if rng.random_range(0..=10) > 8 {
                    BlockId::Rose.into()
                } else {
                    BlockId::TallGrass.into()
                }
            }
            BiomeKind::TemperateForest => BlockId::TallGrass.into(),
            BiomeKind::Desert => BlockId::DeadShrub.into(),
        }
    }

    /// Structure group stamped for a tree candidate at surface height `y`.
    pub fn tree_group<R: Rng>(self, rng: &mut R, y: i32) -> u32 {
        match self {
            BiomeKind::Ocean => {
                if rng.random_range(0..=5) < 3 {
                    structure_groups::PALM_TREE
                } else {
                    structure_groups::OAK_TREE
                }
            }
            BiomeKind::Desert => {
                if y < WATER_LEVEL + 15 && rng.random_range(0..=100) > 75 {
                    structure_groups::PALM_TREE
                } else {
                    structure_groups::CACTUS
                }
            }
            _ => structure_groups::OAK_TREE,
        }
    }

    /// Rare large structure anchored at surface height `y`, if any. At most
    /// one per chunk is ever placed; the generator enforces that cap.
    pub fn structure_group<R: Rng>(self, rng: &mut R, y: i32) -> Option<u32> {
        match self {
            BiomeKind::Desert => {
                if y - 10 < WATER_LEVEL {
                    return None;
                }
                if rng.random_range(0..=1000) < 1 {
                    Some(structure_groups::DESERT_TEMPLE)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Logical structure-group ids referenced by the biome rules. Each group may
/// ship several visual variants under `res/structures/`.
pub mod structure_groups {
    pub const OAK_TREE: u32 = 0;
    pub const PALM_TREE: u32 = 1;
    pub const CACTUS: u32 = 2;
    pub const DESERT_TEMPLE: u32 = 3;
}
