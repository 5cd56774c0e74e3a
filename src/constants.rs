// World constants
pub const WORLD_HEIGHT: i32 = 256;
pub const CHUNK_SIZE: i32 = 16;
pub const CHUNK_AREA: i32 = CHUNK_SIZE * CHUNK_SIZE;
pub const CHUNK_VOLUME: i32 = CHUNK_AREA * WORLD_HEIGHT;
pub const WATER_LEVEL: i32 = 64;
pub const BEACH_BAND: i32 = 4;

// Streaming constants
pub const LOAD_DISTANCE: i32 = 8;
pub const UNLOAD_DISTANCE: i32 = LOAD_DISTANCE + 2;
pub const REQUEST_QUEUE_CAPACITY: usize = 256;

// Generation constants
pub const WORLD_SEED: i32 = 315974;
/// Side length of the height map window: the target chunk plus one chunk of
/// margin on every side, so decoration can read across chunk boundaries.
pub const HEIGHT_MAP_SIZE: usize = (3 * CHUNK_SIZE) as usize;
/// The biome map carries one extra sample so quadrant corners at the far
/// edge of the window are classified too.
pub const BIOME_MAP_SIZE: usize = HEIGHT_MAP_SIZE + 1;
/// The biome noise field is sampled this many chunks away from the terrain
/// noise so the two fields do not visually correlate.
pub const BIOME_NOISE_CHUNK_OFFSET: i32 = 10;

// Biome classification bands over the biome noise value, checked top-down.
// Tunable policy, not a correctness contract; the bands must stay monotonic.
pub const BIOME_OCEAN_THRESHOLD: i32 = 160;
pub const BIOME_GRASS_UPPER_THRESHOLD: i32 = 150;
pub const BIOME_LIGHT_FOREST_UPPER_THRESHOLD: i32 = 130;
pub const BIOME_TEMPERATE_FOREST_THRESHOLD: i32 = 120;
pub const BIOME_LIGHT_FOREST_LOWER_THRESHOLD: i32 = 110;
pub const BIOME_GRASS_LOWER_THRESHOLD: i32 = 100;

// The layer value in a .structure file that leaves the existing block alone.
pub const STRUCTURE_SENTINEL: u8 = 255;
