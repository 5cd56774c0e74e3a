use crate::constants::*;
use crate::core::block::ChunkBlock;
use crate::core::coords::ChunkCoord;

/// A full-height column of the world: `CHUNK_SIZE x WORLD_HEIGHT x CHUNK_SIZE`
/// blocks plus its chunk coordinate.
///
/// Once published by the chunk manager a chunk is fully generated; readers
/// never observe holes. The `mesh_dirty` flag is renderer-facing state,
/// raised whenever blocks change so the mesher rebuilds lazily.
pub struct Chunk {
    blocks: Vec<ChunkBlock>,
    coord: ChunkCoord,
    pub mesh_dirty: bool,
}

impl Chunk {
    pub fn new(coord: ChunkCoord) -> Self {
        Chunk {
            blocks: vec![ChunkBlock::AIR; CHUNK_VOLUME as usize],
            coord,
            mesh_dirty: true,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    fn index(x: i32, y: i32, z: i32) -> usize {
        (y * CHUNK_AREA + z * CHUNK_SIZE + x) as usize
    }

    fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_SIZE).contains(&x) && (0..WORLD_HEIGHT).contains(&y) && (0..CHUNK_SIZE).contains(&z)
    }

    /// Block at local coordinates. Out-of-range lookups yield air.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> ChunkBlock {
        if Self::in_bounds(x, y, z) {
            self.blocks[Self::index(x, y, z)]
        } else {
            ChunkBlock::AIR
        }
    }

    /// Writes a block at local coordinates; out-of-range writes are ignored.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: ChunkBlock) {
        if Self::in_bounds(x, y, z) {
            self.blocks[Self::index(x, y, z)] = block;
            self.mesh_dirty = true;
        }
    }

    /// Raw block array, for mesh building and determinism tests.
    pub fn blocks(&self) -> &[ChunkBlock] {
        &self.blocks
    }

    /// Highest non-air block in the given column, or -1 for an empty column.
    pub fn surface_at(&self, x: i32, z: i32) -> i32 {
        for y in (0..WORLD_HEIGHT).rev() {
            if !self.get_block(x, y, z).is_air() {
                return y;
            }
        }
        -1
    }
}
