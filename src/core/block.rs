use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// How a block is meshed by the renderer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BlockMeshType {
    #[default]
    Cube,
    /// Two crossed quads (flowers, tall grass).
    Cross,
}

/// Which shader pass a block is drawn in.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BlockShaderType {
    #[default]
    Chunk,
    Liquid,
    Flora,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockId {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    OakBark = 4,
    OakLeaf = 5,
    Sand = 6,
    Water = 7,
    Cactus = 8,
    Rose = 9,
    TallGrass = 10,
    DeadShrub = 11,
}

pub const NUM_BLOCK_TYPES: usize = 12;

impl BlockId {
    pub fn from_raw(id: u8) -> Option<BlockId> {
        match id {
            0 => Some(BlockId::Air),
            1 => Some(BlockId::Grass),
            2 => Some(BlockId::Dirt),
            3 => Some(BlockId::Stone),
            4 => Some(BlockId::OakBark),
            5 => Some(BlockId::OakLeaf),
            6 => Some(BlockId::Sand),
            7 => Some(BlockId::Water),
            8 => Some(BlockId::Cactus),
            9 => Some(BlockId::Rose),
            10 => Some(BlockId::TallGrass),
            11 => Some(BlockId::DeadShrub),
            _ => None,
        }
    }
}

/// Static per-id metadata. Loaded once into a process-wide read-only table;
/// blocks themselves never own their metadata.
#[derive(Debug)]
pub struct BlockData {
    pub id: BlockId,
    pub tex_top: (u32, u32),
    pub tex_side: (u32, u32),
    pub tex_bottom: (u32, u32),
    pub mesh_type: BlockMeshType,
    pub shader_type: BlockShaderType,
    pub is_opaque: bool,
    pub is_collidable: bool,
    /// Ground friction in percent; 100 is normal ground.
    pub slip: i32,
    pub bounce: f32,
}

impl BlockData {
    const fn cube(id: BlockId, tex: (u32, u32)) -> Self {
        BlockData {
            id,
            tex_top: tex,
            tex_side: tex,
            tex_bottom: tex,
            mesh_type: BlockMeshType::Cube,
            shader_type: BlockShaderType::Chunk,
            is_opaque: true,
            is_collidable: true,
            slip: 100,
            bounce: 0.0,
        }
    }

    const fn flora(id: BlockId, tex: (u32, u32)) -> Self {
        BlockData {
            mesh_type: BlockMeshType::Cross,
            shader_type: BlockShaderType::Flora,
            is_opaque: false,
            is_collidable: false,
            ..BlockData::cube(id, tex)
        }
    }
}

static BLOCK_REGISTRY: Lazy<[BlockData; NUM_BLOCK_TYPES]> = Lazy::new(|| {
    [
        BlockData {
            is_opaque: false,
            is_collidable: false,
            ..BlockData::cube(BlockId::Air, (0, 0))
        },
        BlockData {
            tex_side: (0, 1),
            tex_bottom: (0, 2),
            ..BlockData::cube(BlockId::Grass, (0, 0))
        },
        BlockData::cube(BlockId::Dirt, (0, 2)),
        BlockData::cube(BlockId::Stone, (0, 3)),
        BlockData {
            tex_top: (1, 1),
            tex_bottom: (1, 1),
            ..BlockData::cube(BlockId::OakBark, (1, 0))
        },
        BlockData {
            is_opaque: false,
            ..BlockData::cube(BlockId::OakLeaf, (1, 2))
        },
        BlockData {
            slip: 90,
            ..BlockData::cube(BlockId::Sand, (1, 3))
        },
        BlockData {
            shader_type: BlockShaderType::Liquid,
            is_opaque: false,
            is_collidable: false,
            ..BlockData::cube(BlockId::Water, (2, 0))
        },
        BlockData {
            is_opaque: false,
            bounce: 0.1,
            ..BlockData::cube(BlockId::Cactus, (2, 1))
        },
        BlockData::flora(BlockId::Rose, (2, 2)),
        BlockData::flora(BlockId::TallGrass, (2, 3)),
        BlockData::flora(BlockId::DeadShrub, (3, 0)),
    ]
});

/// Compact block representation stored in chunk arrays: the raw 8-bit id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct ChunkBlock {
    pub(crate) id: u8,
}

impl ChunkBlock {
    pub const AIR: ChunkBlock = ChunkBlock { id: 0 };

    pub fn new(id: BlockId) -> Self {
        ChunkBlock { id: id as u8 }
    }

    pub fn block_id(&self) -> BlockId {
        // Every constructor goes through BlockId, so the raw id is in range.
        BlockId::from_raw(self.id).unwrap_or(BlockId::Air)
    }

    pub fn data(&self) -> &'static BlockData {
        // Out-of-range raw ids (e.g. from deserialized data) read as air
        // rather than indexing out of bounds.
        &BLOCK_REGISTRY[self.block_id() as usize]
    }

    pub fn is_air(&self) -> bool {
        self.id == BlockId::Air as u8
    }

    pub fn is_collidable(&self) -> bool {
        self.data().is_collidable
    }

    pub fn is_opaque(&self) -> bool {
        self.data().is_opaque
    }
}

impl From<BlockId> for ChunkBlock {
    fn from(id: BlockId) -> Self {
        ChunkBlock::new(id)
    }
}
