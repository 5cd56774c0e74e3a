//! Fundamental world types: blocks, chunks, and coordinate arithmetic.

pub mod block;
pub mod chunk;
pub mod coords;

pub use block::{BlockData, BlockId, BlockMeshType, BlockShaderType, ChunkBlock};
pub use chunk::Chunk;
pub use coords::{ChunkCoord, chunk_of, local_of};
