// Core module with fundamental types
pub mod core;

// World module with generation, streaming and block access
pub mod world;

// Other modules
pub mod config;
pub mod constants;
pub mod error;

// Re-exports
pub use config::WorldConfig;
pub use constants::*;
pub use core::{BlockData, BlockId, Chunk, ChunkBlock, ChunkCoord};
pub use error::{StructureError, WorldError};
pub use world::{
    World,
    biome::BiomeKind,
    events::{DigAction, WorldEvent},
    generator::OverworldGenerator,
    loader::ChunkLoader,
    manager::{ChunkManager, SharedChunk},
    structures::{Structure, StructureSet},
};
