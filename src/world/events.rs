use glam::IVec3;

use crate::core::block::ChunkBlock;

/// Block edit requested by the player. Break clears the target cell; Place
/// writes the carried block into it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DigAction {
    Break,
    Place(ChunkBlock),
}

/// Queued world mutation, applied in order on the next update tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorldEvent {
    PlayerDig {
        action: DigAction,
        position: IVec3,
    },
}
