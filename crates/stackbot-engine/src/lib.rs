//! Board simulation and game environment for the stackbot autoplayer.
//!
//! - [`core`] - board grid, piece shapes, collision checks, locking and line clears
//! - [`engine`] - the tick-driven game environment and its statistics

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unsupported board size {width}x{height} (width 1..=64, height 1..=4096)")]
pub struct BoardSizeError {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when moving falling piece")]
pub struct PieceCollisionError;
