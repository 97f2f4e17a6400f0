//! Tick-driven game environment.
//!
//! - [`Environment`] - board, falling piece and piece generator advanced one [`Action`] per tick
//! - [`State`] - observation returned after every reset and step
//! - [`GameStats`] - ticks, locked pieces and cleared lines of the current game
//! - [`PieceGenerator`] - uniform random piece kinds
//! - [`PieceSeed`] - seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create an [`Environment`] from an [`EnvironmentConfig`]
//! 2. Each [`Environment::step`] applies an action, then the piece falls one row
//! 3. A piece that cannot fall locks; full lines clear and a new piece spawns
//! 4. The game ends when a new piece does not fit at its spawn position

pub use self::{environment::*, game_stats::*, piece_generator::*};

mod environment;
mod game_stats;
mod piece_generator;
