//! Placement scoring, search and execution for the stackbot autoplayer.
//!
//! The evaluator works one falling piece at a time:
//!
//! 1. **Placement Analysis** ([`placement_analysis`]) - Stamps a candidate placement onto a
//!    copy of the board and measures four criteria: lines cleared, holes, landing height and
//!    empty pillars.
//!
//! 2. **Placement Evaluation** ([`placement_evaluator`]) - Normalizes the criteria and combines
//!    them with a [`WeightVector`](placement_evaluator::WeightVector) into a single fitness.
//!
//! 3. **Placement Search** ([`placement_search`]) - Drops every rotation at every column and
//!    keeps the highest-scoring landing spot.
//!
//! 4. **Move Execution** ([`move_executor`]) - Turns the chosen placement into per-tick
//!    rotate/left/right actions on the live environment.
//!
//! [`agent`] ties these together into a game loop.
//!
//! # Architecture
//!
//! ```text
//! Agent (one search-and-execute cycle per spawned piece)
//!     ↓ uses
//! Placement Search (select best landing spot)
//!     ↓ uses
//! Placement Evaluation (score single placement)
//!     ↓ uses
//! Placement Analysis (raw criteria on a board copy)
//! ```
//!
//! # Example
//!
//! ```
//! use stackbot_engine::{Environment, EnvironmentConfig, PieceSeed};
//! use stackbot_evaluator::{agent::Agent, placement_evaluator::WeightVector};
//!
//! let config = EnvironmentConfig {
//!     seed: Some(PieceSeed::from_u128(3)),
//!     ..EnvironmentConfig::default()
//! };
//! let mut env = Environment::new(&config).unwrap();
//! let agent = Agent::new(WeightVector::default());
//! let stats = agent.play_game(&mut env, Some(20));
//! assert!(stats.locked_pieces() <= 20);
//! ```

pub mod agent;
pub mod move_executor;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod placement_search;
