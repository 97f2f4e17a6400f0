//! Training system for tuning placement weights with simulated annealing.
//!
//! # How Training Works
//!
//! 1. **Objective** - A weight vector plays several games; its score is the mean number of
//!    lines cleared ([`objective`])
//! 2. **Perturbation** - Each iteration adds Gaussian noise to the current weights, or
//!    periodically restarts from fresh random weights ([`weights`])
//! 3. **Acceptance** - Improvements are always accepted; regressions with probability
//!    `exp(delta / T)` ([`annealing`])
//! 4. **Cooling** - The temperature `T` shrinks geometrically every iteration
//!
//! # Architecture
//!
//! ```text
//! Annealer
//!     ↓ proposes
//! Weight Vector
//!     ↓ used by
//! Agent (stackbot-evaluator)
//!     ↓ plays games scored by
//! Objective
//!     ↓ guides
//! Acceptance & best tracking
//! ```
//!
//! # Example
//!
//! ```no_run
//! use stackbot_evaluator::placement_evaluator::WeightVector;
//! use stackbot_training::{
//!     annealing::{AnnealingParams, Annealer},
//!     objective::{AverageLinesCleared, ObjectiveParams},
//! };
//!
//! let objective = AverageLinesCleared::new(ObjectiveParams::default()).unwrap();
//! let annealer = Annealer::new(
//!     AnnealingParams::default(),
//!     objective,
//!     WeightVector::default(),
//!     rand::rng(),
//! )
//! .unwrap();
//! let result = annealer.run();
//! println!("{} -> {}", result.weights, result.score);
//! ```
//!
//! # Current Limitations
//!
//! - **Noisy objective**: every evaluation plays fresh random games unless a seed is fixed,
//!   so the best score is an optimistic estimate
//! - **Single chain**: one annealing chain at a time; games within an evaluation run in
//!   parallel but candidates do not

pub mod annealing;
pub mod objective;
pub mod weights;
