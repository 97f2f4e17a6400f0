//! Objectives: how good a weight vector is at playing.
//!
//! [`AverageLinesCleared`] plays `games` independent games with an [`Agent`]
//! and scores the weights by the mean number of cleared lines. Games run in
//! parallel, one thread per game, each owning its own [`Environment`].

use std::thread;

use serde::{Deserialize, Serialize};
use stackbot_engine::{Board, BoardSizeError, Environment, GameStats, PieceSeed};
use stackbot_evaluator::{agent::Agent, placement_evaluator::WeightVector};

/// Scores a weight vector; higher is better.
pub trait Objective {
    fn score(&self, weights: &WeightVector) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveParams {
    /// Games played per evaluation.
    pub games: usize,
    /// Stop each game after this many locked pieces.
    pub piece_limit: Option<usize>,
    pub width: usize,
    pub height: usize,
    /// Seed of the first game; game `g` uses `seed + g`.
    ///
    /// Without a seed every evaluation plays fresh random games.
    pub seed: Option<PieceSeed>,
}

impl Default for ObjectiveParams {
    fn default() -> Self {
        Self {
            games: 5,
            piece_limit: None,
            width: Board::DEFAULT_WIDTH,
            height: Board::DEFAULT_HEIGHT,
            seed: None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum ObjectiveParamsError {
    #[display("at least one game per evaluation is required")]
    NoGames,
    #[display("invalid board: {_0}")]
    #[from]
    BoardSize(BoardSizeError),
}

/// Mean lines cleared over several games.
#[derive(Debug, Clone)]
pub struct AverageLinesCleared {
    params: ObjectiveParams,
    board: Board,
}

impl AverageLinesCleared {
    pub fn new(params: ObjectiveParams) -> Result<Self, ObjectiveParamsError> {
        if params.games == 0 {
            return Err(ObjectiveParamsError::NoGames);
        }
        let board = Board::new(params.width, params.height)?;
        Ok(Self { params, board })
    }

    /// Plays every game of one evaluation and returns their statistics in game order.
    #[must_use]
    pub fn play_games(&self, weights: &WeightVector) -> Vec<GameStats> {
        let agent = Agent::new(*weights);
        let piece_limit = self.params.piece_limit;
        let mut results = vec![GameStats::new(); self.params.games];

        thread::scope(|s| {
            for (game, slot) in results.iter_mut().enumerate() {
                let mut env = Environment::from_board(self.board.clone(), self.game_seed(game));
                s.spawn(move || {
                    *slot = agent.play_game(&mut env, piece_limit);
                });
            }
        });

        results
    }

    fn game_seed(&self, game: usize) -> PieceSeed {
        match self.params.seed {
            Some(base) => PieceSeed::from_u128(base.as_u128().wrapping_add(game as u128)),
            None => rand::random(),
        }
    }
}

impl Objective for AverageLinesCleared {
    fn score(&self, weights: &WeightVector) -> f32 {
        let summary = GameSummary::from_stats(&self.play_games(weights));
        log::debug!(
            "weights [{weights}]: mean {:.2} lines (min {}, max {})",
            summary.mean,
            summary.min,
            summary.max
        );
        summary.mean
    }
}

/// Lines-cleared summary over a set of games.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameSummary {
    pub games: usize,
    pub mean: f32,
    pub min: usize,
    pub max: usize,
}

impl GameSummary {
    #[must_use]
    pub fn from_stats(stats: &[GameStats]) -> Self {
        let lines = stats.iter().map(GameStats::total_cleared_lines);
        let total: usize = lines.clone().sum();
        #[expect(clippy::cast_precision_loss)]
        let mean = if stats.is_empty() {
            0.0
        } else {
            total as f32 / stats.len() as f32
        };
        Self {
            games: stats.len(),
            mean,
            min: lines.clone().min().unwrap_or(0),
            max: lines.max().unwrap_or(0),
        }
    }
}
