//! Autoplayer game loop.
//!
//! For every spawned piece the [`Agent`] searches the best placement, steers
//! the piece there and lets it fall until it locks.

use stackbot_engine::{Action, Environment, GameStats};

use crate::{
    move_executor::{Execution, execute_best_move},
    placement_evaluator::WeightVector,
    placement_search::{PlacementCandidate, choose_best_move},
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Agent {
    weights: WeightVector,
}

impl Agent {
    #[must_use]
    pub const fn new(weights: WeightVector) -> Self {
        Self { weights }
    }

    #[must_use]
    pub const fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Plays the current falling piece until it locks.
    ///
    /// Returns the placement the agent aimed for and whether the game is over.
    pub fn play_turn(&self, env: &mut Environment) -> (PlacementCandidate, bool) {
        env.take_new_piece_spawned();
        let piece = env.falling_piece();
        let target = choose_best_move(env.board(), piece.kind(), &self.weights);

        if target.is_placeable() {
            match execute_best_move(env, target) {
                Execution::GameOver => return (target, true),
                Execution::Locked => return (target, env.is_game_over()),
                Execution::Completed => {}
            }
        }

        while !env.new_piece_spawned() {
            if env.step(Action::None).1 {
                return (target, true);
            }
        }
        (target, env.is_game_over())
    }

    /// Plays until the game ends or `piece_limit` pieces have locked.
    ///
    /// The environment is not reset; call [`Environment::reset`] first to
    /// start from an empty board.
    pub fn play_game(&self, env: &mut Environment, piece_limit: Option<usize>) -> GameStats {
        while !env.is_game_over()
            && piece_limit.is_none_or(|limit| env.stats().locked_pieces() < limit)
        {
            self.play_turn(env);
        }
        log::debug!(
            "game finished: {} lines, {} pieces, game over: {}",
            env.lines_cleared_count(),
            env.stats().locked_pieces(),
            env.is_game_over()
        );
        env.stats().clone()
    }
}
