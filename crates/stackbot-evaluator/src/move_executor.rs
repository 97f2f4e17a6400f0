//! Move execution: steering the falling piece to a chosen placement.
//!
//! [`execute_best_move`] issues one [`Action`] per tick: first the rotations,
//! then horizontal moves until the anchor column matches the target. Gravity
//! keeps acting meanwhile, so execution is cut short as soon as the piece
//! locks or the game ends. The final drop is left to the caller.

use std::cmp::Ordering;

use stackbot_engine::{Action, Environment, Piece};

use crate::placement_search::PlacementCandidate;

/// The parts of a game the executor drives.
///
/// Implemented by [`Environment`]; tests substitute scripted controllers.
pub trait PieceController {
    fn falling_piece(&self) -> Piece;

    /// Applies `action` for one tick and returns whether the game is over.
    fn step(&mut self, action: Action) -> bool;

    /// Whether a new piece spawned since the caller last took the flag.
    fn new_piece_spawned(&self) -> bool;
}

impl PieceController for Environment {
    fn falling_piece(&self) -> Piece {
        Environment::falling_piece(self)
    }

    fn step(&mut self, action: Action) -> bool {
        Environment::step(self, action).1
    }

    fn new_piece_spawned(&self) -> bool {
        Environment::new_piece_spawned(self)
    }
}

/// How a call to [`execute_best_move`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Execution {
    /// The piece reached the target rotation and column and is still falling.
    Completed,
    /// The piece locked before reaching the target.
    Locked,
    /// The game ended during execution.
    GameOver,
}

/// Rotates and shifts the falling piece towards `target`.
///
/// The new-piece flag must be cleared before calling; any spawn seen during
/// execution is reported as [`Execution::Locked`].
pub fn execute_best_move<C>(controller: &mut C, target: PlacementCandidate) -> Execution
where
    C: PieceController + ?Sized,
{
    for _ in 0..target.rotation().quarter_turns() {
        if let Some(interrupted) = apply(controller, Action::Rotate) {
            return interrupted;
        }
    }

    loop {
        let column = controller.falling_piece().position().col();
        let action = match column.cmp(&target.column()) {
            Ordering::Greater => Action::Left,
            Ordering::Less => Action::Right,
            Ordering::Equal => return Execution::Completed,
        };
        if let Some(interrupted) = apply(controller, action) {
            return interrupted;
        }
    }
}

fn apply<C>(controller: &mut C, action: Action) -> Option<Execution>
where
    C: PieceController + ?Sized,
{
    if controller.step(action) {
        return Some(Execution::GameOver);
    }
    if controller.new_piece_spawned() {
        return Some(Execution::Locked);
    }
    None
}

#[cfg(test)]
mod tests {
    use stackbot_engine::{Board, PieceKind, PiecePosition, PieceRotation, PieceSeed};

    use crate::{placement_evaluator::WeightVector, placement_search::choose_best_move};

    use super::*;

    /// Records actions; moves are always accepted and the piece never falls.
    #[derive(Debug)]
    struct Scripted {
        piece: Piece,
        actions: Vec<Action>,
        lock_after: Option<usize>,
        game_over_after: Option<usize>,
    }

    impl Scripted {
        fn new(column: i32) -> Self {
            Self {
                piece: Piece::new(
                    PieceKind::T,
                    PieceRotation::default(),
                    PiecePosition::new(0, column),
                ),
                actions: vec![],
                lock_after: None,
                game_over_after: None,
            }
        }
    }

    impl PieceController for Scripted {
        fn falling_piece(&self) -> Piece {
            self.piece
        }

        fn step(&mut self, action: Action) -> bool {
            self.actions.push(action);
            self.piece = match action {
                Action::Left => self.piece.left().unwrap(),
                Action::Right => self.piece.right().unwrap(),
                Action::Rotate => self.piece.rotated_right(),
                Action::None => self.piece,
            };
            self.game_over_after == Some(self.actions.len())
        }

        fn new_piece_spawned(&self) -> bool {
            self.lock_after.is_some_and(|n| self.actions.len() >= n)
        }
    }

    #[test]
    fn test_rotations_then_moves() {
        let mut controller = Scripted::new(4);
        let target = PlacementCandidate::new(PieceRotation::new(2), 1, 10);
        let result = execute_best_move(&mut controller, target);

        assert!(result.is_completed());
        assert_eq!(
            controller.actions,
            [
                Action::Rotate,
                Action::Rotate,
                Action::Left,
                Action::Left,
                Action::Left
            ]
        );
        assert_eq!(controller.piece.rotation(), PieceRotation::new(2));
        assert_eq!(controller.piece.position().col(), 1);
    }

    #[test]
    fn test_moves_right() {
        let mut controller = Scripted::new(4);
        let target = PlacementCandidate::new(PieceRotation::new(0), 6, 10);
        assert!(execute_best_move(&mut controller, target).is_completed());
        assert_eq!(controller.actions, [Action::Right, Action::Right]);
    }

    #[test]
    fn test_already_in_place_issues_nothing() {
        let mut controller = Scripted::new(4);
        let target = PlacementCandidate::new(PieceRotation::new(0), 4, 10);
        assert!(execute_best_move(&mut controller, target).is_completed());
        assert!(controller.actions.is_empty());
    }

    #[test]
    fn test_aborts_on_lock() {
        let mut controller = Scripted::new(4);
        controller.lock_after = Some(2);
        let target = PlacementCandidate::new(PieceRotation::new(1), 0, 10);
        let execution = execute_best_move(&mut controller, target);
        assert_eq!(execution, Execution::Locked);
        assert_eq!(controller.actions.len(), 2);
    }

    #[test]
    fn test_aborts_on_game_over() {
        let mut controller = Scripted::new(4);
        controller.game_over_after = Some(1);
        controller.lock_after = Some(1);
        let target = PlacementCandidate::new(PieceRotation::new(3), 0, 10);
        assert!(execute_best_move(&mut controller, target).is_game_over());
        assert_eq!(controller.actions, [Action::Rotate]);
    }

    #[test]
    fn test_end_to_end_rests_at_target() {
        let board = Board::from_ascii(
            "
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            #########.
            #########.
            #########.
            #########.
            ",
        );
        let mut env = Environment::from_board(board, PieceSeed::from_u128(9));
        env.set_falling_piece(Piece::spawn(PieceKind::I, env.board()))
            .unwrap();
        env.take_new_piece_spawned();

        let target = choose_best_move(env.board(), PieceKind::I, &WeightVector::default());
        let vertical = PlacementCandidate::new(PieceRotation::new(1), 9, 16);
        assert_eq!(target, vertical);

        assert!(execute_best_move(&mut env, target).is_completed());
        let piece = env.falling_piece();
        assert_eq!(piece.rotation(), target.rotation());
        assert_eq!(piece.position().col(), target.column());
        assert!(piece.position().row() < target.landing_row());
        assert!(!env.new_piece_spawned());
        assert_eq!(env.lines_cleared_count(), 0);

        while !env.new_piece_spawned() {
            env.step(Action::None);
        }
        assert_eq!(env.lines_cleared_count(), 4);
        assert_eq!(env.board().occupied_cell_count(), 0);
    }
}
