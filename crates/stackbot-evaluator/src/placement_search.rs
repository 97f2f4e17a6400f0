//! Placement search: selecting the best landing spot for the falling piece.
//!
//! # How It Works
//!
//! 1. **Enumerate Candidates** - For every rotation (outer loop) and every column from `-1`
//!    to `width - 1` (inner loop), drop the piece from row 0 until it collides
//! 2. **Score Each Candidate** - Stamp it on a board copy and score it with a
//!    [`PlacementEvaluator`]
//! 3. **Select Best** - Keep the first candidate with the strictly highest score
//!
//! Column `-1` is probed as well; since every occupancy matrix has an occupied left
//! column, it only ever yields unplaceable candidates.
//!
//! # Design: Greedy One-Step Lookahead
//!
//! Only the current piece is considered; the next piece is unknown. The search
//! ignores reachability: a candidate is any resting spot straight below row 0,
//! and the move executor is responsible for getting there.
//!
//! # Usage
//!
//! ```
//! use stackbot_engine::{Board, PieceKind};
//! use stackbot_evaluator::{placement_evaluator::WeightVector, placement_search::choose_best_move};
//!
//! let board = Board::from_ascii(
//!     "
//!     ....
//!     ....
//!     ....
//!     ....
//!     .###
//!     ",
//! );
//! let best = choose_best_move(&board, PieceKind::I, &WeightVector::default());
//! assert!(best.is_placeable());
//! assert_eq!(best.column(), 0);
//! assert_eq!(best.rotation().quarter_turns(), 1);
//! ```

use serde::Serialize;
use stackbot_engine::{Board, Piece, PieceKind, PiecePosition, PieceRotation, PieceShape};

use crate::{placement_analysis::PlacementAnalysis, placement_evaluator::PlacementEvaluator};

/// A resting spot for the falling piece: orientation, column and landing row.
///
/// A landing row of `-1` means the shape does not even fit at row 0 in that
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlacementCandidate {
    rotation: PieceRotation,
    column: i32,
    landing_row: i32,
}

impl PlacementCandidate {
    /// Returned by the search when no candidate is placeable.
    pub const UNPLACEABLE: Self = Self::new(PieceRotation::new(0), -1, -1);

    #[must_use]
    pub const fn new(rotation: PieceRotation, column: i32, landing_row: i32) -> Self {
        Self {
            rotation,
            column,
            landing_row,
        }
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    #[must_use]
    pub const fn landing_row(&self) -> i32 {
        self.landing_row
    }

    #[must_use]
    pub const fn is_placeable(&self) -> bool {
        self.landing_row >= 0
    }

    /// The piece of `kind` resting at this candidate.
    #[must_use]
    pub const fn to_piece(&self, kind: PieceKind) -> Piece {
        Piece::new(
            kind,
            self.rotation,
            PiecePosition::new(self.landing_row, self.column),
        )
    }
}

/// Finds the row where `shape` comes to rest when dropped from row 0 in `column`.
///
/// Returns `-1` if the shape is already invalid at row 0.
#[must_use]
pub fn landing_row(board: &Board, shape: PieceShape, column: i32) -> i32 {
    let mut row = 0;
    while board.is_valid_position(shape, PiecePosition::new(row, column)) {
        row += 1;
    }
    row - 1
}

/// Yields every candidate in search order, including unplaceable ones.
pub fn enumerate_candidates(
    board: &Board,
    kind: PieceKind,
) -> impl Iterator<Item = PlacementCandidate> + '_ {
    PieceRotation::ALL.into_iter().flat_map(move |rotation| {
        let shape = kind.shape(rotation);
        (-1..board.signed_width()).map(move |column| {
            PlacementCandidate::new(rotation, column, landing_row(board, shape, column))
        })
    })
}

/// Scores every placeable candidate and returns the best with its score.
///
/// Ties go to the candidate seen first. Returns `None` if no candidate is
/// placeable.
#[must_use]
pub fn find_best_placement<E>(
    board: &Board,
    kind: PieceKind,
    evaluator: &E,
) -> Option<(PlacementCandidate, f32)>
where
    E: PlacementEvaluator + ?Sized,
{
    let mut best_score = f32::NEG_INFINITY;
    let mut best = None;

    for candidate in enumerate_candidates(board, kind).filter(PlacementCandidate::is_placeable) {
        let analysis = PlacementAnalysis::from_board(board, candidate.to_piece(kind));
        let score = evaluator.evaluate_placement(&analysis);
        if score > best_score {
            best_score = score;
            best = Some((candidate, score));
        }
    }

    best
}

/// Selects where the falling piece of `kind` should land.
///
/// Returns [`PlacementCandidate::UNPLACEABLE`] when the piece fits nowhere.
#[must_use]
pub fn choose_best_move<E>(board: &Board, kind: PieceKind, evaluator: &E) -> PlacementCandidate
where
    E: PlacementEvaluator + ?Sized,
{
    let Some((candidate, score)) = find_best_placement(board, kind, evaluator) else {
        log::debug!("no placeable candidate for {kind}");
        return PlacementCandidate::UNPLACEABLE;
    };
    log::trace!(
        "best placement for {kind}: {} at column {} row {} (score {score})",
        candidate.rotation(),
        candidate.column(),
        candidate.landing_row()
    );
    candidate
}

#[cfg(test)]
mod tests {
    use crate::placement_evaluator::WeightVector;

    use super::*;

    /// Scores every placement the same.
    #[derive(Debug)]
    struct Flat;

    impl PlacementEvaluator for Flat {
        fn evaluate_placement(&self, _analysis: &PlacementAnalysis) -> f32 {
            0.0
        }
    }

    /// Prefers placements further right.
    #[derive(Debug)]
    struct Rightmost;

    impl PlacementEvaluator for Rightmost {
        #[expect(clippy::cast_precision_loss)]
        fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32 {
            analysis.placement().position().col() as f32
        }
    }

    #[test]
    fn test_landing_row() {
        let board = Board::from_ascii(
            "
            ....
            ....
            ....
            .#..
            ",
        );
        let o = PieceKind::O.canonical_shape();
        assert_eq!(landing_row(&board, o, 0), 1);
        assert_eq!(landing_row(&board, o, 2), 2);
        assert_eq!(landing_row(&board, o, -1), -1);
        assert_eq!(landing_row(&board, o, 3), -1);
    }

    #[test]
    fn test_enumerate_candidates_order() {
        let board = Board::default();
        let candidates: Vec<_> = enumerate_candidates(&board, PieceKind::T).collect();
        assert_eq!(candidates.len(), 4 * 11);
        assert_eq!(candidates[0].rotation(), PieceRotation::new(0));
        assert_eq!(candidates[0].column(), -1);
        assert!(!candidates[0].is_placeable());
        assert_eq!(candidates[1].column(), 0);
        assert_eq!(candidates[1].landing_row(), 18);
        assert_eq!(candidates[11].rotation(), PieceRotation::new(1));
        assert_eq!(candidates[11].column(), -1);
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        let board = Board::default();
        let best = choose_best_move(&board, PieceKind::O, &Flat);
        assert_eq!(best, PlacementCandidate::new(PieceRotation::new(0), 0, 18));
    }

    #[test]
    fn test_never_selects_unplaceable_candidate() {
        let board = Board::default();
        // a horizontal I at columns 7..9 overhangs the wall and comes first in search order
        let best = choose_best_move(&board, PieceKind::I, &Rightmost);
        assert!(best.is_placeable());
        assert_eq!(best.rotation(), PieceRotation::new(1));
        assert_eq!(best.column(), 9);
    }

    #[test]
    fn test_fallback_when_nothing_fits() {
        let board = Board::from_ascii(
            "
            ####
            ####
            ",
        );
        for kind in PieceKind::ALL {
            let best = choose_best_move(&board, kind, &WeightVector::default());
            assert_eq!(best, PlacementCandidate::UNPLACEABLE);
            assert!(!best.is_placeable());
        }
        assert_eq!(find_best_placement(&board, PieceKind::T, &Flat), None);
    }

    #[test]
    fn test_search_does_not_mutate_board() {
        let board = Board::from_ascii(
            "
            ....
            ....
            #...
            ",
        );
        let before = board.clone();
        let _ = choose_best_move(&board, PieceKind::S, &WeightVector::default());
        assert_eq!(board, before);
    }

    #[test]
    fn test_prefers_line_clear() {
        let board = Board::from_ascii(
            "
            ......
            ......
            ......
            ##.###
            ##.###
            ##.###
            ",
        );
        let best = choose_best_move(&board, PieceKind::I, &WeightVector::default());
        assert_eq!(best.rotation(), PieceRotation::new(1));
        assert_eq!(best.column(), 2);
        assert_eq!(best.landing_row(), 2);
    }

    #[test]
    fn test_candidate_serialization() {
        let candidate = PlacementCandidate::new(PieceRotation::new(3), 4, 17);
        let json = serde_json::to_value(candidate).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "rotation": 3, "column": 4, "landing_row": 17 })
        );
    }
}
