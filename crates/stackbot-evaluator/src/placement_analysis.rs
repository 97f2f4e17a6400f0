//! Analysis of board state after piece placement.
//!
//! [`PlacementAnalysis`] stamps a piece onto a copy of the board and measures
//! four raw [`PlacementCriteria`]:
//!
//! 1. **Lines cleared** - full rows in the stamped copy (rows are not removed)
//! 2. **Holes** - empty cells below the topmost occupied cell of each column
//! 3. **Landing height** - the row of the placement anchor
//! 4. **Empty pillars** - columns at least 3 cells lower than a neighbour
//!
//! The criteria are then scaled into [`NormalizedCriteria`] relative to the
//! board size. The live board is never touched.
//!
//! # Usage
//!
//! ```
//! use stackbot_engine::{Board, Piece, PieceKind, PiecePosition, PieceRotation};
//! use stackbot_evaluator::placement_analysis::PlacementAnalysis;
//!
//! let board = Board::from_ascii(
//!     "
//!     ....
//!     ....
//!     ..##
//!     ..##
//!     ",
//! );
//! let o = Piece::new(
//!     PieceKind::O,
//!     PieceRotation::default(),
//!     PiecePosition::new(2, 0),
//! );
//! let analysis = PlacementAnalysis::from_board(&board, o);
//! assert_eq!(analysis.criteria().lines_cleared, 2);
//! assert_eq!(analysis.criteria().holes, 0);
//! assert!((analysis.normalized().lines - 0.5).abs() < f32::EPSILON);
//! ```

use serde::Serialize;
use stackbot_engine::{Board, Piece};

/// Height difference to a neighbour at which a column counts as an empty pillar.
pub const PILLAR_DEPTH: usize = 3;

/// Raw measurements of a board after a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacementCriteria {
    pub lines_cleared: usize,
    pub holes: usize,
    /// Anchor row of the placement; larger is lower on the board.
    pub landing_height: i32,
    pub empty_pillars: usize,
}

/// Criteria scaled relative to the board size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedCriteria {
    /// `min(lines / 4, 1)`
    pub lines: f32,
    /// `min(holes / (width * height), 1)`
    pub holes: f32,
    /// `landing_height / height`, unclamped
    pub height: f32,
    /// `min(pillars / 5, 1)` once there are at least 2 pillars, otherwise 0
    pub pillar_penalty: f32,
}

impl PlacementCriteria {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn normalize(&self, width: usize, height: usize) -> NormalizedCriteria {
        let pillar_penalty = if self.empty_pillars >= 2 {
            (self.empty_pillars as f32 / 5.0).min(1.0)
        } else {
            0.0
        };
        NormalizedCriteria {
            lines: (self.lines_cleared as f32 / 4.0).min(1.0),
            holes: (self.holes as f32 / (width * height) as f32).min(1.0),
            height: self.landing_height as f32 / height as f32,
            pillar_penalty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacementAnalysis {
    placement: Piece,
    board: Board,
    criteria: PlacementCriteria,
}

impl PlacementAnalysis {
    #[must_use]
    pub fn from_board(before_placement: &Board, placement: Piece) -> Self {
        let mut board = before_placement.clone();
        board.lock_piece(&placement);

        let criteria = PlacementCriteria {
            lines_cleared: board.count_full_rows(),
            holes: board.count_holes(),
            landing_height: placement.position().row(),
            empty_pillars: count_empty_pillars(&board.column_heights()),
        };

        Self {
            placement,
            board,
            criteria,
        }
    }

    #[must_use]
    pub fn placement(&self) -> &Piece {
        &self.placement
    }

    /// The board with the placement stamped in and no lines removed.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn criteria(&self) -> &PlacementCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn normalized(&self) -> NormalizedCriteria {
        self.criteria
            .normalize(self.board.width(), self.board.height())
    }
}

/// Yields the columns that sit at least [`PILLAR_DEPTH`] below a neighbour.
///
/// The left neighbour is checked first; a column is yielded at most once.
pub fn empty_pillar_columns(heights: &[usize]) -> impl Iterator<Item = usize> + '_ {
    (0..heights.len()).filter(move |&x| {
        let h = heights[x];
        let deeper_than = |neighbour: Option<&usize>| {
            neighbour.is_some_and(|&n| n.saturating_sub(h) >= PILLAR_DEPTH)
        };
        let left = x.checked_sub(1).and_then(|l| heights.get(l));
        deeper_than(left) || deeper_than(heights.get(x + 1))
    })
}

#[must_use]
pub fn count_empty_pillars(heights: &[usize]) -> usize {
    empty_pillar_columns(heights).count()
}
