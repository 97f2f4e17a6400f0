//! Placement evaluation: scoring individual piece placements.
//!
//! A placement is scored from its [`NormalizedCriteria`] with a four-term
//! formula:
//!
//! ```text
//! score = w₀·lines² − w₁·holes − w₂·height² + w₃·pillars
//! ```
//!
//! where `wᵢ` are the components of a [`WeightVector`]. Lines are squared so
//! that multi-line clears are preferred over the same number of singles.
//!
//! # Hook Override
//!
//! A J or L piece placed in its hook orientation (`##/#./#.` or `##/.#/.#`)
//! that leaves any hole on the board scores exactly [`HOOK_OVERRIDE_SCORE`],
//! whatever the weights.
//!
//! # Usage
//!
//! ```
//! use stackbot_engine::{Board, Piece, PieceKind, PiecePosition, PieceRotation};
//! use stackbot_evaluator::placement_evaluator::{WeightVector, evaluate};
//!
//! let board = Board::default();
//! let weights = WeightVector::default();
//! let flat = Piece::new(PieceKind::I, PieceRotation::default(), PiecePosition::new(19, 0));
//! let standing = Piece::new(PieceKind::I, PieceRotation::new(1), PiecePosition::new(16, 0));
//! assert!(evaluate(&board, flat, &weights) > evaluate(&board, standing, &weights));
//! ```

use std::{fmt, num::ParseFloatError, ops::Index, str::FromStr};

use serde::{Deserialize, Serialize};
use stackbot_engine::{Board, Piece, PieceKind, PieceShape};

use crate::placement_analysis::{NormalizedCriteria, PlacementAnalysis};

/// Score given to a J/L hook placement that leaves holes.
pub const HOOK_OVERRIDE_SCORE: f32 = -1000.0;

/// Orientations of J and L whose overhanging arm covers an empty column.
pub const HOOK_SHAPES: [PieceShape; 2] = [
    // L at 270°
    PieceShape::from_rows(&[&[1, 1], &[0, 1], &[0, 1]]),
    // J at 90°
    PieceShape::from_rows(&[&[1, 1], &[1, 0], &[1, 0]]),
];

/// Evaluates piece placements by assigning scores.
///
/// Implementations define how to score a placement given its analysis.
/// [`WeightVector`] is the implementation used by the autoplayer.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Evaluates a placement and returns a score (higher is better).
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32;
}

/// The four coefficients of the placement formula.
///
/// Positionally: lines, holes, height, pillars. Weights are written and
/// parsed as four comma-separated numbers.
///
/// # Example
///
/// ```
/// use stackbot_evaluator::placement_evaluator::WeightVector;
///
/// let weights: WeightVector = "1,2.5,-0.5,0".parse().unwrap();
/// assert_eq!(weights.holes(), 2.5);
/// assert_eq!(weights.to_string(), "1,2.5,-0.5,0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector([f32; WeightVector::LEN]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseWeightVectorError {
    #[display("expected 4 comma-separated weights, got {len}")]
    WrongLength { len: usize },
    #[display("invalid weight at position {index}: {source}")]
    InvalidNumber {
        index: usize,
        source: ParseFloatError,
    },
}

impl Default for WeightVector {
    /// Hand-tuned weights.
    fn default() -> Self {
        Self::HAND_TUNED
    }
}

impl WeightVector {
    pub const LEN: usize = 4;

    #[expect(clippy::excessive_precision)]
    pub const HAND_TUNED: Self = Self([0.426_574_53, 1.176_158_49, -0.042_220_9, -0.826_405_37]);

    #[must_use]
    pub const fn new(weights: [f32; Self::LEN]) -> Self {
        Self(weights)
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f32; Self::LEN] {
        &self.0
    }

    #[must_use]
    pub const fn lines(&self) -> f32 {
        self.0[0]
    }

    #[must_use]
    pub const fn holes(&self) -> f32 {
        self.0[1]
    }

    #[must_use]
    pub const fn height(&self) -> f32 {
        self.0[2]
    }

    #[must_use]
    pub const fn pillars(&self) -> f32 {
        self.0[3]
    }

    /// Applies the weights to normalized criteria, without the hook override.
    #[must_use]
    pub fn apply(&self, normalized: &NormalizedCriteria) -> f32 {
        self.lines() * normalized.lines.powi(2)
            - self.holes() * normalized.holes
            - self.height() * normalized.height.powi(2)
            + self.pillars() * normalized.pillar_penalty
    }
}

impl Index<usize> for WeightVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl fmt::Display for WeightVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{w}")?;
        }
        Ok(())
    }
}

impl FromStr for WeightVector {
    type Err = ParseWeightVectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != Self::LEN {
            return Err(ParseWeightVectorError::WrongLength { len: parts.len() });
        }
        let mut weights = [0.0; Self::LEN];
        for (index, (w, part)) in weights.iter_mut().zip(parts).enumerate() {
            let invalid = |source| ParseWeightVectorError::InvalidNumber { index, source };
            *w = part.parse().map_err(invalid)?;
        }
        Ok(Self(weights))
    }
}

impl PlacementEvaluator for WeightVector {
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32 {
        let placement = analysis.placement();
        if analysis.criteria().holes > 0 && is_hook(placement.kind(), placement.shape()) {
            return HOOK_OVERRIDE_SCORE;
        }
        self.apply(&analysis.normalized())
    }
}

/// Returns whether `shape` is a hook orientation of a J or L piece.
#[must_use]
pub fn is_hook(kind: PieceKind, shape: PieceShape) -> bool {
    matches!(kind, PieceKind::J | PieceKind::L) && HOOK_SHAPES.contains(&shape)
}

/// Scores `placement` on a copy of `board`.
#[must_use]
pub fn evaluate(board: &Board, placement: Piece, weights: &WeightVector) -> f32 {
    weights.evaluate_placement(&PlacementAnalysis::from_board(board, placement))
}
