use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::board::Board;

const MAX_SHAPE_SIZE: usize = 4;

/// Occupancy matrix of a piece in a single orientation.
///
/// The matrix is at most 4×4. Row `r`, column `c` is occupied when bit `c` of
/// `bits[r]` is set; bits outside `rows × cols` are always clear, so the
/// derived equality compares matrices exactly (dimensions included).
///
/// # Example
///
/// ```
/// use stackbot_engine::PieceShape;
///
/// let t = PieceShape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]);
/// assert_eq!(t.rows(), 2);
/// assert_eq!(t.cols(), 3);
/// assert_eq!(t.rotated_right().rotated_right().rotated_right().rotated_right(), t);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceShape {
    rows: u8,
    cols: u8,
    bits: [u8; MAX_SHAPE_SIZE],
}

impl PieceShape {
    pub const MAX_SIZE: usize = MAX_SHAPE_SIZE;

    /// Builds a shape from a row-major 0/1 matrix.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is empty, ragged, or larger than 4×4.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn from_rows(matrix: &[&[u8]]) -> Self {
        assert!(!matrix.is_empty() && matrix.len() <= MAX_SHAPE_SIZE);
        let cols = matrix[0].len();
        assert!(cols > 0 && cols <= MAX_SHAPE_SIZE);

        let mut bits = [0; MAX_SHAPE_SIZE];
        let mut r = 0;
        while r < matrix.len() {
            assert!(
                matrix[r].len() == cols,
                "piece matrix rows must have equal length"
            );
            let mut c = 0;
            while c < cols {
                if matrix[r][c] != 0 {
                    bits[r] |= 1 << c;
                }
                c += 1;
            }
            r += 1;
        }

        Self {
            rows: matrix.len() as u8,
            cols: cols as u8,
            bits,
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows as usize
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Returns whether the cell at (`row`, `col`) of the matrix is occupied.
    ///
    /// Cells outside the matrix are reported as empty.
    #[must_use]
    pub const fn is_occupied(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols() && (self.bits[row] >> col) & 1 != 0
    }

    /// Rotates the matrix 90° clockwise.
    ///
    /// The result has the dimensions swapped and `new[r][c] = old[rows - 1 - c][r]`.
    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        let new_rows = self.cols();
        let new_cols = self.rows();
        let mut bits = [0; MAX_SHAPE_SIZE];
        let mut r = 0;
        while r < new_rows {
            let mut c = 0;
            while c < new_cols {
                if self.is_occupied(new_cols - 1 - c, r) {
                    bits[r] |= 1 << c;
                }
                c += 1;
            }
            r += 1;
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            bits,
        }
    }

    /// Applies `rotation` as a number of clockwise quarter turns.
    #[must_use]
    pub const fn rotated(&self, rotation: PieceRotation) -> Self {
        let mut shape = *self;
        let mut i = 0;
        while i < rotation.quarter_turns() {
            shape = shape.rotated_right();
            i += 1;
        }
        shape
    }

    /// Iterates over occupied cells as `(row, col)` offsets from the matrix origin.
    pub fn occupied_cells(self) -> impl Iterator<Item = (u8, u8)> {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols)
                .filter(move |&c| self.is_occupied(usize::from(r), usize::from(c)))
                .map(move |c| (r, c))
        })
    }

    /// Places the shape in the middle of a fixed 4×4 frame.
    ///
    /// Offsets are `(4 - rows) / 2` and `(4 - cols) / 2`, so the frame of a
    /// given orientation never moves when the piece moves.
    #[must_use]
    pub fn to_frame(&self) -> [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE] {
        let mut frame = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let top = (MAX_SHAPE_SIZE - self.rows()) / 2;
        let left = (MAX_SHAPE_SIZE - self.cols()) / 2;
        for (r, c) in self.occupied_cells() {
            frame[top + usize::from(r)][left + usize::from(c)] = true;
        }
        frame
    }
}

impl fmt::Display for PieceShape {
    /// Formats rows top to bottom separated by `/`, e.g. `##/#./#.`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows() {
            if r > 0 {
                f.write_str("/")?;
            }
            for c in 0..self.cols() {
                f.write_str(if self.is_occupied(r, c) { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

/// Rotation state of a piece.
///
/// - `0`: 0° (spawn orientation)
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Rotation wraps around modulo 4.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PieceRotation(u8);

impl PieceRotation {
    /// All rotations in search order.
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn degrees(self) -> u16 {
        (self.0 as u16) * 90
    }
}

impl fmt::Display for PieceRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        match rng.random_range(0..=6) {
            0 => PieceKind::I,
            1 => PieceKind::O,
            2 => PieceKind::S,
            3 => PieceKind::Z,
            4 => PieceKind::J,
            5 => PieceKind::L,
            _ => PieceKind::T,
        }
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Returns the spawn-orientation occupancy matrix.
    #[must_use]
    pub const fn canonical_shape(self) -> PieceShape {
        ORIENTED_SHAPES[self as usize][0]
    }

    /// Returns the occupancy matrix after applying `rotation` to the canonical shape.
    #[must_use]
    pub const fn shape(self, rotation: PieceRotation) -> PieceShape {
        ORIENTED_SHAPES[self as usize][rotation.quarter_turns() as usize]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackbot_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Generates all 4 orientations of a shape by repeated clockwise rotation.
const fn orientations(shape: PieceShape) -> [PieceShape; 4] {
    let mut rotations = [shape; 4];
    let mut i = 1;
    while i < 4 {
        rotations[i] = rotations[i - 1].rotated_right();
        i += 1;
    }
    rotations
}

const ORIENTED_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = [
    // I-piece
    orientations(PieceShape::from_rows(&[&[1, 1, 1, 1]])),
    // O-piece
    orientations(PieceShape::from_rows(&[&[1, 1], &[1, 1]])),
    // S-piece
    orientations(PieceShape::from_rows(&[&[0, 1, 1], &[1, 1, 0]])),
    // Z-piece
    orientations(PieceShape::from_rows(&[&[1, 1, 0], &[0, 1, 1]])),
    // J-piece
    orientations(PieceShape::from_rows(&[&[1, 0, 0], &[1, 1, 1]])),
    // L-piece
    orientations(PieceShape::from_rows(&[&[0, 0, 1], &[1, 1, 1]])),
    // T-piece
    orientations(PieceShape::from_rows(&[&[0, 1, 0], &[1, 1, 1]])),
];

/// Anchor of a piece's occupancy matrix on the board.
///
/// Both coordinates are signed: rows above the board (`row < 0`) are where a
/// freshly spawned piece may still partially sit, and the search probes
/// column `-1` for shapes whose left matrix column is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PiecePosition {
    row: i32,
    col: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn row(self) -> i32 {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> i32 {
        self.col
    }

    #[must_use]
    pub const fn left(self) -> Option<Self> {
        match self.col.checked_sub(1) {
            Some(col) => Some(Self::new(self.row, col)),
            None => None,
        }
    }

    #[must_use]
    pub const fn right(self) -> Option<Self> {
        match self.col.checked_add(1) {
            Some(col) => Some(Self::new(self.row, col)),
            None => None,
        }
    }

    #[must_use]
    pub const fn down(self) -> Option<Self> {
        match self.row.checked_add(1) {
            Some(row) => Some(Self::new(row, self.col)),
            None => None,
        }
    }
}

impl fmt::Display for PiecePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A piece with kind, orientation and position.
///
/// Pieces are immutable values; movement and rotation return new `Piece`s and
/// never check the board. Validity is the board's concern, see
/// [`Board::is_valid_piece`].
///
/// # Example
///
/// ```
/// use stackbot_engine::{Board, Piece, PieceKind};
///
/// let board = Board::default();
/// let piece = Piece::spawn(PieceKind::T, &board);
/// assert_eq!(piece.position().col(), 4);
///
/// let moved = piece.right().unwrap().rotated_right();
/// assert!(board.is_valid_piece(&moved));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
    position: PiecePosition,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, position: PiecePosition) -> Self {
        Self {
            kind,
            rotation,
            position,
        }
    }

    /// Creates a piece in spawn orientation at the top of `board`.
    ///
    /// The anchor is row 0, column `width / 2 - cols / 2`.
    #[must_use]
    pub fn spawn(kind: PieceKind, board: &Board) -> Self {
        let cols = kind.canonical_shape().cols();
        let col = board.signed_width() / 2 - signed(cols) / 2;
        Self::new(kind, PieceRotation::default(), PiecePosition::new(0, col))
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub const fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub const fn shape(&self) -> PieceShape {
        self.kind.shape(self.rotation)
    }

    #[must_use]
    pub const fn with_position(&self, position: PiecePosition) -> Self {
        Self { position, ..*self }
    }

    #[must_use]
    pub fn left(&self) -> Option<Self> {
        Some(self.with_position(self.position.left()?))
    }

    #[must_use]
    pub fn right(&self) -> Option<Self> {
        Some(self.with_position(self.position.right()?))
    }

    #[must_use]
    pub fn down(&self) -> Option<Self> {
        Some(self.with_position(self.position.down()?))
    }

    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }
}

// Shape dimensions never exceed 4.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn signed(value: usize) -> i32 {
    value as i32
}
