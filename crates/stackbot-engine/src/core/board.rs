use std::fmt;

use crate::BoardSizeError;

use super::piece::{Piece, PiecePosition, PieceShape};

/// Single row of the board.
///
/// Bit `x` is set when column `x` is occupied. Bits at or beyond the board
/// width are never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitRow {
    bits: u64,
}

impl BitRow {
    pub const EMPTY: Self = Self { bits: 0 };

    #[inline]
    const fn width_mask(width: usize) -> u64 {
        if width >= 64 {
            u64::MAX
        } else {
            (1 << width) - 1
        }
    }

    /// Checks if all `width` cells of the row are occupied.
    #[inline]
    #[must_use]
    pub const fn is_filled(self, width: usize) -> bool {
        let mask = Self::width_mask(width);
        self.bits & mask == mask
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_cell_occupied(self, x: usize) -> bool {
        x < 64 && (self.bits >> x) & 1 != 0
    }

    #[inline]
    fn occupy_cell(&mut self, x: usize) {
        self.bits |= 1 << x;
    }

    #[inline]
    #[must_use]
    pub const fn occupied_count(self) -> u32 {
        self.bits.count_ones()
    }
}

/// Rectangular game grid.
///
/// Row 0 is the top of the board and column 0 its left edge. A cell is either
/// empty or occupied; locked cells only ever move by being shifted down when
/// rows beneath them are cleared.
///
/// # Example
///
/// ```
/// use stackbot_engine::{Board, Piece, PieceKind, PiecePosition, PieceRotation};
///
/// let mut board = Board::from_ascii(
///     "
///     ....
///     .#..
///     .###
///     ",
/// );
/// assert_eq!(board.width(), 4);
///
/// let vertical_i = Piece::new(
///     PieceKind::I,
///     PieceRotation::new(1),
///     PiecePosition::new(-1, 0),
/// );
/// board.lock_piece(&vertical_i);
/// assert_eq!(board.clear_lines(), 1);
/// assert_eq!(board.count_holes(), 0);
/// assert_eq!(board.column_heights(), vec![2, 1, 0, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<BitRow>,
}

impl Default for Board {
    /// Creates the standard empty 10×20 board.
    fn default() -> Self {
        Self::empty(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

impl Board {
    pub const DEFAULT_WIDTH: usize = 10;
    pub const DEFAULT_HEIGHT: usize = 20;
    pub const MAX_WIDTH: usize = 64;
    pub const MAX_HEIGHT: usize = 4096;

    /// Creates an empty board of the given size.
    pub fn new(width: usize, height: usize) -> Result<Self, BoardSizeError> {
        if !(1..=Self::MAX_WIDTH).contains(&width)
            || !(1..=Self::MAX_HEIGHT).contains(&height)
        {
            return Err(BoardSizeError { width, height });
        }
        Ok(Self::empty(width, height))
    }

    fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![BitRow::EMPTY; height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Board width as a signed column coordinate.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    #[must_use]
    pub fn signed_width(&self) -> i32 {
        // bounded by MAX_WIDTH
        self.width as i32
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = BitRow> + '_ {
        self.rows.iter().copied()
    }

    /// Returns whether the cell at (`row`, `col`) is occupied.
    ///
    /// Cells outside the board are reported as empty.
    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        col < self.width && self.rows.get(row).is_some_and(|r| r.is_cell_occupied(col))
    }

    /// Maps a signed coordinate onto the board, `None` when outside `0..len`.
    fn to_index(coord: i64, len: usize) -> Option<usize> {
        usize::try_from(coord).ok().filter(|&i| i < len)
    }

    /// Iterates over the board coordinates covered by `shape` anchored at `position`.
    fn covered_cells(
        shape: PieceShape,
        position: PiecePosition,
    ) -> impl Iterator<Item = (i64, i64)> {
        shape.occupied_cells().map(move |(r, c)| {
            (
                i64::from(position.row()) + i64::from(r),
                i64::from(position.col()) + i64::from(c),
            )
        })
    }

    /// Checks whether `shape` anchored at `position` fits on the board.
    ///
    /// Every occupied cell of the shape must lie within the columns and above
    /// the bottom edge, and must not overlap an occupied board cell. Cells
    /// above the top edge are allowed.
    #[must_use]
    pub fn is_valid_position(&self, shape: PieceShape, position: PiecePosition) -> bool {
        Self::covered_cells(shape, position).all(|(row, col)| {
            let Some(x) = Self::to_index(col, self.width) else {
                return false;
            };
            if row < 0 {
                return true;
            }
            match Self::to_index(row, self.height) {
                Some(y) => !self.rows[y].is_cell_occupied(x),
                None => false,
            }
        })
    }

    #[must_use]
    pub fn is_valid_piece(&self, piece: &Piece) -> bool {
        self.is_valid_position(piece.shape(), piece.position())
    }

    /// Writes the occupied cells of `piece` into the board.
    ///
    /// Cells that fall outside the board are dropped.
    pub fn lock_piece(&mut self, piece: &Piece) {
        for (row, col) in Self::covered_cells(piece.shape(), piece.position()) {
            if let (Some(y), Some(x)) = (
                Self::to_index(row, self.height),
                Self::to_index(col, self.width),
            ) {
                self.rows[y].occupy_cell(x);
            }
        }
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Rows above a cleared row shift down by one per cleared row beneath
    /// them, and empty rows enter at the top. Adjacent full rows all clear in
    /// the same call.
    pub fn clear_lines(&mut self) -> usize {
        let width = self.width;
        let mut count = 0;

        for y in (0..self.height).rev() {
            if self.rows[y].is_filled(width) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(BitRow::EMPTY);
        count
    }

    /// Counts rows whose every cell is occupied.
    #[must_use]
    pub fn count_full_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.is_filled(self.width))
            .count()
    }

    /// Counts empty cells lying below the topmost occupied cell of their column.
    #[must_use]
    pub fn count_holes(&self) -> usize {
        (0..self.width)
            .map(|x| {
                self.rows
                    .iter()
                    .skip_while(|row| !row.is_cell_occupied(x))
                    .filter(|row| !row.is_cell_occupied(x))
                    .count()
            })
            .sum()
    }

    /// Height of column `x`: the board height minus the row index of its
    /// topmost occupied cell, or 0 when the column is empty.
    #[must_use]
    pub fn column_height(&self, x: usize) -> usize {
        self.rows
            .iter()
            .position(|row| row.is_cell_occupied(x))
            .map_or(0, |top| self.height - top)
    }

    #[must_use]
    pub fn column_heights(&self) -> Vec<usize> {
        (0..self.width).map(|x| self.column_height(x)).collect()
    }

    /// Counts occupied cells on the whole board.
    #[must_use]
    pub fn occupied_cell_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.occupied_count() as usize)
            .sum()
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.rows.fill(BitRow::EMPTY);
    }

    /// Creates a `Board` from ASCII art representation for testing.
    ///
    /// '#' represents an occupied cell, '.' represents an empty cell and other
    /// characters are ignored. Rows are specified from top to bottom; blank
    /// lines are skipped. The width is taken from the first row and the height
    /// is the number of rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows differ in width or the size is unsupported.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<Vec<char>> = art
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.chars()
                    .filter(|c| matches!(c, '#' | '.'))
                    .collect()
            })
            .collect();

        let width = lines.first().map_or(0, Vec::len);
        let mut board = match Self::new(width, lines.len()) {
            Ok(board) => board,
            Err(e) => panic!("{e}"),
        };

        for (y, chars) in lines.iter().enumerate() {
            assert_eq!(
                chars.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {y}",
                chars.len(),
            );
            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    board.rows[y].occupy_cell(x);
                }
            }
        }
        board
    }
}

impl fmt::Display for Board {
    /// Formats the board as rows of `#` and `.`, top to bottom.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows.iter().enumerate() {
            if y > 0 {
                f.write_str("\n")?;
            }
            for x in 0..self.width {
                f.write_str(if row.is_cell_occupied(x) { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::piece::{PieceKind, PieceRotation};

    use super::*;

    #[test]
    fn test_new_rejects_unsupported_sizes() {
        assert!(Board::new(10, 20).is_ok());
        assert!(Board::new(64, 1).is_ok());
        assert_eq!(
            Board::new(0, 20),
            Err(BoardSizeError { width: 0, height: 20 })
        );
        assert_eq!(
            Board::new(65, 20),
            Err(BoardSizeError {
                width: 65,
                height: 20
            })
        );
        assert_eq!(
            Board::new(10, 0),
            Err(BoardSizeError { width: 10, height: 0 })
        );
    }

    #[test]
    fn test_default_board_is_empty() {
        let board = Board::default();
        assert_eq!((board.width(), board.height()), (10, 20));
        assert_eq!(board.occupied_cell_count(), 0);
        assert!(board.rows().all(BitRow::is_empty));
    }

    #[test]
    fn test_bit_row_is_filled() {
        let mut row = BitRow::EMPTY;
        for x in 0..9 {
            row.occupy_cell(x);
        }
        assert!(!row.is_filled(10));
        assert!(row.is_filled(9));
        row.occupy_cell(9);
        assert!(row.is_filled(10));

        let mut wide = BitRow::EMPTY;
        for x in 0..64 {
            wide.occupy_cell(x);
        }
        assert!(wide.is_filled(64));
    }

    #[test]
    fn test_is_valid_position_bounds() {
        let board = Board::default();
        let shape = PieceKind::O.canonical_shape();

        assert!(board.is_valid_position(shape, PiecePosition::new(0, 0)));
        assert!(board.is_valid_position(shape, PiecePosition::new(18, 8)));
        assert!(!board.is_valid_position(shape, PiecePosition::new(0, -1)));
        assert!(!board.is_valid_position(shape, PiecePosition::new(0, 9)));
        assert!(!board.is_valid_position(shape, PiecePosition::new(19, 0)));
        // above the top edge is allowed
        assert!(board.is_valid_position(shape, PiecePosition::new(-1, 0)));
    }

    #[test]
    fn test_is_valid_position_ignores_empty_matrix_cells() {
        let board = Board::default();
        // J at 90°: ## / #. / #.  (right column empty except the top)
        let shape = PieceKind::J.shape(PieceRotation::new(1));
        assert!(board.is_valid_position(shape, PiecePosition::new(17, 8)));

        // L at 270°: ## / .# / .#  (left column only occupied at the top)
        let shape = PieceKind::L.shape(PieceRotation::new(3));
        assert!(!board.is_valid_position(shape, PiecePosition::new(0, -1)));
        let vertical_i = PieceKind::I.shape(PieceRotation::new(1));
        assert!(board.is_valid_position(
            vertical_i,
            PiecePosition::new(16, 9)
        ));
    }

    #[test]
    fn test_extreme_coordinates_are_invalid() {
        let mut board = Board::default();
        let shape = PieceKind::T.canonical_shape();
        for (row, col) in [
            (i32::MAX, 0),
            (0, i32::MAX),
            (0, i32::MIN),
            (i32::MAX, i32::MAX),
            (i32::MIN, i32::MIN),
        ] {
            let position = PiecePosition::new(row, col);
            assert!(!board.is_valid_position(shape, position));

            board.lock_piece(&Piece::new(
                PieceKind::T,
                PieceRotation::default(),
                position,
            ));
            assert_eq!(board.occupied_cell_count(), 0);
        }
    }

    #[test]
    fn test_is_valid_position_collision() {
        let board = Board::from_ascii(
            "
            ....
            ....
            .#..
            ",
        );
        let shape = PieceKind::O.canonical_shape();
        assert!(!board.is_valid_position(shape, PiecePosition::new(1, 0)));
        assert!(board.is_valid_position(shape, PiecePosition::new(1, 2)));
        assert!(board.is_valid_position(shape, PiecePosition::new(0, 0)));
    }

    #[test]
    fn test_lock_piece_clips_outside_cells() {
        let mut board = Board::from_ascii(
            "
            ....
            ....
            ",
        );
        let piece = Piece::new(
            PieceKind::O,
            PieceRotation::default(),
            PiecePosition::new(-1, 3),
        );
        board.lock_piece(&piece);
        assert_eq!(board.occupied_cell_count(), 1);
        assert!(board.is_occupied(0, 3));
    }

    #[test]
    fn test_clear_lines_single_line() {
        let mut board = Board::from_ascii(
            "
            ....
            #...
            ####
            ",
        );
        assert_eq!(board.clear_lines(), 1);
        assert_eq!(
            board,
            Board::from_ascii(
                "
                ....
                ....
                #...
                "
            )
        );
    }

    #[test]
    fn test_clear_lines_adjacent_full_rows() {
        let mut board = Board::from_ascii(
            "
            .#..
            ####
            ####
            #.##
            ####
            ",
        );
        assert_eq!(board.count_full_rows(), 3);
        assert_eq!(board.clear_lines(), 3);
        assert_eq!(
            board,
            Board::from_ascii(
                "
                ....
                ....
                ....
                .#..
                #.##
                "
            )
        );
        assert_eq!(board.clear_lines(), 0);
    }

    #[test]
    fn test_count_holes() {
        let board = Board::from_ascii(
            "
            ....
            #...
            ..#.
            ##.#
            ",
        );
        // column 0: one empty cell below the top, column 2: one
        assert_eq!(board.count_holes(), 2);
        assert_eq!(Board::default().count_holes(), 0);
    }

    #[test]
    fn test_count_holes_single_cell() {
        for row in 0..20 {
            let art = (0..20)
                .map(|y| if y == row { "....#....." } else { ".........." })
                .collect::<Vec<_>>()
                .join("\n");
            let board = Board::from_ascii(&art);
            assert_eq!(board.occupied_cell_count(), 1);
            assert_eq!(board.column_height(4), 20 - row);
            assert_eq!(board.count_holes(), 20 - row - 1);
        }
    }

    #[test]
    fn test_column_heights() {
        let board = Board::from_ascii(
            "
            ....
            #...
            ..#.
            ##.#
            ",
        );
        assert_eq!(board.column_heights(), vec![3, 1, 2, 1]);
        assert_eq!(board.column_height(1), 1);
    }

    #[test]
    fn test_display() {
        let board = Board::from_ascii(
            "
            ..#
            ##.
            ",
        );
        assert_eq!(board.to_string(), "..#\n##.");
    }

    #[test]
    fn test_clear() {
        let mut board = Board::from_ascii("##\n#.");
        board.clear();
        assert_eq!(board.occupied_cell_count(), 0);
    }
}
