use serde::{Deserialize, Serialize};

use crate::{
    BoardSizeError, PieceCollisionError,
    core::{
        board::Board,
        piece::{Piece, PieceKind, PiecePosition, PieceRotation, PieceShape},
    },
};

use super::{
    game_stats::GameStats,
    piece_generator::{PieceGenerator, PieceSeed},
};

/// Input applied to the falling piece for one tick.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Action {
    #[display("left")]
    Left,
    #[display("right")]
    Right,
    /// Rotate 90° clockwise.
    #[display("rotate")]
    Rotate,
    /// Let the piece fall without input.
    #[default]
    #[display("none")]
    None,
}

/// Board size and piece seed of an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub width: usize,
    pub height: usize,
    /// Seed for the piece sequence; a random seed is drawn when `None`.
    pub seed: Option<PieceSeed>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            width: Board::DEFAULT_WIDTH,
            height: Board::DEFAULT_HEIGHT,
            seed: None,
        }
    }
}

/// Observation returned by [`Environment::reset`] and [`Environment::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    board: Board,
    piece_frame: [[bool; PieceShape::MAX_SIZE]; PieceShape::MAX_SIZE],
    position: PiecePosition,
    kind: PieceKind,
    rotation: PieceRotation,
}

impl State {
    fn new(board: &Board, piece: &Piece) -> Self {
        Self {
            board: board.clone(),
            piece_frame: piece.shape().to_frame(),
            position: piece.position(),
            kind: piece.kind(),
            rotation: piece.rotation(),
        }
    }

    /// Locked cells only; the falling piece is not stamped in.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The falling piece's current orientation centered in a 4×4 frame.
    #[must_use]
    pub fn piece_frame(&self) -> &[[bool; PieceShape::MAX_SIZE]; PieceShape::MAX_SIZE] {
        &self.piece_frame
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.board.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.board.height()
    }
}

/// Tick-driven falling-block game.
///
/// Every [`step`](Self::step) applies one [`Action`] and then moves the
/// falling piece one row down. When the piece cannot move down it is locked,
/// full lines are cleared and a new piece spawns; the game is over when the
/// new piece does not fit at its spawn position.
///
/// # Example
///
/// ```
/// use stackbot_engine::{Action, Environment, EnvironmentConfig, PieceSeed};
///
/// let config = EnvironmentConfig {
///     seed: Some(PieceSeed::from_u128(1)),
///     ..EnvironmentConfig::default()
/// };
/// let mut env = Environment::new(&config).unwrap();
/// let state = env.reset();
/// assert_eq!(state.position().row(), 0);
///
/// let (state, done) = env.step(Action::Left);
/// assert_eq!(state.position().row(), 1);
/// assert!(!done);
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    board: Board,
    falling_piece: Piece,
    generator: PieceGenerator,
    stats: GameStats,
    new_piece_spawned: bool,
    game_over: bool,
}

impl Environment {
    /// Creates an environment with an empty board and a freshly spawned piece.
    pub fn new(config: &EnvironmentConfig) -> Result<Self, BoardSizeError> {
        let board = Board::new(config.width, config.height)?;
        let generator = config
            .seed
            .map_or_else(PieceGenerator::new, PieceGenerator::with_seed);
        Ok(Self::with_generator(board, generator))
    }

    /// Creates an environment starting from a prepared board.
    ///
    /// Locked cells of `board` are kept until the next [`reset`](Self::reset).
    #[must_use]
    pub fn from_board(board: Board, seed: PieceSeed) -> Self {
        Self::with_generator(board, PieceGenerator::with_seed(seed))
    }

    fn with_generator(board: Board, generator: PieceGenerator) -> Self {
        let falling_piece = Piece::spawn(PieceKind::I, &board);
        let mut this = Self {
            board,
            falling_piece,
            generator,
            stats: GameStats::new(),
            new_piece_spawned: false,
            game_over: false,
        };
        this.spawn_piece();
        this
    }

    /// Empties the board, clears the counters and spawns the first piece.
    ///
    /// The piece sequence continues from the same generator, so consecutive
    /// games see different pieces.
    pub fn reset(&mut self) -> State {
        self.board.clear();
        self.stats = GameStats::new();
        self.game_over = false;
        self.spawn_piece();
        self.state()
    }

    /// Advances the game by one tick.
    ///
    /// Applies `action` (an invalid move or rotation is reverted), then moves
    /// the piece down one row. If it cannot move down, it is locked, lines are
    /// cleared and a new piece spawns. Returns the new state and whether the
    /// game is over. Stepping a finished game changes nothing.
    pub fn step(&mut self, action: Action) -> (State, bool) {
        if self.game_over {
            return (self.state(), true);
        }

        self.stats.record_tick();
        let applied = match action {
            Action::Left => self.try_move_left(),
            Action::Right => self.try_move_right(),
            Action::Rotate => self.try_rotate(),
            Action::None => Ok(()),
        };
        if applied.is_err() {
            log::trace!("{action} rejected at {}", self.falling_piece.position());
        }

        if self.try_soft_drop().is_err() {
            self.lock_falling_piece();
        }
        (self.state(), self.game_over)
    }

    #[must_use]
    pub fn state(&self) -> State {
        State::new(&self.board, &self.falling_piece)
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Total lines cleared since the last reset.
    #[must_use]
    pub fn lines_cleared_count(&self) -> usize {
        self.stats.total_cleared_lines()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Returns whether a piece spawned since the flag was last taken.
    #[must_use]
    pub fn new_piece_spawned(&self) -> bool {
        self.new_piece_spawned
    }

    /// Returns and clears the new-piece flag.
    pub fn take_new_piece_spawned(&mut self) -> bool {
        std::mem::take(&mut self.new_piece_spawned)
    }

    /// Replaces the falling piece if it fits on the board.
    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if !self.board.is_valid_piece(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.left().ok_or(PieceCollisionError)?;
        self.set_falling_piece(piece)
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.right().ok_or(PieceCollisionError)?;
        self.set_falling_piece(piece)
    }

    pub fn try_soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.down().ok_or(PieceCollisionError)?;
        self.set_falling_piece(piece)
    }

    /// Rotates clockwise in place; there are no wall kicks.
    pub fn try_rotate(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.rotated_right())
    }

    fn lock_falling_piece(&mut self) {
        self.board.lock_piece(&self.falling_piece);
        let cleared_lines = self.board.clear_lines();
        self.stats.record_lock(cleared_lines);
        if cleared_lines > 0 {
            log::trace!(
                "cleared {cleared_lines} lines ({} total)",
                self.stats.total_cleared_lines()
            );
        }
        self.spawn_piece();
    }

    fn spawn_piece(&mut self) {
        let kind = self.generator.next_kind();
        self.falling_piece = Piece::spawn(kind, &self.board);
        self.new_piece_spawned = true;
        if !self.board.is_valid_piece(&self.falling_piece) {
            self.game_over = true;
            log::debug!(
                "game over after {} pieces, {} lines",
                self.stats.locked_pieces(),
                self.stats.total_cleared_lines()
            );
        }
    }
}
