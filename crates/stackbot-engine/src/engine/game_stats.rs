use serde::{Deserialize, Serialize};

/// Game statistics tracking ticks, locked pieces and cleared lines.
///
/// - **Ticks**: number of environment steps taken
/// - **Locked pieces**: pieces that came to rest on the stack
/// - **Line clear distribution**: count of locks clearing 0, 1, 2, 3 or 4 lines
///
/// The score of a game is its total number of cleared lines.
///
/// # Example
///
/// ```
/// use stackbot_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(4);
/// stats.record_lock(0);
///
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.locked_pieces(), 2);
/// assert_eq!(stats.line_clear_histogram()[4], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    ticks: usize,
    locked_pieces: usize,
    total_cleared_lines: usize,
    line_clear_histogram: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            locked_pieces: 0,
            total_cleared_lines: 0,
            line_clear_histogram: [0; 5],
        }
    }

    #[must_use]
    pub const fn ticks(&self) -> usize {
        self.ticks
    }

    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by number of lines they cleared.
    ///
    /// Index `n` holds the number of locks that cleared exactly `n` lines.
    #[must_use]
    pub const fn line_clear_histogram(&self) -> &[usize; 5] {
        &self.line_clear_histogram
    }

    pub const fn record_tick(&mut self) {
        self.ticks += 1;
    }

    /// Updates statistics after a piece is locked.
    ///
    /// A single lock clears at most 4 lines since no piece is taller than 4 rows.
    pub const fn record_lock(&mut self, cleared_lines: usize) {
        self.locked_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if cleared_lines < self.line_clear_histogram.len() {
            self.line_clear_histogram[cleared_lines] += 1;
        }
    }
}
