use serde::Serialize;

use super::GameRules;

/// Points per cleared row.
const POINTS_PER_ROW: usize = 100;

/// Score and difficulty bookkeeping of one game.
///
/// - **Score**: 100 points per cleared row, no multi-row bonus
/// - **Fall speed**: starts at the rules' initial speed and grows by a fixed increment once
///   per lock that cleared at least one row, up to the rules' maximum
/// - **Line clear distribution**: how many locks cleared 0, 1, 2, 3 or 4 rows
///
/// Score and fall speed never decrease within a game.
///
/// # Example
///
/// ```
/// use bitfall_engine::{GameRules, GameStats};
///
/// let rules = GameRules::DEFAULT;
/// let mut stats = GameStats::new(&rules);
/// stats.complete_piece_drop(2, &rules);
///
/// assert_eq!(stats.score(), 200);
/// assert_eq!(stats.fall_speed(), 25);
/// assert_eq!(stats.line_cleared_counter()[2], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: usize,
    fall_speed: u32,
    locked_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new(rules: &GameRules) -> Self {
        Self {
            score: 0,
            fall_speed: rules.initial_fall_speed,
            locked_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Current fall speed in milli-rows per tick.
    #[must_use]
    pub const fn fall_speed(&self) -> u32 {
        self.fall_speed
    }

    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of locks by cleared rows; index `n` counts locks that cleared `n` rows.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records a locked piece that cleared `cleared_lines` rows.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize, rules: &GameRules) {
        self.locked_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }
        self.score += POINTS_PER_ROW * cleared_lines;
        if cleared_lines > 0 {
            self.fall_speed = rules.next_fall_speed(self.fall_speed);
        }
    }
}
