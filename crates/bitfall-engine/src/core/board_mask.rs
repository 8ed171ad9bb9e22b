use std::{
    fmt::Write as _,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

use serde::{Deserialize, Serialize};

use super::{BOARD_HEIGHT, BOARD_WIDTH, CELL_COUNT, SIGNED_BOARD_WIDTH, piece::PiecePattern};

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = CELL_COUNT.div_ceil(WORD_BITS);
// Bits of the last word that map onto board cells; the rest must stay zero.
const LAST_WORD_MASK: u64 = {
    let used = CELL_COUNT - WORD_BITS * (WORDS - 1);
    if used == WORD_BITS {
        u64::MAX
    } else {
        (1 << used) - 1
    }
};
const ROW_MASK: u64 = (1 << BOARD_WIDTH) - 1;

/// Board-sized occupancy surface.
///
/// The board is a linear bit array of `BOARD_WIDTH * BOARD_HEIGHT` cells where cell
/// `(row, col)` lives at bit `row * BOARD_WIDTH + col`. Row 0 is the top of the board, so
/// "moving down one row" is a left shift by `BOARD_WIDTH`.
///
/// Bits are packed little-endian into `u64` words. Bits past the last cell are never set:
/// every operation that can produce them truncates.
///
/// # Example
///
/// ```
/// use bitfall_engine::{BOARD_WIDTH, BoardMask};
///
/// let mut mask = BoardMask::EMPTY;
/// mask.set(3);
/// let below = mask.shifted(BOARD_WIDTH as isize);
/// assert!(below.is_occupied(3 + BOARD_WIDTH));
/// assert_eq!(below.count_ones(), 1);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardMask {
    words: [u64; WORDS],
}

impl BoardMask {
    pub const EMPTY: Self = Self { words: [0; WORDS] };

    const fn from_low_word(word: u64) -> Self {
        let mut words = [0; WORDS];
        words[0] = word;
        Self { words }
    }

    /// Mask with every cell whose index is below `n` set.
    fn low_bits(n: usize) -> Self {
        let mut words = [0; WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            let start = i * WORD_BITS;
            if n >= start + WORD_BITS {
                *word = u64::MAX;
            } else if n > start {
                *word = (1 << (n - start)) - 1;
            }
        }
        Self { words }.truncated()
    }

    /// Mask covering every cell of `row`.
    #[must_use]
    pub fn row_mask(row: usize) -> Self {
        assert!(row < BOARD_HEIGHT, "row {row} out of range");
        Self::from_low_word(ROW_MASK).shl(row * BOARD_WIDTH)
    }

    fn truncated(mut self) -> Self {
        self.words[WORDS - 1] &= LAST_WORD_MASK;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.words.iter().zip(&other.words).any(|(a, b)| a & b != 0)
    }

    /// Returns whether the cell at linear `index` is set.
    ///
    /// Indices outside the board read as empty.
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        if index >= CELL_COUNT {
            return false;
        }
        self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    /// Sets the cell at linear `index`.
    pub fn set(&mut self, index: usize) {
        assert!(index < CELL_COUNT, "cell index {index} out of range");
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }

    /// Returns the `BOARD_WIDTH` bits of `row`, column 0 in the least significant bit.
    #[must_use]
    pub fn row_bits(&self, row: usize) -> u16 {
        assert!(row < BOARD_HEIGHT, "row {row} out of range");
        (self.shr(row * BOARD_WIDTH).words[0] & ROW_MASK) as u16
    }

    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        u64::from(self.row_bits(row)) == ROW_MASK
    }

    /// Shifts every cell by `offset` linear positions.
    ///
    /// A positive offset moves cells toward higher indices (right, then down); a negative offset
    /// shifts the other way by the same magnitude. Cells pushed past either end are dropped.
    #[must_use]
    pub fn shifted(self, offset: isize) -> Self {
        if offset >= 0 {
            self.shl(offset.unsigned_abs())
        } else {
            self.shr(offset.unsigned_abs())
        }
    }

    fn shl(self, n: usize) -> Self {
        if n >= CELL_COUNT {
            return Self::EMPTY;
        }
        let (word_shift, bit_shift) = (n / WORD_BITS, n % WORD_BITS);
        let mut words = [0; WORDS];
        for i in word_shift..WORDS {
            let src = i - word_shift;
            words[i] = self.words[src] << bit_shift;
            if bit_shift > 0 && src > 0 {
                words[i] |= self.words[src - 1] >> (WORD_BITS - bit_shift);
            }
        }
        Self { words }.truncated()
    }

    fn shr(self, n: usize) -> Self {
        if n >= CELL_COUNT {
            return Self::EMPTY;
        }
        let (word_shift, bit_shift) = (n / WORD_BITS, n % WORD_BITS);
        let mut words = [0; WORDS];
        for i in 0..WORDS - word_shift {
            let src = i + word_shift;
            words[i] = self.words[src] >> bit_shift;
            if bit_shift > 0 && src + 1 < WORDS {
                words[i] |= self.words[src + 1] << (WORD_BITS - bit_shift);
            }
        }
        Self { words }
    }

    /// Removes `row` and moves every row above it down by one.
    ///
    /// Rows below `row` are untouched and row 0 becomes empty.
    #[must_use]
    pub fn collapse_row(self, row: usize) -> Self {
        assert!(row < BOARD_HEIGHT, "row {row} out of range");
        let above = self & Self::low_bits(row * BOARD_WIDTH);
        let below = self & !Self::low_bits((row + 1) * BOARD_WIDTH);
        below | above.shl(BOARD_WIDTH)
    }

    /// Reads back the 4×4 window anchored at `(x, y)`.
    ///
    /// Uses the same `(y + r) * BOARD_WIDTH + (x + c)` addressing as
    /// [`PiecePattern::to_board_mask`]; cells addressing outside the board read as empty.
    #[must_use]
    pub fn extract_pattern(&self, x: i32, y: i32) -> PiecePattern {
        let mut bits = 0u16;
        for r in 0..4 {
            for c in 0..4 {
                let index = (y + r) * SIGNED_BOARD_WIDTH + (x + c);
                if let Ok(index) = usize::try_from(index)
                    && self.is_occupied(index)
                {
                    bits |= 1 << (r * 4 + c);
                }
            }
        }
        PiecePattern::from_bits(bits)
    }

    /// Creates a mask from ASCII art, for tests and fixtures.
    ///
    /// `#` is an occupied cell and `.` an empty one; each line must hold exactly
    /// `BOARD_WIDTH` cells. Lines are given top to bottom and are aligned to the bottom of the
    /// board, so a three-line picture describes rows 13 to 15.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "at most {BOARD_HEIGHT} rows expected, got {}",
            lines.len()
        );
        let top = BOARD_HEIGHT - lines.len();
        let mut mask = Self::EMPTY;
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                BOARD_WIDTH,
                "each row must have exactly {BOARD_WIDTH} cells, got {} at line {i}",
                cells.len()
            );
            for (col, _) in cells.iter().enumerate().filter(|(_, c)| **c == '#') {
                mask.set((top + i) * BOARD_WIDTH + col);
            }
        }
        mask
    }
}

impl BitOr for BoardMask {
    type Output = Self;

    fn bitor(mut self, rhs: Self) -> Self {
        self |= rhs;
        self
    }
}

impl BitOrAssign for BoardMask {
    fn bitor_assign(&mut self, rhs: Self) {
        for (a, b) in self.words.iter_mut().zip(rhs.words) {
            *a |= b;
        }
    }
}

impl BitAnd for BoardMask {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self {
        self &= rhs;
        self
    }
}

impl BitAndAssign for BoardMask {
    fn bitand_assign(&mut self, rhs: Self) {
        for (a, b) in self.words.iter_mut().zip(rhs.words) {
            *a &= b;
        }
    }
}

impl Not for BoardMask {
    type Output = Self;

    fn not(mut self) -> Self {
        for w in &mut self.words {
            *w = !*w;
        }
        self.truncated()
    }
}

impl Serialize for BoardMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "000,000,...,3ff" (one 3-digit hex value per row, top to bottom)
        let mut hex_string = String::with_capacity(BOARD_HEIGHT * 4);
        for row in 0..BOARD_HEIGHT {
            if row > 0 {
                hex_string.push(',');
            }
            write!(&mut hex_string, "{:03x}", self.row_bits(row)).map_err(serde::ser::Error::custom)?;
        }
        serializer.serialize_str(&hex_string)
    }
}

impl<'de> Deserialize<'de> for BoardMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != BOARD_HEIGHT {
            return Err(serde::de::Error::custom(format!(
                "expected {BOARD_HEIGHT} comma-separated hex values, got {}",
                parts.len()
            )));
        }

        let mut mask = Self::EMPTY;
        for (row, hex_str) in parts.iter().enumerate() {
            let bits = u64::from_str_radix(hex_str, 16).map_err(|e| {
                serde::de::Error::custom(format!("invalid hex at row {row}: {hex_str} ({e})"))
            })?;
            if bits & !ROW_MASK != 0 {
                return Err(serde::de::Error::custom(format!(
                    "row {row} has bits outside the board: {hex_str}"
                )));
            }
            mask |= Self::from_low_word(bits).shl(row * BOARD_WIDTH);
        }
        Ok(mask)
    }
}
