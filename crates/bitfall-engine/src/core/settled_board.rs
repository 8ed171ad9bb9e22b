use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    board_mask::BoardMask,
    line_clear::{collapse, find_full_rows},
    piece::{Piece, PieceKind},
};

/// Locked cells of the board, tracked per piece kind.
///
/// Keeps one [`BoardMask`] per [`PieceKind`] plus their union. The per-kind masks are pairwise
/// disjoint and the union is always the OR of all of them; collision checks only look at the
/// union, rendering looks at the per-kind masks to pick a color.
///
/// # Example
///
/// ```
/// use bitfall_engine::{Piece, PieceKind, SettledBoard};
///
/// let mut board = SettledBoard::EMPTY;
/// let piece = Piece::new(PieceKind::O);
/// assert!(!board.is_colliding(&piece));
///
/// board.fill_piece(&piece);
/// assert!(board.is_colliding(&piece));
/// assert_eq!(board.kind_mask(PieceKind::O), board.union());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettledBoard {
    kind_masks: [BoardMask; PieceKind::LEN],
    union: BoardMask,
}

impl SettledBoard {
    pub const EMPTY: Self = Self {
        kind_masks: [BoardMask::EMPTY; PieceKind::LEN],
        union: BoardMask::EMPTY,
    };

    /// Union of every locked cell, regardless of kind.
    #[must_use]
    pub fn union(&self) -> &BoardMask {
        &self.union
    }

    #[must_use]
    pub fn kind_mask(&self, kind: PieceKind) -> &BoardMask {
        &self.kind_masks[kind.index()]
    }

    /// Per-kind masks, indexed by [`PieceKind::index`].
    #[must_use]
    pub fn kind_masks(&self) -> &[BoardMask; PieceKind::LEN] {
        &self.kind_masks
    }

    /// Kind of the piece that locked the cell at linear `index`, if any.
    #[must_use]
    pub fn kind_at(&self, index: usize) -> Option<PieceKind> {
        if !self.union.is_occupied(index) {
            return None;
        }
        PieceKind::ALL
            .into_iter()
            .find(|kind| self.kind_mask(*kind).is_occupied(index))
    }

    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        piece.collides_with(&self.union)
    }

    /// Merges `piece` into its kind's mask.
    ///
    /// The piece must not collide with the board.
    pub fn fill_piece(&mut self, piece: &Piece) {
        let mask = piece.mask();
        debug_assert!(
            !mask.intersects(&self.union),
            "locked piece overlaps settled cells"
        );
        self.kind_masks[piece.kind().index()] |= mask;
        self.union |= mask;
    }

    /// Removes every full row and returns how many were removed.
    pub fn clear_lines(&mut self) -> usize {
        let full_rows = find_full_rows(&self.union);
        if full_rows.is_empty() {
            return 0;
        }
        collapse(&mut self.kind_masks, &full_rows);
        self.recompute_union();
        full_rows.len()
    }

    fn recompute_union(&mut self) {
        self.union = self
            .kind_masks
            .iter()
            .fold(BoardMask::EMPTY, |acc, mask| acc | *mask);
    }

    /// Creates a board from ASCII art, for tests and fixtures.
    ///
    /// Each cell is a piece letter (`I`, `J`, `L`, `O`, `S`, `T`, `Z`) or `.` for empty; each
    /// line must hold exactly `BOARD_WIDTH` cells. Lines are aligned to the bottom of the board.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "at most {BOARD_HEIGHT} rows expected, got {}",
            lines.len()
        );
        let top = BOARD_HEIGHT - lines.len();
        let mut board = Self::EMPTY;
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.trim().chars().collect();
            assert_eq!(
                cells.len(),
                BOARD_WIDTH,
                "each row must have exactly {BOARD_WIDTH} cells, got {} at line {i}",
                cells.len()
            );
            for (col, c) in cells.into_iter().enumerate() {
                if c == '.' {
                    continue;
                }
                let kind = PieceKind::from_char(c)
                    .unwrap_or_else(|| panic!("invalid cell {c:?} at line {i}"));
                board.kind_masks[kind.index()].set((top + i) * BOARD_WIDTH + col);
            }
        }
        board.recompute_union();
        board
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;
    use crate::core::{PiecePosition, PieceRotation};

    fn assert_invariants(board: &SettledBoard) {
        let masks = board.kind_masks();
        for (i, a) in masks.iter().enumerate() {
            for b in &masks[i + 1..] {
                assert!(!a.intersects(b), "kind masks must be disjoint");
            }
        }
        let union = masks.iter().fold(BoardMask::EMPTY, |acc, mask| acc | *mask);
        assert_eq!(&union, board.union(), "union must be OR of kind masks");
    }

    #[test]
    fn test_from_ascii_kinds() {
        let board = SettledBoard::from_ascii(
            r"
            I.........
            IJJJ.OOSTZ
            ",
        );
        assert_invariants(&board);
        assert_eq!(board.kind_at(14 * BOARD_WIDTH), Some(PieceKind::I));
        assert_eq!(board.kind_at(15 * BOARD_WIDTH + 2), Some(PieceKind::J));
        assert_eq!(board.kind_at(15 * BOARD_WIDTH + 4), None);
        assert_eq!(board.kind_at(15 * BOARD_WIDTH + 9), Some(PieceKind::Z));
        assert_eq!(board.kind_mask(PieceKind::O).count_ones(), 2);
        assert_eq!(board.union().count_ones(), 10);
    }

    #[test]
    fn test_fill_piece_sets_kind_and_union() {
        let mut board = SettledBoard::EMPTY;
        let piece = Piece::with_placement(
            PieceKind::T,
            PieceRotation::default(),
            PiecePosition::new(3, 13),
        );
        board.fill_piece(&piece);
        assert_invariants(&board);
        assert_eq!(board.kind_mask(PieceKind::T), &piece.mask());
        assert!(board.is_colliding(&piece));
        assert!(!board.is_colliding(&piece.offset(0, -2)));
    }

    #[test]
    fn test_clear_lines_keeps_kinds() {
        let mut board = SettledBoard::from_ascii(
            r"
            S.........
            IIII...JJJ
            ",
        );
        assert_eq!(board.clear_lines(), 0);

        // T pointing up: pattern row 0 col 1, row 1 cols 0..=2
        let piece = Piece::with_placement(
            PieceKind::T,
            PieceRotation::new(2),
            PiecePosition::new(4, 14),
        );
        assert!(!board.is_colliding(&piece));
        board.fill_piece(&piece);
        assert_eq!(board.union().count_ones(), 12);

        assert_eq!(board.clear_lines(), 1);
        assert_invariants(&board);
        let expected = SettledBoard::from_ascii(
            r"
            S....T....
            ",
        );
        assert_eq!(board, expected);
    }

    #[test]
    fn test_random_fills_keep_invariants() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut board = SettledBoard::EMPTY;
        for _ in 0..2000 {
            let kind: PieceKind = rng.random();
            let rotation = PieceRotation::new(rng.random_range(0..4));
            let position = PiecePosition::new(rng.random_range(-1..9), rng.random_range(0..14));
            let piece = Piece::with_placement(kind, rotation, position);
            if board.is_colliding(&piece) {
                continue;
            }
            board.fill_piece(&piece);
            board.clear_lines();
            assert_invariants(&board);
            assert!(find_full_rows(board.union()).is_empty());
        }
    }
}
