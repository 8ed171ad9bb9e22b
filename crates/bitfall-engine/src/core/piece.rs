use std::{iter, ops::Range};

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::{BOARD_WIDTH, SIGNED_BOARD_WIDTH, board_mask::BoardMask, collision::collides};

const PIECE_SPAWN_X: i32 = 5;
const PIECE_SPAWN_Y: i32 = 0;

/// Kick offsets `(dx, dy)` tried, in order, when a rotation collides in place.
///
/// Only the first offset that yields a collision-free placement is used.
pub const KICK_OFFSETS: [(i32, i32); 9] = [
    (1, 0),
    (2, 0),
    (-1, 0),
    (-2, 0),
    (0, -1),
    (0, -2),
    (-1, -1),
    (-1, -2),
    (1, -2),
];

/// A falling piece: kind, orientation and anchor.
///
/// Pieces are plain values. Movement and rotation return new `Piece`s and never look at the
/// board; use [`Piece::collides_with`] or [`Piece::rotated_with_kicks`] to validate them.
///
/// # Example
///
/// ```
/// use bitfall_engine::{BoardMask, Piece, PieceKind};
///
/// let board = BoardMask::EMPTY;
/// let piece = Piece::new(PieceKind::T);
/// let moved = piece.left();
/// assert!(!moved.collides_with(&board));
///
/// let rotated = moved.rotated_with_kicks(&board).unwrap();
/// assert_eq!(rotated.rotation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Piece {
    /// Creates a piece of `kind` at the spawn anchor in its spawn orientation.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            position: PiecePosition::SPAWN_POSITION,
            rotation: PieceRotation::default(),
            kind,
        }
    }

    #[must_use]
    pub fn with_placement(
        kind: PieceKind,
        rotation: PieceRotation,
        position: PiecePosition,
    ) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn pattern(&self) -> PiecePattern {
        self.kind.pattern(self.rotation)
    }

    /// Cells covered by this piece, as a board mask.
    #[must_use]
    pub fn mask(&self) -> BoardMask {
        self.pattern()
            .to_board_mask(self.position.x(), self.position.y())
    }

    /// Returns whether this placement leaves the board or overlaps `board`.
    #[must_use]
    pub fn collides_with(&self, board: &BoardMask) -> bool {
        collides(self.pattern(), board, self.position.x(), self.position.y())
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.offset(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.offset(1, 0)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.offset(0, 1)
    }

    #[must_use]
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: self.position.offset(dx, dy),
            ..*self
        }
    }

    /// Advances to the next orientation without any collision check.
    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }

    /// Rotates to the next orientation, kicking the piece if it collides in place.
    ///
    /// The rotated piece is tried at the current anchor first, then at each of
    /// [`KICK_OFFSETS`] in order. Returns the first placement that does not collide with
    /// `board`, or `None` if every candidate collides; the caller keeps the original piece in
    /// that case.
    #[must_use]
    pub fn rotated_with_kicks(&self, board: &BoardMask) -> Option<Self> {
        let rotated = self.rotated_right();
        iter::once((0, 0))
            .chain(KICK_OFFSETS)
            .map(|(dx, dy)| rotated.offset(dx, dy))
            .find(|candidate| !candidate.collides_with(board))
    }
}

/// Anchor of a piece: the board coordinate of its 4×4 bounding box's top-left cell.
///
/// Coordinates are signed. A piece may legally sit at a negative `x` when the leftmost
/// columns of its pattern are empty, and at a negative `y` after an upward kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    pub const SPAWN_POSITION: Self = Self::new(PIECE_SPAWN_X, PIECE_SPAWN_Y);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Orientation index of a piece, always in `0..4`.
///
/// Index 0 is the spawn orientation; each right rotation advances by one, wrapping modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PieceRotation(u8);

impl PieceRotation {
    /// Creates a rotation from any index, taken modulo 4.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The seven piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    J = 1,
    L = 2,
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Position of this kind in [`Self::ALL`]; used to index per-kind tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Occupancy pattern of this kind in the given orientation.
    #[must_use]
    pub const fn pattern(self, rotation: PieceRotation) -> PiecePattern {
        PIECE_PATTERNS[self.index()][rotation.index()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::Z.as_char(), 'Z');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// One orientation of a piece as a 4×4 occupancy grid.
///
/// Bit `row * 4 + col` is set when cell `(row, col)` of the bounding box is occupied, so the
/// lowest nibble is the top row and bit 0 of each nibble is the leftmost column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PiecePattern(u16);

impl PiecePattern {
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_occupied(self, row: usize, col: usize) -> bool {
        row < 4 && col < 4 && self.0 & (1 << (row * 4 + col)) != 0
    }

    /// Iterates over the occupied `(row, col)` cells, row-major.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (0..16)
            .filter(move |bit| self.0 & (1 << bit) != 0)
            .map(|bit| (bit / 4, bit % 4))
    }

    /// Occupied cells as signed `(row, col)` offsets from the anchor.
    pub fn cell_offsets(self) -> impl Iterator<Item = (i32, i32)> {
        (0..16_i32)
            .filter(move |bit| self.0 & (1 << bit) != 0)
            .map(|bit| (bit / 4, bit % 4))
    }

    /// Rows and columns spanned by the occupied cells.
    ///
    /// Both ranges are empty for an empty pattern.
    #[must_use]
    pub fn extent(self) -> (Range<usize>, Range<usize>) {
        self.cells()
            .map(|(row, col)| (row..row + 1, col..col + 1))
            .reduce(|(rows, cols), (row, col)| {
                (
                    rows.start.min(row.start)..rows.end.max(row.end),
                    cols.start.min(col.start)..cols.end.max(col.end),
                )
            })
            .unwrap_or((0..0, 0..0))
    }

    /// Places this pattern on a board-sized mask with its top-left corner at `(x, y)`.
    ///
    /// Cell `(r, c)` lands on index `(y + r) * BOARD_WIDTH + (x + c)`. The pattern is laid out
    /// at the origin and shifted by the composite offset `x + y * BOARD_WIDTH`; a negative
    /// offset shifts the other way instead of failing. Nothing is clipped against the walls:
    /// cells are only dropped when they fall outside the index range of the board.
    #[must_use]
    pub fn to_board_mask(self, x: i32, y: i32) -> BoardMask {
        let mut origin = BoardMask::EMPTY;
        for (row, col) in self.cells() {
            origin.set(row * BOARD_WIDTH + col);
        }
        // Far-off anchors saturate, and any offset of a whole board or more empties the mask
        let offset = y.saturating_mul(SIGNED_BOARD_WIDTH).saturating_add(x);
        isize::try_from(offset).map_or(BoardMask::EMPTY, |offset| origin.shifted(offset))
    }
}

const PIECE_PATTERNS: [[PiecePattern; 4]; PieceKind::LEN] = {
    const fn p(bits: [u16; 4]) -> [PiecePattern; 4] {
        [
            PiecePattern(bits[0]),
            PiecePattern(bits[1]),
            PiecePattern(bits[2]),
            PiecePattern(bits[3]),
        ]
    }

    [
        // I-piece
        p([0x0F00, 0x2222, 0x00F0, 0x4444]),
        // J-piece
        p([0x0470, 0x0322, 0x0071, 0x0226]),
        // L-piece
        p([0x0170, 0x0223, 0x0074, 0x0622]),
        // O-piece
        p([0x0066, 0x0066, 0x0066, 0x0066]),
        // S-piece
        p([0x0360, 0x0231, 0x0036, 0x0462]),
        // T-piece
        p([0x0270, 0x0232, 0x0072, 0x0262]),
        // Z-piece
        p([0x0630, 0x0132, 0x0063, 0x0264]),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SIGNED_BOARD_HEIGHT;

    fn all_rotations() -> impl Iterator<Item = PieceRotation> {
        (0..4).map(PieceRotation::new)
    }

    #[test]
    fn test_every_pattern_has_four_cells() {
        for kind in PieceKind::ALL {
            for rotation in all_rotations() {
                let pattern = kind.pattern(rotation);
                assert_eq!(
                    pattern.cells().count(),
                    4,
                    "{kind:?} rotation {} should occupy 4 cells",
                    rotation.index()
                );
            }
        }
    }

    #[test]
    fn test_rotation_wraps_modulo_four() {
        assert_eq!(PieceRotation::new(5), PieceRotation::new(1));
        let mut rotation = PieceRotation::default();
        for _ in 0..4 {
            rotation = rotation.rotated_right();
        }
        assert_eq!(rotation, PieceRotation::default());
    }

    #[test]
    fn test_pattern_extent() {
        let (rows, cols) = PieceKind::I.pattern(PieceRotation::default()).extent();
        assert_eq!((rows, cols), (2..3, 0..4));
        let (rows, cols) = PieceKind::O.pattern(PieceRotation::default()).extent();
        assert_eq!((rows, cols), (0..2, 1..3));
        assert_eq!(PiecePattern::default().extent(), (0..0, 0..0));
    }

    #[test]
    fn test_codec_round_trip() {
        for kind in PieceKind::ALL {
            for rotation in all_rotations() {
                let pattern = kind.pattern(rotation);
                for y in 0..=12 {
                    for x in 0..=6 {
                        let mask = pattern.to_board_mask(x, y);
                        assert_eq!(mask.count_ones(), 4);
                        assert_eq!(
                            mask.extract_pattern(x, y),
                            pattern,
                            "{kind:?} rotation {} at ({x}, {y})",
                            rotation.index()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_codec_cell_addressing() {
        let pattern = PieceKind::T.pattern(PieceRotation::default());
        let mask = pattern.to_board_mask(3, 7);
        for (row, col) in pattern.cells() {
            let index = (7 + row) * BOARD_WIDTH + 3 + col;
            assert!(mask.is_occupied(index), "cell ({row}, {col}) not at {index}");
        }
    }

    #[test]
    fn test_codec_negative_offset_shifts_right() {
        let pattern = PieceKind::O.pattern(PieceRotation::default());

        // x = -1: composite offset -1, cells (r, 1..=2) land on columns 0..=1
        let mask = pattern.to_board_mask(-1, 0);
        assert_eq!(mask.count_ones(), 4);
        for index in [0, 1, BOARD_WIDTH, BOARD_WIDTH + 1] {
            assert!(mask.is_occupied(index));
        }

        // y = -1: the top pattern row falls off the board
        let mask = pattern.to_board_mask(0, -1);
        assert_eq!(mask.count_ones(), 2);
        assert!(mask.is_occupied(1));
        assert!(mask.is_occupied(2));

        assert!(pattern.to_board_mask(0, -SIGNED_BOARD_HEIGHT).is_empty());
        assert!(pattern.to_board_mask(0, 160).is_empty());
        assert!(pattern.to_board_mask(i32::MAX, i32::MAX).is_empty());
        assert!(pattern.to_board_mask(i32::MIN, i32::MIN).is_empty());
    }

    #[test]
    fn test_o_piece_rotation_never_kicks() {
        let board = BoardMask::EMPTY;
        let mut piece = Piece::new(PieceKind::O);
        for i in 1..=4 {
            let rotated = piece.rotated_with_kicks(&board).unwrap();
            assert_eq!(rotated.position(), piece.position());
            assert_eq!(rotated.rotation().index(), i % 4);
            piece = rotated;
        }
    }

    // Vertical I-piece flush against the left wall: only column 0 is occupied.
    fn i_piece_on_left_wall() -> Piece {
        Piece::with_placement(
            PieceKind::I,
            PieceRotation::new(1),
            PiecePosition::new(-1, 10),
        )
    }

    #[test]
    fn test_rotation_against_left_wall_kicks_right() {
        let board = BoardMask::EMPTY;
        let piece = i_piece_on_left_wall();
        assert!(!piece.collides_with(&board));
        assert!(piece.rotated_right().collides_with(&board));

        let rotated = piece.rotated_with_kicks(&board).unwrap();
        assert_eq!(rotated.rotation().index(), 2);
        assert_eq!(rotated.position(), PiecePosition::new(0, 10));
    }

    #[test]
    fn test_rotation_kick_priority_order() {
        // (+1, 0) is blocked, (+2, 0) is the first free offset
        let board = BoardMask::from_ascii(
            r"
            #.........
            ..........
            ..........
            ..........
            ..........
            ",
        );
        let rotated = i_piece_on_left_wall().rotated_with_kicks(&board).unwrap();
        assert_eq!(rotated.position(), PiecePosition::new(1, 10));

        // Every horizontal kick is blocked, so the upward kicks are reached
        let board = BoardMask::from_ascii(
            r"
            ...#......
            ..........
            ..........
            ..........
            ..........
            ",
        );
        let rotated = i_piece_on_left_wall().rotated_with_kicks(&board).unwrap();
        assert_eq!(rotated.position(), PiecePosition::new(0, 8));
    }

    #[test]
    fn test_rotation_rejected_when_every_kick_collides() {
        let board = BoardMask::from_ascii(
            r"
            ..#.......
            ..........
            ...#......
            ..........
            ..........
            ..........
            ..........
            ",
        );
        assert_eq!(i_piece_on_left_wall().rotated_with_kicks(&board), None);
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
        assert_eq!(PieceKind::from_char('i'), None);
    }

    #[test]
    fn test_piece_kind_index_matches_all() {
        for (i, kind) in PieceKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
