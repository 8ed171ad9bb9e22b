use super::{SIGNED_BOARD_HEIGHT, SIGNED_BOARD_WIDTH, board_mask::BoardMask, piece::PiecePattern};

/// Returns whether `pattern` anchored at `(x, y)` cannot be placed on `board`.
///
/// A placement collides when any occupied cell lands left of column 0, right of the last
/// column or below the last row, or when it overlaps an occupied cell of `board`. There is no
/// upper bound: cells above row 0 are ignored, which lets a kicked piece poke out of the top.
#[must_use]
pub fn collides(pattern: PiecePattern, board: &BoardMask, x: i32, y: i32) -> bool {
    let out_of_bounds = pattern.cell_offsets().any(|(row, col)| {
        let (board_x, board_y) = (x + col, y + row);
        board_x < 0 || board_x >= SIGNED_BOARD_WIDTH || board_y >= SIGNED_BOARD_HEIGHT
    });
    out_of_bounds || pattern.to_board_mask(x, y).intersects(board)
}
