use arrayvec::ArrayVec;

use super::{BOARD_HEIGHT, board_mask::BoardMask};

/// Returns the fully occupied rows of `union`, in ascending order.
#[must_use]
pub fn find_full_rows(union: &BoardMask) -> ArrayVec<usize, BOARD_HEIGHT> {
    (0..BOARD_HEIGHT)
        .filter(|row| union.is_row_full(*row))
        .collect()
}

/// Removes `full_rows` from every mask in `masks`, moving the rows above each one down.
///
/// `full_rows` must be ascending, as returned by [`find_full_rows`]. Each row is collapsed
/// using its originally detected index: collapsing row `r` only moves rows above `r`, so every
/// later (larger) index still names the same row.
pub fn collapse(masks: &mut [BoardMask], full_rows: &[usize]) {
    debug_assert!(full_rows.is_sorted(), "rows must be ascending");
    for &row in full_rows {
        for mask in masks.iter_mut() {
            *mask = mask.collapse_row(row);
        }
    }
}
