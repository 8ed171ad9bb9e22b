//! Bit-packed board and piece primitives.
//!
//! Everything in this module is pure data plus stateless operations on it:
//!
//! - [`BoardMask`] - 160-bit occupancy surface (`index = row * 10 + col`)
//! - [`PiecePattern`] - 4×4 occupancy grid of one orientation, and the codec placing it on a board
//! - [`Piece`] - kind + orientation + anchor, with movement and kicked rotation
//! - [`collides`] - boundary and overlap test
//! - [`find_full_rows`] / [`collapse`] - line-clear detection and compaction
//! - [`SettledBoard`] - per-kind locked cells plus their union

pub use self::{board_mask::*, collision::*, line_clear::*, piece::*, settled_board::*};

mod board_mask;
mod collision;
mod line_clear;
mod piece;
mod settled_board;

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows on the board.
pub const BOARD_HEIGHT: usize = 16;
/// Number of addressable cells (`BOARD_WIDTH * BOARD_HEIGHT`).
pub const CELL_COUNT: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// [`BOARD_WIDTH`] in signed anchor coordinates.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) const SIGNED_BOARD_WIDTH: i32 = BOARD_WIDTH as i32;
/// [`BOARD_HEIGHT`] in signed anchor coordinates.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) const SIGNED_BOARD_HEIGHT: i32 = BOARD_HEIGHT as i32;
