use bitfall_engine::{PieceKind, PieceRotation};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::CellDisplay;

/// A single piece in its spawn orientation, cropped to its occupied cells.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: PieceKind) -> Self {
        Self {
            piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * CellDisplay::WIDTH + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * CellDisplay::HEIGHT + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    #[expect(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(piece) = self.piece else {
            return;
        };
        let pattern = piece.pattern(PieceRotation::default());
        let (rows, cols) = pattern.extent();

        let piece_area = area.centered(
            Constraint::Length(cols.len() as u16 * CellDisplay::WIDTH),
            Constraint::Length(rows.len() as u16 * CellDisplay::HEIGHT),
        );
        let col_constraints = cols.clone().map(|_| Constraint::Length(CellDisplay::WIDTH));
        let row_constraints = rows.clone().map(|_| Constraint::Length(CellDisplay::HEIGHT));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        let occupied = CellDisplay::piece(piece);
        let empty = CellDisplay::empty(false);
        for (row, grid_row) in rows.zip(grid_rows) {
            for (col, grid_cell) in cols.clone().zip(grid_row) {
                let cell = if pattern.is_occupied(row, col) {
                    &occupied
                } else {
                    &empty
                };
                cell.render(grid_cell, buf);
            }
        }
    }
}
