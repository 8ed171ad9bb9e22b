use std::iter;

use bitfall_engine::{BOARD_HEIGHT, BOARD_WIDTH, BoardMask, PieceKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use crate::view::widgets::CellDisplay;

/// The playfield: settled cells colored by kind, with the active piece drawn on top.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    kind_masks: &'a [BoardMask; PieceKind::LEN],
    active: Option<(BoardMask, PieceKind)>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(kind_masks: &'a [BoardMask; PieceKind::LEN]) -> Self {
        Self {
            kind_masks,
            active: None,
            block: None,
        }
    }

    pub fn active_piece(self, mask: BoardMask, kind: PieceKind) -> Self {
        Self {
            active: Some((mask, kind)),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u16 {
        BOARD_WIDTH as u16 * CellDisplay::WIDTH + super::block_horizontal_margin(self.block.as_ref())
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        BOARD_HEIGHT as u16 * CellDisplay::HEIGHT + super::block_vertical_margin(self.block.as_ref())
    }

    /// Kind shown at linear board `index`, if any.
    fn kind_at(&self, index: usize) -> Option<PieceKind> {
        if let Some((mask, kind)) = self.active
            && mask.is_occupied(index)
        {
            return Some(kind);
        }
        PieceKind::ALL
            .into_iter()
            .find(|kind| self.kind_masks[kind.index()].is_occupied(index))
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..BOARD_WIDTH).map(|_| Constraint::Length(CellDisplay::WIDTH));
        let row_constraints = (0..BOARD_HEIGHT).map(|_| Constraint::Length(CellDisplay::HEIGHT));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<BOARD_HEIGHT>(&vertical)
            .into_iter()
            .map(|row| row.layout::<BOARD_WIDTH>(&horizontal));

        for (row, grid_row) in iter::zip(0.., grid_cells) {
            for (col, grid_cell) in iter::zip(0.., grid_row) {
                let cell = CellDisplay::from_kind(self.kind_at(row * BOARD_WIDTH + col));
                cell.render(grid_cell, buf);
            }
        }
    }
}
