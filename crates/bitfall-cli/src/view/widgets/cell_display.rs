use bitfall_engine::PieceKind;
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use crate::view::widgets::style;

/// One board cell, two terminal columns wide.
#[derive(Debug)]
pub struct CellDisplay {
    style: Style,
    symbol: &'static str,
}

impl CellDisplay {
    pub const WIDTH: u16 = 2;
    pub const HEIGHT: u16 = 1;

    const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    /// An empty cell; `show_dot` marks it with a dot, as on the board grid.
    pub const fn empty(show_dot: bool) -> Self {
        if show_dot {
            Self::new(style::EMPTY_DOT, ".")
        } else {
            Self::new(style::EMPTY, "")
        }
    }

    pub const fn piece(kind: PieceKind) -> Self {
        let style = match kind {
            PieceKind::I => style::I_BLOCK,
            PieceKind::O => style::O_BLOCK,
            PieceKind::S => style::S_BLOCK,
            PieceKind::Z => style::Z_BLOCK,
            PieceKind::J => style::J_BLOCK,
            PieceKind::L => style::L_BLOCK,
            PieceKind::T => style::T_BLOCK,
        };
        Self::new(style, "")
    }

    pub fn from_kind(kind: Option<PieceKind>) -> Self {
        kind.map_or(Self::empty(true), Self::piece)
    }
}

impl Widget for &CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        // Use a Paragraph to fill the whole area, not just the cells with the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_distinct_color() {
        let styles: Vec<Style> = PieceKind::ALL
            .into_iter()
            .map(|kind| CellDisplay::piece(kind).style)
            .collect();
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(CellDisplay::from_kind(None).style, style::EMPTY_DOT);
    }
}
