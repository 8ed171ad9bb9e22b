use std::{iter, time::Duration};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::style;

/// Score and elapsed play time.
#[derive(Debug)]
pub struct StatsDisplay<'a> {
    score: usize,
    elapsed: Duration,
    block: Option<BlockWidget<'a>>,
}

const ROWS: u16 = 5;

impl<'a> StatsDisplay<'a> {
    pub fn new(score: usize, elapsed: Duration) -> Self {
        Self {
            score,
            elapsed,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        14 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        ROWS + super::block_vertical_margin(self.block.as_ref())
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!(
        "{:0}:{:0>2}.{:0>2}",
        elapsed.as_secs() / 60,
        elapsed.as_secs() % 60,
        elapsed.subsec_millis() / 10
    )
}

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;
        let lines = [
            Line::styled("SCORE:", style).left_aligned(),
            Line::styled(self.score.to_string(), style).right_aligned(),
            Line::default(),
            Line::styled("TIME:", style).left_aligned(),
            Line::styled(format_elapsed(self.elapsed), style).right_aligned(),
        ];
        let row_areas = area.layout::<{ ROWS as usize }>(&Layout::vertical(
            (0..ROWS).map(|_| Constraint::Length(1)),
        ));
        for (line, row_area) in iter::zip(lines, row_areas) {
            line.render(row_area, buf);
        }
    }
}
