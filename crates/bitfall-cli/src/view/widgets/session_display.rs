use std::time::Duration;

use bitfall_engine::GameClock;
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::view::widgets::{BoardDisplay, PieceDisplay, StatsDisplay, style};

/// Full game view: stats on the left, the board in the middle, the next piece on the right.
///
/// Only reads the clock's rendering accessors.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    clock: &'a GameClock,
    elapsed: Duration,
    paused: bool,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(clock: &'a GameClock, elapsed: Duration) -> Self {
        Self {
            clock,
            elapsed,
            paused: false,
        }
    }

    pub fn paused(self, paused: bool) -> Self {
        Self { paused, ..self }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block_padding = Padding::horizontal(1);
        let border_style = if self.clock.is_game_over() {
            style::BORDER_GAME_OVER
        } else if self.paused {
            style::BORDER_PAUSED
        } else {
            style::BORDER_PLAYING
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let game_board = {
            let widget = BoardDisplay::new(self.clock.kind_masks()).block(
                Block::bordered()
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
            match (self.clock.active_mask(), self.clock.active_kind()) {
                (Some(mask), Some(kind)) => widget.active_piece(mask, kind),
                _ => widget,
            }
        };
        let next_panel = PieceDisplay::new()
            .piece(self.clock.next_kind())
            .block(panel("NEXT"));
        let stats = StatsDisplay::new(self.clock.score(), self.elapsed).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] =
            Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let game_board_width = game_board.width();
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        let popup = if self.clock.is_game_over() {
            Some((
                vec![Line::from("GAME OVER!!"), Line::from("→ to restart")],
                style::GAME_OVER_POPUP,
            ))
        } else if self.paused {
            Some((vec![Line::from("PAUSED")], style::PAUSED_POPUP))
        } else {
            None
        };

        if let Some((lines, popup_style)) = popup {
            #[expect(clippy::cast_possible_truncation)]
            let text_height = lines.len() as u16;
            let block = Block::new().style(popup_style);
            let text = Text::from(lines).style(popup_style).centered();
            let area = board_area.centered(
                Constraint::Length(game_board_width),
                Constraint::Length(text_height + 2),
            );
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(
                inner.centered_vertically(Constraint::Length(text_height)),
                buf,
            );
        }
    }
}
