use bitfall_engine::GameClock;
use crossterm::event::Event;
use ratatui::Frame;

use crate::{
    command::play::screen::PlayScreen,
    tui::{App, Tui},
};

#[derive(Debug)]
pub struct PlayApp {
    screen: PlayScreen,
    tick_rate: u64,
}

impl PlayApp {
    pub fn new(clock: GameClock, tick_rate: u64) -> Self {
        Self {
            screen: PlayScreen::new(clock, tick_rate),
            tick_rate,
        }
    }
}

impl App for PlayApp {
    #[expect(clippy::cast_precision_loss)]
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(self.tick_rate as f64);
    }

    fn should_exit(&self) -> bool {
        self.screen.is_exiting()
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: &Event) {
        self.screen.handle_event(event);
    }

    fn draw(&self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn update(&mut self, _tui: &mut Tui) {
        if self.screen.is_playing() {
            self.screen.update();
        }
    }
}
