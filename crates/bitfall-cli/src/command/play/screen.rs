use std::{mem, time::Duration};

use bitfall_engine::{GameClock, Intents};
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Text,
};

use crate::view::widgets::{SessionDisplay, style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
enum PlayState {
    Playing,
    Paused,
}

/// Interactive game screen: the keyboard input producer and the rendering consumer.
#[derive(Debug)]
pub struct PlayScreen {
    clock: GameClock,
    pending: Intents,
    state: PlayState,
    tick_rate: u64,
    ticks: u64,
    is_exiting: bool,
}

impl PlayScreen {
    pub fn new(clock: GameClock, tick_rate: u64) -> Self {
        Self {
            clock,
            pending: Intents::NONE,
            state: PlayState::Playing,
            tick_rate,
            ticks: 0,
            is_exiting: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.is_exiting && self.state.is_playing()
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    /// Play time of the current game.
    fn elapsed(&self) -> Duration {
        const NANOS_PER_SEC: u64 = 1_000_000_000;
        let secs = self.ticks / self.tick_rate;
        let nanos = (self.ticks % self.tick_rate) * NANOS_PER_SEC / self.tick_rate;
        Duration::from_secs(secs) + Duration::from_nanos(nanos)
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let session_display =
            SessionDisplay::new(&self.clock, self.elapsed()).paused(self.state.is_paused());
        let help_text = if self.clock.is_game_over() {
            "Controls: → (Restart) | Q (Quit)"
        } else if self.state.is_paused() {
            "Controls: P (Resume) | Q (Quit)"
        } else {
            "Controls: ← → (Move) | ↑ (Rotate) | ↓ (Soft Drop) | P (Pause) | Q (Quit)"
        };
        let help_text = Text::from(help_text).style(style::HELP).centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(19), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help_text, help_area);
    }

    /// Records key presses as intents for the next tick.
    ///
    /// Only press events count, so holding a key does not repeat it, and pressing it several
    /// times within one tick yields a single intent.
    pub fn handle_event(&mut self, event: &Event) {
        let is_playing = self.is_playing();
        let can_toggle_pause = !self.clock.is_game_over();

        let Some(key) = event.as_key_press_event() else {
            return;
        };
        let intent = match key.code {
            KeyCode::Left if is_playing => Intents {
                move_left: true,
                ..Intents::NONE
            },
            KeyCode::Right if is_playing => Intents {
                move_right: true,
                ..Intents::NONE
            },
            KeyCode::Up if is_playing => Intents {
                rotate: true,
                ..Intents::NONE
            },
            KeyCode::Down if is_playing => Intents {
                soft_drop: true,
                ..Intents::NONE
            },
            KeyCode::Char('p') if can_toggle_pause => {
                self.toggle_pause();
                return;
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.is_exiting = true;
                return;
            }
            _ => return,
        };
        self.pending = self.pending.merged(intent);
    }

    fn toggle_pause(&mut self) {
        self.state = match self.state {
            PlayState::Playing => PlayState::Paused,
            PlayState::Paused => PlayState::Playing,
        };
        self.pending = Intents::NONE;
    }

    /// Feeds the intents gathered since the last tick to the clock.
    pub fn update(&mut self) {
        let intents = mem::take(&mut self.pending);
        let event = self.clock.tick(intents);
        if event.is_restarted() {
            self.ticks = 0;
        }
        if !self.clock.is_game_over() {
            self.ticks += 1;
        }
    }
}
