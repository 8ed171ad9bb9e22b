use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Tui;

/// Trait for TUI applications.
///
/// Applications executed by `Tui::run()` must implement this trait.
pub trait App {
    /// Initializes the application.
    ///
    /// Called at the start of `Tui::run()`. Use this to configure the tick rate.
    fn init(&mut self, tui: &mut Tui);

    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, etc.).
    fn handle_event(&mut self, tui: &mut Tui, event: &Event);

    /// Draws the screen.
    fn draw(&self, frame: &mut Frame);

    /// Advances the application by one tick.
    fn update(&mut self, tui: &mut Tui);
}
