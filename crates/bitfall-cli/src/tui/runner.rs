use std::time::Duration;

use crate::tui::{App, event::TuiEvent, event_loop::EventLoop};

/// TUI application runtime.
///
/// Owns the event loop and drives an [`App`] until it asks to exit.
#[derive(Default, Debug)]
pub struct Tui {
    events: EventLoop,
}

impl Tui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick rate (Hz, ticks per second).
    pub fn set_tick_rate(&mut self, rate: f64) {
        self.events
            .set_tick_interval(Some(Duration::from_secs_f64(1.0 / rate)));
    }

    /// Runs the application.
    ///
    /// 1. Calls `app.init()` for initialization
    /// 2. Runs the event loop until `app.should_exit()` returns true
    ///    - `Tick`: calls `app.update()`
    ///    - `Render`: calls `app.draw()`
    ///    - `Crossterm`: calls `app.handle_event()`
    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.update(&mut self),
                    TuiEvent::Render => {
                        terminal.draw(|f| app.draw(f))?;
                    }
                    TuiEvent::Crossterm(event) => app.handle_event(&mut self, &event),
                }
            }
            Ok(())
        })
    }
}
