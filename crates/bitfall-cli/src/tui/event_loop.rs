use std::time::{Duration, Instant};

use crossterm::event;

use crate::tui::event::TuiEvent;

/// Event loop state management.
///
/// Yields a `Tick` every tick interval, a `Render` whenever something happened since the
/// last render, and terminal events in between. Without a tick interval only terminal events
/// (and the renders they cause) are produced.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    last_tick: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub fn new() -> Self {
        Self {
            tick_interval: None,
            last_tick: Instant::now(),
            dirty: true, // Initial render is required on startup
        }
    }

    /// Sets the tick interval.
    ///
    /// Pass `None` to disable tick events.
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    /// Returns the next event.
    ///
    /// Blocks until the next tick is due or a crossterm event occurs.
    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(tick_interval) = self.tick_interval
                && now.duration_since(self.last_tick) >= tick_interval
            {
                // Schedule from the previous deadline so the tick rate does not drift
                self.last_tick += tick_interval;
                if now.duration_since(self.last_tick) >= tick_interval {
                    self.last_tick = now;
                }
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            if self.dirty {
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            let timeout = self
                .tick_interval
                .map(|interval| (self.last_tick + interval).saturating_duration_since(now));
            if let Some(timeout) = timeout
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }
}
