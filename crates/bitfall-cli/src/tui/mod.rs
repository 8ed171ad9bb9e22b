//! Minimal terminal application runtime: a fixed-rate tick loop that renders on change.

mod app;
mod event;
mod event_loop;
mod runner;

pub use self::{app::App, runner::Tui};
