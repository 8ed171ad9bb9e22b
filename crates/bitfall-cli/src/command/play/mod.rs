use bitfall_engine::{GameClock, GameRules, PieceSeed, PieceSequencer};

use crate::{command::play::app::PlayApp, tui::Tui};

mod app;
mod screen;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Game ticks per second
    #[clap(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub(super) tick_rate: u64,
    /// Piece seed (32 hex digits); random when omitted
    #[clap(long)]
    pub(super) seed: Option<PieceSeed>,
    /// Initial fall speed in milli-rows per tick
    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=1000))]
    pub(super) initial_fall_speed: Option<u32>,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            seed: None,
            initial_fall_speed: None,
        }
    }
}

/// Builds the clock described by the common game options.
pub(crate) fn new_clock(seed: Option<PieceSeed>, initial_fall_speed: Option<u32>) -> GameClock {
    let mut rules = GameRules::DEFAULT;
    if let Some(speed) = initial_fall_speed {
        rules = rules.with_initial_fall_speed(speed);
    }
    let sequencer = seed.map_or_else(PieceSequencer::new, PieceSequencer::with_seed);
    GameClock::with_sequencer(rules, sequencer)
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        tick_rate,
        seed,
        initial_fall_speed,
    } = arg;

    let clock = new_clock(*seed, *initial_fall_speed);
    let mut app = PlayApp::new(clock, *tick_rate);
    Tui::new().run(&mut app)
}
