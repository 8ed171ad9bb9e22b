use std::{
    collections::BTreeMap,
    io::{self, Write as _},
};

use bitfall_engine::{
    BoardMask, GameRules, GameStats, Intents, PieceKind, PieceSeed, TickEvent,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::command::play::new_clock;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of ticks to run
    #[clap(long, default_value_t = 10_000)]
    ticks: u64,
    /// Piece seed (32 hex digits); random when omitted
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Seed of the random input producer; random when omitted
    #[clap(long)]
    input_seed: Option<u64>,
    /// Initial fall speed in milli-rows per tick
    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=1000))]
    initial_fall_speed: Option<u32>,
}

/// Input producer pressing keys at random.
#[derive(Debug)]
struct RandomInput {
    rng: Pcg32,
}

impl RandomInput {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn next_intents(&mut self) -> Intents {
        Intents {
            move_left: self.rng.random_bool(0.1),
            move_right: self.rng.random_bool(0.1),
            rotate: self.rng.random_bool(0.05),
            soft_drop: self.rng.random_bool(0.2),
        }
    }
}

/// Number of ticks that produced each kind of event.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
struct EventCounts {
    idle: u64,
    moved: u64,
    rotated: u64,
    locked: u64,
    topped_out: u64,
    restarted: u64,
}

impl EventCounts {
    fn record(&mut self, event: TickEvent) {
        let counter = match event {
            TickEvent::Idle => &mut self.idle,
            TickEvent::Moved => &mut self.moved,
            TickEvent::Rotated => &mut self.rotated,
            TickEvent::Locked { .. } => &mut self.locked,
            TickEvent::ToppedOut { .. } => &mut self.topped_out,
            TickEvent::Restarted => &mut self.restarted,
        };
        *counter += 1;
    }

    fn total(&self) -> u64 {
        self.idle + self.moved + self.rotated + self.locked + self.topped_out + self.restarted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SimulationSummary {
    seed: PieceSeed,
    input_seed: u64,
    rules: GameRules,
    ticks: u64,
    input_ticks: u64,
    events: EventCounts,
    locked_by_kind: BTreeMap<PieceKind, u64>,
    cleared_rows: usize,
    best_score: usize,
    final_game: GameStats,
    final_board: BoardMask,
    game_over: bool,
}

fn simulate(
    seed: PieceSeed,
    input_seed: u64,
    ticks: u64,
    initial_fall_speed: Option<u32>,
) -> SimulationSummary {
    let mut clock = new_clock(Some(seed), initial_fall_speed);
    let mut input = RandomInput::new(input_seed);
    let mut events = EventCounts::default();
    let mut input_ticks = 0;
    let mut locked_by_kind = BTreeMap::new();
    let mut cleared_rows = 0;
    let mut best_score = 0;

    for _ in 0..ticks {
        let intents = input.next_intents();
        if !intents.is_empty() {
            input_ticks += 1;
        }
        let event = clock.tick(intents);
        events.record(event);
        if let TickEvent::Locked {
            kind,
            cleared_rows: rows,
        }
        | TickEvent::ToppedOut {
            kind,
            cleared_rows: rows,
        } = event
        {
            *locked_by_kind.entry(kind).or_insert(0) += 1;
            cleared_rows += rows;
        }
        best_score = best_score.max(clock.score());
    }
    debug_assert_eq!(events.total(), ticks);

    SimulationSummary {
        seed,
        input_seed,
        rules: *clock.rules(),
        ticks,
        input_ticks,
        events,
        locked_by_kind,
        cleared_rows,
        best_score,
        final_game: clock.stats().clone(),
        final_board: *clock.union(),
        game_over: clock.is_game_over(),
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        ticks,
        seed,
        input_seed,
        initial_fall_speed,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let input_seed = input_seed.unwrap_or_else(|| rand::rng().random());
    let summary = simulate(seed, input_seed, *ticks, *initial_fall_speed);

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &summary)?;
    writeln!(stdout)?;
    Ok(())
}
